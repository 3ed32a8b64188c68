use db::models::{
    category::Category,
    todo::{BulkUpdateTodos, CreateTodo, Todo},
};
use ts_rs::TS;

fn main() {
    let decls = [
        Category::decl(),
        Todo::decl(),
        CreateTodo::decl(),
        BulkUpdateTodos::decl(),
    ];

    println!("// This file was generated by `generate_types`. Do not edit.\n");
    for decl in decls {
        println!("export {}\n", decl);
    }
}
