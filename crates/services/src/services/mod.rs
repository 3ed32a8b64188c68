pub mod quota;
pub mod todos;
