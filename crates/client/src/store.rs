use std::sync::Arc;

use db::models::todo::Todo;
use tokio::sync::watch;

/// The client's cached task list, kept newest first.
///
/// Cloning yields another handle to the same list. Every mutation that
/// changes something notifies the receivers returned by [`TodoStore::subscribe`].
#[derive(Clone)]
pub struct TodoStore {
    todos: Arc<watch::Sender<Vec<Todo>>>,
}

impl Default for TodoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoStore {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self { todos: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Todo>> {
        self.todos.subscribe()
    }

    pub fn todos(&self) -> Vec<Todo> {
        self.todos.borrow().clone()
    }

    pub fn get(&self, id: i64) -> Option<Todo> {
        self.todos.borrow().iter().find(|t| t.id == id).cloned()
    }

    pub fn visible_ids(&self) -> Vec<i64> {
        self.todos.borrow().iter().map(|t| t.id).collect()
    }

    pub fn len(&self) -> usize {
        self.todos.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.borrow().is_empty()
    }

    /// Replace the whole list with a fresh server listing.
    pub fn replace_all(&self, mut todos: Vec<Todo>) {
        sort_newest_first(&mut todos);
        self.todos.send_replace(todos);
    }

    /// Flip `completed` in place, returning the record as it was before.
    pub fn set_completed(&self, id: i64, completed: bool) -> Option<Todo> {
        let mut previous = None;
        self.todos.send_if_modified(|todos| {
            let Some(todo) = todos.iter_mut().find(|t| t.id == id) else {
                return false;
            };
            previous = Some(todo.clone());
            let changed = todo.completed != completed;
            todo.completed = completed;
            changed
        });
        previous
    }

    pub fn remove(&self, id: i64) -> Option<Todo> {
        let mut removed = None;
        self.todos.send_if_modified(|todos| {
            let Some(pos) = todos.iter().position(|t| t.id == id) else {
                return false;
            };
            removed = Some(todos.remove(pos));
            true
        });
        removed
    }

    /// Put `todo` back exactly as given: replaced in place when its id is
    /// still listed, otherwise re-inserted in id-descending position.
    pub fn restore(&self, todo: Todo) {
        self.todos.send_if_modified(|todos| {
            if let Some(existing) = todos.iter_mut().find(|t| t.id == todo.id) {
                if *existing == todo {
                    return false;
                }
                *existing = todo;
            } else {
                todos.push(todo);
                sort_newest_first(todos);
            }
            true
        });
    }

    /// Mark every listed id completed; ids not in the cache are ignored.
    pub fn mark_completed(&self, ids: &[i64]) {
        self.todos.send_if_modified(|todos| {
            let mut changed = false;
            for todo in todos.iter_mut().filter(|t| ids.contains(&t.id)) {
                changed |= !todo.completed;
                todo.completed = true;
            }
            changed
        });
    }
}

fn sort_newest_first(todos: &mut [Todo]) {
    todos.sort_by(|a, b| b.id.cmp(&a.id));
}
