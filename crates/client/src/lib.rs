//! Client-side state for the todo tracker: a cached task list, optimistic
//! completion/deletion with a timed undo window, and bulk selection.

pub mod api;
pub mod notify;
pub mod optimistic;
pub mod page;
pub mod selection;
pub mod store;

#[cfg(test)]
mod test_support;

pub use api::{ApiClientError, HttpTodoApi, TodoApi};
pub use notify::{Notifier, Toast, ToastKind};
pub use optimistic::{OptimisticController, UNDO_WINDOW};
pub use page::{CreateTodoError, TodoPage};
pub use selection::SelectionController;
pub use store::TodoStore;
