use std::sync::Arc;

use db::models::{
    category::Category,
    todo::{CreateTodo, Todo},
};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::{
    api::{ApiClientError, TodoApi},
    notify::{Notifier, Toast},
    optimistic::OptimisticController,
    selection::SelectionController,
    store::TodoStore,
};

/// Why a create request did not produce a todo. Each variant is shown next
/// to the form, except `Failed`, which also raises the page banner.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateTodoError {
    #[error("Task text is required")]
    MissingText,
    #[error("Category is required")]
    MissingCategory,
    /// The server refused the request, e.g. the category quota is full.
    #[error("{0}")]
    Rejected(String),
    #[error("Failed to create task")]
    Failed,
}

/// Root of the client: owns the cache, the filter and both controllers.
pub struct TodoPage {
    api: Arc<dyn TodoApi>,
    store: TodoStore,
    notifier: Notifier,
    optimistic: OptimisticController,
    selection: SelectionController,
    categories: Vec<Category>,
    filter: Option<String>,
}

impl TodoPage {
    pub fn new(api: Arc<dyn TodoApi>) -> (Self, mpsc::UnboundedReceiver<Toast>) {
        let store = TodoStore::new();
        let (notifier, toasts) = Notifier::channel();
        let optimistic = OptimisticController::new(api.clone(), store.clone(), notifier.clone());
        let selection = SelectionController::new(
            api.clone(),
            store.clone(),
            optimistic.clone(),
            notifier.clone(),
        );

        let page = Self {
            api,
            store,
            notifier,
            optimistic,
            selection,
            categories: Vec::new(),
            filter: None,
        };
        (page, toasts)
    }

    /// Fetch categories and todos. Failures raise the banner and keep
    /// whatever was cached before.
    pub async fn load(&mut self) {
        self.notifier.set_banner(None);
        match self.api.get_categories().await {
            Ok(categories) => self.categories = categories,
            Err(e) => {
                warn!(error = %e, "Failed to fetch categories");
                self.notifier.set_banner(Some("Failed to fetch categories".to_string()));
            }
        }
        self.fetch_todos().await;
    }

    /// Re-fetch the listing, clearing any earlier banner first. Pending
    /// optimistic actions are laid over the result.
    pub async fn refresh_todos(&mut self) {
        self.notifier.set_banner(None);
        self.fetch_todos().await;
    }

    async fn fetch_todos(&mut self) {
        match self.api.get_todos(self.filter.as_deref()).await {
            Ok(todos) => self.optimistic.replace_listing(todos).await,
            Err(e) => {
                warn!(error = %e, filter = ?self.filter, "Failed to fetch todos");
                self.notifier.set_banner(Some("Failed to fetch todos".to_string()));
            }
        }
    }

    /// `None` shows every category.
    pub async fn set_filter(&mut self, category: Option<String>) {
        self.filter = category.filter(|c| !c.is_empty());
        self.refresh_todos().await;
    }

    pub async fn create(&mut self, text: &str, category: &str) -> Result<Todo, CreateTodoError> {
        if text.is_empty() {
            return Err(CreateTodoError::MissingText);
        }
        if category.is_empty() {
            return Err(CreateTodoError::MissingCategory);
        }

        match self.api.create_todo(&CreateTodo::new(text, category)).await {
            Ok(todo) => {
                info!(todo_id = todo.id, category = %todo.category, "Todo created");
                self.refresh_todos().await;
                self.notifier.info("Task created successfully!");
                Ok(todo)
            }
            Err(ApiClientError::Http {
                status: 400,
                message,
            }) => Err(CreateTodoError::Rejected(message)),
            Err(e) => {
                warn!(error = %e, "Failed to create todo");
                self.notifier.error("Failed to create task");
                Err(CreateTodoError::Failed)
            }
        }
    }

    pub async fn toggle(&self, id: i64) -> bool {
        self.optimistic.toggle_complete(id).await
    }

    pub async fn delete(&self, id: i64) -> bool {
        self.optimistic.delete(id).await
    }

    pub async fn undo(&self, id: i64) -> bool {
        self.optimistic.undo(id).await
    }

    pub fn todos(&self) -> Vec<Todo> {
        self.store.todos()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    pub fn banner(&self) -> Option<String> {
        self.notifier.banner()
    }

    pub fn dismiss_banner(&self) {
        self.notifier.set_banner(None);
    }

    pub fn store(&self) -> &TodoStore {
        &self.store
    }

    pub fn optimistic(&self) -> &OptimisticController {
        &self.optimistic
    }

    pub fn selection(&mut self) -> &mut SelectionController {
        &mut self.selection
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_support::{Call, MockApi, todo};

    fn seeded() -> Arc<MockApi> {
        MockApi::with_todos(vec![
            todo(1, "Work", false),
            todo(2, "Personal", true),
            todo(3, "Work", false),
        ])
    }

    #[tokio::test]
    async fn test_load_fetches_categories_and_todos() {
        let api = seeded();
        let (mut page, _toasts) = TodoPage::new(api.clone());

        page.load().await;

        let names: Vec<&str> = page.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Work", "Personal", "Shopping", "Health"]);
        assert_eq!(page.store().visible_ids(), vec![3, 2, 1]);
        assert!(page.banner().is_none());
        assert_eq!(api.calls(), vec![Call::GetCategories, Call::GetTodos(None)]);
    }

    #[tokio::test]
    async fn test_load_failure_keeps_cached_todos() {
        let api = seeded();
        let (mut page, _toasts) = TodoPage::new(api.clone());
        page.load().await;

        api.state.lock().unwrap().fail_fetch = true;
        page.load().await;

        assert_eq!(page.banner().as_deref(), Some("Failed to fetch todos"));
        assert_eq!(page.todos().len(), 3);
        assert_eq!(page.categories().len(), 4);
    }

    #[tokio::test]
    async fn test_successful_reload_clears_banner() {
        let api = seeded();
        api.state.lock().unwrap().fail_fetch = true;
        let (mut page, _toasts) = TodoPage::new(api.clone());

        page.load().await;
        assert_eq!(page.banner().as_deref(), Some("Failed to fetch todos"));

        api.state.lock().unwrap().fail_fetch = false;
        page.load().await;
        assert!(page.banner().is_none());
        assert_eq!(page.todos().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_during_undo_window_keeps_optimistic_state() {
        let api = seeded();
        let (mut page, _toasts) = TodoPage::new(api.clone());
        page.load().await;

        page.delete(3).await;
        page.toggle(1).await;
        assert_eq!(page.store().visible_ids(), vec![2, 1]);

        page.create("Buy milk", "Shopping").await.unwrap();
        assert_eq!(page.store().visible_ids(), vec![4, 2, 1]);
        assert!(page.store().get(1).unwrap().completed);

        tokio::time::sleep(Duration::from_secs(6)).await;
        let writes = api.writes();
        assert!(writes.contains(&Call::Delete(3)));
        assert!(writes.contains(&Call::Update(1, true)));
        assert_eq!(page.store().visible_ids(), vec![4, 2, 1]);
        assert!(page.store().get(1).unwrap().completed);

        page.refresh_todos().await;
        assert_eq!(page.store().visible_ids(), vec![4, 2, 1]);
        assert!(page.store().get(1).unwrap().completed);
    }

    #[tokio::test]
    async fn test_filter_refetches_one_category() {
        let api = seeded();
        let (mut page, _toasts) = TodoPage::new(api.clone());

        page.set_filter(Some("Work".to_string())).await;
        assert_eq!(page.filter(), Some("Work"));
        assert_eq!(page.store().visible_ids(), vec![3, 1]);

        page.set_filter(None).await;
        assert_eq!(page.store().visible_ids(), vec![3, 2, 1]);
        assert_eq!(api.calls().last(), Some(&Call::GetTodos(None)));
    }

    #[tokio::test]
    async fn test_create_validates_before_calling() {
        let api = seeded();
        let (mut page, _toasts) = TodoPage::new(api.clone());

        assert_eq!(
            page.create("", "Work").await,
            Err(CreateTodoError::MissingText)
        );
        assert_eq!(
            page.create("Buy milk", "").await,
            Err(CreateTodoError::MissingCategory)
        );
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_refetches_and_notifies() {
        let api = seeded();
        let (mut page, mut toasts) = TodoPage::new(api.clone());

        let created = page.create("Buy milk", "Shopping").await.unwrap();
        assert_eq!(created.id, 4);
        assert_eq!(page.store().visible_ids(), vec![4, 3, 2, 1]);
        assert_eq!(toasts.try_recv().unwrap().message, "Task created successfully!");
    }

    #[tokio::test]
    async fn test_create_rejected_by_server_is_a_form_error() {
        let api = seeded();
        api.state.lock().unwrap().reject_create =
            Some("Category limit of 5 tasks reached.".to_string());
        let (mut page, _toasts) = TodoPage::new(api.clone());

        let err = page.create("One more", "Work").await.unwrap_err();
        assert_eq!(
            err,
            CreateTodoError::Rejected("Category limit of 5 tasks reached.".to_string())
        );
        assert_eq!(err.to_string(), "Category limit of 5 tasks reached.");
        assert!(page.banner().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_and_undo_through_page() {
        let api = seeded();
        let (mut page, _toasts) = TodoPage::new(api.clone());
        page.load().await;

        assert!(page.toggle(1).await);
        assert!(page.store().get(1).unwrap().completed);
        assert!(page.undo(1).await);
        assert!(!page.store().get(1).unwrap().completed);

        assert!(page.delete(3).await);
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(api.writes(), vec![Call::Delete(3)]);
        assert_eq!(page.store().visible_ids(), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_selection_follows_the_page_list() {
        let api = seeded();
        let (mut page, _toasts) = TodoPage::new(api.clone());
        page.load().await;

        page.selection().select_all();
        assert_eq!(page.selection().selected_count(), 3);

        page.set_filter(Some("Personal".to_string())).await;
        assert_eq!(page.selection().selected_ids(), vec![2]);

        page.selection().bulk_complete().await.unwrap();
        assert_eq!(api.writes(), vec![Call::Bulk(vec![2], true)]);
        assert_eq!(page.selection().summary(), None);
    }
}
