use std::{collections::BTreeSet, sync::Arc};

use db::models::todo::Todo;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    api::{ApiClientError, TodoApi},
    notify::Notifier,
    optimistic::OptimisticController,
    store::TodoStore,
};

/// Tracks which visible todos are selected for bulk completion.
///
/// The selection never holds an id that is not in the cached list: the
/// controller watches the store and drops vanished ids before every
/// operation or query.
pub struct SelectionController {
    api: Arc<dyn TodoApi>,
    store: TodoStore,
    optimistic: OptimisticController,
    notifier: Notifier,
    todos_rx: watch::Receiver<Vec<Todo>>,
    selected: BTreeSet<i64>,
}

impl SelectionController {
    pub fn new(
        api: Arc<dyn TodoApi>,
        store: TodoStore,
        optimistic: OptimisticController,
        notifier: Notifier,
    ) -> Self {
        let todos_rx = store.subscribe();
        Self {
            api,
            store,
            optimistic,
            notifier,
            todos_rx,
            selected: BTreeSet::new(),
        }
    }

    pub fn toggle(&mut self, id: i64) {
        self.sync();
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    /// Select every visible todo, or clear the selection when all of them
    /// are already selected.
    pub fn select_all(&mut self) {
        self.sync();
        let visible: BTreeSet<i64> = self.todos_rx.borrow().iter().map(|t| t.id).collect();
        if visible.is_empty() {
            return;
        }
        if visible.is_subset(&self.selected) {
            self.selected.clear();
        } else {
            self.selected = visible;
        }
    }

    /// Drop selected ids that are not in `visible_ids`. Never adds.
    pub fn reconcile(&mut self, visible_ids: &[i64]) {
        self.selected.retain(|id| visible_ids.contains(id));
    }

    fn sync(&mut self) {
        if self.todos_rx.has_changed().unwrap_or(false) {
            let visible: Vec<i64> = self.todos_rx.borrow_and_update().iter().map(|t| t.id).collect();
            self.reconcile(&visible);
        }
    }

    pub fn is_selected(&mut self, id: i64) -> bool {
        self.sync();
        self.selected.contains(&id)
    }

    pub fn selected_ids(&mut self) -> Vec<i64> {
        self.sync();
        self.selected.iter().copied().collect()
    }

    pub fn selected_count(&mut self) -> usize {
        self.sync();
        self.selected.len()
    }

    pub fn is_all_selected(&mut self) -> bool {
        self.sync();
        let todos = self.todos_rx.borrow();
        !todos.is_empty() && todos.iter().all(|t| self.selected.contains(&t.id))
    }

    pub fn select_all_label(&mut self) -> &'static str {
        if self.is_all_selected() {
            "Clear selection"
        } else {
            "Select all"
        }
    }

    /// "N selected", or `None` when nothing is selected.
    pub fn summary(&mut self) -> Option<String> {
        match self.selected_count() {
            0 => None,
            n => Some(format!("{n} selected")),
        }
    }

    /// Mark every selected todo completed with a single request.
    ///
    /// On failure the cache and the selection are left as they were.
    pub async fn bulk_complete(&mut self) -> Result<(), ApiClientError> {
        let ids = self.selected_ids();
        if ids.is_empty() {
            return Ok(());
        }

        match self.api.bulk_update_todos(&ids, true).await {
            Ok(updated) => {
                self.optimistic.cancel_for(&ids).await;
                self.store.mark_completed(&ids);
                self.selected.clear();
                self.notifier.set_banner(None);
                info!(count = updated.len(), "Selected todos completed");
                self.notifier.info("Selected tasks marked as done!");
                Ok(())
            }
            Err(e) => {
                warn!(count = ids.len(), error = %e, "Bulk completion failed");
                self.notifier.error("Failed to update selected tasks");
                Err(e)
            }
        }
    }
}
