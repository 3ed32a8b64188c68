//! Optimistic completion toggles and deletions with a timed undo window.
//!
//! Each action is applied to the [`TodoStore`] immediately and committed to
//! the API only after [`UNDO_WINDOW`] has passed. Until the commit is
//! dispatched the user can undo, which restores the cached record and makes
//! no request at all. A failed commit rolls the cache back the same way.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use db::models::todo::Todo;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, info, warn};

use crate::{api::TodoApi, notify::Notifier, store::TodoStore};

/// Delay between an optimistic change and its commit to the server.
pub const UNDO_WINDOW: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAction {
    Complete { completed: bool },
    Delete,
}

impl PendingAction {
    fn pending_message(self) -> &'static str {
        match self {
            PendingAction::Complete { completed: true } => "Task will be completed",
            PendingAction::Complete { completed: false } => "Task will be reopened",
            PendingAction::Delete => "Task will be deleted",
        }
    }

    fn committed_message(self) -> &'static str {
        match self {
            PendingAction::Complete { completed: true } => "Task completed!",
            PendingAction::Complete { completed: false } => "Task reopened!",
            PendingAction::Delete => "Task deleted!",
        }
    }

    fn failed_message(self) -> &'static str {
        match self {
            PendingAction::Complete { .. } => "Failed to update task",
            PendingAction::Delete => "Failed to delete task",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Timer running, undo still possible.
    Pending,
    /// Request dispatched, runs to completion.
    Committing,
}

struct TransientTodo {
    snapshot: Todo,
    action: PendingAction,
    generation: u64,
    phase: Phase,
    undone: Arc<AtomicBool>,
    timer: JoinHandle<()>,
}

impl TransientTodo {
    /// Stop a pending commit from ever reaching the API.
    fn cancel(&self) {
        self.undone.store(true, Ordering::SeqCst);
        self.timer.abort();
    }
}

struct Inner {
    api: Arc<dyn TodoApi>,
    store: TodoStore,
    notifier: Notifier,
    transient: Mutex<HashMap<i64, TransientTodo>>,
    next_generation: AtomicU64,
}

/// Cheap to clone; all clones drive the same set of pending actions.
#[derive(Clone)]
pub struct OptimisticController {
    inner: Arc<Inner>,
}

impl OptimisticController {
    pub fn new(api: Arc<dyn TodoApi>, store: TodoStore, notifier: Notifier) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                store,
                notifier,
                transient: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
            }),
        }
    }

    /// Flip the completion flag of a cached todo. Returns `false` when the id
    /// is not in the cache.
    pub async fn toggle_complete(&self, id: i64) -> bool {
        let mut transient = self.inner.transient.lock().await;
        let Some(current) = self.inner.store.get(id) else {
            return false;
        };

        let completed = !current.completed;
        let baseline = supersede(&mut transient, &current);
        self.inner.store.set_completed(id, completed);
        self.schedule(
            &mut transient,
            baseline,
            PendingAction::Complete { completed },
        );
        true
    }

    /// Remove a cached todo from view and delete it once the window passes.
    pub async fn delete(&self, id: i64) -> bool {
        let mut transient = self.inner.transient.lock().await;
        let Some(current) = self.inner.store.get(id) else {
            return false;
        };

        let baseline = supersede(&mut transient, &current);
        self.inner.store.remove(id);
        self.schedule(&mut transient, baseline, PendingAction::Delete);
        true
    }

    /// Cancel the pending action on `id` and restore the cached record.
    ///
    /// Returns `false` when nothing is pending or the commit request has
    /// already been dispatched.
    pub async fn undo(&self, id: i64) -> bool {
        let mut transient = self.inner.transient.lock().await;
        match transient.get(&id) {
            Some(entry) if entry.phase == Phase::Pending => {}
            Some(_) => {
                debug!(todo_id = id, "Undo too late, commit already dispatched");
                return false;
            }
            None => return false,
        }

        let Some(entry) = transient.remove(&id) else {
            return false;
        };
        entry.cancel();
        self.inner.store.restore(entry.snapshot);
        info!(todo_id = id, action = ?entry.action, "Optimistic action undone");
        self.inner.notifier.info("Action cancelled!");
        true
    }

    /// Drop pending actions for `ids` without restoring anything, because a
    /// newer authoritative write replaced them. Dispatched commits are left
    /// to finish.
    pub async fn cancel_for(&self, ids: &[i64]) {
        let mut transient = self.inner.transient.lock().await;
        for id in ids {
            if transient.get(id).is_some_and(|e| e.phase == Phase::Pending) {
                if let Some(entry) = transient.remove(id) {
                    entry.cancel();
                    debug!(todo_id = id, "Pending action dropped");
                }
            }
        }
    }

    /// Apply every outstanding action to a freshly fetched listing: pending
    /// deletions are dropped and pending toggles keep their new value.
    pub async fn overlay_pending(&self, todos: &mut Vec<Todo>) {
        let transient = self.inner.transient.lock().await;
        overlay(&transient, todos);
    }

    /// Replace the cache with a server listing without losing actions that
    /// are still inside their undo window or in flight.
    pub async fn replace_listing(&self, mut todos: Vec<Todo>) {
        let transient = self.inner.transient.lock().await;
        overlay(&transient, &mut todos);
        self.inner.store.replace_all(todos);
    }

    pub async fn is_pending(&self, id: i64) -> bool {
        self.inner.transient.lock().await.contains_key(&id)
    }

    pub async fn pending_ids(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.inner.transient.lock().await.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn schedule(
        &self,
        transient: &mut HashMap<i64, TransientTodo>,
        snapshot: Todo,
        action: PendingAction,
    ) {
        let id = snapshot.id;
        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let undone = Arc::new(AtomicBool::new(false));
        let timer = tokio::spawn(deferred_commit(
            self.inner.clone(),
            id,
            generation,
            undone.clone(),
            action,
        ));

        transient.insert(
            id,
            TransientTodo {
                snapshot,
                action,
                generation,
                phase: Phase::Pending,
                undone,
                timer,
            },
        );
        self.inner.notifier.undoable(action.pending_message(), id);
    }
}

/// Take over any outstanding entry for `current.id` and return the record
/// that undo or a failed commit should restore.
///
/// A still-pending action is cancelled outright and its snapshot becomes the
/// baseline, so undo returns to the state before the first action. An entry
/// already committing cannot be stopped; the current cached record becomes
/// the baseline and the old commit will no longer find its entry.
fn supersede(transient: &mut HashMap<i64, TransientTodo>, current: &Todo) -> Todo {
    match transient.remove(&current.id) {
        Some(prior) if prior.phase == Phase::Pending => {
            prior.cancel();
            debug!(todo_id = current.id, action = ?prior.action, "Pending action superseded");
            prior.snapshot
        }
        _ => current.clone(),
    }
}

fn overlay(transient: &HashMap<i64, TransientTodo>, todos: &mut Vec<Todo>) {
    todos.retain(|t| {
        !matches!(
            transient.get(&t.id).map(|e| e.action),
            Some(PendingAction::Delete)
        )
    });
    for todo in todos.iter_mut() {
        if let Some(PendingAction::Complete { completed }) =
            transient.get(&todo.id).map(|e| e.action)
        {
            todo.completed = completed;
        }
    }
}

async fn deferred_commit(
    inner: Arc<Inner>,
    id: i64,
    generation: u64,
    undone: Arc<AtomicBool>,
    action: PendingAction,
) {
    tokio::time::sleep(UNDO_WINDOW).await;

    {
        let mut transient = inner.transient.lock().await;
        if undone.load(Ordering::SeqCst) {
            return;
        }
        match transient.get_mut(&id) {
            Some(entry) if entry.generation == generation => entry.phase = Phase::Committing,
            _ => return,
        }
    }

    let result = match action {
        PendingAction::Complete { completed } => {
            inner.api.update_todo(id, completed).await.map(|_| ())
        }
        PendingAction::Delete => inner.api.delete_todo(id).await,
    };

    let mut transient = inner.transient.lock().await;
    let still_ours = transient
        .get(&id)
        .is_some_and(|entry| entry.generation == generation);
    let entry = if still_ours {
        transient.remove(&id)
    } else {
        None
    };

    match result {
        Ok(()) => {
            info!(todo_id = id, action = ?action, "Optimistic action committed");
            inner.notifier.info(action.committed_message());
        }
        Err(e) => {
            warn!(todo_id = id, action = ?action, error = %e, "Commit failed, reverting");
            if let Some(entry) = entry {
                inner.store.restore(entry.snapshot);
            }
            inner.notifier.error(action.failed_message());
        }
    }
}
