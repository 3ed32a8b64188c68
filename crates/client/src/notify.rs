//! User-facing notifications: transient toasts and the page error banner.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    /// Set when the toast offers an "Undo" action for this todo.
    pub undo_for: Option<i64>,
}

#[derive(Clone)]
pub struct Notifier {
    toasts: mpsc::UnboundedSender<Toast>,
    banner: Arc<watch::Sender<Option<String>>>,
}

impl Notifier {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Toast>) {
        let (toasts, rx) = mpsc::unbounded_channel();
        let (banner, _) = watch::channel(None);
        (
            Self {
                toasts,
                banner: Arc::new(banner),
            },
            rx,
        )
    }

    fn push(&self, toast: Toast) {
        if self.toasts.send(toast).is_err() {
            debug!("Toast dropped, no listener");
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(Toast {
            message: message.into(),
            kind: ToastKind::Info,
            undo_for: None,
        });
    }

    pub fn undoable(&self, message: impl Into<String>, todo_id: i64) {
        self.push(Toast {
            message: message.into(),
            kind: ToastKind::Info,
            undo_for: Some(todo_id),
        });
    }

    /// Non-blocking failure report: raises the banner and emits an error toast.
    pub fn error(&self, message: impl Into<String>) {
        let message = message.into();
        self.set_banner(Some(message.clone()));
        self.push(Toast {
            message,
            kind: ToastKind::Error,
            undo_for: None,
        });
    }

    pub fn set_banner(&self, message: Option<String>) {
        self.banner.send_replace(message);
    }

    pub fn banner(&self) -> Option<String> {
        self.banner.borrow().clone()
    }
}
