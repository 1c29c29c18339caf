use crate::types::{TransactionState, TxStatus};
use tokio::sync::watch;
use tracing::trace;

/// Observable progress of the current operation.
///
/// Single writer (the executor), any number of readers. Readers get the
/// latest state through `state()` or by awaiting changes on `subscribe()`.
#[derive(Debug)]
pub struct StatusTracker {
    tx: watch::Sender<TransactionState>,
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusTracker {
    /// Starts hidden, pending, with no title or message.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(TransactionState::default());
        Self { tx }
    }

    /// Make the indicator visible and reset it to pending.
    pub fn show(&self, title: impl Into<String>, message: impl Into<String>) {
        let state = TransactionState {
            visible: true,
            title: title.into(),
            message: message.into(),
            status: TxStatus::Pending,
        };
        trace!(title = %state.title, "Status shown");
        self.tx.send_replace(state);
    }

    /// Move to `status`. Keeps the current message when `message` is `None`.
    pub fn update(&self, status: TxStatus, message: Option<String>) {
        self.tx.send_modify(|state| {
            state.status = status;
            if let Some(message) = message {
                state.message = message;
            }
        });
        trace!(?status, "Status updated");
    }

    /// Hide the indicator. Title, message and status are kept for late readers.
    pub fn hide(&self) {
        self.tx.send_modify(|state| state.visible = false);
    }

    pub fn state(&self) -> TransactionState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TransactionState> {
        self.tx.subscribe()
    }
}
