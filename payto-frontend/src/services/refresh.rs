//! In-process notifications between handlers and caches.

use tokio::sync::broadcast;

const CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshEvent {
    /// The company list of `user_id` was changed by a create, update or
    /// delete.
    CompaniesChanged { user_id: String },
}

/// Typed publish/subscribe channel. Publishing with no subscriber is not an
/// error.
#[derive(Debug, Clone)]
pub struct RefreshBus {
    sender: broadcast::Sender<RefreshEvent>,
}

impl Default for RefreshBus {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(CAPACITY);
        Self { sender }
    }
}

impl RefreshBus {
    pub fn publish(&self, event: RefreshEvent) {
        let receivers = self.sender.send(event.clone()).unwrap_or(0);
        tracing::debug!(?event, receivers, "Published refresh event");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RefreshEvent> {
        self.sender.subscribe()
    }
}
