//! Session lifecycle notifications.
//!
//! The session client never navigates on its own. It publishes a
//! [`SessionEvent`] on every credential change and the navigation layer
//! decides what to show.

use tokio::sync::broadcast;

/// Default buffer size for the broadcast channel.
/// Events beyond this limit are dropped for slow receivers.
pub const DEFAULT_BUFFER_SIZE: usize = 64;

/// A change to the stored session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Credentials from login or register were persisted.
    LoggedIn { username: String },
    /// A 401 was recovered by exchanging the refresh token.
    TokenRefreshed { username: String },
    /// Local logout cleared the store.
    LoggedOut,
    /// The session could not be renewed and the store was cleared.
    Expired { reason: String },
}

/// Broadcaster for session events. Cheap to clone.
#[derive(Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Send an event to all subscribers.
    ///
    /// Returns the number of subscribers that received it; 0 when nobody is
    /// listening.
    pub fn send(&self, event: SessionEvent) -> usize {
        self.sender.send(event).unwrap_or_default()
    }

    /// Subscribe to events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEvents")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_without_subscribers() {
        let events = SessionEvents::new();
        assert_eq!(events.send(SessionEvent::LoggedOut), 0);
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let events = SessionEvents::new();
        let mut first = events.subscribe();
        let mut second = events.clone().subscribe();
        assert_eq!(events.subscriber_count(), 2);

        let sent = events.send(SessionEvent::Expired {
            reason: "refresh rejected".into(),
        });
        assert_eq!(sent, 2);

        let expected = SessionEvent::Expired {
            reason: "refresh rejected".into(),
        };
        assert_eq!(first.recv().await.unwrap(), expected);
        assert_eq!(second.recv().await.unwrap(), expected);
    }
}
