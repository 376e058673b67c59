//! Change notifications
//!
//! Metadata stores emit a best-effort multicast signal that something changed,
//! coalesced so rapid write bursts produce at most one emission per window.
//! This is a hint for observers (live counts, gallery refreshes), not a commit
//! log: there is no delivery guarantee, and a notification fired while nobody
//! is subscribed is silently dropped.

use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;

/// Default coalescing window for change notifications
pub const DEFAULT_COALESCE_WINDOW: Duration = Duration::from_millis(200);

/// Marker event: the store's contents changed in some way
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreChange;

/// Coalescing multicast change channel
#[derive(Debug)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<StoreChange>,
    last_emit: Mutex<Option<Instant>>,
    window: Duration,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_COALESCE_WINDOW)
    }

    /// Create a notifier with a custom coalescing window
    ///
    /// A zero window disables coalescing entirely.
    pub fn with_window(window: Duration) -> Self {
        let (sender, _) = broadcast::channel(16);
        Self {
            sender,
            last_emit: Mutex::new(None),
            window,
        }
    }

    /// Subscribe to change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.sender.subscribe()
    }

    /// Signal that something changed
    ///
    /// Emits immediately if the window has elapsed since the last emission;
    /// otherwise the signal is coalesced into the one already sent.
    pub fn notify(&self) {
        let mut last_emit = self.last_emit.lock().unwrap();
        if let Some(at) = *last_emit {
            if at.elapsed() < self.window {
                return;
            }
        }
        *last_emit = Some(Instant::now());
        // No subscribers is fine; the signal is best-effort
        let _ = self.sender.send(StoreChange);
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[tokio::test]
    async fn test_rapid_writes_coalesce() {
        let notifier = ChangeNotifier::with_window(Duration::from_secs(60));
        let mut rx = notifier.subscribe();

        notifier.notify();
        notifier.notify();
        notifier.notify();

        assert_eq!(rx.try_recv().unwrap(), StoreChange);
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_zero_window_delivers_everything() {
        let notifier = ChangeNotifier::with_window(Duration::ZERO);
        let mut rx = notifier.subscribe();

        notifier.notify();
        notifier.notify();

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_notify_without_subscribers_is_silent() {
        let notifier = ChangeNotifier::new();
        notifier.notify();

        // A subscriber attached after the fact sees nothing
        let mut rx = notifier.subscribe();
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }
}
