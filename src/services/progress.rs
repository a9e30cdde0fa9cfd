//! Progress broadcaster for long-running transfers.
//!
//! Uses tokio::sync::broadcast to fan-out progress events to every listener
//! (progress bars, in-flight indicators).

use tokio::sync::broadcast;

/// Default capacity for the broadcast channel.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// The transfer a progress event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ExportArchive,
    AllureArchive,
    Import,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExportArchive => "export",
            Self::AllureArchive => "allure",
            Self::Import => "import",
        }
    }
}

/// Progress event.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// An operation started; listeners should show an in-flight indicator.
    Started(Operation),
    /// `completed` of `total` items have been processed.
    Advanced {
        operation: Operation,
        completed: usize,
        total: usize,
    },
    /// The operation ended, successfully or not.
    Finished { operation: Operation, success: bool },
}

impl ProgressEvent {
    /// Fraction complete in `[0, 1]`, for `Advanced` events.
    pub fn fraction(&self) -> Option<f64> {
        match self {
            Self::Advanced {
                completed, total, ..
            } if *total > 0 => Some(*completed as f64 / *total as f64),
            Self::Advanced { .. } => Some(1.0),
            _ => None,
        }
    }
}

/// Broadcaster that distributes progress events to all listeners.
#[derive(Debug, Clone)]
pub struct ProgressBroadcaster {
    sender: broadcast::Sender<ProgressEvent>,
}

impl ProgressBroadcaster {
    /// Create a new ProgressBroadcaster with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new ProgressBroadcaster with a specific capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to receive events.
    /// Returns a receiver that will receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.sender.subscribe()
    }

    /// Broadcast an event to all subscribers.
    /// Returns the number of receivers that received the event.
    pub fn send(&self, event: ProgressEvent) -> usize {
        // Ignore errors when there are no subscribers
        self.sender.send(event).unwrap_or(0)
    }

    /// Report that `completed` of `total` items are done.
    pub fn advance(&self, operation: Operation, completed: usize, total: usize) {
        self.send(ProgressEvent::Advanced {
            operation,
            completed,
            total,
        });
    }

    /// Announce the start of an operation.
    ///
    /// The returned guard sends `Finished` when dropped, so the in-flight
    /// state is cleared on every exit path. Call [`InFlight::succeed`] on the
    /// success path.
    pub fn begin(&self, operation: Operation) -> InFlight {
        self.send(ProgressEvent::Started(operation));
        InFlight {
            broadcaster: self.clone(),
            operation,
            success: false,
        }
    }
}

impl Default for ProgressBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks an operation as in flight until dropped.
pub struct InFlight {
    broadcaster: ProgressBroadcaster,
    operation: Operation,
    success: bool,
}

impl InFlight {
    pub fn succeed(mut self) {
        self.success = true;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.broadcaster.send(ProgressEvent::Finished {
            operation: self.operation,
            success: self.success,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_to_multiple_receivers() {
        let broadcaster = ProgressBroadcaster::new();

        let mut rx1 = broadcaster.subscribe();
        let mut rx2 = broadcaster.subscribe();

        let count = broadcaster.send(ProgressEvent::Started(Operation::Import));
        assert_eq!(count, 2);

        assert!(rx1.recv().await.is_ok());
        assert!(rx2.recv().await.is_ok());
    }

    #[test]
    fn test_no_subscribers_no_error() {
        let broadcaster = ProgressBroadcaster::new();
        let count = broadcaster.send(ProgressEvent::Started(Operation::ExportArchive));
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_in_flight_reports_failure_when_dropped() {
        let broadcaster = ProgressBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        {
            let _guard = broadcaster.begin(Operation::AllureArchive);
        }

        assert_eq!(
            rx.recv().await.unwrap(),
            ProgressEvent::Started(Operation::AllureArchive)
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            ProgressEvent::Finished {
                operation: Operation::AllureArchive,
                success: false
            }
        );
    }

    #[tokio::test]
    async fn test_in_flight_reports_success() {
        let broadcaster = ProgressBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        broadcaster.begin(Operation::Import).succeed();

        let _started = rx.recv().await.unwrap();
        assert_eq!(
            rx.recv().await.unwrap(),
            ProgressEvent::Finished {
                operation: Operation::Import,
                success: true
            }
        );
    }

    #[test]
    fn test_fraction() {
        let half = ProgressEvent::Advanced {
            operation: Operation::Import,
            completed: 1,
            total: 2,
        };
        assert_eq!(half.fraction(), Some(0.5));
        assert_eq!(ProgressEvent::Started(Operation::Import).fraction(), None);
    }
}
