/*
[INPUT]:  Serialized subscribe/unsubscribe commands from callers
[OUTPUT]: FIFO of commands awaiting an open connection, with wake-ups
[POS]:    WebSocket layer - outbound command buffer
[UPDATE]: When changing queue bounds or overflow policy
*/

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use tracing::warn;

/// Commands waiting to be written to the socket
///
/// The lock is only held for push/pop, never across an await.
#[derive(Debug)]
pub(crate) struct OutboundQueue {
    items: Mutex<VecDeque<String>>,
    notify: Notify,
    capacity: Option<usize>,
}

impl OutboundQueue {
    pub(crate) fn new(capacity: Option<usize>) -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            capacity,
        }
    }

    /// Append a command; a full bounded queue drops it and returns false
    pub(crate) fn push(&self, command: String) -> bool {
        {
            let mut items = self.lock();
            if let Some(capacity) = self.capacity
                && items.len() >= capacity
            {
                warn!(
                    capacity,
                    command = %command,
                    "ws outbound queue full, dropping command"
                );
                return false;
            }
            items.push_back(command);
        }
        self.notify.notify_one();
        true
    }

    /// Put back a command whose send failed so it goes out first next time
    pub(crate) fn push_front(&self, command: String) {
        self.lock().push_front(command);
    }

    pub(crate) fn pop_front(&self) -> Option<String> {
        self.lock().pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    /// Resolves after a push; a push with no waiter is remembered
    pub(crate) async fn notified(&self) {
        self.notify.notified().await;
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
