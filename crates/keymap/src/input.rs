//! Discrete input-event delivery.
//!
//! The binding table never scans the keyboard. While a rebind is pending it
//! holds a [`Receiver`] obtained from an [`InputEventSource`]; dropping that
//! receiver is the unsubscribe.

use crate::key_code::KeyCode;
use crossbeam::channel::{self, Receiver, Sender};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// Something that pushes key / button presses to subscribers.
pub trait InputEventSource: Send + Sync {
    /// Open a new subscription. Events published after this call are
    /// delivered until the receiver is dropped.
    fn subscribe(&self) -> Receiver<KeyCode>;
}

/// In-process fan-out bus. The platform layer calls [`InputBus::publish`]
/// for every discrete press it observes.
#[derive(Default)]
pub struct InputBus {
    subscribers: Mutex<Vec<Sender<KeyCode>>>,
}

impl InputBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn subscribers(&self) -> MutexGuard<'_, Vec<Sender<KeyCode>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Deliver `code` to every live subscriber. Disconnected subscribers are
    /// dropped. Returns how many subscribers received the event.
    pub fn publish(&self, code: KeyCode) -> usize {
        let mut subscribers = self.subscribers();
        subscribers.retain(|tx| tx.send(code).is_ok());
        trace!(%code, delivered = subscribers.len(), "input event published");
        subscribers.len()
    }

    /// Number of subscriptions currently registered. Subscriptions whose
    /// receiver was dropped are only noticed on the next publish.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers().len()
    }
}

impl InputEventSource for InputBus {
    fn subscribe(&self) -> Receiver<KeyCode> {
        let (tx, rx) = channel::unbounded();
        self.subscribers().push(tx);
        rx
    }
}
