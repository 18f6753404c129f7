//! Event emitter: delivers events to registered handlers
//!
//! Events are delivered strictly in emission order. For each event every
//! registered handler is consulted in registration order; a handler whose
//! predicate matches runs synchronously before the next one is consulted.
//! A handler that returns an error or panics is logged and skipped, it
//! never stops delivery to the handlers after it.

use std::collections::VecDeque;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::command::Command;
use crate::error::HandlerError;
use crate::event::Event;
use crate::message::Message;

type Predicate = Box<dyn Fn(&Event) -> bool + Send + Sync>;
type Action = Box<dyn Fn(&Event, &DispatchHandle) -> Result<(), HandlerError> + Send + Sync>;

/// Sends commands back into the session that owns it
#[derive(Debug, Clone)]
pub struct DispatchHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl DispatchHandle {
    pub fn new(tx: mpsc::UnboundedSender<Command>) -> Self {
        Self { tx }
    }

    /// Queue `command`; returns false if the session is gone
    pub fn dispatch(&self, command: Command) -> bool {
        self.tx.send(command).is_ok()
    }
}

/// A predicate and the action to run for events it accepts
pub struct EventHandler {
    predicate: Predicate,
    action: Action,
}

impl fmt::Debug for EventHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandler").finish_non_exhaustive()
    }
}

impl EventHandler {
    pub fn new<P, F>(predicate: P, action: F) -> Self
    where
        P: Fn(&Event) -> bool + Send + Sync + 'static,
        F: Fn(&Event, &DispatchHandle) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Self {
            predicate: Box::new(predicate),
            action: Box::new(action),
        }
    }

    /// Events with the given type tag
    pub fn on<F>(name: &'static str, action: F) -> Self
    where
        F: Fn(&Event, &DispatchHandle) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Self::new(move |event| event.name() == name, action)
    }

    /// Events of the given category
    pub fn on_category<F>(category: &'static str, action: F) -> Self
    where
        F: Fn(&Event, &DispatchHandle) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Self::new(move |event| event.category() == Some(category), action)
    }

    /// Every event
    pub fn any<F>(action: F) -> Self
    where
        F: Fn(&Event, &DispatchHandle) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        Self::new(|_| true, action)
    }

    /// Events produced by the command with the given correlation id
    pub fn for_correlation<F>(correlation_id: impl Into<String>, action: F) -> Self
    where
        F: Fn(&Event, &DispatchHandle) -> Result<(), HandlerError> + Send + Sync + 'static,
    {
        let correlation_id = correlation_id.into();
        Self::new(
            move |event| event.correlation_id() == Some(correlation_id.as_str()),
            action,
        )
    }

    pub fn matches(&self, event: &Event) -> bool {
        (self.predicate)(event)
    }
}

/// Identifies a registration for later removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    handlers: Vec<(HandlerId, Arc<EventHandler>)>,
}

/// Ordered list of event handlers owned by one session
///
/// Cloning shares the list. Delivery iterates over a snapshot, so handlers
/// may register or unregister handlers while an event is being delivered;
/// the change applies from the next event on.
#[derive(Clone, Default)]
pub struct EventHandlerRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl fmt::Debug for EventHandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHandlerRegistry")
            .field("handlers", &self.len())
            .finish()
    }
}

impl EventHandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        // a handler panicking never holds this lock, recover anyway
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn register(&self, handler: EventHandler) -> HandlerId {
        let mut inner = self.lock();
        let id = HandlerId(inner.next_id);
        inner.next_id += 1;
        inner.handlers.push((id, Arc::new(handler)));
        id
    }

    /// Remove a registration; returns false if it was already gone
    pub fn unregister(&self, id: HandlerId) -> bool {
        let mut inner = self.lock();
        let before = inner.handlers.len();
        inner.handlers.retain(|(hid, _)| *hid != id);
        inner.handlers.len() != before
    }

    /// Copy of the current handler list, in registration order
    pub fn snapshot(&self) -> Vec<(HandlerId, Arc<EventHandler>)> {
        self.lock().handlers.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().handlers.is_empty()
    }
}

/// FIFO queue of pending events and the loop delivering them
#[derive(Debug)]
pub struct EventEmitter {
    registry: EventHandlerRegistry,
    handle: DispatchHandle,
    queue: VecDeque<Event>,
}

impl EventEmitter {
    pub fn new(registry: EventHandlerRegistry, handle: DispatchHandle) -> Self {
        Self {
            registry,
            handle,
            queue: VecDeque::new(),
        }
    }

    pub fn registry(&self) -> &EventHandlerRegistry {
        &self.registry
    }

    pub fn enqueue(&mut self, events: impl IntoIterator<Item = Event>) {
        self.queue.extend(events);
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Deliver every queued event; returns how many were delivered
    pub fn process(&mut self) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.queue.pop_front() {
            self.deliver(&event);
            delivered += 1;
        }
        delivered
    }

    fn deliver(&self, event: &Event) {
        for (id, handler) in self.registry.snapshot() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                if handler.matches(event) {
                    (handler.action)(event, &self.handle).map(|()| true)
                } else {
                    Ok(false)
                }
            }));

            match outcome {
                Ok(Ok(true)) => debug!(event = event.name(), handler = ?id, "event handled"),
                Ok(Ok(false)) => {}
                Ok(Err(error)) => warn!(
                    event = event.name(),
                    handler = ?id,
                    %error,
                    "event handler failed"
                ),
                Err(payload) => warn!(
                    event = event.name(),
                    handler = ?id,
                    panic = panic_message(payload.as_ref()),
                    "event handler panicked"
                ),
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
