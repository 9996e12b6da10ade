//! Inbound routing from the host message channel to typed handlers.
//!
//! Raw messages are normalized once per delivery; every subscriber for the
//! message's action receives the same [`InboundMessage`]. A handler that fails
//! or panics is reported and then handed the action's fallback value, so a
//! single bad payload never leaves a view without data.

use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use sentinel_core::{normalize_inbound, Action, InboundMessage};
use sentinel_logging::{sentinel_debug, sentinel_error, sentinel_info};
use serde_json::Value;

use crate::types::{panic_message, HandlerError};

/// Receives handler failures so they can be forwarded to the host.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, message: &str, stack: Option<&str>);
}

type Handler = dyn FnMut(&InboundMessage) -> Result<(), HandlerError> + Send;

struct Entry {
    action: Action,
    handler: Arc<Mutex<Handler>>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: BTreeMap<u64, Entry>,
}

#[derive(Clone, Default)]
pub struct EventBridge {
    registry: Arc<Mutex<Registry>>,
    reporter: Option<Arc<dyn ErrorReporter>>,
}

impl EventBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Installs `handler` for `action` until the returned guard is dropped.
    pub fn subscribe<F>(&self, action: Action, handler: F) -> Subscription
    where
        F: FnMut(&InboundMessage) -> Result<(), HandlerError> + Send + 'static,
    {
        let mut registry = lock(&self.registry);
        registry.next_id += 1;
        let id = registry.next_id;
        sentinel_debug!("subscribing #{} to {}", id, action);
        registry.entries.insert(
            id,
            Entry {
                action,
                handler: Arc::new(Mutex::new(handler)),
            },
        );
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    pub fn subscriber_count(&self, action: &Action) -> usize {
        lock(&self.registry)
            .entries
            .values()
            .filter(|entry| &entry.action == action)
            .count()
    }

    /// Routes one raw host message. Returns how many handlers ran.
    pub fn deliver(&self, raw: &Value) -> usize {
        let Some(name) = raw.get("action").and_then(Value::as_str) else {
            sentinel_debug!("ignoring host message without an action");
            return 0;
        };
        let action = Action::from_wire(name);

        // Handlers run outside the registry lock so they may (un)subscribe.
        let handlers: Vec<Arc<Mutex<Handler>>> = lock(&self.registry)
            .entries
            .values()
            .filter(|entry| entry.action == action)
            .map(|entry| Arc::clone(&entry.handler))
            .collect();
        if handlers.is_empty() {
            sentinel_debug!("no subscriber for {}", name);
            return 0;
        }

        let Some(message) = normalize_inbound(raw) else {
            return 0;
        };
        for handler in &handlers {
            self.dispatch(handler, &message);
        }
        handlers.len()
    }

    /// Feeds synthetic host messages through [`Self::deliver`] in debug builds.
    ///
    /// Release builds ignore the call and return 0.
    pub fn inject_debug(&self, messages: &[Value]) -> usize {
        if !cfg!(debug_assertions) {
            return 0;
        }
        sentinel_info!("injecting {} debug message(s)", messages.len());
        for message in messages {
            self.deliver(message);
        }
        messages.len()
    }

    fn dispatch(&self, handler: &Mutex<Handler>, message: &InboundMessage) {
        let failure = match invoke(handler, message) {
            Ok(()) => return,
            Err(failure) => failure,
        };
        let action = message.action();
        sentinel_error!("handler for {} failed: {}", action, failure);
        if let Some(reporter) = &self.reporter {
            reporter.report(&format!("handler for {action} failed: {failure}"), None);
        }

        let fallback = InboundMessage::fallback(&action);
        if let Err(again) = invoke(handler, &fallback) {
            sentinel_error!("fallback for {} failed as well: {}", action, again);
        }
    }
}

fn invoke(handler: &Mutex<Handler>, message: &InboundMessage) -> Result<(), String> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut handler = lock(handler);
        (&mut *handler)(message)
    }));
    match result {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(err.to_string()),
        Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

// A handler that panicked poisons only its own lock; keep serving it.
fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Keeps a handler installed. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if lock(&registry).entries.remove(&self.id).is_some() {
                sentinel_debug!("unsubscribed #{}", self.id);
            }
        }
    }
}
