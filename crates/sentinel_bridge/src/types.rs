use std::any::Any;

use sentinel_core::{Endpoint, Outcome, Ticket};

/// Emitted by the request worker back to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    /// An awaited request finished, successfully or not.
    Completed {
        ticket: Ticket,
        endpoint: Endpoint,
        outcome: Outcome,
    },
    /// A timer scheduled with [`crate::BridgeHandle::schedule_close`] fired.
    CloseElapsed { session: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OutboundError {
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("reply is not valid JSON: {0}")]
    Decode(String),
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
}

/// Returned by an inbound handler that could not process its message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandlerError {
    #[error("{0}")]
    Failed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("invalid base url {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build http client: {0}")]
    Client(String),
    #[error("failed to start request runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("request worker stopped")]
    WorkerStopped,
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
