//! Sentinel bridge: inbound host message routing and outbound host requests.
mod events;
mod handle;
mod outbound;
mod types;

pub use events::{ErrorReporter, EventBridge, Subscription};
pub use handle::{BridgeHandle, ChannelCompletionSink, CompletionSink, HostErrorReporter};
pub use outbound::{
    OutboundClient, OutboundSettings, ReqwestTransport, Transport, JSON_CONTENT_TYPE,
};
pub use types::{panic_message, BridgeError, BridgeEvent, HandlerError, OutboundError};
