use std::time::Duration;

use crate::protocol::OutboundRequest;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Post(OutboundRequest),
    /// Deliver `Msg::DelayedClose { session }` after `delay`.
    CloseAfter { delay: Duration, session: u64 },
}

impl Effect {
    pub fn as_post(&self) -> Option<&OutboundRequest> {
        match self {
            Effect::Post(request) => Some(request),
            Effect::CloseAfter { .. } => None,
        }
    }
}
