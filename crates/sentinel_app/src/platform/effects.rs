use sentinel_bridge::{BridgeError, BridgeEvent, BridgeHandle, HostErrorReporter};
use sentinel_core::{Effect, Msg, Outcome, Ticket};
use sentinel_logging::{sentinel_debug, sentinel_error, sentinel_info};

pub struct EffectRunner {
    bridge: BridgeHandle,
}

impl EffectRunner {
    pub fn new(bridge: BridgeHandle) -> Self {
        Self { bridge }
    }

    /// Hands effects to the bridge. Effects the bridge refused come back as
    /// the messages their completion would have produced.
    pub fn run(&self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut refused = Vec::new();
        for effect in effects {
            match effect {
                Effect::Post(request) => {
                    sentinel_info!(
                        "POST {} awaited={}",
                        request.endpoint,
                        request.ticket.is_some()
                    );
                    let ticket = request.ticket;
                    if let Err(err) = self.bridge.submit(request) {
                        sentinel_error!("request dropped: {}", err);
                        refused.extend(ticket.map(|ticket| failed_reply(ticket, &err)));
                    }
                }
                Effect::CloseAfter { delay, session } => {
                    sentinel_debug!("closing session {} in {:?}", session, delay);
                    if let Err(err) = self.bridge.schedule_close(delay, session) {
                        sentinel_error!("close timer dropped: {}; closing now", err);
                        refused.push(Msg::DelayedClose { session });
                    }
                }
            }
        }
        refused
    }

    pub fn error_reporter(&self) -> HostErrorReporter {
        self.bridge.error_reporter()
    }
}

fn failed_reply(ticket: Ticket, err: &BridgeError) -> Msg {
    Msg::ResponseArrived {
        ticket,
        outcome: Outcome::Failed(err.to_string()),
    }
}

pub fn bridge_msg(event: BridgeEvent) -> Msg {
    match event {
        BridgeEvent::Completed {
            ticket, outcome, ..
        } => Msg::ResponseArrived { ticket, outcome },
        BridgeEvent::CloseElapsed { session } => Msg::DelayedClose { session },
    }
}
