use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use sentinel_core::{Endpoint, OutboundRequest};
use sentinel_logging::{sentinel_debug, sentinel_warn};
use serde_json::json;

use crate::events::ErrorReporter;
use crate::outbound::{OutboundClient, OutboundSettings, ReqwestTransport, Transport};
use crate::{BridgeError, BridgeEvent};

pub(crate) enum BridgeCommand {
    Send(OutboundRequest),
    CloseAfter { delay: Duration, session: u64 },
}

/// Where the worker delivers [`BridgeEvent`]s.
pub trait CompletionSink: Send + Sync {
    fn emit(&self, event: BridgeEvent);
}

pub struct ChannelCompletionSink<T> {
    tx: mpsc::Sender<T>,
    wrap: fn(BridgeEvent) -> T,
}

impl<T: Send> ChannelCompletionSink<T> {
    /// Wraps each event with `wrap` before sending it on `tx`.
    pub fn new(tx: mpsc::Sender<T>, wrap: fn(BridgeEvent) -> T) -> Self {
        Self { tx, wrap }
    }
}

impl<T: Send> CompletionSink for ChannelCompletionSink<T> {
    fn emit(&self, event: BridgeEvent) {
        if self.tx.send((self.wrap)(event)).is_err() {
            sentinel_debug!("completion dropped, receiver is gone");
        }
    }
}

/// Runs outbound requests and timers on a background tokio runtime.
pub struct BridgeHandle {
    cmd_tx: mpsc::Sender<BridgeCommand>,
    event_rx: Option<mpsc::Receiver<BridgeEvent>>,
}

impl BridgeHandle {
    /// HTTP transport with completions readable through [`Self::try_recv`].
    pub fn new(settings: &OutboundSettings) -> Result<Self, BridgeError> {
        let transport = ReqwestTransport::new(settings)?;
        Self::with_transport(Arc::new(transport))
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Result<Self, BridgeError> {
        let (event_tx, event_rx) = mpsc::channel();
        let sink = ChannelCompletionSink::new(event_tx, std::convert::identity);
        let mut handle = Self::with_sink(transport, Arc::new(sink))?;
        handle.event_rx = Some(event_rx);
        Ok(handle)
    }

    /// Completions go to `sink`; [`Self::try_recv`] always returns `None`.
    pub fn with_sink(
        transport: Arc<dyn Transport>,
        sink: Arc<dyn CompletionSink>,
    ) -> Result<Self, BridgeError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("sentinel-bridge")
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let client = OutboundClient::new(transport);

        thread::Builder::new()
            .name("sentinel-bridge-dispatch".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    let client = client.clone();
                    let sink = Arc::clone(&sink);
                    runtime.spawn(async move {
                        handle_command(&client, command, sink.as_ref()).await;
                    });
                }
                sentinel_debug!("bridge command channel closed");
            })?;

        Ok(Self {
            cmd_tx,
            event_rx: None,
        })
    }

    pub fn submit(&self, request: OutboundRequest) -> Result<(), BridgeError> {
        self.command(BridgeCommand::Send(request))
    }

    /// Emits [`BridgeEvent::CloseElapsed`] for `session` after `delay`.
    pub fn schedule_close(&self, delay: Duration, session: u64) -> Result<(), BridgeError> {
        self.command(BridgeCommand::CloseAfter { delay, session })
    }

    pub fn try_recv(&self) -> Option<BridgeEvent> {
        self.event_rx.as_ref()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<BridgeEvent> {
        self.event_rx.as_ref()?.recv_timeout(timeout).ok()
    }

    /// Reporter that forwards failures to the host's `reportError` endpoint.
    pub fn error_reporter(&self) -> HostErrorReporter {
        HostErrorReporter {
            cmd_tx: self.cmd_tx.clone(),
        }
    }

    fn command(&self, command: BridgeCommand) -> Result<(), BridgeError> {
        self.cmd_tx
            .send(command)
            .map_err(|_| BridgeError::WorkerStopped)
    }
}

async fn handle_command(
    client: &OutboundClient,
    command: BridgeCommand,
    sink: &dyn CompletionSink,
) {
    match command {
        BridgeCommand::Send(request) => {
            let endpoint = request.endpoint;
            let ticket = request.ticket;
            if let (Some(outcome), Some(ticket)) = (client.send(&request).await, ticket) {
                sink.emit(BridgeEvent::Completed {
                    ticket,
                    endpoint,
                    outcome,
                });
            }
        }
        BridgeCommand::CloseAfter { delay, session } => {
            tokio::time::sleep(delay).await;
            sink.emit(BridgeEvent::CloseElapsed { session });
        }
    }
}

#[derive(Clone)]
pub struct HostErrorReporter {
    cmd_tx: mpsc::Sender<BridgeCommand>,
}

impl ErrorReporter for HostErrorReporter {
    fn report(&self, message: &str, stack: Option<&str>) {
        let request = OutboundRequest::notify(
            Endpoint::ReportError,
            json!({
                "message": message,
                "stack": stack.unwrap_or("No stack available"),
            }),
        );
        if self.cmd_tx.send(BridgeCommand::Send(request)).is_err() {
            sentinel_warn!("could not report error, bridge worker stopped: {}", message);
        }
    }
}
