use std::env;
use std::io::{self, BufRead, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use sentinel_bridge::{
    panic_message, BridgeEvent, BridgeHandle, ChannelCompletionSink, EventBridge,
    ReqwestTransport, Subscription,
};
use sentinel_core::{update, Action, AppState, InboundMessage, Msg, Panel};
use sentinel_logging::{sentinel_error, sentinel_info, sentinel_warn};

use super::config::{self, OverlayConfig, DEFAULT_CONFIG_FILE};
use super::effects::{bridge_msg, EffectRunner};
use super::input::{parse_line, Line};
use super::{logging, ui};

/// Actions only routed while the admin panel is visible.
const ADMIN_ACTIONS: [Action; 4] = [
    Action::ReceiveServerStats,
    Action::ReceiveReports,
    Action::ReceiveOnlinePlayers,
    Action::ReceivePlayerInventory,
];

enum Input {
    Line(Line),
    Bridge(BridgeEvent),
    Eof,
}

pub fn run_app() -> anyhow::Result<()> {
    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let loaded = config::load(&config_path);
    let config = match &loaded {
        Ok(Some(config)) => config.clone(),
        _ => OverlayConfig::default(),
    };

    logging::initialize(config.log_destination, config.level_filter());
    match loaded {
        Ok(Some(_)) => sentinel_info!("loaded config from {:?}", config_path),
        Ok(None) => sentinel_info!("no config at {:?}, using defaults", config_path),
        Err(err) => sentinel_warn!("{:#}; using defaults", err),
    }

    let (tx, rx) = mpsc::channel::<Input>();
    let settings = config.outbound_settings();
    sentinel_info!("host endpoints at {}", settings.base_url);
    let transport = ReqwestTransport::new(&settings).context("invalid outbound settings")?;
    let sink = ChannelCompletionSink::new(tx.clone(), Input::Bridge);
    let bridge = BridgeHandle::with_sink(Arc::new(transport), Arc::new(sink))
        .context("failed to start the request worker")?;

    let mut controller = Controller::new(
        EffectRunner::new(bridge),
        config.report_close_delay(),
        io::stdout(),
    );
    spawn_stdin_reader(tx).context("failed to start the input reader")?;

    while let Ok(input) = rx.recv() {
        match input {
            Input::Line(line) => controller.handle_line(line),
            Input::Bridge(event) => controller.dispatch(bridge_msg(event)),
            Input::Eof => break,
        }
    }
    sentinel_info!("input closed, shutting down");
    Ok(())
}

fn spawn_stdin_reader(tx: mpsc::Sender<Input>) -> io::Result<()> {
    thread::Builder::new()
        .name("sentinel-stdin".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        let Some(parsed) = parse_line(&line) else {
                            continue;
                        };
                        if tx.send(Input::Line(parsed)).is_err() {
                            return;
                        }
                    }
                    Err(err) => {
                        sentinel_warn!("stdin read failed: {}", err);
                        break;
                    }
                }
            }
            let _ = tx.send(Input::Eof);
        })?;
    Ok(())
}

type Inbox = Arc<Mutex<Vec<InboundMessage>>>;

/// Owns the overlay state; every message goes through [`Controller::dispatch`].
struct Controller<W: Write> {
    state: AppState,
    events: EventBridge,
    inbox: Inbox,
    _panel_subscriptions: Vec<Subscription>,
    admin_subscriptions: Vec<Subscription>,
    effects: EffectRunner,
    out: W,
}

impl<W: Write> Controller<W> {
    fn new(effects: EffectRunner, close_delay: Duration, out: W) -> Self {
        let events = EventBridge::new().with_reporter(Arc::new(effects.error_reporter()));
        let inbox = Inbox::default();
        let panel_subscriptions = [Action::OpenReport, Action::OpenAdmin]
            .into_iter()
            .map(|action| forward(&events, action, &inbox))
            .collect();
        Self {
            state: AppState::new().with_close_delay(close_delay),
            events,
            inbox,
            _panel_subscriptions: panel_subscriptions,
            admin_subscriptions: Vec::new(),
            effects,
            out,
        }
    }

    fn handle_line(&mut self, line: Line) {
        match line {
            Line::Host(raw) => {
                self.deliver(|events| events.deliver(&raw));
            }
            Line::Ui(msg) => self.dispatch(msg),
            Line::Inject(messages) => {
                // One at a time: an injected open must install the admin
                // subscriptions before the data that follows it.
                for message in messages {
                    let batch = std::slice::from_ref(&message);
                    let injected = self.deliver(|events| events.inject_debug(batch));
                    if injected == 0 {
                        sentinel_warn!("debug injection is disabled in release builds");
                        break;
                    }
                }
            }
        }
    }

    fn deliver(&mut self, route: impl FnOnce(&EventBridge) -> usize) -> usize {
        let routed = route(&self.events);
        let messages = std::mem::take(&mut *lock(&self.inbox));
        for message in messages {
            self.dispatch(Msg::Inbound(message));
        }
        routed
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        sentinel_logging::set_session(state.session());
        let dirty = state.consume_dirty();
        self.state = state;

        self.sync_subscriptions();
        let refused = self.effects.run(effects);
        if dirty {
            self.render();
        }
        for msg in refused {
            self.dispatch(msg);
        }
    }

    fn sync_subscriptions(&mut self) {
        let admin_visible = self.state.panel() == Panel::Admin;
        if admin_visible && self.admin_subscriptions.is_empty() {
            let subscriptions = ADMIN_ACTIONS
                .into_iter()
                .map(|action| forward(&self.events, action, &self.inbox))
                .collect();
            self.admin_subscriptions = subscriptions;
        } else if !admin_visible {
            self.admin_subscriptions.clear();
        }
    }

    fn render(&mut self) {
        let view = self.state.view();
        match panic::catch_unwind(AssertUnwindSafe(|| ui::render::render(&view))) {
            Ok(frame) => {
                if let Err(err) = writeln!(self.out, "{frame}").and_then(|()| self.out.flush()) {
                    sentinel_warn!("failed to write frame: {}", err);
                }
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                sentinel_error!("render failed: {}", message);
                if view.fault.is_none() {
                    self.dispatch(Msg::ViewFault {
                        message,
                        stack: None,
                    });
                }
            }
        }
    }
}

fn forward(events: &EventBridge, action: Action, inbox: &Inbox) -> Subscription {
    let inbox = Arc::clone(inbox);
    events.subscribe(action, move |message| {
        lock(&inbox).push(message.clone());
        Ok(())
    })
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
