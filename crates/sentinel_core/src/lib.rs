//! Sentinel core: protocol types, payload normalization, and the pure overlay
//! state machine.
mod effect;
mod msg;
mod normalize;
mod permissions;
mod protocol;
mod state;
mod update;
mod validation;
mod view_model;

pub use effect::Effect;
pub use msg::{Key, Msg};
pub use normalize::{
    ensure_array, ensure_object, normalize_admin_users, normalize_inbound, normalize_inventory,
    normalize_players, normalize_reports, normalize_stats,
};
pub use permissions::{allowed, can, visible_tabs, AdminRank, Capability, Tab};
pub use protocol::{
    Ack, Action, AdminUser, Coords, EntityId, Endpoint, InboundMessage, InventoryItem, Outcome,
    OutboundRequest, Player, PlayerCounts, Report, ReportCounts, ReportStatus, ServerInfo,
    ServerStats, Ticket, DEFAULT_MAX_PLAYERS,
};
pub use state::{AppState, Notice, NoticeKind, Panel, REPORT_CLOSE_DELAY};
pub use update::{update, DEFAULT_DM_MESSAGE, FAULT_FALLBACK};
pub use validation::{validate_report, word_count, ReportDraft, ReportRejection, MIN_REPORT_WORDS};
pub use view_model::{AdminView, AppViewModel, PlayerRowView, ReportFormView, ReportRowView};
