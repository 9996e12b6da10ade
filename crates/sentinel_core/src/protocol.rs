//! Wire-level vocabulary shared by the host and the overlay.
//!
//! Inbound messages are only built by [`crate::normalize_inbound`]; the types
//! here are the shapes a view may rely on once that step has run.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::permissions::AdminRank;

/// Identifier echoed back to the host in the JSON shape it was received in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Number(i64),
    Text(String),
}

impl EntityId {
    /// Accepts integral numbers and non-empty strings.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.is_finite() && f.fract() == 0.0)
                        .map(|f| f as i64)
                })
                .map(EntityId::Number),
            Value::String(s) if !s.trim().is_empty() => Some(EntityId::Text(s.trim().to_string())),
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            EntityId::Number(n) => Value::from(*n),
            EntityId::Text(s) => Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Number(n) => write!(f, "{n}"),
            EntityId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        EntityId::Number(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        EntityId::Text(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReportStatus {
    #[default]
    Open,
    InProgress,
    Closed,
    Unknown,
}

impl ReportStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "open" => ReportStatus::Open,
            "in_progress" | "inprogress" | "in-progress" => ReportStatus::InProgress,
            "closed" => ReportStatus::Closed,
            _ => ReportStatus::Unknown,
        }
    }

    pub fn as_wire(self) -> &'static str {
        match self {
            ReportStatus::Open => "open",
            ReportStatus::InProgress => "in_progress",
            ReportStatus::Closed => "closed",
            ReportStatus::Unknown => "unknown",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportStatus::Open => "Open",
            ReportStatus::InProgress => "In Progress",
            ReportStatus::Closed => "Closed",
            ReportStatus::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coords {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub id: EntityId,
    pub title: String,
    pub content: String,
    pub status: ReportStatus,
    pub notes: String,
    pub player_name: String,
    pub player_identifier: String,
    pub player_id: Option<EntityId>,
    /// Unix seconds.
    pub submitted_at: Option<i64>,
    pub coords: Option<Coords>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryItem {
    pub name: String,
    pub label: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: EntityId,
    pub name: String,
    pub identifier: String,
    /// `None` until the host answered a `getPlayerInventory` request.
    pub inventory: Option<Vec<InventoryItem>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser {
    pub identifier: String,
    pub name: String,
    pub rank: String,
    pub assigned_by: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerCounts {
    pub online: u32,
    pub max: u32,
}

impl Default for PlayerCounts {
    fn default() -> Self {
        Self {
            online: 0,
            max: DEFAULT_MAX_PLAYERS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReportCounts {
    pub total: u32,
    pub open: u32,
    pub in_progress: u32,
    pub closed: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    pub name: String,
    /// Seconds.
    pub uptime: u64,
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: "Unknown".to_string(),
            uptime: 0,
            version: "1.0.0".to_string(),
        }
    }
}

pub const DEFAULT_MAX_PLAYERS: u32 = 32;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerStats {
    pub players: PlayerCounts,
    pub reports: ReportCounts,
    pub server: ServerInfo,
}

impl ServerStats {
    pub fn capacity_percent(&self) -> u32 {
        percent(self.players.online, self.players.max)
    }

    pub fn closed_percent(&self) -> u32 {
        percent(self.reports.closed, self.reports.total)
    }
}

fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((f64::from(part) / f64::from(whole)) * 100.0).round() as u32
}

/// Inbound action discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Action {
    OpenReport,
    OpenAdmin,
    ReceiveServerStats,
    ReceiveReports,
    ReceiveOnlinePlayers,
    ReceivePlayerInventory,
    Other(String),
}

impl Action {
    /// Maps both the host's names and their kebab-case aliases.
    pub fn from_wire(name: &str) -> Self {
        match name {
            "openReportUI" | "open-report" => Action::OpenReport,
            "openAdminPanel" | "open-admin" => Action::OpenAdmin,
            "receiveServerStats" | "receive-server-stats" => Action::ReceiveServerStats,
            "receiveReports" | "receive-reports" => Action::ReceiveReports,
            "receiveOnlinePlayers" | "receive-online-players" => Action::ReceiveOnlinePlayers,
            "receivePlayerInventory" | "receive-player-inventory" => {
                Action::ReceivePlayerInventory
            }
            other => Action::Other(other.to_string()),
        }
    }

    pub fn wire_name(&self) -> &str {
        match self {
            Action::OpenReport => "openReportUI",
            Action::OpenAdmin => "openAdminPanel",
            Action::ReceiveServerStats => "receiveServerStats",
            Action::ReceiveReports => "receiveReports",
            Action::ReceiveOnlinePlayers => "receiveOnlinePlayers",
            Action::ReceivePlayerInventory => "receivePlayerInventory",
            Action::Other(name) => name,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Host message after normalization. One variant per known action.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    OpenReport,
    OpenAdmin {
        rank: Option<AdminRank>,
    },
    ServerStats(ServerStats),
    Reports(Vec<Report>),
    OnlinePlayers(Vec<Player>),
    PlayerInventory {
        player_id: Option<EntityId>,
        inventory: Vec<InventoryItem>,
    },
    Other {
        action: String,
        payload: Value,
    },
}

impl InboundMessage {
    pub fn action(&self) -> Action {
        match self {
            InboundMessage::OpenReport => Action::OpenReport,
            InboundMessage::OpenAdmin { .. } => Action::OpenAdmin,
            InboundMessage::ServerStats(_) => Action::ReceiveServerStats,
            InboundMessage::Reports(_) => Action::ReceiveReports,
            InboundMessage::OnlinePlayers(_) => Action::ReceiveOnlinePlayers,
            InboundMessage::PlayerInventory { .. } => Action::ReceivePlayerInventory,
            InboundMessage::Other { action, .. } => Action::Other(action.clone()),
        }
    }

    /// Safe value delivered to a handler after its first attempt failed.
    pub fn fallback(action: &Action) -> Self {
        match action {
            Action::OpenReport => InboundMessage::OpenReport,
            Action::OpenAdmin => InboundMessage::OpenAdmin { rank: None },
            Action::ReceiveServerStats => InboundMessage::ServerStats(ServerStats::default()),
            Action::ReceiveReports => InboundMessage::Reports(Vec::new()),
            Action::ReceiveOnlinePlayers => InboundMessage::OnlinePlayers(Vec::new()),
            Action::ReceivePlayerInventory => InboundMessage::PlayerInventory {
                player_id: None,
                inventory: Vec::new(),
            },
            Action::Other(name) => InboundMessage::Other {
                action: name.clone(),
                payload: Value::Null,
            },
        }
    }
}

/// Host endpoints reachable from the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CloseReportUi,
    CloseAdminPanel,
    GetServerStats,
    GetReports,
    GetOnlinePlayers,
    GetAdminUsers,
    RefreshData,
    UpdatePlayerRank,
    GetPlayerInventory,
    TeleportToPlayer,
    SummonPlayer,
    SendDiscordDm,
    TeleportToReport,
    CopyCoordinates,
    UpdateReportStatus,
    SubmitReport,
    ReportError,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::CloseReportUi => "closeReportUI",
            Endpoint::CloseAdminPanel => "closeAdminPanel",
            Endpoint::GetServerStats => "getServerStats",
            Endpoint::GetReports => "getReports",
            Endpoint::GetOnlinePlayers => "getOnlinePlayers",
            Endpoint::GetAdminUsers => "getAdminUsers",
            Endpoint::RefreshData => "refreshData",
            Endpoint::UpdatePlayerRank => "updatePlayerRank",
            Endpoint::GetPlayerInventory => "getPlayerInventory",
            Endpoint::TeleportToPlayer => "teleportToPlayer",
            Endpoint::SummonPlayer => "summonPlayer",
            Endpoint::SendDiscordDm => "sendDiscordDM",
            Endpoint::TeleportToReport => "teleportToReport",
            Endpoint::CopyCoordinates => "copyCoordinates",
            Endpoint::UpdateReportStatus => "updateReportStatus",
            Endpoint::SubmitReport => "submitReport",
            Endpoint::ReportError => "reportError",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Correlates an awaited request with the session that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket {
    pub id: u64,
    pub session: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub endpoint: Endpoint,
    pub body: Value,
    /// Present when the caller waits for the reply.
    pub ticket: Option<Ticket>,
}

impl OutboundRequest {
    pub fn notify(endpoint: Endpoint, body: Value) -> Self {
        Self {
            endpoint,
            body,
            ticket: None,
        }
    }

    pub fn awaited(endpoint: Endpoint, body: Value, ticket: Ticket) -> Self {
        Self {
            endpoint,
            body,
            ticket: Some(ticket),
        }
    }
}

/// Result of an awaited request as seen by the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Replied(Option<Value>),
    Failed(String),
}

/// `{ success, message }` acknowledgement some endpoints answer with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ack {
    pub success: bool,
    pub message: Option<String>,
}

impl Ack {
    pub fn from_reply(reply: Option<&Value>) -> Self {
        let Some(Value::Object(map)) = reply else {
            return Ack::default();
        };
        Ack {
            success: map.get("success").and_then(Value::as_bool).unwrap_or(false),
            message: map
                .get("message")
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(ToOwned::to_owned),
        }
    }
}
