//! Coercion of untrusted host payloads into the shapes views rely on.
//!
//! Every function here is total: malformed input degrades to documented
//! defaults and a warning, never to an error.

use std::sync::LazyLock;

use sentinel_logging::{sentinel_debug, sentinel_warn};
use serde_json::{Map, Value};

use crate::permissions::AdminRank;
use crate::protocol::{
    Action, AdminUser, Coords, EntityId, InboundMessage, InventoryItem, Player, PlayerCounts,
    Report, ReportCounts, ReportStatus, ServerInfo, ServerStats, DEFAULT_MAX_PLAYERS,
};

static EMPTY_OBJECT: LazyLock<Map<String, Value>> = LazyLock::new(Map::new);

/// Returns the array itself, the array under a `data` wrapper, or `[]`.
pub fn ensure_array(value: Option<&Value>) -> &[Value] {
    match value {
        Some(Value::Array(items)) => items.as_slice(),
        Some(Value::Object(map)) => match map.get("data") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => {
                sentinel_warn!("expected a sequence, got an object; using []");
                &[]
            }
        },
        None | Some(Value::Null) => &[],
        Some(other) => {
            sentinel_warn!("expected a sequence, got {}; using []", kind_of(other));
            &[]
        }
    }
}

/// Returns the object itself or an empty object.
pub fn ensure_object(value: Option<&Value>) -> &Map<String, Value> {
    match value {
        Some(Value::Object(map)) => map,
        None | Some(Value::Null) => &*EMPTY_OBJECT,
        Some(other) => {
            sentinel_warn!("expected a record, got {}; using {{}}", kind_of(other));
            &*EMPTY_OBJECT
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn text(map: &Map<String, Value>, key: &str, default: &str) -> String {
    match map.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

fn unsigned(map: &Map<String, Value>, key: &str, default: u64) -> u64 {
    match map.get(key) {
        Some(Value::Number(n)) => n.as_u64().unwrap_or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= 0.0)
                .map_or(default, |f| f as u64)
        }),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        _ => default,
    }
}

fn count(map: &Map<String, Value>, key: &str, default: u32) -> u32 {
    u32::try_from(unsigned(map, key, u64::from(default))).unwrap_or(u32::MAX)
}

fn float(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|f: &f64| f.is_finite())
}

/// Applies defaults recursively: `players {online 0, max 32}`,
/// `reports {0,0,0,0}`, `server {"Unknown", 0, "1.0.0"}`.
pub fn normalize_stats(raw: &Value) -> ServerStats {
    let root = ensure_object(Some(raw));
    let players = ensure_object(root.get("players"));
    let reports = ensure_object(root.get("reports"));
    let server = ensure_object(root.get("server"));
    let defaults = ServerInfo::default();

    let max = match count(players, "max", DEFAULT_MAX_PLAYERS) {
        0 => DEFAULT_MAX_PLAYERS,
        max => max,
    };

    ServerStats {
        players: PlayerCounts {
            online: count(players, "online", 0),
            max,
        },
        reports: ReportCounts {
            total: count(reports, "total", 0),
            open: count(reports, "open", 0),
            in_progress: count(reports, "inProgress", 0),
            closed: count(reports, "closed", 0),
        },
        server: ServerInfo {
            name: text(server, "name", &defaults.name),
            uptime: unsigned(server, "uptime", defaults.uptime),
            version: text(server, "version", &defaults.version),
        },
    }
}

fn record_id(map: &Map<String, Value>, key: &str, kind: &str) -> Option<EntityId> {
    let id = map.get(key).and_then(EntityId::from_value);
    if id.is_none() {
        sentinel_warn!("dropping {kind} without a usable `{key}`");
    }
    id
}

fn records<'a, T>(
    items: &'a [Value],
    kind: &'static str,
    mut build: impl FnMut(&'a Map<String, Value>) -> Option<T>,
) -> Vec<T> {
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(map) => build(map),
            other => {
                sentinel_warn!("dropping {kind} entry that is {}", kind_of(other));
                None
            }
        })
        .collect()
}

fn coords(value: Option<&Value>) -> Option<Coords> {
    let map = value?.as_object()?;
    Some(Coords {
        x: float(map.get("x"))?,
        y: float(map.get("y"))?,
        z: float(map.get("z"))?,
    })
}

pub fn normalize_reports(value: Option<&Value>) -> Vec<Report> {
    records(ensure_array(value), "report", |map| {
        Some(Report {
            id: record_id(map, "id", "report")?,
            title: text(map, "title", ""),
            content: text(map, "content", ""),
            status: map
                .get("status")
                .and_then(Value::as_str)
                .map_or(ReportStatus::Unknown, ReportStatus::parse),
            notes: text(map, "notes", ""),
            player_name: text(map, "playerName", "Unknown"),
            player_identifier: text(map, "playerIdentifier", ""),
            player_id: map.get("playerId").and_then(EntityId::from_value),
            submitted_at: map
                .get("submittedAt")
                .and_then(|v| v.as_i64().or_else(|| float(Some(v)).map(|f| f as i64))),
            coords: coords(map.get("coords")),
        })
    })
}

pub fn normalize_inventory(value: Option<&Value>) -> Vec<InventoryItem> {
    records(ensure_array(value), "inventory item", |map| {
        let name = text(map, "name", "");
        let label = match map.get("label").and_then(Value::as_str) {
            Some(label) if !label.trim().is_empty() => label.to_string(),
            _ => name.clone(),
        };
        Some(InventoryItem {
            name,
            label,
            count: count(map, "count", 0),
        })
    })
}

pub fn normalize_players(value: Option<&Value>) -> Vec<Player> {
    records(ensure_array(value), "player", |map| {
        Some(Player {
            id: record_id(map, "id", "player")?,
            name: text(map, "name", "Unknown"),
            identifier: text(map, "identifier", ""),
            inventory: match map.get("inventory") {
                Some(value @ (Value::Array(_) | Value::Object(_))) => {
                    Some(normalize_inventory(Some(value)))
                }
                _ => None,
            },
        })
    })
}

pub fn normalize_admin_users(value: Option<&Value>) -> Vec<AdminUser> {
    records(ensure_array(value), "admin user", |map| {
        let identifier = text(map, "identifier", "");
        if identifier.trim().is_empty() {
            sentinel_warn!("dropping admin user without an identifier");
            return None;
        }
        Some(AdminUser {
            identifier,
            name: text(map, "name", "Unknown"),
            rank: text(map, "rank", ""),
            assigned_by: text(map, "assignedBy", ""),
            updated_at: text(map, "updatedAt", ""),
        })
    })
}

/// Builds the typed message for a raw host message.
///
/// Returns `None` when `raw` is not an object or carries no string `action`.
pub fn normalize_inbound(raw: &Value) -> Option<InboundMessage> {
    let Some(map) = raw.as_object() else {
        sentinel_debug!("ignoring non-object host message");
        return None;
    };
    let Some(name) = map.get("action").and_then(Value::as_str) else {
        sentinel_debug!("ignoring host message without an action");
        return None;
    };

    let message = match Action::from_wire(name) {
        Action::OpenReport => InboundMessage::OpenReport,
        Action::OpenAdmin => {
            let raw_rank = map.get("adminRank").and_then(Value::as_str);
            let rank = raw_rank.and_then(AdminRank::parse);
            if rank.is_none() {
                sentinel_warn!("admin panel opened with unknown rank {:?}", raw_rank);
            }
            InboundMessage::OpenAdmin { rank }
        }
        Action::ReceiveServerStats => {
            // Older hosts wrap the record in `stats`.
            let source = match map.get("stats") {
                Some(stats @ Value::Object(_)) => stats,
                _ => raw,
            };
            InboundMessage::ServerStats(normalize_stats(source))
        }
        Action::ReceiveReports => InboundMessage::Reports(normalize_reports(map.get("reports"))),
        Action::ReceiveOnlinePlayers => {
            InboundMessage::OnlinePlayers(normalize_players(map.get("players")))
        }
        Action::ReceivePlayerInventory => {
            let source = match map.get("data") {
                Some(Value::Object(inner)) => inner,
                _ => map,
            };
            InboundMessage::PlayerInventory {
                player_id: source.get("playerId").and_then(EntityId::from_value),
                inventory: normalize_inventory(source.get("inventory")),
            }
        }
        Action::Other(action) => InboundMessage::Other {
            action,
            payload: raw.clone(),
        },
    };
    Some(message)
}
