use pretty_assertions::assert_eq;
use sentinel_core::{
    normalize_inbound, update, AppState, EntityId, InboundMessage, Msg, ReportStatus, ServerStats,
};
use serde_json::{json, Value};

fn normalize(raw: Value) -> InboundMessage {
    normalize_inbound(&raw).expect("host message")
}

#[test]
fn sequence_actions_default_to_empty() {
    let malformed = [
        json!({"action": "receiveReports"}),
        json!({"action": "receiveReports", "reports": null}),
        json!({"action": "receiveReports", "reports": "nope"}),
        json!({"action": "receiveReports", "reports": {"id": 1}}),
    ];
    for raw in malformed {
        assert_eq!(normalize(raw), InboundMessage::Reports(Vec::new()));
    }

    let malformed = [
        json!({"action": "receiveOnlinePlayers"}),
        json!({"action": "receiveOnlinePlayers", "players": null}),
        json!({"action": "receiveOnlinePlayers", "players": 42}),
    ];
    for raw in malformed {
        assert_eq!(normalize(raw), InboundMessage::OnlinePlayers(Vec::new()));
    }
}

#[test]
fn sequences_keep_order_and_drop_unusable_entries() {
    let message = normalize(json!({
        "action": "receiveReports",
        "reports": [
            {"id": 3, "title": "Stuck", "status": "in_progress", "playerName": "Ana",
             "submittedAt": 1700000000, "coords": {"x": 1, "y": 2, "z": 3}},
            "garbage",
            {"title": "no id"},
            {"id": "r-1", "status": "weird"}
        ]
    }));
    let InboundMessage::Reports(reports) = message else {
        panic!("expected reports");
    };
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].id, EntityId::Number(3));
    assert_eq!(reports[0].status, ReportStatus::InProgress);
    assert_eq!(reports[0].player_name, "Ana");
    assert_eq!(reports[0].submitted_at, Some(1_700_000_000));
    assert!(reports[0].coords.is_some());
    assert_eq!(reports[1].id, EntityId::Text("r-1".to_string()));
    assert_eq!(reports[1].status, ReportStatus::Unknown);
    assert_eq!(reports[1].player_name, "Unknown");
}

#[test]
fn data_wrapped_sequences_are_unwrapped() {
    let message = normalize(json!({
        "action": "receiveOnlinePlayers",
        "players": {"data": [{"id": 1, "name": "Ana"}]}
    }));
    let InboundMessage::OnlinePlayers(players) = message else {
        panic!("expected players");
    };
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].inventory, None);
}

#[test]
fn stats_get_every_documented_default() {
    assert_eq!(
        normalize(json!({"action": "receiveServerStats"})),
        InboundMessage::ServerStats(ServerStats::default())
    );

    let message = normalize(json!({
        "action": "receiveServerStats",
        "players": {"online": 12},
        "reports": "broken",
        "server": {"name": "Sentinel RP", "version": 2}
    }));
    let InboundMessage::ServerStats(stats) = message else {
        panic!("expected stats");
    };
    assert_eq!(stats.players.online, 12);
    assert_eq!(stats.players.max, 32);
    assert_eq!(stats.reports.total, 0);
    assert_eq!(stats.reports.in_progress, 0);
    assert_eq!(stats.server.name, "Sentinel RP");
    assert_eq!(stats.server.uptime, 0);
    assert_eq!(stats.server.version, "2");
}

#[test]
fn wrapped_stats_are_accepted() {
    let message = normalize(json!({
        "action": "receiveServerStats",
        "stats": {"players": {"online": 3, "max": 0}, "reports": {"open": 2, "inProgress": 1}}
    }));
    let InboundMessage::ServerStats(stats) = message else {
        panic!("expected stats");
    };
    assert_eq!(stats.players.online, 3);
    assert_eq!(stats.players.max, 32);
    assert_eq!(stats.reports.open, 2);
    assert_eq!(stats.reports.in_progress, 1);
}

#[test]
fn inventory_reads_flat_and_wrapped_payloads() {
    let flat = normalize(json!({
        "action": "receivePlayerInventory",
        "playerId": 7,
        "inventory": [{"name": "bread", "count": 2}]
    }));
    let wrapped = normalize(json!({
        "action": "receivePlayerInventory",
        "data": {"playerId": 7, "inventory": [{"name": "bread", "label": "Bread", "count": 2}]}
    }));
    let (
        InboundMessage::PlayerInventory {
            player_id: flat_id,
            inventory: flat_items,
        },
        InboundMessage::PlayerInventory {
            player_id: wrapped_id,
            inventory: wrapped_items,
        },
    ) = (flat, wrapped)
    else {
        panic!("expected inventories");
    };
    assert_eq!(flat_id, Some(EntityId::Number(7)));
    assert_eq!(flat_id, wrapped_id);
    assert_eq!(flat_items[0].label, "bread");
    assert_eq!(wrapped_items[0].label, "Bread");
    assert_eq!(wrapped_items[0].count, 2);
}

#[test]
fn unknown_actions_pass_through() {
    let raw = json!({"action": "setTheme", "theme": "dark"});
    assert_eq!(
        normalize(raw.clone()),
        InboundMessage::Other {
            action: "setTheme".to_string(),
            payload: raw,
        }
    );
}

#[test]
fn messages_without_action_are_ignored() {
    assert_eq!(normalize_inbound(&json!({"players": []})), None);
    assert_eq!(normalize_inbound(&json!({"action": 5})), None);
    assert_eq!(normalize_inbound(&json!([1, 2, 3])), None);
}

#[test]
fn malformed_player_list_renders_zero_rows() {
    let (state, _) = update(
        AppState::new(),
        Msg::Inbound(normalize(
            json!({"action": "openAdminPanel", "adminRank": "moderator"}),
        )),
    );
    let (state, _) = update(
        state,
        Msg::Inbound(normalize(
            json!({"action": "receive-online-players", "players": "not-an-array"}),
        )),
    );

    let view = state.view().admin.expect("admin view");
    assert!(view.players.is_empty());
}
