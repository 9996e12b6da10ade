use std::sync::Once;

use pretty_assertions::assert_eq;
use sentinel_core::{
    normalize_inbound, update, AdminRank, AppState, Effect, Endpoint, Key, Msg, OutboundRequest,
    Panel, Tab,
};
use serde_json::{json, Value};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(sentinel_logging::initialize_for_tests);
}

fn inbound(raw: Value) -> Msg {
    Msg::Inbound(normalize_inbound(&raw).expect("host message"))
}

fn posts(effects: &[Effect]) -> Vec<&OutboundRequest> {
    effects.iter().filter_map(Effect::as_post).collect()
}

fn endpoints(effects: &[Effect]) -> Vec<Endpoint> {
    posts(effects).iter().map(|request| request.endpoint).collect()
}

fn open_admin(rank: &str) -> (AppState, Vec<Effect>) {
    update(
        AppState::new(),
        inbound(json!({"action": "openAdminPanel", "adminRank": rank})),
    )
}

#[test]
fn open_report_shows_report_panel() {
    init_logging();
    let (mut state, effects) = update(AppState::new(), inbound(json!({"action": "openReportUI"})));

    assert_eq!(state.panel(), Panel::Report);
    assert!(state.view().visible());
    assert!(state.view().report_form.is_some());
    assert!(effects.is_empty());
    assert!(state.consume_dirty());
}

#[test]
fn closing_report_emits_one_close_request() {
    init_logging();
    let (state, _) = update(AppState::new(), inbound(json!({"action": "openReportUI"})));
    let (state, effects) = update(state, Msg::CloseClicked);

    assert_eq!(state.panel(), Panel::Hidden);
    assert_eq!(endpoints(&effects), vec![Endpoint::CloseReportUi]);
    assert_eq!(posts(&effects)[0].body, json!({}));
    assert_eq!(posts(&effects)[0].ticket, None);
}

#[test]
fn closing_admin_emits_one_close_request() {
    init_logging();
    let (state, _) = open_admin("moderator");
    let (state, effects) = update(state, Msg::CloseClicked);

    assert_eq!(state.panel(), Panel::Hidden);
    assert_eq!(state.admin_rank(), None);
    assert_eq!(endpoints(&effects), vec![Endpoint::CloseAdminPanel]);
}

#[test]
fn escape_closes_visible_panel_like_the_close_button() {
    init_logging();
    let (state, _) = open_admin("supporter");
    let (state, effects) = update(state, Msg::KeyPressed(Key::Escape));

    assert_eq!(state.panel(), Panel::Hidden);
    assert_eq!(endpoints(&effects), vec![Endpoint::CloseAdminPanel]);

    let (state, effects) = update(state, Msg::KeyPressed(Key::Escape));
    assert_eq!(state.panel(), Panel::Hidden);
    assert!(effects.is_empty());
}

#[test]
fn other_keys_are_ignored() {
    init_logging();
    let (state, _) = update(AppState::new(), inbound(json!({"action": "openReportUI"})));
    let (state, effects) = update(state, Msg::KeyPressed(Key::from_name("F8")));

    assert_eq!(state.panel(), Panel::Report);
    assert!(effects.is_empty());
}

#[test]
fn opening_admin_requests_what_the_rank_may_see() {
    init_logging();
    let (state, effects) = open_admin("supporter");
    assert_eq!(state.admin_rank(), Some(AdminRank::Supporter));
    assert_eq!(
        endpoints(&effects),
        vec![Endpoint::GetServerStats, Endpoint::GetReports]
    );
    assert!(state.view().admin.expect("admin view").loading);

    let (_, effects) = open_admin("leitung");
    assert_eq!(
        endpoints(&effects),
        vec![
            Endpoint::GetServerStats,
            Endpoint::GetReports,
            Endpoint::GetOnlinePlayers,
            Endpoint::GetAdminUsers,
        ]
    );
}

#[test]
fn unknown_rank_opens_panel_without_requests() {
    init_logging();
    let (state, effects) = open_admin("owner");

    assert_eq!(state.panel(), Panel::Admin);
    assert_eq!(state.admin_rank(), None);
    assert!(effects.is_empty());
    let view = state.view().admin.expect("admin view");
    assert!(view.visible_tabs.is_empty());
    assert_eq!(view.rank_label, "Unknown");
}

#[test]
fn denied_tab_is_not_activated() {
    init_logging();
    let (state, _) = open_admin("moderator");
    let (state, _) = update(state, Msg::TabSelected(Tab::Permissions));
    assert_eq!(state.view().admin.unwrap().active_tab, Tab::Dashboard);

    let (state, _) = update(state, Msg::TabSelected(Tab::Players));
    assert_eq!(state.view().admin.unwrap().active_tab, Tab::Players);
}

#[test]
fn reopening_admin_keeps_panel_data_and_resets_denied_tab() {
    init_logging();
    let (state, _) = open_admin("administrator");
    let session = state.session();
    let (state, _) = update(
        state,
        inbound(json!({"action": "receiveOnlinePlayers", "players": [{"id": 4, "name": "Kim"}]})),
    );
    let (state, _) = update(state, Msg::TabSelected(Tab::Permissions));

    let (state, effects) = update(
        state,
        inbound(json!({"action": "openAdminPanel", "adminRank": "moderator"})),
    );

    assert_eq!(state.session(), session);
    assert_eq!(state.admin_rank(), Some(AdminRank::Moderator));
    let view = state.view().admin.unwrap();
    assert_eq!(view.active_tab, Tab::Dashboard);
    assert_eq!(view.players.len(), 1);
    assert_eq!(
        endpoints(&effects),
        vec![
            Endpoint::GetServerStats,
            Endpoint::GetReports,
            Endpoint::GetOnlinePlayers,
        ]
    );

    let (_, effects) = update(
        state,
        inbound(json!({"action": "openAdminPanel", "adminRank": "moderator"})),
    );
    assert!(effects.is_empty());
}

#[test]
fn switching_panels_starts_a_new_session() {
    init_logging();
    let (state, _) = update(AppState::new(), inbound(json!({"action": "openReportUI"})));
    let (state, _) = update(state, Msg::ReportTitleChanged("Stuck".to_string()));
    let report_session = state.session();

    let (state, _) = update(
        state,
        inbound(json!({"action": "openAdminPanel", "adminRank": "supporter"})),
    );
    assert_eq!(state.panel(), Panel::Admin);
    assert!(state.session() > report_session);

    let (state, _) = update(state, inbound(json!({"action": "openReportUI"})));
    assert_eq!(state.view().report_form.unwrap().title, "");
}

#[test]
fn reopening_report_keeps_the_form() {
    init_logging();
    let (state, _) = update(AppState::new(), inbound(json!({"action": "open-report"})));
    let (state, _) = update(state, Msg::ReportTitleChanged("Car fell".to_string()));
    let (state, _) = update(state, inbound(json!({"action": "open-report"})));

    assert_eq!(state.view().report_form.unwrap().title, "Car fell");
}

#[test]
fn data_messages_are_dropped_while_admin_is_hidden() {
    init_logging();
    let state = AppState::new();
    let (mut next, effects) = update(
        state.clone(),
        inbound(json!({"action": "receiveReports", "reports": [{"id": 1}]})),
    );

    assert_eq!(state, next);
    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
}

#[test]
fn view_fault_shows_fallback_and_reports_to_host() {
    init_logging();
    let (state, _) = open_admin("supporter");
    let (state, effects) = update(
        state,
        Msg::ViewFault {
            message: "index out of bounds".to_string(),
            stack: None,
        },
    );

    assert_eq!(
        state.view().fault.as_deref(),
        Some(sentinel_core::FAULT_FALLBACK)
    );
    assert_eq!(endpoints(&effects), vec![Endpoint::ReportError]);
    assert_eq!(
        posts(&effects)[0].body,
        json!({"message": "index out of bounds", "stack": "No stack available"})
    );

    let (state, _) = update(state, Msg::CloseClicked);
    assert_eq!(state.view().fault, None);
}
