use sentinel_logging::{sentinel_debug, sentinel_info, sentinel_warn};
use serde_json::json;

use crate::normalize::normalize_admin_users;
use crate::permissions::{allowed, can, Capability, Tab};
use crate::protocol::{
    Ack, AdminUser, Endpoint, EntityId, InboundMessage, OutboundRequest, Outcome,
    ReportStatus,
};
use crate::state::{Notice, Panel, PendingRequest};
use crate::validation::validate_report;
use crate::{AppState, Effect, Key, Msg};

/// Text shown in place of a view whose rendering failed.
pub const FAULT_FALLBACK: &str =
    "Something went wrong. Please use the /reset_admin command to restart the UI";

/// Message sent with `sendDiscordDM` when the caller gave none.
pub const DEFAULT_DM_MESSAGE: &str =
    "You have been contacted by an administrator. Please respond in-game.";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Inbound(message) => on_inbound(&mut state, message),
        Msg::CloseClicked | Msg::KeyPressed(Key::Escape) => close_panel(&mut state),
        Msg::KeyPressed(Key::Other(_)) => Vec::new(),
        Msg::DelayedClose { session } => {
            if state.session() == session && state.panel() == Panel::Report {
                close_panel(&mut state)
            } else {
                sentinel_debug!("dropping delayed close for stale session {}", session);
                Vec::new()
            }
        }
        Msg::TabSelected(tab) => {
            if gate(&state, tab) && state.admin.active_tab != tab {
                state.admin.active_tab = tab;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ReportTitleChanged(title) => {
            if state.panel() == Panel::Report {
                state.report.title = title;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ReportContentChanged(content) => {
            if state.panel() == Panel::Report {
                state.report.content = content;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ReportSubmitted => submit_report(&mut state),
        Msg::NoticeDismissed => {
            if state.notice.take().is_some() {
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::RefreshClicked => {
            if !gate(&state, Tab::Dashboard) {
                return (state, Vec::new());
            }
            state.admin.loading = true;
            state.mark_dirty();
            let ticket = state.issue_ticket(PendingRequest::Refresh);
            vec![awaited(Endpoint::RefreshData, json!({}), ticket)]
        }
        Msg::PlayerSelected(player_id) => select_player(&mut state, player_id),
        Msg::TeleportToPlayer(player_id) => {
            // Reachable from both the reports and the players tab.
            if !gate(&state, Tab::Reports) {
                return (state, Vec::new());
            }
            if !begin_action(&mut state) {
                return (state, Vec::new());
            }
            let ticket = state.issue_ticket(PendingRequest::Teleport);
            vec![awaited(
                Endpoint::TeleportToPlayer,
                json!({ "playerId": player_id.to_value() }),
                ticket,
            )]
        }
        Msg::SummonPlayer(player_id) => {
            if !gate(&state, Tab::Players) || !capable(&state, Capability::SummonPlayer) {
                return (state, Vec::new());
            }
            if !begin_action(&mut state) {
                return (state, Vec::new());
            }
            let ticket = state.issue_ticket(PendingRequest::Summon);
            vec![awaited(
                Endpoint::SummonPlayer,
                json!({ "targetId": player_id.to_value() }),
                ticket,
            )]
        }
        Msg::SendDiscordDm { player_id, message } => {
            if !gate(&state, Tab::Players) {
                return (state, Vec::new());
            }
            let message = message
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_DM_MESSAGE.to_string());
            if !begin_action(&mut state) {
                return (state, Vec::new());
            }
            let ticket = state.issue_ticket(PendingRequest::DiscordDm);
            vec![awaited(
                Endpoint::SendDiscordDm,
                json!({ "playerId": player_id.to_value(), "message": message }),
                ticket,
            )]
        }
        Msg::ReportSelected(report_id) => {
            if gate(&state, Tab::Reports) && state.find_report(&report_id).is_some() {
                state.admin.selected_report = Some(report_id);
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::TeleportToReport(report_id) => {
            if !gate(&state, Tab::Reports) {
                return (state, Vec::new());
            }
            if !begin_action(&mut state) {
                return (state, Vec::new());
            }
            let ticket = state.issue_ticket(PendingRequest::Teleport);
            vec![awaited(
                Endpoint::TeleportToReport,
                json!({ "reportId": report_id.to_value() }),
                ticket,
            )]
        }
        Msg::CopyCoordinates => copy_coordinates(&mut state),
        Msg::ReportUpdateSubmitted {
            report_id,
            status,
            notes,
        } => {
            if status == ReportStatus::Unknown {
                sentinel_warn!("refusing report update without a known status");
                return (state, Vec::new());
            }
            if !gate(&state, Tab::Reports) || !begin_action(&mut state) {
                return (state, Vec::new());
            }
            let body = json!({
                "reportId": report_id.to_value(),
                "status": status.as_wire(),
                "notes": notes,
            });
            let ticket = state.issue_ticket(PendingRequest::UpdateReport {
                report_id,
                status,
                notes,
            });
            vec![awaited(Endpoint::UpdateReportStatus, body, ticket)]
        }
        Msg::RankUpdateSubmitted { identifier, rank } => {
            let identifier = identifier.trim().to_string();
            if identifier.is_empty()
                || !gate(&state, Tab::Permissions)
                || !begin_action(&mut state)
            {
                return (state, Vec::new());
            }
            let body = json!({ "targetIdentifier": identifier, "newRank": rank.as_str() });
            let ticket = state.issue_ticket(PendingRequest::UpdateRank { identifier, rank });
            vec![awaited(Endpoint::UpdatePlayerRank, body, ticket)]
        }
        Msg::AdminSearchChanged(search) => {
            if state.panel() == Panel::Admin {
                state.admin.search = search;
                state.mark_dirty();
            }
            Vec::new()
        }
        Msg::ResponseArrived { ticket, outcome } => match state.take_pending(ticket) {
            Some(request) => apply_reply(&mut state, request, outcome),
            None => {
                sentinel_debug!(
                    "ignoring reply for ticket {} of session {}",
                    ticket.id,
                    ticket.session
                );
                Vec::new()
            }
        },
        Msg::ViewFault { message, stack } => {
            sentinel_warn!("view fault: {}", message);
            state.fault = Some(FAULT_FALLBACK.to_string());
            state.mark_dirty();
            vec![notify(
                Endpoint::ReportError,
                json!({
                    "message": message,
                    "stack": stack.unwrap_or_else(|| "No stack available".to_string()),
                }),
            )]
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn notify(endpoint: Endpoint, body: serde_json::Value) -> Effect {
    Effect::Post(OutboundRequest::notify(endpoint, body))
}

fn awaited(endpoint: Endpoint, body: serde_json::Value, ticket: crate::Ticket) -> Effect {
    Effect::Post(OutboundRequest::awaited(endpoint, body, ticket))
}

/// True when the admin panel is visible and its rank may use `tab`.
fn gate(state: &AppState, tab: Tab) -> bool {
    if state.panel() != Panel::Admin {
        sentinel_debug!("ignoring {} action while admin panel is hidden", tab.as_str());
        return false;
    }
    let permitted = allowed(tab, state.admin_rank());
    if !permitted {
        sentinel_warn!(
            "permission denied for {} with rank {:?}",
            tab.as_str(),
            state.admin_rank()
        );
    }
    permitted
}

fn capable(state: &AppState, capability: Capability) -> bool {
    let permitted = can(capability, state.admin_rank());
    if !permitted {
        sentinel_warn!("permission denied for {:?}", capability);
    }
    permitted
}

/// Claims the admin action slot. One action is in flight at a time, so its
/// reply alone re-enables the controls.
fn begin_action(state: &mut AppState) -> bool {
    if state.admin.processing {
        sentinel_debug!("admin action already in flight");
        return false;
    }
    state.admin.processing = true;
    state.mark_dirty();
    true
}

fn close_panel(state: &mut AppState) -> Vec<Effect> {
    let endpoint = match state.panel() {
        Panel::Hidden => return Vec::new(),
        Panel::Report => Endpoint::CloseReportUi,
        Panel::Admin => Endpoint::CloseAdminPanel,
    };
    sentinel_info!("closing panel, notifying {}", endpoint);
    state.hide();
    vec![notify(endpoint, json!({}))]
}

fn on_inbound(state: &mut AppState, message: InboundMessage) -> Vec<Effect> {
    match message {
        InboundMessage::OpenReport => {
            if state.panel() == Panel::Report {
                sentinel_debug!("report panel already open");
            } else {
                sentinel_info!("opening report panel");
                state.show_report();
            }
            Vec::new()
        }
        InboundMessage::OpenAdmin { rank } => {
            if state.panel() == Panel::Admin {
                if state.admin_rank() == rank {
                    return Vec::new();
                }
                sentinel_info!("admin rank changed to {:?}", rank);
                state.admin_rank = rank;
                if !allowed(state.admin.active_tab, rank) {
                    state.admin.active_tab = Tab::Dashboard;
                }
                state.mark_dirty();
            } else {
                sentinel_info!("opening admin panel with rank {:?}", rank);
                state.show_admin(rank);
            }
            initial_requests(state)
        }
        InboundMessage::ServerStats(stats) => {
            if admin_visible(state, "server stats") {
                state.admin.stats = stats;
                state.admin.loading = false;
                state.mark_dirty();
            }
            Vec::new()
        }
        InboundMessage::Reports(reports) => {
            if admin_visible(state, "reports") {
                if let Some(selected) = &state.admin.selected_report {
                    if !reports.iter().any(|report| &report.id == selected) {
                        state.admin.selected_report = None;
                    }
                }
                state.admin.reports = reports;
                state.mark_dirty();
            }
            Vec::new()
        }
        InboundMessage::OnlinePlayers(players) => {
            if admin_visible(state, "online players") {
                state.admin.players = players;
                state.mark_dirty();
            }
            Vec::new()
        }
        InboundMessage::PlayerInventory {
            player_id,
            inventory,
        } => {
            if !admin_visible(state, "player inventory") {
                return Vec::new();
            }
            let Some(player_id) = player_id else {
                sentinel_warn!("inventory without a player id");
                return Vec::new();
            };
            match state.find_player_mut(&player_id) {
                Some(player) => {
                    player.inventory = Some(inventory);
                    state.mark_dirty();
                }
                None => sentinel_debug!("inventory for unknown player {}", player_id),
            }
            Vec::new()
        }
        InboundMessage::Other { action, .. } => {
            sentinel_debug!("no handler for action {}", action);
            Vec::new()
        }
    }
}

fn admin_visible(state: &AppState, what: &str) -> bool {
    let visible = state.panel() == Panel::Admin;
    if !visible {
        sentinel_debug!("dropping {} while admin panel is hidden", what);
    }
    visible
}

/// Requests everything the current rank may see.
fn initial_requests(state: &mut AppState) -> Vec<Effect> {
    let rank = state.admin_rank();
    if rank.is_none() {
        return Vec::new();
    }
    state.admin.loading = true;
    state.mark_dirty();

    let mut effects = Vec::with_capacity(4);
    let ticket = state.issue_ticket(PendingRequest::InitialLoad);
    effects.push(awaited(Endpoint::GetServerStats, json!({}), ticket));
    if allowed(Tab::Reports, rank) {
        effects.push(notify(Endpoint::GetReports, json!({})));
    }
    if allowed(Tab::Players, rank) {
        effects.push(notify(Endpoint::GetOnlinePlayers, json!({})));
    }
    if allowed(Tab::Permissions, rank) {
        let ticket = state.issue_ticket(PendingRequest::AdminUsers);
        effects.push(awaited(Endpoint::GetAdminUsers, json!({}), ticket));
    }
    effects
}

fn submit_report(state: &mut AppState) -> Vec<Effect> {
    if state.panel() != Panel::Report || state.report.processing {
        return Vec::new();
    }
    match validate_report(&state.report.title, &state.report.content) {
        Err(rejection) => {
            sentinel_debug!("report rejected: {}", rejection);
            state.set_notice(Notice::error(rejection.to_string()));
            Vec::new()
        }
        Ok(draft) => {
            state.report.processing = true;
            state.notice = None;
            state.mark_dirty();
            let ticket = state.issue_ticket(PendingRequest::SubmitReport);
            vec![awaited(
                Endpoint::SubmitReport,
                json!({ "title": draft.title, "content": draft.content }),
                ticket,
            )]
        }
    }
}

fn select_player(state: &mut AppState, player_id: EntityId) -> Vec<Effect> {
    if !gate(state, Tab::Players) {
        return Vec::new();
    }
    let may_view_inventory = can(Capability::ViewInventory, state.admin_rank());
    let Some(player) = state.find_player_mut(&player_id) else {
        sentinel_debug!("selected unknown player {}", player_id);
        return Vec::new();
    };
    let needs_inventory = may_view_inventory && player.inventory.is_none();
    state.admin.selected_player = Some(player_id.clone());
    state.mark_dirty();
    if needs_inventory {
        vec![notify(
            Endpoint::GetPlayerInventory,
            json!({ "playerId": player_id.to_value() }),
        )]
    } else {
        Vec::new()
    }
}

fn copy_coordinates(state: &mut AppState) -> Vec<Effect> {
    if !gate(state, Tab::Reports) {
        return Vec::new();
    }
    let coords = state
        .admin
        .selected_report
        .as_ref()
        .and_then(|id| state.find_report(id))
        .and_then(|report| report.coords);
    let Some(coords) = coords else {
        sentinel_debug!("no coordinates to copy");
        return Vec::new();
    };
    let ticket = state.issue_ticket(PendingRequest::CopyCoordinates);
    vec![awaited(
        Endpoint::CopyCoordinates,
        json!({ "coords": coords }),
        ticket,
    )]
}

fn apply_reply(state: &mut AppState, request: PendingRequest, outcome: Outcome) -> Vec<Effect> {
    state.mark_dirty();
    let reply = match outcome {
        Outcome::Replied(reply) => reply,
        Outcome::Failed(reason) => {
            sentinel_warn!("{:?} failed: {}", request, reason);
            on_failure(state, request);
            return Vec::new();
        }
    };

    match request {
        PendingRequest::InitialLoad | PendingRequest::Refresh => {
            state.admin.loading = false;
        }
        PendingRequest::AdminUsers => {
            state.admin.admin_users = normalize_admin_users(reply.as_ref());
        }
        PendingRequest::SubmitReport => {
            state.report.processing = false;
            let ack = Ack::from_reply(reply.as_ref());
            if ack.success {
                state.report.title.clear();
                state.report.content.clear();
                state.set_notice(Notice::success(
                    ack.message
                        .unwrap_or_else(|| "Report submitted successfully!".to_string()),
                ));
                return vec![Effect::CloseAfter {
                    delay: state.close_delay,
                    session: state.session(),
                }];
            }
            state.set_notice(Notice::error(ack.message.unwrap_or_else(|| {
                "Failed to submit report. Please try again.".to_string()
            })));
        }
        PendingRequest::UpdateRank { identifier, rank } => {
            state.admin.processing = false;
            let ack = Ack::from_reply(reply.as_ref());
            if !ack.success {
                state.set_notice(Notice::error(
                    ack.message
                        .unwrap_or_else(|| "Failed to update rank.".to_string()),
                ));
                return Vec::new();
            }
            let users = &mut state.admin.admin_users;
            match users.iter().position(|user| user.identifier == identifier) {
                Some(index) => users[index].rank = rank.as_str().to_string(),
                None => users.push(AdminUser {
                    identifier,
                    name: "Unknown".to_string(),
                    rank: rank.as_str().to_string(),
                    assigned_by: "Current Admin".to_string(),
                    updated_at: String::new(),
                }),
            }
        }
        PendingRequest::UpdateReport {
            report_id,
            status,
            notes,
        } => {
            state.admin.processing = false;
            let ack = Ack::from_reply(reply.as_ref());
            if !ack.success {
                state.set_notice(Notice::error(
                    ack.message
                        .unwrap_or_else(|| "Failed to update report.".to_string()),
                ));
                return Vec::new();
            }
            state.admin.selected_report = None;
            if let Some(report) = state
                .admin
                .reports
                .iter_mut()
                .find(|report| report.id == report_id)
            {
                report.status = status;
                report.notes = notes;
            }
        }
        PendingRequest::Teleport | PendingRequest::Summon => {
            state.admin.processing = false;
            state.admin.selected_player = None;
            state.admin.selected_report = None;
        }
        PendingRequest::DiscordDm => {
            state.admin.processing = false;
            state.set_notice(Notice::success("Discord message sent."));
        }
        PendingRequest::CopyCoordinates => {
            if Ack::from_reply(reply.as_ref()).success {
                state.set_notice(Notice::success("Coordinates copied to clipboard."));
            }
        }
    }
    Vec::new()
}

/// Re-enables the triggering control and surfaces a transient error.
fn on_failure(state: &mut AppState, request: PendingRequest) {
    let message = match request {
        PendingRequest::InitialLoad => {
            state.admin.loading = false;
            return;
        }
        PendingRequest::AdminUsers | PendingRequest::CopyCoordinates => return,
        PendingRequest::Refresh => {
            state.admin.loading = false;
            state.set_notice(Notice::error("Failed to refresh data."));
            return;
        }
        PendingRequest::SubmitReport => {
            state.report.processing = false;
            state.set_notice(Notice::error("An error occurred. Please try again later."));
            return;
        }
        PendingRequest::UpdateRank { .. } => "Failed to update rank.",
        PendingRequest::UpdateReport { .. } => "Failed to update report.",
        PendingRequest::Teleport => "Teleport failed.",
        PendingRequest::Summon => "Summon failed.",
        PendingRequest::DiscordDm => "Failed to send Discord message.",
    };
    state.admin.processing = false;
    state.set_notice(Notice::error(message));
}
