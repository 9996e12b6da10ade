use chrono::DateTime;
use sentinel_core::{
    AdminView, AppViewModel, NoticeKind, Panel, PlayerRowView, ReportFormView, ReportRowView, Tab,
};

/// Renders one text frame of the visible panel.
pub fn render(view: &AppViewModel) -> String {
    let mut lines = Vec::new();
    lines.push(format!("==== session {} ====", view.session));

    if let Some(fault) = &view.fault {
        lines.push(format!("!! {fault}"));
        return lines.join("\n");
    }

    if let Some(notice) = &view.notice {
        let kind = match notice.kind {
            NoticeKind::Success => "ok",
            NoticeKind::Error => "error",
        };
        lines.push(format!("[{kind}] {}", notice.message));
    }

    match (view.panel, &view.report_form, &view.admin) {
        (Panel::Hidden, _, _) => lines.push("(hidden)".to_string()),
        (Panel::Report, Some(form), _) => render_report_form(form, &mut lines),
        (Panel::Admin, _, Some(admin)) => render_admin(admin, &mut lines),
        _ => {}
    }
    lines.join("\n")
}

fn render_report_form(form: &ReportFormView, lines: &mut Vec<String>) {
    lines.push("Report a problem".to_string());
    lines.push(format!("Title: {}", form.title));
    lines.push(format!("Content: {}", form.content));
    let button = if form.processing {
        "Submitting..."
    } else if form.can_submit {
        "[Submit]"
    } else {
        "[Submit] (disabled)"
    };
    lines.push(format!(
        "Words: {}/{}  {button}",
        form.word_count, form.min_words
    ));
}

fn render_admin(admin: &AdminView, lines: &mut Vec<String>) {
    lines.push(format!("Admin panel ({})", admin.rank_label));
    if admin.visible_tabs.is_empty() {
        lines.push("No tabs available for this rank.".to_string());
        return;
    }
    let tabs: Vec<String> = admin
        .visible_tabs
        .iter()
        .map(|tab| {
            if *tab == admin.active_tab {
                format!("*{}*", tab.label())
            } else {
                tab.label().to_string()
            }
        })
        .collect();
    lines.push(format!("Tabs: {}", tabs.join(" | ")));
    if admin.loading {
        lines.push("Loading...".to_string());
    }
    if admin.processing {
        lines.push("Working...".to_string());
    }

    match admin.active_tab {
        Tab::Dashboard => render_dashboard(admin, lines),
        Tab::Reports => render_reports(admin, lines),
        Tab::Players => render_players(admin, lines),
        Tab::Permissions => render_permissions(admin, lines),
    }
}

fn render_dashboard(admin: &AdminView, lines: &mut Vec<String>) {
    let stats = &admin.stats;
    lines.push(format!(
        "Players: {}/{} ({}%)",
        stats.players.online, stats.players.max, admin.capacity_percent
    ));
    lines.push(format!(
        "Reports: {} total, {} open, {} in progress, {} closed ({}% closed)",
        stats.reports.total,
        stats.reports.open,
        stats.reports.in_progress,
        stats.reports.closed,
        admin.closed_percent
    ));
    lines.push(format!(
        "Server: {} v{} up {}",
        stats.server.name,
        stats.server.version,
        format_uptime(stats.server.uptime)
    ));
}

fn render_reports(admin: &AdminView, lines: &mut Vec<String>) {
    if admin.reports.is_empty() {
        lines.push("No reports.".to_string());
    }
    lines.extend(admin.reports.iter().map(format_report_row));
    if let Some(report) = &admin.selected_report {
        lines.push(format!("> {} by {}", report.title, report.player_name));
        lines.push(format!("  {}", report.content));
        if !report.notes.is_empty() {
            lines.push(format!("  Notes: {}", report.notes));
        }
        if let Some(coords) = report.coords {
            lines.push(format!(
                "  At {:.2}, {:.2}, {:.2}",
                coords.x, coords.y, coords.z
            ));
        }
    }
}

fn format_report_row(report: &ReportRowView) -> String {
    let submitted = report
        .submitted_at
        .map(format_timestamp)
        .unwrap_or_else(|| "unknown time".to_string());
    format!(
        "#{} [{}] {} by {} at {}",
        report.id,
        report.status.label(),
        report.title,
        report.player_name,
        submitted
    )
}

fn render_players(admin: &AdminView, lines: &mut Vec<String>) {
    if admin.players.is_empty() {
        lines.push("No players online.".to_string());
    }
    lines.extend(admin.players.iter().map(format_player_row));
    if let Some(player) = &admin.selected_player {
        lines.push(format!("> {} ({})", player.name, player.identifier));
        match (&player.inventory, admin.can_view_inventory) {
            (_, false) => {}
            (None, true) => lines.push("  Inventory loading...".to_string()),
            (Some(items), true) if items.is_empty() => {
                lines.push("  Inventory empty.".to_string())
            }
            (Some(items), true) => lines.extend(
                items
                    .iter()
                    .map(|item| format!("  {} x{}", item.label, item.count)),
            ),
        }
    }
}

fn format_player_row(player: &PlayerRowView) -> String {
    let items = player
        .item_count
        .map_or_else(|| "-".to_string(), |count| count.to_string());
    format!(
        "#{} {} ({}) items: {}",
        player.id, player.name, player.identifier, items
    )
}

fn render_permissions(admin: &AdminView, lines: &mut Vec<String>) {
    if !admin.search.is_empty() {
        lines.push(format!("Search: {}", admin.search));
    }
    if admin.admin_users.is_empty() {
        lines.push("No staff members.".to_string());
    }
    lines.extend(admin.admin_users.iter().map(|user| {
        format!(
            "{} ({}) rank {} set by {}",
            user.name, user.identifier, user.rank, user.assigned_by
        )
    }));
}

fn format_timestamp(seconds: i64) -> String {
    DateTime::from_timestamp(seconds, 0)
        .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown time".to_string())
}

fn format_uptime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    format!("{hours}h {minutes}m")
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::{normalize_inbound, update, AppState, Msg};
    use serde_json::{json, Value};

    fn apply(state: AppState, raw: Value) -> AppState {
        let message = normalize_inbound(&raw).expect("host message");
        update(state, Msg::Inbound(message)).0
    }

    #[test]
    fn hidden_overlay_renders_placeholder() {
        let frame = render(&AppState::new().view());
        assert!(frame.contains("(hidden)"));
    }

    #[test]
    fn report_form_shows_word_count() {
        let state = apply(AppState::new(), json!({"action": "openReportUI"}));
        let (state, _) = update(state, Msg::ReportContentChanged("one two three".to_string()));
        let frame = render(&state.view());
        assert!(frame.contains("Words: 3/7  [Submit] (disabled)"), "{frame}");
    }

    #[test]
    fn dashboard_shows_stats_and_only_allowed_tabs() {
        let state = apply(
            AppState::new(),
            json!({"action": "openAdminPanel", "adminRank": "supporter"}),
        );
        let state = apply(
            state,
            json!({"action": "receiveServerStats", "players": {"online": 8, "max": 32},
                   "server": {"name": "Sentinel RP", "uptime": 7260}}),
        );
        let frame = render(&state.view());
        assert!(frame.contains("Tabs: *Dashboard* | Reports"), "{frame}");
        assert!(!frame.contains("Players |"), "{frame}");
        assert!(frame.contains("Players: 8/32 (25%)"), "{frame}");
        assert!(frame.contains("up 2h 1m"), "{frame}");
    }

    #[test]
    fn report_rows_show_submission_time() {
        let state = apply(
            AppState::new(),
            json!({"action": "openAdminPanel", "adminRank": "supporter"}),
        );
        let state = apply(
            state,
            json!({"action": "receiveReports", "reports": [
                {"id": 1, "title": "Stuck", "playerName": "Ana", "status": "open", "submittedAt": 0}
            ]}),
        );
        let (state, _) = update(state, Msg::TabSelected(Tab::Reports));
        let frame = render(&state.view());
        assert!(
            frame.contains("#1 [Open] Stuck by Ana at 1970-01-01 00:00"),
            "{frame}"
        );
    }

    #[test]
    fn fault_replaces_panel_content() {
        let state = apply(AppState::new(), json!({"action": "openReportUI"}));
        let (state, _) = update(
            state,
            Msg::ViewFault {
                message: "boom".to_string(),
                stack: None,
            },
        );
        let frame = render(&state.view());
        assert!(frame.contains(sentinel_core::FAULT_FALLBACK));
        assert!(!frame.contains("Report a problem"));
    }
}
