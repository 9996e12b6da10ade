use crate::permissions::{allowed, can, visible_tabs, AdminRank, Capability, Tab};
use crate::protocol::{AdminUser, EntityId, Player, Report, ReportStatus, ServerStats};
use crate::state::{AppState, Notice, Panel};
use crate::validation::{word_count, MIN_REPORT_WORDS};

/// Immutable snapshot handed to renderers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub panel: Panel,
    pub session: u64,
    pub admin_rank: Option<AdminRank>,
    pub notice: Option<Notice>,
    /// Replaces the panel content when rendering failed.
    pub fault: Option<String>,
    pub report_form: Option<ReportFormView>,
    pub admin: Option<AdminView>,
}

impl AppViewModel {
    pub fn visible(&self) -> bool {
        self.panel != Panel::Hidden
    }

    pub(crate) fn from_state(state: &AppState) -> Self {
        let report_form = (state.panel == Panel::Report).then(|| {
            let words = word_count(&state.report.content);
            ReportFormView {
                title: state.report.title.clone(),
                content: state.report.content.clone(),
                word_count: words,
                min_words: MIN_REPORT_WORDS,
                can_submit: !state.report.title.trim().is_empty()
                    && words >= MIN_REPORT_WORDS
                    && !state.report.processing,
                processing: state.report.processing,
            }
        });
        let admin = (state.panel == Panel::Admin).then(|| AdminView::from_state(state));
        Self {
            panel: state.panel,
            session: state.session,
            admin_rank: state.admin_rank,
            notice: state.notice.clone(),
            fault: state.fault.clone(),
            report_form,
            admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFormView {
    pub title: String,
    pub content: String,
    pub word_count: usize,
    pub min_words: usize,
    pub can_submit: bool,
    pub processing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdminView {
    pub rank_label: &'static str,
    pub visible_tabs: Vec<Tab>,
    pub active_tab: Tab,
    pub loading: bool,
    pub processing: bool,
    pub stats: ServerStats,
    pub capacity_percent: u32,
    pub closed_percent: u32,
    /// Empty unless the rank may open the reports tab.
    pub reports: Vec<ReportRowView>,
    /// Empty unless the rank may open the players tab.
    pub players: Vec<PlayerRowView>,
    /// Filtered by `search`; empty unless the rank may open the permissions tab.
    pub admin_users: Vec<AdminUser>,
    pub search: String,
    pub selected_report: Option<Report>,
    pub selected_player: Option<Player>,
    pub can_summon: bool,
    pub can_view_inventory: bool,
}

impl AdminView {
    fn from_state(state: &AppState) -> Self {
        let rank = state.admin_rank;
        let data = &state.admin;
        let reports_allowed = allowed(Tab::Reports, rank);
        let players_allowed = allowed(Tab::Players, rank);

        let reports = if reports_allowed {
            data.reports.iter().map(ReportRowView::from).collect()
        } else {
            Vec::new()
        };
        let players = if players_allowed {
            data.players.iter().map(PlayerRowView::from).collect()
        } else {
            Vec::new()
        };
        let admin_users = if allowed(Tab::Permissions, rank) {
            filter_admin_users(&data.admin_users, &data.search)
        } else {
            Vec::new()
        };

        Self {
            rank_label: rank.map_or("Unknown", AdminRank::label),
            visible_tabs: visible_tabs(rank),
            active_tab: data.active_tab,
            loading: data.loading,
            processing: data.processing,
            stats: data.stats.clone(),
            capacity_percent: data.stats.capacity_percent(),
            closed_percent: data.stats.closed_percent(),
            reports,
            players,
            admin_users,
            search: data.search.clone(),
            selected_report: data
                .selected_report
                .as_ref()
                .filter(|_| reports_allowed)
                .and_then(|id| state.find_report(id))
                .cloned(),
            selected_player: data
                .selected_player
                .as_ref()
                .filter(|_| players_allowed)
                .and_then(|id| data.players.iter().find(|player| &player.id == id))
                .cloned(),
            can_summon: can(Capability::SummonPlayer, rank),
            can_view_inventory: can(Capability::ViewInventory, rank),
        }
    }
}

fn filter_admin_users(users: &[AdminUser], search: &str) -> Vec<AdminUser> {
    let needle = search.trim().to_lowercase();
    users
        .iter()
        .filter(|user| {
            needle.is_empty()
                || user.name.to_lowercase().contains(&needle)
                || user.identifier.to_lowercase().contains(&needle)
                || user.rank.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRowView {
    pub id: EntityId,
    pub title: String,
    pub player_name: String,
    pub status: ReportStatus,
    pub submitted_at: Option<i64>,
}

impl From<&Report> for ReportRowView {
    fn from(report: &Report) -> Self {
        Self {
            id: report.id.clone(),
            title: report.title.clone(),
            player_name: report.player_name.clone(),
            status: report.status,
            submitted_at: report.submitted_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRowView {
    pub id: EntityId,
    pub name: String,
    pub identifier: String,
    /// `None` while the inventory has not been loaded.
    pub item_count: Option<usize>,
}

impl From<&Player> for PlayerRowView {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            name: player.name.clone(),
            identifier: player.identifier.clone(),
            item_count: player.inventory.as_ref().map(Vec::len),
        }
    }
}
