use std::collections::BTreeMap;
use std::time::Duration;

use crate::permissions::{AdminRank, Tab};
use crate::protocol::{AdminUser, EntityId, Player, Report, ReportStatus, ServerStats, Ticket};
use crate::view_model::AppViewModel;

/// Delay between a successful report submission and the panel closing.
pub const REPORT_CLOSE_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Panel {
    #[default]
    Hidden,
    Report,
    Admin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient, dismissible message shown on top of the visible panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// What an awaited request was for, kept until its reply arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PendingRequest {
    InitialLoad,
    Refresh,
    AdminUsers,
    SubmitReport,
    UpdateRank {
        identifier: String,
        rank: AdminRank,
    },
    UpdateReport {
        report_id: EntityId,
        status: ReportStatus,
        notes: String,
    },
    Teleport,
    Summon,
    DiscordDm,
    CopyCoordinates,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct ReportForm {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) processing: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct AdminData {
    pub(crate) active_tab: Tab,
    pub(crate) stats: ServerStats,
    pub(crate) reports: Vec<Report>,
    pub(crate) players: Vec<Player>,
    pub(crate) admin_users: Vec<AdminUser>,
    pub(crate) search: String,
    pub(crate) loading: bool,
    pub(crate) processing: bool,
    pub(crate) selected_report: Option<EntityId>,
    pub(crate) selected_player: Option<EntityId>,
}

/// Single owner of the overlay's view state.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub(crate) panel: Panel,
    pub(crate) admin_rank: Option<AdminRank>,
    pub(crate) session: u64,
    next_ticket: u64,
    pending: BTreeMap<u64, PendingRequest>,
    pub(crate) report: ReportForm,
    pub(crate) admin: AdminData,
    pub(crate) notice: Option<Notice>,
    pub(crate) fault: Option<String>,
    pub(crate) close_delay: Duration,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            panel: Panel::Hidden,
            admin_rank: None,
            session: 0,
            next_ticket: 0,
            pending: BTreeMap::new(),
            report: ReportForm::default(),
            admin: AdminData::default(),
            notice: None,
            fault: None,
            close_delay: REPORT_CLOSE_DELAY,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_close_delay(mut self, delay: Duration) -> Self {
        self.close_delay = delay;
        self
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn admin_rank(&self) -> Option<AdminRank> {
        self.admin_rank
    }

    /// Advances every time a panel is opened fresh or closed.
    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel::from_state(self)
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn begin_session(&mut self, panel: Panel, rank: Option<AdminRank>) {
        self.panel = panel;
        self.admin_rank = rank;
        self.session += 1;
        self.pending.clear();
        self.report = ReportForm::default();
        self.admin = AdminData::default();
        self.notice = None;
        self.fault = None;
        self.mark_dirty();
    }

    pub(crate) fn show_report(&mut self) {
        self.begin_session(Panel::Report, None);
    }

    pub(crate) fn show_admin(&mut self, rank: Option<AdminRank>) {
        self.begin_session(Panel::Admin, rank);
    }

    /// Unmounts the visible panel; its local state is discarded.
    pub(crate) fn hide(&mut self) {
        self.begin_session(Panel::Hidden, None);
    }

    pub(crate) fn issue_ticket(&mut self, request: PendingRequest) -> Ticket {
        self.next_ticket += 1;
        let ticket = Ticket {
            id: self.next_ticket,
            session: self.session,
        };
        self.pending.insert(ticket.id, request);
        ticket
    }

    /// Removes and returns the request a reply belongs to, if it is still live.
    pub(crate) fn take_pending(&mut self, ticket: Ticket) -> Option<PendingRequest> {
        if ticket.session != self.session {
            return None;
        }
        self.pending.remove(&ticket.id)
    }

    pub(crate) fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.mark_dirty();
    }

    pub(crate) fn find_player_mut(&mut self, id: &EntityId) -> Option<&mut Player> {
        self.admin.players.iter_mut().find(|player| &player.id == id)
    }

    pub(crate) fn find_report(&self, id: &EntityId) -> Option<&Report> {
        self.admin.reports.iter().find(|report| &report.id == id)
    }
}
