use crate::permissions::{AdminRank, Tab};
use crate::protocol::{EntityId, InboundMessage, Outcome, ReportStatus, Ticket};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other(String),
}

impl Key {
    pub fn from_name(name: &str) -> Self {
        match name {
            "Escape" | "Esc" => Key::Escape,
            other => Key::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Normalized host message delivered by the event bridge.
    Inbound(InboundMessage),
    /// User clicked the close button of the visible panel.
    CloseClicked,
    KeyPressed(Key),
    /// Timer scheduled by `Effect::CloseAfter` elapsed.
    DelayedClose { session: u64 },
    TabSelected(Tab),
    ReportTitleChanged(String),
    ReportContentChanged(String),
    ReportSubmitted,
    NoticeDismissed,
    RefreshClicked,
    PlayerSelected(EntityId),
    TeleportToPlayer(EntityId),
    SummonPlayer(EntityId),
    SendDiscordDm {
        player_id: EntityId,
        /// Falls back to the standard staff-contact text.
        message: Option<String>,
    },
    ReportSelected(EntityId),
    TeleportToReport(EntityId),
    /// Copy the coordinates of the selected report.
    CopyCoordinates,
    ReportUpdateSubmitted {
        report_id: EntityId,
        status: ReportStatus,
        notes: String,
    },
    RankUpdateSubmitted {
        identifier: String,
        rank: AdminRank,
    },
    AdminSearchChanged(String),
    /// Completion of an awaited outbound request.
    ResponseArrived { ticket: Ticket, outcome: Outcome },
    /// Rendering of the current view panicked.
    ViewFault {
        message: String,
        stack: Option<String>,
    },
    /// Fallback for placeholder wiring.
    NoOp,
}
