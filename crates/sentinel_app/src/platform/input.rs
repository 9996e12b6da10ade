//! One JSON object per stdin line: host messages carry `action`, user events
//! carry `ui`.

use sentinel_core::{AdminRank, EntityId, Key, Msg, ReportStatus, Tab};
use sentinel_logging::sentinel_warn;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Line {
    Host(Value),
    Ui(Msg),
    /// Synthetic host messages, honoured in debug builds only.
    Inject(Vec<Value>),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "ui", rename_all = "camelCase")]
enum UiCommand {
    Close,
    Key {
        key: String,
    },
    Tab {
        tab: String,
    },
    Title {
        text: String,
    },
    Content {
        text: String,
    },
    Submit,
    Dismiss,
    Refresh,
    SelectPlayer {
        #[serde(rename = "playerId")]
        player_id: EntityId,
    },
    TeleportToPlayer {
        #[serde(rename = "playerId")]
        player_id: EntityId,
    },
    Summon {
        #[serde(rename = "playerId")]
        player_id: EntityId,
    },
    DiscordDm {
        #[serde(rename = "playerId")]
        player_id: EntityId,
        #[serde(default)]
        message: Option<String>,
    },
    SelectReport {
        #[serde(rename = "reportId")]
        report_id: EntityId,
    },
    TeleportToReport {
        #[serde(rename = "reportId")]
        report_id: EntityId,
    },
    CopyCoords,
    UpdateReport {
        #[serde(rename = "reportId")]
        report_id: EntityId,
        status: String,
        #[serde(default)]
        notes: String,
    },
    UpdateRank {
        identifier: String,
        rank: String,
    },
    Search {
        text: String,
    },
    Inject {
        messages: Vec<Value>,
    },
}

/// Returns `None` for blank or unusable lines; the reason is logged.
pub(crate) fn parse_line(line: &str) -> Option<Line> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(err) => {
            sentinel_warn!("skipping input line that is not JSON: {}", err);
            return None;
        }
    };
    if value.get("action").is_some() {
        return Some(Line::Host(value));
    }
    if value.get("ui").is_none() {
        sentinel_warn!("skipping input line with neither `action` nor `ui`");
        return None;
    }
    match serde_json::from_value::<UiCommand>(value) {
        Ok(UiCommand::Inject { messages }) => Some(Line::Inject(messages)),
        Ok(command) => command.into_msg().map(Line::Ui),
        Err(err) => {
            sentinel_warn!("skipping malformed ui event: {}", err);
            None
        }
    }
}

impl UiCommand {
    fn into_msg(self) -> Option<Msg> {
        let msg = match self {
            UiCommand::Close => Msg::CloseClicked,
            UiCommand::Key { key } => Msg::KeyPressed(Key::from_name(&key)),
            UiCommand::Tab { tab } => match Tab::parse(&tab) {
                Some(tab) => Msg::TabSelected(tab),
                None => {
                    sentinel_warn!("unknown tab {:?}", tab);
                    return None;
                }
            },
            UiCommand::Title { text } => Msg::ReportTitleChanged(text),
            UiCommand::Content { text } => Msg::ReportContentChanged(text),
            UiCommand::Submit => Msg::ReportSubmitted,
            UiCommand::Dismiss => Msg::NoticeDismissed,
            UiCommand::Refresh => Msg::RefreshClicked,
            UiCommand::SelectPlayer { player_id } => Msg::PlayerSelected(player_id),
            UiCommand::TeleportToPlayer { player_id } => Msg::TeleportToPlayer(player_id),
            UiCommand::Summon { player_id } => Msg::SummonPlayer(player_id),
            UiCommand::DiscordDm { player_id, message } => {
                Msg::SendDiscordDm { player_id, message }
            }
            UiCommand::SelectReport { report_id } => Msg::ReportSelected(report_id),
            UiCommand::TeleportToReport { report_id } => Msg::TeleportToReport(report_id),
            UiCommand::CopyCoords => Msg::CopyCoordinates,
            UiCommand::UpdateReport {
                report_id,
                status,
                notes,
            } => match ReportStatus::parse(&status) {
                ReportStatus::Unknown => {
                    sentinel_warn!("unknown report status {:?}", status);
                    return None;
                }
                status => Msg::ReportUpdateSubmitted {
                    report_id,
                    status,
                    notes,
                },
            },
            UiCommand::UpdateRank { identifier, rank } => match AdminRank::parse(&rank) {
                Some(rank) => Msg::RankUpdateSubmitted { identifier, rank },
                None => {
                    sentinel_warn!("unknown rank {:?}", rank);
                    return None;
                }
            },
            UiCommand::Search { text } => Msg::AdminSearchChanged(text),
            UiCommand::Inject { .. } => return None,
        };
        Some(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn action_lines_are_host_messages() {
        let line = parse_line(r#"{"action":"openReportUI"}"#);
        assert_eq!(line, Some(Line::Host(json!({"action": "openReportUI"}))));
    }

    #[test]
    fn escape_key_maps_to_key_pressed() {
        assert_eq!(
            parse_line(r#"{"ui":"key","key":"Escape"}"#),
            Some(Line::Ui(Msg::KeyPressed(Key::Escape)))
        );
    }

    #[test]
    fn ids_keep_their_json_shape() {
        assert_eq!(
            parse_line(r#"{"ui":"selectPlayer","playerId":12}"#),
            Some(Line::Ui(Msg::PlayerSelected(EntityId::Number(12))))
        );
        assert_eq!(
            parse_line(r#"{"ui":"teleportToReport","reportId":"r-4"}"#),
            Some(Line::Ui(Msg::TeleportToReport(EntityId::Text(
                "r-4".to_string()
            ))))
        );
    }

    #[test]
    fn rank_tab_and_status_names_are_validated() {
        assert_eq!(
            parse_line(r#"{"ui":"updateRank","identifier":"license:1","rank":"Moderator"}"#),
            Some(Line::Ui(Msg::RankUpdateSubmitted {
                identifier: "license:1".to_string(),
                rank: AdminRank::Moderator,
            }))
        );
        assert_eq!(
            parse_line(r#"{"ui":"updateRank","identifier":"license:1","rank":"owner"}"#),
            None
        );
        assert_eq!(
            parse_line(r#"{"ui":"tab","tab":"permissions"}"#),
            Some(Line::Ui(Msg::TabSelected(Tab::Permissions)))
        );
        assert_eq!(parse_line(r#"{"ui":"tab","tab":"settings"}"#), None);
        assert_eq!(
            parse_line(r#"{"ui":"updateReport","reportId":1,"status":"bogus"}"#),
            None
        );
    }

    #[test]
    fn optional_fields_default() {
        assert_eq!(
            parse_line(r#"{"ui":"discordDm","playerId":3}"#),
            Some(Line::Ui(Msg::SendDiscordDm {
                player_id: EntityId::Number(3),
                message: None,
            }))
        );
        assert_eq!(
            parse_line(r#"{"ui":"updateReport","reportId":1,"status":"in_progress"}"#),
            Some(Line::Ui(Msg::ReportUpdateSubmitted {
                report_id: EntityId::Number(1),
                status: ReportStatus::InProgress,
                notes: String::new(),
            }))
        );
    }

    #[test]
    fn inject_lines_carry_host_messages() {
        assert_eq!(
            parse_line(r#"{"ui":"inject","messages":[{"action":"openReportUI"}]}"#),
            Some(Line::Inject(vec![json!({"action": "openReportUI"})]))
        );
    }

    #[test]
    fn junk_lines_are_skipped() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("not json"), None);
        assert_eq!(parse_line(r#"{"hello":"world"}"#), None);
        assert_eq!(parse_line(r#"{"ui":"fly"}"#), None);
        assert_eq!(parse_line(r#"{"ui":"selectPlayer"}"#), None);
    }
}
