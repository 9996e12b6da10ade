//! Rank-based gating for admin tabs and in-tab actions.

use std::fmt;

/// Staff rank as granted by the host. `Management` and `Leitung` gate alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminRank {
    Supporter,
    Moderator,
    Administrator,
    Management,
    Leitung,
}

impl AdminRank {
    pub const ALL: [AdminRank; 5] = [
        AdminRank::Supporter,
        AdminRank::Moderator,
        AdminRank::Administrator,
        AdminRank::Management,
        AdminRank::Leitung,
    ];

    /// Unknown names yield `None`, which is denied every gated tab.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|rank| rank.as_str().eq_ignore_ascii_case(raw))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AdminRank::Supporter => "supporter",
            AdminRank::Moderator => "moderator",
            AdminRank::Administrator => "administrator",
            AdminRank::Management => "management",
            AdminRank::Leitung => "leitung",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AdminRank::Supporter => "Supporter",
            AdminRank::Moderator => "Moderator",
            AdminRank::Administrator => "Administrator",
            AdminRank::Management => "Management",
            AdminRank::Leitung => "Leitung",
        }
    }

    fn level(self) -> u8 {
        match self {
            AdminRank::Supporter => 1,
            AdminRank::Moderator => 2,
            AdminRank::Administrator => 3,
            AdminRank::Management | AdminRank::Leitung => 4,
        }
    }

    pub fn at_least(self, other: AdminRank) -> bool {
        self.level() >= other.level()
    }
}

impl fmt::Display for AdminRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    #[default]
    Dashboard,
    Reports,
    Players,
    Permissions,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Dashboard, Tab::Reports, Tab::Players, Tab::Permissions];

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|tab| tab.as_str().eq_ignore_ascii_case(raw.trim()))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Dashboard => "dashboard",
            Tab::Reports => "reports",
            Tab::Players => "players",
            Tab::Permissions => "permissions",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Reports => "Reports",
            Tab::Players => "Players",
            Tab::Permissions => "Permissions",
        }
    }

    fn minimum_rank(self) -> AdminRank {
        match self {
            Tab::Dashboard | Tab::Reports => AdminRank::Supporter,
            Tab::Players => AdminRank::Moderator,
            Tab::Permissions => AdminRank::Administrator,
        }
    }
}

/// Actions inside a tab that carry their own rank requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    SummonPlayer,
    ViewInventory,
}

impl Capability {
    fn minimum_rank(self) -> AdminRank {
        match self {
            Capability::SummonPlayer | Capability::ViewInventory => AdminRank::Moderator,
        }
    }
}

pub fn allowed(tab: Tab, rank: Option<AdminRank>) -> bool {
    rank.is_some_and(|rank| rank.at_least(tab.minimum_rank()))
}

pub fn can(capability: Capability, rank: Option<AdminRank>) -> bool {
    rank.is_some_and(|rank| rank.at_least(capability.minimum_rank()))
}

/// Tabs in display order that `rank` may open.
pub fn visible_tabs(rank: Option<AdminRank>) -> Vec<Tab> {
    Tab::ALL
        .into_iter()
        .filter(|tab| allowed(*tab, rank))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_parsing_is_case_insensitive() {
        assert_eq!(AdminRank::parse(" Moderator "), Some(AdminRank::Moderator));
        assert_eq!(AdminRank::parse("LEITUNG"), Some(AdminRank::Leitung));
        assert_eq!(AdminRank::parse("owner"), None);
        assert_eq!(AdminRank::parse(""), None);
    }

    #[test]
    fn top_ranks_gate_alike() {
        assert!(AdminRank::Management.at_least(AdminRank::Leitung));
        assert!(AdminRank::Leitung.at_least(AdminRank::Management));
        assert!(!AdminRank::Administrator.at_least(AdminRank::Management));
    }

    #[test]
    fn capabilities_need_moderator() {
        assert!(!can(Capability::SummonPlayer, Some(AdminRank::Supporter)));
        assert!(can(Capability::ViewInventory, Some(AdminRank::Moderator)));
        assert!(!can(Capability::ViewInventory, None));
    }
}
