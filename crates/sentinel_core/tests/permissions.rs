use sentinel_core::{allowed, visible_tabs, AdminRank, Tab};

#[test]
fn tab_gate_matches_rank_order() {
    assert!(!allowed(Tab::Permissions, Some(AdminRank::Moderator)));
    assert!(allowed(Tab::Permissions, Some(AdminRank::Administrator)));
    assert!(!allowed(Tab::Dashboard, None));
    assert!(allowed(Tab::Dashboard, Some(AdminRank::Supporter)));
    assert!(allowed(Tab::Reports, Some(AdminRank::Supporter)));
    assert!(!allowed(Tab::Players, Some(AdminRank::Supporter)));
    assert!(allowed(Tab::Players, Some(AdminRank::Moderator)));
}

#[test]
fn unknown_rank_is_denied_everything() {
    let rank = AdminRank::parse("owner");
    for tab in Tab::ALL {
        assert!(!allowed(tab, rank), "{tab:?} should be denied");
    }
}

#[test]
fn management_and_leitung_see_every_tab() {
    for rank in [AdminRank::Management, AdminRank::Leitung] {
        assert_eq!(visible_tabs(Some(rank)), Tab::ALL.to_vec());
    }
    assert_eq!(
        visible_tabs(Some(AdminRank::Supporter)),
        vec![Tab::Dashboard, Tab::Reports]
    );
}
