use sentinel_core::{update, AppState, Key, Msg};

#[test]
fn update_is_noop() {
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::NoOp);

    assert_eq!(state, next);
    assert!(effects.is_empty());
}

#[test]
fn escape_while_hidden_changes_nothing() {
    let state = AppState::new();
    let (mut next, effects) = update(state.clone(), Msg::KeyPressed(Key::Escape));

    assert_eq!(state, next);
    assert!(effects.is_empty());
    assert!(!next.consume_dirty());
}
