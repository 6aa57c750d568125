use crate::ui::DisplayState;

/// Decide whether the sleep timer may interrupt `state` with a
/// "going to sleep" prompt instead of sleeping straight away.
///
/// Screens the user is merely looking at can be interrupted. Startup,
/// an in-flight connection attempt and the question screens cannot.
pub fn prompt_permitted(state: &DisplayState) -> bool {
    matches!(
        state,
        DisplayState::Main(_)
            | DisplayState::NetConfig(_)
            | DisplayState::NetFail
            | DisplayState::UpdateFail
    )
}
