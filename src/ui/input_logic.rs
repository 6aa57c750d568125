use super::InputEvent;

/// Classify a completed press by how long the button was held.
pub fn classify_hold(held_ms: u64, long_press_ms: u64) -> InputEvent {
    if held_ms >= long_press_ms {
        InputEvent::LongPress
    } else {
        InputEvent::Click
    }
}
