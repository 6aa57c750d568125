//! GPIO button input with async debouncing and hold timing.
//!
//! One physical button (active-low with internal pull-up):
//!   - SELECT - click or long press, also the deep-sleep wake source
//!
//! The button is handled by an async task that waits for a GPIO edge,
//! debounces it, times how long it is held and sends the classified
//! event to the main loop's channel. The task never touches UI state.

use defmt::info;
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::Input;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Sender};
use embassy_time::{Duration, Instant, Timer};

use uvmeter::config::{BUTTON_DEBOUNCE_MS, LONG_PRESS_MS};
use uvmeter::ui::input_logic::classify_hold;
use uvmeter::ui::{ButtonId, InputEvent};

/// Events buffered between the button task and the main loop.
pub const INPUT_QUEUE_LEN: usize = 4;

pub type ButtonPress = (ButtonId, InputEvent);
pub type InputChannel = Channel<CriticalSectionRawMutex, ButtonPress, INPUT_QUEUE_LEN>;
pub type InputSender = Sender<'static, CriticalSectionRawMutex, ButtonPress, INPUT_QUEUE_LEN>;

/// Run the button loop forever.
///
/// A press held past the long-press threshold is reported as soon as the
/// threshold is reached, without waiting for release.
pub async fn button_task(mut btn: Input<'static>, id: ButtonId, tx: InputSender) -> ! {
    loop {
        // Wait for falling edge (button press, active-low).
        btn.wait_for_falling_edge().await;

        // Debounce: wait and re-check.
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
        if btn.is_high() {
            continue;
        }
        let pressed_at = Instant::now();

        let remaining = LONG_PRESS_MS.saturating_sub(BUTTON_DEBOUNCE_MS);
        let event = match select(
            btn.wait_for_high(),
            Timer::after(Duration::from_millis(remaining)),
        )
        .await
        {
            Either::First(()) => classify_hold(
                pressed_at.elapsed().as_millis() + BUTTON_DEBOUNCE_MS,
                LONG_PRESS_MS,
            ),
            Either::Second(()) => InputEvent::LongPress,
        };

        info!("Button: {:?}", event);
        tx.send((id, event)).await;

        // Wait for release to avoid repeat triggers.
        btn.wait_for_high().await;
        Timer::after(Duration::from_millis(BUTTON_DEBOUNCE_MS)).await;
    }
}
