//! Sleep/power manager - inactivity timeout and deep sleep.
//!
//! One sleep deadline is armed at setup and re-armed on every button
//! press. When it runs out the manager either asks the user first (see
//! [`power_logic::prompt_permitted`]) or powers down immediately.
//!
//! An unanswered prompt does not keep the device awake: the manager arms
//! a short grace deadline and the next expiry goes straight to sleep.
//!
//! nRF52840 power modes:
//! - System ON: normal operation, OLED lit
//! - System OFF: deep sleep, wake on button GPIO (~0.4 µA), resets on wake

use crate::config::{Timing, WAKE_BUTTON_PIN};
use crate::platform::{PowerControl, RenderSurface, TimerService, WakeLevel, WakeSource};
use crate::power_logic;
use crate::timer::{OneShot, TimerHandle, TimerId};
use crate::ui::controller::DisplayController;
use crate::ui::DisplayState;

/// The select button pulls the line low when pressed.
pub const WAKE_SOURCE: WakeSource = WakeSource {
    pin: WAKE_BUTTON_PIN,
    level: WakeLevel::Low,
};

/// What to do about an expired sleep deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SleepDecision {
    /// Show the pre-sleep prompt.
    Prompt,
    /// Power down now.
    Sleep,
}

pub struct SleepManager {
    deadline: OneShot,
    sleep_ms: u32,
    grace_ms: u32,
    /// The prompt has been shown since the last button press.
    prompted: bool,
    /// Deep sleep failed to engage; the device is stuck awake.
    failed: bool,
}

impl SleepManager {
    pub const fn new(timing: &Timing) -> Self {
        Self {
            deadline: OneShot::new(TimerId::Sleep),
            sleep_ms: timing.sleep_ms,
            grace_ms: timing.pre_sleep_grace_ms,
            prompted: false,
            failed: false,
        }
    }

    /// Cancel any pending sleep deadline and start a full one.
    pub fn arm_sleep_timer(&mut self, timers: &mut impl TimerService) {
        self.deadline.arm(timers, self.sleep_ms);
    }

    /// Record a button press.
    pub fn note_activity(&mut self, timers: &mut impl TimerService) {
        if self.prompted {
            info!("Power: prompt answered, staying awake");
            self.prompted = false;
        }
        self.arm_sleep_timer(timers);
    }

    /// Handle a sleep deadline expiry. `None` for stale handles.
    pub fn on_sleep_timer_fired(
        &mut self,
        handle: TimerHandle,
        state: &DisplayState,
    ) -> Option<SleepDecision> {
        if !self.deadline.fire(handle) {
            return None;
        }

        let decision = if !self.prompted && power_logic::prompt_permitted(state) {
            self.prompted = true;
            SleepDecision::Prompt
        } else {
            SleepDecision::Sleep
        };
        info!("Power: idle in {:?} -> {:?}", state.tag(), decision);
        Some(decision)
    }

    /// The pre-sleep prompt timed out: sleep after a short grace period.
    pub fn prompt_unanswered(&mut self, timers: &mut impl TimerService) {
        debug!("Power: prompt unanswered, sleeping in {} ms", self.grace_ms);
        self.deadline.arm(timers, self.grace_ms);
    }

    /// Turn the display off, arm the button as wake source and power down.
    ///
    /// Only returns if the platform failed to engage deep sleep. That is
    /// fatal for this run: the failure is logged, [`Self::sleep_failed`]
    /// reports it, and recovery is left to the hardware watchdog.
    pub fn enter_deep_sleep<S: RenderSurface>(
        &mut self,
        display: &mut DisplayController<'_, S>,
        power: &mut impl PowerControl,
        timers: &mut impl TimerService,
    ) {
        info!("Power: entering deep sleep");
        self.deadline.disarm(timers);
        display.power_off_surface();
        power.configure_wake(WAKE_SOURCE);

        match power.deep_sleep() {
            Ok(never) => match never {},
            Err(e) => {
                error!("Power: deep sleep failed to engage: {:?}", e);
                self.failed = true;
            }
        }
    }

    pub fn sleep_failed(&self) -> bool {
        self.failed
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_armed()
    }
}
