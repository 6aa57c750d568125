//! Application shell contract and the UV meter application.
//!
//! The surrounding shell (firmware `main`, the console harness, tests)
//! owns the hardware, builds a [`UvMeter`] from a [`Board`]'s parts and
//! then drives it through [`Application`]: `setup` once, `poll` every
//! loop pass, `on_input` for each button event.

use embedded_hal::delay::DelayNs;

use crate::config::{Timing, CONFIG_PORTAL_NAME};
use crate::platform::{
    ClockWeather, NetStatus, Network, PowerControl, RenderSurface, SensorReader, TimerService,
};
use crate::power::{SleepDecision, SleepManager};
use crate::render::{DeferredRender, ExecContext};
use crate::sensor::Sampler;
use crate::timer::{SoftTimers, TimerId};
use crate::ui::controller::{Command, DismissOutcome, DisplayController, RetryTarget};
use crate::ui::format::{hour12, weather_summary};
use crate::ui::{ButtonId, DisplayState, InputEvent, MainView};

/// Dismiss, sleep and one spare.
pub const TIMER_SLOTS: usize = 4;

/// What the shell calls.
pub trait Application {
    /// One-time initialisation.
    fn setup(&mut self, now_ms: u64);

    /// One main-loop pass.
    fn poll(&mut self, now_ms: u64);

    /// A debounced, classified button event, seen at `now_ms`.
    fn on_input(&mut self, now_ms: u64, button: ButtonId, event: InputEvent);

    /// Show `state` from the main loop. Moves the display state machine
    /// does not allow are ignored.
    fn render(&mut self, state: DisplayState);
}

/// Collaborator types of one hardware (or simulated) platform.
pub trait Board {
    type Surface: RenderSurface;
    type Sensor: SensorReader;
    type Clock: ClockWeather;
    type Network: Network;
    type Power: PowerControl;
    type Delay: DelayNs;
}

/// Everything a [`UvMeter`] takes ownership of.
pub struct Parts<B: Board> {
    pub surface: B::Surface,
    pub sensor: B::Sensor,
    pub clock: B::Clock,
    pub network: B::Network,
    pub power: B::Power,
    pub delay: B::Delay,
}

pub struct UvMeter<'r, B: Board> {
    display: DisplayController<'r, B::Surface>,
    sleep: SleepManager,
    sampler: Sampler<B::Sensor>,
    timers: SoftTimers<TIMER_SLOTS>,
    clock: B::Clock,
    network: B::Network,
    power: B::Power,
    delay: B::Delay,
}

impl<'r, B: Board> UvMeter<'r, B> {
    pub fn new(parts: Parts<B>, render: DeferredRender<'r>, timing: Timing) -> Self {
        Self {
            display: DisplayController::new(parts.surface, render, &timing),
            sleep: SleepManager::new(&timing),
            sampler: Sampler::new(parts.sensor, &timing),
            timers: SoftTimers::new(),
            clock: parts.clock,
            network: parts.network,
            power: parts.power,
            delay: parts.delay,
        }
    }

    pub fn display(&self) -> &DisplayController<'r, B::Surface> {
        &self.display
    }

    pub fn sleep_manager(&self) -> &SleepManager {
        &self.sleep
    }

    pub fn sampler(&self) -> &Sampler<B::Sensor> {
        &self.sampler
    }

    pub fn network(&self) -> &B::Network {
        &self.network
    }

    pub fn power(&self) -> &B::Power {
        &self.power
    }

    /// Main-screen data from the clock and the latest sample.
    pub fn compose_main(&self) -> MainView {
        let now = self.clock.current_time();
        let (hour, meridiem) = hour12(now.hour);
        let sample = self.sampler.last();
        MainView {
            hour,
            minute: now.minute,
            meridiem,
            month: now.month,
            day: now.day,
            weather: weather_summary(&self.clock),
            uva: sample.uva,
            uvb: sample.uvb,
            sensor_ok: sample.ok,
        }
    }

    fn show(&mut self, state: DisplayState, ctx: ExecContext) {
        let _ = self.display.set_state(state, ctx, &mut self.timers);
    }

    fn show_main(&mut self) {
        let view = self.compose_main();
        self.show(DisplayState::Main(view), ExecContext::MainLoop);
    }

    /// Fetch time and weather; `UpdateFail` on failure.
    fn refresh(&mut self) -> bool {
        match self.network.refresh() {
            Ok(()) => true,
            Err(e) => {
                warn!("Network: update failed: {:?}", e);
                self.show(DisplayState::UpdateFail, ExecContext::MainLoop);
                false
            }
        }
    }

    fn execute(&mut self, command: Command) {
        debug!("App: {:?}", command);
        match command {
            Command::RetryNetworkSetup => {
                // `Connecting` is already showing and dismisses into Main.
                if let Err(e) = self.network.retry_setup() {
                    warn!("Network: setup failed: {:?}", e);
                    self.show(DisplayState::NetFail, ExecContext::MainLoop);
                }
            }
            Command::Retry(RetryTarget::Network) => match self.network.retry_setup() {
                Ok(()) => self.show_main(),
                Err(e) => {
                    warn!("Network: setup failed: {:?}", e);
                    self.show(DisplayState::NetFail, ExecContext::MainLoop);
                }
            },
            Command::Retry(RetryTarget::Update) => {
                if self.refresh() {
                    self.show_main();
                }
            }
            Command::Restart => {
                info!("App: restarting");
                self.power.restart();
            }
            Command::ResetNetwork => {
                info!("App: forgetting network, restarting");
                self.network.reset();
                self.power.restart();
            }
            Command::ConfirmSleep => {
                self.sleep
                    .enter_deep_sleep(&mut self.display, &mut self.power, &mut self.timers);
            }
        }
    }

    /// Deliver expired timers. They run as callbacks, so presents are
    /// deferred to the next drain.
    fn dispatch_timers(&mut self) {
        let ctx = ExecContext::Callback;
        while let Some(expired) = self.timers.take_expired() {
            match expired.timer {
                TimerId::Dismiss => {
                    let outcome = self.display.on_dismiss(expired.handle, ctx, &mut self.timers);
                    if outcome == DismissOutcome::PromptUnanswered {
                        self.sleep.prompt_unanswered(&mut self.timers);
                    }
                }
                TimerId::Sleep => {
                    match self
                        .sleep
                        .on_sleep_timer_fired(expired.handle, self.display.state())
                    {
                        Some(SleepDecision::Prompt) => {
                            self.display.prompt_sleep(ctx, &mut self.timers)
                        }
                        Some(SleepDecision::Sleep) => self.sleep.enter_deep_sleep(
                            &mut self.display,
                            &mut self.power,
                            &mut self.timers,
                        ),
                        None => {}
                    }
                }
            }
        }
    }
}

impl<'r, B: Board> Application for UvMeter<'r, B> {
    fn setup(&mut self, now_ms: u64) {
        self.timers.advance_to(now_ms);

        if let Err(e) = self.display.begin() {
            error!("Display: init failed: {:?}", e);
        }
        self.show(DisplayState::Startup, ExecContext::MainLoop);

        // A missing sensor only costs the numbers on the main screen.
        let _ = self.sampler.begin();
        self.sleep.arm_sleep_timer(&mut self.timers);

        match self.network.begin() {
            NetStatus::Online => {
                self.refresh();
            }
            NetStatus::NeedsConfig => {
                info!("Network: needs configuration");
                self.show(
                    DisplayState::net_config(CONFIG_PORTAL_NAME),
                    ExecContext::MainLoop,
                );
            }
            NetStatus::Failed => self.show(DisplayState::NetFail, ExecContext::MainLoop),
        }
    }

    fn poll(&mut self, now_ms: u64) {
        // Presents requested by last pass's callbacks go out first.
        let _ = self.display.drain();
        self.timers.advance_to(now_ms);

        if self.sampler.sample_due(now_ms) {
            self.sampler.sample(&mut self.delay);
        }

        // Redraws Main if it is showing; otherwise keeps the data fresh
        // for the next revert.
        let view = self.compose_main();
        self.display
            .update_main(view, ExecContext::MainLoop, &mut self.timers);

        self.dispatch_timers();
    }

    fn on_input(&mut self, now_ms: u64, button: ButtonId, event: InputEvent) {
        if button != ButtonId::SELECT {
            debug!("Input: ignoring button {}", button.0);
            return;
        }
        debug!("Input: {:?}", event);

        // Deadlines armed below count from the press, not the last poll.
        self.timers.advance_to(now_ms);

        self.sleep.note_activity(&mut self.timers);
        if let Some(command) = self
            .display
            .on_button_event(event, ExecContext::MainLoop, &mut self.timers)
        {
            self.execute(command);
        }
    }

    fn render(&mut self, state: DisplayState) {
        self.show(state, ExecContext::MainLoop);
    }
}
