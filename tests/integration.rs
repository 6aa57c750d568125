//! Integration tests for the uvmeter core, driven only through its
//! public API the way a shell drives it: `setup`, `poll`, `on_input`.

use std::collections::VecDeque;
use std::convert::Infallible;

use embedded_hal::delay::DelayNs;

use uvmeter::config::Timing;
use uvmeter::platform::{
    ClockWeather, FontTier, MeasureMode, NetStatus, Network, PowerControl, RenderSurface,
    SensorReader, UvReading, WakeSource, WallTime,
};
use uvmeter::power::WAKE_SOURCE;
use uvmeter::render::{DeferredRender, RenderRequest};
use uvmeter::sensor::Health;
use uvmeter::ui::format::UV_PLACEHOLDER;
use uvmeter::ui::{ButtonId, DisplayState, InputEvent};
use uvmeter::{Application, Board, Error, Parts, SensorError, UvMeter};

// Test doubles

/// Keeps the frame being drawn and, separately, the last frame presented.
#[derive(Default)]
struct Panel {
    drawing: Vec<String>,
    shown: Vec<String>,
    presents: usize,
    off: bool,
}

impl RenderSurface for Panel {
    fn begin(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn clear(&mut self) {
        self.drawing.clear();
    }

    fn draw_text(&mut self, text: &str, _tier: FontTier, _x: i32, _y: i32, _inverted: bool) {
        self.drawing.push(text.to_string());
    }

    fn fill_band(&mut self, _y: i32, _height: u32) {}

    fn present(&mut self) -> Result<(), Error> {
        self.shown = self.drawing.clone();
        self.presents += 1;
        Ok(())
    }

    fn power_off(&mut self) {
        self.off = true;
    }
}

impl Panel {
    fn shows(&self, text: &str) -> bool {
        self.shown.iter().any(|t| t == text)
    }
}

/// Returns queued results, then a steady default reading.
struct Sensor {
    queue: VecDeque<Result<UvReading, Error>>,
}

impl Sensor {
    fn steady() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }
}

impl SensorReader for Sensor {
    fn begin(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn prepare_measurement(&mut self, _mode: MeasureMode) -> Result<(), Error> {
        Ok(())
    }

    fn start_measurement(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn conversion_time_ms(&self) -> u32 {
        68
    }

    fn is_ready(&mut self) -> Result<bool, Error> {
        Ok(true)
    }

    fn read_values(&mut self) -> Result<UvReading, Error> {
        self.queue.pop_front().unwrap_or(Ok(UvReading {
            uva: 1.532,
            uvb: 2.145,
        }))
    }
}

struct Clock;

impl ClockWeather for Clock {
    fn current_time(&self) -> WallTime {
        WallTime {
            hour: 15,
            minute: 7,
            month: 10,
            day: 19,
        }
    }

    fn current_temp(&self) -> Option<i16> {
        Some(72)
    }

    fn high_temp(&self) -> Option<i16> {
        Some(81)
    }

    fn low_temp(&self) -> Option<i16> {
        Some(55)
    }

    fn weather_conditions(&self) -> &str {
        "Sunny"
    }
}

struct Net {
    status: NetStatus,
    retry_ok: bool,
    retries: u32,
}

impl Net {
    fn new(status: NetStatus) -> Self {
        Self {
            status,
            retry_ok: true,
            retries: 0,
        }
    }
}

impl Network for Net {
    fn begin(&mut self) -> NetStatus {
        self.status
    }

    fn retry_setup(&mut self) -> Result<(), Error> {
        self.retries += 1;
        if self.retry_ok {
            Ok(())
        } else {
            Err(Error::Network)
        }
    }

    fn refresh(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn reset(&mut self) {}
}

/// Deep sleep never engages on the host.
#[derive(Default)]
struct Power {
    wake: Option<WakeSource>,
    sleeps: u32,
    restarts: u32,
}

impl PowerControl for Power {
    fn configure_wake(&mut self, source: WakeSource) {
        self.wake = Some(source);
    }

    fn deep_sleep(&mut self) -> Result<Infallible, Error> {
        self.sleeps += 1;
        Err(Error::DeepSleep)
    }

    fn restart(&mut self) {
        self.restarts += 1;
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

struct HostBoard;

impl Board for HostBoard {
    type Surface = Panel;
    type Sensor = Sensor;
    type Clock = Clock;
    type Network = Net;
    type Power = Power;
    type Delay = NoDelay;
}

const TIMING: Timing = Timing {
    dismiss_ms: 2_000,
    sleep_ms: 10_000,
    pre_sleep_grace_ms: 3_000,
    sample_period_ms: 1_000,
};

fn meter(flag: &RenderRequest, sensor: Sensor, net: Net) -> UvMeter<'_, HostBoard> {
    let parts = Parts {
        surface: Panel::default(),
        sensor,
        clock: Clock,
        network: net,
        power: Power::default(),
        delay: NoDelay,
    };
    UvMeter::new(parts, DeferredRender::new(flag), TIMING)
}

/// Boot online and settle on the main screen.
fn booted(flag: &RenderRequest) -> UvMeter<'_, HostBoard> {
    let mut app = meter(flag, Sensor::steady(), Net::new(NetStatus::Online));
    app.setup(0);
    app.poll(2_000);
    app.poll(2_050);
    app
}

fn click(app: &mut UvMeter<'_, HostBoard>, now_ms: u64) {
    app.on_input(now_ms, ButtonId::SELECT, InputEvent::Click);
}

fn long_press(app: &mut UvMeter<'_, HostBoard>, now_ms: u64) {
    app.on_input(now_ms, ButtonId::SELECT, InputEvent::LongPress);
}

// Startup and rendering

#[test]
fn boots_into_main_screen() {
    let flag = RenderRequest::new();
    let mut app = meter(&flag, Sensor::steady(), Net::new(NetStatus::Online));
    app.setup(0);
    assert_eq!(app.display().state(), &DisplayState::Startup);
    assert!(app.display().surface().shows("UVMeter"));

    app.poll(1_999);
    assert_eq!(app.display().state(), &DisplayState::Startup);

    app.poll(2_000);
    assert!(app.display().state().is_main());
    // Reverted from a timer: drawn, but not on the panel yet.
    assert!(app.display().surface().shows("UVMeter"));

    app.poll(2_050);
    let panel = app.display().surface();
    assert!(panel.shows("3:07pm"));
    assert!(panel.shows("10/19"));
    assert!(panel.shows("72 55/81 Sunny"));
    assert!(panel.shows("1.5 2.1"));
}

#[test]
fn deferred_presents_coalesce_into_one_flush() {
    let flag = RenderRequest::new();
    let mut app = meter(&flag, Sensor::steady(), Net::new(NetStatus::Online));
    app.setup(0);
    let after_setup = app.display().surface().presents;

    app.poll(2_000);
    assert_eq!(app.display().surface().presents, after_setup);
    assert!(flag.is_pending());

    app.poll(2_050);
    assert_eq!(app.display().surface().presents, after_setup + 1);
    assert!(!flag.is_pending());
}

#[test]
fn unchanged_main_screen_is_not_presented_again() {
    let flag = RenderRequest::new();
    let mut app = booted(&flag);
    let presents = app.display().surface().presents;

    for t in (2_100..9_000).step_by(50) {
        app.poll(t);
    }
    assert_eq!(app.display().surface().presents, presents);
}

// Button flows

#[test]
fn long_press_asks_restart_then_dismisses() {
    let flag = RenderRequest::new();
    let mut app = booted(&flag);

    long_press(&mut app, 2_050);
    assert_eq!(app.display().state(), &DisplayState::AskRestart);
    assert!(app.display().surface().shows("Restart?"));

    app.poll(4_050);
    app.poll(4_100);
    assert!(app.display().state().is_main());
    assert!(app.display().surface().shows("3:07pm"));
    assert_eq!(app.power().restarts, 0);
}

#[test]
fn second_long_press_restarts() {
    let flag = RenderRequest::new();
    let mut app = booted(&flag);

    long_press(&mut app, 2_050);
    long_press(&mut app, 2_050);
    assert_eq!(app.power().restarts, 1);
}

#[test]
fn click_on_main_changes_nothing() {
    let flag = RenderRequest::new();
    let mut app = booted(&flag);
    let presents = app.display().surface().presents;

    click(&mut app, 2_050);
    assert!(app.display().state().is_main());
    assert_eq!(app.display().surface().presents, presents);
}

#[test]
fn configured_network_connects_then_shows_main() {
    let flag = RenderRequest::new();
    let mut app = meter(&flag, Sensor::steady(), Net::new(NetStatus::NeedsConfig));
    app.setup(0);
    assert!(matches!(app.display().state(), DisplayState::NetConfig(_)));

    click(&mut app, 0);
    assert_eq!(app.display().state(), &DisplayState::Connecting);
    assert_eq!(app.network().retries, 1);

    app.poll(2_000);
    app.poll(2_050);
    assert!(app.display().state().is_main());
}

#[test]
fn failed_retry_stays_on_net_fail() {
    let flag = RenderRequest::new();
    let mut net = Net::new(NetStatus::Failed);
    net.retry_ok = false;
    let mut app = meter(&flag, Sensor::steady(), net);
    app.setup(0);

    click(&mut app, 0);
    assert_eq!(app.display().state(), &DisplayState::NetFail);
    assert_eq!(app.network().retries, 1);
}

#[test]
fn button_from_another_pin_is_ignored() {
    let flag = RenderRequest::new();
    let mut app = booted(&flag);

    app.on_input(2_050, ButtonId(3), InputEvent::LongPress);
    assert!(app.display().state().is_main());
}

// Sensor

#[test]
fn sensor_failure_shows_placeholder_until_recovery() {
    let flag = RenderRequest::new();
    let mut sensor = Sensor::steady();
    sensor.queue.push_back(Ok(UvReading { uva: 3.27, uvb: 0.41 }));
    for _ in 0..3 {
        sensor.queue.push_back(Err(SensorError::Bus.into()));
    }
    let mut app = meter(&flag, sensor, Net::new(NetStatus::Online));
    app.setup(0);
    app.poll(2_000);
    app.poll(2_050);
    assert!(app.display().surface().shows("3.2 0.4"));

    for t in [3_000, 4_000, 5_000] {
        app.poll(t);
        assert_eq!(app.sampler().health(), Health::Failing);
    }
    assert!(app.display().surface().shows(UV_PLACEHOLDER));

    app.poll(6_000);
    assert_eq!(app.sampler().health(), Health::Ok);
    assert!(app.display().surface().shows("1.5 2.1"));
}

// Sleep

#[test]
fn idle_device_prompts_then_sleeps() {
    let flag = RenderRequest::new();
    let mut app = booted(&flag);

    app.poll(10_000);
    assert_eq!(app.display().state(), &DisplayState::AskPreSleep);
    app.poll(10_050);
    assert!(app.display().surface().shows("Going to sleep"));

    // Prompt times out: back to Main, then the grace period runs out.
    app.poll(12_000);
    assert!(app.display().state().is_main());
    assert_eq!(app.power().sleeps, 0);

    app.poll(15_000);
    assert_eq!(app.power().sleeps, 1);
    assert_eq!(app.power().wake, Some(WAKE_SOURCE));
    assert!(app.display().surface().off);
    // The host cannot power down.
    assert!(app.sleep_manager().sleep_failed());
}

#[test]
fn long_press_on_prompt_sleeps_immediately() {
    let flag = RenderRequest::new();
    let mut app = booted(&flag);

    app.poll(10_000);
    long_press(&mut app, 10_000);
    assert_eq!(app.power().sleeps, 1);
}

#[test]
fn click_on_prompt_keeps_device_awake() {
    let flag = RenderRequest::new();
    let mut app = booted(&flag);

    app.poll(10_000);
    click(&mut app, 10_000);
    assert!(app.display().state().is_main());

    for t in (10_050..19_950).step_by(50) {
        app.poll(t);
    }
    assert!(app.display().state().is_main());
    assert_eq!(app.power().sleeps, 0);

    // A full idle period after the click prompts again.
    app.poll(20_000);
    assert_eq!(app.display().state(), &DisplayState::AskPreSleep);
}

#[test]
fn activity_pushes_the_sleep_deadline_back() {
    let flag = RenderRequest::new();
    let mut app = booted(&flag);

    app.poll(9_000);
    click(&mut app, 9_000);
    app.poll(10_000);
    assert!(app.display().state().is_main());

    app.poll(19_000);
    assert_eq!(app.display().state(), &DisplayState::AskPreSleep);
}

#[test]
fn shell_cannot_jump_to_reset_confirmation() {
    let flag = RenderRequest::new();
    let mut app = booted(&flag);

    app.render(DisplayState::VerifyResetNetwork);
    assert!(app.display().state().is_main());

    long_press(&mut app, 2_100);
    assert_eq!(app.display().state(), &DisplayState::AskRestart);
}
