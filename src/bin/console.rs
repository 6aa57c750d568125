//! Desktop harness for the uvmeter core.
//!
//! Prints every presented frame to stdout and reads the button from the
//! keyboard: `1` + Enter is a click, `2` + Enter a long press, `q` quits.
//! The sensor returns fixed values and the clock is the host's local time.
//!
//! Run with `RUST_LOG=debug cargo run --features console --bin uvmeter-console`.

use std::convert::Infallible;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{Datelike, Local, Timelike};
use embedded_hal::delay::DelayNs;
use log::info;

use uvmeter::config::{Timing, LOOP_TICK_MS};
use uvmeter::platform::{
    ClockWeather, FontTier, MeasureMode, NetStatus, Network, PowerControl, RenderSurface,
    SensorReader, UvReading, WakeSource, WallTime,
};
use uvmeter::render::{DeferredRender, RenderRequest};
use uvmeter::ui::{ButtonId, InputEvent};
use uvmeter::{Application, Board, Error, Parts, UvMeter};

static RENDER_REQUEST: RenderRequest = RenderRequest::new();

// ---------------------------------------------------------------------------
// Simulated hardware
// ---------------------------------------------------------------------------

/// Collects the text of the current frame and prints it on present.
#[derive(Default)]
struct ConsoleSurface {
    lines: Vec<(i32, String)>,
    off: bool,
}

impl RenderSurface for ConsoleSurface {
    fn begin(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn clear(&mut self) {
        self.lines.clear();
    }

    fn draw_text(&mut self, text: &str, _tier: FontTier, x: i32, y: i32, inverted: bool) {
        let text = if inverted {
            format!("{:>pad$}[{}]", "", text, pad = (x / 6) as usize)
        } else {
            format!("{:>pad$}{}", "", text, pad = (x / 6) as usize)
        };
        self.lines.push((y, text));
    }

    fn fill_band(&mut self, _y: i32, _height: u32) {}

    fn present(&mut self) -> Result<(), Error> {
        if self.off {
            return Ok(());
        }
        let mut lines = self.lines.clone();
        lines.sort_by_key(|(y, _)| *y);
        let mut out = io::stdout().lock();
        let _ = writeln!(out, "+{}+", "-".repeat(24));
        for (_, text) in &lines {
            let _ = writeln!(out, "| {:<22} |", text);
        }
        let _ = writeln!(out, "+{}+", "-".repeat(24));
        Ok(())
    }

    fn power_off(&mut self) {
        self.off = true;
        println!("[display off]");
    }
}

/// Always reports the same irradiance.
struct FixedSensor;

impl SensorReader for FixedSensor {
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
        0
    }

    fn is_ready(&mut self) -> Result<bool, Error> {
        Ok(true)
    }

    fn read_values(&mut self) -> Result<UvReading, Error> {
        Ok(UvReading {
            uva: 1.532,
            uvb: 2.145,
        })
    }
}

/// Host local time with canned weather.
struct HostClock;

impl ClockWeather for HostClock {
    fn current_time(&self) -> WallTime {
        let now = Local::now();
        WallTime {
            hour: now.hour() as u8,
            minute: now.minute() as u8,
            month: now.month() as u8,
            day: now.day() as u8,
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

struct ConsoleNetwork;

impl Network for ConsoleNetwork {
    fn begin(&mut self) -> NetStatus {
        NetStatus::Online
    }

    fn retry_setup(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn refresh(&mut self) -> Result<(), Error> {
        Ok(())
    }

    fn reset(&mut self) {
        info!("Network: credentials cleared");
    }
}

/// Deep sleep and restart end the process.
struct ConsolePower;

impl PowerControl for ConsolePower {
    fn configure_wake(&mut self, source: WakeSource) {
        info!("Power: wake on pin {} {:?}", source.pin, source.level);
    }

    fn deep_sleep(&mut self) -> Result<Infallible, Error> {
        println!("[deep sleep]");
        std::process::exit(0)
    }

    fn restart(&mut self) {
        println!("[restart]");
        std::process::exit(0)
    }
}

struct ThreadDelay;

impl DelayNs for ThreadDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

struct ConsoleBoard;

impl Board for ConsoleBoard {
    type Surface = ConsoleSurface;
    type Sensor = FixedSensor;
    type Clock = HostClock;
    type Network = ConsoleNetwork;
    type Power = ConsolePower;
    type Delay = ThreadDelay;
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

enum Key {
    Press(InputEvent),
    Quit,
}

fn parse_key(line: &str) -> Option<Key> {
    match line.trim() {
        "1" => Some(Key::Press(InputEvent::Click)),
        "2" => Some(Key::Press(InputEvent::LongPress)),
        "q" | "Q" => Some(Key::Quit),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() {
    env_logger::init();
    info!("Starting uvmeter console");
    println!("Keys: 1=Click  2=LongPress  q=Quit (then Enter)");

    // Sleep sooner than the device so the prompt is easy to reach.
    let timing = Timing {
        sleep_ms: 60_000,
        ..Timing::DEFAULT
    };
    let parts = Parts::<ConsoleBoard> {
        surface: ConsoleSurface::default(),
        sensor: FixedSensor,
        clock: HostClock,
        network: ConsoleNetwork,
        power: ConsolePower,
        delay: ThreadDelay,
    };
    let mut app = UvMeter::new(parts, DeferredRender::new(&RENDER_REQUEST), timing);

    // Keyboard reader runs on its own thread and only posts keys.
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines().map_while(Result::ok) {
            if let Some(key) = parse_key(&line) {
                if tx.send(key).is_err() {
                    break;
                }
            }
        }
    });

    let start = Instant::now();
    let now_ms = || start.elapsed().as_millis() as u64;
    app.setup(now_ms());

    loop {
        match rx.recv_timeout(Duration::from_millis(LOOP_TICK_MS)) {
            Ok(Key::Press(event)) => {
                info!("Key: {:?}", event);
                app.on_input(now_ms(), ButtonId::SELECT, event);
            }
            Ok(Key::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }
        app.poll(now_ms());
    }
    info!("Bye");
}
