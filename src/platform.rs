//! Narrow interfaces to the hardware and services the core drives.
//!
//! The core never touches a peripheral directly: the OLED, the UV sensor,
//! the timer service, the clock/weather source, the network and the power
//! controller are all reached through these traits. The firmware binary
//! implements them on nRF52840 peripherals; tests implement them with
//! recording fakes.

use core::convert::Infallible;

use crate::error::Error;
use crate::timer::{Expired, TimerHandle, TimerId};

// Render surface

/// Font size tiers, smallest first.
///
/// Metrics match the embedded-graphics ASCII mono fonts used on the OLED
/// (4x6, 6x10, 7x13, 10x20).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FontTier {
    Compact,
    Small,
    Medium,
    Large,
}

impl FontTier {
    /// Horizontal advance of one glyph (px).
    pub const fn glyph_width(self) -> u32 {
        match self {
            FontTier::Compact => 4,
            FontTier::Small => 6,
            FontTier::Medium => 7,
            FontTier::Large => 10,
        }
    }

    /// Vertical distance between consecutive text lines (px).
    pub const fn line_height(self) -> u32 {
        match self {
            FontTier::Compact => 6,
            FontTier::Small => 10,
            FontTier::Medium => 13,
            FontTier::Large => 20,
        }
    }
}

/// Monochrome text surface with an off-screen buffer.
///
/// Everything except [`RenderSurface::present`] only touches the buffer.
/// `present` pushes the buffer to the panel and must only be called from
/// the main loop (see [`crate::render`]).
pub trait RenderSurface {
    /// Power up and initialise the panel.
    fn begin(&mut self) -> Result<(), Error>;

    /// Clear the off-screen buffer.
    fn clear(&mut self);

    /// Draw `text` with its top-left corner at (`x`, `y`).
    ///
    /// `inverted` draws dark glyphs, for use on top of [`RenderSurface::fill_band`].
    fn draw_text(&mut self, text: &str, tier: FontTier, x: i32, y: i32, inverted: bool);

    /// Light a full-width band of `height` pixels starting at row `y`.
    fn fill_band(&mut self, y: i32, height: u32);

    /// Flush the buffer to the panel.
    fn present(&mut self) -> Result<(), Error>;

    /// Rendered width of `text` in pixels.
    fn measure_width(&self, text: &str, tier: FontTier) -> u32 {
        text.chars().count() as u32 * tier.glyph_width()
    }

    /// Turn the panel off (before deep sleep).
    fn power_off(&mut self);
}

// UV sensor

/// Measurement modes of the UV sensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeasureMode {
    /// Free-running conversions.
    Continuous,
    /// One conversion per start command.
    Command,
    /// Conversions gated by the SYN pin edge.
    SyncEdge,
    /// Conversion window set by SYN start/end edges.
    SyncStartEnd,
}

/// One pair of irradiance values (mW/cm²) as read from the sensor.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UvReading {
    pub uva: f32,
    pub uvb: f32,
}

/// Register-level UV sensor access.
pub trait SensorReader {
    /// Probe and wake the device.
    fn begin(&mut self) -> Result<(), Error>;

    /// Configure gain, conversion time and mode.
    fn prepare_measurement(&mut self, mode: MeasureMode) -> Result<(), Error>;

    /// Kick off one conversion.
    fn start_measurement(&mut self) -> Result<(), Error>;

    /// Declared duration of one conversion.
    fn conversion_time_ms(&self) -> u32;

    /// Whether the last conversion has finished.
    fn is_ready(&mut self) -> Result<bool, Error>;

    /// Fetch the results of the last conversion.
    fn read_values(&mut self) -> Result<UvReading, Error>;
}

// Timers

/// Fire-once timers.
///
/// Expiries are not delivered by calling back into the core; the main loop
/// collects them with [`TimerService::take_expired`] and dispatches them
/// itself, so callback-originated work is serialised with everything else.
pub trait TimerService {
    /// Move the service's notion of "now" forward.
    fn advance_to(&mut self, now_ms: u64);

    /// Schedule `timer` to expire `after_ms` from now.
    fn schedule_once(&mut self, timer: TimerId, after_ms: u32) -> Result<TimerHandle, Error>;

    /// Cancel a pending timer. Unknown or already-fired handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);

    /// Pop the earliest timer that has expired, if any.
    fn take_expired(&mut self) -> Option<Expired>;
}

// Clock / weather

/// Local wall-clock time, 24-hour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WallTime {
    pub hour: u8,
    pub minute: u8,
    pub month: u8,
    pub day: u8,
}

/// Time of day and current weather.
pub trait ClockWeather {
    fn current_time(&self) -> WallTime;
    fn current_temp(&self) -> Option<i16>;
    fn high_temp(&self) -> Option<i16>;
    fn low_temp(&self) -> Option<i16>;
    fn weather_conditions(&self) -> &str;
}

// Network

/// Outcome of bringing the network up at boot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NetStatus {
    Online,
    /// No credentials stored; the user must configure the network.
    NeedsConfig,
    Failed,
}

/// Network bring-up and the time/weather updates that ride on it.
pub trait Network {
    fn begin(&mut self) -> NetStatus;

    /// Try the network setup again after a failure or configuration.
    fn retry_setup(&mut self) -> Result<(), Error>;

    /// Fetch fresh time and weather.
    fn refresh(&mut self) -> Result<(), Error>;

    /// Forget stored network credentials.
    fn reset(&mut self);
}

// Power

/// Electrical level that wakes the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WakeLevel {
    Low,
    High,
}

/// Pin and level that end deep sleep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WakeSource {
    pub pin: u8,
    pub level: WakeLevel,
}

/// Sleep and reset primitives.
pub trait PowerControl {
    fn configure_wake(&mut self, source: WakeSource);

    /// Power down until the wake source fires.
    ///
    /// Never returns on success; a return means the primitive failed to
    /// engage and the device is still awake.
    fn deep_sleep(&mut self) -> Result<Infallible, Error>;

    /// Reset the device.
    fn restart(&mut self);
}
