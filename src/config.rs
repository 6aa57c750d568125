//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and layout offsets
//! live here so they can be tuned in one place.

// Display

/// SSD1306 panel geometry (pixels).
pub const DISPLAY_WIDTH: u32 = 128;
pub const DISPLAY_HEIGHT: u32 = 64;

/// SSD1306 7-bit I²C address.
pub const DISPLAY_I2C_ADDR: u8 = 0x3C;

// Layout (top edge of each text row, in pixels)

/// First line of a message body.
pub const MESSAGE_OFFSET: i32 = 20;
/// Second line of a two-line message (startup banner).
pub const MESSAGE_OFFSET_2: i32 = 40;
/// Time and date row on the main screen.
pub const TIME_DATE_OFFSET: i32 = 0;
/// One-line weather summary on the main screen.
pub const WEATHER_OFFSET: i32 = 14;
/// Inverted "UVA  UVB" header band.
pub const UV_HEADER_OFFSET: i32 = 26;
/// Large UV readings.
pub const UV_VALUES_OFFSET: i32 = 40;

// UV sensor

/// AS7331 7-bit I²C address (A0 = A1 = GND).
pub const UV_SENSOR_I2C_ADDR: u8 = 0x74;

/// How often the UV sensor is sampled (ms).
pub const UV_SAMPLE_PERIOD_MS: u64 = 1000;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Select / wake button → P0.24 (N/O to ground, pull-up)
//   I²C SDA              → P0.26
//   I²C SCL              → P0.27

/// GPIO number of the select/wake button on port 0.
pub const WAKE_BUTTON_PIN: u8 = 24;

/// Button debounce time (ms).
pub const BUTTON_DEBOUNCE_MS: u64 = 50;

/// Holding the button at least this long reports a long press (ms).
pub const LONG_PRESS_MS: u64 = 800;

// Timers

/// Transient messages revert to the main screen after this long (ms).
pub const DISMISS_AFTER_MS: u32 = 2000;

/// Inactivity before the device goes to deep sleep (seconds).
pub const SLEEP_AFTER_SECS: u32 = 5 * 60;

/// After an unanswered sleep prompt, sleep this much later (ms).
pub const PRE_SLEEP_GRACE_MS: u32 = 3000;

/// Upper bound on how long the main loop waits for input (ms).
pub const LOOP_TICK_MS: u64 = 50;

// Network

/// Name shown when the device asks for network configuration.
pub const CONFIG_PORTAL_NAME: &str = "MT UVMeter";

/// Timing knobs handed to the application.
///
/// Firmware uses [`Timing::DEFAULT`]; tests and the console harness
/// shorten the long ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    pub dismiss_ms: u32,
    pub sleep_ms: u32,
    pub pre_sleep_grace_ms: u32,
    pub sample_period_ms: u64,
}

impl Timing {
    pub const DEFAULT: Self = Self {
        dismiss_ms: DISMISS_AFTER_MS,
        sleep_ms: SLEEP_AFTER_SECS * 1000,
        pre_sleep_grace_ms: PRE_SLEEP_GRACE_MS,
        sample_period_ms: UV_SAMPLE_PERIOD_MS,
    };
}

impl Default for Timing {
    fn default() -> Self {
        Self::DEFAULT
    }
}
