//! User interface subsystem - OLED display + one physical button.
//!
//! The controller maintains a state machine that reacts to button presses
//! and timer expiries, rendering the current state on the SSD1306 OLED.
//!
//! ## Components
//!
//! - **Display**: SSD1306 128×64 OLED via I²C
//! - **Button**: one tactile switch; a short press is a click, a held
//!   press is a long press. It also wakes the device from deep sleep.

pub mod controller;
pub mod format;
pub mod input_logic;
pub mod layout;

use heapless::String;

/// Button events (after debouncing and hold-time classification).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputEvent {
    Click,
    LongPress,
}

/// Identifies the physical button an event came from.
///
/// The meter has a single select button; the id is carried so events from
/// anything else can be rejected at the boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonId(pub u8);

impl ButtonId {
    pub const SELECT: Self = Self(crate::config::WAKE_BUTTON_PIN);
}

/// Morning or afternoon half of a 12-hour clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    pub const fn suffix(self) -> &'static str {
        match self {
            Meridiem::Am => "am",
            Meridiem::Pm => "pm",
        }
    }
}

/// Capacity of the one-line weather summary.
pub const WEATHER_LEN: usize = 32;

/// Capacity of the configuration portal name.
pub const PORTAL_NAME_LEN: usize = 24;

/// Everything the main screen shows.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MainView {
    /// 1..=12
    pub hour: u8,
    pub minute: u8,
    pub meridiem: Meridiem,
    pub month: u8,
    pub day: u8,
    pub weather: String<WEATHER_LEN>,
    pub uva: f32,
    pub uvb: f32,
    pub sensor_ok: bool,
}

impl Default for MainView {
    /// Midnight on 1/1 with no sensor data yet.
    fn default() -> Self {
        Self {
            hour: 12,
            minute: 0,
            meridiem: Meridiem::Am,
            month: 1,
            day: 1,
            weather: String::new(),
            uva: 0.0,
            uvb: 0.0,
            sensor_ok: false,
        }
    }
}

/// What the display currently shows.
///
/// Every state except `Main` is a transient overlay that reverts to `Main`
/// when the dismiss timer fires.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayState {
    Startup,
    Connecting,
    NetConfig(String<PORTAL_NAME_LEN>),
    NetFail,
    UpdateFail,
    AskRestart,
    AskResetNetwork,
    VerifyResetNetwork,
    AskPreSleep,
    Main(MainView),
}

/// Payload-free discriminant of [`DisplayState`], used to index tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StateTag {
    Startup,
    Connecting,
    NetConfig,
    NetFail,
    UpdateFail,
    AskRestart,
    AskResetNetwork,
    VerifyResetNetwork,
    AskPreSleep,
    Main,
}

impl StateTag {
    pub const COUNT: usize = 10;

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl DisplayState {
    pub fn tag(&self) -> StateTag {
        match self {
            DisplayState::Startup => StateTag::Startup,
            DisplayState::Connecting => StateTag::Connecting,
            DisplayState::NetConfig(_) => StateTag::NetConfig,
            DisplayState::NetFail => StateTag::NetFail,
            DisplayState::UpdateFail => StateTag::UpdateFail,
            DisplayState::AskRestart => StateTag::AskRestart,
            DisplayState::AskResetNetwork => StateTag::AskResetNetwork,
            DisplayState::VerifyResetNetwork => StateTag::VerifyResetNetwork,
            DisplayState::AskPreSleep => StateTag::AskPreSleep,
            DisplayState::Main(_) => StateTag::Main,
        }
    }

    /// `NetConfig` carrying the portal name, truncated to fit.
    pub fn net_config(portal: &str) -> Self {
        let mut name = String::new();
        for c in portal.chars() {
            if name.push(c).is_err() {
                break;
            }
        }
        DisplayState::NetConfig(name)
    }

    pub fn is_main(&self) -> bool {
        matches!(self, DisplayState::Main(_))
    }

    /// Overlays revert to `Main` after the dismiss duration.
    pub fn is_transient(&self) -> bool {
        !self.is_main()
    }
}
