//! Static screen layouts.
//!
//! Each display state maps to one [`StateLayout`] in [`LAYOUTS`]: the font
//! tier, vertical offset, alignment and inversion of its title and body.
//! The main screen uses the fixed rows in [`MAIN_ROWS`]. Drawing code looks
//! layouts up here instead of branching per state.

use core::fmt::Write;

use heapless::{String, Vec};

use super::{DisplayState, StateTag};
use crate::config::{
    DISPLAY_WIDTH, MESSAGE_OFFSET, MESSAGE_OFFSET_2, TIME_DATE_OFFSET, UV_HEADER_OFFSET,
    UV_VALUES_OFFSET, WEATHER_OFFSET,
};
use crate::platform::{FontTier, RenderSurface};

/// Maximum number of wrapped body lines.
pub const MAX_BODY_LINES: usize = 5;

/// Capacity of a formatted message body.
pub const MESSAGE_LEN: usize = 96;

/// Header above the two UV readings.
pub const UV_HEADER: &str = "UVA    UVB";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Placement of one text row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Row {
    pub tier: FontTier,
    /// Top edge of the first line (px).
    pub y: i32,
    pub align: Align,
    /// Dark text on a lit full-width band.
    pub inverted: bool,
}

impl Row {
    const fn new(tier: FontTier, y: i32, align: Align, inverted: bool) -> Self {
        Self {
            tier,
            y,
            align,
            inverted,
        }
    }

    /// Height of the lit band behind an inverted row.
    pub const fn band_height(&self) -> u32 {
        self.tier.line_height() + 2
    }
}

/// Title and body of a message state.
#[derive(Clone, Copy, Debug)]
pub struct StateLayout {
    pub tag: StateTag,
    pub title: &'static str,
    pub title_row: Row,
    /// Static body text; `NetConfig` builds its body at render time.
    pub body: &'static str,
    pub body_row: Row,
}

const BANNER: Row = Row::new(FontTier::Small, 0, Align::Center, true);
const BODY: Row = Row::new(FontTier::Small, MESSAGE_OFFSET, Align::Left, false);
const CONFIRM: &str = "Long press for yes";

/// One entry per [`StateTag`], in declaration order.
pub static LAYOUTS: [StateLayout; StateTag::COUNT] = [
    StateLayout {
        tag: StateTag::Startup,
        title: "UVMeter",
        title_row: Row::new(FontTier::Large, 12, Align::Center, false),
        body: concat!("v", env!("CARGO_PKG_VERSION")),
        body_row: Row::new(FontTier::Small, MESSAGE_OFFSET_2, Align::Center, false),
    },
    StateLayout {
        tag: StateTag::Connecting,
        title: "Connecting...",
        title_row: Row::new(FontTier::Medium, MESSAGE_OFFSET, Align::Center, false),
        body: "",
        body_row: BODY,
    },
    StateLayout {
        tag: StateTag::NetConfig,
        title: "Config WiFi",
        title_row: BANNER,
        body: "",
        body_row: BODY,
    },
    StateLayout {
        tag: StateTag::NetFail,
        title: "Network failed",
        title_row: BANNER,
        body: "Press [select] to retry.",
        body_row: BODY,
    },
    StateLayout {
        tag: StateTag::UpdateFail,
        title: "Update failed",
        title_row: BANNER,
        body: "Time or weather update failed, press [select] to retry.",
        body_row: BODY,
    },
    StateLayout {
        tag: StateTag::AskRestart,
        title: "Restart?",
        title_row: BANNER,
        body: CONFIRM,
        body_row: BODY,
    },
    StateLayout {
        tag: StateTag::AskResetNetwork,
        title: "Reset network?",
        title_row: BANNER,
        body: CONFIRM,
        body_row: BODY,
    },
    StateLayout {
        tag: StateTag::VerifyResetNetwork,
        title: "Are you sure?",
        title_row: BANNER,
        body: CONFIRM,
        body_row: BODY,
    },
    StateLayout {
        tag: StateTag::AskPreSleep,
        title: "Going to sleep",
        title_row: BANNER,
        body: "Click to stay awake, long press to sleep now.",
        body_row: BODY,
    },
    // Drawn row by row from MAIN_ROWS; the entry spans its first and last row.
    StateLayout {
        tag: StateTag::Main,
        title: "",
        title_row: MAIN_ROWS.time,
        body: "",
        body_row: MAIN_ROWS.uv_values,
    },
];

/// States `set_state` may move to from each state, indexed by [`StateTag`].
///
/// Staying in the same state is always allowed (retries that fail again,
/// main-screen refreshes). Dismiss reverts and the return from the
/// pre-sleep prompt bypass this table.
pub static TRANSITIONS: [&[StateTag]; StateTag::COUNT] = {
    use StateTag::*;
    [
        // Startup: network bring-up results, reset request.
        &[Main, NetConfig, NetFail, UpdateFail, AskResetNetwork],
        // Connecting
        &[Main, NetFail],
        // NetConfig
        &[Main, Connecting, AskResetNetwork, AskPreSleep],
        // NetFail
        &[Main, AskResetNetwork, AskPreSleep],
        // UpdateFail
        &[Main, AskPreSleep],
        // AskRestart
        &[Main],
        // AskResetNetwork
        &[Main, VerifyResetNetwork],
        // VerifyResetNetwork
        &[Main],
        // AskPreSleep
        &[Main, NetConfig, NetFail, UpdateFail],
        // Main
        &[AskRestart, AskPreSleep],
    ]
};

/// Whether `set_state` accepts a move from `from` to `to`.
pub fn transition_allowed(from: StateTag, to: StateTag) -> bool {
    from == to || TRANSITIONS[from.index()].contains(&to)
}

pub fn layout(tag: StateTag) -> &'static StateLayout {
    &LAYOUTS[tag.index()]
}

/// Rows of the main screen.
#[derive(Clone, Copy, Debug)]
pub struct MainRows {
    pub time: Row,
    pub date: Row,
    pub weather: Row,
    pub uv_header: Row,
    pub uv_values: Row,
}

pub const MAIN_ROWS: MainRows = MainRows {
    time: Row::new(FontTier::Small, TIME_DATE_OFFSET, Align::Left, false),
    date: Row::new(FontTier::Small, TIME_DATE_OFFSET, Align::Right, false),
    weather: Row::new(FontTier::Compact, WEATHER_OFFSET, Align::Left, false),
    uv_header: Row::new(FontTier::Small, UV_HEADER_OFFSET, Align::Center, true),
    uv_values: Row::new(FontTier::Large, UV_VALUES_OFFSET, Align::Center, false),
};

/// Body text of a message state.
pub fn body_text(state: &DisplayState) -> String<MESSAGE_LEN> {
    let mut s = String::new();
    match state {
        DisplayState::NetConfig(portal) => {
            let _ = write!(s, "Connect to {}, press [sel] to retry.", portal);
        }
        other => {
            let _ = s.push_str(layout(other.tag()).body);
        }
    }
    s
}

/// Left edge for `text` drawn on `row`.
pub fn place_x<S: RenderSurface + ?Sized>(surface: &S, text: &str, row: &Row) -> i32 {
    let width = DISPLAY_WIDTH as i32;
    let text_width = surface.measure_width(text, row.tier) as i32;
    let x = match row.align {
        Align::Left => 0,
        Align::Center => (width - text_width) / 2,
        Align::Right => width - text_width,
    };
    x.max(0)
}

/// Break `text` at spaces into lines no wider than the display.
///
/// A single word wider than the display gets a line of its own and is
/// clipped by the panel. Lines past [`MAX_BODY_LINES`] are dropped.
pub fn wrap<'a, S: RenderSurface + ?Sized>(
    surface: &S,
    text: &'a str,
    tier: FontTier,
) -> Vec<&'a str, MAX_BODY_LINES> {
    let mut lines = Vec::new();
    let mut line: Option<(usize, usize)> = None;
    let mut offset = 0;

    for word in text.split(' ') {
        let word_start = offset;
        let word_end = word_start + word.len();
        offset = word_end + 1;
        if word.is_empty() {
            continue;
        }

        line = match line {
            None => Some((word_start, word_end)),
            Some((start, end)) => {
                if surface.measure_width(&text[start..word_end], tier) <= DISPLAY_WIDTH {
                    Some((start, word_end))
                } else {
                    if lines.push(&text[start..end]).is_err() {
                        return lines;
                    }
                    Some((word_start, word_end))
                }
            }
        };
    }

    if let Some((start, end)) = line {
        let _ = lines.push(&text[start..end]);
    }
    lines
}
