//! Text formatting for the main screen.
//!
//! All helpers write into fixed-capacity `heapless::String`s; text that
//! does not fit is cut at the capacity rather than failing.

use core::fmt::Write;

use heapless::String;

use super::{Meridiem, WEATHER_LEN};
use crate::platform::ClockWeather;

/// Shown instead of numbers while the sensor is unavailable.
pub const UV_PLACEHOLDER: &str = "---- ----";

/// Convert a 24-hour hour to the 12-hour clock.
///
/// 0 → 12 am, 12 → 12 pm, 13..=23 → 1..=11 pm. Out-of-range input wraps.
pub fn hour12(hour: u8) -> (u8, Meridiem) {
    match hour % 24 {
        0 => (12, Meridiem::Am),
        h @ 1..=11 => (h, Meridiem::Am),
        12 => (12, Meridiem::Pm),
        h => (h - 12, Meridiem::Pm),
    }
}

/// "3:07pm"
pub fn format_clock(hour: u8, minute: u8, meridiem: Meridiem) -> String<8> {
    let mut s = String::new();
    let _ = write!(s, "{}:{:02}{}", hour, minute, meridiem.suffix());
    s
}

/// "10/19"
pub fn format_date(month: u8, day: u8) -> String<8> {
    let mut s = String::new();
    let _ = write!(s, "{}/{}", month, day);
    s
}

/// One decimal place, truncated: 3.27 → "3.2". Negative and NaN read as 0.
pub fn format_uv(value: f32) -> String<12> {
    // `as` saturates and maps NaN to 0, so this is floor() for v >= 0.
    let v = if value > 0.0 { value } else { 0.0 };
    let whole = v as u32;
    let tenths = (((v - whole as f32) * 10.0) as u32).min(9);

    let mut s = String::new();
    let _ = write!(s, "{}.{}", whole, tenths);
    s
}

/// "3.2 0.1", or the placeholder when the sensor is not healthy.
pub fn format_uv_pair(uva: f32, uvb: f32, sensor_ok: bool) -> String<24> {
    let mut s = String::new();
    if sensor_ok {
        let _ = write!(s, "{} {}", format_uv(uva), format_uv(uvb));
    } else {
        let _ = s.push_str(UV_PLACEHOLDER);
    }
    s
}

/// "72 55/81 Sunny"; parts that are unknown are left out.
pub fn weather_summary(clock: &impl ClockWeather) -> String<WEATHER_LEN> {
    let mut s = String::new();
    if let Some(now) = clock.current_temp() {
        let _ = write!(s, "{}", now);
        if let (Some(lo), Some(hi)) = (clock.low_temp(), clock.high_temp()) {
            let _ = write!(s, " {}/{}", lo, hi);
        }
    }
    let conditions = clock.weather_conditions();
    if !conditions.is_empty() {
        if !s.is_empty() {
            let _ = s.push(' ');
        }
        for c in conditions.chars() {
            if s.push(c).is_err() {
                break;
            }
        }
    }
    s
}
