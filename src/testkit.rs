//! Recording fakes for the unit tests.

use core::convert::Infallible;
use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};

use crate::error::Error;
use crate::platform::{
    ClockWeather, FontTier, MeasureMode, NetStatus, Network, PowerControl, RenderSurface,
    SensorReader, UvReading, WakeSource, WallTime,
};

// Render surface

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Clear,
    Text {
        text: String,
        tier: FontTier,
        x: i32,
        y: i32,
        inverted: bool,
    },
    Band {
        y: i32,
        height: u32,
    },
}

#[derive(Default)]
pub struct FakeSurface {
    pub ops: Vec<DrawOp>,
    pub presents: usize,
    pub fail_present: bool,
    pub fail_begin: bool,
    pub begun: bool,
    pub powered_off: bool,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations since the last clear.
    pub fn frame(&self) -> &[DrawOp] {
        let start = self
            .ops
            .iter()
            .rposition(|op| *op == DrawOp::Clear)
            .map_or(0, |i| i + 1);
        &self.ops[start..]
    }

    /// Text drawn since the last clear, in draw order.
    pub fn texts(&self) -> Vec<String> {
        self.frame()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }
}

impl RenderSurface for FakeSurface {
    fn begin(&mut self) -> Result<(), Error> {
        if self.fail_begin {
            return Err(Error::Display);
        }
        self.begun = true;
        Ok(())
    }

    fn clear(&mut self) {
        self.ops.push(DrawOp::Clear);
    }

    fn draw_text(&mut self, text: &str, tier: FontTier, x: i32, y: i32, inverted: bool) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            tier,
            x,
            y,
            inverted,
        });
    }

    fn fill_band(&mut self, y: i32, height: u32) {
        self.ops.push(DrawOp::Band { y, height });
    }

    fn present(&mut self) -> Result<(), Error> {
        if self.fail_present {
            return Err(Error::Display);
        }
        self.presents += 1;
        Ok(())
    }

    fn power_off(&mut self) {
        self.powered_off = true;
    }
}

// Clock / weather

pub struct FakeClock {
    pub time: WallTime,
    pub temp: Option<i16>,
    pub low: Option<i16>,
    pub high: Option<i16>,
    pub conditions: &'static str,
}

impl FakeClock {
    /// 24-hour `hour:minute` on 10/19 with no weather.
    pub fn at(hour: u8, minute: u8) -> Self {
        Self {
            time: WallTime {
                hour,
                minute,
                month: 10,
                day: 19,
            },
            temp: None,
            low: None,
            high: None,
            conditions: "",
        }
    }

    pub fn with_weather(
        mut self,
        temp: Option<i16>,
        low: Option<i16>,
        high: Option<i16>,
        conditions: &'static str,
    ) -> Self {
        self.temp = temp;
        self.low = low;
        self.high = high;
        self.conditions = conditions;
        self
    }
}

impl ClockWeather for FakeClock {
    fn current_time(&self) -> WallTime {
        self.time
    }

    fn current_temp(&self) -> Option<i16> {
        self.temp
    }

    fn high_temp(&self) -> Option<i16> {
        self.high
    }

    fn low_temp(&self) -> Option<i16> {
        self.low
    }

    fn weather_conditions(&self) -> &str {
        self.conditions
    }
}

// UV sensor

/// Sensor whose results are queued up front.
///
/// `read_values` pops `readings`; once empty it returns 1.0 / 0.5.
pub struct ScriptedSensor {
    pub begin_result: Result<(), Error>,
    pub readings: VecDeque<Result<UvReading, Error>>,
    pub ready: bool,
    pub conversion_ms: u32,
    pub prepared: Option<MeasureMode>,
    pub starts: usize,
    pub reads: usize,
}

impl ScriptedSensor {
    pub fn new() -> Self {
        Self {
            begin_result: Ok(()),
            readings: VecDeque::new(),
            ready: true,
            conversion_ms: 68,
            prepared: None,
            starts: 0,
            reads: 0,
        }
    }
}

impl SensorReader for ScriptedSensor {
    fn begin(&mut self) -> Result<(), Error> {
        self.begin_result
    }

    fn prepare_measurement(&mut self, mode: MeasureMode) -> Result<(), Error> {
        self.prepared = Some(mode);
        Ok(())
    }

    fn start_measurement(&mut self) -> Result<(), Error> {
        self.starts += 1;
        Ok(())
    }

    fn conversion_time_ms(&self) -> u32 {
        self.conversion_ms
    }

    fn is_ready(&mut self) -> Result<bool, Error> {
        Ok(self.ready)
    }

    fn read_values(&mut self) -> Result<UvReading, Error> {
        self.reads += 1;
        self.readings
            .pop_front()
            .unwrap_or(Ok(UvReading { uva: 1.0, uvb: 0.5 }))
    }
}

/// Delay that only counts.
#[derive(Default)]
pub struct FakeDelay {
    pub total_ns: u64,
}

impl FakeDelay {
    pub fn total_ms(&self) -> u64 {
        self.total_ns / 1_000_000
    }
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

/// I²C bus that records writes and answers reads from a queue.
#[derive(Default)]
pub struct FakeI2c {
    pub writes: Vec<(u8, Vec<u8>)>,
    pub responses: VecDeque<Vec<u8>>,
    pub nack: bool,
}

impl FakeI2c {
    pub fn respond(&mut self, bytes: &[u8]) {
        self.responses.push_back(bytes.to_vec());
    }
}

impl ErrorType for FakeI2c {
    type Error = ErrorKind;
}

impl I2c for FakeI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if self.nack {
            return Err(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address));
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                Operation::Read(buf) => {
                    let data = self.responses.pop_front().unwrap_or_default();
                    let n = data.len().min(buf.len());
                    buf[..n].copy_from_slice(&data[..n]);
                    buf[n..].fill(0);
                }
            }
        }
        Ok(())
    }
}

// Power / network

/// Records calls; deep sleep always "fails" since a test cannot power down.
#[derive(Default)]
pub struct FakePower {
    pub wake: Option<WakeSource>,
    pub sleeps: usize,
    pub restarts: usize,
}

impl PowerControl for FakePower {
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

pub struct FakeNetwork {
    pub status: NetStatus,
    pub retry_ok: bool,
    pub refresh_ok: bool,
    pub retries: usize,
    pub refreshes: usize,
    pub resets: usize,
}

impl FakeNetwork {
    pub fn new(status: NetStatus) -> Self {
        Self {
            status,
            retry_ok: true,
            refresh_ok: true,
            retries: 0,
            refreshes: 0,
            resets: 0,
        }
    }
}

impl Network for FakeNetwork {
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
        self.refreshes += 1;
        if self.refresh_ok {
            Ok(())
        } else {
            Err(Error::Update)
        }
    }

    fn reset(&mut self) {
        self.resets += 1;
    }
}
