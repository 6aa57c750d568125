//! UV sensor sampling loop.
//!
//! [`Sampler`] drives a [`SensorReader`] through one start → wait → read
//! cycle per call and tracks sensor health. It never returns an error:
//! a failed step marks the sample `ok = false`, keeps the last numbers,
//! and the next scheduled call tries again.

pub mod as7331;

use embedded_hal::delay::DelayNs;

use crate::config::Timing;
use crate::error::{Error, SensorError};
use crate::platform::{MeasureMode, SensorReader, UvReading};

/// Latest UV values, clamped to zero.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorSample {
    pub uva: f32,
    pub uvb: f32,
    pub ok: bool,
}

impl SensorSample {
    pub const UNAVAILABLE: Self = Self {
        uva: 0.0,
        uvb: 0.0,
        ok: false,
    };

    /// Clamp each channel to zero on its own. NaN reads as zero too.
    pub fn from_reading(reading: UvReading) -> Self {
        Self {
            uva: reading.uva.max(0.0),
            uvb: reading.uvb.max(0.0),
            ok: true,
        }
    }
}

/// Sensor health as seen by the sampling loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Health {
    /// `begin` has not run yet.
    Idle,
    /// Up and configured, no reading yet.
    Waiting,
    Ok,
    /// The last sample failed; the next one retries.
    Failing,
    /// The sensor never came up; no sampling this session.
    Absent,
}

pub struct Sampler<R: SensorReader> {
    reader: R,
    last: SensorSample,
    health: Health,
    period_ms: u64,
    next_due_ms: u64,
}

impl<R: SensorReader> Sampler<R> {
    pub fn new(reader: R, timing: &Timing) -> Self {
        Self {
            reader,
            last: SensorSample::UNAVAILABLE,
            health: Health::Idle,
            period_ms: timing.sample_period_ms,
            next_due_ms: 0,
        }
    }

    /// Bring the sensor up in one-shot (command) mode.
    ///
    /// A failure here is permanent for this session and logged once.
    pub fn begin(&mut self) -> Result<(), Error> {
        let result = self
            .reader
            .begin()
            .and_then(|()| self.reader.prepare_measurement(MeasureMode::Command));

        match result {
            Ok(()) => {
                info!("Sensor: ready");
                self.health = Health::Waiting;
            }
            Err(e) => {
                error!("Sensor: failed to start: {:?}", e);
                self.health = Health::Absent;
            }
        }
        result
    }

    /// Whether a sample is due at `now_ms`; schedules the next one if so.
    pub fn sample_due(&mut self, now_ms: u64) -> bool {
        if self.health == Health::Absent || now_ms < self.next_due_ms {
            return false;
        }
        self.next_due_ms = now_ms + self.period_ms;
        true
    }

    /// Run one measurement cycle.
    pub fn sample(&mut self, delay: &mut impl DelayNs) -> SensorSample {
        match self.health {
            Health::Idle | Health::Absent => return self.last,
            Health::Waiting | Health::Ok | Health::Failing => {}
        }

        match self.measure(delay) {
            Ok(reading) => {
                if self.health != Health::Ok {
                    info!("Sensor: readings ok");
                }
                self.health = Health::Ok;
                self.last = SensorSample::from_reading(reading);
            }
            Err(e) => {
                if self.health == Health::Ok {
                    warn!("Sensor: sample failed: {:?}", e);
                } else {
                    debug!("Sensor: still failing: {:?}", e);
                }
                self.health = Health::Failing;
                self.last.ok = false;
            }
        }
        self.last
    }

    fn measure(&mut self, delay: &mut impl DelayNs) -> Result<UvReading, Error> {
        self.reader.start_measurement()?;
        delay.delay_ms(self.reader.conversion_time_ms());
        if !self.reader.is_ready()? {
            return Err(SensorError::NotReady.into());
        }
        self.reader.read_values()
    }

    pub fn last(&self) -> SensorSample {
        self.last
    }

    pub fn health(&self) -> Health {
        self.health
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::{FakeDelay, ScriptedSensor};

    fn reading(uva: f32, uvb: f32) -> Result<UvReading, Error> {
        Ok(UvReading { uva, uvb })
    }

    fn started(sensor: ScriptedSensor) -> Sampler<ScriptedSensor> {
        let mut sampler = Sampler::new(sensor, &Timing::DEFAULT);
        sampler.begin().unwrap();
        sampler
    }

    #[test]
    fn successful_sample_waits_conversion_time() {
        let mut sensor = ScriptedSensor::new();
        sensor.readings.push_back(reading(3.27, 0.4));
        let mut sampler = started(sensor);
        let mut delay = FakeDelay::default();

        let sample = sampler.sample(&mut delay);
        assert_eq!(
            sample,
            SensorSample {
                uva: 3.27,
                uvb: 0.4,
                ok: true
            }
        );
        assert_eq!(delay.total_ms(), 68);
        assert_eq!(sampler.reader().prepared, Some(MeasureMode::Command));
        assert_eq!(sampler.health(), Health::Ok);
    }

    #[test]
    fn negative_channels_clamp_independently() {
        let mut sensor = ScriptedSensor::new();
        sensor.readings.push_back(reading(1.5, -0.2));
        sensor.readings.push_back(reading(-3.0, 2.0));
        let mut sampler = started(sensor);
        let mut delay = FakeDelay::default();

        let first = sampler.sample(&mut delay);
        assert_eq!((first.uva, first.uvb), (1.5, 0.0));
        let second = sampler.sample(&mut delay);
        assert_eq!((second.uva, second.uvb), (0.0, 2.0));
    }

    #[test]
    fn failures_only_clear_ok_and_keep_last_values() {
        let mut sensor = ScriptedSensor::new();
        sensor.readings.push_back(reading(2.0, 1.0));
        for _ in 0..3 {
            sensor.readings.push_back(Err(SensorError::Bus.into()));
        }
        let mut sampler = started(sensor);
        let mut delay = FakeDelay::default();

        assert!(sampler.sample(&mut delay).ok);
        for _ in 0..3 {
            let sample = sampler.sample(&mut delay);
            assert!(!sample.ok);
            assert_eq!((sample.uva, sample.uvb), (2.0, 1.0));
        }
        assert_eq!(sampler.health(), Health::Failing);
    }

    #[test]
    fn one_attempt_per_call() {
        let mut sensor = ScriptedSensor::new();
        sensor.readings.push_back(Err(SensorError::Bus.into()));
        let mut sampler = started(sensor);
        let mut delay = FakeDelay::default();

        sampler.sample(&mut delay);
        assert_eq!(sampler.reader().starts, 1);
        assert_eq!(sampler.reader().reads, 1);
    }

    #[test]
    fn not_ready_after_conversion_time_is_a_failure() {
        let mut sensor = ScriptedSensor::new();
        sensor.ready = false;
        let mut sampler = started(sensor);
        let mut delay = FakeDelay::default();

        assert!(!sampler.sample(&mut delay).ok);
        assert_eq!(sampler.reader().reads, 0);
    }

    #[test]
    fn recovers_on_next_successful_read() {
        let mut sensor = ScriptedSensor::new();
        sensor.readings.push_back(Err(SensorError::Bus.into()));
        sensor.readings.push_back(reading(0.8, 0.1));
        let mut sampler = started(sensor);
        let mut delay = FakeDelay::default();

        assert!(!sampler.sample(&mut delay).ok);
        let sample = sampler.sample(&mut delay);
        assert!(sample.ok);
        assert_eq!(sample.uva, 0.8);
    }

    #[test]
    fn failed_begin_is_permanent() {
        let mut sensor = ScriptedSensor::new();
        sensor.begin_result = Err(SensorError::NotFound.into());
        let mut sampler = Sampler::new(sensor, &Timing::DEFAULT);
        let mut delay = FakeDelay::default();

        assert_eq!(sampler.begin(), Err(Error::Sensor(SensorError::NotFound)));
        assert_eq!(sampler.health(), Health::Absent);
        assert!(!sampler.sample_due(0));
        assert!(!sampler.sample(&mut delay).ok);
        assert_eq!(sampler.reader().starts, 0);
    }

    #[test]
    fn samples_follow_the_period() {
        let mut sampler = started(ScriptedSensor::new());
        assert!(sampler.sample_due(0));
        assert!(!sampler.sample_due(999));
        assert!(sampler.sample_due(1_000));
        // A late pass is due immediately and re-bases the schedule.
        assert!(sampler.sample_due(2_500));
        assert!(!sampler.sample_due(3_000));
        assert!(sampler.sample_due(3_500));
    }
}
