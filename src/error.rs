//! Unified error type for uvmeter.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // UI / Display
    /// I²C transaction to the display failed.
    Display,

    // Sensor
    /// The UV sensor reported or caused an error.
    Sensor(SensorError),

    // Timers
    /// Every timer slot is in use.
    TimerSlotsExhausted,

    // Network
    /// Network setup or reconnect failed.
    Network,

    /// Time or weather update failed.
    Update,

    // Power
    /// The deep-sleep primitive returned instead of powering down.
    DeepSleep,
}

/// Subset of sensor errors we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Device did not answer or reported the wrong identity.
    NotFound,
    /// Bus transaction failed mid-measurement.
    Bus,
    /// Conversion still running after its declared time.
    NotReady,
    /// ADC or result register overflowed.
    Overflow,
    /// Measurement requested before the device was configured.
    NotPrepared,
}

// Convenience conversions

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Error::Sensor(e)
    }
}
