//! AS7331 UVA/UVB/UVC sensor over blocking I²C.
//!
//! The device has two register banks. In the configuration state the
//! control registers (CREG1..3) are visible; in the measurement state the
//! same addresses return results. Writing OSR switches between them.
//!
//! Only command (one-shot) and continuous modes are driven here; the SYN
//! pin modes are configured but need external edges to convert.

use embedded_hal::i2c::I2c;

use crate::error::{Error, SensorError};
use crate::platform::{MeasureMode, SensorReader, UvReading};

// Register map
const REG_OSR: u8 = 0x00;
/// Identity, configuration state only.
const REG_AGEN: u8 = 0x02;
const REG_CREG1: u8 = 0x06;
const REG_CREG3: u8 = 0x08;
/// UVA result, measurement state only.
const REG_MRES1: u8 = 0x02;

const AGEN_ID: u8 = 0x21;

// OSR bits
const OSR_SS: u8 = 1 << 7;
const OSR_PD: u8 = 1 << 6;
const DOS_CONFIG: u8 = 0b010;
const DOS_MEASURE: u8 = 0b011;

// STATUS bits (high byte of a two-byte OSR read)
const STATUS_NOTREADY: u8 = 1 << 2;
const STATUS_OVERFLOW: u8 = 0b1110_0000;

/// Extra wait on top of the nominal conversion time (ms).
const CONVERSION_MARGIN_MS: u32 = 4;

/// Counts per µW/cm² at gain 2048x and 64 ms, from the datasheet.
const RESPONSIVITY_UVA: f32 = 385.0;
const RESPONSIVITY_UVB: f32 = 347.0;

/// ADC gain code: gain = 2048 >> code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Gain(u8);

impl Gain {
    pub const X2: Self = Self(10);

    pub const fn new(code: u8) -> Option<Self> {
        if code <= 11 {
            Some(Self(code))
        } else {
            None
        }
    }

    pub const fn factor(self) -> u32 {
        2048 >> self.0
    }
}

/// Conversion time code: time = 2^code ms.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConvTime(u8);

impl ConvTime {
    pub const MS_64: Self = Self(6);

    pub const fn new(code: u8) -> Option<Self> {
        if code <= 14 {
            Some(Self(code))
        } else {
            None
        }
    }

    pub const fn millis(self) -> u32 {
        1 << self.0
    }
}

pub struct As7331<I2C> {
    i2c: I2C,
    address: u8,
    gain: Gain,
    time: ConvTime,
    mode: Option<MeasureMode>,
    status: u8,
}

impl<I2C: I2c> As7331<I2C> {
    /// Driver with the default gain (2x) and conversion time (64 ms).
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self::with_settings(i2c, address, Gain::X2, ConvTime::MS_64)
    }

    pub fn with_settings(i2c: I2C, address: u8, gain: Gain, time: ConvTime) -> Self {
        Self {
            i2c,
            address,
            gain,
            time,
            mode: None,
            status: 0,
        }
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &[reg, value])
            .map_err(|_| SensorError::Bus)
    }

    fn read_regs(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), SensorError> {
        self.i2c
            .write_read(self.address, &[reg], buf)
            .map_err(|_| SensorError::Bus)
    }

    /// Counts per µW/cm² for the configured gain and time.
    fn responsivity(&self, base: f32) -> f32 {
        base * (self.gain.factor() as f32 / 2048.0) * (self.time.millis() as f32 / 64.0)
    }

    /// Raw counts to mW/cm².
    fn to_irradiance(&self, counts: u16, base: f32) -> f32 {
        counts as f32 / self.responsivity(base) / 1000.0
    }
}

const fn mmode_bits(mode: MeasureMode) -> u8 {
    match mode {
        MeasureMode::Continuous => 0b00,
        MeasureMode::Command => 0b01,
        MeasureMode::SyncEdge => 0b10,
        MeasureMode::SyncStartEnd => 0b11,
    }
}

impl<I2C: I2c> SensorReader for As7331<I2C> {
    fn begin(&mut self) -> Result<(), Error> {
        // Power up into the configuration state.
        self.write_reg(REG_OSR, DOS_CONFIG)
            .map_err(|_| SensorError::NotFound)?;

        let mut id = [0u8];
        self.read_regs(REG_AGEN, &mut id)
            .map_err(|_| SensorError::NotFound)?;
        if id[0] != AGEN_ID {
            return Err(SensorError::NotFound.into());
        }
        self.mode = None;
        Ok(())
    }

    fn prepare_measurement(&mut self, mode: MeasureMode) -> Result<(), Error> {
        self.write_reg(REG_OSR, DOS_CONFIG)?;
        self.write_reg(REG_CREG1, (self.gain.0 << 4) | self.time.0)?;
        // Internal clock 1.024 MHz, no standby, push-pull READY.
        self.write_reg(REG_CREG3, mmode_bits(mode) << 6)?;
        self.mode = Some(mode);
        Ok(())
    }

    fn start_measurement(&mut self) -> Result<(), Error> {
        if self.mode.is_none() {
            return Err(SensorError::NotPrepared.into());
        }
        self.status = 0;
        self.write_reg(REG_OSR, (OSR_SS | DOS_MEASURE) & !OSR_PD)?;
        Ok(())
    }

    fn conversion_time_ms(&self) -> u32 {
        self.time.millis() + CONVERSION_MARGIN_MS
    }

    fn is_ready(&mut self) -> Result<bool, Error> {
        let mut osr_status = [0u8; 2];
        self.read_regs(REG_OSR, &mut osr_status)?;
        self.status = osr_status[1];
        Ok(self.status & STATUS_NOTREADY == 0)
    }

    fn read_values(&mut self) -> Result<UvReading, Error> {
        if self.status & STATUS_OVERFLOW != 0 {
            return Err(SensorError::Overflow.into());
        }

        // MRES1 (UVA) and MRES2 (UVB), little-endian, auto-increment.
        let mut raw = [0u8; 4];
        self.read_regs(REG_MRES1, &mut raw)?;
        let uva = u16::from_le_bytes([raw[0], raw[1]]);
        let uvb = u16::from_le_bytes([raw[2], raw[3]]);

        Ok(UvReading {
            uva: self.to_irradiance(uva, RESPONSIVITY_UVA),
            uvb: self.to_irradiance(uvb, RESPONSIVITY_UVB),
        })
    }
}
