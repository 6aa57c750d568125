//! nRF52840 platform glue: power control, clock, network stand-in.

use core::convert::Infallible;

use defmt::info;
use embassy_nrf::pac;
use embassy_nrf::pac::gpio::vals;
use embassy_nrf::peripherals::TWISPI0;
use embassy_nrf::twim::Twim;
use embassy_time::{Delay, Instant};
use embedded_hal_bus::i2c::RefCellDevice;

use uvmeter::platform::{
    ClockWeather, NetStatus, Network, PowerControl, WakeLevel, WakeSource, WallTime,
};
use uvmeter::sensor::as7331::As7331;
use uvmeter::{Board, Error};

use crate::display::OledSurface;

/// The OLED and the UV sensor share TWIM0.
pub type I2cDev = RefCellDevice<'static, Twim<'static, TWISPI0>>;

/// Wall time assumed at boot; the board has no time source.
pub const BOOT_TIME: WallTime = WallTime {
    hour: 12,
    minute: 0,
    month: 1,
    day: 1,
};

pub struct NrfBoard;

impl Board for NrfBoard {
    type Surface = OledSurface<I2cDev>;
    type Sensor = As7331<I2cDev>;
    type Clock = UptimeClock;
    type Network = LocalNetwork;
    type Power = NrfPower;
    type Delay = Delay;
}

/// System OFF with GPIO sense wake; reset via SCB.
pub struct NrfPower;

impl PowerControl for NrfPower {
    fn configure_wake(&mut self, source: WakeSource) {
        let (pull, sense) = match source.level {
            WakeLevel::Low => (vals::Pull::PULLUP, vals::Sense::LOW),
            WakeLevel::High => (vals::Pull::PULLDOWN, vals::Sense::HIGH),
        };
        pac::P0.pin_cnf(source.pin as usize).write(|w| {
            w.set_dir(vals::Dir::INPUT);
            w.set_input(vals::Input::CONNECT);
            w.set_pull(pull);
            w.set_sense(sense);
        });
        info!("Power: wake on P0.{} {:?}", source.pin, source.level);
    }

    fn deep_sleep(&mut self) -> Result<Infallible, Error> {
        pac::POWER.systemoff().write(|w| w.set_systemoff(true));
        cortex_m::asm::dsb();
        // System OFF is only emulated while a debugger is attached, and
        // the CPU keeps running; either way we did not power down.
        cortex_m::asm::delay(64_000);
        Err(Error::DeepSleep)
    }

    fn restart(&mut self) {
        cortex_m::peripheral::SCB::sys_reset();
    }
}

/// Clock counting from [`BOOT_TIME`]; the date does not roll over.
pub struct UptimeClock {
    base: WallTime,
}

impl UptimeClock {
    pub const fn new(base: WallTime) -> Self {
        Self { base }
    }
}

impl ClockWeather for UptimeClock {
    fn current_time(&self) -> WallTime {
        let elapsed_min = Instant::now().as_secs() / 60;
        let total = u64::from(self.base.hour) * 60 + u64::from(self.base.minute) + elapsed_min;
        WallTime {
            hour: ((total / 60) % 24) as u8,
            minute: (total % 60) as u8,
            ..self.base
        }
    }

    fn current_temp(&self) -> Option<i16> {
        None
    }

    fn high_temp(&self) -> Option<i16> {
        None
    }

    fn low_temp(&self) -> Option<i16> {
        None
    }

    fn weather_conditions(&self) -> &str {
        ""
    }
}

/// The board has no radio: always "online", nothing to fetch.
pub struct LocalNetwork;

impl Network for LocalNetwork {
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
        info!("Network: nothing stored to forget");
    }
}
