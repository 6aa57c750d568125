//! uvmeter firmware for nRF52840.
//!
//! # Hardware
//!
//! - SSD1306 128×64 OLED and AS7331 UV sensor on TWIM0 (P0.26 SDA, P0.27 SCL)
//! - Select button on P0.24, active-low, also wakes the chip from System OFF
//!
//! # Tasks
//!
//! - Button task: debounces and classifies presses, posts to [`INPUT`]
//! - Main task: owns the application; waits for input or the loop tick,
//!   then runs one `poll` pass (which performs any deferred present)

#![no_std]
#![no_main]

mod board;
#[path = "ui/buttons.rs"]
mod buttons;
#[path = "ui/display.rs"]
mod display;

use core::cell::RefCell;

use defmt::{error, info};
use embassy_executor::Spawner;
use embassy_futures::select::{select, Either};
use embassy_nrf::gpio::{Input, Pull};
use embassy_nrf::peripherals::TWISPI0;
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_sync::channel::Channel;
use embassy_time::{Delay, Duration, Instant, Timer};
use embedded_hal_bus::i2c::RefCellDevice;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use uvmeter::config::{Timing, LOOP_TICK_MS, UV_SENSOR_I2C_ADDR};
use uvmeter::render::{DeferredRender, RenderRequest};
use uvmeter::sensor::as7331::As7331;
use uvmeter::ui::ButtonId;
use uvmeter::{Application, Parts, UvMeter};

use crate::board::{LocalNetwork, NrfBoard, NrfPower, UptimeClock, BOOT_TIME};
use crate::buttons::{InputChannel, InputSender};
use crate::display::OledSurface;

bind_interrupts!(struct Irqs {
    SPIM0_SPIS0_TWIM0_TWIS0_SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

/// Set from timer callbacks, drained by the main loop.
static RENDER_REQUEST: RenderRequest = RenderRequest::new();

/// Button task → main loop.
static INPUT: InputChannel = Channel::new();

static I2C_BUS: StaticCell<RefCell<Twim<'static, TWISPI0>>> = StaticCell::new();

#[embassy_executor::task]
async fn select_button(pin: Input<'static>, tx: InputSender) -> ! {
    buttons::button_task(pin, ButtonId::SELECT, tx).await
}

fn now_ms() -> u64 {
    Instant::now().as_millis()
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_nrf::init(Default::default());
    info!("uvmeter v{} starting", env!("CARGO_PKG_VERSION"));

    let mut config = twim::Config::default();
    config.frequency = twim::Frequency::K400;
    let twim = Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, config);
    let bus: &'static RefCell<_> = I2C_BUS.init(RefCell::new(twim));

    let parts = Parts::<NrfBoard> {
        surface: OledSurface::new(RefCellDevice::new(bus)),
        sensor: As7331::new(RefCellDevice::new(bus), UV_SENSOR_I2C_ADDR),
        clock: UptimeClock::new(BOOT_TIME),
        network: LocalNetwork,
        power: NrfPower,
        delay: Delay,
    };
    let mut app = UvMeter::new(parts, DeferredRender::new(&RENDER_REQUEST), Timing::DEFAULT);

    let button = Input::new(p.P0_24, Pull::Up);
    if let Err(e) = spawner.spawn(select_button(button, INPUT.sender())) {
        error!("Failed to spawn button task: {:?}", e);
    }

    app.setup(now_ms());
    info!("Setup done, entering main loop");

    let rx = INPUT.receiver();
    loop {
        match select(rx.receive(), Timer::after(Duration::from_millis(LOOP_TICK_MS))).await {
            Either::First((button, event)) => app.on_input(now_ms(), button, event),
            Either::Second(()) => {}
        }
        app.poll(now_ms());
    }
}
