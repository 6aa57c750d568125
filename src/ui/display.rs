//! SSD1306 OLED render surface.
//!
//! Text is drawn into the driver's frame buffer with the embedded-graphics
//! ASCII mono fonts; nothing reaches the panel until `present` flushes.

use embedded_graphics::mono_font::ascii::{FONT_10X20, FONT_4X6, FONT_6X10, FONT_7X13};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

use uvmeter::config::{DISPLAY_I2C_ADDR, DISPLAY_WIDTH};
use uvmeter::platform::{FontTier, RenderSurface};
use uvmeter::Error;

/// Type alias for the concrete display driver.
///
/// Generic over the I²C implementation so callers pass in their HAL's
/// I²C peripheral (or a shared-bus device).
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

fn font(tier: FontTier) -> &'static MonoFont<'static> {
    match tier {
        FontTier::Compact => &FONT_4X6,
        FontTier::Small => &FONT_6X10,
        FontTier::Medium => &FONT_7X13,
        FontTier::Large => &FONT_10X20,
    }
}

pub struct OledSurface<I2C> {
    display: Display<I2C>,
}

impl<I2C> OledSurface<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Wrap the panel; nothing is sent until `begin`.
    pub fn new(i2c: I2C) -> Self {
        let interface = I2CDisplayInterface::new_custom_address(i2c, DISPLAY_I2C_ADDR);
        let display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        Self { display }
    }
}

impl<I2C> RenderSurface for OledSurface<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn begin(&mut self) -> Result<(), Error> {
        self.display.init().map_err(|_| Error::Display)?;
        self.display.clear_buffer();
        self.display.flush().map_err(|_| Error::Display)
    }

    fn clear(&mut self) {
        self.display.clear_buffer();
    }

    fn draw_text(&mut self, text: &str, tier: FontTier, x: i32, y: i32, inverted: bool) {
        let color = if inverted {
            BinaryColor::Off
        } else {
            BinaryColor::On
        };
        let style = MonoTextStyle::new(font(tier), color);
        let _ = Text::with_baseline(text, Point::new(x, y), style, Baseline::Top)
            .draw(&mut self.display);
    }

    fn fill_band(&mut self, y: i32, height: u32) {
        let _ = Rectangle::new(Point::new(0, y), Size::new(DISPLAY_WIDTH, height))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut self.display);
    }

    fn present(&mut self) -> Result<(), Error> {
        self.display.flush().map_err(|_| Error::Display)
    }

    fn measure_width(&self, text: &str, tier: FontTier) -> u32 {
        let f = font(tier);
        text.chars().count() as u32 * (f.character_size.width + f.character_spacing)
    }

    fn power_off(&mut self) {
        let _ = self.display.set_display_on(false);
    }
}
