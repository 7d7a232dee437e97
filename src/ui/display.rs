//! SSD1306 OLED display wrapper.
//!
//! [`GraphicsSurface`] turns any monochrome `embedded-graphics` draw
//! target into a [`Surface`]; [`Oled`] adds the SSD1306 frame flush.

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};

use crate::ui::surface::{Ink, Surface};

fn text_style(ink: Ink) -> MonoTextStyle<'static, BinaryColor> {
    let color = match ink {
        Ink::Normal => BinaryColor::On,
        Ink::Inverted => BinaryColor::Off,
    };
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(color)
        .build()
}

/// [`Surface`] over an `embedded-graphics` draw target. Drawing errors
/// are ignored; a buffered target cannot fail until it is flushed.
pub struct GraphicsSurface<D> {
    target: D,
}

impl<D> GraphicsSurface<D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    pub fn new(target: D) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }
}

impl<D> Surface for GraphicsSurface<D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    fn clear(&mut self) {
        let _ = self.target.clear(BinaryColor::Off);
    }

    fn draw_rectangle(&mut self, x: i32, y: i32, w: u32, h: u32, filled: bool) {
        let style = if filled {
            PrimitiveStyle::with_fill(BinaryColor::On)
        } else {
            PrimitiveStyle::with_stroke(BinaryColor::On, 1)
        };
        let _ = Rectangle::new(Point::new(x, y), Size::new(w, h))
            .into_styled(style)
            .draw(&mut self.target);
    }

    fn print(&mut self, x: i32, y: i32, text: &str, ink: Ink) {
        let _ = Text::with_baseline(text, Point::new(x, y), text_style(ink), Baseline::Top)
            .draw(&mut self.target);
    }
}

#[cfg(feature = "embedded")]
pub use oled::{init, Display, Oled};

#[cfg(feature = "embedded")]
mod oled {
    use ssd1306::mode::BufferedGraphicsMode;
    use ssd1306::prelude::*;
    use ssd1306::I2CDisplayInterface;
    use ssd1306::Ssd1306;

    use super::GraphicsSurface;
    use crate::error::Error;
    use crate::ui::surface::{Ink, Surface};

    /// Type alias for the concrete display driver.
    ///
    /// Generic over the I²C implementation so callers pass in their HAL's
    /// I²C peripheral.
    pub type Display<I2C> =
        Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

    /// Initialise the SSD1306 display and clear the screen.
    pub fn init<I2C>(i2c: I2C) -> Oled<I2C>
    where
        I2C: embedded_hal::i2c::I2c,
    {
        let interface = I2CDisplayInterface::new(i2c);
        let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        let _ = display.init();
        display.clear_buffer();
        let _ = display.flush();
        Oled {
            surface: GraphicsSurface::new(display),
        }
    }

    /// The panel's OLED: draws into the frame buffer, flushes over I²C.
    pub struct Oled<I2C> {
        surface: GraphicsSurface<Display<I2C>>,
    }

    impl<I2C> Surface for Oled<I2C>
    where
        I2C: embedded_hal::i2c::I2c,
    {
        fn clear(&mut self) {
            self.surface.target_mut().clear_buffer();
        }

        fn draw_rectangle(&mut self, x: i32, y: i32, w: u32, h: u32, filled: bool) {
            self.surface.draw_rectangle(x, y, w, h, filled);
        }

        fn print(&mut self, x: i32, y: i32, text: &str, ink: Ink) {
            self.surface.print(x, y, text, ink);
        }

        fn flush(&mut self) -> Result<(), Error> {
            self.surface.target_mut().flush().map_err(|_| Error::Display)
        }
    }
}
