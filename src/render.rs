//! Deferred present.
//!
//! The SSD1306 buffer may be redrawn from any context, but flushing it to
//! the panel is only safe from the main loop. Work that originates in a
//! timer or button callback therefore only raises [`RenderRequest`]; the
//! main loop drains it once per pass and performs the single flush.
//!
//! Several requests before a drain collapse into one present of whatever
//! the buffer holds at that point, which is always the latest state.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::error::Error;
use crate::platform::RenderSurface;

/// Where a piece of work is running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExecContext {
    /// The main polling loop; may present directly.
    MainLoop,
    /// A timer or interrupt callback; must defer the present.
    Callback,
}

/// Process-wide "present pending" flag.
///
/// Any context may set it; only the main loop clears it.
pub struct RenderRequest {
    pending: AtomicBool,
}

impl RenderRequest {
    pub const fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
        }
    }

    /// Ask the main loop for a present.
    pub fn request(&self) {
        self.pending.store(true, Ordering::Release);
    }

    /// Clear the flag, returning whether it was set.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// The single crossing point between "buffer is ready" and "panel shows it".
#[derive(Clone, Copy)]
pub struct DeferredRender<'r> {
    flag: &'r RenderRequest,
}

impl<'r> DeferredRender<'r> {
    pub const fn new(flag: &'r RenderRequest) -> Self {
        Self { flag }
    }

    /// Present now from the main loop, or leave it for the next drain.
    pub fn request_present(
        &self,
        ctx: ExecContext,
        surface: &mut impl RenderSurface,
    ) -> Result<(), Error> {
        match ctx {
            ExecContext::MainLoop => present(surface),
            ExecContext::Callback => {
                self.flag.request();
                Ok(())
            }
        }
    }

    /// Perform the pending present, if any. Main loop only.
    pub fn drain(&self, surface: &mut impl RenderSurface) -> Result<bool, Error> {
        if self.flag.take() {
            present(surface)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub fn is_pending(&self) -> bool {
        self.flag.is_pending()
    }
}

fn present(surface: &mut impl RenderSurface) -> Result<(), Error> {
    surface.present().map_err(|e| {
        error!("Render: present failed: {:?}", e);
        e
    })
}
