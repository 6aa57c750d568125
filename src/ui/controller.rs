//! Display state controller.
//!
//! Owns the current [`DisplayState`], the dismiss deadline and the render
//! surface. Button events and dismiss expiries come in; redraws go out
//! through [`DeferredRender`], and anything with a side effect beyond the
//! screen (network retries, restart, sleep) is handed back to the caller
//! as a [`Command`].

use core::mem;

use super::format::{format_clock, format_date, format_uv_pair};
use super::layout::{self, body_text, place_x, wrap, Row, MAIN_ROWS, UV_HEADER};
use super::{DisplayState, InputEvent, MainView, StateTag};
use crate::config::Timing;
use crate::error::Error;
use crate::platform::{RenderSurface, TimerService};
use crate::render::{DeferredRender, ExecContext};
use crate::timer::{OneShot, TimerHandle, TimerId};

/// Operation a failed state asks to run again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RetryTarget {
    Network,
    Update,
}

/// Side effect requested by a button event.
///
/// The caller performs it and reports the result back through
/// [`DisplayController::set_state`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Run network setup again after configuration.
    RetryNetworkSetup,
    Retry(RetryTarget),
    Restart,
    ResetNetwork,
    ConfirmSleep,
}

/// What a dismiss expiry did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DismissOutcome {
    /// Stale or unexpected expiry.
    Ignored,
    /// A transient state reverted to `Main`.
    Reverted,
    /// The pre-sleep prompt timed out and the previous state was restored.
    PromptUnanswered,
}

pub struct DisplayController<'r, S: RenderSurface> {
    surface: S,
    render: DeferredRender<'r>,
    state: DisplayState,
    /// State shown before the current one; restored when the pre-sleep
    /// prompt is left without confirming.
    previous: DisplayState,
    /// Latest main-screen data, used whenever an overlay reverts.
    main: MainView,
    dismiss: OneShot,
    dismiss_ms: u32,
}

impl<'r, S: RenderSurface> DisplayController<'r, S> {
    pub fn new(surface: S, render: DeferredRender<'r>, timing: &Timing) -> Self {
        Self {
            surface,
            render,
            state: DisplayState::Startup,
            previous: DisplayState::Startup,
            main: MainView::default(),
            dismiss: OneShot::new(TimerId::Dismiss),
            dismiss_ms: timing.dismiss_ms,
        }
    }

    /// Power up the panel.
    pub fn begin(&mut self) -> Result<(), Error> {
        self.surface.begin()
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn main_view(&self) -> &MainView {
        &self.main
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn is_dismiss_armed(&self) -> bool {
        self.dismiss.is_armed()
    }

    /// Switch to `state`, redraw and present.
    ///
    /// Moves not listed in [`layout::TRANSITIONS`] are refused and leave the
    /// screen untouched. Returns whether the switch happened.
    pub fn set_state(
        &mut self,
        state: DisplayState,
        ctx: ExecContext,
        timers: &mut impl TimerService,
    ) -> bool {
        if !layout::transition_allowed(self.state.tag(), state.tag()) {
            debug!("State: refusing {:?} -> {:?}", self.state.tag(), state.tag());
            return false;
        }
        self.apply(state, ctx, timers);
        true
    }

    /// Unchecked switch, for dismiss reverts and prompt resumes.
    ///
    /// Transient states (re)arm the dismiss timer; `Main` cancels it.
    fn apply(&mut self, state: DisplayState, ctx: ExecContext, timers: &mut impl TimerService) {
        if state.tag() != self.state.tag() {
            info!("State: {:?} -> {:?}", self.state.tag(), state.tag());
        }
        if let DisplayState::Main(view) = &state {
            self.main = view.clone();
        }

        if state.is_transient() {
            self.dismiss.arm(timers, self.dismiss_ms);
        } else {
            self.dismiss.disarm(timers);
        }

        if state != self.state {
            self.previous = mem::replace(&mut self.state, state);
        }

        self.render();
        // Failures are logged by the render path; the next redraw retries.
        let _ = self.render.request_present(ctx, &mut self.surface);
    }

    /// Store fresh main-screen data, redrawing only if `Main` is showing
    /// and something changed. Returns whether a redraw happened.
    pub fn update_main(
        &mut self,
        view: MainView,
        ctx: ExecContext,
        timers: &mut impl TimerService,
    ) -> bool {
        if view == self.main {
            return false;
        }
        if self.state.is_main() {
            self.apply(DisplayState::Main(view), ctx, timers);
            true
        } else {
            self.main = view;
            false
        }
    }

    /// Apply a button event to the current state.
    pub fn on_button_event(
        &mut self,
        event: InputEvent,
        ctx: ExecContext,
        timers: &mut impl TimerService,
    ) -> Option<Command> {
        use InputEvent::{Click, LongPress};

        match (self.state.tag(), event) {
            (StateTag::Main, LongPress) => {
                self.set_state(DisplayState::AskRestart, ctx, timers);
                None
            }
            (StateTag::AskRestart, LongPress) => Some(Command::Restart),
            (StateTag::Startup | StateTag::NetConfig | StateTag::NetFail, LongPress) => {
                self.set_state(DisplayState::AskResetNetwork, ctx, timers);
                None
            }
            (StateTag::AskResetNetwork, LongPress) => {
                self.set_state(DisplayState::VerifyResetNetwork, ctx, timers);
                None
            }
            (StateTag::VerifyResetNetwork, LongPress) => Some(Command::ResetNetwork),
            (StateTag::NetConfig, Click) => {
                self.set_state(DisplayState::Connecting, ctx, timers);
                Some(Command::RetryNetworkSetup)
            }
            (StateTag::NetFail, Click) => Some(Command::Retry(RetryTarget::Network)),
            (StateTag::UpdateFail, Click) => Some(Command::Retry(RetryTarget::Update)),
            (StateTag::AskPreSleep, LongPress) => Some(Command::ConfirmSleep),
            (StateTag::AskPreSleep, Click) => {
                self.resume_previous(ctx, timers);
                None
            }
            (tag, event) => {
                debug!("UI: {:?} ignored in {:?}", event, tag);
                None
            }
        }
    }

    /// Handle a dismiss expiry.
    pub fn on_dismiss(
        &mut self,
        handle: TimerHandle,
        ctx: ExecContext,
        timers: &mut impl TimerService,
    ) -> DismissOutcome {
        if !self.dismiss.fire(handle) {
            return DismissOutcome::Ignored;
        }

        match self.state.tag() {
            StateTag::AskPreSleep => {
                self.resume_previous(ctx, timers);
                DismissOutcome::PromptUnanswered
            }
            StateTag::Main => DismissOutcome::Ignored,
            _ => {
                self.apply(DisplayState::Main(self.main.clone()), ctx, timers);
                DismissOutcome::Reverted
            }
        }
    }

    /// Ask the user before going to sleep.
    pub fn prompt_sleep(&mut self, ctx: ExecContext, timers: &mut impl TimerService) {
        self.set_state(DisplayState::AskPreSleep, ctx, timers);
    }

    /// Present a redraw deferred from a callback. Main loop only.
    pub fn drain(&mut self) -> Result<bool, Error> {
        self.render.drain(&mut self.surface)
    }

    pub fn power_off_surface(&mut self) {
        info!("Display: off");
        self.surface.power_off();
    }

    /// Redraw the current state into the surface buffer.
    pub fn render(&mut self) {
        self.surface.clear();
        match &self.state {
            DisplayState::Main(view) => draw_main(&mut self.surface, view),
            other => draw_message(&mut self.surface, other),
        }
    }

    fn resume_previous(&mut self, ctx: ExecContext, timers: &mut impl TimerService) {
        let state = match &self.previous {
            DisplayState::Main(_) | DisplayState::AskPreSleep => {
                DisplayState::Main(self.main.clone())
            }
            other => other.clone(),
        };
        self.apply(state, ctx, timers);
    }
}

fn draw_row<S: RenderSurface>(surface: &mut S, text: &str, row: &Row) {
    let x = place_x(&*surface, text, row);
    if row.inverted {
        surface.fill_band(row.y, row.band_height());
        surface.draw_text(text, row.tier, x, row.y + 1, true);
    } else {
        surface.draw_text(text, row.tier, x, row.y, false);
    }
}

fn draw_message<S: RenderSurface>(surface: &mut S, state: &DisplayState) {
    let entry = layout::layout(state.tag());
    if !entry.title.is_empty() {
        draw_row(surface, entry.title, &entry.title_row);
    }

    let body = body_text(state);
    let mut row = entry.body_row;
    for line in wrap(&*surface, &body, row.tier) {
        draw_row(surface, line, &row);
        row.y += row.tier.line_height() as i32;
    }
}

fn draw_main<S: RenderSurface>(surface: &mut S, view: &MainView) {
    let rows = &MAIN_ROWS;
    draw_row(
        surface,
        &format_clock(view.hour, view.minute, view.meridiem),
        &rows.time,
    );
    draw_row(surface, &format_date(view.month, view.day), &rows.date);
    if !view.weather.is_empty() {
        draw_row(surface, &view.weather, &rows.weather);
    }
    draw_row(surface, UV_HEADER, &rows.uv_header);
    draw_row(
        surface,
        &format_uv_pair(view.uva, view.uvb, view.sensor_ok),
        &rows.uv_values,
    );
}
