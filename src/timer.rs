//! Fire-once timers with a one-pending-instance guarantee.
//!
//! [`OneShot`] is the single deadline a manager owns (dismiss or sleep).
//! Re-arming cancels the pending instance before scheduling the new one,
//! and a firing is only accepted if it carries the currently armed handle,
//! so a stale expiry can never drive a transition.
//!
//! [`SoftTimers`] is a poll-driven [`TimerService`] backed by a fixed-size
//! table; both binaries and the tests use it.

use heapless::Vec;

use crate::error::Error;
use crate::platform::TimerService;

/// Which deadline a timer belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerId {
    /// Reverts a transient message to the main screen.
    Dismiss,
    /// Drives the device into deep sleep after inactivity.
    Sleep,
}

/// Generation-tagged handle of one scheduled timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerHandle(u32);

impl TimerHandle {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// A timer that has run out.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Expired {
    pub timer: TimerId,
    pub handle: TimerHandle,
}

/// A single pending deadline: zero or one instance armed at any time.
#[derive(Debug)]
pub struct OneShot {
    id: TimerId,
    armed: Option<TimerHandle>,
}

impl OneShot {
    pub const fn new(id: TimerId) -> Self {
        Self { id, armed: None }
    }

    /// Cancel any pending instance, then schedule a new one.
    pub fn arm(&mut self, timers: &mut impl TimerService, after_ms: u32) {
        self.disarm(timers);
        match timers.schedule_once(self.id, after_ms) {
            Ok(handle) => {
                trace!("Timer: {:?} armed for {} ms", self.id, after_ms);
                self.armed = Some(handle);
            }
            Err(e) => warn!("Timer: could not arm {:?}: {:?}", self.id, e),
        }
    }

    /// Cancel the pending instance, if any.
    pub fn disarm(&mut self, timers: &mut impl TimerService) {
        if let Some(handle) = self.armed.take() {
            timers.cancel(handle);
        }
    }

    /// Accept an expiry. Returns `false` for handles that are not the
    /// currently armed instance.
    pub fn fire(&mut self, handle: TimerHandle) -> bool {
        if self.armed == Some(handle) {
            self.armed = None;
            true
        } else {
            debug!("Timer: ignoring stale {:?} expiry", self.id);
            false
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    pub fn id(&self) -> TimerId {
        self.id
    }
}

#[derive(Clone, Copy, Debug)]
struct Pending {
    handle: TimerHandle,
    timer: TimerId,
    due_ms: u64,
}

/// Poll-driven timer table with room for `N` pending timers.
pub struct SoftTimers<const N: usize> {
    now_ms: u64,
    next_handle: u32,
    pending: Vec<Pending, N>,
}

impl<const N: usize> SoftTimers<N> {
    pub const fn new() -> Self {
        Self {
            now_ms: 0,
            next_handle: 1,
            pending: Vec::new(),
        }
    }

    /// Number of timers still waiting to expire.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }
}

impl<const N: usize> Default for SoftTimers<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> TimerService for SoftTimers<N> {
    fn advance_to(&mut self, now_ms: u64) {
        // Monotonic: a late caller never moves time backwards.
        self.now_ms = self.now_ms.max(now_ms);
    }

    fn schedule_once(&mut self, timer: TimerId, after_ms: u32) -> Result<TimerHandle, Error> {
        let handle = TimerHandle(self.next_handle);
        let entry = Pending {
            handle,
            timer,
            due_ms: self.now_ms + u64::from(after_ms),
        };
        self.pending
            .push(entry)
            .map_err(|_| Error::TimerSlotsExhausted)?;
        self.next_handle = self.next_handle.wrapping_add(1).max(1);
        Ok(handle)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(pos) = self.pending.iter().position(|p| p.handle == handle) {
            self.pending.swap_remove(pos);
        }
    }

    fn take_expired(&mut self) -> Option<Expired> {
        let now = self.now_ms;
        let pos = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= now)
            .min_by_key(|(_, p)| p.due_ms)
            .map(|(i, _)| i)?;
        let fired = self.pending.swap_remove(pos);
        Some(Expired {
            timer: fired.timer,
            handle: fired.handle,
        })
    }
}
