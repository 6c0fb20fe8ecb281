//! Timer struct, id and flags

use std::fmt;
use std::num::NonZeroU64;

use bitflags::bitflags;

use crate::config::OverrunPolicy;
use crate::time::VirtualTime;

/// Id of a registered timer
///
/// Ids are handed out in registration order starting at 1 and are never
/// reused by the registry that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(NonZeroU64);

impl TimerId {
    /// Id for the `index`-th registration (zero based)
    pub(crate) fn from_index(index: u64) -> Self {
        Self(NonZeroU64::MIN.saturating_add(index))
    }

    /// The numeric value of this id
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    /// Flags that control timer behavior
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TimerFlags: u32 {
        /// Timer repeats at the specified period until cleared
        const REPEAT = 0x01;
        /// Timer is removed by `TimerRegistry::reset`
        const STOP_ON_RESET = 0x02;
    }
}

/// Boxed timer callback
pub(crate) type Callback = Box<dyn FnMut() + Send + 'static>;

/// A registered timer
pub(crate) struct Timer<T> {
    /// Interval length, or delay for one-shot timers
    pub period: T,
    /// Virtual time accumulated since registration or the last firing
    pub elapsed: T,
    /// Behavior flags
    pub flags: TimerFlags,
    /// The callback to execute. Taken out while it runs.
    pub callback: Option<Callback>,
}

impl<T: VirtualTime> Timer<T> {
    /// Create a new timer with nothing elapsed
    pub fn new(period: T, flags: TimerFlags, callback: Callback) -> Self {
        Self {
            period,
            elapsed: T::ZERO,
            flags,
            callback: Some(callback),
        }
    }

    pub fn is_repeating(&self) -> bool {
        self.flags.contains(TimerFlags::REPEAT)
    }

    pub fn is_due(&self) -> bool {
        self.elapsed >= self.period
    }

    /// Time left until the timer is due, zero if it already is
    pub fn remaining(&self) -> T {
        if self.is_due() {
            T::ZERO
        } else {
            self.period.sub(self.elapsed)
        }
    }

    /// Consume the elapsed time of a due repeating timer
    ///
    /// Returns how many times the callback should fire for this update.
    pub fn rearm(&mut self, policy: OverrunPolicy) -> u64 {
        match policy {
            OverrunPolicy::Carry => {
                self.elapsed = self.elapsed.sub(self.period);
                1
            }
            OverrunPolicy::Skip => {
                self.elapsed = self.elapsed.rem_period(self.period);
                1
            }
            OverrunPolicy::CatchUp => {
                let shots = self.elapsed.whole_periods(self.period);
                self.elapsed = self.elapsed.rem_period(self.period);
                shots.max(1)
            }
        }
    }
}
