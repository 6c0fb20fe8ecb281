//! Timer registry for scheduling delayed and repeating callbacks
//!
//! Timers are advanced explicitly, once per game frame, by calling
//! [`TimerRegistry::update`] with the frame's delta. They can be configured to:
//! - Fire once after a delay
//! - Repeat at a fixed interval
//! - Be automatically cleaned up on [`TimerRegistry::reset`]
//!
//! Callbacks run with the registry unlocked, so a callback holding an `Arc`
//! (or `Weak`) to the registry may register or clear timers while it runs.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use gametimer_core::TimerRegistry;
//!
//! let timers = TimerRegistry::<Duration>::new();
//!
//! // One-shot timer
//! timers.set_timeout(|| println!("5 seconds passed!"), Duration::from_secs(5))?;
//!
//! // Repeating timer
//! let tick = timers.set_interval(|| println!("Tick!"), Duration::from_millis(100))?;
//!
//! // Advance one frame
//! timers.update(Duration::from_millis(16))?;
//!
//! // Cancel a timer
//! timers.clear_interval(tick);
//! # Ok::<(), gametimer_core::TimerError>(())
//! ```

mod timer;

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use parking_lot::Mutex;

pub use timer::{TimerFlags, TimerId};
use timer::Timer;

use crate::config::TimerConfig;
use crate::error::{TimerError, TimerResult};
use crate::time::VirtualTime;

/// Mutable registry state, locked only between callback invocations
struct Inner<T> {
    /// Number of ids handed out so far
    issued: u64,
    timers: BTreeMap<TimerId, Timer<T>>,
    /// Total virtual time passed to `update`
    now: T,
}

impl<T: VirtualTime> Inner<T> {
    fn allocate_id(&mut self) -> TimerId {
        let id = TimerId::from_index(self.issued);
        self.issued += 1;
        id
    }
}

/// Registry of frame-driven interval and timeout timers
///
/// Time never advances on its own: every timer only moves forward by the
/// deltas passed to [`update`](Self::update).
pub struct TimerRegistry<T: VirtualTime = Duration> {
    inner: Mutex<Inner<T>>,
    config: TimerConfig,
}

impl<T: VirtualTime> Default for TimerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: VirtualTime> fmt::Debug for TimerRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("TimerRegistry")
            .field("timers", &inner.timers.len())
            .field("issued", &inner.issued)
            .field("now", &inner.now)
            .field("config", &self.config)
            .finish()
    }
}

impl<T: VirtualTime> TimerRegistry<T> {
    /// Create an empty registry with the default configuration
    pub fn new() -> Self {
        Self::with_config(TimerConfig::default())
    }

    /// Create an empty registry with the given configuration
    pub fn with_config(config: TimerConfig) -> Self {
        Self {
            inner: Mutex::new(Inner {
                issued: 0,
                timers: BTreeMap::new(),
                now: T::ZERO,
            }),
            config,
        }
    }

    /// The configuration this registry was built with
    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Add a repeating timer that fires every `period`
    ///
    /// The timer will continue firing until cleared via `clear_interval`.
    ///
    /// # Returns
    /// The id of the new timer
    ///
    /// # Errors
    /// `InvalidPeriod` for a negative, infinite or NaN period, `ZeroInterval`
    /// for a zero period.
    pub fn set_interval<F>(&self, callback: F, period: T) -> TimerResult<TimerId>
    where
        F: FnMut() + Send + 'static,
    {
        self.set_timer_with_flags(callback, period, TimerFlags::REPEAT)
    }

    /// Add a repeating timer whose callback is bound to `context`
    ///
    /// The context is moved into the timer once and handed to the callback by
    /// mutable reference on every firing.
    pub fn set_interval_with_context<C, F>(
        &self,
        callback: F,
        period: T,
        context: C,
    ) -> TimerResult<TimerId>
    where
        C: Send + 'static,
        F: FnMut(&mut C) + Send + 'static,
    {
        self.set_timer_with_flags(bind(callback, context), period, TimerFlags::REPEAT)
    }

    /// Add a one-shot timer that fires once `period` has elapsed
    ///
    /// The timer is removed after it fires. A zero period fires on the next
    /// update.
    ///
    /// # Errors
    /// `InvalidPeriod` for a negative, infinite or NaN period.
    pub fn set_timeout<F>(&self, callback: F, period: T) -> TimerResult<TimerId>
    where
        F: FnMut() + Send + 'static,
    {
        self.set_timer_with_flags(callback, period, TimerFlags::empty())
    }

    /// Add a one-shot timer whose callback is bound to `context`
    pub fn set_timeout_with_context<C, F>(
        &self,
        callback: F,
        period: T,
        context: C,
    ) -> TimerResult<TimerId>
    where
        C: Send + 'static,
        F: FnMut(&mut C) + Send + 'static,
    {
        self.set_timer_with_flags(bind(callback, context), period, TimerFlags::empty())
    }

    /// Add a timer with custom flags
    ///
    /// # Example
    ///
    /// ```
    /// use gametimer_core::{TimerFlags, TimerRegistry};
    ///
    /// let timers = TimerRegistry::<u32>::new();
    ///
    /// // Repeating timer that stops on the next reset
    /// let id = timers.set_timer_with_flags(
    ///     || { /* ... */ },
    ///     1000,
    ///     TimerFlags::REPEAT | TimerFlags::STOP_ON_RESET,
    /// )?;
    ///
    /// assert_eq!(timers.reset(), 1);
    /// assert!(!timers.contains(id));
    /// # Ok::<(), gametimer_core::TimerError>(())
    /// ```
    pub fn set_timer_with_flags<F>(
        &self,
        callback: F,
        period: T,
        flags: TimerFlags,
    ) -> TimerResult<TimerId>
    where
        F: FnMut() + Send + 'static,
    {
        if !period.is_valid() {
            return Err(TimerError::InvalidPeriod(format!("{:?}", period)));
        }
        if flags.contains(TimerFlags::REPEAT) && period.is_zero() {
            return Err(TimerError::ZeroInterval);
        }

        let timer = Timer::new(period, flags, Box::new(callback));
        let mut inner = self.inner.lock();
        let id = inner.allocate_id();
        inner.timers.insert(id, timer);
        tracing::trace!("Registered timer {} ({:?}, period {:?})", id, flags, period);
        Ok(id)
    }

    /// Cancel a repeating timer
    ///
    /// # Returns
    /// `true` if the timer was found and removed, `false` if not found
    pub fn clear_interval(&self, id: TimerId) -> bool {
        self.remove(id)
    }

    /// Cancel a one-shot timer
    ///
    /// Identical to [`clear_interval`](Self::clear_interval); either works for
    /// any timer.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        self.remove(id)
    }

    fn remove(&self, id: TimerId) -> bool {
        // Dropped after the lock is released, the callback may own registry handles
        let removed = self.inner.lock().timers.remove(&id);
        if removed.is_some() {
            tracing::trace!("Cleared timer {}", id);
        }
        removed.is_some()
    }

    /// Remove all timers with the STOP_ON_RESET flag
    ///
    /// Meant for level or scene changes. Returns how many timers were removed.
    pub fn reset(&self) -> usize {
        let scoped: BTreeMap<TimerId, Timer<T>> = {
            let mut inner = self.inner.lock();
            let (scoped, kept): (BTreeMap<_, _>, BTreeMap<_, _>) = std::mem::take(&mut inner.timers)
                .into_iter()
                .partition(|(_, timer)| timer.flags.contains(TimerFlags::STOP_ON_RESET));
            inner.timers = kept;
            scoped
        };
        let removed = scoped.len();
        if removed > 0 {
            tracing::debug!("Removed {} timers on reset", removed);
        }
        removed
    }

    /// Remove every timer. Returns how many were removed.
    pub fn clear_all(&self) -> usize {
        let timers = std::mem::take(&mut self.inner.lock().timers);
        if !timers.is_empty() {
            tracing::debug!("Cleared all {} timers", timers.len());
        }
        timers.len()
    }

    /// Advance every timer by `delta` and fire the ones that are due
    ///
    /// Timers are visited in registration order. Only timers present when
    /// the call starts are advanced; timers registered by a callback during
    /// the pass start counting on the next update, and timers cleared by a
    /// callback never fire afterwards.
    ///
    /// A panicking callback is not caught. The panic leaves `update`, the
    /// rest of the pass is skipped, and the timer that panicked is removed.
    ///
    /// # Returns
    /// The number of callback invocations
    ///
    /// # Errors
    /// `InvalidDelta` for a negative, infinite or NaN delta, in which case
    /// nothing is advanced.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn update(&self, delta: T) -> TimerResult<usize> {
        if !delta.is_valid() {
            return Err(TimerError::InvalidDelta(format!("{:?}", delta)));
        }

        let ids: Vec<TimerId> = {
            let mut inner = self.inner.lock();
            inner.now = inner.now.add(delta);
            inner.timers.keys().copied().collect()
        };

        let mut fired = 0;
        for id in ids {
            fired += self.advance(id, delta);
        }
        Ok(fired)
    }

    /// Advance a single timer and run its callback if it is due
    fn advance(&self, id: TimerId, delta: T) -> usize {
        let (mut callback, shots, repeating) = {
            let mut inner = self.inner.lock();
            // Cleared earlier in this pass
            let Some(timer) = inner.timers.get_mut(&id) else {
                return 0;
            };

            timer.elapsed = timer.elapsed.add(delta);
            if !timer.is_due() {
                return 0;
            }

            // Already running further up the stack (nested update)
            let Some(callback) = timer.callback.take() else {
                return 0;
            };

            let repeating = timer.is_repeating();
            let shots = if repeating {
                timer.rearm(self.config.overrun)
            } else {
                1
            };
            (callback, shots, repeating)
        };

        if shots > 1 {
            tracing::debug!("Timer {} catching up {} periods", id, shots);
        }

        let guard = FiringGuard { registry: self, id, armed: true };
        let mut fired = 0;
        for shot in 0..shots {
            // A catch-up stops as soon as the timer clears itself
            if shot > 0 && !self.contains(id) {
                break;
            }
            callback();
            fired += 1;
        }
        guard.disarm();

        let mut inner = self.inner.lock();
        if repeating {
            if let Some(timer) = inner.timers.get_mut(&id) {
                timer.callback = Some(callback);
                return fired;
            }
        } else {
            inner.timers.remove(&id);
        }
        drop(inner);
        drop(callback);
        fired
    }

    /// Number of registered timers
    pub fn len(&self) -> usize {
        self.inner.lock().timers.len()
    }

    /// Whether no timers are registered
    pub fn is_empty(&self) -> bool {
        self.inner.lock().timers.is_empty()
    }

    /// Whether `id` refers to a registered timer
    pub fn contains(&self, id: TimerId) -> bool {
        self.inner.lock().timers.contains_key(&id)
    }

    /// Number of ids handed out so far (the id of the latest registration)
    pub fn issued(&self) -> u64 {
        self.inner.lock().issued
    }

    /// Total virtual time advanced through `update`
    pub fn now(&self) -> T {
        self.inner.lock().now
    }

    /// Virtual time accumulated by a timer since registration or its last firing
    pub fn elapsed(&self, id: TimerId) -> Option<T> {
        self.inner.lock().timers.get(&id).map(|timer| timer.elapsed)
    }

    /// The period a timer was registered with
    pub fn period(&self, id: TimerId) -> Option<T> {
        self.inner.lock().timers.get(&id).map(|timer| timer.period)
    }

    /// Virtual time left until a timer is due
    pub fn remaining(&self, id: TimerId) -> Option<T> {
        self.inner.lock().timers.get(&id).map(Timer::remaining)
    }

    /// Whether a timer repeats, `None` if it is not registered
    pub fn is_repeating(&self, id: TimerId) -> Option<bool> {
        self.inner.lock().timers.get(&id).map(Timer::is_repeating)
    }
}

/// Bind a context-taking callback to its context
fn bind<C, F>(mut callback: F, mut context: C) -> impl FnMut() + Send + 'static
where
    C: Send + 'static,
    F: FnMut(&mut C) + Send + 'static,
{
    move || callback(&mut context)
}

/// Removes the firing timer if its callback unwinds
struct FiringGuard<'a, T: VirtualTime> {
    registry: &'a TimerRegistry<T>,
    id: TimerId,
    armed: bool,
}

impl<T: VirtualTime> FiringGuard<'_, T> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<T: VirtualTime> Drop for FiringGuard<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            tracing::warn!("Timer {} callback panicked, removing timer", self.id);
            let removed = self.registry.inner.lock().timers.remove(&self.id);
            drop(removed);
        }
    }
}
