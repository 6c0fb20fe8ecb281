//! Virtual time units
//!
//! The registry never reads a clock. All time enters through
//! [`TimerRegistry::update`](crate::TimerRegistry::update) as a delta of some
//! [`VirtualTime`] type, which only has to be consistent with the periods the
//! timers were registered with.

use std::fmt::Debug;
use std::time::Duration;

/// A duration-like value that timers accumulate and compare against
///
/// Implemented for [`Duration`] and the primitive integer and float types, so
/// a game loop can count in milliseconds, ticks, or seconds as it prefers.
pub trait VirtualTime: Copy + PartialOrd + Debug + Send + 'static {
    /// The zero duration
    const ZERO: Self;

    /// Sum of two durations (saturating for bounded types)
    fn add(self, rhs: Self) -> Self;

    /// Difference of two durations (saturating at zero for unsigned types)
    fn sub(self, rhs: Self) -> Self;

    /// Number of whole `period`s contained in `self`
    ///
    /// Only called with a non-zero `period`.
    fn whole_periods(self, period: Self) -> u64;

    /// Remainder of `self` after removing all whole `period`s
    ///
    /// Only called with a non-zero `period`.
    fn rem_period(self, period: Self) -> Self;

    /// Whether the value is usable as a period or delta (not negative, not NaN,
    /// not infinite)
    fn is_valid(self) -> bool {
        // NaN fails every comparison
        self >= Self::ZERO
    }

    /// Whether the value is exactly zero
    fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

impl VirtualTime for Duration {
    const ZERO: Self = Duration::ZERO;

    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }

    fn sub(self, rhs: Self) -> Self {
        self.saturating_sub(rhs)
    }

    fn whole_periods(self, period: Self) -> u64 {
        u64::try_from(self.as_nanos() / period.as_nanos()).unwrap_or(u64::MAX)
    }

    fn rem_period(self, period: Self) -> Self {
        let rem = self.as_nanos() % period.as_nanos();
        // rem < period, so the seconds part always fits
        Duration::new((rem / 1_000_000_000) as u64, (rem % 1_000_000_000) as u32)
    }
}

macro_rules! impl_virtual_time_int {
    ($($ty:ty),*) => {
        $(
            impl VirtualTime for $ty {
                const ZERO: Self = 0;

                fn add(self, rhs: Self) -> Self {
                    self.saturating_add(rhs)
                }

                fn sub(self, rhs: Self) -> Self {
                    self.saturating_sub(rhs)
                }

                fn whole_periods(self, period: Self) -> u64 {
                    (self / period) as u64
                }

                fn rem_period(self, period: Self) -> Self {
                    self % period
                }
            }
        )*
    };
}

macro_rules! impl_virtual_time_float {
    ($($ty:ty),*) => {
        $(
            impl VirtualTime for $ty {
                const ZERO: Self = 0.0;

                fn add(self, rhs: Self) -> Self {
                    self + rhs
                }

                fn sub(self, rhs: Self) -> Self {
                    self - rhs
                }

                fn whole_periods(self, period: Self) -> u64 {
                    (self / period).floor() as u64
                }

                fn rem_period(self, period: Self) -> Self {
                    self % period
                }

                fn is_valid(self) -> bool {
                    self.is_finite() && self >= 0.0
                }
            }
        )*
    };
}

impl_virtual_time_int!(u32, u64, i32, i64);
impl_virtual_time_float!(f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity() {
        assert!(0u32.is_valid());
        assert!(5i64.is_valid());
        assert!(!(-1i32).is_valid());
        assert!(!(-0.5f64).is_valid());
        assert!(!f64::NAN.is_valid());
        assert!(!f64::INFINITY.is_valid());
        assert!(!f32::INFINITY.is_valid());
        assert!(f64::MAX.is_valid());
        assert!(Duration::from_millis(16).is_valid());
    }

    #[test]
    fn test_whole_periods_and_remainder() {
        assert_eq!(250u32.whole_periods(100), 2);
        assert_eq!(250u32.rem_period(100), 50);

        assert_eq!(2.5f64.whole_periods(1.0), 2);
        assert_eq!(2.5f64.rem_period(1.0), 0.5);

        let elapsed = Duration::from_millis(2_550);
        let period = Duration::from_secs(1);
        assert_eq!(elapsed.whole_periods(period), 2);
        assert_eq!(elapsed.rem_period(period), Duration::from_millis(550));
    }

    #[test]
    fn test_saturating_arithmetic() {
        assert_eq!(u32::MAX.add(1), u32::MAX);
        assert_eq!(3u64.sub(5), 0);
        assert_eq!(Duration::ZERO.sub(Duration::from_secs(1)), Duration::ZERO);
    }
}
