use num_traits::{NumAssign, SaturatingAdd, SaturatingSub, Signed};
use std::fmt::{Debug, Display};
use std::sync::atomic::{AtomicI32, AtomicI64, AtomicIsize, Ordering};

/// Numeric type of capacities and flows.
///
/// Flows are signed because every edge stores the net flow of its pair
/// (`flow(u, v) == -flow(v, u)`).
pub trait Flow: NumAssign + Signed + SaturatingAdd + SaturatingSub + Ord + Copy + Send + Sync + Debug + Display + 'static {
    /// Atomic cell used to stage deltas during a parallel round.
    type Accumulator: Accumulator<Self>;
}

/// A cell that several threads may add to concurrently.
pub trait Accumulator<F>: Send + Sync {
    fn zero() -> Self;

    fn add(&self, delta: F);

    // returns the accumulated value and resets the cell to zero
    fn take(&self) -> F;
}

macro_rules! impl_flow {
    ($flow:ty, $atomic:ty) => {
        impl Accumulator<$flow> for $atomic {
            #[inline]
            fn zero() -> Self {
                <$atomic>::new(0)
            }

            // the round barrier orders these with the commit phase
            #[inline]
            fn add(&self, delta: $flow) {
                self.fetch_add(delta, Ordering::Relaxed);
            }

            #[inline]
            fn take(&self) -> $flow {
                self.swap(0, Ordering::Relaxed)
            }
        }

        impl Flow for $flow {
            type Accumulator = $atomic;
        }
    };
}

impl_flow!(i32, AtomicI32);
impl_flow!(i64, AtomicI64);
impl_flow!(isize, AtomicIsize);
