//! Monotonic time source

/// Monotonic microsecond clock
///
/// Used by the scheduler to measure cycle work and by sample sources to
/// stamp readings. Must never go backwards.
pub trait Clock {
    /// Microseconds since an arbitrary fixed origin
    fn now_us(&self) -> u64;

    /// Microseconds elapsed since `start_us`
    fn elapsed_since(&self, start_us: u64) -> u64 {
        self.now_us().saturating_sub(start_us)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}
