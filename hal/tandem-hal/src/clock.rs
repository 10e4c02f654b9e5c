//! Monotonic time source
//!
//! The stepping loop only ever reads the clock, it never sleeps on it.

/// Monotonic millisecond clock
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin
    ///
    /// Must never go backwards. Wrapping at `u64::MAX` is tolerated by
    /// callers that compute elapsed time with `wrapping_sub`.
    fn now_millis(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}
