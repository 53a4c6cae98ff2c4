use portable_atomic::{AtomicBool, Ordering};

/// Cooperative stop request shared by every activity
///
/// The sampling loop polls it once per cycle, so a stop takes effect at the
/// next cycle boundary and never cuts a cycle in half.
pub struct ShutdownFlag(AtomicBool);

impl ShutdownFlag {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    /// Ask all activities to stop
    pub fn request(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for ShutdownFlag {
    fn default() -> Self {
        Self::new()
    }
}
