use std::time::{Duration, Instant};

/// Implements performance timer functionality.
#[derive(Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Starts a new timer.
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    /// Returns elapsed seconds.
    pub fn elapsed_secs(&self) -> u64 {
        (Instant::now() - self.start).as_secs()
    }

    /// Returns elapsed seconds as floating point number.
    pub fn elapsed_secs_as_f64(&self) -> f64 {
        (Instant::now() - self.start).as_secs_f64()
    }

    /// Returns elapsed milliseconds.
    pub fn elapsed_millis(&self) -> u128 {
        (Instant::now() - self.start).as_millis()
    }

    /// Measures duration of the given action.
    pub fn measure_duration<R, F: Fn() -> R>(action: F) -> (R, Duration) {
        let timer = Timer::start();
        let result = action();
        let elapsed = timer.elapsed_millis();

        (result, Duration::from_millis(elapsed as u64))
    }
}
