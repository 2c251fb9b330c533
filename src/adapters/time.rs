//! Monotonic clock adapter.
//!
//! Every deadline in the light engine is an [`embassy_time::Instant`];
//! this adapter produces them from the platform clock.
//!
//! - **`target_os = "espidf"`**: `esp_timer_get_time()` (µs since boot).
//! - **host**: `std::time::Instant` captured at construction.

use embassy_time::Instant;

pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since boot.
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64
    }

    /// Microseconds since construction.
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }

    pub fn now(&self) -> Instant {
        Instant::from_micros(self.uptime_us())
    }
}
