//! Periodic timer for the polarity flip, on ESP-IDF's esp_timer service.
//!
//! The callback runs in the esp_timer task, not in an ISR, and only calls
//! [`PolarityShared::tick`], which takes a critical section around the two
//! line writes.

use std::sync::Arc;

use embassy_time::Duration;
use embedded_hal::digital::OutputPin;
use esp_idf_svc::timer::{EspTaskTimerService, EspTimer};
use log::{error, info};

use crate::app::ports::{TickTimer, TimerError};
use crate::error::InitError;
use crate::light::polarity::PolarityShared;

pub struct EspTickTimer {
    timer: EspTimer<'static>,
}

impl EspTickTimer {
    /// Create the timer bound to `shared`. Not armed yet.
    pub fn new<A, B, E>(
        service: &EspTaskTimerService,
        shared: Arc<PolarityShared<A, B, E>>,
    ) -> Result<Self, InitError>
    where
        A: OutputPin + Send + 'static,
        B: OutputPin + Send + 'static,
        E: OutputPin + Send + 'static,
    {
        let timer = service
            .timer(move || shared.tick())
            .map_err(|e| InitError::Timer(e.code()))?;
        info!("hw_timer: polarity timer created");
        Ok(Self { timer })
    }
}

impl TickTimer for EspTickTimer {
    fn arm_periodic(&mut self, period: Duration) -> Result<(), TimerError> {
        self.timer
            .every(core::time::Duration::from_micros(period.as_micros()))
            .map_err(|e| TimerError(e.code()))
    }

    fn disarm(&mut self) {
        if let Err(e) = self.timer.cancel() {
            error!("hw_timer: cancel failed (rc={})", e.code());
        }
    }
}
