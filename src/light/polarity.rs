//! H-bridge polarity alternator (TB6612FNG, channel A).
//!
//! The strip is center-tapped: forward current lights one half, reverse
//! current the other. Flipping direction fast enough makes both halves
//! appear lit at once while the PWM input sets brightness.
//!
//! | State   | AIN1 | AIN2 | STBY |
//! |---------|------|------|------|
//! | Stopped | low  | low  | low  |
//! | Phase A | high | low  | high |
//! | Phase B | low  | high | high |
//!
//! ## Execution contexts
//!
//! `start()` / `stop()` run on the light worker. The flip runs in the
//! periodic timer callback via [`PolarityShared::tick`]. The two contexts
//! share only the `running` flag and the drive lines; the lines sit behind
//! a critical-section mutex held for three GPIO writes at most.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Duration;
use embedded_hal::digital::{Error as _, OutputPin};
use log::{error, info, warn};

use crate::app::ports::{PolarityControl, TickTimer};

/// Which strip half is currently driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    A,
    B,
}

impl Phase {
    pub const fn flipped(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

/// Half of one full alternation cycle.
pub fn half_period(freq_hz: u16) -> Duration {
    Duration::from_micros(1_000_000 / u64::from(freq_hz.max(1)) / 2)
}

/// The three H-bridge control outputs.
pub struct DriveLines<A, B, E> {
    line1: A,
    line2: B,
    enable: E,
    phase: Phase,
}

impl<A: OutputPin, B: OutputPin, E: OutputPin> DriveLines<A, B, E> {
    pub fn new(line1: A, line2: B, enable: E) -> Self {
        Self {
            line1,
            line2,
            enable,
            phase: Phase::A,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn energize(&mut self) {
        self.phase = Phase::A;
        self.apply_phase();
        write(&mut self.enable, true, "STBY");
    }

    fn brake(&mut self) {
        write(&mut self.line1, false, "AIN1");
        write(&mut self.line2, false, "AIN2");
        write(&mut self.enable, false, "STBY");
    }

    fn flip(&mut self) {
        self.phase = self.phase.flipped();
        self.apply_phase();
    }

    fn apply_phase(&mut self) {
        let a = self.phase == Phase::A;
        write(&mut self.line1, a, "AIN1");
        write(&mut self.line2, !a, "AIN2");
    }
}

fn write(pin: &mut impl OutputPin, high: bool, name: &str) {
    let result = if high { pin.set_high() } else { pin.set_low() };
    if let Err(e) = result {
        warn!("polarity: {} write failed ({:?})", name, e.kind());
    }
}

/// State shared between the worker and the timer callback.
pub struct PolarityShared<A, B, E> {
    running: AtomicBool,
    lines: Mutex<CriticalSectionRawMutex, RefCell<DriveLines<A, B, E>>>,
}

impl<A: OutputPin, B: OutputPin, E: OutputPin> PolarityShared<A, B, E> {
    /// Lines are braked immediately so the bridge starts in standby.
    pub fn new(mut lines: DriveLines<A, B, E>) -> Arc<Self> {
        lines.brake();
        Arc::new(Self {
            running: AtomicBool::new(false),
            lines: Mutex::new(RefCell::new(lines)),
        })
    }

    /// Timer callback body. No-op unless running.
    pub fn tick(&self) {
        self.lines.lock(|cell| {
            if !self.running.load(Ordering::Acquire) {
                return;
            }
            cell.borrow_mut().flip();
        });
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn phase(&self) -> Phase {
        self.lines.lock(|cell| cell.borrow().phase())
    }

    fn energize(&self) {
        self.lines.lock(|cell| {
            cell.borrow_mut().energize();
            self.running.store(true, Ordering::Release);
        });
    }

    fn brake(&self) {
        self.lines.lock(|cell| {
            self.running.store(false, Ordering::Release);
            cell.borrow_mut().brake();
        });
    }
}

/// Worker-side handle: owns the periodic timer and the shared lines.
pub struct PolarityAlternator<A, B, E, T> {
    shared: Arc<PolarityShared<A, B, E>>,
    timer: T,
    half_period: Duration,
}

impl<A, B, E, T> PolarityAlternator<A, B, E, T>
where
    A: OutputPin,
    B: OutputPin,
    E: OutputPin,
    T: TickTimer,
{
    /// `timer` must call [`PolarityShared::tick`] on the same `shared`.
    pub fn new(shared: Arc<PolarityShared<A, B, E>>, timer: T, freq_hz: u16) -> Self {
        Self {
            shared,
            timer,
            half_period: half_period(freq_hz),
        }
    }

    pub fn shared(&self) -> &Arc<PolarityShared<A, B, E>> {
        &self.shared
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn half_period(&self) -> Duration {
        self.half_period
    }
}

impl<A, B, E, T> PolarityControl for PolarityAlternator<A, B, E, T>
where
    A: OutputPin,
    B: OutputPin,
    E: OutputPin,
    T: TickTimer,
{
    fn start(&mut self) {
        self.shared.energize();
        if let Err(e) = self.timer.arm_periodic(self.half_period) {
            // Phase A stays lit; only half the strip shows until the next start.
            error!("polarity: timer arm failed: {}", e);
            return;
        }
        info!(
            "polarity: running, flip every {} us",
            self.half_period.as_micros()
        );
    }

    fn stop(&mut self) {
        self.timer.disarm();
        self.shared.brake();
        info!("polarity: stopped (brake + standby)");
    }

    fn is_running(&self) -> bool {
        self.shared.is_running()
    }
}
