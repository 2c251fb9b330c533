//! Identify effect sequencer.
//!
//! Each effect is a fixed script of `(level, hold)` steps played on a
//! single re-armed deadline. When the last hold expires the sequencer asks
//! for a restore: the owner re-commits the on/off + level attributes, which
//! the effect never touched.
//!
//! | Effect        | Script                                   |
//! |---------------|------------------------------------------|
//! | Blink         | full 500 ms                              |
//! | Breathe       | full / off alternating, 30 × 500 ms      |
//! | Okay          | full / off alternating, 4 × 200 ms       |
//! | ChannelChange | full 500 ms, dim (25) 7500 ms            |
//! | Finish / Stop | restore immediately                      |

use embassy_time::{Duration, Instant};
use heapless::Vec;
use log::{debug, info};

use crate::timer::Deadline;

use super::Level;

const SCRIPT_CAP: usize = 32;
const BREATHE_STEPS: usize = 30;
const OKAY_STEPS: usize = 4;
/// Low level held by ChannelChange.
pub const DIM_LEVEL: Level = Level::new(25);

/// Identify effect identifiers (ZCL Identify cluster, Trigger Effect).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Blink,
    Breathe,
    Okay,
    ChannelChange,
    Finish,
    Stop,
}

impl EffectKind {
    /// Unknown identifiers behave like Stop.
    pub const fn from_zcl(id: u8) -> Self {
        match id {
            0x00 => Self::Blink,
            0x01 => Self::Breathe,
            0x02 => Self::Okay,
            0x0b => Self::ChannelChange,
            0xfe => Self::Finish,
            _ => Self::Stop,
        }
    }

    pub const fn to_zcl(self) -> u8 {
        match self {
            Self::Blink => 0x00,
            Self::Breathe => 0x01,
            Self::Okay => 0x02,
            Self::ChannelChange => 0x0b,
            Self::Finish => 0xfe,
            Self::Stop => 0xff,
        }
    }

    /// The timed steps for this effect; empty for Finish / Stop.
    pub fn script(self) -> Vec<Step, SCRIPT_CAP> {
        let mut steps = Vec::new();
        match self {
            Self::Blink => push(&mut steps, Level::MAX, 500),
            Self::Breathe => alternate(&mut steps, BREATHE_STEPS, 500),
            Self::Okay => alternate(&mut steps, OKAY_STEPS, 200),
            Self::ChannelChange => {
                push(&mut steps, Level::MAX, 500);
                push(&mut steps, DIM_LEVEL, 7500);
            }
            Self::Finish | Self::Stop => {}
        }
        steps
    }
}

/// One scripted output level and how long to hold it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub level: Level,
    pub hold: Duration,
}

fn push(steps: &mut Vec<Step, SCRIPT_CAP>, level: Level, hold_ms: u64) {
    // Scripts are fixed and well under SCRIPT_CAP.
    let _ = steps.push(Step {
        level,
        hold: Duration::from_millis(hold_ms),
    });
}

fn alternate(steps: &mut Vec<Step, SCRIPT_CAP>, count: usize, hold_ms: u64) {
    for i in 0..count {
        let level = if i % 2 == 0 { Level::MAX } else { Level::OFF };
        push(steps, level, hold_ms);
    }
}

/// What the owner must do with the visible output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectOutput {
    /// Drive this level, bypassing the fade engine.
    Show(Level),
    /// The effect is over: re-commit the on/off + level attributes.
    Restore,
}

struct Running {
    kind: EffectKind,
    script: Vec<Step, SCRIPT_CAP>,
    step: usize,
}

pub struct EffectSequencer {
    running: Option<Running>,
    timer: Deadline,
}

impl Default for EffectSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectSequencer {
    pub const fn new() -> Self {
        Self {
            running: None,
            timer: Deadline::idle(),
        }
    }

    /// Start `kind`, cancelling whatever is running.
    ///
    /// Finish / Stop return [`EffectOutput::Restore`] if an effect was
    /// running and `None` otherwise.
    pub fn start(&mut self, kind: EffectKind, now: Instant) -> Option<EffectOutput> {
        let was_running = self.running.take().is_some();
        self.timer.cancel();

        let script = kind.script();
        let Some(first) = script.first().copied() else {
            info!("effect: {:?}", kind);
            return was_running.then_some(EffectOutput::Restore);
        };

        info!("effect: {:?} start ({} steps)", kind, script.len());
        self.timer.arm_after(now, first.hold);
        self.running = Some(Running {
            kind,
            script,
            step: 0,
        });
        Some(EffectOutput::Show(first.level))
    }

    /// Advance if the current hold has expired.
    pub fn poll(&mut self, now: Instant) -> Option<EffectOutput> {
        let due = self.timer.fire_if_due(now)?;
        let running = self.running.as_mut()?;

        running.step += 1;
        match running.script.get(running.step).copied() {
            Some(step) => {
                debug!("effect: {:?} step {}", running.kind, running.step);
                self.timer.arm(due + step.hold);
                Some(EffectOutput::Show(step.level))
            }
            None => {
                info!("effect: {:?} done", running.kind);
                self.running = None;
                Some(EffectOutput::Restore)
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.running.is_some()
    }

    pub fn kind(&self) -> Option<EffectKind> {
        self.running.as_ref().map(|r| r.kind)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.at()
    }
}
