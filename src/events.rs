//! Interrupt and network hand-off into the light worker.
//!
//! Nothing outside the worker mutates light state. Other contexts only
//! post:
//!
//! ```text
//! ┌──────────────┐  mark()   ┌──────────────┐
//! │ Button ISR   │──────────▶│ EdgeLatch    │──┐
//! └──────────────┘           │ (AtomicU32)  │  │   take()   ┌──────────────┐
//!                            └──────────────┘  ├───────────▶│ Light worker │
//! ┌──────────────┐  post()   ┌──────────────┐  │            │  (consumer)  │
//! │ Network stack│──────────▶│ CommandQueue │──┘            └──────────────┘
//! └──────────────┘           │ (embassy ch.)│
//!                            └──────────────┘
//! ```
//!
//! The ISR side is a single atomic add, so it is safe at any interrupt
//! priority. The button driver does all debounce work on the worker.

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::commands::LightCommand;

/// Pending commands before `post` starts dropping.
pub const COMMAND_DEPTH: usize = 8;

// ── Edge latch ────────────────────────────────────────────────

/// Counts raw edges since the worker last looked.
pub struct EdgeLatch {
    pending: AtomicU32,
}

impl EdgeLatch {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU32::new(0),
        }
    }

    /// ISR side. Lock-free.
    pub fn mark(&self) {
        self.pending.fetch_add(1, Ordering::Release);
    }

    /// Worker side. Returns and clears the edge count.
    pub fn take(&self) -> u32 {
        self.pending.swap(0, Ordering::Acquire)
    }
}

impl Default for EdgeLatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Button edges, marked from the GPIO ISR.
pub static BUTTON_EDGES: EdgeLatch = EdgeLatch::new();

// ── Command queue ─────────────────────────────────────────────

/// Bounded MPSC queue of [`LightCommand`]s.
pub struct CommandQueue<const N: usize> {
    channel: Channel<CriticalSectionRawMutex, LightCommand, N>,
}

impl<const N: usize> CommandQueue<N> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Non-blocking. Returns `false` (and logs) if the queue is full.
    pub fn post(&self, cmd: LightCommand) -> bool {
        if self.channel.try_send(cmd).is_err() {
            warn!("commands: queue full, dropped {:?}", cmd);
            return false;
        }
        true
    }

    pub fn take(&self) -> Option<LightCommand> {
        self.channel.try_receive().ok()
    }

    /// Drain all pending commands in FIFO order.
    pub fn drain(&self, mut handler: impl FnMut(LightCommand)) {
        while let Some(cmd) = self.take() {
            handler(cmd);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

impl<const N: usize> Default for CommandQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Commands from the network stack.
pub static COMMANDS: CommandQueue<COMMAND_DEPTH> = CommandQueue::new();

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::Level;

    #[test]
    fn latch_counts_and_clears() {
        let latch = EdgeLatch::new();
        assert_eq!(latch.take(), 0);
        latch.mark();
        latch.mark();
        latch.mark();
        assert_eq!(latch.take(), 3);
        assert_eq!(latch.take(), 0);
    }

    #[test]
    fn queue_is_fifo() {
        let q: CommandQueue<4> = CommandQueue::new();
        assert!(q.post(LightCommand::SetOnOff(true)));
        assert!(q.post(LightCommand::SetLevel(Level::new(9))));
        let mut seen = Vec::new();
        q.drain(|c| seen.push(c));
        assert_eq!(
            seen,
            vec![
                LightCommand::SetOnOff(true),
                LightCommand::SetLevel(Level::new(9))
            ]
        );
        assert!(q.is_empty());
    }

    #[test]
    fn full_queue_drops() {
        let q: CommandQueue<2> = CommandQueue::new();
        assert!(q.post(LightCommand::NetworkJoined));
        assert!(q.post(LightCommand::NetworkJoined));
        assert!(!q.post(LightCommand::NetworkLeft));
        assert_eq!(q.take(), Some(LightCommand::NetworkJoined));
    }
}
