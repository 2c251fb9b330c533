//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured light events to the
//! ESP-IDF logger (UART / USB-CDC in production).

use log::{error, info, warn};

use crate::app::events::LightEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`LightEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &LightEvent) {
        match event {
            LightEvent::Started { on, level } => {
                info!("START | on={} level={}", on, level);
            }
            LightEvent::StateChanged { on, level, source } => {
                info!("STATE | on={} level={} | via {:?}", on, level, source);
            }
            LightEvent::EffectStarted(kind) => {
                info!("IDENT | {:?} (0x{:02x})", kind, kind.to_zcl());
            }
            LightEvent::EffectFinished => {
                info!("IDENT | finished, attributes restored");
            }
            LightEvent::FactoryReset { left_network } => {
                warn!("RESET | factory reset | left_network={}", left_network);
            }
            LightEvent::NetworkJoined => info!("NET   | joined"),
            LightEvent::NetworkLeft => info!("NET   | left"),
            LightEvent::ConfigUpdated { persisted } => {
                info!("CFG   | updated | persisted={}", persisted);
            }
            LightEvent::OutputFault(e) => {
                error!("FAULT | {}", e);
            }
            LightEvent::BatterySampled { sample, reported } => {
                info!(
                    "BATT  | {} mV {}% | attr v={} pct={} | {}",
                    sample.millivolts,
                    sample.percent,
                    sample.voltage_attr(),
                    sample.percentage_attr(),
                    if *reported { "reported" } else { "not joined" },
                );
            }
            LightEvent::BatteryReadFailed(e) => {
                warn!("BATT  | read failed: {}", e);
            }
        }
    }
}
