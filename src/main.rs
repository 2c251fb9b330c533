//! Copper Light firmware entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │  NvsAdapter      LogEventSink    NetworkLink    SystemClock  │
//! │  (Config+NVS)    (EventSink)     (NetworkPort)               │
//! │  LedcDriver      PinDriver ×5    EspTickTimer   OneshotAdc   │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ───────────────────    │
//! │                                                              │
//! │  ┌────────────────────────────┐   ┌───────────────────────┐  │
//! │  │ LightService (worker)      │   │ BatteryMonitor        │  │
//! │  │ Fade · Effect · Button     │   │ (own thread)          │  │
//! │  └────────────────────────────┘   └───────────────────────┘  │
//! │         esp_timer task: PolarityShared::tick()               │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The worker wakes at the earliest armed deadline, or after
//! [`MAX_IDLE`] so latched button edges and queued commands are picked up
//! promptly.

use anyhow::{Result, anyhow};
use embassy_time::Duration;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::timer::EspTaskTimerService;
use log::{error, info, warn};

use copper_light::adapters::log_sink::LogEventSink;
use copper_light::adapters::network::NetworkLink;
use copper_light::adapters::nvs::NvsAdapter;
use copper_light::adapters::time::SystemClock;
use copper_light::app::ports::ConfigPort;
use copper_light::app::service::LightService;
use copper_light::app::settings;
use copper_light::config::LightConfig;
use copper_light::drivers::hw_init::{self, OneshotBatteryAdc};
use copper_light::drivers::hw_timer::EspTickTimer;
use copper_light::events::{BUTTON_EDGES, COMMANDS};
use copper_light::light::polarity::{PolarityAlternator, PolarityShared};
use copper_light::sensors::battery::BatteryMonitor;

/// Longest the worker sleeps without an armed deadline.
const MAX_IDLE: Duration = Duration::from_millis(10);
/// Battery thread re-check period while waiting for the first join.
const BATTERY_IDLE: Duration = Duration::from_secs(1);

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Copper Light v{}                 ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Peripherals ────────────────────────────────────────
    let peripherals = Peripherals::take()?;
    let board = hw_init::bring_up(peripherals).inspect_err(|e| {
        error!("Bring-up failed: {}, halting", e);
    })?;
    let _pwm_timer = board.pwm_timer;

    // ── 3. Persistence ────────────────────────────────────────
    let mut nvs = NvsAdapter::new().map_err(|e| anyhow!("NVS init failed: {}", e))?;
    let config = nvs.load().unwrap_or_else(|e| {
        warn!("Stored config unusable ({}), using defaults", e);
        LightConfig::default()
    });
    let persisted = settings::load(&nvs);

    // ── 4. H-bridge sequencer ─────────────────────────────────
    let timer_service = EspTaskTimerService::new()?;
    let shared = PolarityShared::new(board.lines);
    let tick_timer = EspTickTimer::new(&timer_service, shared.clone())?;
    let bridge = PolarityAlternator::new(shared, tick_timer, config.polarity_freq_hz);

    // ── 5. Light service ──────────────────────────────────────
    let clock = SystemClock::new();
    let mut sink = LogEventSink::new();
    let mut net = NetworkLink::new(&COMMANDS);
    let mut light = LightService::new(
        config.clone(),
        board.pwm,
        bridge,
        board.button,
        board.status,
        clock.now(),
    );
    light.start(persisted, &mut sink);

    // ── 6. Battery thread ─────────────────────────────────────
    match board.battery {
        Some(adc) => spawn_battery(adc, &config, net.clone())?,
        None => warn!("Battery ADC unavailable, reporting disabled"),
    }

    info!("System ready. Entering worker loop.");

    // ── 7. Worker loop ────────────────────────────────────────
    loop {
        let now = clock.now();
        if BUTTON_EDGES.take() > 0 {
            light.on_button_edge(now);
        }
        COMMANDS.drain(|cmd| light.handle(cmd, now, &mut nvs, &mut sink));
        light.poll(now, &mut nvs, &mut net, &mut sink);

        let now = clock.now();
        let wait = light
            .next_deadline()
            .map_or(MAX_IDLE, |at| at.saturating_duration_since(now))
            .min(MAX_IDLE);
        std::thread::sleep(std::time::Duration::from_micros(wait.as_micros()));
    }
}

fn spawn_battery(adc: OneshotBatteryAdc, config: &LightConfig, mut net: NetworkLink) -> Result<()> {
    let mut monitor = BatteryMonitor::new(
        adc,
        config.battery_full_scale_mv,
        config.adc_resolution,
        config.battery_interval(),
    );
    std::thread::Builder::new()
        .name("battery".into())
        .stack_size(4096)
        .spawn(move || {
            let clock = SystemClock::new();
            let mut sink = LogEventSink::new();
            loop {
                let now = clock.now();
                monitor.poll(now, &mut net, &mut sink);
                let wait = monitor
                    .next_deadline()
                    .map_or(BATTERY_IDLE, |at| at.saturating_duration_since(now))
                    .min(BATTERY_IDLE);
                std::thread::sleep(std::time::Duration::from_micros(wait.as_micros()));
            }
        })
        .map_err(|e| anyhow!("battery thread spawn failed: {}", e))?;
    info!("Battery monitor every {} s", config.battery_interval_secs);
    Ok(())
}
