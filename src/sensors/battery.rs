//! Single-cell LiPo battery monitor.
//!
//! Reads the battery divider through a one-shot ADC channel, converts the
//! raw count to millivolts with a fixed front-end scale, and maps
//! millivolts to state of charge with a 21-point discharge curve.
//!
//! Sampling starts when the device first joins the network (one immediate
//! sample, then every interval) and runs on its own task so the ADC
//! conversion never delays button or network handling. Reports are only
//! sent while joined; a failed read keeps the previous good sample.

use embassy_time::{Duration, Instant};
use log::{info, warn};

use crate::app::events::LightEvent;
use crate::app::ports::{AdcError, BatteryAdc, EventSink, NetworkPort};
use crate::timer::Deadline;

/// `(millivolts, percent)`, strictly descending in millivolts.
#[rustfmt::skip]
pub const DISCHARGE_CURVE: [(u16, u8); 21] = [
    (4200, 100), (4150, 95), (4110, 90), (4080, 85), (4020, 80),
    (3980, 75),  (3950, 70), (3910, 65), (3870, 60), (3840, 55),
    (3800, 50),  (3760, 45), (3730, 40), (3690, 35), (3660, 30),
    (3620, 25),  (3580, 20), (3500, 15), (3450, 10), (3300, 5),
    (3000, 0),
];

/// State of charge for a cell voltage, clamped to `0..=100`.
pub fn mv_to_percent(mv: u16) -> u8 {
    let (v_top, p_top) = DISCHARGE_CURVE[0];
    let (v_bottom, p_bottom) = DISCHARGE_CURVE[DISCHARGE_CURVE.len() - 1];
    if mv >= v_top {
        return p_top;
    }
    if mv <= v_bottom {
        return p_bottom;
    }

    for pair in DISCHARGE_CURVE.windows(2) {
        let (v_high, p_high) = pair[0];
        let (v_low, p_low) = pair[1];
        if mv >= v_low {
            let span_mv = u32::from(v_high - v_low);
            let span_pct = u32::from(p_high - p_low);
            let above = u32::from(mv - v_low);
            return p_low + (above * span_pct / span_mv) as u8;
        }
    }
    p_bottom
}

/// `raw * full_scale_mv / resolution`, saturating at `u16::MAX`.
pub fn raw_to_mv(raw: u16, full_scale_mv: u32, resolution: u32) -> u16 {
    let mv = u64::from(raw) * u64::from(full_scale_mv) / u64::from(resolution.max(1));
    mv.min(u64::from(u16::MAX)) as u16
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatterySample {
    pub millivolts: u16,
    pub percent: u8,
}

impl BatterySample {
    pub fn from_mv(millivolts: u16) -> Self {
        Self {
            millivolts,
            percent: mv_to_percent(millivolts),
        }
    }

    /// ZCL BatteryVoltage: units of 100 mV.
    pub fn voltage_attr(&self) -> u8 {
        (self.millivolts / 100).min(u16::from(u8::MAX)) as u8
    }

    /// ZCL BatteryPercentageRemaining: units of 0.5 %.
    pub fn percentage_attr(&self) -> u8 {
        self.percent.saturating_mul(2)
    }
}

pub struct BatteryMonitor<A> {
    adc: A,
    full_scale_mv: u32,
    resolution: u32,
    interval: Duration,
    timer: Deadline,
    started: bool,
    last: Option<BatterySample>,
}

impl<A: BatteryAdc> BatteryMonitor<A> {
    pub fn new(adc: A, full_scale_mv: u32, resolution: u32, interval: Duration) -> Self {
        Self {
            adc,
            full_scale_mv,
            resolution,
            interval,
            timer: Deadline::idle(),
            started: false,
            last: None,
        }
    }

    /// Sample if due and report when joined. Returns the fresh sample, if
    /// one was taken successfully this call.
    pub fn poll(
        &mut self,
        now: Instant,
        net: &mut impl NetworkPort,
        sink: &mut impl EventSink,
    ) -> Option<BatterySample> {
        let joined = net.is_joined();
        if joined && !self.started {
            info!("battery: joined, sampling every {} s", self.interval.as_secs());
            self.started = true;
            self.timer.arm(now);
        }

        let due = self.timer.fire_if_due(now)?;
        self.timer.arm(due + self.interval);

        match self.sample() {
            Ok(sample) => {
                self.last = Some(sample);
                if joined {
                    net.report_battery(&sample);
                }
                sink.emit(&LightEvent::BatterySampled {
                    sample,
                    reported: joined,
                });
                Some(sample)
            }
            Err(e) => {
                warn!("battery: {}, keeping last sample", e);
                sink.emit(&LightEvent::BatteryReadFailed(e));
                None
            }
        }
    }

    fn sample(&mut self) -> Result<BatterySample, AdcError> {
        let raw = self.adc.read_raw()?;
        let mv = raw_to_mv(raw, self.full_scale_mv, self.resolution);
        if mv == 0 {
            return Err(AdcError::ZeroReading);
        }
        Ok(BatterySample::from_mv(mv))
    }

    /// Last good sample.
    pub fn last(&self) -> Option<BatterySample> {
        self.last
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.at()
    }
}
