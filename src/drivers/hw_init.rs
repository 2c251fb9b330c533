//! One-shot board bring-up.
//!
//! Takes the typed peripherals from `esp-idf-hal`, configures the strip
//! PWM, the three H-bridge lines, the button and status LED, and uses raw
//! ESP-IDF sys calls for the two things `esp-idf-hal` does not cover the
//! way we need: a persistent any-edge button ISR and the ADC oneshot unit.
//! Called once from `main()` before the worker starts.
//!
//! | Subsystem   | On failure                                  |
//! |-------------|---------------------------------------------|
//! | PWM         | fatal, [`InitError::Pwm`]                   |
//! | AIN1/2,STBY | fatal, [`InitError::DriveLine`]             |
//! | Button      | fatal, [`InitError::Button`]                |
//! | Status LED  | warn, indicator disabled                    |
//! | Battery ADC | warn, battery reporting disabled            |

use esp_idf_hal::gpio::{
    AnyInputPin, AnyOutputPin, Input, InputPin as _, Output, OutputPin as _, PinDriver, Pull,
};
use esp_idf_hal::ledc::config::TimerConfig;
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver, Resolution, TIMER0};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use esp_idf_svc::sys::*;
use log::{info, warn};

use crate::app::ports::{AdcError, BatteryAdc};
use crate::error::{DriveLine, InitError};
use crate::events::BUTTON_EDGES;
use crate::light::polarity::DriveLines;
use crate::pins;

pub type LinePin = PinDriver<'static, AnyOutputPin, Output>;
pub type ButtonPin = PinDriver<'static, AnyInputPin, Input>;

pub struct Board {
    pub pwm: LedcDriver<'static>,
    /// Kept alive for the lifetime of `pwm`.
    pub pwm_timer: LedcTimerDriver<'static, TIMER0>,
    pub lines: DriveLines<LinePin, LinePin, LinePin>,
    pub button: ButtonPin,
    pub status: Option<LinePin>,
    pub battery: Option<OneshotBatteryAdc>,
}

pub fn bring_up(p: Peripherals) -> Result<Board, InitError> {
    let pwm_timer = LedcTimerDriver::new(
        p.ledc.timer0,
        &TimerConfig::default()
            .frequency(Hertz(pins::PWM_FREQ_HZ))
            .resolution(Resolution::Bits10),
    )
    .map_err(|e| InitError::Pwm(e.code()))?;
    let pwm = LedcDriver::new(p.ledc.channel0, &pwm_timer, p.pins.gpio2)
        .map_err(|e| InitError::Pwm(e.code()))?;
    info!("hw_init: PWM on GPIO{} @ {} Hz", pins::PWM_GPIO, pins::PWM_FREQ_HZ);

    let line1 = output(p.pins.gpio3.downgrade_output())
        .map_err(|rc| InitError::DriveLine(DriveLine::Line1, rc))?;
    let line2 = output(p.pins.gpio4.downgrade_output())
        .map_err(|rc| InitError::DriveLine(DriveLine::Line2, rc))?;
    let enable = output(p.pins.gpio5.downgrade_output())
        .map_err(|rc| InitError::DriveLine(DriveLine::Enable, rc))?;
    info!(
        "hw_init: H-bridge AIN1=GPIO{} AIN2=GPIO{} STBY=GPIO{}",
        pins::AIN1_GPIO,
        pins::AIN2_GPIO,
        pins::STBY_GPIO
    );

    let mut button =
        PinDriver::input(p.pins.gpio9.downgrade_input()).map_err(|e| InitError::Button(e.code()))?;
    button
        .set_pull(Pull::Up)
        .map_err(|e| InitError::Button(e.code()))?;
    init_button_isr()?;

    let status = optional(output(p.pins.gpio15.downgrade_output()).map_err(InitError::StatusLed))?;
    let battery = optional(OneshotBatteryAdc::new())?;

    info!("hw_init: all required peripherals configured");
    Ok(Board {
        pwm,
        pwm_timer,
        lines: DriveLines::new(line1, line2, enable),
        button,
        status,
        battery,
    })
}

/// Non-fatal failures degrade to `None`; fatal ones propagate.
fn optional<T>(res: Result<T, InitError>) -> Result<Option<T>, InitError> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(e) if !e.is_fatal() => {
            warn!("hw_init: {}, continuing without it", e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn output(pin: AnyOutputPin) -> Result<LinePin, i32> {
    let mut driver = PinDriver::output(pin).map_err(|e| e.code())?;
    driver.set_low().map_err(|e| e.code())?;
    Ok(driver)
}

// ── Button ISR ────────────────────────────────────────────────

unsafe extern "C" fn button_gpio_isr(_arg: *mut core::ffi::c_void) {
    BUTTON_EDGES.mark();
}

/// Any-edge interrupt on the button pin. The handler only bumps the edge
/// latch; debounce runs on the worker.
fn init_button_isr() -> Result<(), InitError> {
    // SAFETY: called once from main before the worker starts. The handler
    // is a static function touching only an atomic.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as i32 && ret != ESP_ERR_INVALID_STATE as i32 {
            return Err(InitError::Button(ret));
        }
        let ret = gpio_set_intr_type(pins::BUTTON_GPIO, gpio_int_type_t_GPIO_INTR_ANYEDGE);
        if ret != ESP_OK as i32 {
            return Err(InitError::Button(ret));
        }
        let ret = gpio_isr_handler_add(
            pins::BUTTON_GPIO,
            Some(button_gpio_isr),
            core::ptr::null_mut(),
        );
        if ret != ESP_OK as i32 {
            return Err(InitError::Button(ret));
        }
        let ret = gpio_intr_enable(pins::BUTTON_GPIO);
        if ret != ESP_OK as i32 {
            return Err(InitError::Button(ret));
        }
    }
    info!("hw_init: button ISR on GPIO{} (any edge)", pins::BUTTON_GPIO);
    Ok(())
}

// ── Battery ADC (oneshot) ─────────────────────────────────────

/// ADC1 oneshot unit on the battery divider channel.
pub struct OneshotBatteryAdc {
    handle: adc_oneshot_unit_handle_t,
}

// SAFETY: the handle is created on the main task and then used only by
// the battery thread it is moved into.
unsafe impl Send for OneshotBatteryAdc {}

impl OneshotBatteryAdc {
    pub fn new() -> Result<Self, InitError> {
        let mut handle: adc_oneshot_unit_handle_t = core::ptr::null_mut();
        let init_cfg = adc_oneshot_unit_init_cfg_t {
            unit_id: adc_unit_t_ADC_UNIT_1,
            ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            ..Default::default()
        };
        // SAFETY: `handle` is a valid out-pointer; called once at boot.
        let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(InitError::Adc(ret));
        }

        let chan_cfg = adc_oneshot_chan_cfg_t {
            atten: adc_atten_t_ADC_ATTEN_DB_12,
            bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
        };
        // SAFETY: `handle` was just created above.
        let ret =
            unsafe { adc_oneshot_config_channel(handle, pins::BATTERY_ADC_CHANNEL, &chan_cfg) };
        if ret != ESP_OK as i32 {
            // SAFETY: releasing the unit created above.
            unsafe { adc_oneshot_del_unit(handle) };
            return Err(InitError::Adc(ret));
        }

        info!("hw_init: ADC1 CH{} configured (battery)", pins::BATTERY_ADC_CHANNEL);
        Ok(Self { handle })
    }
}

impl BatteryAdc for OneshotBatteryAdc {
    fn read_raw(&mut self) -> Result<u16, AdcError> {
        let mut raw: i32 = 0;
        // SAFETY: the handle is valid for the lifetime of `self`.
        let ret = unsafe { adc_oneshot_read(self.handle, pins::BATTERY_ADC_CHANNEL, &mut raw) };
        if ret != ESP_OK as i32 {
            return Err(AdcError::ReadFailed(ret));
        }
        Ok(raw.max(0) as u16)
    }
}

impl Drop for OneshotBatteryAdc {
    fn drop(&mut self) {
        // SAFETY: the handle is owned and not used after drop.
        unsafe { adc_oneshot_del_unit(self.handle) };
    }
}
