use std::error::Error;

use log::{info, warn};
use rppal::gpio::{Gpio, OutputPin};

/// GPIO pin assignments for the per-axis fault LEDs.
const GPIO_YAW_FAULT_LED: u8 = 23;
const GPIO_PITCH_FAULT_LED: u8 = 24;

/// Status output for per-axis fault conditions. The controller raises a
/// fault whenever the corresponding motor reports offline.
pub trait Indicator: Send {
    fn set_yaw_fault(&mut self, fault: bool);
    fn set_pitch_fault(&mut self, fault: bool);
}

/// Drives two fault LEDs from GPIO output pins.
pub struct LedIndicator {
    yaw_led: OutputPin,
    pitch_led: OutputPin,
}

impl LedIndicator {
    pub fn new() -> Result<Self, Box<dyn Error>> {
        Self::with_pins(GPIO_YAW_FAULT_LED, GPIO_PITCH_FAULT_LED)
    }

    pub fn with_pins(yaw_pin: u8, pitch_pin: u8) -> Result<Self, Box<dyn Error>> {
        let gpio = Gpio::new()?;

        let yaw_led = gpio.get(yaw_pin)?.into_output_low();
        let pitch_led = gpio.get(pitch_pin)?.into_output_low();

        Ok(Self { yaw_led, pitch_led })
    }
}

impl Indicator for LedIndicator {
    fn set_yaw_fault(&mut self, fault: bool) {
        if fault {
            self.yaw_led.set_high();
        } else {
            self.yaw_led.set_low();
        }
    }

    fn set_pitch_fault(&mut self, fault: bool) {
        if fault {
            self.pitch_led.set_high();
        } else {
            self.pitch_led.set_low();
        }
    }
}

/// Fallback indicator for hosts without the LED pins. Logs fault
/// transitions only, so a 500 Hz refresh does not flood the output.
pub struct LogIndicator {
    yaw_fault: bool,
    pitch_fault: bool,
}

impl LogIndicator {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            yaw_fault: false,
            pitch_fault: false,
        }
    }

    pub fn yaw_fault(&self) -> bool {
        self.yaw_fault
    }

    pub fn pitch_fault(&self) -> bool {
        self.pitch_fault
    }
}

impl Indicator for LogIndicator {
    fn set_yaw_fault(&mut self, fault: bool) {
        if fault != self.yaw_fault {
            self.yaw_fault = fault;
            if fault {
                warn!("yaw motor offline");
            } else {
                info!("yaw motor back online");
            }
        }
    }

    fn set_pitch_fault(&mut self, fault: bool) {
        if fault != self.pitch_fault {
            self.pitch_fault = fault;
            if fault {
                warn!("pitch motor offline");
            } else {
                info!("pitch motor back online");
            }
        }
    }
}
