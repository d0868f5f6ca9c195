use serde::{Deserialize, Serialize};

use crate::error::HalError;

/// Polarity convention for positive output.
///
/// Flipping the polarity reverses the sign of forward motion at the device
/// without changing the sign of the caller's command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    /// A positive command drives the rotor counter-clockwise (viewed from the
    /// shaft side).
    CounterClockwisePositive,
    /// A positive command drives the rotor clockwise.
    ClockwisePositive,
}

/// Controller behavior when the commanded voltage is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NeutralMode {
    /// Free-wheel on zero command.
    Coast,
    /// Actively hold position on zero command.
    Brake,
}

/// Snapshot of a motor controller's output configuration.
///
/// This mirrors the persistent configuration held on the device itself, so a
/// refresh must report the live values rather than factory defaults. Applying
/// a snapshot writes every field back in one transaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotorOutputConfig {
    /// Polarity convention for positive output.
    pub polarity: Polarity,
    /// Behavior at zero commanded voltage.
    pub neutral_mode: NeutralMode,
    /// Duty-cycle magnitude below which the output is treated as neutral.
    pub neutral_deadband: f64,
    /// Upper bound on forward output duty, in `[0, 1]`.
    pub peak_forward_duty: f64,
    /// Lower bound on reverse output duty, in `[-1, 0]`.
    pub peak_reverse_duty: f64,
}

impl Default for MotorOutputConfig {
    fn default() -> Self {
        Self {
            polarity: Polarity::CounterClockwisePositive,
            neutral_mode: NeutralMode::Coast,
            neutral_deadband: 0.0,
            peak_forward_duty: 1.0,
            peak_reverse_duty: -1.0,
        }
    }
}

/// Live connection to one motor-driving device.
///
/// Configuration access and voltage commands are synchronous and block the
/// caller until the underlying transport completes.
pub trait MotorController {
    /// Read back the output configuration currently held on the device.
    fn refresh_output_config(&mut self) -> Result<MotorOutputConfig, HalError>;

    /// Write an output configuration to the device.
    ///
    /// This is a persistent device-state write, not an in-memory update.
    fn apply_output_config(&mut self, config: &MotorOutputConfig) -> Result<(), HalError>;

    /// Applied output voltage, in volts.
    fn motor_voltage(&self) -> Result<f64, HalError>;

    /// Torque-equivalent current, in amps.
    fn torque_current(&self) -> Result<f64, HalError>;

    /// Command an output voltage. The value is not clamped at this level.
    fn set_voltage(&mut self, volts: f64) -> Result<(), HalError>;
}
