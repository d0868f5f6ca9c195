//! Settings value objects for a motor mechanism.
//!
//! These are pure data holders: the adapter performs no validation and
//! assumes ids, channels, and array lengths are correct. The caller that
//! builds them (normally the configuration layer) owns that contract.

use serde::Deserialize;

/// Settings for one motor controller on the mechanism.
#[derive(Debug, Clone, Deserialize)]
pub struct MotorSettings {
    /// Device id of the motor controller.
    pub id: u32,
    /// Reverse the polarity of forward motion for this motor.
    pub inverted: bool,
}

/// Settings for the quadrature encoder.
#[derive(Debug, Clone, Deserialize)]
pub struct QuadEncoderSettings {
    /// Digital channel of the A phase.
    pub channel_a: u32,
    /// Digital channel of the B phase.
    pub channel_b: u32,
    /// Reverse the counting direction.
    pub inverted: bool,
    /// Scale factor converting one pulse to physical distance units.
    pub distance_per_pulse: f64,
}

/// Settings for the absolute duty-cycle encoder.
#[derive(Debug, Clone, Deserialize)]
pub struct AbsEncoderSettings {
    /// Channel the encoder's duty-cycle signal is wired to.
    pub channel: u32,
    /// Reverse the reported direction of rotation.
    pub inverted: bool,
    /// Calibration constant aligning the sensor's zero with the mechanism's
    /// physical zero, in degrees.
    pub zero_offset: f64,
}

/// A closed interval, used for tolerances and travel ranges.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Limits {
    pub min: f64,
    pub max: f64,
}

/// Position-controller tuning, consumed by the controller layer.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PositionControlSettings {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    /// Velocity ceiling, degrees per second.
    pub max_velocity: f64,
    /// Acceleration ceiling, degrees per second squared.
    pub max_accel: f64,
}

/// One stage of the mechanism's travel with its own rate cap.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct StageSettings {
    /// Travel range this stage covers, in degrees.
    pub range: Limits,
    /// Velocity ceiling inside this stage, degrees per second.
    pub max_velocity: f64,
}

/// Settings shared by every mechanism regardless of hardware.
///
/// The adapter passes these through untouched; only the controller layer
/// and dashboards read them.
#[derive(Debug, Clone, Deserialize)]
pub struct MechanismSettings {
    /// Human-readable mechanism name, used in logs.
    pub name: String,
    /// Dashboard tab the mechanism reports under.
    pub dashboard_tab: String,
    /// Position-controller tuning.
    pub position_control: PositionControlSettings,
    /// Travel stages with per-stage rate caps.
    pub stages: Vec<StageSettings>,
    /// Default position tolerance, in degrees.
    pub default_tolerance: Limits,
}

/// Complete settings for one motor mechanism.
///
/// `motors` is ordered and must be non-empty; its length is the mechanism's
/// motor count and every index gets a live handle at construction.
#[derive(Debug, Clone, Deserialize)]
pub struct MotorMechanismSettings {
    /// Hardware-independent mechanism settings.
    pub base: MechanismSettings,
    /// One entry per motor controller; all motors move the joint together.
    pub motors: Vec<MotorSettings>,
    /// Quadrature encoder settings.
    pub quad_encoder: QuadEncoderSettings,
    /// Absolute encoder settings.
    pub abs_encoder: AbsEncoderSettings,
}

impl MotorMechanismSettings {
    /// Number of motors on the mechanism.
    pub fn motor_count(&self) -> usize {
        self.motors.len()
    }
}
