use crate::error::HalError;

/// Relative position/rate sensor counting pulses on two phase channels.
pub trait QuadratureEncoder {
    /// Set the scale factor converting one pulse to physical distance units.
    fn set_distance_per_pulse(&mut self, distance_per_pulse: f64) -> Result<(), HalError>;

    /// Current rate of change, in configured distance units per second over
    /// the device-native sampling window.
    fn rate(&self) -> Result<f64, HalError>;
}

/// Absolute angular position sensor, independent of power-cycle history.
pub trait AbsoluteEncoder {
    /// Absolute position as a fraction of one full rotation, in `[0, 1)`.
    fn fraction(&self) -> Result<f64, HalError>;
}
