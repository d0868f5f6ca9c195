//! Motor-mechanism adapter over the `strix-hal` device seam.
//!
//! A mechanism is a group of motors that move one joint together, sensed by
//! one quadrature encoder and one absolute encoder. This crate holds the
//! settings value objects, the capability set the rest of the robot code
//! consumes, and the adapter that wires both to a hardware backend.

pub mod error;
pub mod mechanism;
pub mod settings;

pub use error::MechanismError;
pub use mechanism::{MechanismControl, MotorMechanism};
pub use settings::MotorMechanismSettings;
