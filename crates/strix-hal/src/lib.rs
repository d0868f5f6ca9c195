//! Device-layer seam for motor mechanisms.
//!
//! This crate defines the traits a mechanism adapter drives hardware through:
//! a motor controller with a readable/writable output configuration, a
//! quadrature encoder, an absolute encoder, and a backend that opens handles
//! to all three. A simulated backend lives under [`devices`] for bring-up
//! and tests.

pub mod devices;
pub mod error;
pub mod traits;

pub use error::HalError;
pub use traits::backend::HardwareBackend;
pub use traits::encoder::{AbsoluteEncoder, QuadratureEncoder};
pub use traits::motor::{MotorController, MotorOutputConfig, NeutralMode, Polarity};
