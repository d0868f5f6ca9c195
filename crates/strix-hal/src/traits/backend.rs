use crate::error::HalError;
use crate::traits::encoder::{AbsoluteEncoder, QuadratureEncoder};
use crate::traits::motor::MotorController;

/// Factory for device handles on one hardware platform.
///
/// A backend owns the bus/port bookkeeping; the handles it returns are owned
/// exclusively by the caller. Opening a device that is absent or already
/// claimed is an error.
pub trait HardwareBackend {
    type Motor: MotorController;
    type QuadEncoder: QuadratureEncoder;
    type AbsEncoder: AbsoluteEncoder;

    /// Open a handle to the motor controller with the given device id.
    fn open_motor(&mut self, id: u32) -> Result<Self::Motor, HalError>;

    /// Open a quadrature encoder on two digital channels.
    ///
    /// `inverted` reverses the counting direction of the device.
    fn open_quadrature_encoder(
        &mut self,
        channel_a: u32,
        channel_b: u32,
        inverted: bool,
    ) -> Result<Self::QuadEncoder, HalError>;

    /// Open an absolute duty-cycle encoder on one channel.
    fn open_absolute_encoder(&mut self, channel: u32) -> Result<Self::AbsEncoder, HalError>;
}
