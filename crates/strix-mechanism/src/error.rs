use strix_hal::HalError;
use thiserror::Error;

/// Errors raised while bringing up or reconfiguring a mechanism.
///
/// Every variant is fatal to the operation that produced it; there is no
/// retry at this level.
#[derive(Debug, Error)]
pub enum MechanismError {
    /// A motor controller could not be opened or read during bring-up.
    #[error("motor controller {id} failed to initialize")]
    MotorInit {
        id: u32,
        #[source]
        source: HalError,
    },

    /// The quadrature encoder could not be opened or configured.
    #[error("quadrature encoder on channels {channel_a}/{channel_b} failed to initialize")]
    QuadEncoderInit {
        channel_a: u32,
        channel_b: u32,
        #[source]
        source: HalError,
    },

    /// The absolute encoder could not be opened.
    #[error("absolute encoder on channel {channel} failed to initialize")]
    AbsEncoderInit {
        channel: u32,
        #[source]
        source: HalError,
    },

    /// A configuration write to an attached motor controller failed.
    #[error("configuration write to motor controller {id} failed")]
    ConfigWrite {
        id: u32,
        #[source]
        source: HalError,
    },
}
