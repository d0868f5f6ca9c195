use thiserror::Error;

/// Errors raised by the device layer.
///
/// There are no retries or timeouts at this level. An open failure means the
/// device is absent or claimed; a transport failure means a synchronous
/// read/write against an attached device did not complete.
#[derive(Debug, Error)]
pub enum HalError {
    /// A motor controller handle could not be opened.
    #[error("failed to open motor controller {id}: {reason}")]
    MotorOpen { id: u32, reason: String },

    /// A quadrature encoder handle could not be opened.
    #[error("failed to open quadrature encoder on channels {channel_a}/{channel_b}: {reason}")]
    QuadEncoderOpen {
        channel_a: u32,
        channel_b: u32,
        reason: String,
    },

    /// An absolute encoder handle could not be opened.
    #[error("failed to open absolute encoder on channel {channel}: {reason}")]
    AbsEncoderOpen { channel: u32, reason: String },

    /// A synchronous read from an attached device failed.
    #[error("device read failed: {0}")]
    Read(String),

    /// A synchronous write to an attached device failed.
    #[error("device write failed: {0}")]
    Write(String),
}
