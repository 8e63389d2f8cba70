use thiserror::Error;

/// Errors surfaced to a [`crate::Connection`] caller (spec §7).
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("connection worker is no longer alive")]
    NotConnected,
    #[error("unknown device {0:?}")]
    UnknownDevice(String),
    #[error("unknown property {device:?}.{property:?}")]
    UnknownProperty { device: String, property: String },
    #[error("timed out waiting for the requested value to be mirrored back")]
    SetTimeout,
    #[error("blob vectors cannot be written from the client")]
    BlobNotWritable,
    #[error("requested value does not match {device:?}.{property:?}'s vector kind")]
    ValueKindMismatch { device: String, property: String },
    #[error(transparent)]
    Wire(#[from] obs_wire::WireError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
