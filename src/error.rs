//! Error types for the synchronization service
//!
//! A disconnected device is not an error: operations report it through their
//! `false` result and a `NotConnected` notice. Errors are reserved for the
//! driver failing and for the optional single-flight guard.

use thiserror::Error;

/// Convenience alias for results produced by the service
pub type SyncResult<T> = std::result::Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Device driver error: {0}")]
    Driver(#[from] anyhow::Error),

    #[error("Another '{0}' operation is still in flight")]
    Busy(&'static str),
}
