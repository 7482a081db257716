//! Device link drivers
//!
//! The service talks to the wearable through [`DeviceDriver`]. The only
//! implementation today is [`SimulatedDriver`], which stands in for the radio
//! link with fixed latencies; a real transport plugs in behind the same trait.

use anyhow::Result;
use async_trait::async_trait;

use crate::state::DeviceStatePatch;

/// Link status as seen by a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// Link is up
    Connected,
    /// Link is down
    Disconnected,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Connected => write!(f, "connected"),
            ConnectionStatus::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// Driver trait - every device transport implements this
///
/// All methods take &self so drivers can live behind `Arc<dyn DeviceDriver>`.
/// Drivers use interior mutability for their own bookkeeping.
#[async_trait]
pub trait DeviceDriver: Send + Sync {
    /// Driver name (e.g., "simulated")
    fn name(&self) -> &str;

    /// Perform the connection handshake
    ///
    /// Returns the battery level the device reports once connected.
    async fn connect(&self) -> Result<u8>;

    /// Tear down the link
    async fn disconnect(&self) -> Result<()>;

    /// Push a partial configuration to the device
    async fn write_config(&self, patch: &DeviceStatePatch) -> Result<()>;

    /// Current link status
    ///
    /// Default implementation: always disconnected (drivers that never track
    /// a link)
    fn connection_status(&self) -> ConnectionStatus {
        ConnectionStatus::Disconnected
    }
}

pub mod simulated;

pub use simulated::SimulatedDriver;
