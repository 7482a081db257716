//! Simulated driver - fakes the wearable link with fixed latencies
//!
//! Every operation sleeps for its configured delay and then succeeds. The
//! delay is internal latency only; nothing observable happens in between.

use crate::config::DeviceConfig;
use crate::drivers::{ConnectionStatus, DeviceDriver};
use crate::state::DeviceStatePatch;
use anyhow::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// SimulatedDriver stands in for the radio link
///
/// Useful for:
/// - Driving the companion without hardware
/// - Tests that need deterministic latency (with a paused tokio clock)
pub struct SimulatedDriver {
    name: String,
    connect_delay: Duration,
    disconnect_delay: Duration,
    write_delay: Duration,
    battery: u8,
    /// Link flag, flipped after the simulated handshake completes
    connected: AtomicBool,
    /// Writes completed, for debugging
    write_count: Arc<RwLock<u64>>,
}

impl SimulatedDriver {
    /// Create a driver from the device section of the config
    pub fn new(config: &DeviceConfig) -> Self {
        Self {
            name: config.name.clone(),
            connect_delay: config.connect_delay(),
            disconnect_delay: config.disconnect_delay(),
            write_delay: config.write_delay(),
            battery: config.connected_battery.min(100),
            connected: AtomicBool::new(false),
            write_count: Arc::new(RwLock::new(0)),
        }
    }

    /// Driver with no latency at all
    pub fn instant(name: impl Into<String>) -> Self {
        let config = DeviceConfig {
            name: name.into(),
            connect_delay_ms: 0,
            disconnect_delay_ms: 0,
            write_delay_ms: 0,
            ..DeviceConfig::default()
        };
        Self::new(&config)
    }

    /// Number of writes completed so far
    pub async fn write_count(&self) -> u64 {
        *self.write_count.read().await
    }
}

#[async_trait]
impl DeviceDriver for SimulatedDriver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn connect(&self) -> Result<u8> {
        debug!(driver = %self.name, delay = ?self.connect_delay, "Simulating handshake");
        tokio::time::sleep(self.connect_delay).await;

        self.connected.store(true, Ordering::SeqCst);
        info!(
            "🔌 [{}] '{}' link up (battery {}%)",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            self.name,
            self.battery
        );
        Ok(self.battery)
    }

    async fn disconnect(&self) -> Result<()> {
        debug!(driver = %self.name, delay = ?self.disconnect_delay, "Simulating teardown");
        tokio::time::sleep(self.disconnect_delay).await;

        self.connected.store(false, Ordering::SeqCst);
        info!(
            "🛑 [{}] '{}' link down",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            self.name
        );
        Ok(())
    }

    async fn write_config(&self, patch: &DeviceStatePatch) -> Result<()> {
        tokio::time::sleep(self.write_delay).await;

        let mut count = self.write_count.write().await;
        *count += 1;
        let write_num = *count;
        drop(count);

        debug!(
            driver = %self.name,
            fields = ?patch.field_names(),
            write_count = write_num,
            "Simulated config write"
        );
        Ok(())
    }

    fn connection_status(&self) -> ConnectionStatus {
        if self.connected.load(Ordering::SeqCst) {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_simulated_driver_lifecycle() {
        let driver = SimulatedDriver::new(&DeviceConfig::default());
        assert_eq!(driver.name(), "PhotoTag");
        assert_eq!(driver.connection_status(), ConnectionStatus::Disconnected);

        let started = Instant::now();
        let battery = driver.connect().await.unwrap();
        assert_eq!(battery, 85);
        assert!(started.elapsed() >= Duration::from_millis(2000));
        assert_eq!(driver.connection_status(), ConnectionStatus::Connected);

        let started = Instant::now();
        driver.write_config(&DeviceStatePatch::default()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(2500));
        assert_eq!(driver.write_count().await, 1);

        let started = Instant::now();
        driver.disconnect().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(1500));
        assert_eq!(driver.connection_status(), ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_instant_driver_never_fails() {
        let driver = SimulatedDriver::instant("bench");
        for _ in 0..5 {
            assert!(driver.connect().await.is_ok());
            assert!(driver.write_config(&DeviceStatePatch::default()).await.is_ok());
            assert!(driver.disconnect().await.is_ok());
        }
        assert_eq!(driver.write_count().await, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_stays_readable_while_driver_is_busy() {
        let driver = Arc::new(SimulatedDriver::new(&DeviceConfig::default()));
        driver.connect().await.unwrap();

        let writer = driver.clone();
        let pending = tokio::spawn(async move {
            writer.write_config(&DeviceStatePatch::default()).await
        });
        tokio::task::yield_now().await;

        // A write in flight must not hide the link
        assert_eq!(driver.connection_status(), ConnectionStatus::Connected);
        pending.await.unwrap().unwrap();

        let closer = driver.clone();
        let pending = tokio::spawn(async move { closer.disconnect().await });
        tokio::task::yield_now().await;
        assert_eq!(driver.connection_status(), ConnectionStatus::Connected);
        pending.await.unwrap().unwrap();
        assert_eq!(driver.connection_status(), ConnectionStatus::Disconnected);
    }
}
