//! DeviceService - synchronization between the device and the app preview
//!
//! Owns the state store and a device driver. Link operations (`connect`,
//! `disconnect`, `write_config_to_device`) go through the driver and then
//! update the physical snapshot; preview edits stay local until applied.
//!
//! ```text
//! UI ──edit──▶ preview ──apply──▶ driver.write ──▶ physical ──▶ subscribers
//!                 ▲                                    │
//!                 └──── connect/disconnect/button ─────┘
//! ```

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::bridge::BridgeEvent;
use crate::config::DeviceConfig;
use crate::drivers::{ConnectionStatus, DeviceDriver, SimulatedDriver};
use crate::error::{SyncError, SyncResult};
use crate::notice::{FailedAction, NoticeBus, NoticeKind, RefusedAction};
use crate::state::{
    widgets, Button, DeviceState, DeviceStatePatch, DeviceStateStore, Subscription,
    WidgetCategory,
};


/// Synchronization and preview-editing API over one device
///
/// Cheap to clone; clones share the same store, driver and notice bus.
#[derive(Clone)]
pub struct DeviceService {
    store: DeviceStateStore,
    driver: Arc<dyn DeviceDriver>,
    notices: NoticeBus,
    /// Present when overlapping link operations must be rejected
    in_flight: Option<Arc<tokio::sync::Mutex<()>>>,
}

impl DeviceService {
    /// Create a service over `driver` with default snapshots
    ///
    /// Overlapping link operations are allowed; the last one to complete wins.
    pub fn new(driver: Arc<dyn DeviceDriver>) -> Self {
        Self {
            store: DeviceStateStore::new(),
            driver,
            notices: NoticeBus::new(),
            in_flight: None,
        }
    }

    /// Create a service backed by a [`SimulatedDriver`] built from `config`
    pub fn simulated(config: &DeviceConfig) -> Self {
        Self::new(Arc::new(SimulatedDriver::new(config))).with_single_flight(config.single_flight)
    }

    /// Reject link operations started while another one is in flight
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.in_flight = enabled.then(|| Arc::new(tokio::sync::Mutex::new(())));
        self
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    /// Copy of what the device reports
    pub fn physical_state(&self) -> DeviceState {
        self.store.physical_state()
    }

    /// Copy of the in-progress edits
    pub fn preview_state(&self) -> DeviceState {
        self.store.preview_state()
    }

    /// Subscribe to physical state changes
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&DeviceState) + Send + Sync + 'static,
    {
        self.store.subscribe(listener)
    }

    /// Notice bus for user-visible outcomes
    pub fn notices(&self) -> &NoticeBus {
        &self.notices
    }

    /// Name of the underlying driver
    pub fn driver_name(&self) -> &str {
        self.driver.name()
    }

    /// Link status as the driver sees it
    pub fn link_status(&self) -> ConnectionStatus {
        self.driver.connection_status()
    }

    // =========================================================================
    // Synchronization API
    // =========================================================================

    /// Connect to the device
    ///
    /// Sets `is_connected` and the reported battery level on both snapshots
    /// once the handshake completes. Resolves `true`.
    pub async fn connect(&self) -> SyncResult<bool> {
        let _guard = self.begin("connect")?;
        self.notices.publish(NoticeKind::Connecting);
        info!(driver = self.driver.name(), "Connecting to device");

        let battery = self.driver.connect().await.map_err(|e| {
            warn!("Connect failed: {:#}", e);
            self.notices.publish(NoticeKind::Failed(FailedAction::Connect));
            SyncError::Driver(e)
        })?;

        let snapshot = self.store.update_physical(|physical, preview| {
            physical.is_connected = true;
            physical.battery = battery;
            preview.is_connected = true;
            preview.battery = battery;
            physical.clone()
        });
        self.store.notify_all(&snapshot);

        self.notices.publish(NoticeKind::Connected);
        info!(battery, "Device connected");
        Ok(true)
    }

    /// Disconnect from the device
    ///
    /// Clears `is_connected` and zeroes the battery on both snapshots.
    /// Resolves `true`.
    pub async fn disconnect(&self) -> SyncResult<bool> {
        let _guard = self.begin("disconnect")?;
        self.notices.publish(NoticeKind::Disconnecting);
        info!(driver = self.driver.name(), "Disconnecting from device");

        self.driver.disconnect().await.map_err(|e| {
            warn!("Disconnect failed: {:#}", e);
            self.notices.publish(NoticeKind::Failed(FailedAction::Disconnect));
            SyncError::Driver(e)
        })?;

        let snapshot = self.store.update_physical(|physical, preview| {
            physical.is_connected = false;
            physical.battery = 0;
            preview.is_connected = false;
            preview.battery = 0;
            physical.clone()
        });
        self.store.notify_all(&snapshot);

        self.notices.publish(NoticeKind::Disconnected);
        info!("Device disconnected");
        Ok(true)
    }

    /// Write a partial configuration to the device
    ///
    /// Resolves `false` without touching anything when disconnected.
    /// Otherwise shallow-merges `config` into the physical snapshot after the
    /// driver write completes; the preview is left as is.
    pub async fn write_config_to_device(&self, config: DeviceStatePatch) -> SyncResult<bool> {
        if !self.store.is_connected() {
            warn!("Write refused: device not connected");
            self.notices
                .publish(NoticeKind::NotConnected(RefusedAction::ApplyChanges));
            return Ok(false);
        }

        let _guard = self.begin("write")?;
        self.notices.publish(NoticeKind::Applying);
        info!(fields = ?config.field_names(), "Applying changes to device");

        self.driver.write_config(&config).await.map_err(|e| {
            warn!("Config write failed: {:#}", e);
            self.notices
                .publish(NoticeKind::Failed(FailedAction::ApplyChanges));
            SyncError::Driver(e)
        })?;

        let snapshot = self.store.merge_physical(config);
        self.store.notify_all(&snapshot);

        self.notices.publish(NoticeKind::Applied);
        info!("Changes applied to device");
        Ok(true)
    }

    /// Push the preview snapshot to the device ("Apply")
    ///
    /// Link fields (`is_connected`, `battery`) are left out; only
    /// `connect`/`disconnect` and the driver own them.
    pub async fn apply_preview(&self) -> SyncResult<bool> {
        let mut patch = DeviceStatePatch::from(self.store.preview_state());
        patch.is_connected = None;
        patch.battery = None;
        self.write_config_to_device(patch).await
    }

    /// Simulate a hardware button on the device
    ///
    /// Returns false (and changes nothing) when disconnected. `play_pause`
    /// toggles playback on the device and mirrors it into the preview;
    /// `next` and `prev` have no modeled effect beyond the notification.
    pub fn simulate_device_button_press(&self, button: Button) -> bool {
        if !self.store.is_connected() {
            warn!(%button, "Button press ignored: device not connected");
            self.notices
                .publish(NoticeKind::NotConnected(RefusedAction::ButtonPress));
            return false;
        }

        self.notices.publish(NoticeKind::ButtonPressed(button));
        info!(%button, "Device button pressed");

        let snapshot = self.store.update_physical(|physical, preview| {
            if button == Button::PlayPause {
                physical.music.is_playing = !physical.music.is_playing;
                preview.music.is_playing = physical.music.is_playing;
                debug!(playing = physical.music.is_playing, "Playback toggled");
            }
            physical.clone()
        });

        self.store.notify_all(&snapshot);
        true
    }

    /// Merge an update reported by the device side (notification bridge)
    ///
    /// Same rule as [`write_config_to_device`](Self::write_config_to_device):
    /// connected-only, shallow merge into the physical snapshot, subscribers
    /// notified. There is no write latency since the data comes from the
    /// device. Publishes `DeviceUpdated` on success.
    pub fn ingest_device_report(&self, report: DeviceStatePatch) -> bool {
        if !self.store.is_connected() {
            debug!("Device report dropped: device not connected");
            self.notices
                .publish(NoticeKind::NotConnected(RefusedAction::DeviceReport));
            return false;
        }

        debug!(fields = ?report.field_names(), "Device report");
        let snapshot = self.store.merge_physical(report);
        self.store.notify_all(&snapshot);
        self.notices.publish(NoticeKind::DeviceUpdated);
        true
    }

    /// Merge a parsed phone notification into the physical snapshot
    pub fn ingest_bridge_event(&self, event: BridgeEvent) -> bool {
        let patch = event.into_patch(&self.store.physical_state());
        self.ingest_device_report(patch)
    }

    // =========================================================================
    // Preview editing API
    // =========================================================================

    /// Shallow-merge `patch` into the preview only
    ///
    /// Never touches the physical snapshot and never notifies subscribers.
    pub fn update_app_preview_state(&self, patch: DeviceStatePatch) {
        self.store.merge_preview(patch);
    }

    /// Select (or clear) the preview widget for one category
    pub fn select_preview_widget(&self, category: WidgetCategory, widget_id: Option<&str>) {
        self.store.update_preview(|preview| {
            preview.widgets = widgets::select(&preview.widgets, category, widget_id);
        });
        debug!(%category, widget = ?widget_id, "Preview widget selected");
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn begin(&self, op: &'static str) -> SyncResult<Option<tokio::sync::MutexGuard<'_, ()>>> {
        match &self.in_flight {
            Some(lock) => match lock.try_lock() {
                Ok(guard) => Ok(Some(guard)),
                Err(_) => {
                    warn!(op, "Rejected overlapping link operation");
                    self.notices.publish(NoticeKind::Busy(op));
                    Err(SyncError::Busy(op))
                }
            },
            None => Ok(None),
        }
    }
}
