//! PhotoTag companion core
//!
//! Keeps two copies of the wearable's state: what the device reports
//! (physical) and what the user is editing (preview). Edits stay local until
//! applied; link events and device buttons flow back into the preview.

pub mod bridge;
pub mod cli;
pub mod config;
pub mod drivers;
pub mod error;
pub mod notice;
pub mod service;
pub mod state;

pub use bridge::BridgeEvent;
pub use config::AppConfig;
pub use drivers::{ConnectionStatus, DeviceDriver, SimulatedDriver};
pub use error::{SyncError, SyncResult};
pub use notice::{Notice, NoticeBus, NoticeKind};
pub use service::DeviceService;
pub use state::{Button, DeviceState, DeviceStatePatch, DeviceStateStore, Subscription};
