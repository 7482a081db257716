//! State management module - physical device and app preview snapshots
//!
//! This module provides the store that holds what the device reports
//! (physical) next to what the user is editing (preview), the shallow merge
//! rule for partial updates, and the widget catalogue used by the editor.

mod patch;
mod store;
mod types;
pub mod widgets;

pub use patch::DeviceStatePatch;
pub use store::{DeviceStateStore, Subscription};
pub use types::{
    AodSettings, AodTimeout, Button, DeviceState, MusicState, NavigationState, Theme, Weather,
    WeatherCondition, CONNECTED_BATTERY_LEVEL,
};
pub use widgets::WidgetCategory;
