//! Device state type definitions
//!
//! Defines the snapshot shape shared by the physical device and the app
//! preview, plus the small enums used inside it.

use serde::{Deserialize, Serialize};

/// Battery level reported by the simulated device once connected
pub const CONNECTED_BATTERY_LEVEL: u8 = 85;

/// Display theme (used both globally and for the navigation screen)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

/// How long the always-on display stays lit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AodTimeout {
    #[serde(rename = "10s")]
    TenSeconds,
    #[default]
    #[serde(rename = "30s")]
    ThirtySeconds,
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "always")]
    Always,
}

impl std::fmt::Display for AodTimeout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AodTimeout::TenSeconds => write!(f, "10s"),
            AodTimeout::ThirtySeconds => write!(f, "30s"),
            AodTimeout::OneMinute => write!(f, "1m"),
            AodTimeout::Always => write!(f, "always"),
        }
    }
}

/// Weather condition shown by the weather widgets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    #[default]
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
}

/// Always-on display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AodSettings {
    pub enabled: bool,
    pub timeout: AodTimeout,
    /// 0-100
    pub brightness: u8,
    pub auto_dim: bool,
}

impl Default for AodSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout: AodTimeout::ThirtySeconds,
            brightness: 70,
            auto_dim: true,
        }
    }
}

/// Now-playing information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicState {
    pub is_playing: bool,
    pub track_title: String,
}

impl Default for MusicState {
    fn default() -> Self {
        Self {
            is_playing: false,
            track_title: "No Music Playing".to_string(),
        }
    }
}

/// Turn-by-turn navigation display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    pub riding_mode: bool,
    /// e.g. "Turn left in 200m"
    pub next_turn: String,
    /// e.g. "15 min"
    pub eta: String,
    pub current_speed: f64,
    /// e.g. "5 km"
    pub distance_remaining: String,
    pub theme: Theme,
}

impl NavigationState {
    pub const IDLE_NEXT_TURN: &'static str = "Start navigation";
    pub const PLACEHOLDER: &'static str = "--";
}

impl Default for NavigationState {
    fn default() -> Self {
        Self {
            riding_mode: false,
            next_turn: Self::IDLE_NEXT_TURN.to_string(),
            eta: Self::PLACEHOLDER.to_string(),
            current_speed: 0.0,
            distance_remaining: Self::PLACEHOLDER.to_string(),
            theme: Theme::Dark,
        }
    }
}

/// Weather widget data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
    pub condition: WeatherCondition,
    /// Degrees Celsius
    pub temperature: f64,
}

impl Default for Weather {
    fn default() -> Self {
        Self {
            condition: WeatherCondition::Sunny,
            temperature: 25.0,
        }
    }
}

/// Full device snapshot
///
/// Two live instances exist per store: what the device reports (physical)
/// and what the user is editing (preview).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceState {
    pub is_connected: bool,
    /// 0-100, always 0 while disconnected
    pub battery: u8,
    pub aod: AodSettings,
    pub music: MusicState,
    pub navigation: NavigationState,
    pub theme: Theme,
    /// Ordered widget ids, at most one per category (see `widgets`)
    pub widgets: Vec<String>,
    /// Opaque data URI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    pub weather: Weather,
}

impl Default for DeviceState {
    fn default() -> Self {
        Self {
            is_connected: false,
            battery: 0,
            aod: AodSettings::default(),
            music: MusicState::default(),
            navigation: NavigationState::default(),
            theme: Theme::Dark,
            widgets: vec!["time-digital".to_string(), "battery-status".to_string()],
            background_image: None,
            weather: Weather::default(),
        }
    }
}

/// Hardware buttons on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    PlayPause,
    Next,
    Prev,
}

impl Button {
    /// Parse from the wire name ("play_pause", "next", "prev")
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "play_pause" => Some(Button::PlayPause),
            "next" => Some(Button::Next),
            "prev" => Some(Button::Prev),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Button::PlayPause => "play_pause",
            Button::Next => "next",
            Button::Prev => "prev",
        }
    }
}

impl std::fmt::Display for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
