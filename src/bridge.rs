//! Phone notification bridge
//!
//! The platform side (a notification listener on the phone) emits media and
//! navigation events that have already been parsed into plain fields. This
//! module turns them into partial device updates, which the service merges
//! the same way it merges a config write.

use serde::Deserialize;

use crate::state::{DeviceState, DeviceStatePatch, MusicState, NavigationState};

/// Title the listener sends when no media session is active
pub const NO_MEDIA_TITLE: &str = "No Music";

/// Event emitted by the platform notification listener
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BridgeEvent {
    Media(MediaEvent),
    Navigation(NavigationEvent),
}

/// Active media session snapshot
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaEvent {
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
    pub is_playing: bool,
    /// Path or URI of the cover image; not forwarded to the device
    #[serde(default)]
    pub album_art: Option<String>,
}

/// Turn-by-turn notification snapshot
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationEvent {
    pub is_navigating: bool,
    #[serde(default)]
    pub direction: String,
    #[serde(default)]
    pub distance: String,
    #[serde(default)]
    pub eta: String,
}

impl BridgeEvent {
    /// Parse one event payload (JSON object)
    pub fn from_json(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }

    /// Build the device update for this event
    ///
    /// Nested groups travel whole, so navigation updates start from the
    /// current physical group and only replace the fields the phone knows.
    pub fn into_patch(self, current: &DeviceState) -> DeviceStatePatch {
        match self {
            BridgeEvent::Media(media) => DeviceStatePatch {
                music: Some(media.into_music()),
                ..Default::default()
            },
            BridgeEvent::Navigation(nav) => DeviceStatePatch {
                navigation: Some(nav.into_navigation(&current.navigation)),
                ..Default::default()
            },
        }
    }
}

impl MediaEvent {
    fn into_music(self) -> MusicState {
        if self.title == NO_MEDIA_TITLE && !self.is_playing {
            return MusicState::default();
        }
        MusicState {
            is_playing: self.is_playing,
            track_title: self.title,
        }
    }
}

impl NavigationEvent {
    fn into_navigation(self, current: &NavigationState) -> NavigationState {
        if !self.is_navigating {
            return NavigationState {
                next_turn: NavigationState::IDLE_NEXT_TURN.to_string(),
                eta: NavigationState::PLACEHOLDER.to_string(),
                distance_remaining: NavigationState::PLACEHOLDER.to_string(),
                ..current.clone()
            };
        }

        NavigationState {
            next_turn: or_placeholder(self.direction),
            eta: or_placeholder(self.eta),
            distance_remaining: or_placeholder(self.distance),
            ..current.clone()
        }
    }
}

fn or_placeholder(value: String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("unknown") {
        NavigationState::PLACEHOLDER.to_string()
    } else {
        trimmed.to_string()
    }
}
