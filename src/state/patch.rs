//! Partial device updates and the shallow merge rule
//!
//! A patch names whole top-level fields. Nested groups are replaced, never
//! merged field by field: sending `music` with only a title is not possible,
//! the full group travels together.

use serde::{Deserialize, Deserializer, Serialize};

use super::types::{AodSettings, DeviceState, MusicState, NavigationState, Theme, Weather};

/// Partial `DeviceState`; `None` leaves the stored field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DeviceStatePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_connected: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aod: Option<AodSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub music: Option<MusicState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation: Option<NavigationState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widgets: Option<Vec<String>>,
    /// `Some(None)` clears the image (`null` in JSON), `None` keeps it
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub background_image: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<Weather>,
}

fn present_or_null<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(de).map(Some)
}

impl DeviceStatePatch {
    /// True if applying this patch would change nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Names of the top-level fields this patch sets (for logging)
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.is_connected.is_some() {
            names.push("isConnected");
        }
        if self.battery.is_some() {
            names.push("battery");
        }
        if self.aod.is_some() {
            names.push("aod");
        }
        if self.music.is_some() {
            names.push("music");
        }
        if self.navigation.is_some() {
            names.push("navigation");
        }
        if self.theme.is_some() {
            names.push("theme");
        }
        if self.widgets.is_some() {
            names.push("widgets");
        }
        if self.background_image.is_some() {
            names.push("backgroundImage");
        }
        if self.weather.is_some() {
            names.push("weather");
        }
        names
    }
}

impl From<DeviceState> for DeviceStatePatch {
    fn from(state: DeviceState) -> Self {
        Self {
            is_connected: Some(state.is_connected),
            battery: Some(state.battery),
            aod: Some(state.aod),
            music: Some(state.music),
            navigation: Some(state.navigation),
            theme: Some(state.theme),
            widgets: Some(state.widgets),
            background_image: Some(state.background_image),
            weather: Some(state.weather),
        }
    }
}

impl DeviceState {
    /// Shallow-merge `patch` into this snapshot
    pub fn merge(&mut self, patch: DeviceStatePatch) {
        let DeviceStatePatch {
            is_connected,
            battery,
            aod,
            music,
            navigation,
            theme,
            widgets,
            background_image,
            weather,
        } = patch;

        if let Some(v) = is_connected {
            self.is_connected = v;
        }
        if let Some(v) = battery {
            self.battery = v.min(100);
        }
        if let Some(mut v) = aod {
            v.brightness = v.brightness.min(100);
            self.aod = v;
        }
        if let Some(v) = music {
            self.music = v;
        }
        if let Some(v) = navigation {
            self.navigation = v;
        }
        if let Some(v) = theme {
            self.theme = v;
        }
        if let Some(v) = widgets {
            self.widgets = v;
        }
        if let Some(v) = background_image {
            self.background_image = v;
        }
        if let Some(v) = weather {
            self.weather = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::types::AodTimeout;

    #[test]
    fn test_nested_group_is_replaced_not_merged() {
        let mut state = DeviceState::default();
        state.music.is_playing = true;

        let patch: DeviceStatePatch =
            serde_json::from_str(r#"{"music":{"isPlaying":false,"trackTitle":"X"}}"#).unwrap();
        state.merge(patch);

        assert_eq!(
            state.music,
            MusicState {
                is_playing: false,
                track_title: "X".to_string()
            }
        );
        // Untouched fields survive
        assert_eq!(state.aod, AodSettings::default());
    }

    #[test]
    fn test_partial_nested_group_is_rejected() {
        let result = serde_json::from_str::<DeviceStatePatch>(r#"{"music":{"trackTitle":"X"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result = serde_json::from_str::<DeviceStatePatch>(r#"{"volume":3}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_background_image_absent_vs_null() {
        let mut state = DeviceState {
            background_image: Some("data:image/png;base64,AAAA".to_string()),
            ..DeviceState::default()
        };

        let keep: DeviceStatePatch = serde_json::from_str(r#"{"theme":"light"}"#).unwrap();
        assert_eq!(keep.background_image, None);
        state.merge(keep);
        assert!(state.background_image.is_some());
        assert_eq!(state.theme, Theme::Light);

        let clear: DeviceStatePatch = serde_json::from_str(r#"{"backgroundImage":null}"#).unwrap();
        assert_eq!(clear.background_image, Some(None));
        state.merge(clear);
        assert!(state.background_image.is_none());
    }

    #[test]
    fn test_brightness_and_battery_are_clamped() {
        let mut state = DeviceState::default();
        state.merge(DeviceStatePatch {
            battery: Some(250),
            aod: Some(AodSettings {
                enabled: false,
                timeout: AodTimeout::Always,
                brightness: 180,
                auto_dim: false,
            }),
            ..Default::default()
        });
        assert_eq!(state.battery, 100);
        assert_eq!(state.aod.brightness, 100);
        assert_eq!(state.aod.timeout, AodTimeout::Always);
    }

    #[test]
    fn test_full_state_patch_reproduces_state() {
        let source = DeviceState {
            theme: Theme::Light,
            widgets: vec!["weather-full".to_string()],
            ..DeviceState::default()
        };
        let mut target = DeviceState {
            background_image: Some("data:old".to_string()),
            ..DeviceState::default()
        };
        target.merge(DeviceStatePatch::from(source.clone()));
        assert_eq!(target, source);
    }

    #[test]
    fn test_field_names_and_empty() {
        assert!(DeviceStatePatch::default().is_empty());
        let patch = DeviceStatePatch {
            theme: Some(Theme::Light),
            background_image: Some(None),
            ..Default::default()
        };
        assert!(!patch.is_empty());
        assert_eq!(patch.field_names(), vec!["theme", "backgroundImage"]);
    }
}
