//! Widget catalogue for the device home screen
//!
//! Widget ids are prefixed by their category (`time-`, `weather-`, ...). The
//! store accepts any list; the editing layer uses [`select`] to keep at most
//! one widget per category.

use serde::{Deserialize, Serialize};

/// Widget category, identified by its id prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetCategory {
    Clock,
    Weather,
    Battery,
    Music,
    Directions,
}

impl WidgetCategory {
    /// All categories in display order
    pub fn all() -> &'static [WidgetCategory] {
        &[
            WidgetCategory::Clock,
            WidgetCategory::Weather,
            WidgetCategory::Battery,
            WidgetCategory::Music,
            WidgetCategory::Directions,
        ]
    }

    pub fn id_prefix(&self) -> &'static str {
        match self {
            WidgetCategory::Clock => "time-",
            WidgetCategory::Weather => "weather-",
            WidgetCategory::Battery => "battery-",
            WidgetCategory::Music => "music-",
            WidgetCategory::Directions => "directions-",
        }
    }

    /// Selectable widget ids with their display names
    pub fn options(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            WidgetCategory::Clock => &[
                ("time-digital-small", "Digital Clock (Small)"),
                ("time-digital-large", "Digital Clock (Large)"),
                ("time-analog-small", "Analog Clock (Small)"),
                ("time-analog-large", "Analog Clock (Large)"),
                ("time-text-date", "Digital Clock with Date"),
            ],
            WidgetCategory::Weather => &[
                ("weather-icon", "Weather Icon Only"),
                ("weather-temp-icon", "Temperature + Icon"),
                ("weather-full", "Full Weather Details"),
            ],
            WidgetCategory::Battery => &[
                ("battery-status", "Battery Status (Text)"),
                ("battery-bar", "Battery Bar"),
            ],
            WidgetCategory::Music => &[
                ("music-mini", "Music Mini Widget"),
                ("music-full", "Full Music Controls"),
            ],
            WidgetCategory::Directions => &[
                ("directions-compact", "Directions Compact"),
                ("directions-full", "Full Directions"),
            ],
        }
    }

    /// Parse from the category name ("clock", "weather", ...)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "clock" | "time" => Some(WidgetCategory::Clock),
            "weather" => Some(WidgetCategory::Weather),
            "battery" => Some(WidgetCategory::Battery),
            "music" => Some(WidgetCategory::Music),
            "directions" => Some(WidgetCategory::Directions),
            _ => None,
        }
    }

    /// Category of a widget id, by prefix
    pub fn of(widget_id: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|c| widget_id.starts_with(c.id_prefix()))
    }
}

impl std::fmt::Display for WidgetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WidgetCategory::Clock => "clock",
            WidgetCategory::Weather => "weather",
            WidgetCategory::Battery => "battery",
            WidgetCategory::Music => "music",
            WidgetCategory::Directions => "directions",
        };
        write!(f, "{}", name)
    }
}

/// Replace the selection for `category`
///
/// Removes every id carrying the category prefix, then appends `selected`
/// (when given). Other categories keep their order.
pub fn select(widgets: &[String], category: WidgetCategory, selected: Option<&str>) -> Vec<String> {
    let prefix = category.id_prefix();
    let mut next: Vec<String> = widgets
        .iter()
        .filter(|id| !id.starts_with(prefix))
        .cloned()
        .collect();
    if let Some(id) = selected.filter(|id| !id.is_empty()) {
        next.push(id.to_string());
    }
    next
}
