use serde::{Deserialize, Serialize};

/// Per-kind toggles; a disallowed kind is dropped before dispatch.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllowedEvents {
    pub point: bool,
    pub rectangle: bool,
    pub imagery: bool,
}

impl Default for AllowedEvents {
    fn default() -> Self {
        Self {
            point: true,
            rectangle: true,
            imagery: true,
        }
    }
}

pub const DEFAULT_IMAGERY_FORMATS: [&str; 2] = ["mvt", "wms"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SelectionConfig {
    /// Layer data types whose selection arrives through the host `select`
    /// notification instead of viewport picking.
    pub imagery_formats: Vec<String>,
    pub disabled: bool,
    pub allow_click_when_disabled: bool,
    pub allowed_events: AllowedEvents,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            imagery_formats: DEFAULT_IMAGERY_FORMATS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            disabled: false,
            allow_click_when_disabled: false,
            allowed_events: AllowedEvents::default(),
        }
    }
}
