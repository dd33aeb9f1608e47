use serde::{Deserialize, Serialize};

/// How a committed selection event combines with the current selection.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionAction {
    #[default]
    Replace,
    Add,
    Remove,
}

/// Resolves the action from the modifier key the host reports as held.
///
/// Only `"shift"` extends the selection; anything else replaces it.
pub fn resolve_action(key_name: Option<&str>) -> SelectionAction {
    match key_name {
        Some("shift") => SelectionAction::Add,
        _ => SelectionAction::Replace,
    }
}

/// Screen-space rectangle in pixels, normalized to a top-left origin.
#[derive(Debug, Copy, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rectangle {
    pub fn from_corners(start: [f64; 2], end: [f64; 2]) -> Self {
        Self {
            x: start[0].min(end[0]),
            y: start[1].min(end[1]),
            width: (end[0] - start[0]).abs(),
            height: (end[1] - start[1]).abs(),
        }
    }
}

/// A feature reported by the host's picking API.
///
/// The payload is owned by the host; only the identifying fields are typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickedFeature {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_id: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub properties: serde_json::Value,
}

impl PickedFeature {
    pub fn new(layer_id: impl Into<String>, feature_id: impl Into<String>) -> Self {
        Self {
            layer_id: Some(layer_id.into()),
            feature_id: Some(feature_id.into()),
            properties: serde_json::Value::Null,
        }
    }
}

/// Imagery layers (MVT, WMS, ...) report selection by layer, not by position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageryPick {
    pub layer_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<PickedFeature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointEvent {
    pub action: SelectionAction,
    pub x: f64,
    pub y: f64,
    pub feature: Option<PickedFeature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectangleEvent {
    pub action: SelectionAction,
    pub start_position: [f64; 2],
    pub end_position: [f64; 2],
    pub rectangle: Rectangle,
    /// Empty while the drag is in progress.
    pub features: Vec<PickedFeature>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageryEvent {
    pub action: SelectionAction,
    pub object: ImageryPick,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SelectionEventKind {
    Point,
    Rectangle,
    Imagery,
}

/// Normalized selection outcome published by the screen-space handler.
///
/// Every dispatch carries a fresh value; listeners may clone it freely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SelectionEvent {
    Point(PointEvent),
    Rectangle(RectangleEvent),
    Imagery(ImageryEvent),
}

/// One selectable thing carried by an event.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectedObject {
    Feature(PickedFeature),
    Imagery(ImageryPick),
}

impl SelectionEvent {
    pub fn kind(&self) -> SelectionEventKind {
        match self {
            SelectionEvent::Point(_) => SelectionEventKind::Point,
            SelectionEvent::Rectangle(_) => SelectionEventKind::Rectangle,
            SelectionEvent::Imagery(_) => SelectionEventKind::Imagery,
        }
    }

    pub fn action(&self) -> SelectionAction {
        match self {
            SelectionEvent::Point(e) => e.action,
            SelectionEvent::Rectangle(e) => e.action,
            SelectionEvent::Imagery(e) => e.action,
        }
    }

    /// Objects picked by this event, in host order.
    pub fn objects(&self) -> Vec<SelectedObject> {
        match self {
            SelectionEvent::Point(e) => e
                .feature
                .iter()
                .cloned()
                .map(SelectedObject::Feature)
                .collect(),
            SelectionEvent::Rectangle(e) => e
                .features
                .iter()
                .cloned()
                .map(SelectedObject::Feature)
                .collect(),
            SelectionEvent::Imagery(e) => vec![SelectedObject::Imagery(e.object.clone())],
        }
    }
}
