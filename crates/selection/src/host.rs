use serde::{Deserialize, Serialize};

use crate::event::PickedFeature;

/// Raw input notifications the handler listens to on the host globe.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum HostEventKind {
    Select,
    /// Tap/click notification; used on touch devices where mouse up/down
    /// tracking conflicts with pinch gestures.
    Click,
    LayerSelectWithRectMove,
    LayerSelectWithRectEnd,
}

impl HostEventKind {
    pub const ALL: [HostEventKind; 4] = [
        HostEventKind::Select,
        HostEventKind::Click,
        HostEventKind::LayerSelectWithRectMove,
        HostEventKind::LayerSelectWithRectEnd,
    ];

    /// Event name on the host side.
    pub fn as_str(self) -> &'static str {
        match self {
            HostEventKind::Select => "select",
            HostEventKind::Click => "click",
            HostEventKind::LayerSelectWithRectMove => "layerSelectWithRectMove",
            HostEventKind::LayerSelectWithRectEnd => "layerSelectWithRectEnd",
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MouseEvent {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectMoveEvent {
    #[serde(default)]
    pub start_x: Option<f64>,
    #[serde(default)]
    pub start_y: Option<f64>,
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
    #[serde(default)]
    pub pressed_key: Option<String>,
}

impl RectMoveEvent {
    pub fn start_position(&self) -> [f64; 2] {
        [self.start_x.unwrap_or(0.0), self.start_y.unwrap_or(0.0)]
    }

    pub fn position(&self) -> [f64; 2] {
        [self.x.unwrap_or(0.0), self.y.unwrap_or(0.0)]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectEndEvent {
    #[serde(flatten)]
    pub drag: RectMoveEvent,
    #[serde(default)]
    pub is_click: bool,
    /// Features the host intersected with the drag, or the clicked feature.
    #[serde(default)]
    pub features: Option<Vec<PickedFeature>>,
}

/// A raw notification routed from the host to the handler.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Select { layer_id: Option<String> },
    Click(MouseEvent),
    LayerSelectWithRectMove(RectMoveEvent),
    LayerSelectWithRectEnd(RectEndEvent),
}

impl HostEvent {
    pub fn kind(&self) -> HostEventKind {
        match self {
            HostEvent::Select { .. } => HostEventKind::Select,
            HostEvent::Click(_) => HostEventKind::Click,
            HostEvent::LayerSelectWithRectMove(_) => HostEventKind::LayerSelectWithRectMove,
            HostEvent::LayerSelectWithRectEnd(_) => HostEventKind::LayerSelectWithRectEnd,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostLayerData {
    #[serde(rename = "type")]
    pub data_type: String,
}

/// Layer record returned by the host's layer lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostLayer {
    pub id: String,
    #[serde(rename = "type")]
    pub layer_type: String,
    #[serde(default)]
    pub data: Option<HostLayerData>,
}

impl HostLayer {
    pub fn simple(id: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            layer_type: "simple".to_string(),
            data: Some(HostLayerData {
                data_type: data_type.into(),
            }),
        }
    }

    /// Data type of a simple layer; other layer kinds carry none.
    pub fn simple_data_type(&self) -> Option<&str> {
        if self.layer_type != "simple" {
            return None;
        }
        self.data.as_ref().map(|d| d.data_type.as_str())
    }
}

/// Capabilities the selection handler needs from the host globe.
///
/// Every method may report "not ready" (`None`) while the host API is still
/// loading; callers treat that as a silent no-op.
pub trait SelectionHost {
    /// Starts routing `kind` notifications to the handler.
    fn on(&mut self, kind: HostEventKind) -> Option<SubscriptionId>;

    fn off(&mut self, subscription: SubscriptionId);

    /// Features under a `width` x `height` pixel window centered on `position`.
    fn pick_many_from_viewport(
        &self,
        position: [f64; 2],
        width: f64,
        height: f64,
    ) -> Option<Vec<PickedFeature>>;

    fn find_layer(&self, layer_id: &str) -> Option<HostLayer>;

    /// Feature the host currently reports as selected, if any.
    fn selected_feature(&self) -> Option<PickedFeature>;
}

/// Host that has not loaded yet.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl SelectionHost for NullHost {
    fn on(&mut self, _kind: HostEventKind) -> Option<SubscriptionId> {
        None
    }

    fn off(&mut self, _subscription: SubscriptionId) {}

    fn pick_many_from_viewport(
        &self,
        _position: [f64; 2],
        _width: f64,
        _height: f64,
    ) -> Option<Vec<PickedFeature>> {
        None
    }

    fn find_layer(&self, _layer_id: &str) -> Option<HostLayer> {
        None
    }

    fn selected_feature(&self) -> Option<PickedFeature> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{HostEventKind, HostLayer, RectEndEvent};

    #[test]
    fn only_simple_layers_have_a_data_type() {
        let l = HostLayer::simple("l1", "mvt");
        assert_eq!(l.simple_data_type(), Some("mvt"));

        let mut group = HostLayer::simple("g", "mvt");
        group.layer_type = "group".to_string();
        assert_eq!(group.simple_data_type(), None);
    }

    #[test]
    fn rect_end_parses_host_payload() {
        let raw = r#"{"startX":1,"startY":2,"x":5,"y":9,"pressedKey":"shift","isClick":false,
            "features":[{"layerId":"l","featureId":"f"}]}"#;
        let ev: RectEndEvent = serde_json::from_str(raw).expect("parse");
        assert_eq!(ev.drag.start_position(), [1.0, 2.0]);
        assert_eq!(ev.drag.position(), [5.0, 9.0]);
        assert_eq!(ev.drag.pressed_key.as_deref(), Some("shift"));
        assert_eq!(ev.features.map(|f| f.len()), Some(1));
    }

    #[test]
    fn event_names_match_host_api() {
        let names: Vec<_> = HostEventKind::ALL.iter().map(|k| k.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "select",
                "click",
                "layerSelectWithRectMove",
                "layerSelectWithRectEnd"
            ]
        );
    }
}
