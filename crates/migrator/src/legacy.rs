//! VIEW2.0 documents, read-only inputs of a migration run.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A literal as stored in legacy conditions.
///
/// Operands and values hold JS source text (`"${attributes[\"x\"]}"`,
/// `"\"1\""`) or raw booleans used as "always" markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl Literal {
    /// `true` or the string `"true"`.
    pub fn is_true(&self) -> bool {
        match self {
            Literal::Bool(b) => *b,
            Literal::Text(s) => s == "true",
            Literal::Number(_) => false,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Number(n) => write!(f, "{n}"),
            Literal::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::Text(s.to_string())
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub operand: Literal,
    pub operator: String,
    pub value: Literal,
}

impl Condition {
    pub fn new(operand: impl Into<Literal>, operator: &str, value: impl Into<Literal>) -> Self {
        Self {
            key: None,
            operand: operand.into(),
            operator: operator.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorItem {
    pub color: String,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitledCondition {
    pub condition: Condition,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendItem {
    pub color: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrokeItem {
    #[serde(default)]
    pub stroke_color: Option<String>,
    #[serde(default)]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// JSON-encoded array of `{title, description, camera}`.
    #[serde(default)]
    pub scenes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchGroupItem {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "fieldGroupID")]
    pub field_group_id: String,
    pub title: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CameraPosition {
    pub lng: f64,
    pub lat: f64,
    pub height: f64,
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// Type-specific payload of a legacy component, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum LegacyField {
    Description {
        #[serde(default)]
        content: Option<String>,
    },
    StyleCode {
        #[serde(default)]
        src: Option<String>,
    },
    ButtonLink {
        #[serde(default)]
        link: Option<String>,
        #[serde(default)]
        title: Option<String>,
    },
    Story {
        #[serde(default)]
        stories: Option<Vec<StoryItem>>,
    },
    CurrentTime {
        #[serde(default)]
        start_date: Option<String>,
        #[serde(default)]
        start_time: Option<String>,
        #[serde(default)]
        stop_date: Option<String>,
        #[serde(default)]
        stop_time: Option<String>,
        #[serde(default)]
        current_date: Option<String>,
        #[serde(default)]
        current_time: Option<String>,
    },
    SwitchVisibility {
        #[serde(default)]
        conditions: Vec<TitledCondition>,
    },
    HeightReference {
        #[serde(default)]
        height_reference_type: Option<String>,
    },
    Timeline {
        #[serde(default)]
        time_field_name: Option<String>,
    },

    PointColor {
        #[serde(default)]
        point_colors: Option<Vec<ColorItem>>,
    },
    PointColorGradient {
        #[serde(default)]
        field: Option<String>,
        #[serde(default)]
        min: Option<f64>,
        #[serde(default)]
        max: Option<f64>,
    },
    PointSize {
        #[serde(default)]
        point_size: Option<f64>,
    },
    PointIcon {
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        size: Option<f64>,
        #[serde(default)]
        size_in_meters: Option<bool>,
    },
    PointLabel {
        #[serde(default)]
        field: Option<String>,
        #[serde(default)]
        font_size: Option<f64>,
        #[serde(default)]
        font_color: Option<String>,
        #[serde(default)]
        height: Option<f64>,
        #[serde(default)]
        extruded: Option<bool>,
        #[serde(default)]
        use_background: Option<bool>,
        #[serde(default)]
        background_color: Option<String>,
    },
    PointModel {
        #[serde(default, rename = "modelURL")]
        model_url: Option<String>,
        #[serde(default)]
        scale: Option<f64>,
    },
    PointStroke {
        #[serde(default)]
        items: Option<Vec<StrokeItem>>,
    },
    #[serde(rename = "pointCSV")]
    PointCsv {
        #[serde(default)]
        lng: Option<String>,
        #[serde(default)]
        lat: Option<String>,
        #[serde(default)]
        height: Option<String>,
    },

    PolylineColor {
        #[serde(default)]
        items: Option<Vec<ColorItem>>,
    },
    PolylineStrokeWeight {
        #[serde(default)]
        stroke_width: Option<f64>,
    },
    PolylineClassificationType {
        #[serde(default)]
        classification_type: Option<String>,
    },

    PolygonColor {
        #[serde(default)]
        items: Option<Vec<ColorItem>>,
    },
    PolygonStroke {
        #[serde(default)]
        items: Option<Vec<StrokeItem>>,
    },
    PolygonClassificationType {
        #[serde(default)]
        classification_type: Option<String>,
    },

    Clipping,
    BuildingFilter,
    BuildingTransparency,
    BuildingColor,
    FloodColor,
    FloodFilter,

    // Not converted into field components.
    Legend {
        #[serde(default)]
        style: Option<String>,
        #[serde(default)]
        items: Vec<LegendItem>,
    },
    LegendGradient,
    InfoboxStyle,
    SwitchDataset,
    SwitchGroup {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        groups: Vec<SwitchGroupItem>,
    },
    Template {
        #[serde(default, rename = "templateID")]
        template_id: Option<String>,
    },
    BuildingShadow,
    PolylineColorGradient,
    PolygonColorGradient,

    // Folded into `Setting::general`.
    IdealZoom {
        #[serde(default)]
        position: Option<CameraPosition>,
    },
    EventField {
        #[serde(default)]
        event_type: Option<String>,
        #[serde(default)]
        trigger_event: Option<String>,
        #[serde(default)]
        url_type: Option<String>,
        #[serde(default)]
        url: Option<String>,
        #[serde(default)]
        field: Option<String>,
    },
    Realtime {
        #[serde(default)]
        enabled: Option<bool>,
        #[serde(default)]
        update_interval: Option<f64>,
    },
}

/// How the migration treats a legacy type.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FieldClass {
    /// Has a field-component counterpart.
    Convertible,
    /// Structural or display-only; consumed by other stages or dropped.
    Excluded,
    /// Becomes part of the setting's `general` block.
    General,
}

impl LegacyField {
    /// The legacy `type` discriminant.
    pub fn type_name(&self) -> &'static str {
        match self {
            LegacyField::Description { .. } => "description",
            LegacyField::StyleCode { .. } => "styleCode",
            LegacyField::ButtonLink { .. } => "buttonLink",
            LegacyField::Story { .. } => "story",
            LegacyField::CurrentTime { .. } => "currentTime",
            LegacyField::SwitchVisibility { .. } => "switchVisibility",
            LegacyField::HeightReference { .. } => "heightReference",
            LegacyField::Timeline { .. } => "timeline",
            LegacyField::PointColor { .. } => "pointColor",
            LegacyField::PointColorGradient { .. } => "pointColorGradient",
            LegacyField::PointSize { .. } => "pointSize",
            LegacyField::PointIcon { .. } => "pointIcon",
            LegacyField::PointLabel { .. } => "pointLabel",
            LegacyField::PointModel { .. } => "pointModel",
            LegacyField::PointStroke { .. } => "pointStroke",
            LegacyField::PointCsv { .. } => "pointCSV",
            LegacyField::PolylineColor { .. } => "polylineColor",
            LegacyField::PolylineStrokeWeight { .. } => "polylineStrokeWeight",
            LegacyField::PolylineClassificationType { .. } => "polylineClassificationType",
            LegacyField::PolygonColor { .. } => "polygonColor",
            LegacyField::PolygonStroke { .. } => "polygonStroke",
            LegacyField::PolygonClassificationType { .. } => "polygonClassificationType",
            LegacyField::Clipping => "clipping",
            LegacyField::BuildingFilter => "buildingFilter",
            LegacyField::BuildingTransparency => "buildingTransparency",
            LegacyField::BuildingColor => "buildingColor",
            LegacyField::FloodColor => "floodColor",
            LegacyField::FloodFilter => "floodFilter",
            LegacyField::Legend { .. } => "legend",
            LegacyField::LegendGradient => "legendGradient",
            LegacyField::InfoboxStyle => "infoboxStyle",
            LegacyField::SwitchDataset => "switchDataset",
            LegacyField::SwitchGroup { .. } => "switchGroup",
            LegacyField::Template { .. } => "template",
            LegacyField::BuildingShadow => "buildingShadow",
            LegacyField::PolylineColorGradient => "polylineColorGradient",
            LegacyField::PolygonColorGradient => "polygonColorGradient",
            LegacyField::IdealZoom { .. } => "idealZoom",
            LegacyField::EventField { .. } => "eventField",
            LegacyField::Realtime { .. } => "realtime",
        }
    }

    pub fn class(&self) -> FieldClass {
        match self {
            LegacyField::Legend { .. }
            | LegacyField::LegendGradient
            | LegacyField::InfoboxStyle
            | LegacyField::SwitchDataset
            | LegacyField::SwitchGroup { .. }
            | LegacyField::Template { .. }
            | LegacyField::BuildingShadow
            | LegacyField::PolylineColorGradient
            | LegacyField::PolygonColorGradient => FieldClass::Excluded,
            LegacyField::IdealZoom { .. }
            | LegacyField::EventField { .. }
            | LegacyField::Realtime { .. } => FieldClass::General,
            _ => FieldClass::Convertible,
        }
    }
}

/// One entry of a legacy `components` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyComponent {
    #[serde(default)]
    pub id: String,
    /// `fieldGroupID` of the switch-group variant owning this component;
    /// untagged components are shared by every variant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(flatten)]
    pub field: LegacyField,
}

impl LegacyComponent {
    pub fn new(field: LegacyField) -> Self {
        Self {
            id: String::new(),
            group: None,
            field,
        }
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// A legacy data binding: display settings for one catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyData {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "dataID")]
    pub data_id: String,
    #[serde(default)]
    pub components: Vec<LegacyComponent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyTemplate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub components: Vec<LegacyComponent>,
}

/// Legacy data catalog entry; only the identifiers matter to the migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}
