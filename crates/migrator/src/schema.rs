//! VIEW3.0 documents produced by the migration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentType {
    // general
    LayerDescriptionField,
    StyleCodeField,
    LinkButtonField,
    DatasetStoryField,
    TimelineCustomizedField,
    ApplyTimeValueField,
    OpacityField,
    // point
    PointFillColorValueField,
    PointFillColorConditionField,
    PointFillColorGradientField,
    PointSizeField,
    PointStrokeField,
    PointUseImageValueField,
    PointImageSizeField,
    PointUseLabelField,
    #[serde(rename = "POINT_USE_3D_MODEL")]
    PointUse3dModel,
    #[serde(rename = "POINT_CONVERT_FROM_CSV")]
    PointConvertFromCsv,
    PointVisibilityFilterField,
    PointHeightReferenceField,
    // polyline
    PolylineFillColorValueField,
    PolylineFillColorConditionField,
    PolylineStrokeWeightField,
    PolylineClassificationTypeField,
    PolylineVisibilityFilterField,
    PolylineHeightReferenceField,
    // polygon
    PolygonFillColorValueField,
    PolygonFillColorConditionField,
    PolygonStrokeWeightField,
    PolygonStrokeColorField,
    PolygonClassificationTypeField,
    PolygonVisibilityFilterField,
    PolygonHeightReferenceField,
    // 3d tiles
    TilesetClipping,
    TilesetBuildingModelFilter,
    TilesetBuildingModelColor,
    TilesetFloodModelColor,
    TilesetFloodModelFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCondition {
    pub id: String,
    pub operation: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub as_legend: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend_name: Option<String>,
}

/// Conditions on one source property, evaluated in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub property_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legend_name: Option<String>,
    pub conditions: Vec<RuleCondition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientRule {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    pub color_map_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryPage {
    pub id: String,
    pub title: String,
    pub camera: serde_json::Value,
    pub content: String,
}

/// Configuration carried by a component; the shape follows its type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum Preset {
    Description {
        #[serde(skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    StyleCode {
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },
    LinkButton {
        url: String,
        title: String,
    },
    Story {
        pages: Vec<StoryPage>,
    },
    Timeline {
        #[serde(skip_serializing_if = "Option::is_none")]
        start: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        end: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        current: Option<String>,
        timezone: String,
    },
    PropertyName {
        #[serde(skip_serializing_if = "Option::is_none")]
        property_name: Option<String>,
    },
    /// Conditional colour and visibility-filter rules.
    Rules {
        rules: Vec<Rule>,
    },
    GradientRules {
        rules: Vec<GradientRule>,
    },
    ColorValue {
        default_value: String,
        as_legend: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        legend_name: Option<String>,
    },
    Number {
        #[serde(skip_serializing_if = "Option::is_none")]
        default_value: Option<f64>,
    },
    Text {
        #[serde(skip_serializing_if = "Option::is_none")]
        default_value: Option<String>,
    },
    ImageValue {
        #[serde(rename = "imageURL", skip_serializing_if = "Option::is_none")]
        image_url: Option<String>,
    },
    ImageSize {
        #[serde(skip_serializing_if = "Option::is_none")]
        default_value: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        enable_size_in_meters: Option<bool>,
    },
    Label {
        #[serde(skip_serializing_if = "Option::is_none")]
        text_expression: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        font_size: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        font_color: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        height: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        extruded: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        background: Option<bool>,
        #[serde(skip_serializing_if = "Option::is_none")]
        background_color: Option<String>,
    },
    Model {
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        size: Option<f64>,
    },
    Stroke {
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        width: Option<f64>,
    },
    Csv {
        #[serde(skip_serializing_if = "Option::is_none")]
        lng_column: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        lat_column: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        height_column: Option<String>,
    },
}

impl Preset {
    /// Rules of a conditional preset.
    pub fn rules(&self) -> Option<&[Rule]> {
        match self {
            Preset::Rules { rules } => Some(rules),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ComponentType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<Preset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentGroup {
    pub id: String,
    pub name: String,
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub lat: f64,
    pub lng: f64,
    pub height: f64,
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
    pub fov: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureClickEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_type: Option<String>,
    #[serde(default, rename = "websiteURL", skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataFetching {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_interval: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct General {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<Camera>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_click_event: Option<FeatureClickEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_fetching: Option<DataFetching>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldComponents {
    pub use_template: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    pub groups: Vec<ComponentGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: String,
    pub dataset_id: String,
    pub data_id: String,
    pub general: General,
    pub field_components: FieldComponents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    Component,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: TemplateType,
    pub name: String,
    pub groups: Vec<ComponentGroup>,
    /// Id of the legacy template this one was migrated from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}

/// Identity of a setting from an earlier run; the rest is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingRef {
    pub id: String,
    pub dataset_id: String,
    pub data_id: String,
}

/// Identity of a template from an earlier run; the rest is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub source_id: Option<String>,
}
