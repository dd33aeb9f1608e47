//! Per-type conversion of legacy components into field components.

use foundation::IdSource;
use serde::Deserialize;
use tracing::trace;

use crate::error::MigrateError;
use crate::legacy::{ColorItem, FieldClass, LegacyComponent, LegacyField, StoryItem};
use crate::rules::{
    build_color_rules, build_visibility_rules, check_is_single_value, color_value_preset,
};
use crate::schema::{Component, ComponentType, GradientRule, Preset, StoryPage};

/// Geometry class a geometry-agnostic component is converted for.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FeatureType {
    Marker,
    Polyline,
    Polygon,
}

#[derive(Debug, Copy, Clone, Default)]
pub struct ConvertOptions {
    /// Restricts geometry-agnostic components to one geometry; `None`
    /// converts them for all three.
    pub feature_type: Option<FeatureType>,
}

impl ConvertOptions {
    pub fn for_feature(feature_type: FeatureType) -> Self {
        Self {
            feature_type: Some(feature_type),
        }
    }
}

/// A converted component before it is given an id.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDraft {
    pub kind: ComponentType,
    pub preset: Option<Preset>,
}

impl ComponentDraft {
    fn new(kind: ComponentType, preset: Preset) -> Self {
        Self {
            kind,
            preset: Some(preset),
        }
    }

    fn bare(kind: ComponentType) -> Self {
        Self { kind, preset: None }
    }
}

/// Component types of a geometry-agnostic field, in marker, polyline,
/// polygon order.
struct PerGeometry([ComponentType; 3]);

const VISIBILITY_FILTER: PerGeometry = PerGeometry([
    ComponentType::PointVisibilityFilterField,
    ComponentType::PolylineVisibilityFilterField,
    ComponentType::PolygonVisibilityFilterField,
]);

const HEIGHT_REFERENCE: PerGeometry = PerGeometry([
    ComponentType::PointHeightReferenceField,
    ComponentType::PolylineHeightReferenceField,
    ComponentType::PolygonHeightReferenceField,
]);

impl PerGeometry {
    fn drafts(&self, options: &ConvertOptions, preset: Preset) -> Vec<ComponentDraft> {
        let [point, polyline, polygon] = self.0;
        match options.feature_type {
            Some(FeatureType::Marker) => vec![ComponentDraft::new(point, preset)],
            Some(FeatureType::Polyline) => vec![ComponentDraft::new(polyline, preset)],
            Some(FeatureType::Polygon) => vec![ComponentDraft::new(polygon, preset)],
            None => [point, polyline, polygon]
                .into_iter()
                .map(|kind| ComponentDraft::new(kind, preset.clone()))
                .collect(),
        }
    }
}

/// Value and condition component types of a colour field.
struct ColorKinds {
    value: ComponentType,
    condition: ComponentType,
}

const POINT_COLOR: ColorKinds = ColorKinds {
    value: ComponentType::PointFillColorValueField,
    condition: ComponentType::PointFillColorConditionField,
};

const POLYLINE_COLOR: ColorKinds = ColorKinds {
    value: ComponentType::PolylineFillColorValueField,
    condition: ComponentType::PolylineFillColorConditionField,
};

const POLYGON_COLOR: ColorKinds = ColorKinds {
    value: ComponentType::PolygonFillColorValueField,
    condition: ComponentType::PolygonFillColorConditionField,
};

fn color_field(
    kinds: &ColorKinds,
    items: Option<&[ColorItem]>,
    siblings: &[LegacyComponent],
    ids: &dyn IdSource,
) -> ComponentDraft {
    let items = items.unwrap_or_default();
    if let [only] = items
        && check_is_single_value(&only.condition)
    {
        return ComponentDraft::new(kinds.value, color_value_preset(siblings, &only.color));
    }
    ComponentDraft::new(
        kinds.condition,
        Preset::Rules {
            rules: build_color_rules(items, siblings, ids),
        },
    )
}

/// Joins the date and time halves of a legacy timestamp.
pub fn format_date_time(date: Option<&str>, time: Option<&str>) -> Option<String> {
    let date = date.filter(|d| !d.is_empty());
    let time = time.filter(|t| !t.is_empty());
    match (date, time) {
        (Some(d), Some(t)) => Some(format!("{d} {t}")),
        (Some(part), None) | (None, Some(part)) => Some(part.to_string()),
        (None, None) => None,
    }
}

#[derive(Deserialize)]
struct Scene {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    camera: serde_json::Value,
}

fn story_pages(stories: &[StoryItem], ids: &dyn IdSource) -> Result<Vec<StoryPage>, MigrateError> {
    let mut pages = Vec::new();
    for story in stories {
        let scenes = match story.scenes.as_deref() {
            Some(raw) if !raw.is_empty() => {
                serde_json::from_str::<Vec<Scene>>(raw).map_err(MigrateError::InvalidStory)?
            }
            _ => Vec::new(),
        };
        pages.extend(scenes.into_iter().map(|scene| StoryPage {
            id: ids.generate(),
            title: scene.title,
            camera: scene.camera,
            content: scene.description,
        }));
    }
    Ok(pages)
}

/// Converts one legacy field into zero or more component drafts.
///
/// `siblings` is the component list the field was read from; colour fields
/// resolve legend titles against it. Excluded and general types produce no
/// drafts.
pub fn convert_field(
    field: &LegacyField,
    siblings: &[LegacyComponent],
    options: &ConvertOptions,
    ids: &dyn IdSource,
) -> Result<Vec<ComponentDraft>, MigrateError> {
    use ComponentType as T;

    let drafts = match field {
        LegacyField::Description { content } => vec![ComponentDraft::new(
            T::LayerDescriptionField,
            Preset::Description {
                description: content.clone(),
            },
        )],
        LegacyField::StyleCode { src } => vec![ComponentDraft::new(
            T::StyleCodeField,
            Preset::StyleCode { code: src.clone() },
        )],
        LegacyField::ButtonLink { link, title } => vec![ComponentDraft::new(
            T::LinkButtonField,
            Preset::LinkButton {
                url: link.clone().unwrap_or_default(),
                title: title.clone().unwrap_or_default(),
            },
        )],
        LegacyField::Story { stories } => vec![ComponentDraft::new(
            T::DatasetStoryField,
            Preset::Story {
                pages: story_pages(stories.as_deref().unwrap_or_default(), ids)?,
            },
        )],
        LegacyField::CurrentTime {
            start_date,
            start_time,
            stop_date,
            stop_time,
            current_date,
            current_time,
        } => vec![ComponentDraft::new(
            T::TimelineCustomizedField,
            Preset::Timeline {
                start: format_date_time(start_date.as_deref(), start_time.as_deref()),
                end: format_date_time(stop_date.as_deref(), stop_time.as_deref()),
                current: format_date_time(current_date.as_deref(), current_time.as_deref()),
                timezone: "+9".to_string(),
            },
        )],
        LegacyField::SwitchVisibility { conditions } => {
            let rules = build_visibility_rules(conditions, ids)?;
            VISIBILITY_FILTER.drafts(options, Preset::Rules { rules })
        }
        LegacyField::HeightReference {
            height_reference_type,
        } => HEIGHT_REFERENCE.drafts(
            options,
            Preset::Text {
                default_value: height_reference_type.clone(),
            },
        ),
        LegacyField::Timeline { time_field_name } => vec![ComponentDraft::new(
            T::ApplyTimeValueField,
            Preset::PropertyName {
                property_name: time_field_name.clone(),
            },
        )],

        LegacyField::PointColor { point_colors } => {
            vec![color_field(&POINT_COLOR, point_colors.as_deref(), siblings, ids)]
        }
        LegacyField::PointColorGradient { field, min, max } => vec![ComponentDraft::new(
            T::PointFillColorGradientField,
            Preset::GradientRules {
                rules: vec![GradientRule {
                    id: ids.generate(),
                    property_name: field.clone(),
                    max: *max,
                    min: *min,
                    color_map_name: "Plateau".to_string(),
                }],
            },
        )],
        LegacyField::PointSize { point_size } => vec![ComponentDraft::new(
            T::PointSizeField,
            Preset::Number {
                default_value: *point_size,
            },
        )],
        LegacyField::PointIcon {
            url,
            size,
            size_in_meters,
        } => vec![
            ComponentDraft::new(
                T::PointUseImageValueField,
                Preset::ImageValue {
                    image_url: url.clone(),
                },
            ),
            ComponentDraft::new(
                T::PointImageSizeField,
                Preset::ImageSize {
                    default_value: *size,
                    enable_size_in_meters: *size_in_meters,
                },
            ),
        ],
        LegacyField::PointLabel {
            field,
            font_size,
            font_color,
            height,
            extruded,
            use_background,
            background_color,
        } => vec![ComponentDraft::new(
            T::PointUseLabelField,
            Preset::Label {
                text_expression: field.clone(),
                font_size: *font_size,
                font_color: font_color.clone(),
                height: *height,
                extruded: *extruded,
                background: *use_background,
                background_color: background_color.clone(),
            },
        )],
        LegacyField::PointModel { model_url, scale } => vec![ComponentDraft::new(
            T::PointUse3dModel,
            Preset::Model {
                url: model_url.clone(),
                size: *scale,
            },
        )],
        LegacyField::PointStroke { items } => {
            // Only the first stroke item is honoured.
            let stroke = items.as_deref().and_then(|items| items.first());
            vec![ComponentDraft::new(
                T::PointStrokeField,
                Preset::Stroke {
                    color: stroke.and_then(|s| s.stroke_color.clone()),
                    width: stroke.and_then(|s| s.stroke_width),
                },
            )]
        }
        LegacyField::PointCsv { lng, lat, height } => vec![ComponentDraft::new(
            T::PointConvertFromCsv,
            Preset::Csv {
                lng_column: lng.clone(),
                lat_column: lat.clone(),
                height_column: height.clone(),
            },
        )],

        LegacyField::PolylineColor { items } => {
            vec![color_field(&POLYLINE_COLOR, items.as_deref(), siblings, ids)]
        }
        LegacyField::PolylineStrokeWeight { stroke_width } => vec![ComponentDraft::new(
            T::PolylineStrokeWeightField,
            Preset::Number {
                default_value: *stroke_width,
            },
        )],
        LegacyField::PolylineClassificationType {
            classification_type,
        } => vec![ComponentDraft::new(
            T::PolylineClassificationTypeField,
            Preset::Text {
                default_value: classification_type.clone(),
            },
        )],

        LegacyField::PolygonColor { items } => {
            vec![color_field(&POLYGON_COLOR, items.as_deref(), siblings, ids)]
        }
        LegacyField::PolygonStroke { items } => {
            let stroke = items.as_deref().and_then(|items| items.first());
            vec![
                ComponentDraft::new(
                    T::PolygonStrokeWeightField,
                    Preset::Number {
                        default_value: stroke.and_then(|s| s.stroke_width),
                    },
                ),
                ComponentDraft::new(
                    T::PolygonStrokeColorField,
                    Preset::Text {
                        default_value: stroke.and_then(|s| s.stroke_color.clone()),
                    },
                ),
            ]
        }
        LegacyField::PolygonClassificationType {
            classification_type,
        } => vec![ComponentDraft::new(
            T::PolygonClassificationTypeField,
            Preset::Text {
                default_value: classification_type.clone(),
            },
        )],

        LegacyField::Clipping => vec![ComponentDraft::bare(T::TilesetClipping)],
        LegacyField::BuildingFilter => vec![ComponentDraft::bare(T::TilesetBuildingModelFilter)],
        LegacyField::BuildingTransparency => vec![ComponentDraft::bare(T::OpacityField)],
        LegacyField::BuildingColor => vec![ComponentDraft::bare(T::TilesetBuildingModelColor)],
        LegacyField::FloodColor => vec![ComponentDraft::bare(T::TilesetFloodModelColor)],
        LegacyField::FloodFilter => vec![ComponentDraft::bare(T::TilesetFloodModelFilter)],

        LegacyField::Legend { .. }
        | LegacyField::LegendGradient
        | LegacyField::InfoboxStyle
        | LegacyField::SwitchDataset
        | LegacyField::SwitchGroup { .. }
        | LegacyField::Template { .. }
        | LegacyField::BuildingShadow
        | LegacyField::PolylineColorGradient
        | LegacyField::PolygonColorGradient
        | LegacyField::IdealZoom { .. }
        | LegacyField::EventField { .. }
        | LegacyField::Realtime { .. } => Vec::new(),
    };
    Ok(drafts)
}

/// Converts one legacy component and assigns ids to every resulting
/// component.
pub fn convert_component(
    component: &LegacyComponent,
    siblings: &[LegacyComponent],
    options: &ConvertOptions,
    ids: &dyn IdSource,
) -> Result<Vec<Component>, MigrateError> {
    let drafts = convert_field(&component.field, siblings, options, ids)?;
    trace!(
        legacy_type = component.field.type_name(),
        produced = drafts.len(),
        "converted component"
    );
    Ok(drafts
        .into_iter()
        .map(|draft| Component {
            id: ids.generate(),
            kind: draft.kind,
            preset: draft.preset,
        })
        .collect())
}

/// Converts every convertible component of `components`, in order.
pub fn convert_components(
    components: &[LegacyComponent],
    siblings: &[LegacyComponent],
    options: &ConvertOptions,
    ids: &dyn IdSource,
) -> Result<Vec<Component>, MigrateError> {
    let mut out = Vec::new();
    for component in components
        .iter()
        .filter(|c| c.field.class() == FieldClass::Convertible)
    {
        out.extend(convert_component(component, siblings, options, ids)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legacy::{Condition, LegendItem, StrokeItem, TitledCondition};
    use foundation::{FixedIds, SequentialIds};
    use pretty_assertions::assert_eq;

    fn ids() -> FixedIds {
        FixedIds::new("123")
    }

    fn kinds(components: &[Component]) -> Vec<ComponentType> {
        components.iter().map(|c| c.kind).collect()
    }

    fn convert(field: LegacyField) -> Vec<Component> {
        convert_component(
            &LegacyComponent::new(field),
            &[],
            &ConvertOptions::default(),
            &ids(),
        )
        .expect("convert")
    }

    fn visibility(n: usize) -> LegacyField {
        LegacyField::SwitchVisibility {
            conditions: (0..n)
                .map(|i| TitledCondition {
                    condition: Condition::new("${kind}", "===", format!("\"{i}\"").as_str()),
                    title: format!("t{i}"),
                })
                .collect(),
        }
    }

    #[test]
    fn single_true_condition_collapses_to_value_field() {
        let legend = LegacyComponent::new(LegacyField::Legend {
            style: None,
            items: vec![LegendItem {
                color: "#FF0000".into(),
                title: "red".into(),
                url: None,
            }],
        });
        let color = LegacyComponent::new(LegacyField::PolygonColor {
            items: Some(vec![ColorItem {
                color: "#FF0000FF".into(),
                condition: Condition::new(true, "===", true),
            }]),
        });
        let siblings = vec![legend, color.clone()];
        let out = convert_component(&color, &siblings, &ConvertOptions::default(), &ids())
            .expect("convert");
        assert_eq!(
            out,
            vec![Component {
                id: "123".into(),
                kind: ComponentType::PolygonFillColorValueField,
                preset: Some(Preset::ColorValue {
                    default_value: "#FF0000FF".into(),
                    as_legend: true,
                    legend_name: Some("red".into()),
                }),
            }]
        );
        assert!(out[0].preset.as_ref().and_then(Preset::rules).is_none());
    }

    #[test]
    fn branching_color_keeps_condition_field() {
        let out = convert(LegacyField::PointColor {
            point_colors: Some(vec![
                ColorItem {
                    color: "#FFFFFF".into(),
                    condition: Condition::new(true, "===", true),
                },
                ColorItem {
                    color: "#000000".into(),
                    condition: Condition::new("${a}", "===", "\"1\""),
                },
            ]),
        });
        assert_eq!(kinds(&out), vec![ComponentType::PointFillColorConditionField]);
        let rules = out[0].preset.as_ref().and_then(Preset::rules).expect("rules");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].conditions.len(), 2);
    }

    #[test]
    fn missing_color_items_give_empty_rules() {
        let out = convert(LegacyField::PolylineColor { items: None });
        assert_eq!(kinds(&out), vec![ComponentType::PolylineFillColorConditionField]);
        assert_eq!(out[0].preset.as_ref().and_then(Preset::rules), Some(&[][..]));
    }

    #[test]
    fn visibility_fans_out_to_every_geometry() {
        let out = convert(visibility(2));
        assert_eq!(
            kinds(&out),
            vec![
                ComponentType::PointVisibilityFilterField,
                ComponentType::PolylineVisibilityFilterField,
                ComponentType::PolygonVisibilityFilterField,
            ]
        );
        assert_eq!(out[0].preset, out[1].preset);
        assert_eq!(out[1].preset, out[2].preset);
    }

    #[test]
    fn feature_type_selects_one_geometry() {
        let out = convert_component(
            &LegacyComponent::new(LegacyField::HeightReference {
                height_reference_type: Some("clamp".into()),
            }),
            &[],
            &ConvertOptions::for_feature(FeatureType::Polyline),
            &ids(),
        )
        .expect("convert");
        assert_eq!(kinds(&out), vec![ComponentType::PolylineHeightReferenceField]);
        assert_eq!(
            out[0].preset,
            Some(Preset::Text {
                default_value: Some("clamp".into())
            })
        );
    }

    #[test]
    fn visibility_arity_is_enforced() {
        let one = LegacyComponent::new(visibility(1));
        let err = convert_component(&one, &[], &ConvertOptions::default(), &ids())
            .expect_err("one condition");
        assert!(matches!(
            err,
            MigrateError::InvalidComponent {
                kind: "switchVisibility",
                ..
            }
        ));
        let three = LegacyComponent::new(visibility(3));
        assert!(convert_component(&three, &[], &ConvertOptions::default(), &ids()).is_ok());
    }

    #[test]
    fn icon_and_polygon_stroke_split_into_two() {
        let icon = convert(LegacyField::PointIcon {
            url: Some("https://example.com/pin.png".into()),
            size: Some(1.5),
            size_in_meters: Some(false),
        });
        assert_eq!(
            kinds(&icon),
            vec![
                ComponentType::PointUseImageValueField,
                ComponentType::PointImageSizeField
            ]
        );

        let stroke = convert(LegacyField::PolygonStroke {
            items: Some(vec![
                StrokeItem {
                    stroke_color: Some("#111111".into()),
                    stroke_width: Some(2.0),
                    condition: None,
                },
                StrokeItem {
                    stroke_color: Some("#222222".into()),
                    stroke_width: Some(9.0),
                    condition: None,
                },
            ]),
        });
        assert_eq!(
            stroke.iter().map(|c| c.preset.clone()).collect::<Vec<_>>(),
            vec![
                Some(Preset::Number {
                    default_value: Some(2.0)
                }),
                Some(Preset::Text {
                    default_value: Some("#111111".into())
                }),
            ]
        );
    }

    #[test]
    fn excluded_and_general_types_produce_nothing() {
        for field in [
            LegacyField::LegendGradient,
            LegacyField::BuildingShadow,
            LegacyField::Template {
                template_id: Some("t".into()),
            },
            LegacyField::Realtime {
                enabled: Some(true),
                update_interval: Some(5.0),
            },
        ] {
            assert!(convert(field).is_empty());
        }
    }

    #[test]
    fn tileset_flags_have_no_preset() {
        let out = convert(LegacyField::BuildingTransparency);
        assert_eq!(
            out,
            vec![Component {
                id: "123".into(),
                kind: ComponentType::OpacityField,
                preset: None
            }]
        );
    }

    #[test]
    fn component_ids_are_assigned_after_flattening() {
        let seq = SequentialIds::new("c");
        let out = convert_component(
            &LegacyComponent::new(LegacyField::HeightReference {
                height_reference_type: None,
            }),
            &[],
            &ConvertOptions::default(),
            &seq,
        )
        .expect("convert");
        let got: Vec<_> = out.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(got, vec!["c1", "c2", "c3"]);
    }

    #[test]
    fn story_scenes_flatten_into_pages() {
        let out = convert(LegacyField::Story {
            stories: Some(vec![
                StoryItem {
                    id: None,
                    title: Some("tour".into()),
                    scenes: Some(
                        r#"[{"title":"A","description":"first","camera":{"lat":35.0}},
                            {"title":"B","description":"second"}]"#
                            .into(),
                    ),
                },
                StoryItem {
                    id: None,
                    title: None,
                    scenes: None,
                },
            ]),
        });
        let Some(Preset::Story { pages }) = &out[0].preset else {
            panic!("expected story preset");
        };
        let titles: Vec<_> = pages
            .iter()
            .map(|p| (p.title.as_str(), p.content.as_str()))
            .collect();
        assert_eq!(titles, vec![("A", "first"), ("B", "second")]);
        assert_eq!(pages[0].camera["lat"], 35.0);
    }

    #[test]
    fn malformed_story_is_an_error() {
        let story = LegacyComponent::new(LegacyField::Story {
            stories: Some(vec![StoryItem {
                id: None,
                title: None,
                scenes: Some("[{".into()),
            }]),
        });
        let err = convert_component(&story, &[], &ConvertOptions::default(), &ids())
            .expect_err("bad json");
        assert!(matches!(err, MigrateError::InvalidStory(_)));
    }

    #[test]
    fn date_and_time_join_with_a_space() {
        assert_eq!(
            format_date_time(Some("2023-01-01"), Some("09:00")).as_deref(),
            Some("2023-01-01 09:00")
        );
        assert_eq!(
            format_date_time(Some("2023-01-01"), None).as_deref(),
            Some("2023-01-01")
        );
        assert_eq!(format_date_time(None, Some("")), None);
        assert_eq!(format_date_time(None, None), None);
    }

    #[test]
    fn current_time_uses_japan_offset() {
        let out = convert(LegacyField::CurrentTime {
            start_date: Some("2023-01-01".into()),
            start_time: Some("00:00".into()),
            stop_date: None,
            stop_time: None,
            current_date: None,
            current_time: None,
        });
        assert_eq!(
            out[0].preset,
            Some(Preset::Timeline {
                start: Some("2023-01-01 00:00".into()),
                end: None,
                current: None,
                timezone: "+9".into(),
            })
        );
    }
}
