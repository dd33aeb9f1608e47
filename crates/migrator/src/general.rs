//! Folds the legacy camera, click and realtime components into a setting's
//! `general` block.

use crate::legacy::{CameraPosition, LegacyComponent, LegacyField};
use crate::schema::{Camera, DataFetching, FeatureClickEvent, General};

/// Field of view given to migrated cameras, in radians.
pub const DEFAULT_FOV: f64 = 1.04;

impl From<CameraPosition> for Camera {
    fn from(p: CameraPosition) -> Self {
        Camera {
            lat: p.lat,
            lng: p.lng,
            height: p.height,
            heading: p.heading,
            pitch: p.pitch,
            roll: p.roll,
            fov: DEFAULT_FOV,
        }
    }
}

fn click_event_type(trigger_event: Option<&str>) -> &'static str {
    match trigger_event {
        Some("openUrl") => "jumpToTheLink",
        _ => "openFeatureInspector",
    }
}

/// Builds the `general` block; later components of the same type win.
pub fn convert_general(components: &[LegacyComponent]) -> General {
    let mut general = General::default();
    for component in components {
        match &component.field {
            LegacyField::IdealZoom { position } => {
                general.camera = position.map(Camera::from);
            }
            LegacyField::EventField {
                trigger_event,
                url_type,
                url,
                field,
                ..
            } => {
                general.feature_click_event = Some(FeatureClickEvent {
                    event_type: Some(click_event_type(trigger_event.as_deref()).to_string()),
                    url_type: url_type.clone(),
                    website_url: url.clone(),
                    field_name: field.clone(),
                });
            }
            LegacyField::Realtime {
                enabled,
                update_interval,
            } => {
                general.data_fetching = Some(DataFetching {
                    enabled: *enabled,
                    time_interval: *update_interval,
                });
            }
            _ => {}
        }
    }
    general
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn camera_gets_default_fov() {
        let components = vec![LegacyComponent::new(LegacyField::IdealZoom {
            position: Some(CameraPosition {
                lng: 139.7,
                lat: 35.6,
                height: 1200.0,
                heading: 0.0,
                pitch: -0.5,
                roll: 0.0,
            }),
        })];
        let general = convert_general(&components);
        let camera = general.camera.expect("camera");
        assert_eq!(camera.fov, DEFAULT_FOV);
        assert_eq!(camera.lat, 35.6);
        assert!(general.feature_click_event.is_none());
    }

    #[test]
    fn click_and_realtime_are_mapped() {
        let components = vec![
            LegacyComponent::new(LegacyField::EventField {
                event_type: Some("select".into()),
                trigger_event: Some("openUrl".into()),
                url_type: Some("manual".into()),
                url: Some("https://example.com".into()),
                field: None,
            }),
            LegacyComponent::new(LegacyField::Realtime {
                enabled: Some(true),
                update_interval: Some(30.0),
            }),
        ];
        let general = convert_general(&components);
        assert_eq!(
            serde_json::to_value(&general).expect("serialize"),
            serde_json::json!({
                "featureClickEvent": {
                    "eventType": "jumpToTheLink",
                    "urlType": "manual",
                    "websiteURL": "https://example.com"
                },
                "dataFetching": {"enabled": true, "timeInterval": 30.0}
            })
        );
    }

    #[test]
    fn other_triggers_open_the_inspector() {
        assert_eq!(click_event_type(None), "openFeatureInspector");
        assert_eq!(
            click_event_type(Some("openFeatureInspector")),
            "openFeatureInspector"
        );
    }

    #[test]
    fn non_general_components_leave_defaults() {
        let components = vec![LegacyComponent::new(LegacyField::Clipping)];
        assert_eq!(convert_general(&components), General::default());
    }
}
