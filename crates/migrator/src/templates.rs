//! Legacy named templates to component templates.

use std::collections::HashSet;

use foundation::IdSource;
use tracing::debug;

use crate::error::MigrateError;
use crate::fields::{ConvertOptions, FeatureType};
use crate::groups::convert_component_groups;
use crate::legacy::LegacyTemplate;
use crate::schema::{Template, TemplateRef, TemplateType};

/// Geometry implied by well-known legacy template names.
pub fn feature_type_for_template(name: &str) -> Option<FeatureType> {
    match name {
        "ランドマーク情報" | "鉄道駅情報" | "避難施設情報" => Some(FeatureType::Marker),
        "緊急輸送道路情報" | "鉄道情報" => Some(FeatureType::Polyline),
        "公園情報" | "行政界情報" => Some(FeatureType::Polygon),
        _ => None,
    }
}

/// A template from an earlier run that `legacy` was migrated into.
///
/// A stamped source id wins over a name match. Only unstamped templates
/// match by name, since a stamped one belongs to its own legacy template.
pub fn find_existing_template<'a>(
    legacy: &LegacyTemplate,
    existing: &'a [TemplateRef],
) -> Option<&'a TemplateRef> {
    existing
        .iter()
        .find(|t| t.source_id.as_deref() == Some(legacy.id.as_str()))
        .or_else(|| {
            existing
                .iter()
                .find(|t| t.source_id.is_none() && t.name == legacy.name)
        })
}

/// Id for `legacy`: the matching earlier-run id unless this run already
/// handed it out, otherwise a fresh one. The flag tells whether it was reused.
fn claim_template_id(
    legacy: &LegacyTemplate,
    existing: &[TemplateRef],
    claimed: &HashSet<String>,
    ids: &dyn IdSource,
) -> (String, bool) {
    match find_existing_template(legacy, existing) {
        Some(found) if !claimed.contains(&found.id) => {
            debug!(template = %legacy.name, id = %found.id, "reusing template id");
            (found.id.clone(), true)
        }
        Some(found) => {
            debug!(template = %legacy.name, id = %found.id, "template id already taken");
            (ids.generate(), false)
        }
        None => (ids.generate(), false),
    }
}

pub fn convert_template(
    legacy: &LegacyTemplate,
    existing: &[TemplateRef],
    ids: &dyn IdSource,
) -> Result<Template, MigrateError> {
    let (id, _) = claim_template_id(legacy, existing, &HashSet::new(), ids);
    build_template(legacy, id, ids)
}

fn build_template(
    legacy: &LegacyTemplate,
    id: String,
    ids: &dyn IdSource,
) -> Result<Template, MigrateError> {
    let options = ConvertOptions {
        feature_type: feature_type_for_template(&legacy.name),
    };
    Ok(Template {
        id,
        kind: TemplateType::Component,
        name: legacy.name.clone(),
        groups: convert_component_groups(&legacy.components, &options, ids)?,
        source_id: Some(legacy.id.clone()),
    })
}

#[derive(Debug, Default)]
pub struct ConvertedTemplates {
    pub templates: Vec<Template>,
    /// How many kept an id from an earlier run.
    pub reused: usize,
}

impl ConvertedTemplates {
    /// Id of the template migrated from the legacy template `source_id`.
    pub fn id_for(&self, source_id: &str) -> Option<&str> {
        self.templates
            .iter()
            .find(|t| t.source_id.as_deref() == Some(source_id))
            .map(|t| t.id.as_str())
    }
}

pub fn convert_templates(
    legacy: &[LegacyTemplate],
    existing: &[TemplateRef],
    ids: &dyn IdSource,
) -> Result<ConvertedTemplates, MigrateError> {
    let mut out = ConvertedTemplates::default();
    let mut claimed = HashSet::new();
    for template in legacy {
        let (id, reused) = claim_template_id(template, existing, &claimed, ids);
        if reused {
            out.reused += 1;
        }
        claimed.insert(id.clone());
        out.templates.push(build_template(template, id, ids)?);
    }
    Ok(out)
}
