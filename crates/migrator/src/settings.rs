//! Legacy data bindings to per-dataset settings.

use foundation::IdSource;
use tracing::{debug, warn};

use crate::error::MigrateError;
use crate::fields::ConvertOptions;
use crate::general::convert_general;
use crate::groups::convert_component_groups;
use crate::legacy::{CatalogItem, LegacyData, LegacyField};
use crate::schema::{FieldComponents, Setting, SettingRef, TemplateRef};
use crate::templates::ConvertedTemplates;

/// Dataset id of a binding, or `None` when a catalog is given and has no
/// entry for it.
pub fn dataset_id_for(data: &LegacyData, catalog: Option<&[CatalogItem]>) -> Option<String> {
    let Some(catalog) = catalog else {
        return Some(data.data_id.clone());
    };
    catalog
        .iter()
        .find(|item| item.id == data.data_id)
        .map(|item| item.item_id.clone().unwrap_or_else(|| data.data_id.clone()))
}

pub fn find_existing_setting<'a>(
    dataset_id: &str,
    data_id: &str,
    existing: &'a [SettingRef],
) -> Option<&'a SettingRef> {
    existing
        .iter()
        .find(|s| s.dataset_id == dataset_id && s.data_id == data_id)
}

/// Legacy template id referenced by a binding.
fn template_reference(data: &LegacyData) -> Option<&str> {
    data.components.iter().find_map(|c| match &c.field {
        LegacyField::Template { template_id } => template_id.as_deref(),
        _ => None,
    })
}

/// Migrated id of a legacy template, from this run or an earlier one.
fn resolve_template<'a>(
    legacy_id: &str,
    templates: &'a ConvertedTemplates,
    existing_templates: &'a [TemplateRef],
) -> Option<&'a str> {
    templates.id_for(legacy_id).or_else(|| {
        existing_templates
            .iter()
            .find(|t| t.source_id.as_deref() == Some(legacy_id))
            .map(|t| t.id.as_str())
    })
}

pub fn convert_setting(
    data: &LegacyData,
    dataset_id: String,
    templates: &ConvertedTemplates,
    existing: &[SettingRef],
    existing_templates: &[TemplateRef],
    ids: &dyn IdSource,
) -> Result<Setting, MigrateError> {
    let id = match find_existing_setting(&dataset_id, &data.data_id, existing) {
        Some(found) => {
            debug!(data_id = %data.data_id, id = %found.id, "reusing setting id");
            found.id.clone()
        }
        None => ids.generate(),
    };

    let template_id = template_reference(data).and_then(|legacy_id| {
        let resolved = resolve_template(legacy_id, templates, existing_templates);
        if resolved.is_none() {
            warn!(
                data_id = %data.data_id,
                template = legacy_id,
                "template not found, converting components instead"
            );
        }
        resolved
    });

    let field_components = match template_id {
        Some(template_id) => FieldComponents {
            use_template: true,
            template_id: Some(template_id.to_string()),
            groups: Vec::new(),
        },
        None => FieldComponents {
            use_template: false,
            template_id: None,
            groups: convert_component_groups(&data.components, &ConvertOptions::default(), ids)?,
        },
    };

    Ok(Setting {
        id,
        dataset_id,
        data_id: data.data_id.clone(),
        general: convert_general(&data.components),
        field_components,
    })
}

#[derive(Debug, Default)]
pub struct ConvertedSettings {
    pub settings: Vec<Setting>,
    pub reused: usize,
    /// Bindings with no catalog entry.
    pub skipped: usize,
}

pub fn convert_settings(
    data: &[LegacyData],
    catalog: Option<&[CatalogItem]>,
    templates: &ConvertedTemplates,
    existing: &[SettingRef],
    existing_templates: &[TemplateRef],
    ids: &dyn IdSource,
) -> Result<ConvertedSettings, MigrateError> {
    let mut out = ConvertedSettings::default();
    for binding in data {
        let Some(dataset_id) = dataset_id_for(binding, catalog) else {
            warn!(data_id = %binding.data_id, "no catalog entry, skipping");
            out.skipped += 1;
            continue;
        };
        if find_existing_setting(&dataset_id, &binding.data_id, existing).is_some() {
            out.reused += 1;
        }
        out.settings.push(convert_setting(
            binding,
            dataset_id,
            templates,
            existing,
            existing_templates,
            ids,
        )?);
    }
    Ok(out)
}
