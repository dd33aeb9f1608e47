//! One migration run over in-memory documents.

use std::fmt;

use foundation::IdSource;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::MigrateError;
use crate::legacy::{CatalogItem, LegacyData, LegacyTemplate};
use crate::schema::{Setting, SettingRef, Template, TemplateRef};
use crate::settings::convert_settings;
use crate::templates::convert_templates;

/// Everything a run reads. Only `data` is required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MigrationInput {
    pub data: Vec<LegacyData>,
    pub templates: Vec<LegacyTemplate>,
    /// When present, bindings without a catalog entry are skipped.
    pub catalog: Option<Vec<CatalogItem>>,
    pub existing_settings: Vec<SettingRef>,
    pub existing_templates: Vec<TemplateRef>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    pub templates_converted: usize,
    pub templates_reused: usize,
    pub settings_converted: usize,
    pub settings_reused: usize,
    pub settings_skipped: usize,
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "templates: {} converted ({} reused); settings: {} converted ({} reused, {} skipped)",
            self.templates_converted,
            self.templates_reused,
            self.settings_converted,
            self.settings_reused,
            self.settings_skipped
        )
    }
}

#[derive(Debug, Clone)]
pub struct MigrationOutput {
    pub settings: Vec<Setting>,
    pub templates: Vec<Template>,
    pub report: MigrationReport,
}

/// Converts templates first so settings can point at them, then settings.
///
/// The first conversion error aborts the run.
pub fn migrate(
    input: &MigrationInput,
    ids: &dyn IdSource,
) -> Result<MigrationOutput, MigrateError> {
    let templates = convert_templates(&input.templates, &input.existing_templates, ids)?;
    let settings = convert_settings(
        &input.data,
        input.catalog.as_deref(),
        &templates,
        &input.existing_settings,
        &input.existing_templates,
        ids,
    )?;

    let report = MigrationReport {
        templates_converted: templates.templates.len(),
        templates_reused: templates.reused,
        settings_converted: settings.settings.len(),
        settings_reused: settings.reused,
        settings_skipped: settings.skipped,
    };
    info!(%report, "migration finished");

    Ok(MigrationOutput {
        settings: settings.settings,
        templates: templates.templates,
        report,
    })
}
