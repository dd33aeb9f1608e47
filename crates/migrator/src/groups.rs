//! Component groups: one per switch-group variant, or a single default.

use foundation::IdSource;
use tracing::debug;

use crate::error::MigrateError;
use crate::fields::{ConvertOptions, convert_components};
use crate::legacy::{LegacyComponent, LegacyField, SwitchGroupItem};
use crate::schema::ComponentGroup;

pub const DEFAULT_GROUP_NAME: &str = "default";

/// Variants declared by the first `switchGroup` component, if any.
pub fn switch_group_variants(components: &[LegacyComponent]) -> Option<&[SwitchGroupItem]> {
    components.iter().find_map(|c| match &c.field {
        LegacyField::SwitchGroup { groups, .. } => Some(groups.as_slice()),
        _ => None,
    })
}

/// Converts a legacy component list into named component groups.
///
/// Untagged components belong to every variant; a tagged component only to
/// the variant whose `fieldGroupID` matches its `group`.
pub fn convert_component_groups(
    components: &[LegacyComponent],
    options: &ConvertOptions,
    ids: &dyn IdSource,
) -> Result<Vec<ComponentGroup>, MigrateError> {
    let Some(variants) = switch_group_variants(components) else {
        let id = ids.generate();
        return Ok(vec![ComponentGroup {
            id,
            name: DEFAULT_GROUP_NAME.to_string(),
            components: convert_components(components, components, options, ids)?,
        }]);
    };

    debug!(variants = variants.len(), "splitting by switch group");
    variants
        .iter()
        .map(|variant| {
            let members: Vec<LegacyComponent> = components
                .iter()
                .filter(|c| {
                    c.group
                        .as_deref()
                        .is_none_or(|g| g == variant.field_group_id)
                })
                .cloned()
                .collect();
            let id = ids.generate();
            Ok(ComponentGroup {
                id,
                name: variant.title.clone(),
                components: convert_components(&members, &members, options, ids)?,
            })
        })
        .collect()
}
