//! VIEW2.0 to VIEW3.0 configuration migration.

pub mod error;
pub mod fields;
pub mod general;
pub mod groups;
pub mod legacy;
pub mod migrate;
pub mod rules;
pub mod schema;
pub mod settings;
pub mod templates;

pub use error::MigrateError;
pub use fields::{ComponentDraft, ConvertOptions, FeatureType, convert_component, convert_field};
pub use groups::convert_component_groups;
pub use migrate::{MigrationInput, MigrationOutput, MigrationReport, migrate};
