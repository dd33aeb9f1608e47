use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use foundation::RandomIds;
use migrator::legacy::{CatalogItem, LegacyData, LegacyTemplate};
use migrator::schema::{SettingRef, TemplateRef};
use migrator::{MigrateError, MigrationInput, migrate};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Migrate VIEW2.0 data settings and templates to VIEW3.0")]
struct Args {
    /// Legacy data bindings (JSON array)
    #[arg(long, env = "PLATEAU_MIGRATE_DATA")]
    data: PathBuf,

    /// Legacy templates (JSON array)
    #[arg(long, env = "PLATEAU_MIGRATE_TEMPLATES")]
    templates: Option<PathBuf>,

    /// Legacy data catalog; bindings missing from it are skipped
    #[arg(long, env = "PLATEAU_MIGRATE_CATALOG")]
    catalog: Option<PathBuf>,

    /// Settings written by an earlier run, for id reuse
    #[arg(long)]
    existing_settings: Option<PathBuf>,

    /// Templates written by an earlier run, for id reuse
    #[arg(long)]
    existing_templates: Option<PathBuf>,

    /// Output directory
    #[arg(long, env = "PLATEAU_MIGRATE_OUT", default_value = "out")]
    out: PathBuf,

    /// Pretty-print output JSON
    #[arg(long)]
    pretty: bool,
}

#[derive(Debug, thiserror::Error)]
enum ToolError {
    #[error("read {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("write {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("encode output: {0}")]
    Encode(#[from] serde_json::Error),
    #[error(transparent)]
    Migrate(#[from] MigrateError),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), ToolError> {
    let input = MigrationInput {
        data: read_json::<Vec<LegacyData>>(&args.data)?,
        templates: read_optional::<Vec<LegacyTemplate>>(args.templates.as_deref())?
            .unwrap_or_default(),
        catalog: read_optional::<Vec<CatalogItem>>(args.catalog.as_deref())?,
        existing_settings: read_optional::<Vec<SettingRef>>(args.existing_settings.as_deref())?
            .unwrap_or_default(),
        existing_templates: read_optional::<Vec<TemplateRef>>(args.existing_templates.as_deref())?
            .unwrap_or_default(),
    };
    info!(
        bindings = input.data.len(),
        templates = input.templates.len(),
        "loaded legacy documents"
    );

    let output = migrate(&input, &RandomIds)?;

    fs::create_dir_all(&args.out).map_err(|source| ToolError::Write {
        path: args.out.clone(),
        source,
    })?;
    write_json(&args.out.join("settings.json"), &output.settings, args.pretty)?;
    write_json(&args.out.join("templates.json"), &output.templates, args.pretty)?;

    println!("{}", output.report);
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ToolError> {
    let bytes = fs::read(path).map_err(|source| ToolError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ToolError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn read_optional<T: DeserializeOwned>(path: Option<&Path>) -> Result<Option<T>, ToolError> {
    path.map(read_json).transpose()
}

fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    pretty: bool,
) -> Result<(), ToolError> {
    let payload = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    fs::write(path, payload).map_err(|source| ToolError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "wrote");
    Ok(())
}
