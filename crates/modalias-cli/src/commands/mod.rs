pub mod config;
pub mod resolve;
pub mod url;
pub mod version;

use miette::{IntoDiagnostic, Result};
use modalias_core::plugin::PluginError;
use modalias_core::version::SCHEMA_VERSION;
use modalias_core::{load_project_config, Error, ProjectConfig};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Error object shared by every command's JSON output.
#[derive(Serialize)]
pub struct ErrorJson {
    pub code: String,
    pub message: String,
}

impl From<&Error> for ErrorJson {
    fn from(err: &Error) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<&PluginError> for ErrorJson {
    fn from(err: &PluginError) -> Self {
        Self {
            code: err.code.to_string(),
            message: err.message.clone(),
        }
    }
}

#[derive(Serialize)]
struct FailureJson {
    ok: bool,
    schema_version: u32,
    error: ErrorJson,
}

/// Report `err` and stop.
///
/// In JSON mode the error is printed as `{ ok: false, error: { code, message } }` and
/// the process exits with status 1; otherwise it becomes a diagnostic.
pub fn fail<T>(err: Error, json: bool) -> Result<T> {
    if json {
        let out = FailureJson {
            ok: false,
            schema_version: SCHEMA_VERSION,
            error: ErrorJson::from(&err),
        };
        println!("{}", serde_json::to_string(&out).into_diagnostic()?);
        std::process::exit(1);
    }
    Err(err).into_diagnostic()
}

/// Load the project config found at `root` and apply `--alias` overrides.
pub fn load_project(
    root: &Path,
    config_path: Option<&Path>,
    aliases: &[String],
    json: bool,
) -> Result<ProjectConfig> {
    let overrides = match parse_alias_flags(aliases) {
        Ok(overrides) => overrides,
        Err(err) => return fail(err, json),
    };

    let mut project = match load_project_config(root, config_path) {
        Ok(project) => project,
        Err(err) => return fail(err, json),
    };

    match &project.path {
        Some(path) => debug!(path = %path.display(), "loaded config file"),
        None => debug!(root = %project.root.display(), "no config file found, using defaults"),
    }

    if !overrides.is_empty() {
        debug!(count = overrides.len(), "applying --alias overrides");
        project.override_aliases(overrides);
    }

    debug!(
        base = %project.base,
        plugins = ?project.plugins,
        aliases = project.aliases.len(),
        "project configured"
    );
    Ok(project)
}

/// Parse `FROM=TO` pairs from `--alias`.
fn parse_alias_flags(raw: &[String]) -> Result<Vec<(String, PathBuf)>, Error> {
    raw.iter()
        .map(|entry| match entry.split_once('=') {
            Some((from, to)) if !from.trim().is_empty() && !to.trim().is_empty() => {
                Ok((from.trim().to_string(), PathBuf::from(to.trim())))
            }
            _ => Err(Error::other(format!(
                "Invalid --alias `{entry}`: expected FROM=TO"
            ))),
        })
        .collect()
}
