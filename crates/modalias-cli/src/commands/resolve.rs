//! `modalias resolve` command implementation.
//!
//! Runs one specifier through the resolution pipeline and reports where it lands.

use super::{fail, ErrorJson};
use miette::{IntoDiagnostic, Result};
use modalias_core::version::SCHEMA_VERSION;
use modalias_core::ProjectConfig;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Resolve command action.
#[derive(Debug, Clone)]
pub struct ResolveAction {
    /// Specifier to resolve.
    pub specifier: String,
    /// Absolute path of the importing file. Defaults to the project root.
    pub importer: Option<PathBuf>,
}

/// JSON output for the resolve command.
#[derive(Serialize)]
struct ResolveResultJson {
    ok: bool,
    schema_version: u32,
    specifier: String,
    importer: String,
    /// `null` when no alias applies.
    resolved: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rule: Option<RuleJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorJson>,
}

#[derive(Serialize)]
struct RuleJson {
    prefix: String,
    target: String,
}

/// Run the resolve command.
pub fn run(project: &ProjectConfig, action: ResolveAction, json: bool) -> Result<()> {
    let table = match project.alias_table() {
        Ok(table) => Arc::new(table),
        Err(err) => return fail(err, json),
    };
    let pipeline = project.pipeline(Arc::clone(&table));
    debug!(stages = ?pipeline.names(), "resolution pipeline");

    let importer = action
        .importer
        .clone()
        .unwrap_or_else(|| pipeline.context().cwd.clone());
    let importer_str = action.importer.as_ref().map(|p| p.to_string_lossy());

    let resolved = match pipeline.resolve_id(&action.specifier, importer_str.as_deref()) {
        Ok(resolved) => resolved,
        Err(err) => {
            if json {
                let out = ResolveResultJson {
                    ok: false,
                    schema_version: SCHEMA_VERSION,
                    specifier: action.specifier.clone(),
                    importer: importer.display().to_string(),
                    resolved: None,
                    rule: None,
                    error: Some(ErrorJson::from(&err)),
                };
                println!("{}", serde_json::to_string(&out).into_diagnostic()?);
                std::process::exit(1);
            }
            return Err(err).into_diagnostic();
        }
    };

    let rule = table
        .matching_rule(&action.specifier)
        .map(|(rule, _)| rule);
    debug!(
        specifier = %action.specifier,
        rule = rule.map(|r| r.prefix()),
        resolved = resolved.is_some(),
        "resolved specifier"
    );

    if json {
        let out = ResolveResultJson {
            ok: true,
            schema_version: SCHEMA_VERSION,
            specifier: action.specifier.clone(),
            importer: importer.display().to_string(),
            resolved: resolved.map(|r| r.id),
            rule: rule.map(|r| RuleJson {
                prefix: r.prefix().to_string(),
                target: r.target().display().to_string(),
            }),
            error: None,
        };
        println!("{}", serde_json::to_string(&out).into_diagnostic()?);
        return Ok(());
    }

    match resolved {
        Some(result) => println!("{}", result.id),
        None => println!("unresolved"),
    }
    Ok(())
}
