//! `modalias config` command implementation.

use super::fail;
use miette::{IntoDiagnostic, Result};
use modalias_core::version::SCHEMA_VERSION;
use modalias_core::ProjectConfig;
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct ConfigJson<'a> {
    ok: bool,
    schema_version: u32,
    root: String,
    config_file: Option<String>,
    base: &'a str,
    plugins: &'a [String],
    /// Stage names in execution order.
    pipeline: Vec<String>,
    aliases: Vec<AliasJson<'a>>,
}

#[derive(Serialize)]
struct AliasJson<'a> {
    prefix: &'a str,
    target: String,
}

/// Print the loaded configuration.
///
/// Aliases are validated first so a bad table is reported here rather than on the
/// first `resolve`.
pub fn run(project: &ProjectConfig, json: bool) -> Result<()> {
    let table = match project.alias_table() {
        Ok(table) => Arc::new(table),
        Err(err) => return fail(err, json),
    };
    let pipeline: Vec<String> = project
        .pipeline(Arc::clone(&table))
        .names()
        .into_iter()
        .map(str::to_string)
        .collect();

    if json {
        let out = ConfigJson {
            ok: true,
            schema_version: SCHEMA_VERSION,
            root: project.root.display().to_string(),
            config_file: project.path.as_ref().map(|p| p.display().to_string()),
            base: &project.base,
            plugins: &project.plugins,
            pipeline,
            aliases: table
                .rules()
                .iter()
                .map(|rule| AliasJson {
                    prefix: rule.prefix(),
                    target: rule.target().display().to_string(),
                })
                .collect(),
        };
        println!("{}", serde_json::to_string(&out).into_diagnostic()?);
        return Ok(());
    }

    match &project.path {
        Some(path) => println!("config:  {}", path.display()),
        None => println!("config:  (none)"),
    }
    println!("base:    {}", project.base);
    if project.plugins.is_empty() {
        println!("plugins: (none)");
    } else {
        println!("plugins: {}", project.plugins.join(", "));
    }
    println!("stages:  {}", pipeline.join(" -> "));
    if table.is_empty() {
        println!("aliases: (none)");
    } else {
        println!("aliases:");
        for (i, rule) in table.rules().iter().enumerate() {
            println!("  {}. {} -> {}", i + 1, rule.prefix(), rule.target().display());
        }
    }
    Ok(())
}
