//! `modalias url` command implementation.

use miette::{IntoDiagnostic, Result};
use modalias_core::base::asset_url;
use modalias_core::version::SCHEMA_VERSION;
use modalias_core::ProjectConfig;
use serde::Serialize;

#[derive(Serialize)]
struct UrlJson<'a> {
    ok: bool,
    schema_version: u32,
    base: &'a str,
    asset: &'a str,
    url: String,
}

/// Print the public URL of `asset` under the project's base.
pub fn run(project: &ProjectConfig, asset: &str, json: bool) -> Result<()> {
    let url = asset_url(&project.base, asset);

    if json {
        let out = UrlJson {
            ok: true,
            schema_version: SCHEMA_VERSION,
            base: &project.base,
            asset,
            url,
        };
        println!("{}", serde_json::to_string(&out).into_diagnostic()?);
    } else {
        println!("{url}");
    }
    Ok(())
}
