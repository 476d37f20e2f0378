//! Deployment base path.
//!
//! The base is the public path an app is served from (e.g. `/hdx-signals-inform/`).
//! Emitted asset URLs are prefixed with it.

/// Base used when nothing is configured.
pub const DEFAULT_BASE: &str = "/";

/// Base meaning "relative to the HTML file that loads the asset".
pub const RELATIVE_BASE: &str = "./";

/// Normalize a configured base path.
///
/// - empty, `.` and `./` become the relative base `./`
/// - `http://` and `https://` URLs are kept, with a trailing `/` ensured
/// - everything else gets a leading and a trailing `/`
#[must_use]
pub fn normalize_base(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() || raw == "." || raw == RELATIVE_BASE {
        return RELATIVE_BASE.to_string();
    }

    let mut base = if is_external_url(raw) || raw.starts_with('/') {
        raw.to_string()
    } else {
        format!("/{}", raw.trim_start_matches("./"))
    };
    if !base.ends_with('/') {
        base.push('/');
    }
    base
}

/// Public URL of an emitted asset under `base`.
///
/// `base` is expected to be normalized. A leading `/` or `./` on the asset is dropped
/// so the asset always lands under the base.
#[must_use]
pub fn asset_url(base: &str, asset: &str) -> String {
    let asset = asset.strip_prefix("./").unwrap_or(asset);
    let asset = asset.trim_start_matches('/');
    format!("{base}{asset}")
}

fn is_external_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("//")
}
