//! Bundler configuration file discovery and evaluation.
//!
//! Loads `modalias.config.json`, `vite.config.js`, `vite.config.mjs` or
//! `vite.config.ts` and extracts the static parts the resolver needs: the
//! deployment base, the plugin list and `resolve.alias`.
//!
//! ## Supported config format
//!
//! ```js
//! import { defineConfig } from 'vite'
//! import { svelte } from '@sveltejs/vite-plugin-svelte'
//! import path from 'path'
//!
//! export default defineConfig({
//!   base: '/hdx-signals-inform/',
//!   plugins: [svelte()],
//!   resolve: {
//!     alias: { pages: path.resolve('./src/pages') },
//!   },
//! })
//! ```
//!
//! Alias targets may be strings, `path.resolve(...)`, `path.join(...)`,
//! `__dirname`, `process.cwd()` or `fileURLToPath(new URL(rel, import.meta.url))`.
//! `resolve.alias` may also use the array form `[{ find, replacement }]`.

mod literal;

use crate::alias::AliasTable;
use crate::base::{normalize_base, DEFAULT_BASE};
use crate::error::Error;
use crate::paths::{join_path, resolve_path};
use crate::plugin::{AliasPlugin, NamedPlugin, PluginContainer, PluginContext};
use literal::Literal;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Config file names in priority order.
pub const CONFIG_FILES: &[&str] = &[
    "modalias.config.json",
    "vite.config.js",
    "vite.config.mjs",
    "vite.config.ts",
];

/// Static configuration extracted from a project's bundler config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectConfig {
    /// Project root; relative alias targets resolve against it.
    pub root: PathBuf,
    /// Config file the values came from, if any.
    pub path: Option<PathBuf>,
    /// Normalized deployment base.
    pub base: String,
    /// Plugin names in declaration order, e.g. `svelte`.
    pub plugins: Vec<String>,
    /// Alias prefixes and absolute targets in priority order.
    pub aliases: Vec<(String, PathBuf)>,
}

impl ProjectConfig {
    /// Configuration for a project without a config file.
    #[must_use]
    pub fn empty(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            path: None,
            base: DEFAULT_BASE.to_string(),
            plugins: Vec::new(),
            aliases: Vec::new(),
        }
    }

    /// Put `overrides` ahead of the configured aliases.
    ///
    /// Configured aliases with the same prefix as an override are dropped. Relative
    /// override targets resolve against the project root.
    pub fn override_aliases<I, P, T>(&mut self, overrides: I)
    where
        I: IntoIterator<Item = (P, T)>,
        P: Into<String>,
        T: AsRef<Path>,
    {
        let mut merged: Vec<(String, PathBuf)> = overrides
            .into_iter()
            .map(|(prefix, target)| (prefix.into(), resolve_path(&self.root, &[target])))
            .collect();
        for (prefix, target) in self.aliases.drain(..) {
            if !merged.iter().any(|(p, _)| *p == prefix) {
                merged.push((prefix, target));
            }
        }
        self.aliases = merged;
    }

    /// Build the validated alias table.
    pub fn alias_table(&self) -> Result<AliasTable, Error> {
        AliasTable::from_pairs(self.aliases.iter().map(|(p, t)| (p.as_str(), t.as_path())))
    }

    /// Build the resolution pipeline rooted at this project.
    ///
    /// The alias stage runs first; configured plugins follow in declaration order.
    pub fn pipeline(&self, table: Arc<AliasTable>) -> PluginContainer {
        let ctx = PluginContext::new(self.root.clone()).with_base(self.base.clone());
        let mut container = PluginContainer::new(ctx);
        for name in &self.plugins {
            container.add(Box::new(NamedPlugin::new(name.clone())));
        }
        container.add(Box::new(AliasPlugin::new(table)));
        container
    }
}

/// Find a config file in the given root directory.
#[must_use]
pub fn find_config_file(root: &Path) -> Option<PathBuf> {
    CONFIG_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|path| path.is_file())
}

/// Load the project configuration for `root`.
///
/// If `config_path` is `Some`, that file must exist (relative paths resolve against
/// `root`). Otherwise the first of [`CONFIG_FILES`] is used, and a project without one
/// gets [`ProjectConfig::empty`].
pub fn load_project_config(root: &Path, config_path: Option<&Path>) -> Result<ProjectConfig, Error> {
    let path = match config_path {
        Some(p) => {
            let abs = resolve_path(root, &[p]);
            if !abs.is_file() {
                return Err(Error::ConfigNotFound { path: abs });
            }
            abs
        }
        None => match find_config_file(root) {
            Some(p) => p,
            None => return Ok(ProjectConfig::empty(root)),
        },
    };

    let source = std::fs::read_to_string(&path).map_err(|source| Error::ConfigRead {
        path: path.clone(),
        source,
    })?;

    parse_project_config(root, &path, &source)
}

/// Parse config `source` read from `path`.
pub fn parse_project_config(root: &Path, path: &Path, source: &str) -> Result<ProjectConfig, Error> {
    let parse_err = |message: String| Error::ConfigParse {
        path: path.to_path_buf(),
        message,
    };

    let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
    let value = if is_json {
        let json: serde_json::Value =
            serde_json::from_str(source).map_err(|e| parse_err(e.to_string()))?;
        Literal::from_json(json)
    } else {
        let exported = literal::parse_default_export(source).map_err(parse_err)?;
        unwrap_define_config(exported)
    };

    if !matches!(value, Literal::Object(_)) {
        return Err(parse_err(format!(
            "Config must export an object, found {}",
            value.kind()
        )));
    }

    let env = EvalEnv {
        root,
        config_dir: path.parent().unwrap_or(root),
    };

    let base = match value.get("base") {
        None | Some(Literal::Null) => DEFAULT_BASE.to_string(),
        Some(Literal::String(s)) => normalize_base(s),
        Some(other) => return Err(parse_err(format!("`base` must be a string, found {}", other.kind()))),
    };

    let mut plugins = Vec::new();
    if let Some(list) = value.get("plugins") {
        collect_plugins(list, &mut plugins).map_err(parse_err)?;
    }

    let aliases = match value.get("resolve").and_then(|r| r.get("alias")) {
        Some(alias) => eval_aliases(alias, &env).map_err(parse_err)?,
        None => Vec::new(),
    };

    Ok(ProjectConfig {
        root: root.to_path_buf(),
        path: Some(path.to_path_buf()),
        base,
        plugins,
        aliases,
    })
}

fn unwrap_define_config(value: Literal) -> Literal {
    match value {
        Literal::Call { callee, mut args } if callee == "defineConfig" && args.len() == 1 => {
            args.remove(0)
        }
        other => other,
    }
}

/// Flatten the plugin list into names. Falsy entries are skipped, as bundlers do.
fn collect_plugins(value: &Literal, out: &mut Vec<String>) -> Result<(), String> {
    match value {
        Literal::Array(items) => {
            for item in items {
                collect_plugins(item, out)?;
            }
            Ok(())
        }
        Literal::Call { callee, .. } => {
            out.push(callee.clone());
            Ok(())
        }
        Literal::Ident(name) => {
            out.push(name.clone());
            Ok(())
        }
        Literal::Null | Literal::Bool(false) => Ok(()),
        other => Err(format!("Unsupported plugin entry: {}", other.kind())),
    }
}

/// Directories available while evaluating path expressions.
struct EvalEnv<'a> {
    /// `process.cwd()`; the bundler runs from the project root.
    root: &'a Path,
    /// `__dirname` of the config module.
    config_dir: &'a Path,
}

fn eval_aliases(value: &Literal, env: &EvalEnv<'_>) -> Result<Vec<(String, PathBuf)>, String> {
    match value {
        Literal::Object(entries) => entries
            .iter()
            .map(|(prefix, target)| -> Result<(String, PathBuf), String> {
                let target = eval_target(target, env)
                    .map_err(|e| format!("alias `{prefix}`: {e}"))?;
                Ok((prefix.clone(), target))
            })
            .collect(),
        Literal::Array(entries) => entries
            .iter()
            .map(|entry| -> Result<(String, PathBuf), String> {
                let find = match entry.get("find") {
                    Some(Literal::String(s)) => s.clone(),
                    Some(other) => {
                        return Err(format!("alias `find` must be a string, found {}", other.kind()))
                    }
                    None => return Err("alias entry is missing `find`".to_string()),
                };
                let replacement = entry
                    .get("replacement")
                    .ok_or_else(|| format!("alias `{find}` is missing `replacement`"))?;
                let target = eval_target(replacement, env)
                    .map_err(|e| format!("alias `{find}`: {e}"))?;
                Ok((find, target))
            })
            .collect(),
        other => Err(format!(
            "`resolve.alias` must be an object or array, found {}",
            other.kind()
        )),
    }
}

/// Evaluate an alias target to an absolute path.
fn eval_target(value: &Literal, env: &EvalEnv<'_>) -> Result<PathBuf, String> {
    let path = eval_path(value, env)?;
    Ok(resolve_path(env.root, &[path]))
}

fn eval_path(value: &Literal, env: &EvalEnv<'_>) -> Result<PathBuf, String> {
    match value {
        Literal::String(s) => Ok(PathBuf::from(s)),
        Literal::Ident(name) if name == "__dirname" => Ok(env.config_dir.to_path_buf()),
        Literal::Call { callee, args } => match callee.as_str() {
            "path.resolve" | "resolve" => {
                let segments = eval_segments(args, env)?;
                Ok(resolve_path(env.root, &segments))
            }
            "path.join" | "join" => {
                let segments = eval_segments(args, env)?;
                Ok(join_path(&segments))
            }
            "process.cwd" if args.is_empty() => Ok(env.root.to_path_buf()),
            "fileURLToPath" | "url.fileURLToPath" => match args.as_slice() {
                [Literal::Call { callee, args }] if callee == "new URL" => {
                    eval_import_meta_url(args, env)
                }
                _ => Err("`fileURLToPath` expects `new URL(path, import.meta.url)`".to_string()),
            },
            other => Err(format!("unsupported call `{other}(...)`")),
        },
        other => Err(format!("unsupported target expression: {}", other.kind())),
    }
}

fn eval_segments(args: &[Literal], env: &EvalEnv<'_>) -> Result<Vec<PathBuf>, String> {
    args.iter().map(|arg| eval_path(arg, env)).collect()
}

fn eval_import_meta_url(args: &[Literal], env: &EvalEnv<'_>) -> Result<PathBuf, String> {
    match args {
        [Literal::String(rel), Literal::Ident(base)] if base == "import.meta.url" => {
            Ok(resolve_path(env.config_dir, &[rel]))
        }
        _ => Err("only `new URL(path, import.meta.url)` is supported".to_string()),
    }
}
