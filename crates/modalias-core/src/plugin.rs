//! Resolution pipeline for the bundler.
//!
//! Provides a Rollup-compatible plugin interface. The alias resolver is one stage of
//! this pipeline ([`AliasPlugin`]); framework compilers are other stages that only see
//! module ids and source code through [`Plugin::transform`].
//!
//! ## Example
//!
//! ```ignore
//! use modalias_core::plugin::{Plugin, PluginContext, HookResult, TransformResult};
//!
//! struct MyPlugin;
//!
//! impl Plugin for MyPlugin {
//!     fn name(&self) -> &str { "my-plugin" }
//!
//!     fn transform(&self, code: &str, id: &str, _ctx: &PluginContext) -> HookResult<Option<TransformResult>> {
//!         if id.ends_with(".txt") {
//!             return Ok(Some(TransformResult::code(format!("export default {:?};", code))));
//!         }
//!         Ok(None)
//!     }
//! }
//! ```

#![allow(clippy::unused_self)]
#![allow(clippy::unnecessary_literal_bound)]

use crate::alias::{AliasTable, Resolution, ResolutionRequest};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result type for plugin hooks.
pub type HookResult<T> = Result<T, PluginError>;

/// Error from a plugin.
#[derive(Debug)]
pub struct PluginError {
    /// Plugin name that caused the error.
    pub plugin: String,
    /// Hook that failed.
    pub hook: &'static str,
    /// Machine-readable code, as in [`crate::Error::code`].
    pub code: &'static str,
    /// Error message.
    pub message: String,
}

impl PluginError {
    pub fn new(plugin: impl Into<String>, hook: &'static str, message: impl Into<String>) -> Self {
        Self {
            plugin: plugin.into(),
            hook,
            code: "PLUGIN_FAILED",
            message: message.into(),
        }
    }

    /// Replace the generic `PLUGIN_FAILED` code.
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = code;
        self
    }
}

impl std::fmt::Display for PluginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.plugin, self.hook, self.message)
    }
}

impl std::error::Error for PluginError {}

/// Context passed to plugin hooks.
#[derive(Debug, Clone)]
pub struct PluginContext {
    /// Project root.
    ///
    /// Entry points have no importing file, so hooks called with `importer: None`
    /// see this directory in its place.
    pub cwd: PathBuf,
    /// Normalized deployment base path.
    pub base: String,
}

impl PluginContext {
    /// Create a new plugin context.
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            base: "/".to_string(),
        }
    }

    /// Set the deployment base path.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }
}

impl Default for PluginContext {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_default())
    }
}

/// Result of resolve hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveIdResult {
    /// Resolved module ID (usually a file path).
    pub id: String,
    /// Whether this module is external (don't bundle).
    pub external: bool,
}

impl ResolveIdResult {
    /// Create a resolved module result.
    pub fn resolved(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            external: false,
        }
    }

    /// Create an external module result.
    pub fn external(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            external: true,
        }
    }
}

/// Result of load hook.
#[derive(Debug, Clone)]
pub struct LoadResult {
    /// Module source code.
    pub code: String,
}

impl LoadResult {
    pub fn code(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// Result of transform hook.
#[derive(Debug, Clone)]
pub struct TransformResult {
    /// Transformed code.
    pub code: String,
    /// Optional source map.
    pub map: Option<String>,
}

impl TransformResult {
    /// Create a transform result with code only.
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            map: None,
        }
    }
}

/// Plugin enforcement ordering.
///
/// Controls where a plugin runs relative to others in the pipeline.
/// Mirrors Vite's `enforce` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum PluginEnforce {
    /// Runs before normal plugins (e.g., alias resolution).
    Pre,
    /// Default ordering (no enforcement).
    #[default]
    Normal,
    /// Runs after normal plugins (e.g., minification).
    Post,
}

/// The main plugin trait.
///
/// All hooks have pass-through defaults, so a plugin only implements what it needs.
pub trait Plugin: Send + Sync {
    /// Plugin name for debugging and error messages.
    fn name(&self) -> &str;

    /// Plugin ordering: `Pre`, `Normal` (default), or `Post`.
    fn enforce(&self) -> PluginEnforce {
        PluginEnforce::Normal
    }

    /// Resolve a module specifier to an ID.
    ///
    /// Return `Some(result)` to handle this resolution, or `None` to let
    /// the next plugin or default resolver handle it.
    fn resolve_id(
        &self,
        _specifier: &str,
        _importer: Option<&str>,
        _ctx: &PluginContext,
    ) -> HookResult<Option<ResolveIdResult>> {
        Ok(None)
    }

    /// Load a module by ID.
    fn load(&self, _id: &str, _ctx: &PluginContext) -> HookResult<Option<LoadResult>> {
        Ok(None)
    }

    /// Transform module source code.
    ///
    /// Return `Some(result)` to transform the code, or `None` to pass it through.
    /// Multiple plugins can transform the same module in sequence.
    fn transform(
        &self,
        _code: &str,
        _id: &str,
        _ctx: &PluginContext,
    ) -> HookResult<Option<TransformResult>> {
        Ok(None)
    }
}

/// A container for managing multiple plugins.
///
/// Plugins are kept sorted by their `enforce()` ordering: `Pre` → `Normal` → `Post`.
/// Within the same enforcement level, insertion order is preserved.
pub struct PluginContainer {
    plugins: Vec<Box<dyn Plugin>>,
    ctx: PluginContext,
}

impl PluginContainer {
    /// Create a new plugin container.
    pub fn new(ctx: PluginContext) -> Self {
        Self {
            plugins: Vec::new(),
            ctx,
        }
    }

    /// Add a plugin in its enforce slot.
    pub fn add(&mut self, plugin: Box<dyn Plugin>) {
        self.plugins.push(plugin);
        // Stable sort keeps insertion order within a level.
        self.plugins.sort_by_key(|p| p.enforce());
    }

    /// Get the context (read-only).
    pub fn context(&self) -> &PluginContext {
        &self.ctx
    }

    /// Plugin names in execution order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.name()).collect()
    }

    /// Try to resolve a module ID through plugins.
    /// Returns None if no plugin handled the resolution.
    pub fn resolve_id(
        &self,
        specifier: &str,
        importer: Option<&str>,
    ) -> HookResult<Option<ResolveIdResult>> {
        for plugin in &self.plugins {
            if let Some(result) = plugin.resolve_id(specifier, importer, &self.ctx)? {
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    /// Try to load a module through plugins.
    /// Returns None if no plugin handled the load.
    pub fn load(&self, id: &str) -> HookResult<Option<LoadResult>> {
        for plugin in &self.plugins {
            if let Some(result) = plugin.load(id, &self.ctx)? {
                return Ok(Some(result));
            }
        }
        Ok(None)
    }

    /// Transform code through all plugins.
    /// Each plugin's output is passed to the next plugin.
    pub fn transform(&self, code: &str, id: &str) -> HookResult<String> {
        let mut current = code.to_string();
        for plugin in &self.plugins {
            if let Some(result) = plugin.transform(&current, id, &self.ctx)? {
                current = result.code;
            }
        }
        Ok(current)
    }
}

impl Default for PluginContainer {
    fn default() -> Self {
        Self::new(PluginContext::default())
    }
}

/// Plugin that rewrites aliased specifiers to absolute paths.
///
/// Runs as a `Pre` plugin so aliases apply before any other resolver sees the
/// specifier. Unmatched specifiers pass through to the next stage.
pub struct AliasPlugin {
    table: Arc<AliasTable>,
}

impl AliasPlugin {
    /// Create an alias plugin over a shared table.
    pub fn new(table: Arc<AliasTable>) -> Self {
        Self { table }
    }
}

impl Plugin for AliasPlugin {
    fn name(&self) -> &str {
        "alias"
    }

    fn enforce(&self) -> PluginEnforce {
        PluginEnforce::Pre
    }

    /// Without an importer the project root stands in for it. Alias matching only
    /// looks at the specifier, so the substitute never changes the result.
    fn resolve_id(
        &self,
        specifier: &str,
        importer: Option<&str>,
        ctx: &PluginContext,
    ) -> HookResult<Option<ResolveIdResult>> {
        let importer = importer.map_or(ctx.cwd.as_path(), Path::new);
        let request = ResolutionRequest::new(specifier, importer);

        match self.table.resolve(&request) {
            Ok(Resolution::Resolved(path)) => Ok(Some(ResolveIdResult::resolved(
                path.to_string_lossy().into_owned(),
            ))),
            Ok(Resolution::Unresolved) => Ok(None),
            Err(err) => Err(
                PluginError::new(self.name(), "resolveId", err.to_string()).with_code(err.code()),
            ),
        }
    }
}

/// Stage for a plugin named in the project config, such as `svelte`.
///
/// The plugin itself is JavaScript and runs in the bundler, not here; the stage
/// keeps its slot in the pipeline and passes every hook through.
pub struct NamedPlugin {
    name: String,
}

impl NamedPlugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Plugin for NamedPlugin {
    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stand-in for a framework compiler: only touches its own file type.
    struct FrameworkPlugin;

    impl Plugin for FrameworkPlugin {
        fn name(&self) -> &str {
            "framework"
        }

        fn transform(
            &self,
            code: &str,
            id: &str,
            _ctx: &PluginContext,
        ) -> HookResult<Option<TransformResult>> {
            if !id.ends_with(".svelte") {
                return Ok(None);
            }
            Ok(Some(TransformResult::code(format!("/* compiled */ {code}"))))
        }
    }

    struct FallbackResolver;

    impl Plugin for FallbackResolver {
        fn name(&self) -> &str {
            "fallback"
        }

        fn resolve_id(
            &self,
            specifier: &str,
            _importer: Option<&str>,
            _ctx: &PluginContext,
        ) -> HookResult<Option<ResolveIdResult>> {
            Ok(Some(ResolveIdResult::external(specifier)))
        }
    }

    fn pages_plugin() -> AliasPlugin {
        let table = AliasTable::from_pairs([("pages", "/repo/src/pages")]).unwrap();
        AliasPlugin::new(Arc::new(table))
    }

    #[cfg(unix)]
    #[test]
    fn test_alias_plugin_resolves() {
        let plugin = pages_plugin();
        let ctx = PluginContext::default();

        let result = plugin
            .resolve_id("pages/Home.svelte", Some("/repo/src/App.svelte"), &ctx)
            .unwrap();
        assert_eq!(
            result,
            Some(ResolveIdResult::resolved("/repo/src/pages/Home.svelte"))
        );
    }

    #[test]
    fn test_alias_plugin_passes_through() {
        let plugin = pages_plugin();
        let ctx = PluginContext::default();

        assert!(plugin.resolve_id("lodash", None, &ctx).unwrap().is_none());
        assert!(plugin.resolve_id("./local", None, &ctx).unwrap().is_none());
    }

    #[test]
    fn test_alias_plugin_surfaces_invalid_specifier() {
        let plugin = pages_plugin();
        let err = plugin
            .resolve_id("", None, &PluginContext::default())
            .unwrap_err();
        assert_eq!(err.plugin, "alias");
        assert_eq!(err.hook, "resolveId");
        assert_eq!(err.code, "INVALID_SPECIFIER");
        assert!(err.to_string().contains("specifier is empty"));
    }

    #[test]
    fn test_container_orders_pre_plugins_first() {
        let mut container = PluginContainer::default();
        container.add(Box::new(FallbackResolver));
        container.add(Box::new(FrameworkPlugin));
        container.add(Box::new(pages_plugin()));

        assert_eq!(container.names(), vec!["alias", "fallback", "framework"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_container_alias_before_fallback() {
        let mut container = PluginContainer::default();
        container.add(Box::new(FallbackResolver));
        container.add(Box::new(pages_plugin()));

        let aliased = container.resolve_id("pages/About.svelte", None).unwrap();
        assert_eq!(
            aliased,
            Some(ResolveIdResult::resolved("/repo/src/pages/About.svelte"))
        );

        let bare = container.resolve_id("svelte/internal", None).unwrap();
        assert_eq!(bare, Some(ResolveIdResult::external("svelte/internal")));
    }

    #[test]
    fn test_container_without_match_returns_none() {
        let mut container = PluginContainer::default();
        container.add(Box::new(pages_plugin()));

        assert!(container.resolve_id("react", None).unwrap().is_none());
        assert!(container.load("react").unwrap().is_none());
    }

    #[test]
    fn test_transform_reaches_framework_plugin() {
        let mut container = PluginContainer::default();
        container.add(Box::new(pages_plugin()));
        container.add(Box::new(FrameworkPlugin));

        let out = container
            .transform("<h1>Home</h1>", "/repo/src/pages/Home.svelte")
            .unwrap();
        assert_eq!(out, "/* compiled */ <h1>Home</h1>");

        let js = container.transform("export {}", "/repo/src/main.js").unwrap();
        assert_eq!(js, "export {}");
    }

    #[test]
    fn test_context_base() {
        let ctx = PluginContext::new(PathBuf::from("/repo")).with_base("/app/");
        let container = PluginContainer::new(ctx);
        assert_eq!(container.context().base, "/app/");
        assert!(container.names().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_entry_without_importer_uses_root() {
        let ctx = PluginContext::new(PathBuf::from("/repo"));
        let plugin = pages_plugin();

        let entry = plugin.resolve_id("pages/Home.svelte", None, &ctx).unwrap();
        let nested = plugin
            .resolve_id("pages/Home.svelte", Some("/repo/src/deep/App.svelte"), &ctx)
            .unwrap();
        assert_eq!(entry, nested);
    }

    #[test]
    fn test_named_plugin_passes_through() {
        let mut container = PluginContainer::default();
        container.add(Box::new(NamedPlugin::new("svelte")));
        container.add(Box::new(pages_plugin()));

        assert_eq!(container.names(), vec!["alias", "svelte"]);
        assert!(container.resolve_id("svelte/store", None).unwrap().is_none());
        assert_eq!(container.transform("x", "/a.svelte").unwrap(), "x");
    }
}
