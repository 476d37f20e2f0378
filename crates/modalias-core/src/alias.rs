//! Path-alias resolution.
//!
//! Rewrites module specifiers that start with a configured prefix to an absolute
//! filesystem path, the way a bundler's `resolve.alias` option does.
//!
//! ## Matching
//!
//! A rule with prefix `pages` matches the specifier `pages` and any specifier that
//! starts with `pages/`. It never matches `pages2` or `pagesX/y`: prefixes are compared
//! as whole path segments.
//!
//! ## Priority
//!
//! Rules are tried in insertion order and the **first** matching rule wins. There is no
//! longest-match rule: with `a` declared before `a/b`, the specifier `a/b/c` resolves
//! through `a`. Declare the more specific prefix first if it should win.
//!
//! ## Example
//!
//! ```
//! use modalias_core::alias::{AliasRule, AliasTable, Resolution, ResolutionRequest};
//! use std::path::Path;
//!
//! let table = AliasTable::new(vec![AliasRule::new("pages", "/repo/src/pages").unwrap()]).unwrap();
//! let request = ResolutionRequest::new("pages/Home.svelte", Path::new("/repo/src/App.svelte"));
//!
//! # #[cfg(unix)]
//! assert_eq!(
//!     table.resolve(&request).unwrap(),
//!     Resolution::Resolved("/repo/src/pages/Home.svelte".into()),
//! );
//! ```

use crate::error::Error;
use crate::paths;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Separator between path segments in a module specifier.
pub const SPECIFIER_SEPARATOR: char = '/';

/// A single `prefix -> target` rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasRule {
    prefix: String,
    target: PathBuf,
}

impl AliasRule {
    /// Create a validated rule.
    ///
    /// The prefix must be non-empty, must not be absolute, and must not end with `/`.
    /// The target must be an absolute path; it is normalized lexically and loses any
    /// trailing separator.
    pub fn new(prefix: impl Into<String>, target: impl Into<PathBuf>) -> Result<Self, Error> {
        let prefix = prefix.into();
        let target = target.into();

        if let Some(reason) = prefix_problem(&prefix) {
            return Err(Error::InvalidPrefix { prefix, reason });
        }
        if !target.has_root() {
            return Err(Error::RelativeTarget { prefix, target });
        }

        Ok(Self {
            prefix,
            target: paths::normalize(&target),
        })
    }

    /// The alias prefix, e.g. `pages`.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The absolute directory (or file) the prefix stands for.
    #[must_use]
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Return the part of `specifier` after the prefix if this rule matches.
    ///
    /// The remainder is empty for an exact match and starts with `/` otherwise.
    #[must_use]
    pub fn strip<'s>(&self, specifier: &'s str) -> Option<&'s str> {
        let rest = specifier.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() || rest.starts_with(SPECIFIER_SEPARATOR) {
            Some(rest)
        } else {
            None
        }
    }

    /// Append `remainder` to the target verbatim.
    fn rewrite(&self, remainder: &str) -> PathBuf {
        if remainder.is_empty() {
            return self.target.clone();
        }

        let mut out: OsString = self.target.clone().into_os_string();
        let target_has_trailing_sep = self
            .target
            .to_str()
            .is_some_and(|t| t.ends_with(std::path::is_separator));
        if target_has_trailing_sep {
            out.push(remainder.strip_prefix(SPECIFIER_SEPARATOR).unwrap_or(remainder));
        } else {
            out.push(remainder);
        }
        PathBuf::from(out)
    }
}

fn prefix_problem(prefix: &str) -> Option<&'static str> {
    if prefix.is_empty() {
        return Some("prefix is empty");
    }
    if prefix.starts_with(SPECIFIER_SEPARATOR)
        || prefix.starts_with('\\')
        || Path::new(prefix).is_absolute()
    {
        return Some("prefix is an absolute path");
    }
    if prefix.ends_with(SPECIFIER_SEPARATOR) {
        return Some("prefix ends with a path separator");
    }
    None
}

/// An ordered, immutable set of alias rules.
///
/// The table is read-only after construction and is `Send + Sync`, so a single
/// instance can be shared behind an `Arc` by every resolver thread.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AliasTable {
    rules: Vec<AliasRule>,
}

impl AliasTable {
    /// Create a table from rules in priority order.
    ///
    /// Fails with [`Error::DuplicatePrefix`] if two rules share a prefix.
    pub fn new(rules: Vec<AliasRule>) -> Result<Self, Error> {
        let mut seen = FxHashSet::default();
        for rule in &rules {
            if !seen.insert(rule.prefix.as_str()) {
                return Err(Error::DuplicatePrefix {
                    prefix: rule.prefix.clone(),
                });
            }
        }
        Ok(Self { rules })
    }

    /// Build a table from `(prefix, target)` pairs, validating each rule.
    pub fn from_pairs<I, P, T>(pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (P, T)>,
        P: Into<String>,
        T: Into<PathBuf>,
    {
        let rules = pairs
            .into_iter()
            .map(|(prefix, target)| AliasRule::new(prefix, target))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(rules)
    }

    /// Rules in priority order.
    #[must_use]
    pub fn rules(&self) -> &[AliasRule] {
        &self.rules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The first rule matching `specifier`, with the unmatched remainder.
    #[must_use]
    pub fn matching_rule<'s>(&self, specifier: &'s str) -> Option<(&AliasRule, &'s str)> {
        self.rules
            .iter()
            .find_map(|rule| rule.strip(specifier).map(|rest| (rule, rest)))
    }

    /// Resolve a request against this table. See [`resolve`].
    pub fn resolve(&self, request: &ResolutionRequest<'_>) -> Result<Resolution, Error> {
        resolve(request, self)
    }
}

/// One resolution call from the bundler.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionRequest<'a> {
    /// The specifier as written in the import statement.
    pub specifier: &'a str,
    /// Absolute path of the importing file. Not used for alias matching; other
    /// resolvers in the pipeline need it.
    pub importer: &'a Path,
}

impl<'a> ResolutionRequest<'a> {
    #[must_use]
    pub fn new(specifier: &'a str, importer: &'a Path) -> Self {
        Self {
            specifier,
            importer,
        }
    }
}

/// Outcome of a resolution call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Rewritten to an absolute path.
    Resolved(PathBuf),
    /// No alias applies; the pipeline should fall through to its default resolver.
    Unresolved,
}

impl Resolution {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Resolved(path) => Some(path),
            Self::Unresolved => None,
        }
    }

    #[must_use]
    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            Self::Resolved(path) => Some(path),
            Self::Unresolved => None,
        }
    }
}

/// Resolve `request.specifier` through `table`.
///
/// Rules are tried in priority order and the first match wins. A specifier equal to a
/// prefix resolves to the target itself; otherwise the remainder after the prefix is
/// appended to the target verbatim. No match is [`Resolution::Unresolved`], not an error.
///
/// Fails only with [`Error::InvalidSpecifier`] for an empty specifier or one containing
/// a NUL byte.
pub fn resolve(request: &ResolutionRequest<'_>, table: &AliasTable) -> Result<Resolution, Error> {
    let specifier = request.specifier;
    if specifier.is_empty() {
        return Err(Error::InvalidSpecifier {
            specifier: String::new(),
            reason: "specifier is empty",
        });
    }
    if specifier.contains('\0') {
        return Err(Error::InvalidSpecifier {
            specifier: specifier.to_string(),
            reason: "specifier contains a NUL byte",
        });
    }

    Ok(match table.matching_rule(specifier) {
        Some((rule, rest)) => Resolution::Resolved(rule.rewrite(rest)),
        None => Resolution::Unresolved,
    })
}
