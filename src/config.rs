//! Compiler options consumed by import fix computation.
//!
//! This is the subset of a tsconfig the engine actually reads: the module
//! resolution style plus the path-shaping options (`baseUrl`, `paths`,
//! `rootDirs`, `typeRoots`), the JSX factory, and the quote preference for
//! synthesized import statements. The host hydrates it from its own
//! configuration layer; everything here is read-only per request.

use indexmap::IndexMap;
use serde::Deserialize;

/// Module resolution style configured for the program.
///
/// Bare package-name specifiers are only synthesized under [`Node`]
/// resolution, since only that style consults package directories.
///
/// [`Node`]: ModuleResolutionKind::Node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleResolutionKind {
    Classic,
    #[default]
    Node,
}

/// Quote style for synthesized module specifier literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotePreference {
    /// Infer from the first string-literal specifier already in the file,
    /// double quotes when the file has none.
    #[default]
    Auto,
    Double,
    Single,
}

/// tsconfig-style options subset.
///
/// `paths` keeps declaration order: mapping patterns are tried in the order
/// they were written, and the first match wins.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    pub module_resolution: ModuleResolutionKind,
    /// Base directory for non-relative module names.
    pub base_url: Option<String>,
    /// Path mapping table: key pattern -> target patterns.
    pub paths: Option<IndexMap<String, Vec<String>>>,
    /// Logical merged root directories.
    pub root_dirs: Option<Vec<String>>,
    /// Type declaration root directories.
    pub type_roots: Option<Vec<String>>,
    /// JSX factory entity name, e.g. `React.createElement` or `h`.
    pub jsx_factory: Option<String>,
    pub quote_preference: QuotePreference,
}

impl CompilerOptions {
    /// Namespace identifier JSX expressions resolve against: the leading
    /// identifier of `jsxFactory`, `React` when unset.
    pub fn jsx_namespace(&self) -> &str {
        match &self.jsx_factory {
            Some(factory) => factory.split('.').next().unwrap_or("React"),
            None => "React",
        }
    }
}
