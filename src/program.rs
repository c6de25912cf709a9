//! Program-level view consumed by the fix engine.
//!
//! The host analyzer's symbol table and checker are a black box behind the
//! [`ExportOracle`] trait: the engine only ever asks which modules exist,
//! what they export, what a binding means, and how specifier text resolves.
//! Nothing here is mutated; one oracle serves many fix requests.

use crate::span::Span;
use bitflags::bitflags;

/// Unique identifier for a module in the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId(pub u32);

/// Unique identifier for an exported binding (a symbol id in the host).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingId(pub u32);

bitflags! {
    /// Grammatical meaning a binding can satisfy. A candidate binding is
    /// only offered when its meaning intersects the meaning demanded by
    /// the reference site.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SemanticMeaning: u8 {
        const VALUE = 1 << 0;
        const TYPE = 1 << 1;
        const NAMESPACE = 1 << 2;
    }
}

impl SemanticMeaning {
    pub const ALL: SemanticMeaning = SemanticMeaning::all();
}

/// Read-only window onto the host's module graph and symbol table.
///
/// Path-valued strings (`module_file_name`, arguments to
/// `resolve_specifier` and `read_file`) are '/'-normalized, matching the
/// rest of the engine.
pub trait ExportOracle {
    /// Every file-backed module in the program, in module-list order.
    fn all_modules(&self) -> Vec<ModuleId>;

    /// Every ambient module (declared by a quoted name, no backing file).
    fn ambient_modules(&self) -> Vec<ModuleId>;

    /// Module name: the quoted literal for ambient modules, the file path
    /// otherwise.
    fn module_name(&self, module: ModuleId) -> &str;

    /// Backing file path; `None` exactly for ambient modules.
    fn module_file_name(&self, module: ModuleId) -> Option<&str>;

    /// All exported (name, binding) pairs of a module, including
    /// re-exports and export-assignment properties.
    fn exports_of(&self, module: ModuleId) -> Vec<(String, BindingId)>;

    /// The module's default export, if any.
    fn default_export_of(&self, module: ModuleId) -> Option<BindingId>;

    /// Locally declared name of a binding; `None` for anonymous
    /// declarations (e.g. `export default function() {}`).
    fn local_name_of(&self, binding: BindingId) -> Option<&str>;

    /// Meaning flags of a binding's declaration.
    fn meaning_of(&self, binding: BindingId) -> SemanticMeaning;

    /// Whether the binding is an alias (import/export alias, UMD global).
    fn is_alias(&self, binding: BindingId) -> bool;

    /// One-hop alias resolution; identity for non-aliases.
    fn aliased_binding_of(&self, binding: BindingId) -> BindingId;

    /// Module a binding belongs to. For a binding that is itself a module
    /// symbol (the target of a UMD alias), this is that module.
    fn module_of(&self, binding: BindingId) -> Option<ModuleId>;

    /// Resolve an import specifier appearing in `from_file` to a module,
    /// using the host's loader configuration.
    fn resolve_specifier(&self, from_file: &str, specifier: &str) -> Option<ModuleId>;

    /// Meaning demanded by the reference site at `span` in `file`.
    fn required_meaning_at(&self, file: &str, span: Span) -> SemanticMeaning;

    /// Global binding with the given name, if one is in scope at program
    /// level (UMD globals, factory namespaces).
    fn global_binding(&self, name: &str) -> Option<BindingId>;

    /// Raw file contents; used only to probe package metadata files.
    fn read_file(&self, path: &str) -> Option<String>;
}

/// Cooperative cancellation for one fix request. Checked once per
/// candidate module during the scan.
pub trait CancellationToken {
    fn is_cancellation_requested(&self) -> bool;
}

/// Token for callers that never cancel.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancelled;

impl CancellationToken for NeverCancelled {
    fn is_cancellation_requested(&self) -> bool {
        false
    }
}
