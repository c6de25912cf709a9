//! Auto-import code fix engine.
//!
//! Given an unresolved-name diagnostic in one file of a multi-file
//! TypeScript program, this crate finds every other module exporting a
//! binding with a matching name and compatible meaning, and produces
//! ranked, ready-to-apply edits:
//!
//! - extend an import statement already targeting the module,
//! - insert a new import statement with the best specifier the loader
//!   configuration supports, or
//! - rewrite the reference through an already-imported namespace alias.
//!
//! The host analyzer stays in charge of parsing, checking, and diagnostic
//! production; it is consumed here as a read-only [`ExportOracle`]. The
//! engine never touches files: every result is an edit description.

// Span and '/'-normalized path primitives
pub mod paths;
pub mod span;

// Configuration surface (tsconfig subset)
pub mod config;

// Statement model of the file being fixed
pub mod syntax;

// Host program view and cancellation
pub mod program;

// Edit recording
pub mod change_tracker;

// Specifier computation
pub mod node_modules;
pub mod specifier;

// Import statement analysis and synthesis
pub mod import_edits;
pub mod import_index;

// Candidate ranking and orchestration
pub mod import_fixes;
pub mod registry;

#[cfg(test)]
pub mod test_fixtures;

#[cfg(test)]
#[path = "tests/import_fix_tests.rs"]
mod import_fix_tests;

pub use change_tracker::{ChangeTracker, FileTextChanges, TextChange};
pub use config::{CompilerOptions, ModuleResolutionKind, QuotePreference};
pub use import_edits::{ImportEditSynthesizer, ImportKind};
pub use import_fixes::{
    FixError, ImportAction, ImportActionKind, ImportFixProvider, fix_error_codes,
};
pub use import_index::{ExistingImportIndex, ImportRecord, ImportSummary};
pub use node_modules::{NodeModulesPathParts, get_node_modules_path_parts};
pub use program::{
    BindingId, CancellationToken, ExportOracle, ModuleId, NeverCancelled, SemanticMeaning,
};
pub use registry::{ActionRegistry, SpecifierComparison, compare_module_specifiers};
pub use span::Span;
pub use specifier::ModuleSpecifierResolver;
pub use syntax::{SourceFile, Statement};
