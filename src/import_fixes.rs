//! Import code fixes.
//!
//! Entry point for turning one unresolved-name diagnostic into ranked,
//! ready-to-apply edits. Two diagnostic shapes are handled:
//!
//! - a UMD global referenced from a module (the global resolves through an
//!   alias, or through the configured JSX factory namespace when the token
//!   is a markup tag name) — produces a single namespace-kind action;
//! - a plain unresolved name or namespace — scans every other module in
//!   the program for exported bindings with a matching name and compatible
//!   meaning, and collects augment/new/qualify candidates through the
//!   ranking registry.

use crate::change_tracker::{ChangeTracker, FileTextChanges};
use crate::config::CompilerOptions;
use crate::import_edits::{ImportEditSynthesizer, ImportKind};
use crate::import_index::{ExistingImportIndex, ImportRecord};
use crate::program::{CancellationToken, ExportOracle, ModuleId};
use crate::registry::ActionRegistry;
use crate::span::Span;
use crate::specifier::ModuleSpecifierResolver;
use crate::syntax::SourceFile;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// TS2304: Cannot find name '{0}'.
pub const CANNOT_FIND_NAME: u32 = 2304;

/// TS2552: Cannot find name '{0}'. Did you mean '{1}'?
pub const CANNOT_FIND_NAME_DID_YOU_MEAN: u32 = 2552;

/// TS2503: Cannot find namespace '{0}'.
pub const CANNOT_FIND_NAMESPACE: u32 = 2503;

/// TS2693: '{0}' only refers to a type, but is being used as a value here.
pub const TYPE_ONLY_USED_AS_VALUE: u32 = 2693;

/// TS2686: '{0}' refers to a UMD global, but the current file is a module.
/// Consider adding an import instead.
pub const UMD_GLOBAL_IN_MODULE: u32 = 2686;

/// Internal name of this fix family, as surfaced to code-fix registries.
pub const IMPORT_FIX_NAME: &str = "import";
/// Identifier for fix-all support.
pub const IMPORT_FIX_ID: &str = "fixMissingImport";
/// Human-readable description of the fix-all action.
pub const IMPORT_FIX_ALL_DESCRIPTION: &str = "Add all missing imports";

/// Diagnostic codes this engine can fix.
pub fn fix_error_codes() -> Vec<u32> {
    vec![
        CANNOT_FIND_NAME,
        CANNOT_FIND_NAME_DID_YOU_MEAN,
        CANNOT_FIND_NAMESPACE,
        TYPE_ONLY_USED_AS_VALUE,
        UMD_GLOBAL_IN_MODULE,
    ]
}

/// How a candidate action makes the reference resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImportActionKind {
    /// Add the binding to an import statement already targeting the module.
    AugmentExistingImport,
    /// Insert a brand-new import statement.
    NewImport,
    /// Rewrite the reference to go through an existing namespace alias.
    QualifyWithNamespace,
}

/// One candidate fix: a description, the edits, and enough metadata for a
/// caller to present alternatives.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportAction {
    pub kind: ImportActionKind,
    pub description: String,
    pub changes: Vec<FileTextChanges>,
    /// Ranking key; present for the two import-statement kinds, absent for
    /// reference rewrites.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_specifier: Option<String>,
}

/// Request-fatal failures. Recoverable conditions (no candidates, an
/// unaugmentable statement, an unparseable dependency-tree path) never
/// surface here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixError {
    /// The cancellation token was observed during the module scan.
    Cancelled,
    /// The request reached a state the diagnostic shape rules out.
    InvariantViolation(&'static str),
}

impl fmt::Display for FixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixError::Cancelled => write!(f, "import fix request was cancelled"),
            FixError::InvariantViolation(message) => {
                write!(f, "import fix invariant violation: {message}")
            }
        }
    }
}

impl std::error::Error for FixError {}

/// The two diagnostic shapes the orchestrator dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FixRequestKind {
    /// A UMD global referenced from module scope.
    UmdGlobal,
    /// A plain unresolved name or namespace.
    UnresolvedName,
}

fn request_kind_for_code(error_code: u32) -> Option<FixRequestKind> {
    match error_code {
        UMD_GLOBAL_IN_MODULE => Some(FixRequestKind::UmdGlobal),
        CANNOT_FIND_NAME | CANNOT_FIND_NAME_DID_YOU_MEAN | CANNOT_FIND_NAMESPACE
        | TYPE_ONLY_USED_AS_VALUE => Some(FixRequestKind::UnresolvedName),
        _ => None,
    }
}

/// Computes import fixes against one program.
pub struct ImportFixProvider<'a> {
    oracle: &'a dyn ExportOracle,
    options: &'a CompilerOptions,
}

/// Per-request state; discarded when the request returns.
struct FixContext<'a> {
    source_file: &'a SourceFile,
    symbol_name: String,
    token_span: Span,
    index: ExistingImportIndex<'a>,
    synthesizer: ImportEditSynthesizer<'a>,
    resolver: ModuleSpecifierResolver<'a>,
}

impl<'a> ImportFixProvider<'a> {
    pub fn new(oracle: &'a dyn ExportOracle, options: &'a CompilerOptions) -> Self {
        ImportFixProvider { oracle, options }
    }

    /// Compute the ranked fix candidates for the diagnostic at `position`.
    ///
    /// Returns an empty list when the code is not one this engine fixes,
    /// when no identifier covers the position, or when no module exports a
    /// matching binding.
    pub fn get_fixes(
        &self,
        source_file: &'a SourceFile,
        error_code: u32,
        position: u32,
        cancellation: &dyn CancellationToken,
    ) -> Result<Vec<ImportAction>, FixError> {
        let request_kind = match request_kind_for_code(error_code) {
            Some(kind) => kind,
            None => return Ok(Vec::new()),
        };
        let (token_span, symbol_name) = match source_file.identifier_at(position) {
            Some((span, name)) => (span, name.to_string()),
            None => return Ok(Vec::new()),
        };

        let mut context = FixContext {
            source_file,
            symbol_name,
            token_span,
            index: ExistingImportIndex::new(source_file, self.oracle),
            synthesizer: ImportEditSynthesizer::new(source_file, self.options),
            resolver: ModuleSpecifierResolver::new(self.oracle, self.options),
        };

        match request_kind {
            FixRequestKind::UmdGlobal => self.get_actions_for_umd_import(&mut context),
            FixRequestKind::UnresolvedName => {
                self.get_actions_for_unresolved_name(&mut context, cancellation)
            }
        }
    }

    /// UMD shape: resolve the module behind the global (one alias hop), or
    /// behind the JSX factory namespace when the token is a markup tag
    /// name, and request a single namespace import of it.
    fn get_actions_for_umd_import(
        &self,
        context: &mut FixContext<'a>,
    ) -> Result<Vec<ImportAction>, FixError> {
        let umd_binding = self
            .oracle
            .global_binding(&context.symbol_name)
            .filter(|binding| self.oracle.is_alias(*binding));

        let (module, import_name) = if let Some(binding) = umd_binding {
            let target = self.oracle.aliased_binding_of(binding);
            let module = self.oracle.module_of(target).ok_or(FixError::InvariantViolation(
                "UMD global alias does not resolve to a module",
            ))?;
            (module, context.symbol_name.clone())
        } else if context.source_file.is_markup_tag_position(context.token_span) {
            let namespace_name = self.options.jsx_namespace().to_string();
            let factory_binding = self
                .oracle
                .global_binding(&namespace_name)
                .ok_or(FixError::InvariantViolation(
                    "markup factory namespace is not in scope",
                ))?;
            let target = self.oracle.aliased_binding_of(factory_binding);
            let module = self.oracle.module_of(target).ok_or(FixError::InvariantViolation(
                "markup factory namespace does not resolve to a module",
            ))?;
            (module, namespace_name)
        } else {
            return Err(FixError::InvariantViolation(
                "either the global or the markup factory namespace must resolve here",
            ));
        };

        Ok(self
            .get_add_import_action(context, module, &import_name, ImportKind::Namespace)
            .into_iter()
            .collect())
    }

    /// Plain shape: scan every ambient module and every other file module
    /// for a matching default or named export, and collect candidates
    /// through the ranking registry.
    fn get_actions_for_unresolved_name(
        &self,
        context: &mut FixContext<'a>,
        cancellation: &dyn CancellationToken,
    ) -> Result<Vec<ImportAction>, FixError> {
        if context.symbol_name == "default" {
            return Err(FixError::InvariantViolation(
                "the default keyword never names an importable binding",
            ));
        }

        let required_meaning = self
            .oracle
            .required_meaning_at(&context.source_file.file_name, context.token_span);

        let mut candidates = self.oracle.ambient_modules();
        for module in self.oracle.all_modules() {
            if self.oracle.module_file_name(module) != Some(context.source_file.file_name.as_str())
            {
                candidates.push(module);
            }
        }

        let mut registry = ActionRegistry::new();
        let mut scanned = 0usize;
        for module in candidates {
            if cancellation.is_cancellation_requested() {
                return Err(FixError::Cancelled);
            }
            scanned += 1;

            // Default export whose local name matches.
            if let Some(default_binding) = self.oracle.default_export_of(module) {
                if self.oracle.local_name_of(default_binding) == Some(context.symbol_name.as_str())
                    && self
                        .oracle
                        .meaning_of(default_binding)
                        .intersects(required_meaning)
                {
                    let identity = self.oracle.aliased_binding_of(default_binding);
                    let actions =
                        self.get_actions_for_import(context, module, ImportKind::Default);
                    registry.add_all(identity, actions);
                }
            }

            // Any export (re-exports and properties included) with an
            // identical name.
            let named = self
                .oracle
                .exports_of(module)
                .into_iter()
                .find(|(name, _)| *name == context.symbol_name);
            if let Some((_, binding)) = named {
                if self.oracle.meaning_of(binding).intersects(required_meaning) {
                    let identity = self.oracle.aliased_binding_of(binding);
                    let actions = self.get_actions_for_import(context, module, ImportKind::Named);
                    registry.add_all(identity, actions);
                }
            }
        }

        let actions = registry.into_actions();
        debug!(
            symbol = %context.symbol_name,
            scanned,
            actions = actions.len(),
            "import fix scan finished"
        );
        Ok(actions)
    }

    /// All candidates this module contributes for the reference: a
    /// qualify-through-namespace rewrite when the file already binds the
    /// module under an alias, plus one add-import action.
    fn get_actions_for_import(
        &self,
        context: &mut FixContext<'a>,
        module: ModuleId,
        kind: ImportKind,
    ) -> Vec<ImportAction> {
        let records = context.index.find(module).clone();
        let mut actions = Vec::new();

        if records
            .iter()
            .any(|record| record.binds_name(&context.symbol_name))
        {
            // The file already binds this name from this module; offering
            // anything would duplicate an import.
            debug!(symbol = %context.symbol_name, "existing import already satisfies the reference");
            return actions;
        }

        let summary = ExistingImportIndex::summarize(&records);
        if let Some(namespace_index) = summary.namespace_record {
            if let Some(action) =
                self.get_qualify_action(context, module, &records[namespace_index])
            {
                actions.push(action);
            }
        }

        let name = context.symbol_name.clone();
        if let Some(action) = self.get_add_import_action_with_records(
            context,
            module,
            &name,
            kind,
            &records,
            summary.existing_specifier,
        ) {
            actions.push(action);
        }
        actions
    }

    /// Rewrite the reference token to `alias.name`, valid only when the
    /// module actually exports the name.
    fn get_qualify_action(
        &self,
        context: &FixContext<'a>,
        module: ModuleId,
        record: &ImportRecord,
    ) -> Option<ImportAction> {
        let alias = record.namespace_alias.as_deref()?;
        let exports_name = self
            .oracle
            .exports_of(module)
            .into_iter()
            .any(|(name, _)| name == context.symbol_name);
        if !exports_name {
            return None;
        }

        let qualified = format!("{alias}.{}", context.symbol_name);
        let mut tracker = ChangeTracker::new();
        tracker.replace_span(context.source_file, context.token_span, qualified.clone());
        Some(ImportAction {
            kind: ImportActionKind::QualifyWithNamespace,
            description: format!("Change '{}' to '{qualified}'", context.symbol_name),
            changes: tracker.get_changes(),
            module_specifier: None,
        })
    }

    /// One add-import action for the module: the first existing statement
    /// that can host the binding wins, otherwise a new statement using the
    /// module's existing specifier text when the file already has one.
    fn get_add_import_action(
        &self,
        context: &mut FixContext<'a>,
        module: ModuleId,
        name: &str,
        kind: ImportKind,
    ) -> Option<ImportAction> {
        let records = context.index.find(module).clone();
        if records.iter().any(|record| record.binds_name(name)) {
            return None;
        }
        let summary = ExistingImportIndex::summarize(&records);
        self.get_add_import_action_with_records(
            context,
            module,
            name,
            kind,
            &records,
            summary.existing_specifier,
        )
    }

    fn get_add_import_action_with_records(
        &self,
        context: &FixContext<'a>,
        module: ModuleId,
        name: &str,
        kind: ImportKind,
        records: &[ImportRecord],
        existing_specifier: Option<String>,
    ) -> Option<ImportAction> {
        for record in records {
            if let Some(changes) = context
                .synthesizer
                .try_update_existing_import(record, kind, name)
            {
                return Some(ImportAction {
                    kind: ImportActionKind::AugmentExistingImport,
                    description: format!(
                        "Add '{name}' to existing import declaration from \"{}\"",
                        record.specifier_text
                    ),
                    changes,
                    module_specifier: Some(record.specifier_text.clone()),
                });
            }
        }

        let specifier = existing_specifier.unwrap_or_else(|| {
            context
                .resolver
                .resolve(&context.source_file.file_name, module)
        });
        let changes = context.synthesizer.synthesize_new_import(name, kind, &specifier);
        Some(ImportAction {
            kind: ImportActionKind::NewImport,
            description: format!("Import '{name}' from \"{specifier}\""),
            changes,
            module_specifier: Some(specifier),
        })
    }
}
