//! Existing-import lookup for the file being fixed.
//!
//! Finds the import statements already present in the current file that
//! target a given module, resolved through the oracle rather than by
//! comparing specifier strings, so `"./m"`, `"./m.ts"` and a path-mapped
//! alias all land on the same module. Results are cached per target module
//! for the duration of one fix request.

use crate::program::{ExportOracle, ModuleId};
use crate::syntax::{NamedBindings, SourceFile, Statement};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// One existing import-like statement targeting a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    /// Index into the current file's statement list.
    pub statement_index: usize,
    /// Literal specifier text, unquoted.
    pub specifier_text: String,
    /// Default binding name, if any.
    pub default_name: Option<String>,
    /// Locally bound names of the named-import elements; `None` when the
    /// statement has no named list at all (an empty list is `Some(vec![])`).
    pub named_elements: Option<Vec<String>>,
    /// Namespace alias: `import * as ns from "m"` or `import ns = require("m")`.
    pub namespace_alias: Option<String>,
}

impl ImportRecord {
    /// Lower an import-like statement into a record; `None` for anything
    /// else.
    pub fn from_statement(statement_index: usize, statement: &Statement) -> Option<ImportRecord> {
        match statement {
            Statement::Import(decl) => {
                let mut record = ImportRecord {
                    statement_index,
                    specifier_text: decl.module_specifier.text.clone(),
                    default_name: None,
                    named_elements: None,
                    namespace_alias: None,
                };
                if let Some(clause) = &decl.clause {
                    record.default_name = clause.default_name.as_ref().map(|name| name.text.clone());
                    match &clause.named_bindings {
                        Some(NamedBindings::Named(named)) => {
                            record.named_elements = Some(
                                named
                                    .elements
                                    .iter()
                                    .map(|element| element.name.text.clone())
                                    .collect(),
                            );
                        }
                        Some(NamedBindings::Namespace(namespace)) => {
                            record.namespace_alias = Some(namespace.alias.text.clone());
                        }
                        None => {}
                    }
                }
                Some(record)
            }
            Statement::ImportEquals(decl) => Some(ImportRecord {
                statement_index,
                specifier_text: decl.module_specifier.text.clone(),
                default_name: None,
                named_elements: None,
                namespace_alias: Some(decl.name.text.clone()),
            }),
            Statement::Export(_) | Statement::Other(_) => None,
        }
    }

    /// Whether this statement already binds `name` locally.
    pub fn binds_name(&self, name: &str) -> bool {
        self.default_name.as_deref() == Some(name)
            || self.namespace_alias.as_deref() == Some(name)
            || self
                .named_elements
                .as_ref()
                .is_some_and(|elements| elements.iter().any(|element| element == name))
    }
}

/// Most modules are imported by at most a statement or two.
pub type ImportRecordList = SmallVec<[ImportRecord; 2]>;

/// What `summarize` extracts from a module's records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Record (index into the list) binding the entire module under a
    /// namespace alias or an alias-equals-require form; last one wins.
    pub namespace_record: Option<usize>,
    /// Literal specifier text of the last record seen; reused instead of
    /// recomputing a specifier for a module the file already imports.
    pub existing_specifier: Option<String>,
}

/// Per-request cache of existing imports keyed by target module.
pub struct ExistingImportIndex<'a> {
    source_file: &'a SourceFile,
    oracle: &'a dyn ExportOracle,
    cache: FxHashMap<ModuleId, ImportRecordList>,
}

impl<'a> ExistingImportIndex<'a> {
    pub fn new(source_file: &'a SourceFile, oracle: &'a dyn ExportOracle) -> Self {
        ExistingImportIndex {
            source_file,
            oracle,
            cache: FxHashMap::default(),
        }
    }

    /// Import statements in the current file whose resolved target is
    /// `target`, in statement order.
    pub fn find(&mut self, target: ModuleId) -> &ImportRecordList {
        if !self.cache.contains_key(&target) {
            let records = self.collect(target);
            self.cache.insert(target, records);
        }
        &self.cache[&target]
    }

    /// Scan the records for a whole-module namespace binding and the most
    /// recent specifier text.
    pub fn summarize(records: &[ImportRecord]) -> ImportSummary {
        let mut summary = ImportSummary::default();
        for (index, record) in records.iter().enumerate() {
            if record.namespace_alias.is_some() {
                summary.namespace_record = Some(index);
            }
            summary.existing_specifier = Some(record.specifier_text.clone());
        }
        summary
    }

    fn collect(&self, target: ModuleId) -> ImportRecordList {
        let mut records = ImportRecordList::new();
        for (statement_index, statement) in self.source_file.statements.iter().enumerate() {
            let record = match ImportRecord::from_statement(statement_index, statement) {
                Some(record) => record,
                None => continue,
            };
            let resolved = self
                .oracle
                .resolve_specifier(&self.source_file.file_name, &record.specifier_text);
            if resolved == Some(target) {
                records.push(record);
            }
        }
        records
    }
}
