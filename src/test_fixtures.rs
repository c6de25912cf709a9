//! Shared test fixtures.
//!
//! `TestProgram` is an in-memory export oracle: tests register modules,
//! exports and globals directly instead of running a real binder.
//! `parse_test_file` lowers literal source text into the statement model so
//! fixtures read like source files rather than hand-built span tables.

use crate::change_tracker::{FileTextChanges, TextChange};
use crate::import_index::ImportRecord;
use crate::program::{BindingId, CancellationToken, ExportOracle, ModuleId, SemanticMeaning};
use crate::span::Span;
use crate::syntax::{
    ExportDeclaration, Identifier, ImportClause, ImportDeclaration, ImportEqualsDeclaration,
    ImportSpecifierElement, NamedBindings, NamedImports, NamespaceImport, SourceFile, Statement,
    StringLiteral,
};
use rustc_hash::FxHashMap;
use std::cell::Cell;

#[derive(Debug)]
struct TestModule {
    name: String,
    file_name: Option<String>,
    exports: Vec<(String, BindingId)>,
    default_export: Option<BindingId>,
}

#[derive(Debug)]
struct TestBinding {
    local_name: Option<String>,
    meaning: SemanticMeaning,
    alias_of: Option<BindingId>,
    module: Option<ModuleId>,
}

/// In-memory program doubling as the export oracle.
#[derive(Debug)]
pub struct TestProgram {
    modules: Vec<TestModule>,
    file_order: Vec<ModuleId>,
    ambient_order: Vec<ModuleId>,
    bindings: Vec<TestBinding>,
    specifier_links: FxHashMap<(String, String), ModuleId>,
    globals: FxHashMap<String, BindingId>,
    file_texts: FxHashMap<String, String>,
    required_meaning: SemanticMeaning,
}

impl TestProgram {
    pub fn new() -> Self {
        TestProgram {
            modules: Vec::new(),
            file_order: Vec::new(),
            ambient_order: Vec::new(),
            bindings: Vec::new(),
            specifier_links: FxHashMap::default(),
            globals: FxHashMap::default(),
            file_texts: FxHashMap::default(),
            required_meaning: SemanticMeaning::ALL,
        }
    }

    pub fn file_module(&mut self, path: &str) -> ModuleId {
        let id = ModuleId(self.modules.len() as u32);
        self.modules.push(TestModule {
            name: path.to_string(),
            file_name: Some(path.to_string()),
            exports: Vec::new(),
            default_export: None,
        });
        self.file_order.push(id);
        id
    }

    /// Register a module declared by a quoted name, e.g. `"\"my-lib\""`.
    pub fn ambient_module(&mut self, quoted_name: &str) -> ModuleId {
        let id = ModuleId(self.modules.len() as u32);
        self.modules.push(TestModule {
            name: quoted_name.to_string(),
            file_name: None,
            exports: Vec::new(),
            default_export: None,
        });
        self.ambient_order.push(id);
        id
    }

    pub fn module_named(&self, name: &str) -> ModuleId {
        let index = self
            .modules
            .iter()
            .position(|module| module.name == name)
            .expect("module registered");
        ModuleId(index as u32)
    }

    fn add_binding(&mut self, binding: TestBinding) -> BindingId {
        let id = BindingId(self.bindings.len() as u32);
        self.bindings.push(binding);
        id
    }

    pub fn export(&mut self, module: ModuleId, name: &str, meaning: SemanticMeaning) -> BindingId {
        let binding = self.add_binding(TestBinding {
            local_name: Some(name.to_string()),
            meaning,
            alias_of: None,
            module: Some(module),
        });
        self.modules[module.0 as usize]
            .exports
            .push((name.to_string(), binding));
        binding
    }

    pub fn export_value(&mut self, module: ModuleId, name: &str) -> BindingId {
        self.export(module, name, SemanticMeaning::VALUE)
    }

    pub fn default_export(
        &mut self,
        module: ModuleId,
        local_name: &str,
        meaning: SemanticMeaning,
    ) -> BindingId {
        let binding = self.add_binding(TestBinding {
            local_name: Some(local_name.to_string()),
            meaning,
            alias_of: None,
            module: Some(module),
        });
        self.modules[module.0 as usize].default_export = Some(binding);
        binding
    }

    /// A UMD global: an alias in global scope resolving to `module`.
    pub fn umd_global(&mut self, name: &str, module: ModuleId) -> BindingId {
        let module_symbol = self.add_binding(TestBinding {
            local_name: None,
            meaning: SemanticMeaning::VALUE | SemanticMeaning::NAMESPACE,
            alias_of: None,
            module: Some(module),
        });
        let alias = self.add_binding(TestBinding {
            local_name: Some(name.to_string()),
            meaning: SemanticMeaning::VALUE | SemanticMeaning::NAMESPACE,
            alias_of: Some(module_symbol),
            module: None,
        });
        self.globals.insert(name.to_string(), alias);
        alias
    }

    /// A global that is not an alias (negative UMD case).
    pub fn plain_global(&mut self, name: &str) -> BindingId {
        let binding = self.add_binding(TestBinding {
            local_name: Some(name.to_string()),
            meaning: SemanticMeaning::VALUE,
            alias_of: None,
            module: None,
        });
        self.globals.insert(name.to_string(), binding);
        binding
    }

    /// Teach the oracle that `specifier` written in `from_file` resolves
    /// to `module`.
    pub fn link_specifier(&mut self, from_file: &str, specifier: &str, module: ModuleId) {
        self.specifier_links
            .insert((from_file.to_string(), specifier.to_string()), module);
    }

    pub fn add_file_text(&mut self, path: &str, text: &str) {
        self.file_texts.insert(path.to_string(), text.to_string());
    }

    pub fn set_required_meaning(&mut self, meaning: SemanticMeaning) {
        self.required_meaning = meaning;
    }
}

impl ExportOracle for TestProgram {
    fn all_modules(&self) -> Vec<ModuleId> {
        self.file_order.clone()
    }

    fn ambient_modules(&self) -> Vec<ModuleId> {
        self.ambient_order.clone()
    }

    fn module_name(&self, module: ModuleId) -> &str {
        &self.modules[module.0 as usize].name
    }

    fn module_file_name(&self, module: ModuleId) -> Option<&str> {
        self.modules[module.0 as usize].file_name.as_deref()
    }

    fn exports_of(&self, module: ModuleId) -> Vec<(String, BindingId)> {
        self.modules[module.0 as usize].exports.clone()
    }

    fn default_export_of(&self, module: ModuleId) -> Option<BindingId> {
        self.modules[module.0 as usize].default_export
    }

    fn local_name_of(&self, binding: BindingId) -> Option<&str> {
        self.bindings[binding.0 as usize].local_name.as_deref()
    }

    fn meaning_of(&self, binding: BindingId) -> SemanticMeaning {
        self.bindings[binding.0 as usize].meaning
    }

    fn is_alias(&self, binding: BindingId) -> bool {
        self.bindings[binding.0 as usize].alias_of.is_some()
    }

    fn aliased_binding_of(&self, binding: BindingId) -> BindingId {
        self.bindings[binding.0 as usize].alias_of.unwrap_or(binding)
    }

    fn module_of(&self, binding: BindingId) -> Option<ModuleId> {
        self.bindings[binding.0 as usize].module
    }

    fn resolve_specifier(&self, from_file: &str, specifier: &str) -> Option<ModuleId> {
        self.specifier_links
            .get(&(from_file.to_string(), specifier.to_string()))
            .copied()
    }

    fn required_meaning_at(&self, _file: &str, _span: Span) -> SemanticMeaning {
        self.required_meaning
    }

    fn global_binding(&self, name: &str) -> Option<BindingId> {
        self.globals.get(name).copied()
    }

    fn read_file(&self, path: &str) -> Option<String> {
        self.file_texts.get(path).cloned()
    }
}

/// Token that reports cancellation after `n` checks.
#[derive(Debug)]
pub struct CancelAfter(pub Cell<usize>);

impl CancelAfter {
    pub fn new(checks: usize) -> Self {
        CancelAfter(Cell::new(checks))
    }
}

impl CancellationToken for CancelAfter {
    fn is_cancellation_requested(&self) -> bool {
        let remaining = self.0.get();
        if remaining == 0 {
            true
        } else {
            self.0.set(remaining - 1);
            false
        }
    }
}

/// Initialize test logging once; respects `RUST_LOG`.
pub fn init_test_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Apply produced edits to source text (descending-position splice).
pub fn apply_changes(text: &str, changes: &[FileTextChanges]) -> String {
    let mut all: Vec<&TextChange> = changes
        .iter()
        .flat_map(|file| file.text_changes.iter())
        .collect();
    all.sort_by_key(|change| std::cmp::Reverse(change.span.start));
    let mut result = text.to_string();
    for change in all {
        result.replace_range(
            change.span.start as usize..change.span.end as usize,
            &change.new_text,
        );
    }
    result
}

/// Import record for the statement at `statement_index`.
pub fn record_for(file: &SourceFile, statement_index: usize) -> ImportRecord {
    ImportRecord::from_statement(statement_index, &file.statements[statement_index])
        .expect("import-like statement")
}

/// Lower literal source text into a `SourceFile`. Covers the statement
/// shapes fixtures use: ES imports (default/named/namespace/side-effect),
/// `import x = require(...)`, re-exports, and opaque statements.
pub fn parse_test_file(file_name: &str, source: &str) -> SourceFile {
    let bytes = source.as_bytes();
    let mut statements = Vec::new();
    let mut pos = 0usize;

    while pos < bytes.len() {
        if bytes[pos].is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        if bytes[pos] == b'/' && bytes.get(pos + 1) == Some(&b'*') {
            pos = source[pos..]
                .find("*/")
                .map(|rel| pos + rel + 2)
                .unwrap_or(bytes.len());
            continue;
        }
        if bytes[pos] == b'/' && bytes.get(pos + 1) == Some(&b'/') {
            pos = source[pos..]
                .find('\n')
                .map(|rel| pos + rel + 1)
                .unwrap_or(bytes.len());
            continue;
        }

        let end = match source[pos..].find(';') {
            Some(rel) => pos + rel + 1,
            None => match source[pos..].find('\n') {
                Some(rel) => pos + rel,
                None => bytes.len(),
            },
        };
        statements.push(parse_statement(source, pos, end));
        pos = end;
    }

    SourceFile::new(file_name.to_string(), source.to_string(), statements)
}

fn parse_statement(source: &str, start: usize, end: usize) -> Statement {
    let text = &source[start..end];
    let span = Span::new(start as u32, end as u32);

    if starts_with_keyword(text, "import") {
        if let Some(statement) = parse_import_statement(source, start, end) {
            return statement;
        }
    }
    if starts_with_keyword(text, "export") && text.contains("from") {
        if let Some(literal) = last_string_literal(source, start, end) {
            return Statement::Export(ExportDeclaration {
                span,
                module_specifier: Some(literal),
            });
        }
    }
    Statement::Other(span)
}

fn starts_with_keyword(text: &str, keyword: &str) -> bool {
    text.starts_with(keyword)
        && text[keyword.len()..]
            .bytes()
            .next()
            .map(|byte| !byte.is_ascii_alphanumeric() && byte != b'_' && byte != b'$')
            .unwrap_or(true)
}

fn parse_import_statement(source: &str, start: usize, end: usize) -> Option<Statement> {
    let span = Span::new(start as u32, end as u32);
    let literal = last_string_literal(source, start, end)?;
    let after_import = start + "import".len();

    // import ns = require("m");
    let text = &source[start..end];
    if let Some(eq_rel) = text.find('=') {
        if text[eq_rel..].contains("require") {
            let (name_start, name_end) = trim_range(source, after_import, start + eq_rel);
            return Some(Statement::ImportEquals(ImportEqualsDeclaration {
                span,
                name: identifier(source, name_start, name_end),
                module_specifier: literal,
            }));
        }
    }

    // import "m";
    let (probe_start, _) = trim_range(source, after_import, literal.span.start as usize);
    if probe_start == literal.span.start as usize {
        return Some(Statement::Import(ImportDeclaration {
            span,
            clause: None,
            module_specifier: literal,
        }));
    }

    // import <clause> from "m";
    let from_index = source[start..literal.span.start as usize].rfind("from")? + start;
    let clause = parse_import_clause(source, after_import, from_index)?;
    Some(Statement::Import(ImportDeclaration {
        span,
        clause: Some(clause),
        module_specifier: literal,
    }))
}

fn parse_import_clause(source: &str, start: usize, end: usize) -> Option<ImportClause> {
    let (clause_start, clause_end) = trim_range(source, start, end);
    if clause_start >= clause_end {
        return None;
    }
    let bytes = source.as_bytes();

    let mut default_name = None;
    let mut cursor = clause_start;
    if bytes[clause_start] != b'{' && bytes[clause_start] != b'*' {
        let comma = source[clause_start..clause_end]
            .find(',')
            .map(|rel| clause_start + rel)
            .unwrap_or(clause_end);
        let (name_start, name_end) = trim_range(source, clause_start, comma);
        default_name = Some(identifier(source, name_start, name_end));
        cursor = if comma < clause_end { comma + 1 } else { clause_end };
    }

    let (rest_start, rest_end) = trim_range(source, cursor, clause_end);
    let named_bindings = if rest_start < rest_end {
        match bytes[rest_start] {
            b'{' => Some(NamedBindings::Named(parse_named_imports(
                source, rest_start, rest_end,
            ))),
            b'*' => {
                let as_index = source[rest_start..rest_end].find(" as ")? + rest_start;
                let (alias_start, alias_end) = trim_range(source, as_index + 4, rest_end);
                Some(NamedBindings::Namespace(NamespaceImport {
                    span: Span::new(rest_start as u32, rest_end as u32),
                    alias: identifier(source, alias_start, alias_end),
                }))
            }
            _ => None,
        }
    } else {
        None
    };

    Some(ImportClause {
        span: Span::new(clause_start as u32, clause_end as u32),
        default_name,
        named_bindings,
    })
}

fn parse_named_imports(source: &str, start: usize, end: usize) -> NamedImports {
    // `start` is at '{', `end` just past '}'.
    let inner_start = start + 1;
    let inner_end = end - 1;
    let mut elements = Vec::new();
    let mut chunk_start = inner_start;

    for index in inner_start..=inner_end {
        let at_boundary = index == inner_end || source.as_bytes()[index] == b',';
        if !at_boundary {
            continue;
        }
        let (element_start, element_end) = trim_range(source, chunk_start, index);
        if element_start < element_end {
            let chunk = &source[element_start..element_end];
            let element = match chunk.find(" as ") {
                Some(as_rel) => {
                    let property_end = element_start + as_rel;
                    let (name_start, name_end) = trim_range(source, property_end + 4, element_end);
                    ImportSpecifierElement {
                        span: Span::new(element_start as u32, element_end as u32),
                        property_name: Some(identifier(source, element_start, property_end)),
                        name: identifier(source, name_start, name_end),
                    }
                }
                None => ImportSpecifierElement {
                    span: Span::new(element_start as u32, element_end as u32),
                    property_name: None,
                    name: identifier(source, element_start, element_end),
                },
            };
            elements.push(element);
        }
        chunk_start = index + 1;
    }

    NamedImports {
        span: Span::new(start as u32, end as u32),
        elements,
    }
}

fn last_string_literal(source: &str, start: usize, end: usize) -> Option<StringLiteral> {
    let bytes = source.as_bytes();
    let mut close = end;
    while close > start {
        close -= 1;
        if bytes[close] == b'"' || bytes[close] == b'\'' {
            break;
        }
    }
    if close <= start {
        return None;
    }
    let quote = bytes[close];
    let open = source[start..close].rfind(quote as char)? + start;
    Some(StringLiteral {
        span: Span::new(open as u32, close as u32 + 1),
        text: source[open + 1..close].to_string(),
    })
}

fn trim_range(source: &str, mut start: usize, mut end: usize) -> (usize, usize) {
    let bytes = source.as_bytes();
    while start < end && bytes[start].is_ascii_whitespace() {
        start += 1;
    }
    while end > start && bytes[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    (start, end)
}

fn identifier(source: &str, start: usize, end: usize) -> Identifier {
    Identifier {
        span: Span::new(start as u32, end as u32),
        text: source[start..end].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_import() {
        let file = parse_test_file("/src/a.ts", "import d, { a, b as c } from \"./m\";\n");
        let decl = match &file.statements[0] {
            Statement::Import(decl) => decl,
            other => panic!("expected import, got {other:?}"),
        };
        let clause = decl.clause.as_ref().unwrap();
        assert_eq!(clause.default_name.as_ref().unwrap().text, "d");
        let named = match clause.named_bindings.as_ref().unwrap() {
            NamedBindings::Named(named) => named,
            other => panic!("expected named bindings, got {other:?}"),
        };
        assert_eq!(named.elements.len(), 2);
        assert_eq!(named.elements[0].name.text, "a");
        assert_eq!(named.elements[1].name.text, "c");
        assert_eq!(named.elements[1].property_name.as_ref().unwrap().text, "b");
        assert_eq!(decl.module_specifier.text, "./m");
        // Specifier span includes the quotes.
        let lit = &file.text
            [decl.module_specifier.span.start as usize..decl.module_specifier.span.end as usize];
        assert_eq!(lit, "\"./m\"");
    }

    #[test]
    fn test_parse_namespace_and_equals_imports() {
        let file = parse_test_file(
            "/src/a.ts",
            "import * as ns from './m';\nimport r = require(\"./n\");\n",
        );
        match &file.statements[0] {
            Statement::Import(decl) => {
                let clause = decl.clause.as_ref().unwrap();
                assert!(clause.default_name.is_none());
                match clause.named_bindings.as_ref().unwrap() {
                    NamedBindings::Namespace(namespace) => {
                        assert_eq!(namespace.alias.text, "ns");
                    }
                    other => panic!("expected namespace, got {other:?}"),
                }
            }
            other => panic!("expected import, got {other:?}"),
        }
        match &file.statements[1] {
            Statement::ImportEquals(decl) => {
                assert_eq!(decl.name.text, "r");
                assert_eq!(decl.module_specifier.text, "./n");
            }
            other => panic!("expected import-equals, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_side_effect_import_and_other() {
        let file = parse_test_file("/src/a.ts", "import \"./side\";\nconst x = 1;\n");
        match &file.statements[0] {
            Statement::Import(decl) => assert!(decl.clause.is_none()),
            other => panic!("expected import, got {other:?}"),
        }
        assert!(matches!(file.statements[1], Statement::Other(_)));
    }

    #[test]
    fn test_parse_reexport() {
        let file = parse_test_file("/src/a.ts", "export { a } from './m';\n");
        match &file.statements[0] {
            Statement::Export(decl) => {
                assert_eq!(decl.module_specifier.as_ref().unwrap().text, "./m");
            }
            other => panic!("expected export, got {other:?}"),
        }
    }

    #[test]
    fn test_element_spans_are_exact() {
        let source = "import { alpha } from \"./m\";\n";
        let file = parse_test_file("/src/a.ts", source);
        let named = match &file.statements[0] {
            Statement::Import(decl) => {
                match decl.clause.as_ref().unwrap().named_bindings.as_ref() {
                    Some(NamedBindings::Named(named)) => named.clone(),
                    other => panic!("expected named bindings, got {other:?}"),
                }
            }
            other => panic!("expected import, got {other:?}"),
        };
        let element = &named.elements[0];
        assert_eq!(
            &source[element.span.start as usize..element.span.end as usize],
            "alpha"
        );
        assert_eq!(
            &source[named.span.start as usize..named.span.end as usize],
            "{ alpha }"
        );
    }

    #[test]
    fn test_apply_changes_splices_back_to_front() {
        let text = "abc";
        let changes = vec![FileTextChanges {
            file_name: "/f".to_string(),
            text_changes: vec![
                TextChange {
                    span: Span::new(0, 1),
                    new_text: "X".to_string(),
                },
                TextChange {
                    span: Span::new(2, 3),
                    new_text: "Z".to_string(),
                },
            ],
        }];
        assert_eq!(apply_changes(text, &changes), "XbZ");
    }

    #[test]
    fn test_cancel_after() {
        let token = CancelAfter::new(2);
        assert!(!token.is_cancellation_requested());
        assert!(!token.is_cancellation_requested());
        assert!(token.is_cancellation_requested());
    }
}
