//! Import statement edit synthesis.
//!
//! Two entry points: augment an existing import statement with one more
//! binding, or synthesize a whole new statement. Augmentation is a pure
//! function of the clause shape and the requested binding kind; when a
//! clause cannot host the request the caller falls back to a new statement.
//! All edits splice the file's own text back where possible so formatting
//! conventions (inline vs. one-per-line named lists, quote style) survive.

use crate::change_tracker::{ChangeTracker, FileTextChanges};
use crate::config::{CompilerOptions, QuotePreference};
use crate::import_index::ImportRecord;
use crate::span::Span;
use crate::syntax::{NamedBindings, NamedImports, SourceFile, Statement};
use tracing::debug;

/// Binding kind requested for an import edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Default,
    Named,
    Namespace,
}

/// Synthesizes import edits against one source file.
pub struct ImportEditSynthesizer<'a> {
    source_file: &'a SourceFile,
    quote_preference: QuotePreference,
}

impl<'a> ImportEditSynthesizer<'a> {
    pub fn new(source_file: &'a SourceFile, options: &CompilerOptions) -> Self {
        ImportEditSynthesizer {
            source_file,
            quote_preference: options.quote_preference,
        }
    }

    /// Try to host `name` in the statement behind `record`. Returns the
    /// edits, or `None` when the clause shape cannot take the requested
    /// kind (caller falls through to a new statement).
    pub fn try_update_existing_import(
        &self,
        record: &ImportRecord,
        kind: ImportKind,
        name: &str,
    ) -> Option<Vec<FileTextChanges>> {
        let clause = match &self.source_file.statements[record.statement_index] {
            Statement::Import(decl) => decl.clause.as_ref()?,
            // import-equals and side-effect imports take no extra bindings.
            _ => return None,
        };

        let mut tracker = ChangeTracker::new();
        match kind {
            ImportKind::Default => {
                if clause.default_name.is_some() {
                    debug!(name, "cannot augment: default binding already present");
                    return None;
                }
                let bindings_text = clause
                    .named_bindings
                    .as_ref()
                    .map(|bindings| self.text_of(named_bindings_span(bindings)));
                let new_text = match bindings_text {
                    Some(bindings) => format!("{name}, {bindings}"),
                    None => name.to_string(),
                };
                tracker.replace_span(self.source_file, clause.span, new_text);
            }
            ImportKind::Named => match &clause.named_bindings {
                Some(NamedBindings::Named(named)) if !named.elements.is_empty() => {
                    let (position, text) = self.named_list_insertion(named, name);
                    tracker.insert_text(self.source_file, position, text);
                }
                Some(NamedBindings::Named(_)) | None => {
                    // Empty and absent named lists augment identically: the
                    // clause is replaced with a singleton list.
                    let new_text = match &clause.default_name {
                        Some(default) => format!("{}, {{ {name} }}", default.text),
                        None => format!("{{ {name} }}"),
                    };
                    tracker.replace_span(self.source_file, clause.span, new_text);
                }
                Some(NamedBindings::Namespace(_)) => {
                    debug!(name, "cannot augment: namespace binding excludes named list");
                    return None;
                }
            },
            ImportKind::Namespace => {
                if clause.named_bindings.is_some() {
                    debug!(name, "cannot augment: clause already carries bindings");
                    return None;
                }
                let new_text = match &clause.default_name {
                    Some(default) => format!("{}, * as {name}", default.text),
                    None => format!("* as {name}"),
                };
                tracker.replace_span(self.source_file, clause.span, new_text);
            }
        }
        Some(tracker.get_changes())
    }

    /// Synthesize a brand-new import statement for `name`.
    pub fn synthesize_new_import(
        &self,
        name: &str,
        kind: ImportKind,
        specifier: &str,
    ) -> Vec<FileTextChanges> {
        let quote = self.preferred_quote();
        let statement_text = match kind {
            ImportKind::Default => format!("import {name} from {quote}{specifier}{quote}"),
            ImportKind::Named => format!("import {{ {name} }} from {quote}{specifier}{quote}"),
            ImportKind::Namespace => {
                format!("import * as {name} from {quote}{specifier}{quote}")
            }
        };

        let mut tracker = ChangeTracker::new();
        match self.source_file.last_import_statement() {
            Some(index) => {
                let after = self.source_file.statements[index].span().end;
                tracker.insert_text(self.source_file, after, format!("\n{statement_text};"));
            }
            None => {
                let position = self.source_file.import_insertion_position();
                tracker.insert_text(self.source_file, position, format!("{statement_text};\n\n"));
            }
        }
        tracker.get_changes()
    }

    /// Insertion point and text for extending a non-empty named list,
    /// preserving its inline vs. one-per-line layout and any trailing
    /// comma after the last element.
    fn named_list_insertion(&self, named: &NamedImports, name: &str) -> (u32, String) {
        let elements = &named.elements;
        let last = elements.last().expect("list checked non-empty");

        let preceding_span = if elements.len() >= 2 {
            Span::new(elements[elements.len() - 2].span.end, last.span.start)
        } else {
            Span::new(named.span.start, last.span.start)
        };
        let multiline = self.text_of(preceding_span).contains('\n');

        let mut position = last.span.end;
        let mut has_trailing_comma = false;
        let bytes = self.source_file.text.as_bytes();
        let mut probe = position as usize;
        while probe < bytes.len() && bytes[probe].is_ascii_whitespace() {
            probe += 1;
        }
        if probe < bytes.len() && bytes[probe] == b',' {
            has_trailing_comma = true;
            position = probe as u32 + 1;
        }

        let text = match (multiline, has_trailing_comma) {
            (true, true) => format!("\n{}{}", self.indentation_at(last.span.start), name),
            (true, false) => format!(",\n{}{}", self.indentation_at(last.span.start), name),
            (false, true) => format!(" {name}"),
            (false, false) => format!(", {name}"),
        };
        (position, text)
    }

    /// Leading whitespace of the line containing `position`.
    fn indentation_at(&self, position: u32) -> &str {
        let text = &self.source_file.text;
        let line_start = text[..position as usize]
            .rfind('\n')
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let line = &text[line_start..position as usize];
        let indent_len = line.len() - line.trim_start().len();
        &line[..indent_len]
    }

    /// Quote character for a synthesized specifier literal: the configured
    /// preference, or the style of the first string-literal specifier
    /// already in the file, double quotes when there is none.
    fn preferred_quote(&self) -> char {
        match self.quote_preference {
            QuotePreference::Single => '\'',
            QuotePreference::Double => '"',
            QuotePreference::Auto => self
                .source_file
                .statements
                .iter()
                .find_map(|statement| {
                    let literal = match statement {
                        Statement::Import(decl) => Some(&decl.module_specifier),
                        Statement::ImportEquals(decl) => Some(&decl.module_specifier),
                        Statement::Export(decl) => decl.module_specifier.as_ref(),
                        Statement::Other(_) => None,
                    }?;
                    self.source_file.quote_char(literal)
                })
                .unwrap_or('"'),
        }
    }

    fn text_of(&self, span: Span) -> &str {
        &self.source_file.text[span.start as usize..span.end as usize]
    }
}

fn named_bindings_span(bindings: &NamedBindings) -> Span {
    match bindings {
        NamedBindings::Named(named) => named.span,
        NamedBindings::Namespace(namespace) => namespace.span,
    }
}
