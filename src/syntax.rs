//! Statement model of the file being fixed.
//!
//! The engine never parses on its own: the host analyzer owns the AST and
//! hands over the current file as text plus a pre-lowered list of top-level
//! statements, of which only import-like statements carry structure. Spans
//! are byte offsets into `text` so produced edits splice cleanly.

use crate::span::Span;

/// An identifier with its source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub span: Span,
    pub text: String,
}

/// A string literal. The span includes the surrounding quotes; `text` is
/// the unquoted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    pub span: Span,
    pub text: String,
}

/// One element of a named-import list: `a` or `a as b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpecifierElement {
    pub span: Span,
    /// Original exported name for `a as b` forms.
    pub property_name: Option<Identifier>,
    /// Locally bound name.
    pub name: Identifier,
}

/// `{ a, b as c }` — span covers the braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedImports {
    pub span: Span,
    pub elements: Vec<ImportSpecifierElement>,
}

/// `* as ns` — span covers the whole binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceImport {
    pub span: Span,
    pub alias: Identifier,
}

/// The bindings after an optional default name. A statement carries at most
/// one of these; named and namespace bindings cannot coexist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NamedBindings {
    Named(NamedImports),
    Namespace(NamespaceImport),
}

/// Everything between `import` and `from`. Absent for bare side-effect
/// imports (`import "m"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportClause {
    pub span: Span,
    pub default_name: Option<Identifier>,
    pub named_bindings: Option<NamedBindings>,
}

/// `import <clause> from "specifier";`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDeclaration {
    pub span: Span,
    pub clause: Option<ImportClause>,
    pub module_specifier: StringLiteral,
}

/// `import ns = require("specifier");`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEqualsDeclaration {
    pub span: Span,
    pub name: Identifier,
    pub module_specifier: StringLiteral,
}

/// `export ... from "specifier";` — only the specifier matters here (it
/// participates in quote-style inference).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportDeclaration {
    pub span: Span,
    pub module_specifier: Option<StringLiteral>,
}

/// A top-level statement. Non-import statements are opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Import(ImportDeclaration),
    ImportEquals(ImportEqualsDeclaration),
    Export(ExportDeclaration),
    Other(Span),
}

impl Statement {
    pub fn span(&self) -> Span {
        match self {
            Statement::Import(decl) => decl.span,
            Statement::ImportEquals(decl) => decl.span,
            Statement::Export(decl) => decl.span,
            Statement::Other(span) => *span,
        }
    }

    /// Whether this statement can host or precede an import insertion.
    pub fn is_import_like(&self) -> bool {
        matches!(self, Statement::Import(_) | Statement::ImportEquals(_))
    }
}

/// The current file: text plus its pre-lowered top-level statements.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub file_name: String,
    pub text: String,
    pub statements: Vec<Statement>,
}

fn is_identifier_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'$'
}

impl SourceFile {
    pub fn new(file_name: String, text: String, statements: Vec<Statement>) -> Self {
        SourceFile {
            file_name,
            text,
            statements,
        }
    }

    /// The identifier token covering `position`, if any.
    pub fn identifier_at(&self, position: u32) -> Option<(Span, &str)> {
        let bytes = self.text.as_bytes();
        let pos = position as usize;
        if pos >= bytes.len() || !is_identifier_byte(bytes[pos]) {
            return None;
        }
        let mut start = pos;
        while start > 0 && is_identifier_byte(bytes[start - 1]) {
            start -= 1;
        }
        // Identifiers cannot start with a digit.
        if bytes[start].is_ascii_digit() {
            return None;
        }
        let mut end = pos;
        while end < bytes.len() && is_identifier_byte(bytes[end]) {
            end += 1;
        }
        let span = Span::new(start as u32, end as u32);
        Some((span, &self.text[start..end]))
    }

    /// Whether the token at `span` sits in markup-element tag position,
    /// i.e. is immediately preceded by `<`.
    pub fn is_markup_tag_position(&self, span: Span) -> bool {
        let start = span.start as usize;
        start > 0 && self.text.as_bytes()[start - 1] == b'<'
    }

    /// Index of the last top-level import-like statement.
    pub fn last_import_statement(&self) -> Option<usize> {
        self.statements.iter().rposition(|s| s.is_import_like())
    }

    /// Quote character of a string literal, read from the file text.
    pub fn quote_char(&self, literal: &StringLiteral) -> Option<char> {
        match self.text.as_bytes().get(literal.span.start as usize) {
            Some(b'\'') => Some('\''),
            Some(b'"') => Some('"'),
            _ => None,
        }
    }

    /// Position where a first import statement should be inserted: past a
    /// single leading pinned comment block (`/*! ... */`) and any leading
    /// reference-directive lines (`/// <reference ...>`), before the first
    /// real statement.
    pub fn import_insertion_position(&self) -> u32 {
        let bytes = self.text.as_bytes();
        let mut position = 0usize;
        let mut cursor = 0usize;
        let mut first_item = true;

        loop {
            // Skip whitespace between trivia items.
            while cursor < bytes.len() && bytes[cursor].is_ascii_whitespace() {
                cursor += 1;
            }
            if cursor >= bytes.len() {
                break;
            }
            if bytes[cursor] == b'/' && bytes.get(cursor + 1) == Some(&b'*') {
                // Only a pinned block comment at the very top is skipped.
                let is_pinned = bytes.get(cursor + 2) == Some(&b'!');
                if !(first_item && is_pinned) {
                    break;
                }
                let end = match self.text[cursor..].find("*/") {
                    Some(rel) => cursor + rel + 2,
                    None => bytes.len(),
                };
                cursor = skip_line_break(bytes, end);
                position = cursor;
            } else if bytes[cursor] == b'/' && bytes.get(cursor + 1) == Some(&b'/') {
                let line_end = match self.text[cursor..].find('\n') {
                    Some(rel) => cursor + rel,
                    None => bytes.len(),
                };
                if !is_reference_directive(&self.text[cursor..line_end]) {
                    break;
                }
                cursor = skip_line_break(bytes, line_end);
                position = cursor;
            } else {
                break;
            }
            first_item = false;
        }

        position as u32
    }
}

fn skip_line_break(bytes: &[u8], mut pos: usize) -> usize {
    if pos < bytes.len() && bytes[pos] == b'\r' {
        pos += 1;
    }
    if pos < bytes.len() && bytes[pos] == b'\n' {
        pos += 1;
    }
    pos
}

fn is_reference_directive(line: &str) -> bool {
    let rest = match line.strip_prefix("///") {
        Some(rest) => rest.trim_start(),
        None => return false,
    };
    rest.starts_with("<reference")
}
