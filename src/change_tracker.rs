//! Scoped edit recorder.
//!
//! Components request tree-level mutations (replace this clause, insert
//! after that statement); the tracker turns them into concrete
//! file + span + text triples and hands them out in recording order. The
//! serialized shape follows the tsserver protocol (camelCase).

use crate::span::Span;
use crate::syntax::SourceFile;
use indexmap::IndexMap;
use serde::Serialize;

/// A single text replacement. An empty span is a pure insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextChange {
    pub span: Span,
    pub new_text: String,
}

/// All changes recorded against one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileTextChanges {
    pub file_name: String,
    pub text_changes: Vec<TextChange>,
}

/// Collects changes for one candidate action, then flushes them.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    changes: IndexMap<String, Vec<TextChange>>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        ChangeTracker {
            changes: IndexMap::new(),
        }
    }

    /// Replace `span` in `file` with `new_text`.
    pub fn replace_span(&mut self, file: &SourceFile, span: Span, new_text: String) {
        self.changes
            .entry(file.file_name.clone())
            .or_default()
            .push(TextChange { span, new_text });
    }

    /// Insert `text` at `position` in `file`.
    pub fn insert_text(&mut self, file: &SourceFile, position: u32, text: String) {
        self.replace_span(file, Span::empty(position), text);
    }

    /// Flush to per-file change lists, in recording order.
    pub fn get_changes(self) -> Vec<FileTextChanges> {
        self.changes
            .into_iter()
            .map(|(file_name, text_changes)| FileTextChanges {
                file_name,
                text_changes,
            })
            .collect()
    }
}
