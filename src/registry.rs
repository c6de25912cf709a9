//! Candidate action ranking and deduplication.
//!
//! Actions are collected per target-binding identity; inserting a
//! specifier-bearing action runs a pairwise dominance sweep against the
//! already-retained list. The specifier comparator is a partial order and
//! deliberately not transitive across mixed absolute/relative forms, so
//! the retained set is the product of the sweeps, never a global sort.

use crate::import_fixes::{ImportAction, ImportActionKind};
use crate::paths::is_external_module_name_relative;
use crate::program::BindingId;
use indexmap::IndexMap;

/// Outcome of comparing specifier `a` against specifier `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecifierComparison {
    /// `a` is preferable to `b`.
    Better,
    Equal,
    /// `b` is preferable to `a`.
    Worse,
}

/// Compare two module specifiers for ranking.
///
/// Identical strings are equal; a specifier that is a literal prefix of the
/// other wins (shorter and more general); between two explicit-relative
/// paths fewer separators wins; anything else (mixed absolute/relative
/// forms) is incomparable and treated as equal so both survive.
pub fn compare_module_specifiers(a: &str, b: &str) -> SpecifierComparison {
    if a == b {
        return SpecifierComparison::Equal;
    }
    if b.starts_with(a) {
        return SpecifierComparison::Better;
    }
    if a.starts_with(b) {
        return SpecifierComparison::Worse;
    }
    if is_external_module_name_relative(a) && is_external_module_name_relative(b) {
        let separators_a = a.matches('/').count();
        let separators_b = b.matches('/').count();
        return match separators_a.cmp(&separators_b) {
            std::cmp::Ordering::Less => SpecifierComparison::Better,
            std::cmp::Ordering::Equal => SpecifierComparison::Equal,
            std::cmp::Ordering::Greater => SpecifierComparison::Worse,
        };
    }
    SpecifierComparison::Equal
}

/// Retained candidate actions per target-binding identity, in discovery
/// order.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    actions: IndexMap<BindingId, Vec<ImportAction>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        ActionRegistry {
            actions: IndexMap::new(),
        }
    }

    /// Insert one action for `binding`, applying the dominance sweep.
    ///
    /// Reference rewrites are always kept and never compared. Otherwise the
    /// new action's specifier is compared pairwise against each retained
    /// one: a strictly better retained specifier drops the new action —
    /// unless the new action augments an existing statement, which stays
    /// available regardless since reusing that statement may still be
    /// preferable. Worse retained entries are dropped, equal ones kept.
    pub fn add(&mut self, binding: BindingId, action: ImportAction) {
        let list = self.actions.entry(binding).or_default();
        if action.kind == ImportActionKind::QualifyWithNamespace {
            list.push(action);
            return;
        }

        let mut retained: Vec<ImportAction> = Vec::with_capacity(list.len() + 1);
        for existing in list.iter() {
            if existing.kind == ImportActionKind::QualifyWithNamespace {
                retained.push(existing.clone());
                continue;
            }
            match compare_actions(existing, &action) {
                SpecifierComparison::Better => {
                    if action.kind != ImportActionKind::AugmentExistingImport {
                        // The new action is not worth considering; leave the
                        // retained list untouched.
                        return;
                    }
                    retained.push(existing.clone());
                }
                SpecifierComparison::Equal => retained.push(existing.clone()),
                SpecifierComparison::Worse => {}
            }
        }
        retained.push(action);
        *list = retained;
    }

    pub fn add_all(&mut self, binding: BindingId, actions: Vec<ImportAction>) {
        for action in actions {
            self.add(binding, action);
        }
    }

    /// All retained actions, in discovery order.
    pub fn into_actions(self) -> Vec<ImportAction> {
        self.actions.into_values().flatten().collect()
    }
}

fn compare_actions(existing: &ImportAction, new: &ImportAction) -> SpecifierComparison {
    match (
        existing.module_specifier.as_deref(),
        new.module_specifier.as_deref(),
    ) {
        (Some(a), Some(b)) => compare_module_specifiers(a, b),
        // A missing ranking key makes the pair incomparable.
        _ => SpecifierComparison::Equal,
    }
}
