//! Code fixes for `equals_object` diagnostics, one at a time or for a whole
//! document at once.

mod rewrite;
mod strategy;

pub use strategy::{FixStrategy, select_strategies};

use tracing::{debug, info};

use crate::actions::{ChangeSet, CodeAction};
use crate::context::AnalysisContext;
use crate::diagnostics::Diagnostic;
use crate::error::SemfixResult;
use crate::fix::{TextEdit, apply_fixes, text_edits};
use crate::frontend::parse_document;
use crate::lint::LintRegistry;
use crate::rules::ResolvedCallSite;
use crate::semantic::DocumentId;
use crate::syntax::{SyntaxKind, SyntaxTree};

/// Title and equivalence key of the comparer fix.
pub const USE_TYPED_COMPARER: &str = "Use EqualityComparer<T>.Default";
/// Title and equivalence key of the constraint fix.
pub const ADD_EQUATABLE_CONSTRAINT: &str = "Add IEquatable<T> constraint";

/// The fixes for one diagnostic, comparer first.
///
/// The invocation is re-located from the diagnostic's additional location;
/// if it moved or no longer binds the same way, nothing is offered.
pub fn equality_fixes<'a>(
    analysis: &'a AnalysisContext<'a>,
    diagnostic: &Diagnostic,
) -> Vec<CodeAction<'a>> {
    let model = analysis.model();
    let Some(document) = analysis.document(diagnostic.document) else {
        return Vec::new();
    };
    let Some(&location) = diagnostic.additional_locations.first() else {
        return Vec::new();
    };
    let Some(invocation) = document
        .tree
        .node_at(location, SyntaxKind::InvocationExpression)
    else {
        debug!(document = %document.name, span = %location, "stale diagnostic location");
        return Vec::new();
    };
    let Some(site) = ResolvedCallSite::resolve(model, document.id, invocation) else {
        return Vec::new();
    };

    let mut actions = Vec::new();
    for strategy in select_strategies(model, &site) {
        match strategy {
            FixStrategy::UseTypedComparer(ty) => {
                if rewrite::operand_syntax(&document.tree, &site).is_none() {
                    debug!(
                        document = %document.name,
                        invocation = %location,
                        "receiver lies outside the invocation"
                    );
                    continue;
                }
                actions.push(CodeAction::new(
                    USE_TYPED_COMPARER,
                    USE_TYPED_COMPARER,
                    move |cancel| {
                        let tree =
                            rewrite::use_typed_comparer(analysis, document, location, &ty, cancel)?;
                        Some(ChangeSet::single(document.id, tree))
                    },
                ));
            }
            FixStrategy::AddConstraint {
                type_parameter,
                declaration,
            } => actions.push(CodeAction::new(
                ADD_EQUATABLE_CONSTRAINT,
                ADD_EQUATABLE_CONSTRAINT,
                move |cancel| {
                    rewrite::add_equatable_constraint(analysis, type_parameter, declaration, cancel)
                },
            )),
        }
    }
    actions
}

/// Applies the fix with `equivalence_key` to every diagnostic of `document`
/// in one pass.
///
/// Each fix is computed against the original tree and turned into text
/// edits. Identical edits (the shared import directive) are kept once; an
/// edit overlapping one already taken is skipped along with the rest of its
/// fix. Fixes that touch other documents are left out. Returns `None` when
/// no fix applied.
pub fn fix_all<'a>(
    analysis: &'a AnalysisContext<'a>,
    registry: &LintRegistry,
    document: DocumentId,
    diagnostics: &[Diagnostic],
    equivalence_key: &str,
) -> SemfixResult<Option<SyntaxTree>> {
    let Some(source) = analysis.document(document) else {
        return Ok(None);
    };
    let original = &source.tree;

    let mut accepted: Vec<TextEdit> = Vec::new();
    let mut applied = 0usize;
    for diagnostic in diagnostics.iter().filter(|d| d.document == document) {
        let Some(rule) = registry.get(diagnostic.lint.name) else {
            continue;
        };
        let Some(changes) = rule
            .fixes(analysis, diagnostic)
            .into_iter()
            .find(|action| action.equivalence_key == equivalence_key)
            .and_then(|action| action.apply())
        else {
            continue;
        };
        if changes.len() != 1 {
            debug!(document = %source.name, "skipping multi-document fix");
            continue;
        }
        let Some(fixed) = changes.get(document) else {
            continue;
        };

        let edits: Vec<TextEdit> = text_edits(original, fixed)
            .into_iter()
            .filter(|edit| !accepted.contains(edit))
            .collect();
        if edits
            .iter()
            .any(|edit| accepted.iter().any(|taken| taken.overlaps_with(edit)))
        {
            debug!(
                document = %source.name,
                location = %diagnostic.location,
                "fix overlaps an earlier one; skipped"
            );
            continue;
        }
        accepted.extend(edits);
        applied += 1;
    }

    if accepted.is_empty() {
        return Ok(None);
    }
    let text = apply_fixes(original.text(), &accepted)?;
    info!(document = %source.name, fixes = applied, edits = accepted.len(), "applied fix-all");
    parse_document(&source.name, original.language(), &text).map(Some)
}
