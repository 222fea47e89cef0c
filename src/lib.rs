//! Core semfix engine: finds calls that bind to the weakly typed
//! `Object.Equals` overloads in a bound C# or Visual Basic compilation and
//! offers strongly typed rewrites, plus a static import refactor.
//!
//! The engine works on any `SemanticModel`. `Compilation` is the in-memory
//! model the CLI loads from a JSON snapshot.

pub mod actions;
pub mod cli;
pub mod config;
pub mod context;
pub mod diagnostics;
pub mod error;
pub mod fix;
pub mod fixes;
pub mod frontend;
pub mod imports;
pub mod lang;
pub mod level;
pub mod lint;
pub mod refactor;
pub mod rules;
pub mod semantic;
pub mod simplify;
pub mod snapshot;
pub mod syntax;
pub mod telemetry;

use itertools::Itertools;
use tracing::debug;

pub use crate::actions::{CancellationToken, ChangeSet, CodeAction};
pub use crate::context::{AnalysisContext, FixOptions};

use crate::diagnostics::Diagnostic;
use crate::error::SemfixResult;
use crate::lint::{LintContext, LintRegistry, LintSettings};
use crate::semantic::{DocumentId, SemanticModel};
use crate::syntax::{SyntaxKind, SyntaxNode, SyntaxTree, TextSpan};

/// Engine orchestrates analysis by running registered rules over bound
/// invocations and hands out their code actions.
pub struct AnalysisEngine {
    registry: LintRegistry,
    settings: LintSettings,
    options: FixOptions,
}

impl AnalysisEngine {
    /// Create a new engine with default lint settings.
    pub fn new(registry: LintRegistry) -> Self {
        Self {
            registry,
            settings: LintSettings::default(),
            options: FixOptions::default(),
        }
    }

    /// Create a new engine with explicit lint settings (e.g. from config).
    pub fn new_with_settings(registry: LintRegistry, settings: LintSettings) -> Self {
        Self {
            registry,
            settings,
            options: FixOptions::default(),
        }
    }

    #[must_use]
    pub fn with_fix_options(mut self, options: FixOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &LintRegistry {
        &self.registry
    }

    /// Per-compilation state shared by every request against `model`.
    pub fn on_compilation_ready<'m>(&self, model: &'m dyn SemanticModel) -> AnalysisContext<'m> {
        AnalysisContext::new(model, self.settings.clone(), self.options.clone())
    }

    /// Diagnostics for one bound invocation of `document`.
    pub fn on_invocation_encountered(
        &self,
        analysis: &AnalysisContext<'_>,
        document: DocumentId,
        invocation: SyntaxNode<'_>,
    ) -> Vec<Diagnostic> {
        let Some(document) = analysis.document(document) else {
            return Vec::new();
        };
        let mut ctx = LintContext::new(document, analysis.settings());
        for rule in self.registry.rules() {
            rule.check_invocation(analysis, invocation, &mut ctx);
        }
        ctx.into_diagnostics()
    }

    /// Fixes offered for `diagnostic`, in presentation order.
    pub fn on_fix_requested<'a>(
        &self,
        analysis: &'a AnalysisContext<'a>,
        diagnostic: &Diagnostic,
    ) -> Vec<CodeAction<'a>> {
        match self.registry.get(diagnostic.lint.name) {
            Some(rule) => rule.fixes(analysis, diagnostic),
            None => Vec::new(),
        }
    }

    /// Refactors offered for a selection.
    pub fn on_refactor_requested<'a>(
        &self,
        analysis: &'a AnalysisContext<'a>,
        document: DocumentId,
        selection: TextSpan,
    ) -> Vec<CodeAction<'a>> {
        refactor::static_import_actions(analysis, document, selection)
    }

    /// Runs every rule on every invocation of `document`. Generated
    /// documents produce nothing.
    pub fn analyze_document(
        &self,
        analysis: &AnalysisContext<'_>,
        document: DocumentId,
    ) -> Vec<Diagnostic> {
        let Some(source) = analysis.document(document) else {
            return Vec::new();
        };
        if source.is_generated() {
            debug!(document = %source.name, "skipping generated document");
            return Vec::new();
        }
        crate::instrument_block!("analyze_document", {
            source
                .tree
                .nodes()
                .filter(|node| node.kind() == SyntaxKind::InvocationExpression)
                .flat_map(|invocation| {
                    self.on_invocation_encountered(analysis, document, invocation)
                })
                .collect::<Vec<_>>()
        })
    }

    /// Analyzes all documents, spread over scoped threads, and returns the
    /// diagnostics ordered by document and position.
    pub fn analyze(&self, analysis: &AnalysisContext<'_>) -> Vec<Diagnostic> {
        let documents = analysis.model().documents();
        if documents.is_empty() {
            return Vec::new();
        }
        let workers = std::thread::available_parallelism().map_or(1, |n| n.get());
        let chunk_size = documents.len().div_ceil(workers);

        let diagnostics: Vec<Diagnostic> = std::thread::scope(|scope| {
            let handles: Vec<_> = documents
                .chunks(chunk_size)
                .map(|chunk| {
                    scope.spawn(move || {
                        chunk
                            .iter()
                            .flat_map(|document| self.analyze_document(analysis, document.id))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|handle| {
                    handle
                        .join()
                        .unwrap_or_else(|payload| std::panic::resume_unwind(payload))
                })
                .collect()
        });

        diagnostics
            .into_iter()
            .sorted_by_key(|d| (d.document, d.location.start, d.location.end))
            .collect()
    }

    /// Applies the fix named by `equivalence_key` to every diagnostic of
    /// `document`. See `fixes::fix_all`.
    pub fn fix_all<'a>(
        &self,
        analysis: &'a AnalysisContext<'a>,
        document: DocumentId,
        diagnostics: &[Diagnostic],
        equivalence_key: &str,
    ) -> SemfixResult<Option<SyntaxTree>> {
        fixes::fix_all(
            analysis,
            &self.registry,
            document,
            diagnostics,
            equivalence_key,
        )
    }
}

/// Construct an `AnalysisEngine` with all built-in lints enabled.
pub fn create_default_engine() -> AnalysisEngine {
    AnalysisEngine::new(LintRegistry::default_rules())
}
