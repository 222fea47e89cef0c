use std::sync::{Arc, OnceLock};

use tracing::warn;

use crate::imports::ImportStrategy;
use crate::lint::LintSettings;
use crate::rules::CanonicalEqualityMethods;
use crate::semantic::{Document, DocumentId, SemanticModel};
use crate::simplify::ReferenceSimplifier;

/// How fixes and refactors spell the references they introduce.
#[derive(Clone, Default)]
pub struct FixOptions {
    pub import_strategy: ImportStrategy,
    pub simplifier: Option<Arc<dyn ReferenceSimplifier>>,
}

impl std::fmt::Debug for FixOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixOptions")
            .field("import_strategy", &self.import_strategy)
            .field("simplifier", &self.simplifier.is_some())
            .finish()
    }
}

/// Per-compilation analysis state.
///
/// Created once when a compilation is ready and shared by every analysis,
/// fix and refactor request against it, across threads.
pub struct AnalysisContext<'m> {
    model: &'m dyn SemanticModel,
    settings: LintSettings,
    options: FixOptions,
    canonical: OnceLock<Option<CanonicalEqualityMethods>>,
}

impl<'m> AnalysisContext<'m> {
    pub fn new(model: &'m dyn SemanticModel, settings: LintSettings, options: FixOptions) -> Self {
        Self {
            model,
            settings,
            options,
            canonical: OnceLock::new(),
        }
    }

    pub fn model(&self) -> &'m dyn SemanticModel {
        self.model
    }

    pub fn document(&self, id: DocumentId) -> Option<&'m Document> {
        self.model.document(id)
    }

    pub fn settings(&self) -> &LintSettings {
        &self.settings
    }

    pub fn options(&self) -> &FixOptions {
        &self.options
    }

    /// The simplifier, when configured and provided.
    pub fn simplifier(&self) -> Option<&dyn ReferenceSimplifier> {
        match self.options.import_strategy {
            ImportStrategy::Simplifier => self.options.simplifier.as_deref(),
            ImportStrategy::Explicit => None,
        }
    }

    /// Resolved on first use; `None` keeps the equality rule inert for this
    /// compilation.
    pub fn canonical_equality_methods(&self) -> Option<&CanonicalEqualityMethods> {
        self.canonical
            .get_or_init(|| {
                let resolved = CanonicalEqualityMethods::resolve(self.model);
                if resolved.is_none() {
                    warn!("System.Object.Equals overloads not found; equals_object is inert");
                }
                resolved
            })
            .as_ref()
    }
}
