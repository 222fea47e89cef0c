use std::collections::HashMap;

use crate::actions::CodeAction;
use crate::context::AnalysisContext;
use crate::diagnostics::{Diagnostic, Span};
use crate::error::{SemfixError, SemfixResult};
use crate::level::LintLevel;
use crate::semantic::Document;
use crate::syntax::{SyntaxNode, TextSpan};

// ============================================================================
// Fix Safety Classification
// ============================================================================

/// Safety classification for auto-fixes.
///
/// - `Safe` fixes preserve runtime behavior exactly
/// - `Unsafe` fixes may change runtime behavior and require explicit opt-in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FixSafety {
    #[default]
    Safe,
    Unsafe,
}

impl FixSafety {
    pub fn as_str(&self) -> &'static str {
        match self {
            FixSafety::Safe => "safe",
            FixSafety::Unsafe => "unsafe",
        }
    }
}

/// Descriptor for the code fixes associated with a lint rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixDescriptor {
    /// Whether a fix is available for this lint.
    pub available: bool,
    pub safety: FixSafety,
    /// Human-readable description of what the fixes do.
    pub description: &'static str,
}

impl FixDescriptor {
    pub const fn safe(description: &'static str) -> Self {
        Self {
            available: true,
            safety: FixSafety::Safe,
            description,
        }
    }
}

// ============================================================================
// Lint Categories
// ============================================================================

/// High-level categories used to group lints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LintCategory {
    /// Code that works but hides a cost or a correctness trap.
    CodeQuality,
    Refactoring,
}

impl LintCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LintCategory::CodeQuality => "code-quality",
            LintCategory::Refactoring => "refactoring",
        }
    }
}

/// Static metadata describing a lint rule.
#[derive(Debug)]
pub struct LintDescriptor {
    pub name: &'static str,
    /// Stable diagnostic identifier, e.g. `APC0001`.
    pub code: &'static str,
    pub title: &'static str,
    pub category: LintCategory,
    pub description: &'static str,
    /// The message every diagnostic of this lint carries.
    pub message: &'static str,
    pub fix: FixDescriptor,
}

/// A lint rule that inspects bound invocations.
pub trait LintRule: Send + Sync {
    fn descriptor(&self) -> &'static LintDescriptor;

    fn check_invocation(
        &self,
        analysis: &AnalysisContext<'_>,
        invocation: SyntaxNode<'_>,
        ctx: &mut LintContext<'_>,
    );

    /// Code actions for one of this rule's diagnostics.
    fn fixes<'a>(
        &self,
        _analysis: &'a AnalysisContext<'a>,
        _diagnostic: &Diagnostic,
    ) -> Vec<CodeAction<'a>> {
        Vec::new()
    }
}

/// Per-lint configuration derived from `semfix.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintSettings {
    levels: HashMap<String, LintLevel>,
}

impl LintSettings {
    #[must_use]
    pub fn with_config_levels(mut self, levels: HashMap<String, LintLevel>) -> Self {
        self.levels.extend(levels);
        self
    }

    #[must_use]
    pub fn disable(mut self, disabled: impl IntoIterator<Item = String>) -> Self {
        for name in disabled {
            self.levels.insert(name, LintLevel::Allow);
        }
        self
    }

    pub fn level_for(&self, lint_name: &str) -> LintLevel {
        self.levels.get(lint_name).copied().unwrap_or_default()
    }

    /// Level for a lint configured either by name or by code.
    pub fn level_for_lint(&self, lint: &LintDescriptor) -> LintLevel {
        self.levels
            .get(lint.name)
            .or_else(|| self.levels.get(lint.code))
            .copied()
            .unwrap_or_default()
    }
}

/// Mutable context passed to lint rules while analyzing one document.
pub struct LintContext<'a> {
    document: &'a Document,
    settings: &'a LintSettings,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> LintContext<'a> {
    pub fn new(document: &'a Document, settings: &'a LintSettings) -> Self {
        Self {
            document,
            settings,
            diagnostics: Vec::new(),
        }
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn settings(&self) -> &LintSettings {
        self.settings
    }

    pub fn report(
        &mut self,
        lint: &'static LintDescriptor,
        location: TextSpan,
        additional_locations: Vec<TextSpan>,
    ) {
        let level = self.settings.level_for_lint(lint);
        if level == LintLevel::Allow {
            return;
        }

        self.diagnostics.push(Diagnostic {
            lint,
            level,
            document: self.document.id,
            file: Some(self.document.name.clone()),
            location,
            span: Span::from_text_span(self.document.text(), location),
            additional_locations,
            message: lint.message.to_string(),
            help: (!lint.fix.description.is_empty()).then(|| lint.fix.description.to_string()),
        });
    }

    #[must_use]
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Registry of the lint rules an engine runs.
pub struct LintRegistry {
    rules: Vec<Box<dyn LintRule>>,
}

impl Default for LintRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LintRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    #[must_use]
    pub fn with_rule(mut self, rule: impl LintRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn rules(&self) -> impl Iterator<Item = &Box<dyn LintRule>> {
        self.rules.iter()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &'static LintDescriptor> + '_ {
        self.rules.iter().map(|r| r.descriptor())
    }

    /// Finds a rule by lint name or diagnostic code.
    pub fn get(&self, name_or_code: &str) -> Option<&dyn LintRule> {
        self.rules
            .iter()
            .find(|rule| {
                let d = rule.descriptor();
                d.name == name_or_code || d.code.eq_ignore_ascii_case(name_or_code)
            })
            .map(|rule| rule.as_ref())
    }

    pub fn find_descriptor(&self, name_or_code: &str) -> Option<&'static LintDescriptor> {
        self.get(name_or_code).map(|rule| rule.descriptor())
    }

    #[must_use = "registry should be used to create an engine"]
    pub fn default_rules() -> Self {
        Self::new().with_rule(crate::rules::EqualsObjectLint)
    }

    /// Default rules restricted by `only` and `skip`.
    ///
    /// # Errors
    ///
    /// Returns error if any lint name in `only` or `skip` is unknown.
    pub fn default_rules_filtered(only: &[String], skip: &[String]) -> SemfixResult<Self> {
        let all = Self::default_rules();
        for name in only.iter().chain(skip) {
            if all.get(name).is_none() {
                return Err(SemfixError::other(format!("unknown lint: {name}")));
            }
        }

        let selected = |rule: &dyn LintRule| {
            let d = rule.descriptor();
            let named = |names: &[String]| {
                names
                    .iter()
                    .any(|n| n == d.name || n.eq_ignore_ascii_case(d.code))
            };
            (only.is_empty() || named(only)) && !named(skip)
        };

        let rules = all
            .rules
            .into_iter()
            .filter(|rule| selected(rule.as_ref()))
            .collect();
        Ok(Self { rules })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_finds_rules_by_name_or_code() {
        let registry = LintRegistry::default_rules();
        assert_eq!(
            registry.find_descriptor("equals_object").map(|d| d.code),
            Some("APC0001")
        );
        assert_eq!(
            registry.find_descriptor("apc0001").map(|d| d.name),
            Some("equals_object")
        );
        assert!(registry.get("no_such_lint").is_none());
    }

    #[test]
    fn filtering_rejects_unknown_names() {
        let err = LintRegistry::default_rules_filtered(&["nope".to_string()], &[])
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "unknown lint: nope");

        let skipped =
            LintRegistry::default_rules_filtered(&[], &["APC0001".to_string()]).unwrap();
        assert_eq!(skipped.descriptors().count(), 0);
    }

    #[test]
    fn settings_accept_names_and_codes() {
        let lint = &crate::rules::EQUALS_OBJECT;
        let settings = LintSettings::default();
        assert_eq!(settings.level_for_lint(lint), LintLevel::Warn);

        let by_code = LintSettings::default()
            .with_config_levels(HashMap::from([("APC0001".to_string(), LintLevel::Error)]));
        assert_eq!(by_code.level_for_lint(lint), LintLevel::Error);

        let disabled = by_code.disable(["equals_object".to_string()]);
        assert_eq!(disabled.level_for_lint(lint), LintLevel::Allow);
    }
}
