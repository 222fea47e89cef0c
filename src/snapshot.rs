//! JSON interchange format for a bound compilation.
//!
//! A snapshot carries the document texts, the symbol table, name bindings
//! and bound operation trees. Loading parses every document with the front
//! end and rejects references to symbols, documents or text ranges that do
//! not exist.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SemfixError, SemfixResult};
use crate::semantic::{
    Compilation, CompilationBuilder, DocumentId, Operation, SemanticModel, Symbol, SymbolId,
};
use crate::syntax::{Language, TextSpan};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompilationSnapshot {
    pub documents: Vec<DocumentEntry>,
    #[serde(default)]
    pub symbols: Vec<Symbol>,
    #[serde(default)]
    pub bindings: Vec<BindingEntry>,
    #[serde(default)]
    pub operations: Vec<OperationEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentEntry {
    pub name: String,
    /// Inferred from the name's extension when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingEntry {
    pub document: DocumentId,
    pub span: TextSpan,
    pub symbol: SymbolId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationEntry {
    pub document: DocumentId,
    pub operation: Operation,
}

impl CompilationSnapshot {
    pub fn from_json(json: &str) -> SemfixResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> SemfixResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json).map_err(|err| {
            SemfixError::snapshot(format!("{}: {}", path.display(), snapshot_message(err)))
        })
    }

    pub fn to_json_pretty(&self) -> SemfixResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Captures everything needed to rebuild `compilation`.
    pub fn from_compilation(compilation: &Compilation) -> Self {
        Self {
            documents: compilation
                .documents()
                .iter()
                .map(|document| DocumentEntry {
                    name: document.name.clone(),
                    language: Some(document.language()),
                    text: document.text().to_string(),
                })
                .collect(),
            symbols: compilation.symbols().to_vec(),
            bindings: compilation
                .bindings()
                .iter()
                .map(|&(document, span, symbol)| BindingEntry {
                    document,
                    span,
                    symbol,
                })
                .collect(),
            operations: compilation
                .operation_roots()
                .iter()
                .map(|(document, operation)| OperationEntry {
                    document: *document,
                    operation: operation.clone(),
                })
                .collect(),
        }
    }

    pub fn into_compilation(self) -> SemfixResult<Compilation> {
        let symbol_count = self.symbols.len();
        let document_count = self.documents.len();
        let check_symbol = |id: SymbolId, context: &dyn Fn() -> String| {
            if id.index() < symbol_count {
                Ok(())
            } else {
                Err(SemfixError::snapshot(format!(
                    "{} refers to unknown symbol {id}",
                    context()
                )))
            }
        };
        let check_document = |id: DocumentId, context: &dyn Fn() -> String| {
            if id.index() < document_count {
                Ok(())
            } else {
                Err(SemfixError::snapshot(format!(
                    "{} refers to unknown document {id}",
                    context()
                )))
            }
        };

        for (index, symbol) in self.symbols.iter().enumerate() {
            let context = || format!("symbol #{index} `{}`", symbol.name);
            for reference in symbol.references() {
                check_symbol(reference, &context)?;
            }
            for declaration in &symbol.declarations {
                check_document(declaration.document, &context)?;
            }
        }

        let mut builder = CompilationBuilder::from_symbols(self.symbols);
        let mut lengths = Vec::with_capacity(document_count);
        for entry in self.documents {
            let language = match entry.language {
                Some(language) => language,
                None => Language::from_path(&entry.name).ok_or_else(|| {
                    SemfixError::snapshot(format!(
                        "cannot infer the language of `{}`; set `language`",
                        entry.name
                    ))
                })?,
            };
            lengths.push(entry.text.len());
            builder.add_document_with_language(entry.name, language, &entry.text)?;
        }
        let check_span = |document: DocumentId, span: TextSpan, context: &dyn Fn() -> String| {
            check_document(document, context)?;
            if span.start <= span.end && span.end <= lengths[document.index()] {
                Ok(())
            } else {
                Err(SemfixError::snapshot(format!(
                    "{} has span {span} outside document {document}",
                    context()
                )))
            }
        };

        for (index, binding) in self.bindings.iter().enumerate() {
            let context = || format!("binding #{index}");
            check_span(binding.document, binding.span, &context)?;
            check_symbol(binding.symbol, &context)?;
            builder.bind(binding.document, binding.span, binding.symbol);
        }

        for (index, entry) in self.operations.into_iter().enumerate() {
            let context = || format!("operation #{index}");
            let mut spans = Vec::new();
            entry.operation.walk(&mut |operation| spans.push(operation.span));
            for span in spans {
                check_span(entry.document, span, &context)?;
            }
            for reference in entry.operation.references() {
                check_symbol(reference, &context)?;
            }
            builder.add_operation(entry.document, entry.operation);
        }

        let compilation = builder.build();
        debug!(
            documents = compilation.documents().len(),
            symbols = compilation.symbols().len(),
            "loaded compilation snapshot"
        );
        Ok(compilation)
    }
}

fn snapshot_message(err: SemfixError) -> String {
    match err {
        SemfixError::Snapshot(message) => message,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::{CoreLibrary, SemanticModel};

    fn sample() -> (Compilation, CoreLibrary) {
        let source = "class C\n{\n    void M()\n    {\n        Console.WriteLine(\"a\");\n    }\n}\n";
        let mut builder = CompilationBuilder::new();
        let corlib = CoreLibrary::install(&mut builder);
        let document = builder.add_document("a.cs", source).unwrap();
        let start = source.find("Console").unwrap();
        builder.bind(document, TextSpan::new(start, start + 7), corlib.console);
        let literal = source.find("\"a\"").unwrap();
        builder.add_operation(
            document,
            Operation::invocation(
                TextSpan::new(start, literal + 4),
                corlib.console_write_line,
                None,
                vec![Operation::literal(
                    TextSpan::new(literal, literal + 3),
                    corlib.string_ty(),
                )],
            ),
        );
        (builder.build(), corlib)
    }

    #[test]
    fn compilation_survives_a_json_round_trip() {
        let (compilation, corlib) = sample();
        let json = CompilationSnapshot::from_compilation(&compilation)
            .to_json_pretty()
            .unwrap();
        let restored = CompilationSnapshot::from_json(&json)
            .unwrap()
            .into_compilation()
            .unwrap();

        let document = restored.document_by_name("a.cs").unwrap();
        assert_eq!(document.text(), compilation.documents()[0].text());
        assert_eq!(restored.symbols(), compilation.symbols());
        let start = document.text().find("Console").unwrap();
        assert_eq!(
            restored.symbol_info(document.id, TextSpan::new(start, start + 7)),
            Some(corlib.console)
        );
        assert_eq!(restored.operation_roots(), compilation.operation_roots());
    }

    #[test]
    fn language_defaults_to_the_extension() {
        let json = r#"{"documents": [{"name": "m.vb", "text": "Module M\nEnd Module\n"}]}"#;
        let compilation = CompilationSnapshot::from_json(json)
            .unwrap()
            .into_compilation()
            .unwrap();
        assert_eq!(
            compilation.documents()[0].language(),
            Language::VisualBasic
        );
    }

    #[test]
    fn dangling_references_are_rejected() {
        let (compilation, _) = sample();
        let mut snapshot = CompilationSnapshot::from_compilation(&compilation);
        snapshot.bindings[0].symbol = SymbolId::new(10_000);
        let err = snapshot.into_compilation().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid compilation snapshot: binding #0 refers to unknown symbol #10000"
        );
    }

    #[test]
    fn spans_past_the_document_end_are_rejected() {
        let (compilation, _) = sample();
        let mut snapshot = CompilationSnapshot::from_compilation(&compilation);
        snapshot.operations[0].operation.span = TextSpan::new(0, 5_000);
        let err = snapshot.into_compilation().unwrap_err();
        assert!(err.to_string().contains("operation #0 has span 0..5000"));
    }

    #[test]
    fn unknown_extensions_need_an_explicit_language() {
        let json = r#"{"documents": [{"name": "notes.txt", "text": ""}]}"#;
        let err = CompilationSnapshot::from_json(json)
            .unwrap()
            .into_compilation()
            .unwrap_err();
        assert!(matches!(err, SemfixError::Snapshot(_)));
    }
}
