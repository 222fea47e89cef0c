#![allow(dead_code)]

use semfix::actions::CodeAction;
use semfix::diagnostics::Diagnostic;
use semfix::semantic::{
    Compilation, CompilationBuilder, CoreLibrary, DocumentId, Operation, SymbolId, Ty, TypeKind,
};
use semfix::syntax::TextSpan;

/// Span of the first occurrence of `needle`.
pub fn span_of(source: &str, needle: &str) -> TextSpan {
    nth_span(source, needle, 0)
}

/// Span of the `n`th (0-based) occurrence of `needle`.
pub fn nth_span(source: &str, needle: &str, n: usize) -> TextSpan {
    let (start, _) = source
        .match_indices(needle)
        .nth(n)
        .unwrap_or_else(|| panic!("`{needle}` occurs fewer than {} times", n + 1));
    TextSpan::new(start, start + needle.len())
}

/// Span of `needle` inside the first occurrence of `context`.
pub fn span_in(source: &str, context: &str, needle: &str) -> TextSpan {
    let outer = span_of(source, context);
    let inner = span_of(context, needle);
    TextSpan::new(outer.start + inner.start, outer.start + inner.end)
}

pub struct Fixture {
    pub compilation: Compilation,
    pub corlib: CoreLibrary,
    pub document: DocumentId,
}

/// Builds a one-document compilation over the core library. `bind` adds the
/// symbols, bindings and operations the test needs.
pub fn compile(
    name: &str,
    source: &str,
    bind: impl FnOnce(&mut CompilationBuilder, &CoreLibrary, DocumentId),
) -> Fixture {
    let mut builder = CompilationBuilder::new();
    let corlib = CoreLibrary::install(&mut builder);
    let document = builder.add_document(name, source).expect("fixture parses");
    bind(&mut builder, &corlib, document);
    Fixture {
        compilation: builder.build(),
        corlib,
        document,
    }
}

/// `operation` boxed to `object` by an implicit conversion.
pub fn boxed(operation: Operation, corlib: &CoreLibrary) -> Operation {
    Operation::conversion(operation, corlib.object_ty(), true)
}

/// Adds `class C` with a method `name` to the global namespace.
pub fn class_with_method(builder: &mut CompilationBuilder, name: &str) -> (SymbolId, SymbolId) {
    let global = builder.global_namespace();
    let class = builder.add_type(global, "C", TypeKind::Class);
    let method = builder.add_method(class, name, Vec::new(), false);
    (class, method)
}

pub const OBJECT_EQUALS_INT: &str =
    "\nclass C\n{\n    bool M(object o)\n    {\n        return o.Equals(1);\n    }\n}";

/// `o.Equals(1)` with `o` an `object` parameter.
pub fn object_equals_int() -> Fixture {
    let source = OBJECT_EQUALS_INT;
    compile("a.cs", source, |builder, corlib, document| {
        let (_, method) = class_with_method(builder, "M");
        let o = builder.add_parameter(method, "o", corlib.object_ty());
        builder.add_operation(
            document,
            Operation::invocation(
                span_of(source, "o.Equals(1)"),
                corlib.object_equals,
                Some(Operation::parameter_reference(
                    span_in(source, "o.Equals", "o"),
                    o,
                    corlib.object_ty(),
                )),
                vec![boxed(
                    Operation::literal(span_in(source, "(1)", "1"), corlib.int_ty()),
                    corlib,
                )],
            ),
        );
    })
}

pub const GENERIC_EQUALS: &str =
    "class C\n{\n    bool M<T>(T a, T b)\n    {\n        return a.Equals(b);\n    }\n}\n";

/// `a.Equals(b)` on an unconstrained method type parameter `T`.
pub fn generic_equals() -> Fixture {
    let source = GENERIC_EQUALS;
    compile("a.cs", source, |builder, corlib, document| {
        let (_, method) = class_with_method(builder, "M");
        let t = builder.add_type_parameter(method, "T");
        builder.add_declaration(t, document, span_in(source, "<T>", "T"));
        let a = builder.add_parameter(method, "a", Ty::param(t));
        let b = builder.add_parameter(method, "b", Ty::param(t));
        builder.add_operation(
            document,
            Operation::invocation(
                span_of(source, "a.Equals(b)"),
                corlib.object_equals,
                Some(Operation::parameter_reference(
                    span_in(source, "a.Equals", "a"),
                    a,
                    Ty::param(t),
                )),
                vec![boxed(
                    Operation::parameter_reference(
                        span_in(source, "(b)", "b"),
                        b,
                        Ty::param(t),
                    ),
                    corlib,
                )],
            ),
        );
    })
}

/// `path:row:col: level: code: message`, one line per diagnostic.
pub fn render(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| {
            format!(
                "{}:{}:{}: {}: {}: {}",
                d.file.as_deref().unwrap_or("<unknown>"),
                d.span.start.row,
                d.span.start.column,
                d.level.as_str(),
                d.code(),
                d.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Applies `action` and returns the new text of `document`.
pub fn applied_text(action: &CodeAction<'_>, document: DocumentId) -> String {
    let changes = action.apply().expect("action produces an edit");
    changes
        .text(document)
        .expect("action edits the document")
        .to_string()
}
