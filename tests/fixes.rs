mod support;

use semfix::actions::CancellationToken;
use semfix::create_default_engine;
use semfix::fixes::{ADD_EQUATABLE_CONSTRAINT, USE_TYPED_COMPARER};
use semfix::imports::ImportStrategy;
use semfix::lint::LintRegistry;
use semfix::semantic::{CompilationBuilder, CoreLibrary, Operation, Ty, TypeKind};
use semfix::simplify::ScopeSimplifier;
use semfix::syntax::TextSpan;
use semfix::{AnalysisEngine, FixOptions};
use std::sync::Arc;
use support::{
    applied_text, boxed, class_with_method, compile, generic_equals, object_equals_int, span_in,
    span_of,
};

fn titles(actions: &[semfix::CodeAction<'_>]) -> Vec<String> {
    actions.iter().map(|action| action.title.clone()).collect()
}

#[test]
fn comparer_fix_rewrites_instance_call_and_imports_namespace() {
    let fixture = object_equals_int();
    let engine = create_default_engine();
    let analysis = engine.on_compilation_ready(&fixture.compilation);
    let diagnostics = engine.analyze(&analysis);

    let actions = engine.on_fix_requested(&analysis, &diagnostics[0]);
    assert_eq!(titles(&actions), vec![USE_TYPED_COMPARER]);
    assert_eq!(actions[0].equivalence_key, USE_TYPED_COMPARER);
    assert_eq!(
        applied_text(&actions[0], fixture.document),
        "\nusing System.Collections.Generic;\n\nclass C\n{\n    bool M(object o)\n    {\n        return EqualityComparer<object>.Default.Equals(o, 1);\n    }\n}"
    );
}

#[test]
fn comparer_fix_rewrites_static_call() {
    let source = "using System.Collections.Generic;\n\nclass C\n{\n    bool M(object o)\n    {\n        return object.Equals(o, 1);\n    }\n}\n";
    let fixture = compile("a.cs", source, |builder, corlib, document| {
        let (_, method) = class_with_method(builder, "M");
        let o = builder.add_parameter(method, "o", corlib.object_ty());
        builder.add_operation(
            document,
            Operation::invocation(
                span_of(source, "object.Equals(o, 1)"),
                corlib.object_static_equals,
                None,
                vec![
                    Operation::parameter_reference(
                        span_in(source, "(o, 1)", "o"),
                        o,
                        corlib.object_ty(),
                    ),
                    boxed(
                        Operation::literal(span_in(source, "(o, 1)", "1"), corlib.int_ty()),
                        corlib,
                    ),
                ],
            ),
        );
    });
    let engine = create_default_engine();
    let analysis = engine.on_compilation_ready(&fixture.compilation);
    let diagnostics = engine.analyze(&analysis);

    let actions = engine.on_fix_requested(&analysis, &diagnostics[0]);
    assert_eq!(titles(&actions), vec![USE_TYPED_COMPARER]);
    let fixed = applied_text(&actions[0], fixture.document);
    assert_eq!(
        fixed,
        "using System.Collections.Generic;\n\nclass C\n{\n    bool M(object o)\n    {\n        return EqualityComparer<object>.Default.Equals(o, 1);\n    }\n}\n"
    );
    assert_eq!(fixed.matches("using System.Collections.Generic;").count(), 1);
}

#[test]
fn comparer_fix_honors_a_namespace_level_using() {
    let source = "namespace App\n{\n    using System.Collections.Generic;\n\n    class C\n    {\n        bool M(object o)\n        {\n            return o.Equals(1);\n        }\n    }\n}\n";
    let fixture = compile("a.cs", source, |builder, corlib, document| {
        let app = builder.namespace("App");
        let class = builder.add_type(app, "C", TypeKind::Class);
        let method = builder.add_method(class, "M", vec![corlib.object_ty()], false);
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
    });
    let engine = create_default_engine();
    let analysis = engine.on_compilation_ready(&fixture.compilation);
    let diagnostics = engine.analyze(&analysis);

    let actions = engine.on_fix_requested(&analysis, &diagnostics[0]);
    let fixed = applied_text(&actions[0], fixture.document);
    assert_eq!(
        fixed,
        "namespace App\n{\n    using System.Collections.Generic;\n\n    class C\n    {\n        bool M(object o)\n        {\n            return EqualityComparer<object>.Default.Equals(o, 1);\n        }\n    }\n}\n"
    );
    assert_eq!(fixed.matches("using System.Collections.Generic;").count(), 1);
}

#[test]
fn type_parameter_gets_comparer_then_constraint() {
    let fixture = generic_equals();
    let engine = create_default_engine();
    let analysis = engine.on_compilation_ready(&fixture.compilation);
    let diagnostics = engine.analyze(&analysis);

    let actions = engine.on_fix_requested(&analysis, &diagnostics[0]);
    assert_eq!(
        titles(&actions),
        vec![USE_TYPED_COMPARER, ADD_EQUATABLE_CONSTRAINT]
    );
    assert_eq!(
        applied_text(&actions[0], fixture.document),
        "using System.Collections.Generic;\n\nclass C\n{\n    bool M<T>(T a, T b)\n    {\n        return EqualityComparer<T>.Default.Equals(a, b);\n    }\n}\n"
    );
    assert_eq!(
        applied_text(&actions[1], fixture.document),
        "using System;\n\nclass C\n{\n    bool M<T>(T a, T b) where T : IEquatable<T>\n    {\n        return a.Equals(b);\n    }\n}\n"
    );
}

#[test]
fn constraint_lands_in_the_declaring_document_only() {
    let declaring = "partial class C\n{\n    partial bool M<T>(T a, T b);\n}\n";
    let calling = "partial class C\n{\n    partial bool M<T>(T a, T b)\n    {\n        return a.Equals(b);\n    }\n}\n";
    let mut builder = CompilationBuilder::new();
    let corlib = CoreLibrary::install(&mut builder);
    let a = builder.add_document("a.cs", calling).unwrap();
    let b = builder.add_document("b.cs", declaring).unwrap();
    let (_, method) = class_with_method(&mut builder, "M");
    let t = builder.add_type_parameter(method, "T");
    builder.add_declaration(t, b, span_in(declaring, "<T>", "T"));
    let first = builder.add_parameter(method, "a", Ty::param(t));
    let second = builder.add_parameter(method, "b", Ty::param(t));
    builder.add_operation(
        a,
        Operation::invocation(
            span_of(calling, "a.Equals(b)"),
            corlib.object_equals,
            Some(Operation::parameter_reference(
                span_in(calling, "a.Equals", "a"),
                first,
                Ty::param(t),
            )),
            vec![boxed(
                Operation::parameter_reference(span_in(calling, "(b)", "b"), second, Ty::param(t)),
                &corlib,
            )],
        ),
    );
    let compilation = builder.build();
    let engine = create_default_engine();
    let analysis = engine.on_compilation_ready(&compilation);
    let diagnostics = engine.analyze(&analysis);
    assert_eq!(diagnostics.len(), 1);

    let actions = engine.on_fix_requested(&analysis, &diagnostics[0]);
    assert_eq!(actions[1].title, ADD_EQUATABLE_CONSTRAINT);
    let changes = actions[1].apply().unwrap();
    assert_eq!(changes.len(), 1);
    assert!(changes.get(a).is_none());
    assert_eq!(
        changes.text(b).unwrap(),
        "using System;\n\npartial class C\n{\n    partial bool M<T>(T a, T b) where T : IEquatable<T>;\n}\n"
    );
}

#[test]
fn visual_basic_constraint_fix() {
    let source = "Class C\n    Function M(Of T)(a As T, b As T) As Boolean\n        Return a.Equals(b)\n    End Function\nEnd Class\n";
    let fixture = compile("a.vb", source, |builder, corlib, document| {
        let (_, method) = class_with_method(builder, "M");
        let t = builder.add_type_parameter(method, "T");
        builder.add_declaration(t, document, span_in(source, "(Of T)", "T"));
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
                    Operation::parameter_reference(span_in(source, "(b)", "b"), b, Ty::param(t)),
                    corlib,
                )],
            ),
        );
    });
    let engine = create_default_engine();
    let analysis = engine.on_compilation_ready(&fixture.compilation);
    let diagnostics = engine.analyze(&analysis);

    let actions = engine.on_fix_requested(&analysis, &diagnostics[0]);
    assert_eq!(
        titles(&actions),
        vec![USE_TYPED_COMPARER, ADD_EQUATABLE_CONSTRAINT]
    );
    assert_eq!(
        applied_text(&actions[1], fixture.document),
        "Imports System\n\nClass C\n    Function M(Of T As IEquatable(Of T))(a As T, b As T) As Boolean\n        Return a.Equals(b)\n    End Function\nEnd Class\n"
    );
}

#[test]
fn explicit_casts_are_kept_in_the_rewrite() {
    let source = "using System.Collections.Generic;\n\nclass C\n{\n    bool M(string s, object o)\n    {\n        return ((object)s).Equals(o);\n    }\n}\n";
    let fixture = compile("a.cs", source, |builder, corlib, document| {
        let (_, method) = class_with_method(builder, "M");
        let s = builder.add_parameter(method, "s", corlib.string_ty());
        let o = builder.add_parameter(method, "o", corlib.object_ty());
        let mut cast = Operation::conversion(
            Operation::parameter_reference(
                span_in(source, "(object)s", "s"),
                s,
                corlib.string_ty(),
            ),
            corlib.object_ty(),
            false,
        );
        cast.span = span_of(source, "(object)s");
        builder.add_operation(
            document,
            Operation::invocation(
                span_of(source, "((object)s).Equals(o)"),
                corlib.object_equals,
                Some(cast),
                vec![Operation::parameter_reference(
                    span_in(source, "Equals(o)", "o"),
                    o,
                    corlib.object_ty(),
                )],
            ),
        );
    });
    let engine = create_default_engine();
    let analysis = engine.on_compilation_ready(&fixture.compilation);
    let diagnostics = engine.analyze(&analysis);

    let actions = engine.on_fix_requested(&analysis, &diagnostics[0]);
    assert!(
        applied_text(&actions[0], fixture.document)
            .contains("return EqualityComparer<object>.Default.Equals((object)s, o);")
    );
}

#[test]
fn visual_basic_comparer_fix() {
    let source = "Class C\n    Function M(o As Object) As Boolean\n        Return o.Equals(1)\n    End Function\nEnd Class\n";
    let fixture = compile("a.vb", source, |builder, corlib, document| {
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
    });
    let engine = create_default_engine();
    let analysis = engine.on_compilation_ready(&fixture.compilation);
    let diagnostics = engine.analyze(&analysis);

    let actions = engine.on_fix_requested(&analysis, &diagnostics[0]);
    assert_eq!(
        applied_text(&actions[0], fixture.document),
        "Imports System.Collections.Generic\n\nClass C\n    Function M(o As Object) As Boolean\n        Return EqualityComparer(Of Object).Default.Equals(o, 1)\n    End Function\nEnd Class\n"
    );
}

#[test]
fn simplifier_strategy_matches_explicit_imports() {
    let fixture = object_equals_int();
    let engine = AnalysisEngine::new(LintRegistry::default_rules()).with_fix_options(FixOptions {
        import_strategy: ImportStrategy::Simplifier,
        simplifier: Some(Arc::new(ScopeSimplifier)),
    });
    let analysis = engine.on_compilation_ready(&fixture.compilation);
    let diagnostics = engine.analyze(&analysis);

    let actions = engine.on_fix_requested(&analysis, &diagnostics[0]);
    let fixed = actions[0].apply().unwrap();
    assert!(!fixed.get(fixture.document).unwrap().has_annotations());
    assert_eq!(
        fixed.text(fixture.document).unwrap(),
        "\nusing System.Collections.Generic;\n\nclass C\n{\n    bool M(object o)\n    {\n        return EqualityComparer<object>.Default.Equals(o, 1);\n    }\n}"
    );
}

#[test]
fn simplifier_strategy_without_a_simplifier_falls_back_to_explicit() {
    let fixture = object_equals_int();
    let engine = AnalysisEngine::new(LintRegistry::default_rules()).with_fix_options(FixOptions {
        import_strategy: ImportStrategy::Simplifier,
        simplifier: None,
    });
    let analysis = engine.on_compilation_ready(&fixture.compilation);
    assert!(analysis.simplifier().is_none());
    let diagnostics = engine.analyze(&analysis);
    let actions = engine.on_fix_requested(&analysis, &diagnostics[0]);
    assert!(
        applied_text(&actions[0], fixture.document)
            .contains("using System.Collections.Generic;")
    );
}

#[test]
fn stale_diagnostic_offers_nothing() {
    let fixture = object_equals_int();
    let engine = create_default_engine();
    let analysis = engine.on_compilation_ready(&fixture.compilation);
    let mut diagnostic = engine.analyze(&analysis).remove(0);
    diagnostic.additional_locations = vec![TextSpan::new(1, 6)];
    assert!(engine.on_fix_requested(&analysis, &diagnostic).is_empty());

    diagnostic.additional_locations.clear();
    assert!(engine.on_fix_requested(&analysis, &diagnostic).is_empty());
}

#[test]
fn cancelled_fix_produces_no_edit() {
    let fixture = object_equals_int();
    let engine = create_default_engine();
    let analysis = engine.on_compilation_ready(&fixture.compilation);
    let diagnostics = engine.analyze(&analysis);
    let actions = engine.on_fix_requested(&analysis, &diagnostics[0]);

    let cancel = CancellationToken::new();
    cancel.cancel();
    assert!(actions[0].apply_with(&cancel).is_none());
}

#[test]
fn fix_all_rewrites_every_call_and_imports_once() {
    let source = "class C\n{\n    bool M(object o)\n    {\n        return o.Equals(1) || o.Equals(2);\n    }\n}\n";
    let fixture = compile("a.cs", source, |builder, corlib, document| {
        let (_, method) = class_with_method(builder, "M");
        let o = builder.add_parameter(method, "o", corlib.object_ty());
        for (call, argument) in [("o.Equals(1)", "1"), ("o.Equals(2)", "2")] {
            builder.add_operation(
                document,
                Operation::invocation(
                    span_of(source, call),
                    corlib.object_equals,
                    Some(Operation::parameter_reference(
                        span_in(source, call, "o"),
                        o,
                        corlib.object_ty(),
                    )),
                    vec![boxed(
                        Operation::literal(span_in(source, call, argument), corlib.int_ty()),
                        corlib,
                    )],
                ),
            );
        }
    });
    let engine = create_default_engine();
    let analysis = engine.on_compilation_ready(&fixture.compilation);
    let diagnostics = engine.analyze(&analysis);
    assert_eq!(diagnostics.len(), 2);

    let fixed = engine
        .fix_all(&analysis, fixture.document, &diagnostics, USE_TYPED_COMPARER)
        .unwrap()
        .unwrap();
    assert_eq!(
        fixed.text(),
        "using System.Collections.Generic;\n\nclass C\n{\n    bool M(object o)\n    {\n        return EqualityComparer<object>.Default.Equals(o, 1) || EqualityComparer<object>.Default.Equals(o, 2);\n    }\n}\n"
    );

    let nothing = engine
        .fix_all(&analysis, fixture.document, &diagnostics, "no such fix")
        .unwrap();
    assert!(nothing.is_none());
}
