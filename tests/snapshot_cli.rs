mod support;

use semfix::create_default_engine;
use semfix::snapshot::CompilationSnapshot;
use std::path::Path;
use std::process::{Command, Output};
use support::{object_equals_int, render};

fn write_snapshot(dir: &Path) -> std::path::PathBuf {
    let fixture = object_equals_int();
    let json = CompilationSnapshot::from_compilation(&fixture.compilation)
        .to_json_pretty()
        .unwrap();
    let path = dir.join("compilation.json");
    std::fs::write(&path, json).unwrap();
    path
}

fn semfix(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_semfix"))
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("failed to run semfix")
}

#[test]
fn snapshot_file_reloads_to_the_same_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(dir.path());

    let compilation = CompilationSnapshot::load(&path)
        .and_then(CompilationSnapshot::into_compilation)
        .unwrap();
    let engine = create_default_engine();
    let analysis = engine.on_compilation_ready(&compilation);
    insta::assert_snapshot!(
        render(&engine.analyze(&analysis)),
        @"a.cs:6:18: warning: APC0001: Use strongly typed equality on object."
    );
}

#[test]
fn check_reports_and_honors_deny_warnings() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(dir.path());
    let path = path.to_str().unwrap();

    let out = semfix(&["check", path]);
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.starts_with(
        "a.cs:6:18: warning: equals_object[APC0001]: Use strongly typed equality on object.\n"
    ));
    assert!(stdout.contains("1 diagnostics for "));

    let out = semfix(&["check", path, "--deny-warnings"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn check_emits_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(dir.path());

    let out = semfix(&["check", path.to_str().unwrap(), "--format", "json"]);
    assert!(out.status.success());
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json[0]["code"], "APC0001");
    assert_eq!(json[0]["row"], 6);
    assert_eq!(json[0]["column"], 18);
    assert_eq!(json[0]["level"], "warning");
}

#[test]
fn fix_writes_rewritten_documents() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(dir.path());
    let out_dir = dir.path().join("out");

    let out = semfix(&[
        "fix",
        path.to_str().unwrap(),
        "--out-dir",
        out_dir.to_str().unwrap(),
    ]);
    assert!(out.status.success());
    assert_eq!(
        std::fs::read_to_string(out_dir.join("a.cs")).unwrap(),
        "\nusing System.Collections.Generic;\n\nclass C\n{\n    bool M(object o)\n    {\n        return EqualityComparer<object>.Default.Equals(o, 1);\n    }\n}"
    );
}

#[test]
fn refactor_without_a_candidate_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_snapshot(dir.path());

    let out = semfix(&[
        "refactor",
        path.to_str().unwrap(),
        "--document",
        "a.cs",
        "--selection",
        "0",
    ]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("no refactoring available"));
}

#[test]
fn broken_snapshot_exits_with_two() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ \"documents\": 1 }").unwrap();

    let out = semfix(&["check", path.to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("failed to load snapshot"));
}
