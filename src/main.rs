use anyhow::Context;
use clap::Parser;
use itertools::Itertools;
use semfix::cli::{
    Args, CheckArgs, Command, FixArgs, OutputFormat, RefactorArgs, SnapshotArgs,
};
use semfix::config::{self, SemfixConfig};
use semfix::diagnostics::Diagnostic;
use semfix::imports::ImportStrategy;
use semfix::level::LintLevel;
use semfix::lint::{LintRegistry, LintSettings};
use semfix::semantic::{Compilation, SemanticModel};
use semfix::simplify::ScopeSimplifier;
use semfix::snapshot::CompilationSnapshot;
use semfix::syntax::TextSpan;
use semfix::{AnalysisEngine, FixOptions};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    semfix::telemetry::init_tracing();
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    match args.command {
        Command::ListRules => {
            list_rules();
            Ok(ExitCode::SUCCESS)
        }
        Command::Explain { rule } => {
            explain_rule(&rule)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check(check) => check_command(check),
        Command::Fix(fix) => fix_command(fix),
        Command::Refactor(refactor) => refactor_command(refactor),
    }
}

fn list_rules() {
    let registry = LintRegistry::default_rules();
    let mut rules: Vec<_> = registry.descriptors().collect();
    rules.sort_by_key(|d| d.name);

    for d in rules {
        let fix_status = if d.fix.available {
            format!(" [fix: {}]", d.fix.safety.as_str())
        } else {
            String::new()
        };
        println!(
            "{}\t{}\t{}\t{}{}",
            d.name,
            d.code,
            d.category.as_str(),
            d.title,
            fix_status
        );
    }
}

fn explain_rule(rule: &str) -> anyhow::Result<()> {
    let Some(d) = LintRegistry::default_rules().find_descriptor(rule) else {
        anyhow::bail!("unknown lint: {rule}");
    };

    println!("name: {}", d.name);
    println!("code: {}", d.code);
    println!("title: {}", d.title);
    println!("category: {}", d.category.as_str());
    println!("message: {}", d.message);
    println!("description: {}", d.description);
    if d.fix.available {
        println!("fix: available ({})", d.fix.safety.as_str());
        if !d.fix.description.is_empty() {
            println!("fix description: {}", d.fix.description);
        }
    } else {
        println!("fix: not available");
    }
    Ok(())
}

/// Snapshot and config shared by every command that analyzes.
struct Loaded {
    compilation: Compilation,
    config: Option<SemfixConfig>,
}

impl Loaded {
    fn settings(&self) -> LintSettings {
        self.config
            .as_ref()
            .map_or_else(LintSettings::default, SemfixConfig::lint_settings)
    }

    fn fix_options(&self, cli_strategy: Option<ImportStrategy>) -> FixOptions {
        let import_strategy = cli_strategy
            .or_else(|| self.config.as_ref().map(|cfg| cfg.fix.import_strategy))
            .unwrap_or_default();
        FixOptions {
            import_strategy,
            simplifier: match import_strategy {
                ImportStrategy::Simplifier => Some(Arc::new(ScopeSimplifier)),
                ImportStrategy::Explicit => None,
            },
        }
    }
}

fn load(input: &SnapshotArgs) -> anyhow::Result<Loaded> {
    let start_dir = infer_start_dir(&input.snapshot)?;
    let config = config::load_config(input.config.as_deref(), &start_dir)?.map(|(_, cfg)| cfg);
    let compilation = CompilationSnapshot::load(&input.snapshot)
        .and_then(CompilationSnapshot::into_compilation)
        .with_context(|| format!("failed to load snapshot: {}", input.snapshot.display()))?;
    Ok(Loaded {
        compilation,
        config,
    })
}

fn check_command(args: CheckArgs) -> anyhow::Result<ExitCode> {
    let loaded = load(&args.input)?;
    let registry = LintRegistry::default_rules_filtered(&args.only, &args.skip)?;
    let engine = AnalysisEngine::new_with_settings(registry, loaded.settings());
    let analysis = engine.on_compilation_ready(&loaded.compilation);
    let diagnostics = engine.analyze(&analysis);

    let has_error = diagnostics.iter().any(|d| d.level == LintLevel::Error);
    match args.format {
        OutputFormat::Pretty => {
            for diag in &diagnostics {
                println!(
                    "{}:{}:{}: {}: {}[{}]: {}",
                    file_name(diag),
                    diag.span.start.row,
                    diag.span.start.column,
                    diag.level.as_str(),
                    diag.lint.name,
                    diag.code(),
                    diag.message
                );
            }
            println!(
                "{} diagnostics for {}",
                diagnostics.len(),
                args.input.snapshot.display()
            );
        }
        OutputFormat::Github => {
            for diag in &diagnostics {
                let kind = if diag.level == LintLevel::Error
                    || (args.deny_warnings && diag.level == LintLevel::Warn)
                {
                    "error"
                } else {
                    "warning"
                };
                println!(
                    "::{} file={},line={},col={},title={}::{}",
                    kind,
                    github_escape(&file_name(diag)),
                    diag.span.start.row,
                    diag.span.start.column,
                    diag.code(),
                    github_escape(&diag.message)
                );
            }
        }
        OutputFormat::Json => {
            let out: Vec<JsonDiagnostic> = diagnostics.iter().map(JsonDiagnostic::from).collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    if has_error || (args.deny_warnings && !diagnostics.is_empty()) {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

#[derive(Debug, Serialize)]
struct JsonDiagnostic {
    file: String,
    row: usize,
    column: usize,
    level: String,
    lint: String,
    code: String,
    message: String,
}

impl From<&Diagnostic> for JsonDiagnostic {
    fn from(d: &Diagnostic) -> Self {
        Self {
            file: file_name(d),
            row: d.span.start.row,
            column: d.span.start.column,
            level: d.level.as_str().to_string(),
            lint: d.lint.name.to_string(),
            code: d.code().to_string(),
            message: d.message.clone(),
        }
    }
}

fn fix_command(args: FixArgs) -> anyhow::Result<ExitCode> {
    let loaded = load(&args.input)?;
    let engine = AnalysisEngine::new_with_settings(LintRegistry::default_rules(), loaded.settings())
        .with_fix_options(loaded.fix_options(args.import_strategy));
    let analysis = engine.on_compilation_ready(&loaded.compilation);
    let diagnostics = engine.analyze(&analysis);
    let key = args.fix.equivalence_key();

    let mut fixed = 0usize;
    for (document, diags) in &diagnostics.iter().chunk_by(|d| d.document) {
        let diags: Vec<Diagnostic> = diags.cloned().collect();
        let Some(tree) = engine.fix_all(&analysis, document, &diags, key)? else {
            continue;
        };
        let Some(source) = loaded.compilation.document(document) else {
            continue;
        };
        fixed += 1;
        match &args.out_dir {
            Some(dir) => {
                let target = dir.join(&source.name);
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)
                        .with_context(|| format!("failed to create {}", parent.display()))?;
                }
                std::fs::write(&target, tree.text())
                    .with_context(|| format!("failed to write {}", target.display()))?;
            }
            None => {
                println!("==> {} <==", source.name);
                print!("{}", tree.text());
            }
        }
    }

    eprintln!(
        "{} diagnostics, fixed {} document(s) with \"{key}\"",
        diagnostics.len(),
        fixed
    );
    Ok(ExitCode::SUCCESS)
}

fn refactor_command(args: RefactorArgs) -> anyhow::Result<ExitCode> {
    let loaded = load(&args.input)?;
    let selection = parse_selection(&args.selection)?;
    let Some(document) = loaded.compilation.document_by_name(&args.document) else {
        anyhow::bail!("no document named `{}` in the snapshot", args.document);
    };
    let engine = AnalysisEngine::new(LintRegistry::default_rules())
        .with_fix_options(loaded.fix_options(args.import_strategy));
    let analysis = engine.on_compilation_ready(&loaded.compilation);

    let actions = engine.on_refactor_requested(&analysis, document.id, selection);
    let Some(changes) = actions.first().and_then(|action| action.apply()) else {
        eprintln!("no refactoring available at {selection}");
        return Ok(ExitCode::from(1));
    };
    for (id, tree) in changes.documents() {
        if let Some(changed) = loaded.compilation.document(id) {
            println!("==> {} <==", changed.name);
        }
        print!("{}", tree.text());
    }
    Ok(ExitCode::SUCCESS)
}

/// `start..end`, or a bare offset for an empty selection.
fn parse_selection(raw: &str) -> anyhow::Result<TextSpan> {
    let parse = |s: &str| {
        s.trim()
            .parse::<usize>()
            .with_context(|| format!("invalid selection offset: {s:?}"))
    };
    match raw.split_once("..") {
        Some((start, end)) => {
            let (start, end) = (parse(start)?, parse(end)?);
            if start > end {
                anyhow::bail!("selection start {start} is past its end {end}");
            }
            Ok(TextSpan::new(start, end))
        }
        None => Ok(TextSpan::empty(parse(raw)?)),
    }
}

fn file_name(d: &Diagnostic) -> String {
    d.file.clone().unwrap_or_else(|| "<unknown>".to_string())
}

fn github_escape(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn infer_start_dir(snapshot: &Path) -> anyhow::Result<PathBuf> {
    match snapshot.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) => Ok(dir.to_path_buf()),
        None => Ok(std::env::current_dir()?),
    }
}
