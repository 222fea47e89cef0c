use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::imports::ImportStrategy;

/// semfix CLI options.
#[derive(Debug, Parser)]
#[command(
    name = "semfix",
    version,
    about = "Find and fix weakly typed Equals(object) calls in bound C# and VB compilations"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Report diagnostics for a compilation snapshot.
    Check(CheckArgs),

    /// Apply one fix to every diagnostic and write the fixed documents.
    Fix(FixArgs),

    /// Apply the static import refactor at a selection.
    Refactor(RefactorArgs),

    /// List available lints.
    ListRules,

    /// Explain a lint.
    Explain {
        /// Lint name or diagnostic code.
        rule: String,
    },
}

#[derive(Debug, Clone, ClapArgs)]
pub struct SnapshotArgs {
    /// Compilation snapshot (JSON).
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Config file. Defaults to the nearest `semfix.toml`.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct CheckArgs {
    #[command(flatten)]
    pub input: SnapshotArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
    pub format: OutputFormat,

    /// Only run these lints (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// Skip these lints (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Exit with code 1 if any diagnostics are emitted.
    #[arg(long)]
    pub deny_warnings: bool,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct FixArgs {
    #[command(flatten)]
    pub input: SnapshotArgs,

    /// Equivalence key of the fix to apply.
    #[arg(long, value_enum, default_value_t = FixKind::Comparer)]
    pub fix: FixKind,

    /// Overrides `[fix] import-strategy` from the config.
    #[arg(long, value_enum)]
    pub import_strategy: Option<ImportStrategy>,

    /// Directory to write fixed documents to. Prints them when absent.
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, ClapArgs)]
pub struct RefactorArgs {
    #[command(flatten)]
    pub input: SnapshotArgs,

    /// Document name inside the snapshot.
    #[arg(long)]
    pub document: String,

    /// Selected byte range, `start..end` or a single offset.
    #[arg(long)]
    pub selection: String,

    /// Overrides `[fix] import-strategy` from the config.
    #[arg(long, value_enum)]
    pub import_strategy: Option<ImportStrategy>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
    Github,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FixKind {
    /// Use EqualityComparer<T>.Default
    Comparer,
    /// Add IEquatable<T> constraint
    Constraint,
}

impl FixKind {
    pub fn equivalence_key(self) -> &'static str {
        match self {
            FixKind::Comparer => crate::fixes::USE_TYPED_COMPARER,
            FixKind::Constraint => crate::fixes::ADD_EQUATABLE_CONSTRAINT,
        }
    }
}
