//! cascheck CLI -- verify and format recorded CAS histories.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use cascheck_core::consistency::error::{Error, Violation};
use cascheck_core::history::{format_history, CasHistory, MalformedHistory};
use cascheck_core::{Algorithm, Witness};
use cascheck_parser::ParseError;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::json;

#[derive(Debug, Parser)]
#[command(
    name = "cascheck",
    about = "Post-hoc linearizability checking for compare-and-swap histories"
)]
pub struct App {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Verify recorded CAS histories
    Verify(VerifyArgs),
    /// Format compact history (.cas) files
    Fmt(FmtArgs),
    /// Print the JSON Schema for the history input format to stdout
    Schema,
}

#[derive(Debug, Parser)]
pub struct VerifyArgs {
    /// Input directory containing history files (.json or .cas)
    #[arg(long)]
    pub input_dir: PathBuf,
    /// Checking algorithm
    #[arg(long, default_value = "chain")]
    pub algorithm: AlgorithmArg,
    /// Print witness details on PASS and full error details on FAIL
    #[arg(long)]
    pub verbose: bool,
    /// Output results as JSON (one object per file)
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum AlgorithmArg {
    DegreeBalance,
    Chain,
}

#[derive(Debug, Parser)]
pub struct FmtArgs {
    /// Input files or directories to format
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
    /// Check formatting without modifying files (exit 1 if unformatted)
    #[arg(long)]
    pub check: bool,
}

impl From<AlgorithmArg> for cascheck_core::Algorithm {
    fn from(algorithm: AlgorithmArg) -> Self {
        match algorithm {
            AlgorithmArg::DegreeBalance => Self::DegreeBalance,
            AlgorithmArg::Chain => Self::Chain,
        }
    }
}

/// Failure to read a history file.
#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Parse(ParseError),
    UnknownExtension(PathBuf),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "{e}"),
            Self::Json(e) => write!(f, "invalid JSON history: {e}"),
            Self::Parse(e) => write!(f, "{e}"),
            Self::UnknownExtension(path) => {
                write!(f, "unknown history format: {}", path.display())
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Returns `true` if `path` has an extension cascheck can read.
#[must_use]
pub fn is_history_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "json" || ext == "cas")
}

/// Read a history from a `.json` or `.cas` file.
///
/// # Errors
///
/// Returns a [`LoadError`] if the file cannot be read or decoded.
pub fn load_history(path: &Path) -> Result<CasHistory<u64>, LoadError> {
    let contents = fs::read_to_string(path).map_err(LoadError::Io)?;
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(&contents).map_err(LoadError::Json),
        Some("cas") => cascheck_parser::parse_history(&contents).map_err(LoadError::Parse),
        _ => Err(LoadError::UnknownExtension(path.to_path_buf())),
    }
}

/// Result of verifying one history file.
#[derive(Debug)]
pub enum Verdict {
    Pass(Witness<u64>),
    Fail(Violation<u64>),
    /// The history is not a valid input for the selected algorithm.
    Malformed(MalformedHistory<u64>),
    /// The file could not be read or decoded.
    Unreadable(LoadError),
}

impl Verdict {
    /// `PASS`, `FAIL`, or `ERROR`.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pass(_) => "PASS",
            Self::Fail(_) => "FAIL",
            Self::Malformed(_) | Self::Unreadable(_) => "ERROR",
        }
    }

    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass(_))
    }

    /// One line of text output, e.g. `h.cas: FAIL (ProgramOrder { .. })`.
    #[must_use]
    pub fn summary(&self, file: &str) -> String {
        let label = self.label();
        match self {
            Self::Pass(_) => format!("{file}: {label}"),
            Self::Fail(violation) => format!("{file}: {label} ({violation:?})"),
            Self::Malformed(malformed) => format!("{file}: {label} ({malformed})"),
            Self::Unreadable(e) => format!("{file}: {label} ({e})"),
        }
    }

    /// Indented detail lines printed under the summary with `--verbose`.
    #[must_use]
    pub fn details(&self) -> Vec<String> {
        match self {
            Self::Pass(witness) => vec![format!("  witness: {witness:?}")],
            Self::Fail(violation) => vec![format!("  violation: {violation:?}")],
            Self::Malformed(malformed) => vec![
                format!("  error: {malformed}"),
                format!("  operation: {}", malformed.operation()),
            ],
            Self::Unreadable(e) => vec![format!("  error: {e}")],
        }
    }

    /// One JSON object per file for `--json`.
    #[must_use]
    pub fn to_json(&self, file: &str) -> serde_json::Value {
        let verdict = self.label();
        match self {
            Self::Pass(witness) => {
                json!({ "file": file, "ok": true, "verdict": verdict, "witness": witness })
            }
            Self::Fail(violation) => json!({
                "file": file,
                "ok": false,
                "verdict": verdict,
                "error": Error::Violation(violation.clone()),
            }),
            Self::Malformed(malformed) => json!({
                "file": file,
                "ok": false,
                "verdict": verdict,
                "error": Error::<u64>::Malformed(malformed.clone()),
            }),
            Self::Unreadable(e) => json!({
                "file": file,
                "ok": false,
                "verdict": verdict,
                "error": e.to_string(),
            }),
        }
    }
}

/// Load the history at `path` and check it with `algorithm`.
///
/// Never aborts: load failures become [`Verdict::Unreadable`] so the caller
/// can move on to the next file.
#[must_use]
pub fn verify_file(path: &Path, algorithm: Algorithm) -> Verdict {
    let history = match load_history(path) {
        Ok(history) => history,
        Err(e) => {
            tracing::debug!(file = %path.display(), error = %e, "failed to load history");
            return Verdict::Unreadable(e);
        }
    };
    tracing::debug!(
        file = %path.display(),
        threads = history.threads.len(),
        operations = history.len(),
        successful = history.successful_operations().count(),
        "loaded history"
    );

    match cascheck_core::check(&history.threads, &history.initial_value, algorithm) {
        Ok(witness) => Verdict::Pass(witness),
        Err(Error::Violation(violation)) => Verdict::Fail(violation),
        Err(Error::Malformed(malformed)) => Verdict::Malformed(malformed),
    }
}

/// Result of canonicalizing one `.cas` source.
#[derive(Debug, PartialEq, Eq)]
pub enum FormatOutcome {
    /// Already canonical.
    Unchanged,
    /// The canonical text, which differs from the source.
    Reformatted(String),
    /// Not canonical, but the canonical text would drop its `//` comments.
    HasComments,
}

/// Canonicalize a `.cas` source without losing comments.
///
/// # Errors
///
/// Returns a [`ParseError`] if `source` is not a valid `.cas` history.
pub fn format_source(source: &str) -> Result<FormatOutcome, ParseError> {
    let history = cascheck_parser::parse_history(source)?;
    let formatted = format_history(&history);
    if formatted == source {
        Ok(FormatOutcome::Unchanged)
    } else if has_comments(source) {
        Ok(FormatOutcome::HasComments)
    } else {
        Ok(FormatOutcome::Reformatted(formatted))
    }
}

fn has_comments(source: &str) -> bool {
    source
        .lines()
        .any(|line| line.trim_start().starts_with("//"))
}

/// Collect every `.cas` file under `paths`, descending into directories.
///
/// # Errors
///
/// Returns the first I/O error met while listing a directory.
pub fn collect_cas_files(paths: &[PathBuf]) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending: Vec<PathBuf> = paths.to_vec();
    while let Some(path) = pending.pop() {
        if path.is_dir() {
            for entry in fs::read_dir(&path)? {
                pending.push(entry?.path());
            }
        } else if path.extension().is_some_and(|ext| ext == "cas") {
            files.push(path);
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}
