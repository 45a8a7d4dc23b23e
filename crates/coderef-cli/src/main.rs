//! coderef - Keep code samples in documentation in sync with their sources
//!
//! This tool finds region markers in text documents and replaces the content
//! between them with the current version of the referenced source snippet.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser};
use coderef_core::{check_file, embed_file, EmbedConfig, EmbedOutcome, MarkerSyntax};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, trace, Level};
use tracing_subscriber::EnvFilter;
use walkdir::{DirEntry, WalkDir};

/// Keep code samples in documentation in sync with their source files
#[derive(Parser, Debug)]
#[command(name = "coderef")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    input: InputMode,

    /// Document extensions to process in directory mode
    #[arg(short, long = "extension", default_value = "md")]
    extensions: Vec<String>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Don't write anything; fail if any document is out of date
    #[arg(long, conflicts_with = "dry_run")]
    check: bool,

    /// Don't write anything; print the rewritten documents instead
    #[arg(long)]
    dry_run: bool,

    /// Code fence written around embedded snippets
    #[arg(long, default_value = "```")]
    fence: String,

    /// Re-read a source file for every region that references it
    #[arg(long)]
    no_cache: bool,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct InputMode {
    /// Path to a single document to update
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Path to a directory of documents to update
    #[arg(short, long)]
    directory: Option<PathBuf>,
}

/// Run mode derived from the flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Write,
    Check,
    DryRun,
}

impl Cli {
    fn mode(&self) -> Mode {
        if self.check {
            Mode::Check
        } else if self.dry_run {
            Mode::DryRun
        } else {
            Mode::Write
        }
    }

    fn config(&self) -> EmbedConfig {
        EmbedConfig::new()
            .fence(self.fence.clone())
            .cache_sources(!self.no_cache)
    }
}

#[derive(Debug, Default)]
struct RunStats {
    processed: usize,
    regions: usize,
    changed: usize,
    failed: usize,
}

impl RunStats {
    fn record(&mut self, outcome: &EmbedOutcome) {
        self.processed += 1;
        self.regions += outcome.regions;
        if outcome.changed {
            self.changed += 1;
        }
    }

    fn print_summary(&self, mode: Mode) {
        let verb = match mode {
            Mode::Write => "updated",
            Mode::Check | Mode::DryRun => "out of date",
        };
        info!(
            "Summary: {} document(s), {} region(s), {} {}, {} failed",
            self.processed, self.regions, self.changed, verb, self.failed
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let stats = if let Some(ref file) = cli.input.file {
        process_single_file(&cli, file)?
    } else if let Some(ref directory) = cli.input.directory {
        process_directory(&cli, directory)?
    } else {
        bail!("Either --file or --directory must be specified")
    };

    stats.print_summary(cli.mode());

    if stats.failed > 0 {
        bail!("{} document(s) could not be updated", stats.failed);
    }
    if cli.mode() == Mode::Check && stats.changed > 0 {
        bail!("{} document(s) out of date", stats.changed);
    }
    Ok(())
}

/// Process a single document
fn process_single_file(cli: &Cli, file: &Path) -> Result<RunStats> {
    if !file.is_file() {
        bail!("Input path is not a file: {}", file.display());
    }

    let mut stats = RunStats::default();
    let outcome = process_document(cli, &cli.config(), file)?;
    stats.record(&outcome);
    Ok(stats)
}

/// Process every matching document under a directory
fn process_directory(cli: &Cli, directory: &Path) -> Result<RunStats> {
    if !directory.is_dir() {
        bail!("Path is not a directory: {}", directory.display());
    }

    info!("Scanning directory: {}", directory.display());

    let config = cli.config();
    let mut stats = RunStats::default();

    for path in discover_documents(directory, &cli.extensions, &config.syntax) {
        match process_document(cli, &config, &path) {
            Ok(outcome) => stats.record(&outcome),
            Err(e) => {
                // Log error but continue with other documents
                error!("{:#}", e);
                stats.failed += 1;
            }
        }
    }

    Ok(stats)
}

/// Documents under `directory` with a wanted extension that mention a marker
fn discover_documents(
    directory: &Path,
    extensions: &[String],
    syntax: &MarkerSyntax,
) -> Vec<PathBuf> {
    let mut documents: Vec<PathBuf> = WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(DirEntry::into_path)
        .filter(|p| has_extension(p, extensions))
        .filter(|p| mentions_marker(p, syntax))
        .collect();

    documents.sort();
    debug!("Found {} document(s) with markers", documents.len());
    documents
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Cheap pre-filter so documents without markers are never rewritten
fn mentions_marker(path: &Path, syntax: &MarkerSyntax) -> bool {
    match fs::read_to_string(path) {
        Ok(text) => syntax.mentions_marker(&text),
        Err(e) => {
            trace!("Skipping unreadable {}: {}", path.display(), e);
            false
        }
    }
}

/// Rewrite one document according to the run mode
fn process_document(cli: &Cli, config: &EmbedConfig, path: &Path) -> Result<EmbedOutcome> {
    debug!("Processing document: {}", path.display());

    let outcome = match cli.mode() {
        Mode::Write => embed_file(path, config),
        Mode::Check | Mode::DryRun => check_file(path, config),
    }
    .with_context(|| format!("Failed to update {}", path.display()))?;

    match cli.mode() {
        Mode::Write if outcome.changed => println!("Updated {}", path.display()),
        Mode::Write => debug!("Up to date: {}", path.display()),
        Mode::Check if outcome.changed => println!("Out of date: {}", path.display()),
        Mode::Check => debug!("Up to date: {}", path.display()),
        Mode::DryRun => print!("{}", outcome.rendered),
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("coderef").chain(args.iter().copied()))
    }

    #[test]
    fn test_discover_documents() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("guide")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();

        fs::write(root.join("README.md"), "<!--coderef:end-->\n").unwrap();
        fs::write(root.join("guide/usage.MD"), "<!--coderef:a|x.rs-->\n").unwrap();
        fs::write(root.join("guide/plain.md"), "no markers\n").unwrap();
        fs::write(root.join("notes.txt"), "<!--coderef:end-->\n").unwrap();
        fs::write(root.join(".git/HEAD.md"), "<!--coderef:end-->\n").unwrap();

        let found = discover_documents(root, &["md".to_string()], &MarkerSyntax::default());
        assert_eq!(
            found,
            vec![root.join("README.md"), root.join("guide/usage.MD")]
        );
    }

    #[test]
    fn test_has_extension() {
        let exts = vec!["md".to_string(), "txt".to_string()];
        assert!(has_extension(Path::new("a/README.md"), &exts));
        assert!(has_extension(Path::new("notes.TXT"), &exts));
        assert!(!has_extension(Path::new("main.rs"), &exts));
        assert!(!has_extension(Path::new("Makefile"), &exts));
    }

    #[test]
    fn test_mode_and_config() {
        let parsed = cli(&["--file", "README.md", "--check", "--no-cache", "--fence", "~~~"]);
        assert_eq!(parsed.mode(), Mode::Check);
        let config = parsed.config();
        assert_eq!(config.fence, "~~~");
        assert!(!config.cache_sources);

        assert_eq!(cli(&["-f", "README.md"]).mode(), Mode::Write);
        assert_eq!(cli(&["-d", ".", "--dry-run"]).mode(), Mode::DryRun);
        assert_eq!(cli(&["-d", "."]).extensions, vec!["md"]);
    }

    #[test]
    fn test_process_directory_continues_after_failure() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let source = "// coderef:ok-->\nhi();\n// coderef:end-->\n";
        fs::write(root.join("src.txt"), source).unwrap();
        let good = "<!--coderef:ok|src.txt|c-->\n<!--coderef:end-->\n";
        fs::write(root.join("good.md"), good).unwrap();
        let bad = "<!--coderef:gone|src.txt|c-->\n<!--coderef:end-->\n";
        fs::write(root.join("bad.md"), bad).unwrap();

        let root_arg = root.to_str().unwrap();
        let stats = process_directory(&cli(&["-d", root_arg]), root).unwrap();
        assert_eq!(stats.processed, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.changed, 1);

        assert_eq!(
            fs::read_to_string(root.join("good.md")).unwrap(),
            "<!--coderef:ok|src.txt|c-->\n```c\nhi();\n```\n<!--coderef:end-->\n"
        );
        assert_eq!(fs::read_to_string(root.join("bad.md")).unwrap(), bad);
    }

    #[test]
    fn test_check_mode_does_not_write() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        fs::write(root.join("src.txt"), "coderef:ok-->\nhi();\ncoderef:end-->\n").unwrap();
        let doc = root.join("doc.md");
        let original = "<!--coderef:ok|src.txt-->\nstale\n<!--coderef:end-->\n";
        fs::write(&doc, original).unwrap();

        let doc_arg = doc.to_str().unwrap();
        let stats = process_single_file(&cli(&["-f", doc_arg, "--check"]), &doc).unwrap();
        assert_eq!(stats.changed, 1);
        assert_eq!(fs::read_to_string(&doc).unwrap(), original);
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
