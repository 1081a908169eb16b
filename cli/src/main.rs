mod test_runner;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::EnvFilter;
use walkdir::{DirEntry, WalkDir};

use linter::settings::CONFIG_FILE_NAME;
use linter::{LintConfig, LintDiagnostic, ResolvedConfig, lint_source};

/// Extensions of files that are linted.
const LINTED_EXTENSIONS: [&str; 8] = ["js", "jsx", "ts", "tsx", "mjs", "cjs", "graphql", "gql"];

const EXIT_DIAGNOSTICS: i32 = 1;
const EXIT_CONFIG_ERROR: i32 = 2;

#[derive(Parser)]
#[command(name = "tagql", version, about = "Lint GraphQL embedded in tagged template literals")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Lint source files and directories
    Lint(LintArgs),

    /// Run .test.js fixture files
    Test(TestArgs),
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// Source snippets with labels
    Human,
    /// One `path:line:column: message [rule]` line per diagnostic
    Compact,
}

#[derive(clap::Args)]
struct LintArgs {
    /// Files or directories to lint
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Configuration file
    #[arg(short, long, default_value = CONFIG_FILE_NAME)]
    config: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    format: Format,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a fixture file or a directory containing them
    path: PathBuf,

    /// Run only fixtures in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TAGQL_LOG")
                .unwrap_or_else(|_| EnvFilter::new("tagql=warn,linter=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Lint(args) => process::exit(do_lint(args, cli.no_color)),
        Command::Test(args) => {
            if args.list_categories {
                test_runner::list_categories(&args.path);
                return;
            }
            let exit_code = test_runner::run_tests(&args.path, cli.no_color, &args.category);
            process::exit(exit_code);
        }
    }
}

fn load_config(path: &Path) -> Result<ResolvedConfig, linter::LintError> {
    let config = LintConfig::from_file(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    config.resolve(base_dir)
}

fn do_lint(args: LintArgs, no_color: bool) -> i32 {
    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return EXIT_CONFIG_ERROR;
        }
    };

    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let term_config = term::Config::default();
    let mut files = SimpleFiles::new();
    let mut total = 0usize;

    for path in collect_files(&args.paths) {
        let source = match std::fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: cannot read '{}': {}", path.display(), e);
                continue;
            }
        };
        let diagnostics = lint_source(&path, &source, &config);
        if diagnostics.is_empty() {
            continue;
        }
        total += diagnostics.len();

        match args.format {
            Format::Compact => {
                for diagnostic in &diagnostics {
                    println!("{}", compact_line(&path, diagnostic));
                }
            }
            Format::Human => {
                let file_id = files.add(path.display().to_string(), source.clone());
                for diagnostic in &diagnostics {
                    let rendered = diagnostic.to_diagnostic(file_id, &source);
                    let _ = term::emit_to_write_style(
                        &mut writer.lock(),
                        &term_config,
                        &files,
                        &rendered,
                    );
                }
            }
        }
    }

    if total > 0 {
        eprintln!("{} problem(s) found", total);
        EXIT_DIAGNOSTICS
    } else {
        0
    }
}

fn compact_line(path: &Path, diagnostic: &LintDiagnostic) -> String {
    format!(
        "{}:{}:{}: {} [{}]",
        path.display(),
        diagnostic.location.line,
        diagnostic.location.column,
        diagnostic.message,
        diagnostic.rule
    )
}

fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name == "node_modules" || name.starts_with('.'))
}

fn is_linted(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| LINTED_EXTENSIONS.contains(&ext))
}

/// Expand the given paths into the files to lint, in a stable order.
/// Explicit file arguments are linted regardless of extension.
fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for path in paths {
        if path.is_file() {
            out.push(path.clone());
            continue;
        }
        let walker = WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !is_skipped_dir(entry));
        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() && is_linted(entry.path()) => {
                    out.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "skipping unreadable path"),
            }
        }
    }
    out
}
