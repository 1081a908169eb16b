use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use walkdir::WalkDir;

use linter::{LintConfig, LintDiagnostic, lint_source};

/// Suffixes of fixture files. The part after `.test` decides how the
/// source under test is linted.
const FIXTURE_SUFFIXES: [&str; 3] = [".test.js", ".test.ts", ".test.graphql"];

#[derive(Debug, Deserialize)]
pub struct ExpectedDiagnostic {
    /// Lint rule id, e.g. `template-strings`.
    pub rule: String,

    /// Substring that must appear in the message.
    pub contains: String,

    /// 1-based line within the source under test.
    #[serde(default)]
    pub line: Option<usize>,

    /// 0-based column.
    #[serde(default)]
    pub column: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureConfig {
    #[serde(default)]
    pub description: Option<String>,

    /// Diagnostics the source must produce, in order. Empty means clean.
    #[serde(default)]
    pub expect: Vec<ExpectedDiagnostic>,

    /// Lint configuration, same shape as `tagql.toml`.
    pub config: LintConfig,
}

/// Split a fixture into its TOML frontmatter and the source under test.
fn parse_fixture(content: &str) -> Result<(FixtureConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}');
    let body = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
        .ok_or("missing opening --- frontmatter delimiter")?;

    let close = body
        .find("\n---")
        .ok_or("missing closing --- frontmatter delimiter")?;
    let frontmatter = body[..close].trim_end_matches('\r');
    let rest = &body[close + 4..];
    let source = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config = toml::from_str(frontmatter).map_err(|e| format!("TOML parse error: {}", e))?;
    Ok((config, source))
}

/// The path a fixture's source is linted under: `a.test.js` becomes `a.js`.
fn linted_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .replacen(".test.", ".", 1);
    path.with_file_name(name)
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

impl TestResult {
    fn label(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| {
            self.path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("?")
        })
    }
}

fn run_fixture(path: &Path) -> TestResult {
    let fail = |description: Option<String>, reason: String| TestResult {
        path: path.to_path_buf(),
        description,
        outcome: TestOutcome::Fail(reason),
    };

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return fail(None, format!("cannot read file: {}", e)),
    };
    let (fixture, source) = match parse_fixture(&content) {
        Ok(pair) => pair,
        Err(e) => return fail(None, format!("frontmatter error: {}", e)),
    };
    let description = fixture.description.clone();

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let config = match fixture.config.resolve(base_dir) {
        Ok(config) => config,
        Err(e) => return fail(description, format!("configuration error: {}", e)),
    };

    let diagnostics = lint_source(&linted_path(path), source, &config);
    match check_diagnostics(&diagnostics, &fixture.expect) {
        Some(reason) => fail(description, reason),
        None => TestResult {
            path: path.to_path_buf(),
            description,
            outcome: TestOutcome::Pass,
        },
    }
}

fn describe(diagnostic: &LintDiagnostic) -> String {
    format!(
        "{}:{} [{}] {}",
        diagnostic.location.line, diagnostic.location.column, diagnostic.rule, diagnostic.message
    )
}

/// Compare actual diagnostics with expectations. Returns `Some(reason)` on
/// mismatch.
fn check_diagnostics(actual: &[LintDiagnostic], expected: &[ExpectedDiagnostic]) -> Option<String> {
    if actual.len() != expected.len() {
        let listed: Vec<String> = actual.iter().map(|d| format!("  - {}", describe(d))).collect();
        return Some(format!(
            "expected {} diagnostic(s), got {}\n  actual diagnostics:\n{}",
            expected.len(),
            actual.len(),
            if listed.is_empty() {
                "    (none)".to_string()
            } else {
                listed.join("\n")
            }
        ));
    }

    for (i, (actual, expected)) in actual.iter().zip(expected).enumerate() {
        if actual.rule != expected.rule {
            return Some(format!(
                "diagnostic[{}]: expected rule {}, got {}",
                i,
                expected.rule,
                describe(actual)
            ));
        }
        if !actual.message.contains(&expected.contains) {
            return Some(format!(
                "diagnostic[{}]: expected message containing \"{}\", got: {}",
                i,
                expected.contains,
                describe(actual)
            ));
        }
        if expected.line.is_some_and(|line| line != actual.location.line)
            || expected.column.is_some_and(|column| column != actual.location.column)
        {
            return Some(format!(
                "diagnostic[{}]: expected at {}:{}, got: {}",
                i,
                expected.line.map_or("*".to_string(), |l| l.to_string()),
                expected.column.map_or("*".to_string(), |c| c.to_string()),
                describe(actual)
            ));
        }
    }
    None
}

/// Fixtures grouped by category: their directory relative to `root`.
/// Files directly in `root` get the empty category.
fn discover(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for entry in WalkDir::new(root).sort_by_file_name().into_iter().flatten() {
        let path = entry.path();
        let is_fixture = entry.file_type().is_file()
            && path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| FIXTURE_SUFFIXES.iter().any(|s| name.ends_with(s)));
        if !is_fixture {
            continue;
        }
        let category = path
            .parent()
            .and_then(|p| p.strip_prefix(root).ok())
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_default();
        categories.entry(category).or_default().push(path.to_path_buf());
    }
    categories
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }
    let categories = discover(path);
    if categories.is_empty() {
        eprintln!("no fixtures found in {}", path.display());
        return;
    }
    eprintln!("available categories:");
    for (category, files) in &categories {
        eprintln!("  {} ({} tests)", category_label(category), files.len());
    }
}

struct Palette {
    no_color: bool,
}

impl Palette {
    fn paint(&self, code: &str, text: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        }
    }

    fn pass(&self) -> String {
        self.paint("32", "PASS")
    }

    fn fail(&self) -> String {
        self.paint("31", "FAIL")
    }
}

/// Keep only the requested categories (and their subcategories).
fn select<'a>(
    all: &'a BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'a str, &'a Vec<PathBuf>> {
    if requested.is_empty() {
        return all.iter().map(|(k, v)| (k.as_str(), v)).collect();
    }
    let mut selected = BTreeMap::new();
    for request in requested {
        let request = request.trim_matches('/');
        let prefix = format!("{}/", request);
        let before = selected.len();
        for (category, files) in all {
            if category == request || category.starts_with(&prefix) {
                selected.insert(category.as_str(), files);
            }
        }
        if selected.len() == before {
            let available: Vec<&str> = all.keys().map(|k| category_label(k)).collect();
            eprintln!(
                "warning: category '{}' not found (available: {})",
                request,
                available.join(", ")
            );
        }
    }
    selected
}

/// Run every fixture under `path` (or the single fixture `path`).
/// Returns the exit code: 0 when all pass, 1 otherwise.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let palette = Palette { no_color };
    let all = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        discover(path)
    };
    if all.is_empty() {
        eprintln!("no fixtures found in {}", path.display());
        return 1;
    }
    let selected = select(&all, categories);
    if selected.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures = Vec::new();
    for (category, files) in &selected {
        eprintln!();
        eprintln!("{}", palette.paint("1", category_label(category)));
        for file in *files {
            let result = run_fixture(file);
            match result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", palette.pass(), result.label());
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", palette.fail(), result.label());
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for failure in &failures {
            eprintln!();
            eprintln!("  --- {} ---", failure.path.display());
            if let TestOutcome::Fail(reason) = &failure.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    if failures.is_empty() {
        eprintln!("test result: {}. {} passed, 0 failed", palette.paint("32", "ok"), passed);
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            palette.paint("31", "FAILED"),
            passed,
            failures.len(),
            passed + failures.len()
        );
        1
    }
}
