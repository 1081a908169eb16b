use std::path::PathBuf;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};
use tagql::position::{Location, SourceRange, location_to_offset};
use thiserror::Error;

use crate::schema::SchemaError;

/// Failures that stop a lint run altogether.
#[derive(Debug, Error)]
pub enum LintError {
    #[error("{0}")]
    Config(String),
    #[error("failed to parse {}: {error}", path.display())]
    ConfigSyntax {
        path: PathBuf,
        #[source]
        error: toml::de::Error,
    },
    #[error("invalid schema from {origin}: {error}")]
    Schema {
        origin: String,
        #[source]
        error: SchemaError,
    },
    #[error("cannot read {}: {error}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
}

impl LintError {
    pub fn config(message: impl Into<String>) -> Self {
        LintError::Config(message.into())
    }
}

/// One reported problem, located in the file that was linted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintDiagnostic {
    /// Id of the lint rule that produced this, e.g. `template-strings`.
    pub rule: String,
    pub message: String,
    pub location: Location,
    /// The whole call site.
    pub node: SourceRange,
}

impl LintDiagnostic {
    /// Convert to a codespan-reporting Diagnostic for display, treating
    /// `source` as the linted file's text.
    pub fn to_diagnostic(&self, file_id: usize, source: &str) -> Diagnostic<usize> {
        let labels = location_to_offset(source, self.location)
            .map(|offset| {
                let end = source[offset..]
                    .chars()
                    .next()
                    .filter(|c| *c != '\n')
                    .map_or(offset, |c| offset + c.len_utf8());
                vec![Label::primary(file_id, offset..end)]
            })
            .unwrap_or_default();
        Diagnostic::new(Severity::Error)
            .with_message(&self.message)
            .with_code(&self.rule)
            .with_labels(labels)
    }
}
