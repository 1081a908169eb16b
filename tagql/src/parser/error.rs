use std::fmt;

use codespan_reporting::diagnostic::{Diagnostic, Label, Severity};

use crate::document::Pos;
use crate::position::{Location, location_to_offset};

/// A GraphQL syntax error with the positions it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub locations: Vec<Pos>,
}

impl ParseError {
    pub fn syntax(description: impl Into<String>, pos: Pos) -> Self {
        ParseError {
            message: format!("Syntax Error: {}", description.into()),
            locations: vec![pos],
        }
    }

    pub fn first_location(&self) -> Option<Pos> {
        self.locations.first().copied()
    }

    /// Convert to a codespan-reporting Diagnostic for display, treating
    /// `source` as the text that was parsed.
    pub fn to_diagnostic(&self, file_id: usize, source: &str) -> Diagnostic<usize> {
        let labels = self
            .first_location()
            .and_then(|pos| location_to_offset(source, Location::new(pos.line, pos.column.saturating_sub(1))))
            .map(|offset| vec![Label::primary(file_id, offset..offset)])
            .unwrap_or_default();
        Diagnostic::new(Severity::Error)
            .with_message(&self.message)
            .with_labels(labels)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.first_location() {
            Some(pos) => write!(f, "{} ({}:{})", self.message, pos.line, pos.column),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ParseError {}
