pub mod reconstruct;

use thiserror::Error;

use crate::position::Location;

/// A literal text fragment of a template, already cooked (escapes resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub text: String,
}

/// An interpolated sub-expression of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// UTF-16 offset of the expression's first character in the source file.
    pub start: usize,
    /// UTF-16 offset one past the expression's last character.
    pub end: usize,
    /// Location of `start` in the source file.
    pub location: Location,
}

impl Slot {
    pub fn new(start: usize, end: usize, location: Location) -> Self {
        Slot {
            start,
            end,
            location,
        }
    }

    /// Length of the expression's own source text.
    pub fn width(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

/// The literal text and holes of one tagged call site.
/// Always starts and ends with a chunk: `chunks.len() == slots.len() + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    chunks: Vec<Chunk>,
    slots: Vec<Slot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("template has {chunks} chunks for {slots} slots; expected exactly one more chunk than slots")]
pub struct TemplateShapeError {
    pub chunks: usize,
    pub slots: usize,
}

impl Template {
    pub fn new(chunks: Vec<Chunk>, slots: Vec<Slot>) -> Result<Self, TemplateShapeError> {
        if chunks.len() != slots.len() + 1 {
            return Err(TemplateShapeError {
                chunks: chunks.len(),
                slots: slots.len(),
            });
        }
        Ok(Template { chunks, slots })
    }

    /// A template with no holes.
    pub fn literal(text: impl Into<String>) -> Self {
        Template {
            chunks: vec![Chunk { text: text.into() }],
            slots: Vec::new(),
        }
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Chunks in lexical order, each paired with the slot that follows it.
    /// The tail chunk is paired with `None`.
    pub fn parts(&self) -> impl Iterator<Item = (&Chunk, Option<&Slot>)> {
        self.chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| (chunk, self.slots.get(i)))
    }
}
