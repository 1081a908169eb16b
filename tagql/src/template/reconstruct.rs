use thiserror::Error;

use crate::dialect::{Dialect, PrecedingMarker};
use crate::template::Template;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum InterpolationErrorKind {
    /// A chunk has unequal `{` and `}` counts, so its hole sits inside a
    /// selection set.
    #[error("Invalid interpolation - fragment interpolation must occur outside of the brackets.")]
    BracketImbalance,
    /// The dialect has no placeholder for a hole in this position.
    #[error("Invalid interpolation - not a valid fragment or variable.")]
    UnsupportedInterpolation,
}

/// Why a template could not be turned into GraphQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct InterpolationError {
    pub kind: InterpolationErrorKind,
    /// Index of the offending chunk; equals the index of the slot after it
    /// unless the chunk is the tail.
    pub slot: usize,
}

/// Rebuild standalone GraphQL text from a template, replacing each hole
/// with a placeholder of the same width so columns after it stay aligned.
///
/// Stops at the first chunk or hole the dialect cannot handle; no partial
/// text is returned.
pub fn reconstruct(template: &Template, dialect: Dialect) -> Result<String, InterpolationError> {
    let mut text = String::new();

    for (index, (chunk, slot)) in template.parts().enumerate() {
        if dialect.requires_balanced_chunks() && !is_balanced(&chunk.text) {
            return Err(InterpolationError {
                kind: InterpolationErrorKind::BracketImbalance,
                slot: index,
            });
        }

        text.push_str(&chunk.text);

        let Some(slot) = slot else {
            continue;
        };

        let marker = PrecedingMarker::of(&chunk.text);
        let substitution = dialect
            .substitution(marker)
            .ok_or(InterpolationError {
                kind: InterpolationErrorKind::UnsupportedInterpolation,
                slot: index,
            })?;
        text.push_str(&substitution.render(slot.width()));
    }

    tracing::trace!(%dialect, text = %text, "reconstructed template");
    Ok(text)
}

fn is_balanced(chunk: &str) -> bool {
    let open = chunk.matches('{').count();
    let close = chunk.matches('}').count();
    open == close
}
