pub mod dialect;
pub mod document;
pub mod parser;
pub mod position;
pub mod template;

pub use dialect::{Dialect, PrecedingMarker, Substitution};
pub use position::{Location, SourceRange, SourceSpan, map_location};
pub use template::reconstruct::{InterpolationError, InterpolationErrorKind, reconstruct};
pub use template::{Chunk, Slot, Template};

/// Tag given to whole GraphQL files so they can flow through the same
/// pipeline as tagged templates. It never appears in user source.
pub const INTERNAL_TAG: &str = "ESLintPluginGraphQLFile";
