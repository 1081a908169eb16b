pub mod driver;
pub mod error;
pub mod rules;
pub mod schema;
pub mod settings;
pub mod source;
pub mod validation;

pub use driver::{lint_source, process};
pub use error::{LintDiagnostic, LintError};
pub use rules::LintRule;
pub use schema::{Schema, SchemaError};
pub use settings::{InterpolationPolicy, LintConfig, ResolvedConfig, Settings};
pub use source::{CallSite, scan_tagged_templates};
