use crate::validation::RuleFactory;
use crate::validation::rules::{
    no_deprecated_fields, operations_must_have_names, required_fields,
    type_names_should_be_capitalized,
};

/// A lint rule that can be enabled under `[rules]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintRule {
    TemplateStrings,
    NamedOperations,
    RequiredFields(Vec<String>),
    CapitalizedTypeName,
    NoDeprecatedFields,
}

impl LintRule {
    pub const IDS: [&'static str; 5] = [
        "template-strings",
        "named-operations",
        "required-fields",
        "capitalized-type-name",
        "no-deprecated-fields",
    ];

    pub fn id(&self) -> &'static str {
        match self {
            LintRule::TemplateStrings => "template-strings",
            LintRule::NamedOperations => "named-operations",
            LintRule::RequiredFields(_) => "required-fields",
            LintRule::CapitalizedTypeName => "capitalized-type-name",
            LintRule::NoDeprecatedFields => "no-deprecated-fields",
        }
    }

    /// Validators this rule runs instead of the matched setting's own list.
    /// `None` keeps the setting's list.
    pub fn validators(&self) -> Option<Vec<RuleFactory>> {
        match self {
            LintRule::TemplateStrings => None,
            LintRule::NamedOperations => Some(vec![operations_must_have_names()]),
            LintRule::RequiredFields(fields) => Some(vec![required_fields(fields.clone())]),
            LintRule::CapitalizedTypeName => Some(vec![type_names_should_be_capitalized()]),
            LintRule::NoDeprecatedFields => Some(vec![no_deprecated_fields()]),
        }
    }
}
