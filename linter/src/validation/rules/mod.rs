mod arguments;
mod custom;
mod directives;
mod fields;
mod fragments;
mod operations;
mod overlapping;
mod types;
mod values;
mod variables;

pub use arguments::{KnownArgumentNames, ProvidedNonNullArguments, UniqueArgumentNames};
pub use custom::{
    NoDeprecatedFields, OperationsMustHaveNames, RequiredFields, TypeNamesShouldBeCapitalized,
};
pub use directives::{KnownDirectives, UniqueDirectivesPerLocation};
pub use fields::{FieldsOnCorrectType, ScalarLeafs};
pub use fragments::{
    FragmentsOnCompositeTypes, KnownFragmentNames, NoFragmentCycles, NoUnusedFragments,
    PossibleFragmentSpreads, UniqueFragmentNames,
};
pub use operations::{LoneAnonymousOperation, UniqueOperationNames};
pub use overlapping::OverlappingFieldsCanBeMerged;
pub use types::KnownTypeNames;
pub use values::{UniqueInputFieldNames, ValuesOfCorrectType};
pub use variables::{
    NoUndefinedVariables, NoUnusedVariables, UniqueVariableNames, VariablesAreInputTypes,
    VariablesDefaultValueAllowed, VariablesInAllowedPosition,
};

use crate::validation::{Rule, RuleFactory};

/// Names of the rules selectable in a `validators` list, in the order they
/// run.
pub const SPECIFIED_RULE_NAMES: [&str; 25] = [
    "UniqueOperationNames",
    "LoneAnonymousOperation",
    "KnownTypeNames",
    "FragmentsOnCompositeTypes",
    "VariablesAreInputTypes",
    "ScalarLeafs",
    "FieldsOnCorrectType",
    "UniqueFragmentNames",
    "KnownFragmentNames",
    "NoUnusedFragments",
    "PossibleFragmentSpreads",
    "NoFragmentCycles",
    "UniqueVariableNames",
    "NoUndefinedVariables",
    "NoUnusedVariables",
    "KnownDirectives",
    "UniqueDirectivesPerLocation",
    "KnownArgumentNames",
    "UniqueArgumentNames",
    "ValuesOfCorrectType",
    "ProvidedNonNullArguments",
    "VariablesDefaultValueAllowed",
    "VariablesInAllowedPosition",
    "OverlappingFieldsCanBeMerged",
    "UniqueInputFieldNames",
];

/// Names from older graphql-js releases, for rules since renamed or merged.
const LEGACY_RULE_NAMES: [(&str, &str); 2] = [
    ("ArgumentsOfCorrectType", "ValuesOfCorrectType"),
    ("DefaultValuesOfCorrectType", "VariablesDefaultValueAllowed"),
];

fn boxed<R: Rule + Default + 'static>() -> Box<dyn Rule> {
    Box::new(R::default())
}

/// Factory for the specified rule called `name`. Legacy names resolve to
/// the rule that replaced them.
pub fn specified_rule(name: &str) -> Option<RuleFactory> {
    let name = LEGACY_RULE_NAMES
        .iter()
        .find(|(legacy, _)| *legacy == name)
        .map_or(name, |(_, current)| *current);
    let (name, build): (&'static str, fn() -> Box<dyn Rule>) = match name {
        "UniqueOperationNames" => ("UniqueOperationNames", boxed::<UniqueOperationNames>),
        "LoneAnonymousOperation" => ("LoneAnonymousOperation", boxed::<LoneAnonymousOperation>),
        "KnownTypeNames" => ("KnownTypeNames", boxed::<KnownTypeNames>),
        "FragmentsOnCompositeTypes" => {
            ("FragmentsOnCompositeTypes", boxed::<FragmentsOnCompositeTypes>)
        }
        "VariablesAreInputTypes" => ("VariablesAreInputTypes", boxed::<VariablesAreInputTypes>),
        "ScalarLeafs" => ("ScalarLeafs", boxed::<ScalarLeafs>),
        "FieldsOnCorrectType" => ("FieldsOnCorrectType", boxed::<FieldsOnCorrectType>),
        "UniqueFragmentNames" => ("UniqueFragmentNames", boxed::<UniqueFragmentNames>),
        "KnownFragmentNames" => ("KnownFragmentNames", boxed::<KnownFragmentNames>),
        "NoUnusedFragments" => ("NoUnusedFragments", boxed::<NoUnusedFragments>),
        "PossibleFragmentSpreads" => {
            ("PossibleFragmentSpreads", boxed::<PossibleFragmentSpreads>)
        }
        "NoFragmentCycles" => ("NoFragmentCycles", boxed::<NoFragmentCycles>),
        "UniqueVariableNames" => ("UniqueVariableNames", boxed::<UniqueVariableNames>),
        "NoUndefinedVariables" => ("NoUndefinedVariables", boxed::<NoUndefinedVariables>),
        "NoUnusedVariables" => ("NoUnusedVariables", boxed::<NoUnusedVariables>),
        "KnownDirectives" => ("KnownDirectives", boxed::<KnownDirectives>),
        "UniqueDirectivesPerLocation" => {
            ("UniqueDirectivesPerLocation", boxed::<UniqueDirectivesPerLocation>)
        }
        "KnownArgumentNames" => ("KnownArgumentNames", boxed::<KnownArgumentNames>),
        "UniqueArgumentNames" => ("UniqueArgumentNames", boxed::<UniqueArgumentNames>),
        "ValuesOfCorrectType" => ("ValuesOfCorrectType", boxed::<ValuesOfCorrectType>),
        "ProvidedNonNullArguments" => {
            ("ProvidedNonNullArguments", boxed::<ProvidedNonNullArguments>)
        }
        "VariablesDefaultValueAllowed" => {
            ("VariablesDefaultValueAllowed", boxed::<VariablesDefaultValueAllowed>)
        }
        "VariablesInAllowedPosition" => {
            ("VariablesInAllowedPosition", boxed::<VariablesInAllowedPosition>)
        }
        "OverlappingFieldsCanBeMerged" => {
            ("OverlappingFieldsCanBeMerged", boxed::<OverlappingFieldsCanBeMerged>)
        }
        "UniqueInputFieldNames" => ("UniqueInputFieldNames", boxed::<UniqueInputFieldNames>),
        _ => return None,
    };
    Some(RuleFactory::new(name, build))
}

/// Every specified rule, in run order.
pub fn specified_rules() -> Vec<RuleFactory> {
    SPECIFIED_RULE_NAMES
        .iter()
        .filter_map(|name| specified_rule(name))
        .collect()
}

pub fn operations_must_have_names() -> RuleFactory {
    RuleFactory::new("OperationsMustHaveNames", boxed::<OperationsMustHaveNames>)
}

pub fn type_names_should_be_capitalized() -> RuleFactory {
    RuleFactory::new(
        "TypeNamesShouldBeCapitalized",
        boxed::<TypeNamesShouldBeCapitalized>,
    )
}

pub fn no_deprecated_fields() -> RuleFactory {
    RuleFactory::new("NoDeprecatedFields", boxed::<NoDeprecatedFields>)
}

pub fn required_fields(required: Vec<String>) -> RuleFactory {
    RuleFactory::new("RequiredFields", move || {
        Box::new(RequiredFields::new(required.clone()))
    })
}
