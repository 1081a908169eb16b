use std::path::Path;

use linter::settings::{InterpolationPolicy, default_tag_name, default_validators};
use linter::validation::RuleFactory;
use linter::validation::rules::SPECIFIED_RULE_NAMES;
use linter::{LintConfig, LintError, LintRule, ResolvedConfig};
use tagql::{Dialect, INTERNAL_TAG};

const SDL: &str = "type Query { a: Int }";

fn resolve(text: &str) -> Result<ResolvedConfig, LintError> {
    LintConfig::from_toml_str(text)
        .expect("valid toml")
        .resolve(Path::new("."))
}

fn names(validators: &[RuleFactory]) -> Vec<&'static str> {
    validators.iter().map(RuleFactory::name).collect()
}

#[test]
fn defaults_per_environment() {
    let config = resolve(&format!(
        r#"
        [[schema]]
        schema-string = "{SDL}"

        [[schema]]
        env = "relay"

        [[schema]]
        env = "literal"
        "#
    ))
    .unwrap();

    let [plain, relay, literal] = &config.settings[..] else {
        panic!("expected three settings");
    };
    assert_eq!(plain.env, Dialect::Unmarked);
    assert_eq!(plain.tag_name, "gql");
    assert!(plain.schema.is_some());
    assert_eq!(names(&plain.validators), SPECIFIED_RULE_NAMES);

    assert_eq!(relay.tag_name, "Relay.QL");
    assert!(relay.schema.is_none());
    let relay_names = names(&relay.validators);
    for excluded in ["KnownDirectives", "ScalarLeafs", "NoUndefinedVariables"] {
        assert!(!relay_names.contains(&excluded), "{excluded}");
    }
    assert!(relay_names.contains(&"FieldsOnCorrectType"));

    assert_eq!(literal.tag_name, INTERNAL_TAG);
    assert!(!names(&literal.validators).contains(&"NoUnusedFragments"));

    assert_eq!(config.interpolation, InterpolationPolicy::Silent);
    assert_eq!(config.rules, [LintRule::TemplateStrings]);
}

#[test]
fn default_helpers_agree_with_resolution() {
    assert_eq!(default_tag_name(Dialect::Apollo), "gql");
    assert_eq!(default_tag_name(Dialect::Lokka), "gql");
    let apollo = names(&default_validators(Dialect::Apollo));
    assert_eq!(apollo.len(), SPECIFIED_RULE_NAMES.len() - 2);
    assert!(!apollo.contains(&"KnownFragmentNames"));
}

#[test]
fn explicit_validators() {
    let config = resolve(
        r#"
        [[schema]]
        env = "relay"
        tag-name = "graphql"
        validators = "all"

        [[schema]]
        validators = ["ScalarLeafs", "KnownTypeNames"]

        [[schema]]
        validators = ["PossibleFragmentSpreads", "ArgumentsOfCorrectType", "DefaultValuesOfCorrectType"]
        "#,
    )
    .unwrap();
    assert_eq!(config.settings[0].tag_name, "graphql");
    assert_eq!(config.settings[0].validators.len(), SPECIFIED_RULE_NAMES.len());
    assert_eq!(
        names(&config.settings[1].validators),
        ["ScalarLeafs", "KnownTypeNames"]
    );
    // Older graphql-js names select the rules that replaced them.
    assert_eq!(
        names(&config.settings[2].validators),
        [
            "PossibleFragmentSpreads",
            "ValuesOfCorrectType",
            "VariablesDefaultValueAllowed"
        ]
    );
}

#[test]
fn rules_table_enables_exactly_what_it_names() {
    let config = resolve(
        r#"
        interpolation = "report"

        [[schema]]

        [rules]
        named-operations = true
        no-deprecated-fields = true
        required-fields = { required-fields = ["id"] }
        "#,
    )
    .unwrap();
    assert_eq!(config.interpolation, InterpolationPolicy::Report);
    assert_eq!(
        config.rules,
        [
            LintRule::NamedOperations,
            LintRule::RequiredFields(vec!["id".to_string()]),
            LintRule::NoDeprecatedFields,
        ]
    );
}

#[test]
fn schema_file_is_relative_to_base_dir() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("schema.graphql"), SDL).unwrap();
    let config = LintConfig::from_toml_str(
        r#"
        [[schema]]
        schema-file = "schema.graphql"
        "#,
    )
    .unwrap()
    .resolve(dir.path())
    .unwrap();
    let schema = config.settings[0].schema.as_ref().unwrap();
    assert!(schema.type_def("Query").is_some());
}

#[test]
fn from_file_reads_and_parses() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tagql.toml");
    std::fs::write(&path, "[[schema]]\nenv = \"apollo\"\n").unwrap();
    let config = LintConfig::from_file(&path).unwrap();
    assert_eq!(config.schema[0].env.as_deref(), Some("apollo"));

    std::fs::write(&path, "[[schema]\n").unwrap();
    assert!(matches!(
        LintConfig::from_file(&path),
        Err(LintError::ConfigSyntax { .. })
    ));
    assert!(matches!(
        LintConfig::from_file(&dir.path().join("missing.toml")),
        Err(LintError::Io { .. })
    ));
}

#[test]
fn configuration_errors() {
    let message = |text: &str| resolve(text).unwrap_err().to_string();

    assert_eq!(message(""), "Must specify at least one [[schema]] entry");
    assert_eq!(
        message("[[schema]]\nenv = \"graphene\""),
        "Invalid option for env, only `apollo`, `lokka`, `relay`, and `literal` supported."
    );
    assert_eq!(
        message(&format!(
            "[[schema]]\nschema-string = \"{SDL}\"\nschema-file = \"s.graphql\""
        )),
        "Specify only one of `schema-string` and `schema-file`"
    );
    assert_eq!(
        message("[[schema]]\nvalidators = [\"NoSuchRule\"]"),
        "Unknown validator \"NoSuchRule\"."
    );
    assert!(message("[[schema]]\nvalidators = \"some\"").contains("\"some\""));
    assert!(matches!(
        resolve("[[schema]]\nschema-string = \"type Foo { a: Int }\""),
        Err(LintError::Schema { .. })
    ));
    assert!(matches!(
        resolve("[[schema]]\nschema-file = \"does/not/exist.graphql\""),
        Err(LintError::Io { .. })
    ));
}

#[test]
fn unknown_keys_are_rejected() {
    assert!(LintConfig::from_toml_str("[[schema]]\ntagName = \"gql\"").is_err());
    assert!(LintConfig::from_toml_str("[rules]\nno-such-rule = true").is_err());
}
