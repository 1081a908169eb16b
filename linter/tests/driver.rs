use std::path::Path;

use linter::settings::InterpolationPolicy;
use linter::{LintConfig, LintDiagnostic, ResolvedConfig, lint_source, process, scan_tagged_templates};
use tagql::position::Location;

const SDL: &str = "type Query { viewer: User user(id: ID!): User a(b: Int): A } type User { id: ID! name: String } type A { c: Int }";

fn config(toml: &str) -> ResolvedConfig {
    LintConfig::from_toml_str(toml)
        .expect("valid toml")
        .resolve(Path::new("."))
        .expect("valid config")
}

fn with_schema(extra: &str) -> ResolvedConfig {
    config(&format!("[[schema]]\nschema-string = \"{SDL}\"\n{extra}"))
}

fn lint_js(source: &str, config: &ResolvedConfig) -> Vec<LintDiagnostic> {
    lint_source(Path::new("query.js"), source, config)
}

fn single(diagnostics: Vec<LintDiagnostic>) -> LintDiagnostic {
    assert_eq!(diagnostics.len(), 1, "{diagnostics:#?}");
    diagnostics.into_iter().next().unwrap()
}

#[test]
fn validation_error_on_the_tag_line() {
    let config = with_schema("");
    let diagnostic = single(lint_js("const q = gql`{ viewer { email } }`;", &config));
    assert_eq!(diagnostic.rule, "template-strings");
    assert_eq!(
        diagnostic.message,
        "Cannot query field \"email\" on type \"User\"."
    );
    assert_eq!(diagnostic.location, Location::new(1, 25));
    assert_eq!(diagnostic.node.start, Location::new(1, 10));
}

#[test]
fn astral_chars_before_the_tag_shift_two_columns() {
    let config = with_schema("");
    let source = "'\u{1F600}'; const q = gql`{ viewer { email } }`;";
    let diagnostic = single(lint_js(source, &config));
    // Five chars but six UTF-16 units ahead of `const`.
    assert_eq!(diagnostic.location, Location::new(1, 31));
    assert_eq!(diagnostic.node.start, Location::new(1, 16));
}

#[test]
fn syntax_error_on_a_later_line() {
    let config = with_schema("");
    let source = "const q = gql`\n  query {\n    viewer { id }\n  ]\n`;";
    let diagnostic = single(lint_js(source, &config));
    assert!(diagnostic.message.starts_with("Syntax Error:"), "{}", diagnostic.message);
    assert!(!diagnostic.message.contains('\n'));
    assert_eq!(diagnostic.location, Location::new(4, 2));
}

#[test]
fn valid_templates_and_other_tags_are_clean() {
    let config = with_schema("");
    let source = "
        const a = gql`query Q { viewer { id name } }`;
        const b = graphql`this is not { graphql`;
        const c = `{ nope }`;
    ";
    assert!(lint_js(source, &config).is_empty());
}

#[test]
fn relay_variable_interpolation_is_accepted() {
    let config = config(&format!(
        "[[schema]]\nenv = \"relay\"\nschema-string = \"{SDL}\""
    ));
    let source = "const q = Relay.QL`{ a(b: ${x}) { c } }`;";
    assert!(lint_js(source, &config).is_empty());
}

#[test]
fn interpolation_inside_braces() {
    let source = "const q = gql`{ a ${x} }`;";

    let silent = with_schema("");
    assert!(lint_js(source, &silent).is_empty());

    let report = config(&format!(
        "interpolation = \"report\"\n[[schema]]\nschema-string = \"{SDL}\""
    ));
    let diagnostic = single(lint_js(source, &report));
    assert_eq!(
        diagnostic.message,
        "Invalid interpolation - fragment interpolation must occur outside of the brackets."
    );
    assert_eq!(diagnostic.location, Location::new(1, 20));
}

#[test]
fn apollo_fragment_interpolation_outside_braces() {
    let config = config(&format!(
        "[[schema]]\nenv = \"apollo\"\nschema-string = \"{SDL}\""
    ));
    let source = "const q = gql`query Q { viewer { ...F } } ${fragment}`;";
    assert!(lint_js(source, &config).is_empty());
}

#[test]
fn required_fields_rule() {
    let config = with_schema("[rules]\nrequired-fields = { required-fields = [\"id\"] }");
    let diagnostic = single(lint_js(
        "const q = gql`query Q { user(id: 1) { name } }`;",
        &config,
    ));
    assert_eq!(diagnostic.rule, "required-fields");
    assert_eq!(diagnostic.message, "'id' field required on 'user'");
    assert_eq!(diagnostic.location, Location::new(1, 24));
}

#[test]
fn named_operations_rule() {
    let config = with_schema("[rules]\nnamed-operations = true");
    let diagnostic = single(lint_js("const q = gql`{ viewer { id } }`;", &config));
    assert_eq!(diagnostic.rule, "named-operations");
    assert_eq!(diagnostic.message, "All operations must be named");
    assert_eq!(diagnostic.location, Location::new(1, 14));
}

#[test]
fn lokka_accepts_anonymous_fragments() {
    let source = "const f = gql`fragment on User { id }`;";

    let lokka = config(&format!(
        "[[schema]]\nenv = \"lokka\"\nschema-string = \"{SDL}\""
    ));
    assert!(lint_js(source, &lokka).is_empty());

    let apollo = config(&format!(
        "[[schema]]\nenv = \"apollo\"\nschema-string = \"{SDL}\""
    ));
    let diagnostic = single(lint_js(source, &apollo));
    assert!(diagnostic.message.starts_with("Syntax Error:"));
}

#[test]
fn graphql_files_map_without_a_tag_offset() {
    let config = config(&format!(
        "[[schema]]\nenv = \"literal\"\nschema-string = \"{SDL}\""
    ));
    let source = "query Q {\n  viewer { email }\n}\n";
    let diagnostic = single(lint_source(Path::new("q.graphql"), source, &config));
    assert_eq!(diagnostic.location, Location::new(2, 11));

    // Without a literal setting nothing claims the file.
    assert!(lint_source(Path::new("q.graphql"), source, &with_schema("")).is_empty());
}

#[test]
fn each_tag_uses_its_own_setting() {
    let config = config(&format!(
        r#"
        [[schema]]
        schema-string = "{SDL}"

        [[schema]]
        tag-name = "other"
        schema-string = "type Query {{ other: Int }}"
        "#
    ));
    let source = "
const a = gql`{ viewer { id } }`;
const b = other`{ viewer { id } }`;
const c = other`{ other }`;
";
    let diagnostic = single(lint_js(source, &config));
    assert_eq!(diagnostic.location.line, 3);
    assert_eq!(
        diagnostic.message,
        "Cannot query field \"viewer\" on type \"Query\"."
    );
}

#[test]
fn diagnostics_are_sorted_by_location() {
    let config = with_schema("[rules]\ntemplate-strings = true\nnamed-operations = true");
    let source = "
const a = gql`{ viewer { email } }`;
const b = gql`{ viewer { id } }`;
";
    let diagnostics = lint_js(source, &config);
    let found: Vec<(usize, &str)> = diagnostics
        .iter()
        .map(|d| (d.location.line, d.rule.as_str()))
        .collect();
    assert_eq!(
        found,
        [
            (2, "named-operations"),
            (2, "template-strings"),
            (3, "named-operations"),
        ]
    );
}

#[test]
fn process_reports_one_problem_per_call_site() {
    let config = with_schema("");
    let settings = &config.settings[0];
    let sites = scan_tagged_templates("gql`{ viewer { email } user { nope } }`");
    let diagnostic = process(
        "template-strings",
        &sites[0],
        settings,
        &settings.validators,
        InterpolationPolicy::Silent,
    )
    .unwrap();
    assert!(diagnostic.message.contains("\"email\""));

    let rendered = diagnostic.to_diagnostic(0, "gql`{ viewer { email } user { nope } }`");
    assert_eq!(rendered.code.as_deref(), Some("template-strings"));
}

#[test]
fn settings_without_schema_only_check_syntax() {
    let config = config("[[schema]]");
    assert!(lint_js("gql`{ anything { goes } }`", &config).is_empty());
    let diagnostic = single(lint_js("gql`{ broken `", &config));
    assert!(diagnostic.message.starts_with("Syntax Error:"));
}
