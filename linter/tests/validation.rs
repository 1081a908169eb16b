use linter::schema::Schema;
use linter::validation::rules::{
    SPECIFIED_RULE_NAMES, no_deprecated_fields, operations_must_have_names, required_fields,
    specified_rule, specified_rules, type_names_should_be_capitalized,
};
use linter::validation::{RuleFactory, ValidationError, validate};
use tagql::document::Pos;
use tagql::parser::parse_document;

const SDL: &str = r#"
type Query {
  user(id: ID!): User
  users(first: Int, role: Role): [User!]!
  viewer: User
  search(term: String!): [SearchResult]
  oldField: String @deprecated(reason: "Use newField")
  legacy: String @deprecated
}

type Mutation { rename(input: RenameInput!): User }

interface Node { id: ID! }

type User implements Node {
  id: ID!
  name: String
  friends: [User!]!
  role: Role
}

enum Role { ADMIN GUEST @deprecated(reason: "Guests are gone") }

union SearchResult = User

input RenameInput { id: ID!, name: String!, role: Role }
"#;

fn run(rules: &[RuleFactory], query: &str) -> Vec<ValidationError> {
    let schema = Schema::from_sdl(SDL).expect("schema");
    let document = parse_document(query).expect("query parses");
    validate(&schema, &document, rules)
}

fn errors(rule: &str, query: &str) -> Vec<ValidationError> {
    run(&[specified_rule(rule).expect("known rule")], query)
}

fn messages(errors: &[ValidationError]) -> Vec<&str> {
    errors.iter().map(|e| e.message.as_str()).collect()
}

fn single(rule: &str, query: &str) -> ValidationError {
    let mut found = errors(rule, query);
    assert_eq!(found.len(), 1, "{rule}: {:?}", messages(&found));
    found.remove(0)
}

// ----------------------------------------------------------------------------
// Specified rules
// ----------------------------------------------------------------------------

#[test]
fn registry_knows_every_specified_rule() {
    assert_eq!(specified_rules().len(), SPECIFIED_RULE_NAMES.len());
    for name in SPECIFIED_RULE_NAMES {
        assert_eq!(specified_rule(name).unwrap().name(), name);
    }
    assert!(specified_rule("OperationsMustHaveNames").is_none());
}

#[test]
fn valid_document_passes_every_specified_rule() {
    let query = r#"
        query Profile($id: ID!, $skip: Boolean!) {
          user(id: $id) { ...UserParts friends @skip(if: $skip) { id } }
          search(term: "x") { ... on User { id __typename } }
        }
        fragment UserParts on User { id name role }
    "#;
    assert!(run(&specified_rules(), query).is_empty());
}

#[test]
fn unique_operation_names() {
    let err = single(
        "UniqueOperationNames",
        "query A { viewer { id } } query A { viewer { id } }",
    );
    assert_eq!(err.message, "There can be only one operation named \"A\".");
    assert_eq!(err.locations, [Pos::new(1, 7), Pos::new(1, 33)]);
}

#[test]
fn lone_anonymous_operation() {
    let err = single(
        "LoneAnonymousOperation",
        "{ viewer { id } } query B { viewer { id } }",
    );
    assert_eq!(
        err.message,
        "This anonymous operation must be the only defined operation."
    );
    assert_eq!(err.locations, [Pos::new(1, 1)]);
}

#[test]
fn known_type_names() {
    let err = single(
        "KnownTypeNames",
        "query ($id: Identifier) { user(id: $id) { id } }",
    );
    assert_eq!(err.message, "Unknown type \"Identifier\".");
    assert_eq!(err.locations, [Pos::new(1, 13)]);
}

#[test]
fn fragments_on_composite_types() {
    let err = single(
        "FragmentsOnCompositeTypes",
        "fragment F on Role { id }",
    );
    assert_eq!(
        err.message,
        "Fragment \"F\" cannot condition on non composite type \"Role\"."
    );
    assert_eq!(err.locations, [Pos::new(1, 15)]);

    let err = single(
        "FragmentsOnCompositeTypes",
        "{ viewer { ... on Role { id } } }",
    );
    assert_eq!(
        err.message,
        "Fragment cannot condition on non composite type \"Role\"."
    );
    assert_eq!(err.locations, [Pos::new(1, 19)]);
}

#[test]
fn variables_are_input_types() {
    let err = single(
        "VariablesAreInputTypes",
        "query Q($u: User) { viewer { id } }",
    );
    assert_eq!(err.message, "Variable \"$u\" cannot be non-input type \"User\".");
    assert_eq!(err.locations, [Pos::new(1, 13)]);
    assert!(errors("VariablesAreInputTypes", "query Q($r: [Role!]) { viewer { id } }").is_empty());
}

#[test]
fn scalar_leafs() {
    let err = single("ScalarLeafs", "{ viewer { name { x } } }");
    assert_eq!(
        err.message,
        "Field \"name\" must not have a selection since type \"String\" has no subfields."
    );
    assert_eq!(err.locations, [Pos::new(1, 17)]);

    let err = single("ScalarLeafs", "{ viewer }");
    assert_eq!(
        err.message,
        "Field \"viewer\" of type \"User\" must have a selection of subfields. Did you mean \"viewer { ... }\"?"
    );
    assert_eq!(err.locations, [Pos::new(1, 3)]);

    let err = single("ScalarLeafs", "{ users }");
    assert!(err.message.contains("of type \"[User!]!\""));
}

#[test]
fn fields_on_correct_type() {
    let err = single("FieldsOnCorrectType", "{ viewer { email } }");
    assert_eq!(err.message, "Cannot query field \"email\" on type \"User\".");
    assert_eq!(err.locations, [Pos::new(1, 12)]);
    assert!(errors("FieldsOnCorrectType", "{ search { __typename } }").is_empty());
}

#[test]
fn unique_fragment_names() {
    let err = single(
        "UniqueFragmentNames",
        "fragment F on User { id } fragment F on User { name }",
    );
    assert_eq!(err.message, "There can be only one fragment named \"F\".");
    assert_eq!(err.locations, [Pos::new(1, 10), Pos::new(1, 36)]);
}

#[test]
fn known_fragment_names() {
    let err = single("KnownFragmentNames", "{ viewer { ...Missing } }");
    assert_eq!(err.message, "Unknown fragment \"Missing\".");
    assert_eq!(err.locations, [Pos::new(1, 15)]);
}

#[test]
fn no_unused_fragments() {
    let found = errors(
        "NoUnusedFragments",
        "query Q { viewer { ...A } } fragment A on User { ...C } fragment B on User { name } fragment C on User { id }",
    );
    assert_eq!(messages(&found), ["Fragment \"B\" is never used."]);
}

#[test]
fn no_fragment_cycles() {
    let err = single("NoFragmentCycles", "fragment A on User { ...A }");
    assert_eq!(err.message, "Cannot spread fragment \"A\" within itself.");

    let err = single(
        "NoFragmentCycles",
        "fragment A on User { friends { ...B } } fragment B on User { ...A }",
    );
    assert_eq!(
        err.message,
        "Cannot spread fragment \"A\" within itself via \"B\"."
    );
    assert_eq!(err.locations.len(), 2);
}

#[test]
fn unique_variable_names() {
    let err = single(
        "UniqueVariableNames",
        "query Q($a: Int, $a: Int) { viewer { id } }",
    );
    assert_eq!(err.message, "There can be only one variable named \"$a\".");
}

#[test]
fn no_undefined_variables() {
    let err = single("NoUndefinedVariables", "query Q { user(id: $id) { id } }");
    assert_eq!(
        err.message,
        "Variable \"$id\" is not defined by operation \"Q\"."
    );
    assert_eq!(err.locations, [Pos::new(1, 20), Pos::new(1, 1)]);

    let err = single("NoUndefinedVariables", "{ user(id: $id) { id } }");
    assert_eq!(err.message, "Variable \"$id\" is not defined.");

    // Usages inside spread fragments count against the operation.
    let err = single(
        "NoUndefinedVariables",
        "query Q { ...F } fragment F on Query { user(id: $id) { id } }",
    );
    assert_eq!(
        err.message,
        "Variable \"$id\" is not defined by operation \"Q\"."
    );
}

#[test]
fn no_unused_variables() {
    let err = single("NoUnusedVariables", "query Q($id: ID) { viewer { id } }");
    assert_eq!(
        err.message,
        "Variable \"$id\" is never used in operation \"Q\"."
    );
    let err = single("NoUnusedVariables", "query ($id: ID) { viewer { id } }");
    assert_eq!(err.message, "Variable \"$id\" is never used.");
    assert!(
        errors(
            "NoUnusedVariables",
            "query Q($id: ID!) { ...F } fragment F on Query { user(id: $id) { id } }"
        )
        .is_empty()
    );
}

#[test]
fn known_directives() {
    let err = single("KnownDirectives", "{ viewer @live { id } }");
    assert_eq!(err.message, "Unknown directive \"@live\".");
    assert!(errors("KnownDirectives", "{ viewer @include(if: true) { id } }").is_empty());
}

#[test]
fn known_argument_names() {
    let err = single("KnownArgumentNames", "{ user(id: 1, limit: 2) { id } }");
    assert_eq!(err.message, "Unknown argument \"limit\" on field \"Query.user\".");

    let err = single(
        "KnownArgumentNames",
        "{ viewer @skip(if: true, when: 1) { id } }",
    );
    assert_eq!(err.message, "Unknown argument \"when\" on directive \"@skip\".");

    // Unknown fields are someone else's problem.
    assert!(errors("KnownArgumentNames", "{ nope(x: 1) }").is_empty());
}

#[test]
fn unique_argument_names() {
    let err = single("UniqueArgumentNames", "{ user(id: 1, id: 2) { id } }");
    assert_eq!(err.message, "There can be only one argument named \"id\".");
    assert_eq!(err.locations, [Pos::new(1, 8), Pos::new(1, 15)]);
}

#[test]
fn provided_non_null_arguments() {
    let err = single("ProvidedNonNullArguments", "{ user { id } }");
    assert_eq!(
        err.message,
        "Field \"user\" argument \"id\" of type \"ID!\" is required, but it was not provided."
    );
    assert_eq!(err.locations, [Pos::new(1, 3)]);

    let err = single("ProvidedNonNullArguments", "{ viewer @include { id } }");
    assert_eq!(
        err.message,
        "Directive \"@include\" argument \"if\" of type \"Boolean!\" is required, but it was not provided."
    );
}

#[test]
fn possible_fragment_spreads() {
    let err = single(
        "PossibleFragmentSpreads",
        "{ viewer { ... on Query { __typename } } }",
    );
    assert_eq!(
        err.message,
        "Fragment cannot be spread here as objects of type \"User\" can never be of type \"Query\"."
    );
    assert_eq!(err.locations, [Pos::new(1, 12)]);

    let err = single(
        "PossibleFragmentSpreads",
        "{ viewer { ...F } } fragment F on Query { __typename }",
    );
    assert_eq!(
        err.message,
        "Fragment \"F\" cannot be spread here as objects of type \"User\" can never be of type \"Query\"."
    );

    // Interfaces and unions overlap through their possible types.
    assert!(
        errors(
            "PossibleFragmentSpreads",
            "{ viewer { ... on Node { id } } search(term: \"a\") { ... on Node { id } } }"
        )
        .is_empty()
    );
}

#[test]
fn unique_directives_per_location() {
    let err = single(
        "UniqueDirectivesPerLocation",
        "{ viewer @include(if: true) @include(if: false) { id } }",
    );
    assert_eq!(
        err.message,
        "The directive \"include\" can only be used once at this location."
    );
    assert_eq!(err.locations, [Pos::new(1, 10), Pos::new(1, 29)]);

    let schema = Schema::from_sdl(
        "directive @tag(name: String) repeatable on FIELD type Query { a: Int }",
    )
    .unwrap();
    let document = parse_document("{ a @tag(name: \"x\") @tag(name: \"y\") }").unwrap();
    let rule = specified_rule("UniqueDirectivesPerLocation").unwrap();
    assert!(validate(&schema, &document, &[rule]).is_empty());
}

#[test]
fn values_of_correct_type() {
    let err = single("ValuesOfCorrectType", "{ user(id: true) { id } }");
    assert_eq!(err.message, "Expected type ID!, found true.");
    assert_eq!(err.locations, [Pos::new(1, 12)]);

    let message = |query: &str| single("ValuesOfCorrectType", query).message;
    assert_eq!(
        message("{ users(first: \"ten\") { id } }"),
        "Expected type Int, found \"ten\"."
    );
    assert_eq!(
        message("{ users(first: 3000000000) { id } }"),
        "Expected type Int, found 3000000000."
    );
    assert_eq!(message("{ users(role: OWNER) { id } }"), "Expected type Role, found OWNER.");
    assert_eq!(message("{ user(id: null) { id } }"), "Expected type ID!, found null.");
    // The list is rejected as a whole, not item by item.
    assert_eq!(
        message("{ users(first: [\"a\"]) { id } }"),
        "Expected type Int, found [\"a\"]."
    );

    let found = errors(
        "ValuesOfCorrectType",
        "mutation M { rename(input: { id: 1, role: ADMIN, nick: \"x\" }) { id } }",
    );
    assert_eq!(
        messages(&found),
        [
            "Field RenameInput.name of required type String! was not provided.",
            "Field \"nick\" is not defined by type RenameInput.",
        ]
    );

    assert!(
        errors(
            "ValuesOfCorrectType",
            "{ users(first: 1, role: ADMIN) { id } user(id: 7) { id } search(term: \"x\") { __typename } }"
        )
        .is_empty()
    );
}

#[test]
fn unique_input_field_names() {
    let err = single(
        "UniqueInputFieldNames",
        "mutation M { rename(input: { id: 1, name: \"a\", name: \"b\" }) { id } }",
    );
    assert_eq!(err.message, "There can be only one input field named \"name\".");
    assert_eq!(err.locations, [Pos::new(1, 37), Pos::new(1, 48)]);
}

#[test]
fn variables_default_value_allowed() {
    let err = single(
        "VariablesDefaultValueAllowed",
        "query Q($id: ID! = 1) { user(id: $id) { id } }",
    );
    assert_eq!(
        err.message,
        "Variable \"$id\" of type \"ID!\" is required and will not use the default value. Perhaps you meant to use type \"ID\"."
    );
    assert_eq!(err.locations, [Pos::new(1, 20)]);
    assert!(
        errors(
            "VariablesDefaultValueAllowed",
            "query Q($id: ID = 1) { user(id: $id) { id } }"
        )
        .is_empty()
    );
}

#[test]
fn variables_in_allowed_position() {
    let err = single(
        "VariablesInAllowedPosition",
        "query Q($id: ID) { user(id: $id) { id } }",
    );
    assert_eq!(
        err.message,
        "Variable \"$id\" of type \"ID\" used in position expecting type \"ID!\"."
    );
    assert_eq!(err.locations, [Pos::new(1, 9), Pos::new(1, 29)]);

    // A default value stands in for the missing non-null.
    assert!(
        errors(
            "VariablesInAllowedPosition",
            "query Q($id: ID = \"1\") { user(id: $id) { id } }"
        )
        .is_empty()
    );

    // Usages inside fragments are checked against each operation.
    let err = single(
        "VariablesInAllowedPosition",
        "query Q($first: String) { ...F } fragment F on Query { users(first: $first) { id } }",
    );
    assert_eq!(
        err.message,
        "Variable \"$first\" of type \"String\" used in position expecting type \"Int\"."
    );
}

#[test]
fn overlapping_fields_can_be_merged() {
    let err = single(
        "OverlappingFieldsCanBeMerged",
        "{ viewer { x: id x: name } }",
    );
    assert_eq!(
        err.message,
        "Fields \"x\" conflict because id and name are different fields. Use different aliases on the fields to fetch both if this was intentional."
    );
    assert_eq!(err.locations, [Pos::new(1, 12), Pos::new(1, 18)]);

    let message = |query: &str| single("OverlappingFieldsCanBeMerged", query).message;
    assert!(
        message("{ users(first: 1) { id } users(first: 2) { id } }")
            .contains("because they have differing arguments.")
    );
    assert!(
        message("{ viewer { id } viewer { id: name } }").starts_with(
            "Fields \"viewer\" conflict because subfields \"id\" conflict because id and name are different fields."
        )
    );
    assert!(
        message("{ viewer { ...A ...B } } fragment A on User { x: id } fragment B on User { x: name }")
            .starts_with("Fields \"x\" conflict because id and name are different fields.")
    );

    assert!(
        errors(
            "OverlappingFieldsCanBeMerged",
            "{ viewer { id ...F id } } fragment F on User { id name }"
        )
        .is_empty()
    );
}

#[test]
fn errors_come_back_in_walk_order() {
    let found = run(
        &specified_rules(),
        "{ viewer { email } user { id } }",
    );
    assert_eq!(
        messages(&found),
        [
            "Cannot query field \"email\" on type \"User\".",
            "Field \"user\" argument \"id\" of type \"ID!\" is required, but it was not provided.",
        ]
    );
}

// ----------------------------------------------------------------------------
// Custom rules
// ----------------------------------------------------------------------------

#[test]
fn operations_must_be_named() {
    let found = run(&[operations_must_have_names()], "{ viewer { id } }");
    assert_eq!(messages(&found), ["All operations must be named"]);
    assert_eq!(found[0].locations, [Pos::new(1, 1)]);
    assert!(run(&[operations_must_have_names()], "query Q { viewer { id } }").is_empty());
}

#[test]
fn type_names_should_be_capitalized_rule() {
    let found = run(
        &[type_names_should_be_capitalized()],
        "query Q($id: iD) { viewer { ... on user { id } } }",
    );
    assert_eq!(
        messages(&found),
        [
            "All type names should start with a capital letter",
            "All type names should start with a capital letter",
        ]
    );
    assert_eq!(found[0].locations, [Pos::new(1, 14)]);
}

#[test]
fn deprecated_fields_and_enum_values() {
    let found = run(&[no_deprecated_fields()], "{ oldField legacy }");
    assert_eq!(
        messages(&found),
        [
            "The field Query.oldField is deprecated. Use newField",
            "The field Query.legacy is deprecated. No longer supported",
        ]
    );

    let found = run(&[no_deprecated_fields()], "{ users(role: GUEST) { id } }");
    assert_eq!(
        messages(&found),
        ["The enum value Role.GUEST is deprecated. Guests are gone"]
    );
    assert_eq!(found[0].locations, [Pos::new(1, 15)]);

    // Enum values nested in input objects are typed through the object.
    let found = run(
        &[no_deprecated_fields()],
        "mutation M { rename(input: { id: 1, name: \"x\", role: GUEST }) { id } }",
    );
    assert_eq!(found.len(), 1);
    assert!(run(&[no_deprecated_fields()], "{ users(role: ADMIN) { id } }").is_empty());
}

#[test]
fn required_fields_must_be_selected() {
    let rule = || required_fields(vec!["id".to_string()]);

    let found = run(&[rule()], "query Q { viewer { name } }");
    assert_eq!(messages(&found), ["'id' field required on 'viewer'"]);
    assert_eq!(found[0].locations, [Pos::new(1, 11)]);

    let found = run(&[rule()], "query Q { viewer { id friends { name } } }");
    assert_eq!(messages(&found), ["'id' field required on 'friends'"]);

    // One level of inline fragment is searched.
    assert!(run(&[rule()], "query Q { viewer { ... on User { id } } }").is_empty());
    let found = run(&[rule()], "query Q { viewer { ... on User { ... on User { id } } } }");
    assert_eq!(found.len(), 1);

    // A spread may select it.
    assert!(
        run(
            &[rule()],
            "query Q { viewer { ...F } } fragment F on User { id }"
        )
        .is_empty()
    );

    // Unions do not declare fields.
    assert!(run(&[rule()], "query Q { search(term: \"a\") { __typename } }").is_empty());
}
