use tagql::document::type_system::{TypeDefinitionKind, TypeSystemDefinition};
use tagql::document::{Definition, OperationType, Pos, Selection, ValueKind};
use tagql::parser::{MAX_NESTING_DEPTH, parse_document, parse_schema};

fn syntax_error(source: &str) -> (String, Pos) {
    let err = parse_document(source).expect_err("expected a syntax error");
    (err.message.clone(), err.first_location().expect("location"))
}

#[test]
fn parses_named_query_with_variables() {
    let doc = parse_document(
        "query User($id: ID!, $first: Int = 10) @live {\n  user(id: $id) { name friends(first: $first) { id } }\n}",
    )
    .unwrap();
    let op = doc.operations().next().unwrap();
    assert_eq!(op.operation, OperationType::Query);
    assert_eq!(op.name.as_ref().unwrap().value, "User");
    assert_eq!(op.variable_definitions.len(), 2);
    assert_eq!(op.variable_definitions[0].var_type.to_string(), "ID!");
    assert!(matches!(
        op.variable_definitions[1].default_value.as_ref().unwrap().kind,
        ValueKind::Int(ref v) if v == "10"
    ));
    assert_eq!(op.directives[0].name.value, "live");

    let Selection::Field(user) = &op.selection_set.selections[0] else {
        panic!("expected field");
    };
    assert_eq!(user.name.pos, Pos::new(2, 3));
    assert!(matches!(user.arguments[0].value.kind, ValueKind::Variable(ref v) if v == "id"));
}

#[test]
fn parses_shorthand_fragments_and_aliases() {
    let doc = parse_document(
        "{ me: viewer { ...Parts ... on User { id } ... @include(if: true) { name } } }\nfragment Parts on Viewer { login }",
    )
    .unwrap();
    assert_eq!(doc.definitions.len(), 2);
    let Definition::Operation(op) = &doc.definitions[0] else {
        panic!("expected operation");
    };
    assert!(op.name.is_none());
    let Selection::Field(viewer) = &op.selection_set.selections[0] else {
        panic!("expected field");
    };
    assert_eq!(viewer.response_key(), "me");
    let selections = &viewer.selection_set.as_ref().unwrap().selections;
    assert!(matches!(selections[0], Selection::FragmentSpread(ref s) if s.name.value == "Parts"));
    assert!(matches!(
        selections[1],
        Selection::InlineFragment(ref f) if f.type_condition.as_ref().unwrap().value == "User"
    ));
    assert!(matches!(
        selections[2],
        Selection::InlineFragment(ref f) if f.type_condition.is_none()
    ));
    assert_eq!(doc.fragments().next().unwrap().type_condition.value, "Viewer");
}

#[test]
fn parses_complex_values() {
    let doc = parse_document(
        r#"mutation { add(input: {tags: ["a", "b"], score: -1.5e3, kind: BIG, note: null, ok: false, text: """
            hello
              world
        """}) { id } }"#,
    )
    .unwrap();
    let op = doc.operations().next().unwrap();
    assert_eq!(op.operation, OperationType::Mutation);
    let Selection::Field(add) = &op.selection_set.selections[0] else {
        panic!("expected field");
    };
    let ValueKind::Object(fields) = &add.arguments[0].value.kind else {
        panic!("expected object");
    };
    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["tags", "score", "kind", "note", "ok", "text"]);
    assert!(matches!(fields[1].value.kind, ValueKind::Float(ref v) if v == "-1.5e3"));
    assert!(matches!(fields[2].value.kind, ValueKind::Enum(ref v) if v == "BIG"));
    assert!(matches!(fields[5].value.kind, ValueKind::String(ref v) if v == "hello\n  world"));
}

#[test]
fn comments_and_commas_are_ignored() {
    let doc = parse_document("# leading\n{ a, b # trailing\n, c }").unwrap();
    let op = doc.operations().next().unwrap();
    assert_eq!(op.selection_set.selections.len(), 3);
}

#[test]
fn empty_selection_set_expects_a_name() {
    assert_eq!(
        syntax_error("{ }"),
        ("Syntax Error: Expected Name, found \"}\".".to_string(), Pos::new(1, 3))
    );
}

#[test]
fn empty_document_is_unexpected_eof() {
    assert_eq!(
        syntax_error("  \n"),
        ("Syntax Error: Unexpected <EOF>.".to_string(), Pos::new(2, 1))
    );
}

#[test]
fn type_definitions_are_not_executable() {
    assert_eq!(
        syntax_error("type Foo { a: Int }"),
        ("Syntax Error: Unexpected Name \"type\".".to_string(), Pos::new(1, 1))
    );
}

#[test]
fn anonymous_fragment_is_rejected() {
    assert_eq!(
        syntax_error("fragment on User { id }"),
        ("Syntax Error: Unexpected Name \"on\".".to_string(), Pos::new(1, 10))
    );
}

#[test]
fn lexer_errors_carry_positions() {
    assert_eq!(
        syntax_error("{\n  a(b: \"open\n}"),
        ("Syntax Error: Unterminated string.".to_string(), Pos::new(2, 13))
    );
    assert_eq!(
        syntax_error("{ a % }"),
        ("Syntax Error: Unexpected character: \"%\".".to_string(), Pos::new(1, 5))
    );
    assert_eq!(
        syntax_error("{ a(n: 01) }"),
        (
            "Syntax Error: Invalid number, unexpected digit after 0: \"1\".".to_string(),
            Pos::new(1, 9)
        )
    );
}

#[test]
fn syntax_error_before_an_unterminated_string_wins() {
    assert_eq!(
        syntax_error("query Q { ] } \"abc"),
        ("Syntax Error: Expected Name, found \"]\".".to_string(), Pos::new(1, 11))
    );
    let (message, pos) = syntax_error("query Q { a } \"abc");
    assert_eq!(message, "Syntax Error: Unterminated string.");
    assert_eq!(pos.line, 1);
}

#[test]
fn deeply_nested_lists_are_rejected() {
    let depth = 100_000;
    let source = format!("{{ a(b: {}1{}) }}", "[".repeat(depth), "]".repeat(depth));
    let (message, _) = syntax_error(&source);
    assert!(message.contains("nesting"), "{message}");

    let list_type = format!("{}Int{}", "[".repeat(depth), "]".repeat(depth));
    let (message, _) = syntax_error(&format!("query Q($v: {list_type}) {{ a }}"));
    assert!(message.contains("nesting"), "{message}");
}

#[test]
fn deeply_nested_selections_are_rejected() {
    let nest = |depth: usize| format!("{}a{}", "{ a ".repeat(depth), " }".repeat(depth));

    let (message, _) = syntax_error(&nest(100_000));
    assert_eq!(
        message,
        format!("Syntax Error: Document nesting exceeds {} levels.", MAX_NESTING_DEPTH)
    );
    assert!(parse_document(&nest(MAX_NESTING_DEPTH / 2)).is_ok());
}

#[test]
fn columns_count_utf16_code_units() {
    assert_eq!(
        syntax_error("{ a(s: \"\u{1F600}\") % }"),
        ("Syntax Error: Unexpected character: \"%\".".to_string(), Pos::new(1, 14))
    );
}

#[test]
fn missing_closing_paren_reports_found_token() {
    assert_eq!(
        syntax_error("query Q($id: ID! { a }"),
        ("Syntax Error: Expected \"$\", found \"{\".".to_string(), Pos::new(1, 18))
    );
}

#[test]
fn parses_schema_definitions() {
    let schema = parse_schema(
        r#"
        schema { query: Root }
        """The root"""
        type Root implements Node & Entity @key(fields: "id") {
          "Node id"
          id: ID!
          users(first: Int = 10, role: Role): [User!]! @deprecated(reason: "use people")
        }
        interface Node { id: ID! }
        interface Entity { id: ID! }
        union Result = | User | Root
        enum Role { ADMIN GUEST @deprecated }
        input Filter { role: Role = ADMIN, ids: [ID!] }
        scalar Date @specifiedBy(url: "https://example.com")
        directive @key(fields: String!) repeatable on OBJECT | INTERFACE
        extend type Root { extra: Date }
        "#,
    )
    .unwrap();
    assert_eq!(schema.definitions.len(), 10);

    let TypeSystemDefinition::Type(root) = &schema.definitions[1] else {
        panic!("expected type");
    };
    assert_eq!(root.description.as_deref(), Some("The root"));
    let TypeDefinitionKind::Object { interfaces, fields } = &root.kind else {
        panic!("expected object");
    };
    assert_eq!(interfaces.len(), 2);
    assert_eq!(fields[0].description.as_deref(), Some("Node id"));
    assert_eq!(fields[1].field_type.to_string(), "[User!]!");
    assert_eq!(fields[1].arguments.len(), 2);
    assert_eq!(root.directives[0].name.value, "key");

    let TypeSystemDefinition::Type(result) = &schema.definitions[4] else {
        panic!("expected type");
    };
    assert!(matches!(&result.kind, TypeDefinitionKind::Union { members } if members.len() == 2));

    let TypeSystemDefinition::Directive(key) = &schema.definitions[8] else {
        panic!("expected directive");
    };
    assert!(key.repeatable);
    assert_eq!(key.locations.len(), 2);
    assert!(matches!(schema.definitions[9], TypeSystemDefinition::TypeExtension(_)));
}

#[test]
fn schema_errors_are_syntax_errors() {
    let err = parse_schema("type Query {\n  a Int\n}").unwrap_err();
    assert_eq!(err.message, "Syntax Error: Expected \":\", found Name \"Int\".");
    assert_eq!(err.first_location(), Some(Pos::new(2, 5)));
}
