use std::collections::HashMap;

use tagql::document::type_system::{
    DirectiveDefinition, EnumValueDefinition, FieldDefinition, InputValueDefinition,
    TypeDefinition, TypeDefinitionKind, TypeSystemDefinition,
};
use tagql::document::{Directive, OperationType, ValueKind};
use tagql::parser::{ParseError, parse_schema};
use thiserror::Error;

use super::{
    DEFAULT_DEPRECATION_REASON, DirectiveDef, EnumValueDef, FieldDef, InputValueDef, Schema,
    TYPENAME_FIELD, Type, TypeDef, TypeKind,
};

const BUILTIN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("invalid schema SDL: {0}")]
    Parse(#[from] ParseError),
    #[error("There can be only one type named \"{0}\".")]
    DuplicateType(String),
    #[error("There can be only one directive named \"@{0}\".")]
    DuplicateDirective(String),
    #[error("Cannot extend type \"{0}\" because it is not defined.")]
    ExtensionOfUnknownType(String),
    #[error("Unknown type \"{name}\" referenced by \"{referenced_by}\".")]
    UnknownType { name: String, referenced_by: String },
    #[error("Query root type must be provided.")]
    MissingQueryType,
}

pub(super) fn build_schema(source: &str) -> Result<Schema, SchemaError> {
    let document = parse_schema(source)?;

    let mut types: HashMap<String, TypeDef> = BUILTIN_SCALARS
        .iter()
        .map(|name| (name.to_string(), scalar(name)))
        .collect();
    let mut directives: HashMap<String, DirectiveDef> = builtin_directives()
        .into_iter()
        .map(|d| (d.name.clone(), d))
        .collect();
    let mut roots: HashMap<OperationType, String> = HashMap::new();
    let mut explicit_roots = false;
    let mut extensions = Vec::new();

    for definition in &document.definitions {
        match definition {
            TypeSystemDefinition::Type(def) => {
                let name = def.name.value.clone();
                // Redeclaring a built-in scalar is tolerated.
                let builtin = BUILTIN_SCALARS.contains(&name.as_str())
                    && matches!(def.kind, TypeDefinitionKind::Scalar);
                if types.contains_key(&name) && !builtin {
                    return Err(SchemaError::DuplicateType(name));
                }
                types.insert(name, convert_type(def));
            }
            TypeSystemDefinition::TypeExtension(def) => extensions.push(def),
            TypeSystemDefinition::Schema(schema) => {
                explicit_roots = true;
                for (operation, name) in &schema.root_operations {
                    roots.insert(*operation, name.value.clone());
                }
            }
            TypeSystemDefinition::Directive(def) => {
                let directive = convert_directive(def);
                if directives.contains_key(&directive.name) {
                    return Err(SchemaError::DuplicateDirective(directive.name));
                }
                directives.insert(directive.name.clone(), directive);
            }
        }
    }

    for extension in extensions {
        let Some(target) = types.get_mut(&extension.name.value) else {
            return Err(SchemaError::ExtensionOfUnknownType(
                extension.name.value.clone(),
            ));
        };
        let extra = convert_type(extension);
        target.fields.extend(extra.fields);
        target.interfaces.extend(extra.interfaces);
        target.members.extend(extra.members);
        target.enum_values.extend(extra.enum_values);
        target.input_fields.extend(extra.input_fields);
    }

    if !explicit_roots {
        for (operation, name) in [
            (OperationType::Query, "Query"),
            (OperationType::Mutation, "Mutation"),
            (OperationType::Subscription, "Subscription"),
        ] {
            if types.contains_key(name) {
                roots.insert(operation, name.to_string());
            }
        }
    }

    check_references(&types, &directives, &roots)?;

    let query_type = roots
        .remove(&OperationType::Query)
        .ok_or(SchemaError::MissingQueryType)?;

    tracing::debug!(
        types = types.len(),
        directives = directives.len(),
        query = %query_type,
        "built schema"
    );

    Ok(Schema {
        query_type: Some(query_type),
        mutation_type: roots.remove(&OperationType::Mutation),
        subscription_type: roots.remove(&OperationType::Subscription),
        types,
        directives,
        typename_field: FieldDef {
            name: TYPENAME_FIELD.to_string(),
            description: None,
            arguments: Vec::new(),
            field_type: Type::NonNull(Box::new(Type::Named("String".to_string()))),
            deprecation: None,
        },
    })
}

// ----------------------------------------------------------------------------
// Conversion from the SDL AST
// ----------------------------------------------------------------------------

fn scalar(name: &str) -> TypeDef {
    TypeDef {
        name: name.to_string(),
        kind: TypeKind::Scalar,
        description: None,
        fields: Vec::new(),
        interfaces: Vec::new(),
        members: Vec::new(),
        enum_values: Vec::new(),
        input_fields: Vec::new(),
    }
}

fn convert_type(def: &TypeDefinition) -> TypeDef {
    let mut out = scalar(&def.name.value);
    out.description = def.description.clone();
    match &def.kind {
        TypeDefinitionKind::Scalar => {}
        TypeDefinitionKind::Object { interfaces, fields } => {
            out.kind = TypeKind::Object;
            out.interfaces = interfaces.iter().map(|n| n.value.clone()).collect();
            out.fields = fields.iter().map(convert_field).collect();
        }
        TypeDefinitionKind::Interface { interfaces, fields } => {
            out.kind = TypeKind::Interface;
            out.interfaces = interfaces.iter().map(|n| n.value.clone()).collect();
            out.fields = fields.iter().map(convert_field).collect();
        }
        TypeDefinitionKind::Union { members } => {
            out.kind = TypeKind::Union;
            out.members = members.iter().map(|n| n.value.clone()).collect();
        }
        TypeDefinitionKind::Enum { values } => {
            out.kind = TypeKind::Enum;
            out.enum_values = values.iter().map(convert_enum_value).collect();
        }
        TypeDefinitionKind::InputObject { fields } => {
            out.kind = TypeKind::InputObject;
            out.input_fields = fields.iter().map(convert_input_value).collect();
        }
    }
    out
}

fn convert_field(def: &FieldDefinition) -> FieldDef {
    FieldDef {
        name: def.name.value.clone(),
        description: def.description.clone(),
        arguments: def.arguments.iter().map(convert_input_value).collect(),
        field_type: Type::from(&def.field_type),
        deprecation: deprecation(&def.directives),
    }
}

fn convert_input_value(def: &InputValueDefinition) -> InputValueDef {
    InputValueDef {
        name: def.name.value.clone(),
        value_type: Type::from(&def.value_type),
        has_default: def.default_value.is_some(),
    }
}

fn convert_enum_value(def: &EnumValueDefinition) -> EnumValueDef {
    EnumValueDef {
        name: def.name.value.clone(),
        deprecation: deprecation(&def.directives),
    }
}

fn convert_directive(def: &DirectiveDefinition) -> DirectiveDef {
    DirectiveDef {
        name: def.name.value.clone(),
        arguments: def.arguments.iter().map(convert_input_value).collect(),
        locations: def.locations.iter().map(|n| n.value.clone()).collect(),
        repeatable: def.repeatable,
    }
}

/// `@deprecated` gives `Some(reason)`; the reason falls back to the default.
fn deprecation(directives: &[Directive]) -> Option<String> {
    let directive = directives.iter().find(|d| d.name.value == "deprecated")?;
    let reason = directive
        .arguments
        .iter()
        .find(|a| a.name.value == "reason")
        .and_then(|a| match &a.value.kind {
            ValueKind::String(reason) => Some(reason.clone()),
            _ => None,
        });
    Some(reason.unwrap_or_else(|| DEFAULT_DEPRECATION_REASON.to_string()))
}

fn builtin_directives() -> Vec<DirectiveDef> {
    let arg = |name: &str, ty: Type| InputValueDef {
        name: name.to_string(),
        value_type: ty,
        has_default: false,
    };
    let named = |name: &str| Type::Named(name.to_string());
    let non_null = |name: &str| Type::NonNull(Box::new(Type::Named(name.to_string())));
    let field_locations = ["FIELD", "FRAGMENT_SPREAD", "INLINE_FRAGMENT"];

    vec![
        DirectiveDef {
            name: "skip".to_string(),
            arguments: vec![arg("if", non_null("Boolean"))],
            locations: field_locations.iter().map(|l| l.to_string()).collect(),
            repeatable: false,
        },
        DirectiveDef {
            name: "include".to_string(),
            arguments: vec![arg("if", non_null("Boolean"))],
            locations: field_locations.iter().map(|l| l.to_string()).collect(),
            repeatable: false,
        },
        DirectiveDef {
            name: "deprecated".to_string(),
            arguments: vec![InputValueDef {
                has_default: true,
                ..arg("reason", named("String"))
            }],
            locations: ["FIELD_DEFINITION", "ENUM_VALUE"]
                .iter()
                .map(|l| l.to_string())
                .collect(),
            repeatable: false,
        },
        DirectiveDef {
            name: "specifiedBy".to_string(),
            arguments: vec![arg("url", non_null("String"))],
            locations: vec!["SCALAR".to_string()],
            repeatable: false,
        },
    ]
}

// ----------------------------------------------------------------------------
// Reference checks
// ----------------------------------------------------------------------------

fn check_references(
    types: &HashMap<String, TypeDef>,
    directives: &HashMap<String, DirectiveDef>,
    roots: &HashMap<OperationType, String>,
) -> Result<(), SchemaError> {
    let require = |name: &str, referenced_by: &str| {
        if types.contains_key(name) {
            Ok(())
        } else {
            Err(SchemaError::UnknownType {
                name: name.to_string(),
                referenced_by: referenced_by.to_string(),
            })
        }
    };

    for name in roots.values() {
        require(name, "schema")?;
    }

    for def in types.values() {
        for field in &def.fields {
            let owner = format!("{}.{}", def.name, field.name);
            require(field.field_type.named(), &owner)?;
            for arg in &field.arguments {
                require(arg.value_type.named(), &format!("{}({}:)", owner, arg.name))?;
            }
        }
        for name in def.interfaces.iter().chain(&def.members) {
            require(name, &def.name)?;
        }
        for field in &def.input_fields {
            require(
                field.value_type.named(),
                &format!("{}.{}", def.name, field.name),
            )?;
        }
    }

    for directive in directives.values() {
        for arg in &directive.arguments {
            require(
                arg.value_type.named(),
                &format!("@{}({}:)", directive.name, arg.name),
            )?;
        }
    }
    Ok(())
}
