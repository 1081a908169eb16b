use crate::document::{Directive, Name, OperationType, Pos, TypeRef, Value};

/// A parsed SDL document.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSystemDocument {
    pub definitions: Vec<TypeSystemDefinition>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeSystemDefinition {
    Schema(SchemaDefinition),
    Type(TypeDefinition),
    /// `extend type ...` and friends; merged into the extended type.
    TypeExtension(TypeDefinition),
    Directive(DirectiveDefinition),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDefinition {
    pub directives: Vec<Directive>,
    pub root_operations: Vec<(OperationType, Name)>,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    pub description: Option<String>,
    pub name: Name,
    pub directives: Vec<Directive>,
    pub kind: TypeDefinitionKind,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefinitionKind {
    Scalar,
    Object {
        interfaces: Vec<Name>,
        fields: Vec<FieldDefinition>,
    },
    Interface {
        interfaces: Vec<Name>,
        fields: Vec<FieldDefinition>,
    },
    Union {
        members: Vec<Name>,
    },
    Enum {
        values: Vec<EnumValueDefinition>,
    },
    InputObject {
        fields: Vec<InputValueDefinition>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub description: Option<String>,
    pub name: Name,
    pub arguments: Vec<InputValueDefinition>,
    pub field_type: TypeRef,
    pub directives: Vec<Directive>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputValueDefinition {
    pub description: Option<String>,
    pub name: Name,
    pub value_type: TypeRef,
    pub default_value: Option<Value>,
    pub directives: Vec<Directive>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValueDefinition {
    pub description: Option<String>,
    pub name: Name,
    pub directives: Vec<Directive>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveDefinition {
    pub description: Option<String>,
    pub name: Name,
    pub arguments: Vec<InputValueDefinition>,
    pub repeatable: bool,
    pub locations: Vec<Name>,
    pub pos: Pos,
}
