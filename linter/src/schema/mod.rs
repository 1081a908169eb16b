mod build;

use std::collections::HashMap;
use std::fmt;

use tagql::document::{OperationType, TypeRef};

pub use build::SchemaError;

/// Reason recorded for `@deprecated` without an explicit `reason`.
pub const DEFAULT_DEPRECATION_REASON: &str = "No longer supported";

const TYPENAME_FIELD: &str = "__typename";

/// A resolved GraphQL schema. Built once per configuration and shared
/// read-only by every call site that references it.
#[derive(Debug, Clone)]
pub struct Schema {
    query_type: Option<String>,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
    types: HashMap<String, TypeDef>,
    directives: HashMap<String, DirectiveDef>,
    typename_field: FieldDef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
}

/// A named type and everything it declares. Only the collections that
/// make sense for its `kind` are populated.
#[derive(Debug, Clone)]
pub struct TypeDef {
    pub name: String,
    pub kind: TypeKind,
    pub description: Option<String>,
    pub fields: Vec<FieldDef>,
    pub interfaces: Vec<String>,
    pub members: Vec<String>,
    pub enum_values: Vec<EnumValueDef>,
    pub input_fields: Vec<InputValueDef>,
}

#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub description: Option<String>,
    pub arguments: Vec<InputValueDef>,
    pub field_type: Type,
    /// `Some(reason)` when the field is deprecated.
    pub deprecation: Option<String>,
}

#[derive(Debug, Clone)]
pub struct InputValueDef {
    pub name: String,
    pub value_type: Type,
    pub has_default: bool,
}

#[derive(Debug, Clone)]
pub struct EnumValueDef {
    pub name: String,
    pub deprecation: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DirectiveDef {
    pub name: String,
    pub arguments: Vec<InputValueDef>,
    pub locations: Vec<String>,
    pub repeatable: bool,
}

/// A type reference resolved against the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Named(String),
    List(Box<Type>),
    NonNull(Box<Type>),
}

impl Type {
    pub fn named(&self) -> &str {
        match self {
            Type::Named(name) => name,
            Type::List(inner) | Type::NonNull(inner) => inner.named(),
        }
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, Type::NonNull(_))
    }

    /// Strip one level of non-null wrapping.
    pub fn nullable(&self) -> &Type {
        match self {
            Type::NonNull(inner) => inner,
            other => other,
        }
    }

    /// The item type when this is a (possibly non-null) list.
    pub fn list_item(&self) -> Option<&Type> {
        match self.nullable() {
            Type::List(item) => Some(item),
            _ => None,
        }
    }
}

impl From<&TypeRef> for Type {
    fn from(type_ref: &TypeRef) -> Self {
        match type_ref {
            TypeRef::Named(name) => Type::Named(name.value.clone()),
            TypeRef::List(inner, _) => Type::List(Box::new(Type::from(inner.as_ref()))),
            TypeRef::NonNull(inner, _) => Type::NonNull(Box::new(Type::from(inner.as_ref()))),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Named(name) => f.write_str(name),
            Type::List(inner) => write!(f, "[{}]", inner),
            Type::NonNull(inner) => write!(f, "{}!", inner),
        }
    }
}

impl TypeDef {
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn input_field(&self, name: &str) -> Option<&InputValueDef> {
        self.input_fields.iter().find(|f| f.name == name)
    }

    pub fn enum_value(&self, name: &str) -> Option<&EnumValueDef> {
        self.enum_values.iter().find(|v| v.name == name)
    }

    /// Object, interface or union: something a selection set can apply to.
    pub fn is_composite(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Object | TypeKind::Interface | TypeKind::Union
        )
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, TypeKind::Scalar | TypeKind::Enum)
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self.kind, TypeKind::Interface | TypeKind::Union)
    }

    pub fn is_input(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Scalar | TypeKind::Enum | TypeKind::InputObject
        )
    }
}

impl FieldDef {
    pub fn argument(&self, name: &str) -> Option<&InputValueDef> {
        self.arguments.iter().find(|a| a.name == name)
    }

    pub fn is_deprecated(&self) -> bool {
        self.deprecation.is_some()
    }
}

impl DirectiveDef {
    pub fn argument(&self, name: &str) -> Option<&InputValueDef> {
        self.arguments.iter().find(|a| a.name == name)
    }
}

impl Schema {
    /// Build a schema from SDL text.
    pub fn from_sdl(source: &str) -> Result<Schema, SchemaError> {
        build::build_schema(source)
    }

    pub fn root_type(&self, operation: OperationType) -> Option<&TypeDef> {
        let name = match operation {
            OperationType::Query => self.query_type.as_deref(),
            OperationType::Mutation => self.mutation_type.as_deref(),
            OperationType::Subscription => self.subscription_type.as_deref(),
        }?;
        self.types.get(name)
    }

    pub fn type_def(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn directive(&self, name: &str) -> Option<&DirectiveDef> {
        self.directives.get(name)
    }

    /// Look up a field on a composite type, including `__typename`.
    pub fn field<'a>(&'a self, parent: &'a TypeDef, name: &str) -> Option<&'a FieldDef> {
        if name == TYPENAME_FIELD && parent.is_composite() {
            return Some(&self.typename_field);
        }
        parent.field(name)
    }

    /// Whether the object type `object` can stand in for `abstract_type`.
    pub fn is_possible_type(&self, abstract_type: &TypeDef, object: &TypeDef) -> bool {
        match abstract_type.kind {
            TypeKind::Union => abstract_type.members.contains(&object.name),
            TypeKind::Interface => {
                object.kind == TypeKind::Object && object.interfaces.contains(&abstract_type.name)
            }
            _ => false,
        }
    }

    /// Whether some object can be of both composite types `a` and `b`.
    pub fn types_overlap(&self, a: &TypeDef, b: &TypeDef) -> bool {
        if a.name == b.name {
            return true;
        }
        match (a.is_abstract(), b.is_abstract()) {
            (true, true) => self
                .types
                .values()
                .any(|t| self.is_possible_type(a, t) && self.is_possible_type(b, t)),
            (true, false) => self.is_possible_type(a, b),
            (false, true) => self.is_possible_type(b, a),
            (false, false) => false,
        }
    }

    /// Whether a value of type `sub` may be used where `sup` is expected.
    pub fn is_sub_type(&self, sub: &Type, sup: &Type) -> bool {
        match (sub, sup) {
            _ if sub == sup => true,
            (Type::NonNull(sub), Type::NonNull(sup)) => self.is_sub_type(sub, sup),
            (_, Type::NonNull(_)) => false,
            (Type::NonNull(sub), sup) => self.is_sub_type(sub, sup),
            (Type::List(sub), Type::List(sup)) => self.is_sub_type(sub, sup),
            (_, Type::List(_)) | (Type::List(_), _) => false,
            (Type::Named(sub), Type::Named(sup)) => {
                match (self.type_def(sub), self.type_def(sup)) {
                    (Some(sub), Some(sup)) if sup.is_abstract() => self.is_possible_type(sup, sub),
                    _ => false,
                }
            }
        }
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}
