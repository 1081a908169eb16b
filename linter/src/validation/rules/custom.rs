use tagql::document::{Field, Name, OperationDefinition, Selection, SelectionSet, Value, ValueKind};

use crate::schema::{TypeKind, Type};
use crate::validation::{Rule, ValidationContext};

#[derive(Default)]
pub struct OperationsMustHaveNames;

impl Rule for OperationsMustHaveNames {
    fn enter_operation(&mut self, ctx: &mut ValidationContext<'_>, op: &OperationDefinition) {
        if op.name.is_none() {
            ctx.report("All operations must be named", vec![op.pos]);
        }
    }
}

#[derive(Default)]
pub struct TypeNamesShouldBeCapitalized;

impl Rule for TypeNamesShouldBeCapitalized {
    fn enter_named_type(&mut self, ctx: &mut ValidationContext<'_>, name: &Name) {
        let Some(first) = name.value.chars().next() else {
            return;
        };
        if first.to_lowercase().eq(std::iter::once(first)) {
            ctx.report(
                "All type names should start with a capital letter",
                vec![name.pos],
            );
        }
    }
}

fn with_reason(message: String, reason: &str) -> String {
    if reason.is_empty() {
        message
    } else {
        format!("{} {}", message, reason)
    }
}

#[derive(Default)]
pub struct NoDeprecatedFields;

impl Rule for NoDeprecatedFields {
    fn enter_field(&mut self, ctx: &mut ValidationContext<'_>, field: &Field) {
        let (Some(field_def), Some(parent)) = (ctx.field_def(), ctx.parent_type()) else {
            return;
        };
        if let Some(reason) = &field_def.deprecation {
            let message = format!("The field {}.{} is deprecated.", parent.name, field_def.name);
            ctx.report(with_reason(message, reason), vec![field.pos]);
        }
    }

    fn enter_value(&mut self, ctx: &mut ValidationContext<'_>, value: &Value) {
        let ValueKind::Enum(name) = &value.kind else {
            return;
        };
        let Some(enum_type) = ctx
            .input_type()
            .map(Type::named)
            .and_then(|type_name| ctx.schema().type_def(type_name))
            .filter(|t| t.kind == TypeKind::Enum)
        else {
            return;
        };
        let Some(reason) = enum_type.enum_value(name).and_then(|v| v.deprecation.as_ref()) else {
            return;
        };
        let message = format!("The enum value {}.{} is deprecated.", enum_type.name, name);
        ctx.report(with_reason(message, reason), vec![value.pos]);
    }
}

/// Fields whose type declares any of `required` must select them.
pub struct RequiredFields {
    required: Vec<String>,
}

impl RequiredFields {
    pub fn new(required: Vec<String>) -> Self {
        RequiredFields { required }
    }
}

/// Whether `field` is selected directly or inside a first-level inline
/// fragment. A fragment spread might select it, so it counts as selected.
fn was_requested(selection_set: Option<&SelectionSet>, field: &str, nested: bool) -> bool {
    let Some(selection_set) = selection_set else {
        return false;
    };
    selection_set.selections.iter().any(|selection| match selection {
        Selection::InlineFragment(inline) => {
            !nested && was_requested(Some(&inline.selection_set), field, true)
        }
        Selection::FragmentSpread(_) => true,
        Selection::Field(selected) => selected.name.value == field,
    })
}

impl Rule for RequiredFields {
    fn enter_field(&mut self, ctx: &mut ValidationContext<'_>, field: &Field) {
        let Some(field_def) = ctx.field_def() else {
            return;
        };
        let Some(declaring) = ctx.schema().type_def(field_def.field_type.named()) else {
            return;
        };
        for required in &self.required {
            let declared = match declaring.kind {
                TypeKind::Object | TypeKind::Interface => declaring.field(required).is_some(),
                TypeKind::InputObject => declaring.input_field(required).is_some(),
                _ => false,
            };
            if declared && !was_requested(field.selection_set.as_ref(), required, false) {
                ctx.report(
                    format!("'{}' field required on '{}'", required, field.name.value),
                    vec![field.pos],
                );
            }
        }
    }
}
