use std::collections::HashMap;

use tagql::document::{Pos, Value, ValueKind};

use crate::schema::{Type, TypeKind};
use crate::validation::{Rule, ValidationContext};

/// Literal values must be coercible to the type of the position they are
/// written in.
#[derive(Default)]
pub struct ValuesOfCorrectType {
    /// Nesting depth inside a value that was already rejected as a whole.
    skipped: usize,
}

impl Rule for ValuesOfCorrectType {
    fn enter_value(&mut self, ctx: &mut ValidationContext<'_>, value: &Value) {
        if self.skipped > 0 {
            self.skipped += 1;
        } else if !check_value(ctx, value) {
            self.skipped = 1;
        }
    }

    fn leave_value(&mut self, _ctx: &mut ValidationContext<'_>, _value: &Value) {
        self.skipped = self.skipped.saturating_sub(1);
    }
}

fn bad_value(ctx: &mut ValidationContext<'_>, expected: &Type, value: &Value) {
    ctx.report(
        format!("Expected type {}, found {}.", expected, value),
        vec![value.pos],
    );
}

/// Check one value. Returns whether its items and fields are worth
/// checking on their own.
fn check_value(ctx: &mut ValidationContext<'_>, value: &Value) -> bool {
    let schema = ctx.schema();
    let Some(expected) = ctx.input_type().cloned() else {
        return true;
    };
    match &value.kind {
        ValueKind::Variable(_) => true,
        ValueKind::Null => {
            if expected.is_non_null() {
                bad_value(ctx, &expected, value);
            }
            true
        }
        ValueKind::List(_) => {
            if expected.list_item().is_some() {
                return true;
            }
            check_scalar(ctx, expected.nullable(), value);
            false
        }
        ValueKind::Object(fields) => {
            let Some(object) = schema
                .type_def(expected.named())
                .filter(|t| t.kind == TypeKind::InputObject)
            else {
                check_scalar(ctx, &expected, value);
                return false;
            };
            for definition in &object.input_fields {
                let provided = fields.iter().any(|f| f.name.value == definition.name);
                if !provided && definition.value_type.is_non_null() && !definition.has_default {
                    ctx.report(
                        format!(
                            "Field {}.{} of required type {} was not provided.",
                            object.name, definition.name, definition.value_type
                        ),
                        vec![value.pos],
                    );
                }
            }
            for field in fields {
                if object.input_field(field.name.as_str()).is_none() {
                    ctx.report(
                        format!(
                            "Field \"{}\" is not defined by type {}.",
                            field.name.value, object.name
                        ),
                        vec![field.name.pos],
                    );
                }
            }
            true
        }
        ValueKind::Enum(name) => {
            match schema.type_def(expected.named()) {
                Some(def) if def.kind == TypeKind::Enum => {
                    if def.enum_value(name).is_none() {
                        bad_value(ctx, &Type::Named(def.name.clone()), value);
                    }
                }
                _ => check_scalar(ctx, &expected, value),
            }
            true
        }
        _ => {
            check_scalar(ctx, &expected, value);
            true
        }
    }
}

/// `value` sits where `expected` is wanted and is not a variable, enum
/// value or input object.
fn check_scalar(ctx: &mut ValidationContext<'_>, expected: &Type, value: &Value) {
    let Some(named) = ctx.schema().type_def(expected.named()) else {
        return;
    };
    if named.kind != TypeKind::Scalar || !scalar_accepts(&named.name, &value.kind) {
        bad_value(ctx, expected, value);
    }
}

/// Literal coercion of the built-in scalars. Custom scalars take anything.
fn scalar_accepts(scalar: &str, value: &ValueKind) -> bool {
    match scalar {
        "Int" => matches!(value, ValueKind::Int(raw) if raw.parse::<i32>().is_ok()),
        "Float" => matches!(value, ValueKind::Int(_) | ValueKind::Float(_)),
        "String" => matches!(value, ValueKind::String(_)),
        "Boolean" => matches!(value, ValueKind::Boolean(_)),
        "ID" => matches!(value, ValueKind::String(_) | ValueKind::Int(_)),
        _ => true,
    }
}

#[derive(Default)]
pub struct UniqueInputFieldNames;

impl Rule for UniqueInputFieldNames {
    fn enter_value(&mut self, ctx: &mut ValidationContext<'_>, value: &Value) {
        let ValueKind::Object(fields) = &value.kind else {
            return;
        };
        let mut known: HashMap<&str, Pos> = HashMap::new();
        for field in fields {
            let name = field.name.as_str();
            match known.get(name) {
                Some(first) => ctx.report(
                    format!("There can be only one input field named \"{}\".", name),
                    vec![*first, field.name.pos],
                ),
                None => {
                    known.insert(name, field.name.pos);
                }
            }
        }
    }
}
