use tagql::document::Field;

use crate::validation::{Rule, ValidationContext};

/// Leaf fields take no selection set; composite fields require one.
#[derive(Default)]
pub struct ScalarLeafs;

impl Rule for ScalarLeafs {
    fn enter_field(&mut self, ctx: &mut ValidationContext<'_>, field: &Field) {
        let Some(field_type) = ctx.current_type() else {
            return;
        };
        let Some(named) = ctx.schema().type_def(field_type.named()) else {
            return;
        };
        let type_name = field_type.to_string();
        let name = &field.name.value;
        match &field.selection_set {
            Some(selection_set) if named.is_leaf() => ctx.report(
                format!(
                    "Field \"{name}\" must not have a selection since type \"{type_name}\" has no subfields."
                ),
                vec![selection_set.pos],
            ),
            None if named.is_composite() => ctx.report(
                format!(
                    "Field \"{name}\" of type \"{type_name}\" must have a selection of subfields. Did you mean \"{name} {{ ... }}\"?"
                ),
                vec![field.pos],
            ),
            _ => {}
        }
    }
}

#[derive(Default)]
pub struct FieldsOnCorrectType;

impl Rule for FieldsOnCorrectType {
    fn enter_field(&mut self, ctx: &mut ValidationContext<'_>, field: &Field) {
        let Some(parent) = ctx.parent_type() else {
            return;
        };
        if ctx.field_def().is_none() {
            ctx.report(
                format!(
                    "Cannot query field \"{}\" on type \"{}\".",
                    field.name.value, parent.name
                ),
                vec![field.pos],
            );
        }
    }
}
