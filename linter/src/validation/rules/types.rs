use tagql::document::Name;

use crate::validation::{Rule, ValidationContext};

#[derive(Default)]
pub struct KnownTypeNames;

impl Rule for KnownTypeNames {
    fn enter_named_type(&mut self, ctx: &mut ValidationContext<'_>, name: &Name) {
        if ctx.schema().type_def(name.as_str()).is_none() {
            ctx.report(format!("Unknown type \"{}\".", name.value), vec![name.pos]);
        }
    }
}
