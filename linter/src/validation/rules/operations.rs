use std::collections::HashMap;

use tagql::document::{Document, OperationDefinition, Pos};

use crate::validation::{Rule, ValidationContext};

#[derive(Default)]
pub struct UniqueOperationNames {
    known: HashMap<String, Pos>,
}

impl Rule for UniqueOperationNames {
    fn enter_operation(&mut self, ctx: &mut ValidationContext<'_>, op: &OperationDefinition) {
        let Some(name) = &op.name else {
            return;
        };
        match self.known.get(&name.value) {
            Some(first) => ctx.report(
                format!("There can be only one operation named \"{}\".", name.value),
                vec![*first, name.pos],
            ),
            None => {
                self.known.insert(name.value.clone(), name.pos);
            }
        }
    }
}

#[derive(Default)]
pub struct LoneAnonymousOperation {
    operations: usize,
}

impl Rule for LoneAnonymousOperation {
    fn enter_document(&mut self, _ctx: &mut ValidationContext<'_>, document: &Document) {
        self.operations = document.operations().count();
    }

    fn enter_operation(&mut self, ctx: &mut ValidationContext<'_>, op: &OperationDefinition) {
        if op.name.is_none() && self.operations > 1 {
            ctx.report(
                "This anonymous operation must be the only defined operation.",
                vec![op.pos],
            );
        }
    }
}
