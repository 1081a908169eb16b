use std::collections::HashMap;

use tagql::document::{
    Directive, Field, FragmentDefinition, FragmentSpread, InlineFragment, OperationDefinition,
    Pos, VariableDefinition,
};

use crate::validation::{Rule, ValidationContext};

#[derive(Default)]
pub struct KnownDirectives;

impl Rule for KnownDirectives {
    fn enter_directive(&mut self, ctx: &mut ValidationContext<'_>, directive: &Directive) {
        if ctx.directive().is_none() {
            ctx.report(
                format!("Unknown directive \"@{}\".", directive.name.value),
                vec![directive.pos],
            );
        }
    }
}

/// A non-repeatable directive appears at most once per node.
#[derive(Default)]
pub struct UniqueDirectivesPerLocation;

fn check_unique(ctx: &mut ValidationContext<'_>, directives: &[Directive]) {
    let schema = ctx.schema();
    let mut seen: HashMap<&str, Pos> = HashMap::new();
    for directive in directives {
        let name = directive.name.as_str();
        if schema.directive(name).is_some_and(|d| d.repeatable) {
            continue;
        }
        match seen.get(name) {
            Some(first) => ctx.report(
                format!("The directive \"{}\" can only be used once at this location.", name),
                vec![*first, directive.pos],
            ),
            None => {
                seen.insert(name, directive.pos);
            }
        }
    }
}

impl Rule for UniqueDirectivesPerLocation {
    fn enter_operation(&mut self, ctx: &mut ValidationContext<'_>, op: &OperationDefinition) {
        check_unique(ctx, &op.directives);
    }

    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        fragment: &FragmentDefinition,
    ) {
        check_unique(ctx, &fragment.directives);
    }

    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        definition: &VariableDefinition,
    ) {
        check_unique(ctx, &definition.directives);
    }

    fn enter_field(&mut self, ctx: &mut ValidationContext<'_>, field: &Field) {
        check_unique(ctx, &field.directives);
    }

    fn enter_fragment_spread(&mut self, ctx: &mut ValidationContext<'_>, spread: &FragmentSpread) {
        check_unique(ctx, &spread.directives);
    }

    fn enter_inline_fragment(&mut self, ctx: &mut ValidationContext<'_>, fragment: &InlineFragment) {
        check_unique(ctx, &fragment.directives);
    }
}
