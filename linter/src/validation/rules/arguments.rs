use std::collections::HashMap;

use tagql::document::{Argument, Directive, Field, Pos};

use crate::validation::{ArgumentOwner, Rule, ValidationContext};

#[derive(Default)]
pub struct KnownArgumentNames;

impl Rule for KnownArgumentNames {
    fn enter_argument(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        argument: &Argument,
        owner: ArgumentOwner<'_>,
    ) {
        if ctx.argument().is_some() {
            return;
        }
        let message = match owner {
            ArgumentOwner::Field(_) => {
                let (Some(field_def), Some(parent)) = (ctx.field_def(), ctx.parent_type()) else {
                    return;
                };
                format!(
                    "Unknown argument \"{}\" on field \"{}.{}\".",
                    argument.name.value, parent.name, field_def.name
                )
            }
            ArgumentOwner::Directive(directive) => {
                if ctx.directive().is_none() {
                    return;
                }
                format!(
                    "Unknown argument \"{}\" on directive \"@{}\".",
                    argument.name.value, directive.name.value
                )
            }
        };
        ctx.report(message, vec![argument.pos]);
    }
}

fn check_unique(ctx: &mut ValidationContext<'_>, arguments: &[Argument]) {
    let mut known: HashMap<&str, Pos> = HashMap::new();
    for argument in arguments {
        let name = argument.name.as_str();
        match known.get(name) {
            Some(first) => ctx.report(
                format!("There can be only one argument named \"{}\".", name),
                vec![*first, argument.name.pos],
            ),
            None => {
                known.insert(name, argument.name.pos);
            }
        }
    }
}

#[derive(Default)]
pub struct UniqueArgumentNames;

impl Rule for UniqueArgumentNames {
    fn enter_field(&mut self, ctx: &mut ValidationContext<'_>, field: &Field) {
        check_unique(ctx, &field.arguments);
    }

    fn enter_directive(&mut self, ctx: &mut ValidationContext<'_>, directive: &Directive) {
        check_unique(ctx, &directive.arguments);
    }
}

/// Required (non-null, no default) arguments must be given.
#[derive(Default)]
pub struct ProvidedNonNullArguments;

impl Rule for ProvidedNonNullArguments {
    fn leave_field(&mut self, ctx: &mut ValidationContext<'_>, field: &Field) {
        let Some(field_def) = ctx.field_def() else {
            return;
        };
        for definition in &field_def.arguments {
            let provided = field.arguments.iter().any(|a| a.name.value == definition.name);
            if !provided && definition.value_type.is_non_null() && !definition.has_default {
                ctx.report(
                    format!(
                        "Field \"{}\" argument \"{}\" of type \"{}\" is required, but it was not provided.",
                        field.name.value, definition.name, definition.value_type
                    ),
                    vec![field.pos],
                );
            }
        }
    }

    fn leave_directive(&mut self, ctx: &mut ValidationContext<'_>, directive: &Directive) {
        let Some(directive_def) = ctx.directive() else {
            return;
        };
        for definition in &directive_def.arguments {
            let provided = directive
                .arguments
                .iter()
                .any(|a| a.name.value == definition.name);
            if !provided && definition.value_type.is_non_null() && !definition.has_default {
                ctx.report(
                    format!(
                        "Directive \"@{}\" argument \"{}\" of type \"{}\" is required, but it was not provided.",
                        directive.name.value, definition.name, definition.value_type
                    ),
                    vec![directive.pos],
                );
            }
        }
    }
}
