use tagql::document::{
    Argument, Definition, Directive, Document, Field, FragmentDefinition, FragmentSpread,
    InlineFragment, OperationDefinition, Selection, SelectionSet, Value, ValueKind,
    VariableDefinition,
};

use crate::schema::{InputValueDef, Type, TypeDef};
use crate::validation::{ArgumentOwner, Rule, ValidationContext};

type Rules = [Box<dyn Rule>];

/// Call `hook` on every rule, in registration order.
macro_rules! visit {
    ($rules:expr, $ctx:expr, $hook:ident($($arg:expr),*)) => {
        for rule in $rules.iter_mut() {
            rule.$hook($ctx, $($arg),*);
        }
    };
}

pub(super) fn walk_document<'a>(
    ctx: &mut ValidationContext<'a>,
    rules: &mut Rules,
    document: &'a Document,
) {
    visit!(rules, ctx, enter_document(document));
    for definition in &document.definitions {
        match definition {
            Definition::Operation(op) => walk_operation(ctx, rules, op),
            Definition::Fragment(fragment) => walk_fragment_definition(ctx, rules, fragment),
        }
    }
    visit!(rules, ctx, leave_document(document));
}

/// The schema type named `name`, if it exists and is composite.
fn composite<'a>(ctx: &ValidationContext<'a>, name: &str) -> Option<&'a TypeDef> {
    ctx.schema().type_def(name).filter(|t| t.is_composite())
}

fn walk_operation<'a>(
    ctx: &mut ValidationContext<'a>,
    rules: &mut Rules,
    op: &'a OperationDefinition,
) {
    let root = ctx.schema().root_type(op.operation);
    ctx.types.push(root.map(|t| Type::Named(t.name.clone())));
    visit!(rules, ctx, enter_operation(op));
    for definition in &op.variable_definitions {
        walk_variable_definition(ctx, rules, definition);
    }
    walk_directives(ctx, rules, &op.directives);
    walk_selection_set(ctx, rules, &op.selection_set);
    visit!(rules, ctx, leave_operation(op));
    ctx.types.pop();
}

fn walk_variable_definition<'a>(
    ctx: &mut ValidationContext<'a>,
    rules: &mut Rules,
    definition: &'a VariableDefinition,
) {
    let known = ctx
        .schema()
        .type_def(definition.var_type.named().as_str())
        .filter(|t| t.is_input())
        .is_some();
    ctx.input_types
        .push(known.then(|| Type::from(&definition.var_type)));
    visit!(rules, ctx, enter_variable_definition(definition));
    visit!(rules, ctx, enter_named_type(definition.var_type.named()));
    if let Some(value) = &definition.default_value {
        walk_value(ctx, rules, value);
    }
    walk_directives(ctx, rules, &definition.directives);
    ctx.input_types.pop();
}

fn walk_fragment_definition<'a>(
    ctx: &mut ValidationContext<'a>,
    rules: &mut Rules,
    fragment: &'a FragmentDefinition,
) {
    let condition = composite(ctx, fragment.type_condition.as_str());
    ctx.types
        .push(condition.map(|t| Type::Named(t.name.clone())));
    visit!(rules, ctx, enter_fragment_definition(fragment));
    visit!(rules, ctx, enter_named_type(&fragment.type_condition));
    walk_directives(ctx, rules, &fragment.directives);
    walk_selection_set(ctx, rules, &fragment.selection_set);
    ctx.types.pop();
}

fn walk_selection_set<'a>(
    ctx: &mut ValidationContext<'a>,
    rules: &mut Rules,
    selection_set: &'a SelectionSet,
) {
    let parent = ctx
        .current_type()
        .map(|t| t.named().to_string())
        .and_then(|name| composite(ctx, &name));
    ctx.parent_types.push(parent);
    visit!(rules, ctx, enter_selection_set(selection_set));
    for selection in &selection_set.selections {
        match selection {
            Selection::Field(field) => walk_field(ctx, rules, field),
            Selection::FragmentSpread(spread) => walk_fragment_spread(ctx, rules, spread),
            Selection::InlineFragment(inline) => walk_inline_fragment(ctx, rules, inline),
        }
    }
    ctx.parent_types.pop();
}

fn walk_field<'a>(ctx: &mut ValidationContext<'a>, rules: &mut Rules, field: &'a Field) {
    let schema = ctx.schema();
    let field_def = ctx
        .parent_type()
        .and_then(|parent| schema.field(parent, field.name.as_str()));
    ctx.field_defs.push(field_def);
    ctx.types.push(field_def.map(|f| f.field_type.clone()));

    visit!(rules, ctx, enter_field(field));
    for argument in &field.arguments {
        let definition = field_def.and_then(|f| f.argument(argument.name.as_str()));
        walk_argument(ctx, rules, argument, definition, ArgumentOwner::Field(field));
    }
    walk_directives(ctx, rules, &field.directives);
    if let Some(selection_set) = &field.selection_set {
        walk_selection_set(ctx, rules, selection_set);
    }
    visit!(rules, ctx, leave_field(field));

    ctx.types.pop();
    ctx.field_defs.pop();
}

fn walk_fragment_spread<'a>(
    ctx: &mut ValidationContext<'a>,
    rules: &mut Rules,
    spread: &'a FragmentSpread,
) {
    visit!(rules, ctx, enter_fragment_spread(spread));
    walk_directives(ctx, rules, &spread.directives);
}

fn walk_inline_fragment<'a>(
    ctx: &mut ValidationContext<'a>,
    rules: &mut Rules,
    inline: &'a InlineFragment,
) {
    let condition = match &inline.type_condition {
        Some(name) => composite(ctx, name.as_str()).map(|t| Type::Named(t.name.clone())),
        None => ctx.parent_type().map(|t| Type::Named(t.name.clone())),
    };
    ctx.types.push(condition);
    visit!(rules, ctx, enter_inline_fragment(inline));
    if let Some(name) = &inline.type_condition {
        visit!(rules, ctx, enter_named_type(name));
    }
    walk_directives(ctx, rules, &inline.directives);
    walk_selection_set(ctx, rules, &inline.selection_set);
    ctx.types.pop();
}

fn walk_directives<'a>(
    ctx: &mut ValidationContext<'a>,
    rules: &mut Rules,
    directives: &'a [Directive],
) {
    for directive in directives {
        let definition = ctx.schema().directive(directive.name.as_str());
        ctx.directive = definition;
        visit!(rules, ctx, enter_directive(directive));
        for argument in &directive.arguments {
            let arg_def = definition.and_then(|d| d.argument(argument.name.as_str()));
            walk_argument(ctx, rules, argument, arg_def, ArgumentOwner::Directive(directive));
        }
        visit!(rules, ctx, leave_directive(directive));
        ctx.directive = None;
    }
}

fn walk_argument<'a>(
    ctx: &mut ValidationContext<'a>,
    rules: &mut Rules,
    argument: &'a Argument,
    definition: Option<&'a InputValueDef>,
    owner: ArgumentOwner<'a>,
) {
    ctx.argument = definition;
    ctx.input_types
        .push(definition.map(|d| d.value_type.clone()));
    visit!(rules, ctx, enter_argument(argument, owner));
    walk_value(ctx, rules, &argument.value);
    ctx.input_types.pop();
    ctx.argument = None;
}

fn walk_value<'a>(ctx: &mut ValidationContext<'a>, rules: &mut Rules, value: &'a Value) {
    visit!(rules, ctx, enter_value(value));
    match &value.kind {
        ValueKind::List(items) => {
            // A lone value coerces to a one-item list, so items outside a
            // list position keep the position's type.
            let item_type = ctx
                .input_type()
                .map(|t| t.list_item().unwrap_or(t.nullable()))
                .cloned();
            for item in items {
                ctx.input_types.push(item_type.clone());
                walk_value(ctx, rules, item);
                ctx.input_types.pop();
            }
        }
        ValueKind::Object(fields) => {
            let schema = ctx.schema();
            let object = ctx
                .input_type()
                .map(|t| t.named().to_string())
                .and_then(|name| schema.type_def(&name));
            for field in fields {
                let field_type = object
                    .and_then(|o| o.input_field(field.name.as_str()))
                    .map(|f| f.value_type.clone());
                ctx.input_types.push(field_type);
                walk_value(ctx, rules, &field.value);
                ctx.input_types.pop();
            }
        }
        _ => {}
    }
    visit!(rules, ctx, leave_value(value));
}
