use std::collections::{HashMap, HashSet};

use tagql::document::{
    Document, FragmentDefinition, OperationDefinition, Pos, TypeRef, Value, ValueKind,
    VariableDefinition,
};

use crate::schema::Type;
use crate::validation::{Rule, ValidationContext};

#[derive(Default)]
pub struct VariablesAreInputTypes;

impl Rule for VariablesAreInputTypes {
    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        definition: &VariableDefinition,
    ) {
        let named = definition.var_type.named();
        if let Some(def) = ctx.schema().type_def(named.as_str()) {
            if !def.is_input() {
                ctx.report(
                    format!(
                        "Variable \"${}\" cannot be non-input type \"{}\".",
                        definition.variable.value, definition.var_type
                    ),
                    vec![definition.var_type.pos()],
                );
            }
        }
    }
}

#[derive(Default)]
pub struct UniqueVariableNames {
    known: HashMap<String, Pos>,
}

impl Rule for UniqueVariableNames {
    fn enter_operation(&mut self, _ctx: &mut ValidationContext<'_>, _op: &OperationDefinition) {
        self.known.clear();
    }

    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        definition: &VariableDefinition,
    ) {
        let name = &definition.variable;
        match self.known.get(&name.value) {
            Some(first) => ctx.report(
                format!("There can be only one variable named \"${}\".", name.value),
                vec![*first, name.pos],
            ),
            None => {
                self.known.insert(name.value.clone(), name.pos);
            }
        }
    }
}

#[derive(Default)]
pub struct NoUndefinedVariables;

impl Rule for NoUndefinedVariables {
    fn enter_operation(&mut self, ctx: &mut ValidationContext<'_>, op: &OperationDefinition) {
        let defined: HashSet<&str> = op
            .variable_definitions
            .iter()
            .map(|d| d.variable.as_str())
            .collect();
        let mut reported = HashSet::new();
        for usage in ctx.recursive_variable_usages(op) {
            if defined.contains(usage.name.as_str()) || !reported.insert(usage.name.clone()) {
                continue;
            }
            let message = match &op.name {
                Some(name) => format!(
                    "Variable \"${}\" is not defined by operation \"{}\".",
                    usage.name, name.value
                ),
                None => format!("Variable \"${}\" is not defined.", usage.name),
            };
            ctx.report(message, vec![usage.pos, op.pos]);
        }
    }
}

#[derive(Default)]
pub struct NoUnusedVariables;

impl Rule for NoUnusedVariables {
    fn leave_operation(&mut self, ctx: &mut ValidationContext<'_>, op: &OperationDefinition) {
        let used: HashSet<String> = ctx
            .recursive_variable_usages(op)
            .into_iter()
            .map(|usage| usage.name)
            .collect();
        for definition in &op.variable_definitions {
            let name = &definition.variable.value;
            if used.contains(name) {
                continue;
            }
            let message = match &op.name {
                Some(op_name) => format!(
                    "Variable \"${}\" is never used in operation \"{}\".",
                    name, op_name.value
                ),
                None => format!("Variable \"${}\" is never used.", name),
            };
            ctx.report(message, vec![definition.pos]);
        }
    }
}

/// A non-null variable never falls back to its default value.
#[derive(Default)]
pub struct VariablesDefaultValueAllowed;

impl Rule for VariablesDefaultValueAllowed {
    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        definition: &VariableDefinition,
    ) {
        let (Some(default), TypeRef::NonNull(nullable, _)) =
            (&definition.default_value, &definition.var_type)
        else {
            return;
        };
        ctx.report(
            format!(
                "Variable \"${}\" of type \"{}\" is required and will not use the default value. Perhaps you meant to use type \"{}\".",
                definition.variable.value, definition.var_type, nullable
            ),
            vec![default.pos],
        );
    }
}

/// A variable reference and the type its position expects.
struct TypedUsage {
    name: String,
    pos: Pos,
    expected: Option<Type>,
}

enum Scope {
    Operation(usize),
    Fragment(String),
}

/// Variables must be passed only where their type is accepted. Usages are
/// gathered during the walk and checked per operation once every fragment
/// has been seen.
#[derive(Default)]
pub struct VariablesInAllowedPosition {
    scope: Option<Scope>,
    operations: Vec<Vec<TypedUsage>>,
    fragments: HashMap<String, Vec<TypedUsage>>,
}

impl VariablesInAllowedPosition {
    fn check_operation(
        &self,
        ctx: &mut ValidationContext<'_>,
        op: &OperationDefinition,
        usages: &[TypedUsage],
    ) {
        let schema = ctx.schema();
        let fragments = ctx.recursively_referenced_fragments(&op.selection_set);
        let fragment_usages = fragments
            .iter()
            .filter_map(|f| self.fragments.get(f.name.as_str()))
            .flatten();

        for usage in usages.iter().chain(fragment_usages) {
            let Some(expected) = &usage.expected else {
                continue;
            };
            let Some(definition) = op
                .variable_definitions
                .iter()
                .find(|d| d.variable.value == usage.name)
            else {
                continue;
            };
            if schema.type_def(definition.var_type.named().as_str()).is_none() {
                continue;
            }
            let var_type = Type::from(&definition.var_type);
            let effective = match &definition.default_value {
                Some(_) if !var_type.is_non_null() => Type::NonNull(Box::new(var_type.clone())),
                _ => var_type.clone(),
            };
            if !schema.is_sub_type(&effective, expected) {
                ctx.report(
                    format!(
                        "Variable \"${}\" of type \"{}\" used in position expecting type \"{}\".",
                        usage.name, var_type, expected
                    ),
                    vec![definition.pos, usage.pos],
                );
            }
        }
    }
}

impl Rule for VariablesInAllowedPosition {
    fn enter_operation(&mut self, _ctx: &mut ValidationContext<'_>, _op: &OperationDefinition) {
        self.operations.push(Vec::new());
        self.scope = Some(Scope::Operation(self.operations.len() - 1));
    }

    fn enter_fragment_definition(
        &mut self,
        _ctx: &mut ValidationContext<'_>,
        fragment: &FragmentDefinition,
    ) {
        let name = &fragment.name.value;
        // Only the first definition of a name is ever spread.
        self.scope = if self.fragments.contains_key(name) {
            None
        } else {
            self.fragments.insert(name.clone(), Vec::new());
            Some(Scope::Fragment(name.clone()))
        };
    }

    fn enter_value(&mut self, ctx: &mut ValidationContext<'_>, value: &Value) {
        let ValueKind::Variable(name) = &value.kind else {
            return;
        };
        let usage = TypedUsage {
            name: name.clone(),
            pos: value.pos,
            expected: ctx.input_type().cloned(),
        };
        let usages = match &self.scope {
            Some(Scope::Operation(index)) => self.operations.get_mut(*index),
            Some(Scope::Fragment(name)) => self.fragments.get_mut(name),
            None => None,
        };
        if let Some(usages) = usages {
            usages.push(usage);
        }
    }

    fn leave_document(&mut self, ctx: &mut ValidationContext<'_>, document: &Document) {
        for (op, usages) in document.operations().zip(&self.operations) {
            self.check_operation(ctx, op, usages);
        }
    }
}
