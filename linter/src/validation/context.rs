use std::collections::HashSet;

use tagql::document::{
    Directive, Document, FragmentDefinition, OperationDefinition, Pos, Selection, SelectionSet,
    Value, ValueKind,
};

use crate::schema::{DirectiveDef, FieldDef, InputValueDef, Schema, Type, TypeDef};
use crate::validation::ValidationError;

/// A `$variable` reference found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableUsage {
    pub name: String,
    pub pos: Pos,
}

/// Shared state of one validation walk: the schema, the document, the
/// collected errors and the type information of the node being visited.
pub struct ValidationContext<'a> {
    schema: &'a Schema,
    document: &'a Document,
    errors: Vec<ValidationError>,

    pub(super) types: Vec<Option<Type>>,
    pub(super) parent_types: Vec<Option<&'a TypeDef>>,
    pub(super) field_defs: Vec<Option<&'a FieldDef>>,
    pub(super) input_types: Vec<Option<Type>>,
    pub(super) directive: Option<&'a DirectiveDef>,
    pub(super) argument: Option<&'a InputValueDef>,
}

impl<'a> ValidationContext<'a> {
    pub(super) fn new(schema: &'a Schema, document: &'a Document) -> Self {
        ValidationContext {
            schema,
            document,
            errors: Vec::new(),
            types: Vec::new(),
            parent_types: Vec::new(),
            field_defs: Vec::new(),
            input_types: Vec::new(),
            directive: None,
            argument: None,
        }
    }

    pub(super) fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }

    pub fn report(&mut self, message: impl Into<String>, locations: Vec<Pos>) {
        self.errors.push(ValidationError::new(message, locations));
    }

    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    // ------------------------------------------------------------------------
    // Type information
    // ------------------------------------------------------------------------

    /// Output type of the current field, fragment or operation.
    pub fn current_type(&self) -> Option<&Type> {
        self.types.last().and_then(Option::as_ref)
    }

    /// The composite type whose selection set is being visited.
    pub fn parent_type(&self) -> Option<&'a TypeDef> {
        self.parent_types.last().copied().flatten()
    }

    pub fn field_def(&self) -> Option<&'a FieldDef> {
        self.field_defs.last().copied().flatten()
    }

    /// Expected type of the argument or value being visited.
    pub fn input_type(&self) -> Option<&Type> {
        self.input_types.last().and_then(Option::as_ref)
    }

    pub fn directive(&self) -> Option<&'a DirectiveDef> {
        self.directive
    }

    pub fn argument(&self) -> Option<&'a InputValueDef> {
        self.argument
    }

    // ------------------------------------------------------------------------
    // Document queries
    // ------------------------------------------------------------------------

    pub fn fragment(&self, name: &str) -> Option<&'a FragmentDefinition> {
        self.document.fragments().find(|f| f.name.value == name)
    }

    /// Names of the fragments spread directly inside `selection_set`,
    /// without following the spreads themselves.
    pub fn fragment_spread_names(selection_set: &SelectionSet) -> Vec<String> {
        let mut names = Vec::new();
        let mut stack = vec![selection_set];
        while let Some(set) = stack.pop() {
            for selection in &set.selections {
                match selection {
                    Selection::Field(field) => stack.extend(field.selection_set.as_ref()),
                    Selection::InlineFragment(inline) => stack.push(&inline.selection_set),
                    Selection::FragmentSpread(spread) => names.push(spread.name.value.clone()),
                }
            }
        }
        names
    }

    /// Every fragment definition reachable from `selection_set`, each once.
    pub fn recursively_referenced_fragments(
        &self,
        selection_set: &SelectionSet,
    ) -> Vec<&'a FragmentDefinition> {
        let mut fragments = Vec::new();
        let mut seen = HashSet::new();
        let mut names = Self::fragment_spread_names(selection_set);
        let mut pending: Vec<&'a FragmentDefinition> = Vec::new();
        loop {
            for name in names {
                if !seen.insert(name.clone()) {
                    continue;
                }
                if let Some(fragment) = self.fragment(&name) {
                    fragments.push(fragment);
                    pending.push(fragment);
                }
            }
            match pending.pop() {
                Some(fragment) => names = Self::fragment_spread_names(&fragment.selection_set),
                None => break,
            }
        }
        fragments
    }

    /// Variables used by an operation, including through its fragments.
    pub fn recursive_variable_usages(&self, op: &OperationDefinition) -> Vec<VariableUsage> {
        let mut usages = Vec::new();
        collect_directive_variables(&op.directives, &mut usages);
        collect_selection_variables(&op.selection_set, &mut usages);
        for fragment in self.recursively_referenced_fragments(&op.selection_set) {
            collect_directive_variables(&fragment.directives, &mut usages);
            collect_selection_variables(&fragment.selection_set, &mut usages);
        }
        usages
    }
}

fn collect_selection_variables(selection_set: &SelectionSet, usages: &mut Vec<VariableUsage>) {
    for selection in &selection_set.selections {
        match selection {
            Selection::Field(field) => {
                for argument in &field.arguments {
                    collect_value_variables(&argument.value, usages);
                }
                collect_directive_variables(&field.directives, usages);
                if let Some(set) = &field.selection_set {
                    collect_selection_variables(set, usages);
                }
            }
            Selection::FragmentSpread(spread) => {
                collect_directive_variables(&spread.directives, usages);
            }
            Selection::InlineFragment(inline) => {
                collect_directive_variables(&inline.directives, usages);
                collect_selection_variables(&inline.selection_set, usages);
            }
        }
    }
}

fn collect_directive_variables(directives: &[Directive], usages: &mut Vec<VariableUsage>) {
    for directive in directives {
        for argument in &directive.arguments {
            collect_value_variables(&argument.value, usages);
        }
    }
}

fn collect_value_variables(value: &Value, usages: &mut Vec<VariableUsage>) {
    match &value.kind {
        ValueKind::Variable(name) => usages.push(VariableUsage {
            name: name.clone(),
            pos: value.pos,
        }),
        ValueKind::List(items) => {
            for item in items {
                collect_value_variables(item, usages);
            }
        }
        ValueKind::Object(fields) => {
            for field in fields {
                collect_value_variables(&field.value, usages);
            }
        }
        _ => {}
    }
}
