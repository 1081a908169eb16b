mod context;
pub mod rules;
mod walk;

use std::fmt;
use std::sync::Arc;

use tagql::document::{
    Argument, Directive, Document, Field, FragmentDefinition, FragmentSpread, InlineFragment,
    Name, OperationDefinition, Pos, SelectionSet, Value, VariableDefinition,
};

use crate::schema::Schema;

pub use context::ValidationContext;

/// One semantic problem found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
    pub locations: Vec<Pos>,
}

impl ValidationError {
    pub fn new(message: impl Into<String>, locations: Vec<Pos>) -> Self {
        ValidationError {
            message: message.into(),
            locations,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// What an argument is attached to.
#[derive(Debug, Clone, Copy)]
pub enum ArgumentOwner<'a> {
    Field(&'a Field),
    Directive(&'a Directive),
}

/// A visitor over an executable document. Every hook defaults to doing
/// nothing; rules override the nodes they care about. Type information for
/// the node being visited is available through the context.
#[allow(unused_variables)]
pub trait Rule {
    fn enter_document(&mut self, ctx: &mut ValidationContext<'_>, document: &Document) {}
    fn leave_document(&mut self, ctx: &mut ValidationContext<'_>, document: &Document) {}

    fn enter_operation(&mut self, ctx: &mut ValidationContext<'_>, op: &OperationDefinition) {}
    fn leave_operation(&mut self, ctx: &mut ValidationContext<'_>, op: &OperationDefinition) {}

    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        fragment: &FragmentDefinition,
    ) {
    }

    fn enter_variable_definition(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        definition: &VariableDefinition,
    ) {
    }

    /// Every selection set, after its parent type is known.
    fn enter_selection_set(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        selection_set: &SelectionSet,
    ) {
    }

    fn enter_field(&mut self, ctx: &mut ValidationContext<'_>, field: &Field) {}
    fn leave_field(&mut self, ctx: &mut ValidationContext<'_>, field: &Field) {}

    fn enter_fragment_spread(&mut self, ctx: &mut ValidationContext<'_>, spread: &FragmentSpread) {}

    fn enter_inline_fragment(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        fragment: &InlineFragment,
    ) {
    }

    fn enter_directive(&mut self, ctx: &mut ValidationContext<'_>, directive: &Directive) {}
    fn leave_directive(&mut self, ctx: &mut ValidationContext<'_>, directive: &Directive) {}

    fn enter_argument(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        argument: &Argument,
        owner: ArgumentOwner<'_>,
    ) {
    }

    fn enter_value(&mut self, ctx: &mut ValidationContext<'_>, value: &Value) {}
    fn leave_value(&mut self, ctx: &mut ValidationContext<'_>, value: &Value) {}

    /// A named type reference: variable types and type conditions.
    fn enter_named_type(&mut self, ctx: &mut ValidationContext<'_>, name: &Name) {}
}

/// Builds a fresh rule instance for every validation run.
#[derive(Clone)]
pub struct RuleFactory {
    name: &'static str,
    build: Arc<dyn Fn() -> Box<dyn Rule> + Send + Sync>,
}

impl RuleFactory {
    pub fn new(
        name: &'static str,
        build: impl Fn() -> Box<dyn Rule> + Send + Sync + 'static,
    ) -> Self {
        RuleFactory {
            name,
            build: Arc::new(build),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn instantiate(&self) -> Box<dyn Rule> {
        (self.build)()
    }
}

impl fmt::Debug for RuleFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RuleFactory").field(&self.name).finish()
    }
}

/// Run `rules` over `document` in one walk. Errors come back in the order
/// the walk produced them.
pub fn validate(schema: &Schema, document: &Document, rules: &[RuleFactory]) -> Vec<ValidationError> {
    let mut instances: Vec<Box<dyn Rule>> = rules.iter().map(RuleFactory::instantiate).collect();
    let mut ctx = ValidationContext::new(schema, document);
    walk::walk_document(&mut ctx, &mut instances, document);
    ctx.into_errors()
}
