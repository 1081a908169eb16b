use std::collections::{HashMap, HashSet};

use tagql::document::{Document, FragmentDefinition, FragmentSpread, InlineFragment, Pos};

use crate::validation::{Rule, ValidationContext};

#[derive(Default)]
pub struct FragmentsOnCompositeTypes;

impl Rule for FragmentsOnCompositeTypes {
    fn enter_inline_fragment(&mut self, ctx: &mut ValidationContext<'_>, fragment: &InlineFragment) {
        let Some(condition) = &fragment.type_condition else {
            return;
        };
        if let Some(def) = ctx.schema().type_def(condition.as_str()) {
            if !def.is_composite() {
                ctx.report(
                    format!(
                        "Fragment cannot condition on non composite type \"{}\".",
                        condition.value
                    ),
                    vec![condition.pos],
                );
            }
        }
    }

    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        fragment: &FragmentDefinition,
    ) {
        let condition = &fragment.type_condition;
        if let Some(def) = ctx.schema().type_def(condition.as_str()) {
            if !def.is_composite() {
                ctx.report(
                    format!(
                        "Fragment \"{}\" cannot condition on non composite type \"{}\".",
                        fragment.name.value, condition.value
                    ),
                    vec![condition.pos],
                );
            }
        }
    }
}

/// A fragment must be able to apply to the type it is spread into.
#[derive(Default)]
pub struct PossibleFragmentSpreads;

impl Rule for PossibleFragmentSpreads {
    fn enter_inline_fragment(&mut self, ctx: &mut ValidationContext<'_>, fragment: &InlineFragment) {
        let schema = ctx.schema();
        let fragment_type = ctx.current_type().and_then(|t| schema.type_def(t.named()));
        let (Some(fragment_type), Some(parent)) = (fragment_type, ctx.parent_type()) else {
            return;
        };
        if !schema.types_overlap(fragment_type, parent) {
            ctx.report(
                format!(
                    "Fragment cannot be spread here as objects of type \"{}\" can never be of type \"{}\".",
                    parent.name, fragment_type.name
                ),
                vec![fragment.pos],
            );
        }
    }

    fn enter_fragment_spread(&mut self, ctx: &mut ValidationContext<'_>, spread: &FragmentSpread) {
        let schema = ctx.schema();
        let fragment_type = ctx
            .fragment(spread.name.as_str())
            .and_then(|f| schema.type_def(f.type_condition.as_str()))
            .filter(|t| t.is_composite());
        let (Some(fragment_type), Some(parent)) = (fragment_type, ctx.parent_type()) else {
            return;
        };
        if !schema.types_overlap(fragment_type, parent) {
            ctx.report(
                format!(
                    "Fragment \"{}\" cannot be spread here as objects of type \"{}\" can never be of type \"{}\".",
                    spread.name.value, parent.name, fragment_type.name
                ),
                vec![spread.pos],
            );
        }
    }
}

#[derive(Default)]
pub struct UniqueFragmentNames {
    known: HashMap<String, Pos>,
}

impl Rule for UniqueFragmentNames {
    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        fragment: &FragmentDefinition,
    ) {
        let name = &fragment.name;
        match self.known.get(&name.value) {
            Some(first) => ctx.report(
                format!("There can be only one fragment named \"{}\".", name.value),
                vec![*first, name.pos],
            ),
            None => {
                self.known.insert(name.value.clone(), name.pos);
            }
        }
    }
}

#[derive(Default)]
pub struct KnownFragmentNames;

impl Rule for KnownFragmentNames {
    fn enter_fragment_spread(&mut self, ctx: &mut ValidationContext<'_>, spread: &FragmentSpread) {
        if ctx.fragment(spread.name.as_str()).is_none() {
            ctx.report(
                format!("Unknown fragment \"{}\".", spread.name.value),
                vec![spread.name.pos],
            );
        }
    }
}

#[derive(Default)]
pub struct NoUnusedFragments;

impl Rule for NoUnusedFragments {
    fn leave_document(&mut self, ctx: &mut ValidationContext<'_>, document: &Document) {
        let used: HashSet<String> = document
            .operations()
            .flat_map(|op| ctx.recursively_referenced_fragments(&op.selection_set))
            .map(|fragment| fragment.name.value.clone())
            .collect();
        for fragment in document.fragments() {
            if !used.contains(&fragment.name.value) {
                ctx.report(
                    format!("Fragment \"{}\" is never used.", fragment.name.value),
                    vec![fragment.pos],
                );
            }
        }
    }
}

/// Reports each fragment cycle once, at the spread that closes it.
#[derive(Default)]
pub struct NoFragmentCycles {
    visited: HashSet<String>,
}

impl NoFragmentCycles {
    fn detect(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        fragment: &FragmentDefinition,
        path: &mut Vec<(String, Pos)>,
        on_path: &mut HashMap<String, usize>,
    ) {
        let name = fragment.name.value.clone();
        if !self.visited.insert(name.clone()) {
            return;
        }
        let spreads = spreads_of(fragment);
        if spreads.is_empty() {
            return;
        }
        on_path.insert(name.clone(), path.len());

        for (spread_name, spread_pos) in spreads {
            match on_path.get(&spread_name).copied() {
                None => {
                    path.push((spread_name.clone(), spread_pos));
                    if let Some(target) = ctx.fragment(&spread_name) {
                        self.detect(ctx, target, path, on_path);
                    }
                    path.pop();
                }
                Some(start) => {
                    let cycle = &path[start..];
                    let via: Vec<String> = cycle
                        .iter()
                        .map(|(name, _)| format!("\"{}\"", name))
                        .collect();
                    let mut locations: Vec<Pos> = cycle.iter().map(|(_, pos)| *pos).collect();
                    locations.push(spread_pos);
                    let message = if via.is_empty() {
                        format!("Cannot spread fragment \"{}\" within itself.", spread_name)
                    } else {
                        format!(
                            "Cannot spread fragment \"{}\" within itself via {}.",
                            spread_name,
                            via.join(", ")
                        )
                    };
                    ctx.report(message, locations);
                }
            }
        }

        on_path.remove(&name);
    }
}

/// Every spread inside a fragment's selections, in document order.
fn spreads_of(fragment: &FragmentDefinition) -> Vec<(String, Pos)> {
    use tagql::document::{Selection, SelectionSet};

    fn collect(set: &SelectionSet, out: &mut Vec<(String, Pos)>) {
        for selection in &set.selections {
            match selection {
                Selection::Field(field) => {
                    if let Some(inner) = &field.selection_set {
                        collect(inner, out);
                    }
                }
                Selection::InlineFragment(inline) => collect(&inline.selection_set, out),
                Selection::FragmentSpread(spread) => {
                    out.push((spread.name.value.clone(), spread.pos))
                }
            }
        }
    }

    let mut out = Vec::new();
    collect(&fragment.selection_set, &mut out);
    out
}

impl Rule for NoFragmentCycles {
    fn enter_fragment_definition(
        &mut self,
        ctx: &mut ValidationContext<'_>,
        fragment: &FragmentDefinition,
    ) {
        self.detect(ctx, fragment, &mut Vec::new(), &mut HashMap::new());
    }
}
