use std::collections::{HashMap, HashSet};

use tagql::document::{Argument, Document, Field, Pos, Selection, SelectionSet};

use crate::schema::{FieldDef, Schema, Type, TypeDef, TypeKind};
use crate::validation::{Rule, ValidationContext};

/// Fields that share a response key must resolve to the same thing, or be
/// known never to apply to the same object.
#[derive(Default)]
pub struct OverlappingFieldsCanBeMerged;

impl Rule for OverlappingFieldsCanBeMerged {
    fn enter_selection_set(&mut self, ctx: &mut ValidationContext<'_>, selection_set: &SelectionSet) {
        let mut finder = ConflictFinder {
            schema: ctx.schema(),
            document: ctx.document(),
            compared_pairs: HashMap::new(),
        };
        let conflicts = finder.within_selection_set(ctx.parent_type(), selection_set);
        for conflict in conflicts {
            let mut locations = conflict.fields1;
            locations.extend(conflict.fields2);
            ctx.report(
                format!(
                    "Fields \"{}\" conflict because {}. Use different aliases on the fields to fetch both if this was intentional.",
                    conflict.response_name,
                    conflict.reason.describe()
                ),
                locations,
            );
        }
    }
}

enum Reason {
    Message(String),
    Subfields(Vec<(String, Reason)>),
}

impl Reason {
    fn describe(&self) -> String {
        match self {
            Reason::Message(message) => message.clone(),
            Reason::Subfields(subfields) => subfields
                .iter()
                .map(|(name, reason)| {
                    format!("subfields \"{}\" conflict because {}", name, reason.describe())
                })
                .collect::<Vec<_>>()
                .join(" and "),
        }
    }
}

struct Conflict {
    response_name: String,
    reason: Reason,
    fields1: Vec<Pos>,
    fields2: Vec<Pos>,
}

/// A field as selected on a particular parent type.
#[derive(Clone, Copy)]
struct FieldInfo<'a> {
    parent: Option<&'a TypeDef>,
    field: &'a Field,
    def: Option<&'a FieldDef>,
}

/// Fields grouped by response key, in first-seen order.
type FieldMap<'a> = Vec<(&'a str, Vec<FieldInfo<'a>>)>;

struct ConflictFinder<'a> {
    schema: &'a Schema,
    document: &'a Document,
    /// Fragment pairs already compared, and whether that comparison
    /// assumed mutually exclusive parents.
    compared_pairs: HashMap<(String, String), bool>,
}

impl<'a> ConflictFinder<'a> {
    fn within_selection_set(
        &mut self,
        parent: Option<&'a TypeDef>,
        selection_set: &'a SelectionSet,
    ) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        let (field_map, fragment_names) = self.fields_and_fragment_names(parent, selection_set);

        self.collect_within(&mut conflicts, &field_map);
        for (i, name) in fragment_names.iter().enumerate() {
            let mut seen = HashSet::new();
            self.between_fields_and_fragment(&mut conflicts, &mut seen, false, &field_map, *name);
            for other in &fragment_names[i + 1..] {
                self.between_fragments(&mut conflicts, false, *name, *other);
            }
        }
        conflicts
    }

    fn fields_and_fragment_names(
        &self,
        parent: Option<&'a TypeDef>,
        selection_set: &'a SelectionSet,
    ) -> (FieldMap<'a>, Vec<&'a str>) {
        let mut field_map = FieldMap::new();
        let mut fragment_names = Vec::new();
        self.collect_fields(parent, selection_set, &mut field_map, &mut fragment_names);
        (field_map, fragment_names)
    }

    fn collect_fields(
        &self,
        parent: Option<&'a TypeDef>,
        selection_set: &'a SelectionSet,
        field_map: &mut FieldMap<'a>,
        fragment_names: &mut Vec<&'a str>,
    ) {
        for selection in &selection_set.selections {
            match selection {
                Selection::Field(field) => {
                    let def = parent
                        .filter(|p| matches!(p.kind, TypeKind::Object | TypeKind::Interface))
                        .and_then(|p| p.field(field.name.as_str()));
                    let info = FieldInfo { parent, field, def };
                    let key = field.response_key();
                    match field_map.iter_mut().find(|(k, _)| *k == key) {
                        Some((_, fields)) => fields.push(info),
                        None => field_map.push((key, vec![info])),
                    }
                }
                Selection::FragmentSpread(spread) => {
                    let name = spread.name.as_str();
                    if !fragment_names.contains(&name) {
                        fragment_names.push(name);
                    }
                }
                Selection::InlineFragment(inline) => {
                    let condition = match &inline.type_condition {
                        Some(name) => self.schema.type_def(name.as_str()),
                        None => parent,
                    };
                    self.collect_fields(condition, &inline.selection_set, field_map, fragment_names);
                }
            }
        }
    }

    fn fragment_fields(&self, name: &str) -> Option<(FieldMap<'a>, Vec<&'a str>)> {
        let fragment = self.document.fragments().find(|f| f.name.value == name)?;
        let condition = self.schema.type_def(fragment.type_condition.as_str());
        Some(self.fields_and_fragment_names(condition, &fragment.selection_set))
    }

    fn collect_within(&mut self, conflicts: &mut Vec<Conflict>, field_map: &FieldMap<'a>) {
        for (response_name, fields) in field_map {
            for (i, first) in fields.iter().enumerate() {
                for second in &fields[i + 1..] {
                    conflicts.extend(self.find_conflict(false, response_name, *first, *second));
                }
            }
        }
    }

    fn collect_between(
        &mut self,
        conflicts: &mut Vec<Conflict>,
        mutually_exclusive: bool,
        map1: &FieldMap<'a>,
        map2: &FieldMap<'a>,
    ) {
        for (response_name, fields1) in map1 {
            let Some((_, fields2)) = map2.iter().find(|(k, _)| k == response_name) else {
                continue;
            };
            for first in fields1 {
                for second in fields2 {
                    conflicts.extend(self.find_conflict(
                        mutually_exclusive,
                        response_name,
                        *first,
                        *second,
                    ));
                }
            }
        }
    }

    fn between_fields_and_fragment(
        &mut self,
        conflicts: &mut Vec<Conflict>,
        seen: &mut HashSet<&'a str>,
        mutually_exclusive: bool,
        field_map: &FieldMap<'a>,
        fragment_name: &'a str,
    ) {
        if !seen.insert(fragment_name) {
            return;
        }
        let Some((fragment_map, nested)) = self.fragment_fields(fragment_name) else {
            return;
        };
        self.collect_between(conflicts, mutually_exclusive, field_map, &fragment_map);
        for name in nested {
            self.between_fields_and_fragment(conflicts, seen, mutually_exclusive, field_map, name);
        }
    }

    fn between_fragments(
        &mut self,
        conflicts: &mut Vec<Conflict>,
        mutually_exclusive: bool,
        name1: &'a str,
        name2: &'a str,
    ) {
        if name1 == name2 {
            return;
        }
        let key = if name1 < name2 {
            (name1.to_string(), name2.to_string())
        } else {
            (name2.to_string(), name1.to_string())
        };
        match self.compared_pairs.get(&key) {
            // A non-exclusive comparison covers the exclusive one too.
            Some(&exclusive) if mutually_exclusive || !exclusive => return,
            _ => {}
        }
        self.compared_pairs.insert(key, mutually_exclusive);

        let (Some((map1, nested1)), Some((map2, nested2))) =
            (self.fragment_fields(name1), self.fragment_fields(name2))
        else {
            return;
        };
        self.collect_between(conflicts, mutually_exclusive, &map1, &map2);
        for nested in nested2 {
            self.between_fragments(conflicts, mutually_exclusive, name1, nested);
        }
        for nested in nested1 {
            self.between_fragments(conflicts, mutually_exclusive, nested, name2);
        }
    }

    fn between_sub_selections(
        &mut self,
        mutually_exclusive: bool,
        parent1: Option<&'a TypeDef>,
        set1: &'a SelectionSet,
        parent2: Option<&'a TypeDef>,
        set2: &'a SelectionSet,
    ) -> Vec<Conflict> {
        let mut conflicts = Vec::new();
        let (map1, names1) = self.fields_and_fragment_names(parent1, set1);
        let (map2, names2) = self.fields_and_fragment_names(parent2, set2);

        self.collect_between(&mut conflicts, mutually_exclusive, &map1, &map2);
        for &name in &names2 {
            let mut seen = HashSet::new();
            self.between_fields_and_fragment(&mut conflicts, &mut seen, mutually_exclusive, &map1, name);
        }
        for &name in &names1 {
            let mut seen = HashSet::new();
            self.between_fields_and_fragment(&mut conflicts, &mut seen, mutually_exclusive, &map2, name);
        }
        for &name1 in &names1 {
            for &name2 in &names2 {
                self.between_fragments(&mut conflicts, mutually_exclusive, name1, name2);
            }
        }
        conflicts
    }

    fn find_conflict(
        &mut self,
        parents_exclusive: bool,
        response_name: &str,
        first: FieldInfo<'a>,
        second: FieldInfo<'a>,
    ) -> Option<Conflict> {
        let mutually_exclusive = parents_exclusive
            || match (first.parent, second.parent) {
                (Some(p1), Some(p2)) => {
                    p1.name != p2.name
                        && p1.kind == TypeKind::Object
                        && p2.kind == TypeKind::Object
                }
                _ => false,
            };
        let conflict = |reason: Reason| Conflict {
            response_name: response_name.to_string(),
            reason,
            fields1: vec![first.field.pos],
            fields2: vec![second.field.pos],
        };

        if !mutually_exclusive {
            let (name1, name2) = (&first.field.name.value, &second.field.name.value);
            if name1 != name2 {
                return Some(conflict(Reason::Message(format!(
                    "{} and {} are different fields",
                    name1, name2
                ))));
            }
            if !same_arguments(&first.field.arguments, &second.field.arguments) {
                return Some(conflict(Reason::Message(
                    "they have differing arguments".to_string(),
                )));
            }
        }

        let type1 = first.def.map(|d| &d.field_type);
        let type2 = second.def.map(|d| &d.field_type);
        if let (Some(type1), Some(type2)) = (type1, type2) {
            if self.types_conflict(type1, type2) {
                return Some(conflict(Reason::Message(format!(
                    "they return conflicting types {} and {}",
                    type1, type2
                ))));
            }
        }

        let (Some(set1), Some(set2)) = (&first.field.selection_set, &second.field.selection_set)
        else {
            return None;
        };
        let named = |t: Option<&Type>| t.and_then(|t| self.schema.type_def(t.named()));
        let (parent1, parent2) = (named(type1), named(type2));
        let subfields = self.between_sub_selections(mutually_exclusive, parent1, set1, parent2, set2);
        if subfields.is_empty() {
            return None;
        }
        let mut fields1 = vec![first.field.pos];
        let mut fields2 = vec![second.field.pos];
        let mut reasons = Vec::new();
        for sub in subfields {
            fields1.extend(sub.fields1);
            fields2.extend(sub.fields2);
            reasons.push((sub.response_name, sub.reason));
        }
        Some(Conflict {
            response_name: response_name.to_string(),
            reason: Reason::Subfields(reasons),
            fields1,
            fields2,
        })
    }

    /// Two output types conflict when their list and non-null wrapping
    /// differs, or when either is a leaf and they differ.
    fn types_conflict(&self, type1: &Type, type2: &Type) -> bool {
        match (type1, type2) {
            (Type::List(item1), Type::List(item2)) => self.types_conflict(item1, item2),
            (Type::List(_), _) | (_, Type::List(_)) => true,
            (Type::NonNull(inner1), Type::NonNull(inner2)) => self.types_conflict(inner1, inner2),
            (Type::NonNull(_), _) | (_, Type::NonNull(_)) => true,
            (Type::Named(name1), Type::Named(name2)) => {
                let is_leaf = |name: &str| self.schema.type_def(name).is_some_and(TypeDef::is_leaf);
                (is_leaf(name1.as_str()) || is_leaf(name2.as_str())) && name1 != name2
            }
        }
    }
}

fn same_arguments(arguments1: &[Argument], arguments2: &[Argument]) -> bool {
    arguments1.len() == arguments2.len()
        && arguments1.iter().all(|a1| {
            arguments2
                .iter()
                .find(|a2| a2.name.value == a1.name.value)
                .is_some_and(|a2| a2.value.to_string() == a1.value.to_string())
        })
}
