//! # Selection Engine
//!
//! Decides which objects the text renderer prints, and at which depth,
//! without touching the model.
//!
//! The walk starts at the root (or a single compile unit in split mode) with
//! compile units at depth 1. Every printable object is visited; one that is
//! not selected still has its children visited one level deeper, so depth
//! always reflects the real nesting.
//!
//! With name filters active:
//!
//! - ancestors of a `tree` match are printed as context
//! - a `tree` match prints its whole subtree, kind options notwithstanding
//! - anything else prints only when it matches a plain `filter`
//!
//! ## Example
//!
//! ```rust
//! use dwarfview_core::builder::build;
//! use dwarfview_core::die::{Die, UnitDies};
//! use dwarfview_core::select::Selection;
//! use dwarfview_core::settings::ViewSettings;
//! use gimli::{DW_TAG_compile_unit, DW_TAG_variable};
//!
//! let mut unit = UnitDies::new();
//! unit.push(Die::new(0xb, DW_TAG_compile_unit, None).name("a.cpp"));
//! unit.push(Die::new(0x20, DW_TAG_variable, Some(0xb)).name("x"));
//!
//! let settings = ViewSettings::default();
//! let view = build("a.o", &[unit], &settings).view;
//! let selection = Selection::select(&view, &settings);
//! assert_eq!(selection.entries().len(), 2);
//! assert_eq!(selection.entries()[1].depth, 2);
//! ```

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::model::{LogicalObject, LogicalView, ObjectId, ObjectKind};
use crate::settings::{ShowOption, ViewSettings};

/// One printed object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry
{
    pub id: ObjectId,
    /// Tree depth; compile units are at depth 1.
    pub depth: usize,
}

/// The printed objects of a view, in output order.
#[derive(Debug, Clone, Default)]
pub struct Selection
{
    entries: Vec<Entry>,
}

impl Selection
{
    /// Select over the whole view.
    pub fn select(view: &LogicalView, settings: &ViewSettings) -> Self
    {
        Self::select_from(view, settings, view.root())
    }

    /// Select over the subtree rooted at `start`.
    pub fn select_from(view: &LogicalView, settings: &ViewSettings, start: ObjectId) -> Self
    {
        let mut walker = Walker {
            view,
            settings,
            context: tree_context(view, settings),
            selection: Selection::default(),
        };
        if start == view.root() {
            walker.visit_children(start, 1, false);
        } else {
            walker.visit(start, 1, false);
        }
        debug!(printed = walker.selection.entries.len(), "selected objects");
        walker.selection
    }

    pub fn entries(&self) -> &[Entry]
    {
        &self.entries
    }

    /// Printed objects of `kind`.
    pub fn count(&self, view: &LogicalView, kind: ObjectKind) -> usize
    {
        self.entries.iter().filter(|entry| view.get(entry.id).kind == kind).count()
    }

    fn push(&mut self, id: ObjectId, depth: usize)
    {
        self.entries.push(Entry { id, depth });
    }
}

/// Whether the kind options select `object`. Compile units always are.
pub fn print_object(object: &LogicalObject, settings: &ViewSettings) -> bool
{
    if matches!(object.kind, ObjectKind::InputFile | ObjectKind::CompileUnit) {
        return true;
    }
    if (settings.shows(ShowOption::OnlyGlobals) && !object.is_global)
        || (settings.shows(ShowOption::OnlyLocals) && object.is_global)
    {
        return false;
    }
    if object.is_template {
        return settings.shows(ShowOption::Template);
    }

    let option = match object.kind {
        ObjectKind::InputFile | ObjectKind::CompileUnit => return true,
        ObjectKind::Auxiliary => return false,
        ObjectKind::CodeLine => ShowOption::Codeline,
        ObjectKind::Block => ShowOption::Block,
        ObjectKind::Class => ShowOption::Class,
        ObjectKind::Struct => ShowOption::Struct,
        ObjectKind::Union => ShowOption::Union,
        ObjectKind::Alias => ShowOption::Alias,
        ObjectKind::Enum => ShowOption::Enum,
        ObjectKind::Function => ShowOption::Function,
        ObjectKind::Namespace => ShowOption::Namespace,
        ObjectKind::TemplateParameter => ShowOption::Template,
        ObjectKind::Member => ShowOption::Member,
        ObjectKind::Parameter => ShowOption::Parameter,
        ObjectKind::Variable => ShowOption::Variable,
        ObjectKind::PrimitiveType => ShowOption::PrimitiveType,
        ObjectKind::Using => ShowOption::Using,
    };
    settings.shows(option)
}

/// Ancestors of every `tree` filter match; the walk stops at a match.
fn tree_context(view: &LogicalView, settings: &ViewSettings) -> HashSet<ObjectId>
{
    let mut context = HashSet::new();
    if !settings.filters.has_tree() {
        return context;
    }

    let mut stack = vec![view.root()];
    while let Some(id) = stack.pop() {
        let object = view.get(id);
        if id != view.root() && settings.filters.matches_tree(&object.name) {
            let mut parent = object.parent;
            while let Some(ancestor) = parent {
                context.insert(ancestor);
                parent = view.get(ancestor).parent;
            }
            continue;
        }
        stack.extend(view.children(id));
        stack.extend(object.lines.iter().copied());
    }
    context
}

struct Walker<'a>
{
    view: &'a LogicalView,
    settings: &'a ViewSettings,
    context: HashSet<ObjectId>,
    selection: Selection,
}

impl Walker<'_>
{
    fn visit(&mut self, id: ObjectId, depth: usize, forced: bool)
    {
        let object = self.view.get(id);
        let filters = &self.settings.filters;

        // Code lines stay behind their own option even inside a tree match.
        if forced && (object.kind != ObjectKind::CodeLine || self.settings.shows(ShowOption::Codeline)) {
            self.selection.push(id, depth);
            self.visit_children(id, depth + 1, true);
            return;
        }

        if filters.is_active() {
            if self.context.contains(&id) {
                self.selection.push(id, depth);
                self.visit_children(id, depth + 1, false);
                return;
            }
            if filters.matches_tree(&object.name) {
                self.selection.push(id, depth);
                self.visit_children(id, depth + 1, true);
                return;
            }
        }

        let selected = !forced
            && print_object(object, self.settings)
            && (!filters.is_active() || filters.matches(&object.name));
        if selected {
            self.selection.push(id, depth);
        }
        self.visit_children(id, depth + 1, forced);
    }

    fn visit_children(&mut self, id: ObjectId, depth: usize, forced: bool)
    {
        let mut children: Vec<ObjectId> = self.view.children(id).collect();
        if self.settings.shows(ShowOption::Combined) {
            children = self.combined_order(children);
        }
        for child in children {
            self.visit(child, depth, forced);
        }
        for &line in &self.view.get(id).lines {
            self.visit(line, depth, forced);
        }
    }

    /// Move each function definition right behind the sibling holding its
    /// declaration.
    fn combined_order(&self, children: Vec<ObjectId>) -> Vec<ObjectId>
    {
        let mut moved: HashMap<ObjectId, Vec<ObjectId>> = HashMap::new();
        let mut staying = Vec::new();
        for &child in &children {
            match self.declaring_sibling(child, &children) {
                Some(sibling) => moved.entry(sibling).or_default().push(child),
                None => staying.push(child),
            }
        }
        if moved.is_empty() {
            return children;
        }

        let mut ordered = Vec::with_capacity(children.len());
        let mut placed = HashSet::new();
        for child in staying {
            place(child, &moved, &mut placed, &mut ordered);
        }
        // Definitions whose declaring siblings were themselves moved in a cycle.
        for child in children {
            if !placed.contains(&child) {
                place(child, &moved, &mut placed, &mut ordered);
            }
        }
        ordered
    }

    fn declaring_sibling(&self, child: ObjectId, siblings: &[ObjectId]) -> Option<ObjectId>
    {
        let object = self.view.get(child);
        if object.kind != ObjectKind::Function {
            return None;
        }
        let declaration = object.reference_id?;
        if self.view.get(declaration).unit != object.unit {
            return None;
        }
        siblings
            .iter()
            .copied()
            .find(|&sibling| sibling != child && self.view.is_within(declaration, sibling))
    }
}

fn place(
    child: ObjectId,
    moved: &HashMap<ObjectId, Vec<ObjectId>>,
    placed: &mut HashSet<ObjectId>,
    ordered: &mut Vec<ObjectId>,
)
{
    if !placed.insert(child) {
        return;
    }
    ordered.push(child);
    for &definition in moved.get(&child).into_iter().flatten() {
        place(definition, moved, placed, ordered);
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::builder::build;
    use crate::die::{Die, UnitDies};

    fn sample() -> UnitDies
    {
        let mut unit = UnitDies::new();
        unit.push(Die::new(0xb, gimli::DW_TAG_compile_unit, None).name("a.cpp"));
        unit.push(Die::new(0x20, gimli::DW_TAG_base_type, Some(0xb)).name("int"));
        unit.push(Die::new(0x30, gimli::DW_TAG_namespace, Some(0xb)).name("ns"));
        unit.push(Die::new(0x38, gimli::DW_TAG_structure_type, Some(0x30)).name("S"));
        unit.push(Die::new(0x40, gimli::DW_TAG_member, Some(0x38)).name("a").type_ref(0x20));
        unit.push(Die::new(0x48, gimli::DW_TAG_member, Some(0x38)).name("b").type_ref(0x20));
        unit.push(Die::new(0x50, gimli::DW_TAG_variable, Some(0xb)).name("g").type_ref(0x20));
        unit
    }

    fn names(view: &LogicalView, selection: &Selection) -> Vec<(String, usize)>
    {
        selection
            .entries()
            .iter()
            .map(|entry| (view.get(entry.id).name.clone(), entry.depth))
            .collect()
    }

    fn pairs(items: &[(&str, usize)]) -> Vec<(String, usize)>
    {
        items.iter().map(|(name, depth)| ((*name).to_string(), *depth)).collect()
    }

    #[test]
    fn test_hidden_objects_keep_children_depth()
    {
        let mut settings = ViewSettings::default();
        settings.show_none();
        settings.set(ShowOption::Member, true);
        let view = build("a.o", &[sample()], &settings).view;

        let selection = Selection::select(&view, &settings);
        assert_eq!(names(&view, &selection), pairs(&[("a.cpp", 1), ("a", 4), ("b", 4)]));
    }

    #[test]
    fn test_plain_filter_prints_matches_only()
    {
        let mut settings = ViewSettings::default();
        settings.filters.add_filter("a|g").unwrap();
        let view = build("a.o", &[sample()], &settings).view;

        let selection = Selection::select(&view, &settings);
        assert_eq!(names(&view, &selection), pairs(&[("a", 4), ("g", 2)]));
    }

    #[test]
    fn test_tree_filter_prints_context_and_subtree()
    {
        let mut settings = ViewSettings::default();
        settings.show_none();
        settings.filters.add_tree_any("S");
        let view = build("a.o", &[sample()], &settings).view;

        let selection = Selection::select(&view, &settings);
        assert_eq!(
            names(&view, &selection),
            pairs(&[("a.cpp", 1), ("ns", 2), ("S", 3), ("a", 4), ("b", 4)])
        );
    }

    #[test]
    fn test_primitive_types_follow_their_option()
    {
        let mut settings = ViewSettings::default();
        let view = build("a.o", &[sample()], &settings).view;
        let int = view.find(0x20).unwrap();
        let selects_int = |settings: &ViewSettings| {
            Selection::select(&view, settings).entries().iter().any(|entry| entry.id == int)
        };
        assert!(!selects_int(&settings));

        settings.set(ShowOption::PrimitiveType, true);
        assert!(selects_int(&settings));
    }

    #[test]
    fn test_only_globals()
    {
        let mut settings = ViewSettings::default();
        settings.set(ShowOption::OnlyGlobals, true);
        let view = build("a.o", &[sample()], &settings).view;

        let selection = Selection::select(&view, &settings);
        assert_eq!(names(&view, &selection), pairs(&[("a.cpp", 1)]));
    }

    #[test]
    fn test_combined_moves_definition_after_declaring_sibling()
    {
        let mut unit = UnitDies::new();
        unit.push(Die::new(0xb, gimli::DW_TAG_compile_unit, None).name("a.cpp"));
        unit.push(Die::new(0x20, gimli::DW_TAG_structure_type, Some(0xb)).name("S").decl(0, 3));
        unit.push(
            Die::new(0x28, gimli::DW_TAG_subprogram, Some(0x20))
                .name("run")
                .decl(0, 4)
                .flag(gimli::DW_AT_declaration),
        );
        unit.push(Die::new(0x30, gimli::DW_TAG_variable, Some(0xb)).name("v").decl(0, 8));
        unit.push(Die::new(0x40, gimli::DW_TAG_subprogram, Some(0xb)).reference(gimli::DW_AT_specification, 0x28));

        let mut settings = ViewSettings::default();
        let view = build("a.o", &[unit], &settings).view;
        let natural = Selection::select(&view, &settings);
        assert_eq!(
            names(&view, &natural),
            pairs(&[("a.cpp", 1), ("S", 2), ("run", 3), ("v", 2), ("run", 2)])
        );

        settings.set(ShowOption::Combined, true);
        let combined = Selection::select(&view, &settings);
        assert_eq!(
            names(&view, &combined),
            pairs(&[("a.cpp", 1), ("S", 2), ("run", 3), ("run", 2), ("v", 2)])
        );
    }

    #[test]
    fn test_select_from_compile_unit()
    {
        let settings = ViewSettings::default();
        let view = build("a.o", &[sample()], &settings).view;
        let cu = view.compile_units()[0];

        let whole = Selection::select(&view, &settings);
        let split = Selection::select_from(&view, &settings, cu);
        assert_eq!(whole.entries(), split.entries());
    }
}
