//! Reference passes: linking offsets to objects, qualifiers, declaration
//! attributes and the global flag.

use tracing::{debug, trace};

use super::link_class;
use crate::model::{Detail, LogicalView, ObjectId};

/// Resolve type and declaration offsets into ids.
///
/// An object referenced from a different compile unit becomes global. A
/// declaration reference is only kept when both ends are scopes or both are
/// symbols.
pub(super) fn link_references(view: &mut LogicalView)
{
    let ids: Vec<ObjectId> = view.ids().collect();
    let mut unresolved = 0usize;

    for id in ids {
        let object = view.get(id);
        let (unit, type_offset, reference_offset) = (object.unit, object.type_offset, object.reference_offset);

        if let Some(offset) = type_offset {
            match view.find(offset) {
                Some(target) => {
                    view.get_mut(id).type_id = Some(target);
                    mark_foreign(view, target, unit);
                }
                None => {
                    unresolved += 1;
                    trace!(offset, "unresolved type reference");
                }
            }
        }

        if let Some(offset) = reference_offset {
            let Some(target) = view.find(offset) else {
                unresolved += 1;
                trace!(offset, "unresolved declaration reference");
                continue;
            };
            let source = view.get(id);
            let referenced = view.get(target);
            let from = link_class(source.kind, source.tag, &source.detail);
            let to = link_class(referenced.kind, referenced.tag, &referenced.detail);
            if from.is_some() && from == to {
                view.get_mut(id).reference_id = Some(target);
                mark_foreign(view, target, unit);
            }
        }
    }
    debug!(unresolved, "linked references");
}

fn mark_foreign(view: &mut LogicalView, target: ObjectId, unit: usize)
{
    if view.get(target).unit != unit {
        view.get_mut(target).is_global = true;
    }
}

/// Give every non-symbol object the scope path of its parent.
pub(super) fn assign_qualifiers(view: &mut LogicalView)
{
    let ids: Vec<ObjectId> = view.ids().collect();
    for id in ids {
        let object = view.get(id);
        if object.kind.has_scope_prefix() {
            let qualifier = view.scope_prefix(object.parent);
            view.get_mut(id).qualifier = qualifier;
        }
    }
}

/// Copy declaration attributes onto every object that references one.
pub(super) fn apply_declarations(view: &mut LogicalView)
{
    let mut done = vec![false; view.len()];
    let mut active = vec![false; view.len()];
    let ids: Vec<ObjectId> = view.ids().collect();
    for id in ids {
        apply_declaration(view, id, &mut done, &mut active);
    }
}

fn apply_declaration(view: &mut LogicalView, id: ObjectId, done: &mut [bool], active: &mut [bool])
{
    if done[id.index()] || active[id.index()] {
        return;
    }
    let Some(reference) = view.get(id).reference_id else {
        done[id.index()] = true;
        return;
    };

    active[id.index()] = true;
    // The declaration may itself be a definition of something else.
    apply_declaration(view, reference, done, active);

    let declaration = view.get(reference);
    let name = declaration.name.clone();
    let line = declaration.line;
    let file = declaration.file.clone();
    let type_link = declaration.type_id.map(|ty| (ty, declaration.type_offset));
    let is_static = declaration.function().is_some_and(|info| info.is_static);
    let qualifier = if declaration.kind.is_symbol() && view.get(id).kind.is_symbol() {
        Some(view.scope_prefix(declaration.parent))
    } else {
        None
    };

    let object = view.get_mut(id);
    object.name = name;
    object.line = line;
    object.file = file;
    if let Some((ty, offset)) = type_link {
        object.type_id = Some(ty);
        object.type_offset = offset;
    }
    if is_static {
        if let Detail::Function(info) = &mut object.detail {
            info.is_static = true;
        }
    }
    if let Some(qualifier) = qualifier.filter(|qualifier| !qualifier.is_empty()) {
        object.qualifier = qualifier;
    }

    active[id.index()] = false;
    done[id.index()] = true;
}

/// Children of a global object are global.
pub(super) fn propagate_globals(view: &mut LogicalView)
{
    // Parents are always allocated before their children.
    let ids: Vec<ObjectId> = view.ids().collect();
    for id in ids {
        let inherited = view.get(id).parent.is_some_and(|parent| view.get(parent).is_global);
        if inherited {
            view.get_mut(id).is_global = true;
        }
    }
}
