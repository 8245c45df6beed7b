//! Sibling ordering.
//!
//! Children are reordered in place under every parent; code lines keep their
//! line-table order.

use std::cmp::Ordering;

use crate::model::{LogicalObject, LogicalView, ObjectId};
use crate::settings::SortKey;

/// Sort the children of every object by `key`.
pub fn sort_view(view: &mut LogicalView, key: SortKey)
{
    let ids: Vec<ObjectId> = view.ids().collect();
    for id in ids {
        if view.get(id).children.len() < 2 {
            continue;
        }
        let mut children = std::mem::take(&mut view.get_mut(id).children);
        children.sort_by(|&a, &b| compare(view.get(a), view.get(b), key));
        view.get_mut(id).children = children;
    }
}

/// Total order for `key`; the DWARF offset breaks every tie.
pub fn compare(a: &LogicalObject, b: &LogicalObject, key: SortKey) -> Ordering
{
    let by_line = || a.line.cmp(&b.line);
    let by_name = || a.name.cmp(&b.name);
    let by_kind = || a.kind.as_str().cmp(b.kind.as_str());
    let by_offset = || a.offset.cmp(&b.offset);

    match key {
        SortKey::Line => by_line().then_with(by_name).then_with(by_kind).then_with(by_offset),
        SortKey::Name => by_name().then_with(by_line).then_with(by_kind).then_with(by_offset),
        SortKey::Offset => by_offset(),
    }
}
