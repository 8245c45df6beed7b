//! # Renderers
//!
//! Text and YAML output for a [`LogicalView`].
//!
//! The text renderer prints what a [`crate::select::Selection`] chose, with
//! layout columns sized over the whole view. The YAML renderer lists every
//! printable object with the fixed `output_version: "0.1"` schema.

pub mod text;
pub mod yaml;

pub use text::{render_text, TextRenderer};
pub use yaml::{render_yaml, YamlRenderer};

use crate::model::{LogicalView, ObjectId, ObjectKind};

/// The `using_type` of a using directive or declaration.
pub(crate) fn using_kind(view: &LogicalView, id: ObjectId) -> Option<&'static str>
{
    let object = view.get(id);
    if matches!(object.detail, crate::model::Detail::Using { module: true }) {
        return Some("namespace");
    }
    let target = view.get(object.type_id?);
    Some(match target.kind {
        ObjectKind::Namespace => "namespace",
        ObjectKind::Function => "function",
        ObjectKind::Variable | ObjectKind::Member | ObjectKind::Parameter => "variable",
        _ => "type",
    })
}

/// The name a using directive or declaration imports, e.g. `A::m`.
pub(crate) fn using_name(view: &LogicalView, id: ObjectId) -> String
{
    let object = view.get(id);
    let Some(target) = object.type_id else {
        return object.name.clone();
    };
    let target = view.get(target);
    match target.parent {
        Some(parent) if !matches!(view.get(parent).kind, ObjectKind::CompileUnit | ObjectKind::InputFile) => {
            let path = view.scope_path(parent);
            if path.is_empty() {
                target.name.clone()
            } else {
                format!("{path}::{}", target.name)
            }
        }
        _ => target.name.clone(),
    }
}
