//! # Object Model
//!
//! The logical view is an arena of [`LogicalObject`]s addressed by
//! [`ObjectId`], plus an index from DWARF offset to object. Every
//! cross-reference (type, declaration, parent) is stored as an id resolved
//! through that index, so the reference graph may contain cycles without any
//! ownership problems.
//!
//! The root object has kind [`ObjectKind::InputFile`] and is named after the
//! input path. Compile units are its children.

mod kind;
mod object;

use std::collections::HashMap;

pub use kind::{classify_tag, AuxForm, ObjectKind, TagClass};
pub use object::{
    Access, BlockForm, Detail, FunctionInfo, LineFlags, LogicalObject, ObjectId, SourceFile, TemplateParam,
};

/// The complete logical view of one input file.
#[derive(Debug, Clone)]
pub struct LogicalView
{
    objects: Vec<LogicalObject>,
    by_offset: HashMap<u64, ObjectId>,
}

impl LogicalView
{
    /// A view holding only the root for `input`.
    pub fn new(input: &str) -> Self
    {
        let mut root = LogicalObject::new(ObjectKind::InputFile, 0);
        root.name = input.to_string();
        Self {
            objects: vec![root],
            by_offset: HashMap::new(),
        }
    }

    pub fn root(&self) -> ObjectId
    {
        ObjectId(0)
    }

    pub fn input_file(&self) -> &str
    {
        &self.objects[0].name
    }

    pub fn get(&self, id: ObjectId) -> &LogicalObject
    {
        &self.objects[id.0]
    }

    pub fn get_mut(&mut self, id: ObjectId) -> &mut LogicalObject
    {
        &mut self.objects[id.0]
    }

    pub fn len(&self) -> usize
    {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.objects.len() <= 1
    }

    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_
    {
        (0..self.objects.len()).map(ObjectId)
    }

    pub fn objects(&self) -> impl Iterator<Item = &LogicalObject> + '_
    {
        self.objects.iter()
    }

    /// Look up an object by DWARF offset.
    pub fn find(&self, offset: u64) -> Option<ObjectId>
    {
        self.by_offset.get(&offset).copied()
    }

    /// Add `object` under `parent`, indexing it by offset unless it is a code line.
    pub fn insert(&mut self, mut object: LogicalObject, parent: ObjectId) -> ObjectId
    {
        let id = ObjectId(self.objects.len());
        object.parent = Some(parent);
        object.level = if parent == self.root() || object.kind == ObjectKind::CompileUnit {
            0
        } else {
            self.get(parent).level + 1
        };
        let is_line = object.kind == ObjectKind::CodeLine;
        if !is_line {
            self.by_offset.insert(object.offset, id);
        }
        self.objects.push(object);

        let parent = &mut self.objects[parent.0];
        if is_line {
            parent.lines.push(id);
        } else {
            parent.children.push(id);
        }
        id
    }

    /// Compile units in input order.
    pub fn compile_units(&self) -> Vec<ObjectId>
    {
        self.objects[0]
            .children
            .iter()
            .copied()
            .filter(|&id| self.get(id).kind == ObjectKind::CompileUnit)
            .collect()
    }

    /// Whether `id` is rendered as an object of its own. Auxiliary nodes and
    /// the members of a template parameter pack are not; a pack prints its
    /// members inline.
    pub fn is_printable(&self, id: ObjectId) -> bool
    {
        let object = self.get(id);
        if object.is_aux() {
            return false;
        }
        !(object.kind == ObjectKind::TemplateParameter
            && object.parent.is_some_and(|parent| self.get(parent).is_pack()))
    }

    /// Printable children, in their current order.
    pub fn children(&self, id: ObjectId) -> impl Iterator<Item = ObjectId> + '_
    {
        self.get(id).children.iter().copied().filter(|&child| self.is_printable(child))
    }

    /// Auxiliary children of a given form, in order.
    pub fn aux_children(&self, id: ObjectId, form: AuxForm) -> impl Iterator<Item = ObjectId> + '_
    {
        self.get(id)
            .children
            .iter()
            .copied()
            .filter(move |&child| self.get(child).aux_form() == Some(form))
    }

    /// The resolved type of `id`, if any.
    pub fn type_of(&self, id: ObjectId) -> Option<&LogicalObject>
    {
        self.get(id).type_id.map(|ty| self.get(ty))
    }

    /// Whether the parent of `id` is a template scope.
    pub fn parent_is_template(&self, id: ObjectId) -> bool
    {
        self.get(id).parent.is_some_and(|parent| self.get(parent).is_template)
    }

    /// The full scope path of `id`, e.g. `A::B::foo`.
    ///
    /// Walks every named ancestor up to the compile unit, functions included.
    /// Used for functions, namespaces and the targets of using declarations.
    pub fn scope_path(&self, id: ObjectId) -> String
    {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            let object = self.get(node);
            if matches!(object.kind, ObjectKind::CompileUnit | ObjectKind::InputFile) {
                break;
            }
            if !object.name.is_empty() {
                parts.push(object.name.as_str());
            }
            current = object.parent;
        }
        parts.reverse();
        parts.join("::")
    }

    /// The qualifier an object declared directly inside `parent` takes,
    /// including the trailing `::`.
    ///
    /// Empty when `parent` is a function. Unnamed scopes are skipped and the
    /// walk stops at the compile unit.
    pub fn scope_prefix(&self, parent: Option<ObjectId>) -> String
    {
        let Some(first) = parent else {
            return String::new();
        };
        if self.get(first).kind == ObjectKind::Function {
            return String::new();
        }

        let mut prefix = String::new();
        let mut current = Some(first);
        while let Some(node) = current {
            let object = self.get(node);
            if matches!(object.kind, ObjectKind::CompileUnit | ObjectKind::InputFile) {
                break;
            }
            if !object.name.is_empty() {
                prefix.insert_str(0, "::");
                prefix.insert_str(0, &object.name);
            }
            current = object.parent;
        }
        prefix
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_within(&self, id: ObjectId, ancestor: ObjectId) -> bool
    {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.get(node).parent;
        }
        false
    }

    /// Every object of `kind` ever built, printable or not.
    pub fn count(&self, kind: ObjectKind) -> usize
    {
        self.objects.iter().filter(|object| object.kind == kind).count()
    }
}
