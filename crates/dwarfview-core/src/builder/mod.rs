//! # Tree Builder
//!
//! Turns the DIE stream of every compile unit into a [`LogicalView`].
//!
//! Materializing is kept mechanical: one object per recognised DIE, parented
//! by offset, with its raw attributes decoded. Everything that needs the whole
//! tree runs afterwards as separate passes:
//!
//! 1. type and declaration offsets are resolved into object ids, marking
//!    objects referenced from another compile unit as global
//! 2. synthesized names: modifier, array and subroutine types, then template
//!    argument suffixes
//! 3. scope qualifiers
//! 4. declaration attributes copied onto the objects that reference them
//! 5. the global flag is inherited by descendants
//!
//! Unknown tags and unexpected attribute forms are reported through
//! [`Diagnostics`] and never abort the build.
//!
//! ## Example
//!
//! ```rust
//! use dwarfview_core::builder::build;
//! use dwarfview_core::die::{Die, UnitDies};
//! use dwarfview_core::settings::ViewSettings;
//! use gimli::{DW_TAG_base_type, DW_TAG_compile_unit, DW_TAG_pointer_type};
//!
//! let mut unit = UnitDies::new();
//! unit.push(Die::new(0xb, DW_TAG_compile_unit, None).name("a.cpp"));
//! unit.push(Die::new(0x20, DW_TAG_base_type, Some(0xb)).name("int"));
//! unit.push(Die::new(0x28, DW_TAG_pointer_type, Some(0xb)).type_ref(0x20));
//!
//! let output = build("a.o", &[unit], &ViewSettings::default());
//! let pointer = output.view.find(0x28).unwrap();
//! assert_eq!(output.view.get(pointer).name, "int *");
//! assert!(output.diagnostics.is_empty());
//! ```

mod names;
mod resolve;

use std::collections::HashSet;

use gimli::{DwAt, DwTag};
use tracing::{debug, trace};

use crate::diagnostics::Diagnostics;
use crate::die::{AttrValue, Die, UnitDies};
use crate::model::{
    classify_tag, Access, AuxForm, BlockForm, Detail, FunctionInfo, LineFlags, LogicalObject, LogicalView, ObjectId,
    ObjectKind, SourceFile, TagClass, TemplateParam,
};
use crate::settings::ViewSettings;

/// The result of building one input file.
#[derive(Debug, Clone)]
pub struct BuildOutput
{
    pub view: LogicalView,
    pub diagnostics: Diagnostics,
}

/// Build the logical view of `input` from its compile units.
pub fn build(input: &str, units: &[UnitDies], settings: &ViewSettings) -> BuildOutput
{
    TreeBuilder::new(input, settings).build(units)
}

/// The kind of value an attribute is expected to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect
{
    String,
    Unsigned,
    Signed,
    Flag,
    Reference,
    Exprloc,
}

impl Expect
{
    fn of(value: &AttrValue) -> Option<Self>
    {
        match value {
            AttrValue::String(_) => Some(Expect::String),
            AttrValue::Unsigned(_) => Some(Expect::Unsigned),
            AttrValue::Signed(_) => Some(Expect::Signed),
            AttrValue::Flag(_) => Some(Expect::Flag),
            AttrValue::Reference(_) => Some(Expect::Reference),
            AttrValue::Exprloc => Some(Expect::Exprloc),
            AttrValue::Block | AttrValue::Unsupported => None,
        }
    }
}

/// Builds a [`LogicalView`] from DIEs.
pub struct TreeBuilder<'a>
{
    settings: &'a ViewSettings,
    view: LogicalView,
    diagnostics: Diagnostics,
    /// Offsets of DIEs left out of the tree, so their subtrees go too.
    dropped: HashSet<u64>,
}

impl<'a> TreeBuilder<'a>
{
    pub fn new(input: &str, settings: &'a ViewSettings) -> Self
    {
        Self {
            settings,
            view: LogicalView::new(input),
            diagnostics: Diagnostics::new(),
            dropped: HashSet::new(),
        }
    }

    /// Run every pass and hand back the finished view.
    pub fn build(mut self, units: &[UnitDies]) -> BuildOutput
    {
        for (index, unit) in units.iter().enumerate() {
            self.add_unit(index, unit);
        }
        if self.view.get(self.view.root()).children.is_empty() {
            self.diagnostics.no_debug_data();
        }

        resolve::link_references(&mut self.view);
        names::resolve_names(&mut self.view, self.settings);
        resolve::assign_qualifiers(&mut self.view);
        resolve::apply_declarations(&mut self.view);
        resolve::propagate_globals(&mut self.view);

        debug!(
            input = self.view.input_file(),
            objects = self.view.len(),
            units = units.len(),
            warnings = self.diagnostics.warnings().len(),
            "built logical view"
        );
        BuildOutput {
            view: self.view,
            diagnostics: self.diagnostics,
        }
    }

    fn add_unit(&mut self, index: usize, unit: &UnitDies)
    {
        let mut compile_unit: Option<ObjectId> = None;

        for die in &unit.dies {
            if die.parent.is_some_and(|parent| self.dropped.contains(&parent)) {
                self.dropped.insert(die.offset);
                continue;
            }

            let parent = self.parent_of(die, compile_unit);
            let class = self.classify(die, parent);
            if class == TagClass::Unknown {
                self.diagnostics.unknown_tag(die.tag);
                self.dropped.insert(die.offset);
                continue;
            }

            let object = self.materialize(die, unit, index, class, parent);
            let kind = object.kind;
            let id = self.view.insert(object, parent);
            trace!(offset = die.offset, tag = %die.tag, kind = %kind, "materialized DIE");

            match kind {
                ObjectKind::CompileUnit => {
                    compile_unit = Some(id);
                    self.add_lines(unit, index, id);
                }
                ObjectKind::TemplateParameter => self.mark_template(parent),
                _ => {}
            }
        }
    }

    /// The object a DIE hangs under: its parent DIE, else the current compile
    /// unit, else the root.
    fn parent_of(&self, die: &Die, compile_unit: Option<ObjectId>) -> ObjectId
    {
        let fallback = if die.tag == gimli::DW_TAG_compile_unit {
            self.view.root()
        } else {
            compile_unit.unwrap_or_else(|| self.view.root())
        };
        die.parent
            .and_then(|offset| self.view.find(offset))
            .unwrap_or(fallback)
    }

    fn classify(&self, die: &Die, parent: ObjectId) -> TagClass
    {
        let class = classify_tag(die.tag);
        // Parameters of a function pointer type only feed its name.
        if class == TagClass::Object(ObjectKind::Parameter)
            && self.view.get(parent).aux_form() == Some(AuxForm::Subroutine)
        {
            return TagClass::Aux(AuxForm::SubroutineParameter);
        }
        class
    }

    fn materialize(
        &mut self,
        die: &Die,
        unit: &UnitDies,
        index: usize,
        class: TagClass,
        parent: ObjectId,
    ) -> LogicalObject
    {
        let kind = match class {
            TagClass::Object(kind) => kind,
            TagClass::Aux(_) | TagClass::Unknown => ObjectKind::Auxiliary,
        };

        let mut object = LogicalObject::new(kind, die.offset);
        object.tag = Some(die.tag);
        object.unit = index;
        object.name = match die.attr(gimli::DW_AT_name).map(|attr| &attr.value) {
            Some(AttrValue::String(name)) if kind == ObjectKind::CompileUnit => unify_path(name),
            Some(AttrValue::String(name)) => name.clone(),
            _ => String::new(),
        };
        object.line = self.unsigned(die, gimli::DW_AT_decl_line).unwrap_or(0);
        if let Some(file) = self.unsigned(die, gimli::DW_AT_decl_file) {
            object.file = source_file(unit, file);
        }
        object.is_generated = self.flag(die, gimli::DW_AT_artificial);
        object.is_template = die.tag == gimli::DW_TAG_template_alias;
        object.type_offset = self
            .reference(die, gimli::DW_AT_type)
            .or_else(|| self.reference(die, gimli::DW_AT_import));
        object.reference_offset = self
            .reference(die, gimli::DW_AT_specification)
            .or_else(|| self.reference(die, gimli::DW_AT_abstract_origin))
            .or_else(|| self.reference(die, gimli::DW_AT_extension));

        match class {
            TagClass::Object(kind) => object.detail = self.object_detail(die, kind, parent),
            TagClass::Aux(AuxForm::Subrange) => {
                object.name = self.subrange_bounds(die);
                object.detail = Detail::Aux(AuxForm::Subrange);
            }
            TagClass::Aux(AuxForm::Enumerator) => {
                object.detail = Detail::Enumerator {
                    value: self.const_value(die).unwrap_or_default(),
                };
            }
            TagClass::Aux(AuxForm::Inheritance) => {
                object.detail = Detail::Inheritance {
                    access: self.access(die),
                };
            }
            TagClass::Aux(form) => object.detail = Detail::Aux(form),
            TagClass::Unknown => {}
        }
        object
    }

    fn object_detail(&mut self, die: &Die, kind: ObjectKind, parent: ObjectId) -> Detail
    {
        let in_aggregate = self.view.get(parent).kind.is_aggregate();
        match kind {
            ObjectKind::Function => {
                let inline = self.unsigned(die, gimli::DW_AT_inline).is_some_and(|value| {
                    value == u64::from(gimli::DW_INL_declared_inlined.0)
                        || value == u64::from(gimli::DW_INL_declared_not_inlined.0)
                });
                Detail::Function(FunctionInfo {
                    is_declaration: self.flag(die, gimli::DW_AT_declaration),
                    is_static: !die.has_attr(gimli::DW_AT_specification) && !self.flag(die, gimli::DW_AT_external),
                    is_inline: inline,
                    is_inlined: die.tag == gimli::DW_TAG_inlined_subroutine,
                })
            }
            ObjectKind::Enum => Detail::Enum {
                is_class: self.flag(die, gimli::DW_AT_enum_class),
            },
            ObjectKind::Member => Detail::Member {
                access: self.access(die),
                is_static: in_aggregate && self.flag(die, gimli::DW_AT_external),
            },
            // DWARF 5 describes static data members as variables inside the aggregate.
            ObjectKind::Variable if in_aggregate => Detail::Member {
                access: self.access(die),
                is_static: true,
            },
            ObjectKind::Parameter if die.tag == gimli::DW_TAG_unspecified_parameters => Detail::Variadic,
            ObjectKind::TemplateParameter => Detail::TemplateParameter(self.template_param(die)),
            ObjectKind::Using => Detail::Using {
                module: die.tag == gimli::DW_TAG_imported_module,
            },
            ObjectKind::Block => Detail::Block(match die.tag {
                gimli::DW_TAG_try_block => BlockForm::Try,
                gimli::DW_TAG_catch_block => BlockForm::Catch,
                _ => BlockForm::Lexical,
            }),
            ObjectKind::PrimitiveType => Detail::PrimitiveType {
                byte_size: self.unsigned(die, gimli::DW_AT_byte_size).unwrap_or(0),
            },
            _ => Detail::None,
        }
    }

    fn template_param(&mut self, die: &Die) -> TemplateParam
    {
        match die.tag {
            gimli::DW_TAG_template_value_parameter => TemplateParam::Value(self.const_value(die)),
            gimli::DW_TAG_GNU_template_template_param => {
                TemplateParam::Template(self.string(die, gimli::DW_AT_GNU_template_name))
            }
            gimli::DW_TAG_GNU_template_parameter_pack => TemplateParam::Pack,
            _ => TemplateParam::Type,
        }
    }

    /// `[N]`, `[L..U]` or `[?]`.
    fn subrange_bounds(&mut self, die: &Die) -> String
    {
        let lower = self.unsigned(die, gimli::DW_AT_lower_bound).unwrap_or(0);
        let count = self.unsigned(die, gimli::DW_AT_count);
        // A bound given as an expression or a variable reference is runtime-sized.
        let upper = self.expect(
            die,
            gimli::DW_AT_upper_bound,
            &[Expect::Unsigned, Expect::Exprloc, Expect::Reference],
        );

        match (count, upper) {
            (Some(count), _) => format!("[{}]", lower.saturating_add(count)),
            (None, Some(AttrValue::Unsigned(upper))) if lower != 0 => format!("[{lower}..{upper}]"),
            (None, Some(AttrValue::Unsigned(upper))) => format!("[{}]", upper.saturating_add(1)),
            _ => "[?]".to_string(),
        }
    }

    fn const_value(&mut self, die: &Die) -> Option<String>
    {
        match self.expect(die, gimli::DW_AT_const_value, &[Expect::Unsigned, Expect::Signed])? {
            AttrValue::Unsigned(value) => Some(value.to_string()),
            AttrValue::Signed(value) => Some(value.to_string()),
            _ => None,
        }
    }

    fn access(&mut self, die: &Die) -> Access
    {
        self.unsigned(die, gimli::DW_AT_accessibility)
            .map_or(Access::Unspecified, Access::from_dwarf)
    }

    /// Every template parameter makes its owner a template, except under a
    /// plain typedef.
    fn mark_template(&mut self, parent: ObjectId)
    {
        let owner = self.view.get(parent);
        let is_scope = !owner.is_aux()
            && !owner.kind.is_symbol()
            && !matches!(owner.kind, ObjectKind::InputFile | ObjectKind::CompileUnit)
            && owner.tag != Some(gimli::DW_TAG_typedef);
        if is_scope {
            self.view.get_mut(parent).is_template = true;
        }
    }

    fn add_lines(&mut self, unit: &UnitDies, index: usize, compile_unit: ObjectId)
    {
        for row in &unit.lines {
            let mut line = LogicalObject::new(ObjectKind::CodeLine, row.address);
            line.unit = index;
            line.line = row.line;
            line.file = source_file(unit, row.file);
            line.detail = Detail::CodeLine(LineFlags {
                address: row.address,
                discriminator: row.discriminator,
                new_statement: row.is_stmt,
                prologue_end: row.prologue_end,
                end_sequence: row.end_sequence,
                basic_block: row.basic_block,
                epilogue_begin: row.epilogue_begin,
            });
            self.view.insert(line, compile_unit);
        }
        trace!(rows = unit.lines.len(), "added code lines");
    }

    /// The attribute `name` if its value has one of the `expected` kinds.
    /// Any other form is reported once and ignored.
    fn expect<'d>(&mut self, die: &'d Die, name: DwAt, expected: &[Expect]) -> Option<&'d AttrValue>
    {
        let attr = die.attr(name)?;
        if Expect::of(&attr.value).is_some_and(|kind| expected.contains(&kind)) {
            return Some(&attr.value);
        }
        self.diagnostics.unexpected_form(name, attr.form);
        None
    }

    fn unsigned(&mut self, die: &Die, name: DwAt) -> Option<u64>
    {
        match self.expect(die, name, &[Expect::Unsigned])? {
            AttrValue::Unsigned(value) => Some(*value),
            _ => None,
        }
    }

    fn flag(&mut self, die: &Die, name: DwAt) -> bool
    {
        matches!(self.expect(die, name, &[Expect::Flag]), Some(AttrValue::Flag(true)))
    }

    fn reference(&mut self, die: &Die, name: DwAt) -> Option<u64>
    {
        match self.expect(die, name, &[Expect::Reference])? {
            AttrValue::Reference(offset) => Some(*offset),
            _ => None,
        }
    }

    fn string(&mut self, die: &Die, name: DwAt) -> Option<String>
    {
        match self.expect(die, name, &[Expect::String])? {
            AttrValue::String(value) => Some(value.clone()),
            _ => None,
        }
    }
}

/// Resolve a file index through the unit's file table.
///
/// Index 0 is a real entry in DWARF 5 tables; older tables hold `None` there.
fn source_file(unit: &UnitDies, index: u64) -> SourceFile
{
    match usize::try_from(index).ok().and_then(|slot| unit.files.get(slot)) {
        Some(Some(path)) => SourceFile::Path(unify_path(path)),
        Some(None) => SourceFile::None,
        None if index == 0 => SourceFile::None,
        None => SourceFile::Invalid,
    }
}

/// Forward slashes only.
fn unify_path(path: &str) -> String
{
    path.replace('\\', "/")
}

/// Whether a tag names a scope-like entry for declaration links. Scopes only
/// link to scopes and symbols only to symbols.
pub(crate) fn link_class(kind: ObjectKind, tag: Option<DwTag>, detail: &Detail) -> Option<bool>
{
    match kind {
        ObjectKind::Parameter | ObjectKind::Variable | ObjectKind::Member => Some(false),
        ObjectKind::Function
        | ObjectKind::Class
        | ObjectKind::Struct
        | ObjectKind::Union
        | ObjectKind::Enum
        | ObjectKind::Namespace
        | ObjectKind::Block
        | ObjectKind::CompileUnit => Some(true),
        ObjectKind::Alias if tag == Some(gimli::DW_TAG_template_alias) => Some(true),
        ObjectKind::TemplateParameter if matches!(detail, Detail::TemplateParameter(TemplateParam::Pack)) => Some(true),
        ObjectKind::Auxiliary => match detail {
            Detail::Aux(AuxForm::Array | AuxForm::Subroutine) => Some(true),
            Detail::Aux(AuxForm::SubroutineParameter) => Some(false),
            _ => None,
        },
        _ => None,
    }
}
