//! Object kinds and their classification.

use std::fmt;

use gimli::DwTag;

/// The kind of a logical object.
///
/// Everything except [`ObjectKind::Auxiliary`] is a printable kind. Auxiliary
/// nodes are type-building entries (modifiers, arrays, enumerators, ...) that
/// exist so references can be resolved but are never printed or counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind
{
    InputFile,
    CompileUnit,
    Namespace,
    Class,
    Struct,
    Union,
    Enum,
    Alias,
    Function,
    Parameter,
    Variable,
    Member,
    TemplateParameter,
    Block,
    CodeLine,
    PrimitiveType,
    Using,
    Auxiliary,
}

impl ObjectKind
{
    /// Kinds shown in the summary table, alphabetically.
    pub const SUMMARY: [ObjectKind; 16] = [
        ObjectKind::Alias,
        ObjectKind::Block,
        ObjectKind::Class,
        ObjectKind::CodeLine,
        ObjectKind::CompileUnit,
        ObjectKind::Enum,
        ObjectKind::Function,
        ObjectKind::Member,
        ObjectKind::Namespace,
        ObjectKind::Parameter,
        ObjectKind::PrimitiveType,
        ObjectKind::Struct,
        ObjectKind::TemplateParameter,
        ObjectKind::Union,
        ObjectKind::Using,
        ObjectKind::Variable,
    ];

    /// The name used in `{Kind}` markers, YAML `object:` fields and the summary.
    pub const fn as_str(self) -> &'static str
    {
        match self {
            ObjectKind::InputFile => "InputFile",
            ObjectKind::CompileUnit => "CompileUnit",
            ObjectKind::Namespace => "Namespace",
            ObjectKind::Class => "Class",
            ObjectKind::Struct => "Struct",
            ObjectKind::Union => "Union",
            ObjectKind::Enum => "Enum",
            ObjectKind::Alias => "Alias",
            ObjectKind::Function => "Function",
            ObjectKind::Parameter => "Parameter",
            ObjectKind::Variable => "Variable",
            ObjectKind::Member => "Member",
            ObjectKind::TemplateParameter => "TemplateParameter",
            ObjectKind::Block => "Block",
            ObjectKind::CodeLine => "CodeLine",
            ObjectKind::PrimitiveType => "PrimitiveType",
            ObjectKind::Using => "Using",
            ObjectKind::Auxiliary => "Auxiliary",
        }
    }

    pub const fn is_aggregate(self) -> bool
    {
        matches!(self, ObjectKind::Class | ObjectKind::Struct | ObjectKind::Union)
    }

    /// Kinds that may carry template parameters.
    pub const fn can_be_template(self) -> bool
    {
        matches!(
            self,
            ObjectKind::Class | ObjectKind::Struct | ObjectKind::Union | ObjectKind::Function | ObjectKind::Alias
        )
    }

    pub const fn is_symbol(self) -> bool
    {
        matches!(self, ObjectKind::Parameter | ObjectKind::Variable | ObjectKind::Member)
    }

    /// Kinds that take their enclosing scope path as a qualifier when built.
    /// Symbols only get one through a declaration reference.
    pub const fn has_scope_prefix(self) -> bool
    {
        !self.is_symbol() && !matches!(self, ObjectKind::CodeLine | ObjectKind::InputFile | ObjectKind::CompileUnit)
    }
}

impl fmt::Display for ObjectKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.as_str())
    }
}

/// Type-building entries that are resolved but never printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxForm
{
    Const,
    Volatile,
    Restrict,
    Pointer,
    Reference,
    RvalueReference,
    PointerToMember,
    Unspecified,
    Array,
    Subrange,
    Subroutine,
    /// A formal parameter of a subroutine type.
    SubroutineParameter,
    Enumerator,
    Inheritance,
}

/// How the builder treats a DWARF tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagClass
{
    Object(ObjectKind),
    Aux(AuxForm),
    Unknown,
}

/// Map a DWARF tag onto the model.
pub fn classify_tag(tag: DwTag) -> TagClass
{
    use gimli::*;

    match tag {
        DW_TAG_base_type => TagClass::Object(ObjectKind::PrimitiveType),
        DW_TAG_class_type => TagClass::Object(ObjectKind::Class),
        DW_TAG_structure_type => TagClass::Object(ObjectKind::Struct),
        DW_TAG_union_type => TagClass::Object(ObjectKind::Union),
        DW_TAG_enumeration_type => TagClass::Object(ObjectKind::Enum),
        DW_TAG_typedef | DW_TAG_template_alias => TagClass::Object(ObjectKind::Alias),
        DW_TAG_subprogram | DW_TAG_inlined_subroutine | DW_TAG_entry_point | DW_TAG_label => {
            TagClass::Object(ObjectKind::Function)
        }
        DW_TAG_formal_parameter | DW_TAG_unspecified_parameters => TagClass::Object(ObjectKind::Parameter),
        DW_TAG_variable => TagClass::Object(ObjectKind::Variable),
        DW_TAG_member => TagClass::Object(ObjectKind::Member),
        DW_TAG_template_type_parameter
        | DW_TAG_template_value_parameter
        | DW_TAG_GNU_template_template_param
        | DW_TAG_GNU_template_parameter_pack => TagClass::Object(ObjectKind::TemplateParameter),
        DW_TAG_lexical_block | DW_TAG_try_block | DW_TAG_catch_block => TagClass::Object(ObjectKind::Block),
        DW_TAG_imported_module | DW_TAG_imported_declaration => TagClass::Object(ObjectKind::Using),
        DW_TAG_namespace => TagClass::Object(ObjectKind::Namespace),
        DW_TAG_compile_unit => TagClass::Object(ObjectKind::CompileUnit),
        DW_TAG_const_type => TagClass::Aux(AuxForm::Const),
        DW_TAG_volatile_type => TagClass::Aux(AuxForm::Volatile),
        DW_TAG_restrict_type => TagClass::Aux(AuxForm::Restrict),
        DW_TAG_pointer_type => TagClass::Aux(AuxForm::Pointer),
        DW_TAG_reference_type => TagClass::Aux(AuxForm::Reference),
        DW_TAG_rvalue_reference_type => TagClass::Aux(AuxForm::RvalueReference),
        DW_TAG_ptr_to_member_type => TagClass::Aux(AuxForm::PointerToMember),
        DW_TAG_unspecified_type => TagClass::Aux(AuxForm::Unspecified),
        DW_TAG_array_type => TagClass::Aux(AuxForm::Array),
        DW_TAG_subrange_type => TagClass::Aux(AuxForm::Subrange),
        DW_TAG_subroutine_type => TagClass::Aux(AuxForm::Subroutine),
        DW_TAG_enumerator => TagClass::Aux(AuxForm::Enumerator),
        DW_TAG_inheritance => TagClass::Aux(AuxForm::Inheritance),
        _ => TagClass::Unknown,
    }
}
