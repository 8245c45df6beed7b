//! Logical objects and their kind-specific details.

use std::path::Path;

use gimli::DwTag;

use super::kind::{AuxForm, ObjectKind};

/// Index of an object inside a [`super::LogicalView`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) usize);

impl ObjectId
{
    pub fn index(self) -> usize
    {
        self.0
    }
}

/// Where an object was declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SourceFile
{
    /// No `DW_AT_decl_file`, or file index 0.
    #[default]
    None,
    /// The file index was outside the unit's file table.
    Invalid,
    Path(String),
}

impl SourceFile
{
    pub fn is_none(&self) -> bool
    {
        matches!(self, SourceFile::None)
    }

    /// The file name as printed: the basename, or `?` for an invalid index.
    pub fn display_name(&self) -> Option<String>
    {
        match self {
            SourceFile::None => None,
            SourceFile::Invalid => Some("?".to_string()),
            SourceFile::Path(path) => {
                let base = Path::new(path)
                    .file_name()
                    .map_or_else(|| path.clone(), |name| name.to_string_lossy().into_owned());
                Some(if base.is_empty() { "?".to_string() } else { base })
            }
        }
    }
}

/// C++ access specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Access
{
    #[default]
    Unspecified,
    Public,
    Protected,
    Private,
}

impl Access
{
    pub fn from_dwarf(value: u64) -> Self
    {
        match value {
            1 => Access::Public,
            2 => Access::Protected,
            3 => Access::Private,
            _ => Access::Unspecified,
        }
    }

    /// Resolve an unspecified access: private inside a class, public elsewhere.
    pub fn effective(self, in_class: bool) -> &'static str
    {
        match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Private => "private",
            Access::Unspecified if in_class => "private",
            Access::Unspecified => "public",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FunctionInfo
{
    pub is_declaration: bool,
    pub is_static: bool,
    pub is_inline: bool,
    pub is_inlined: bool,
}

/// The flavor of a template parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateParam
{
    Type,
    /// A value parameter with its literal, if one was given.
    Value(Option<String>),
    /// A template template parameter naming a template.
    Template(Option<String>),
    /// `DW_TAG_GNU_template_parameter_pack`; members are its children.
    Pack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockForm
{
    Lexical,
    Try,
    Catch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineFlags
{
    pub address: u64,
    pub discriminator: u64,
    pub new_statement: bool,
    pub prologue_end: bool,
    pub end_sequence: bool,
    pub basic_block: bool,
    pub epilogue_begin: bool,
}

/// Kind-specific data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Detail
{
    #[default]
    None,
    Function(FunctionInfo),
    Enum
    {
        is_class: bool,
    },
    /// Members, and variables declared inside an aggregate.
    Member
    {
        access: Access,
        /// A static data member (`DW_AT_external` inside an aggregate).
        is_static: bool,
    },
    /// An unspecified-parameters entry (`...`).
    Variadic,
    TemplateParameter(TemplateParam),
    /// `true` for `DW_TAG_imported_module`.
    Using
    {
        module: bool,
    },
    Block(BlockForm),
    CodeLine(LineFlags),
    PrimitiveType
    {
        byte_size: u64,
    },
    /// Modifiers, arrays, subranges and subroutine types; a subrange keeps
    /// its rendered bounds (`[N]`) as its name.
    Aux(AuxForm),
    Enumerator
    {
        value: String,
    },
    Inheritance
    {
        access: Access,
    },
}

/// One node of the logical view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalObject
{
    pub kind: ObjectKind,
    /// DWARF offset (the line address for code lines).
    pub offset: u64,
    pub tag: Option<DwTag>,
    pub parent: Option<ObjectId>,
    pub children: Vec<ObjectId>,
    /// Code lines of a compile unit, in line-table order.
    pub lines: Vec<ObjectId>,
    pub name: String,
    /// Enclosing scope path including the trailing `::`, e.g. `A::B::`.
    pub qualifier: String,
    pub line: u64,
    pub file: SourceFile,
    /// Raw type reference (`DW_AT_type` / `DW_AT_import`).
    pub type_offset: Option<u64>,
    pub type_id: Option<ObjectId>,
    /// Raw declaration reference (specification / abstract origin / extension).
    pub reference_offset: Option<u64>,
    pub reference_id: Option<ObjectId>,
    pub is_generated: bool,
    pub is_global: bool,
    pub is_template: bool,
    pub level: usize,
    /// Index of the owning compile unit in input order.
    pub unit: usize,
    pub detail: Detail,
}

impl LogicalObject
{
    pub fn new(kind: ObjectKind, offset: u64) -> Self
    {
        Self {
            kind,
            offset,
            tag: None,
            parent: None,
            children: Vec::new(),
            lines: Vec::new(),
            name: String::new(),
            qualifier: String::new(),
            line: 0,
            file: SourceFile::None,
            type_offset: None,
            type_id: None,
            reference_offset: None,
            reference_id: None,
            is_generated: false,
            is_global: false,
            is_template: false,
            level: 0,
            unit: 0,
            detail: Detail::None,
        }
    }

    pub fn is_aux(&self) -> bool
    {
        self.kind == ObjectKind::Auxiliary
    }

    pub fn aux_form(&self) -> Option<AuxForm>
    {
        match self.detail {
            Detail::Aux(form) => Some(form),
            Detail::Enumerator { .. } => Some(AuxForm::Enumerator),
            Detail::Inheritance { .. } => Some(AuxForm::Inheritance),
            _ => None,
        }
    }

    pub fn function(&self) -> Option<&FunctionInfo>
    {
        match &self.detail {
            Detail::Function(info) => Some(info),
            _ => None,
        }
    }

    pub fn template_param(&self) -> Option<&TemplateParam>
    {
        match &self.detail {
            Detail::TemplateParameter(param) => Some(param),
            _ => None,
        }
    }

    pub fn is_variadic(&self) -> bool
    {
        matches!(self.detail, Detail::Variadic)
    }

    /// `qualifier + name`.
    pub fn qualified_name(&self) -> String
    {
        format!("{}{}", self.qualifier, self.name)
    }

    pub fn is_static(&self) -> bool
    {
        match &self.detail {
            Detail::Function(info) => info.is_static,
            Detail::Member { is_static, .. } => *is_static,
            _ => false,
        }
    }

    pub fn access(&self) -> Access
    {
        match self.detail {
            Detail::Member { access, .. } | Detail::Inheritance { access } => access,
            _ => Access::Unspecified,
        }
    }

    /// A `DW_TAG_GNU_template_parameter_pack`.
    pub fn is_pack(&self) -> bool
    {
        matches!(self.detail, Detail::TemplateParameter(TemplateParam::Pack))
    }
}
