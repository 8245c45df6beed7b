//! # DIE Adapter
//!
//! The minimal debug-information-entry abstraction the builder consumes.
//!
//! A [`DieSource`] delivers one [`UnitDies`] per compile unit: the unit's
//! DIEs in pre-order, its file table and its line-table rows. All references
//! are absolute `.debug_info` offsets, so every cross-reference in the input
//! joins on a single key regardless of which unit it points into.
//!
//! [`crate::reader::ElfDwarfSource`] implements the trait over real object
//! files. In-memory sources are plain `Vec<UnitDies>` values, which is how the
//! test suites drive the pipeline.
//!
//! ## Example
//!
//! ```rust
//! use dwarfview_core::die::{Die, UnitDies};
//! use gimli::{DW_TAG_base_type, DW_TAG_compile_unit};
//!
//! let mut unit = UnitDies::new();
//! unit.push(Die::new(0xb, DW_TAG_compile_unit, None).name("a.cpp"));
//! unit.push(Die::new(0x2a, DW_TAG_base_type, Some(0xb)).name("int").unsigned(gimli::DW_AT_byte_size, 4));
//! assert_eq!(unit.dies.len(), 2);
//! ```

use gimli::{DwAt, DwForm, DwTag};

use crate::error::Result;

/// A typed attribute value, independent of the encoding form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue
{
    String(String),
    Unsigned(u64),
    Signed(i64),
    Flag(bool),
    /// Absolute `.debug_info` offset of the referenced DIE.
    Reference(u64),
    /// A DWARF expression; only its presence matters here.
    Exprloc,
    Block,
    /// A form the adapter does not decode.
    Unsupported,
}

/// One attribute of a DIE.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DieAttr
{
    pub name: DwAt,
    pub form: DwForm,
    pub value: AttrValue,
}

/// A debug information entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Die
{
    /// Absolute `.debug_info` offset; unique across the input.
    pub offset: u64,
    pub tag: DwTag,
    /// Offset of the parent DIE, `None` for a unit's root entry.
    pub parent: Option<u64>,
    pub attrs: Vec<DieAttr>,
}

impl Die
{
    pub fn new(offset: u64, tag: DwTag, parent: Option<u64>) -> Self
    {
        Self {
            offset,
            tag,
            parent,
            attrs: Vec::new(),
        }
    }

    /// First attribute with the given name.
    pub fn attr(&self, name: DwAt) -> Option<&DieAttr>
    {
        self.attrs.iter().find(|attr| attr.name == name)
    }

    pub fn has_attr(&self, name: DwAt) -> bool
    {
        self.attr(name).is_some()
    }

    /// Append an attribute (builder style).
    #[must_use]
    pub fn with(mut self, name: DwAt, form: DwForm, value: AttrValue) -> Self
    {
        self.attrs.push(DieAttr { name, form, value });
        self
    }

    /// `DW_AT_name` as an inline string.
    #[must_use]
    pub fn name(self, name: &str) -> Self
    {
        self.with(gimli::DW_AT_name, gimli::DW_FORM_string, AttrValue::String(name.to_string()))
    }

    /// `DW_AT_decl_file` and `DW_AT_decl_line`.
    #[must_use]
    pub fn decl(self, file: u64, line: u64) -> Self
    {
        self.unsigned(gimli::DW_AT_decl_file, file).unsigned(gimli::DW_AT_decl_line, line)
    }

    /// A `DW_FORM_udata` constant.
    #[must_use]
    pub fn unsigned(self, name: DwAt, value: u64) -> Self
    {
        self.with(name, gimli::DW_FORM_udata, AttrValue::Unsigned(value))
    }

    /// A `DW_FORM_sdata` constant.
    #[must_use]
    pub fn signed(self, name: DwAt, value: i64) -> Self
    {
        self.with(name, gimli::DW_FORM_sdata, AttrValue::Signed(value))
    }

    /// A `DW_FORM_flag_present` attribute.
    #[must_use]
    pub fn flag(self, name: DwAt) -> Self
    {
        self.with(name, gimli::DW_FORM_flag_present, AttrValue::Flag(true))
    }

    /// A `DW_FORM_ref4` reference to an absolute offset.
    #[must_use]
    pub fn reference(self, name: DwAt, offset: u64) -> Self
    {
        self.with(name, gimli::DW_FORM_ref4, AttrValue::Reference(offset))
    }

    /// `DW_AT_type` shorthand.
    #[must_use]
    pub fn type_ref(self, offset: u64) -> Self
    {
        self.reference(gimli::DW_AT_type, offset)
    }
}

/// One row of a unit's line-number program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineRow
{
    pub line: u64,
    pub address: u64,
    /// Index into [`UnitDies::files`].
    pub file: u64,
    pub discriminator: u64,
    pub is_stmt: bool,
    pub basic_block: bool,
    pub end_sequence: bool,
    pub prologue_end: bool,
    pub epilogue_begin: bool,
}

/// Everything the builder needs from one compile unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitDies
{
    /// File table indexed by `DW_AT_decl_file`; `None` entries mean "no file".
    pub files: Vec<Option<String>>,
    /// DIEs in pre-order.
    pub dies: Vec<Die>,
    pub lines: Vec<LineRow>,
}

impl UnitDies
{
    /// An empty unit with a pre-DWARF 5 file table (index 0 is "no file").
    pub fn new() -> Self
    {
        Self {
            files: vec![None],
            ..Self::default()
        }
    }

    pub fn push(&mut self, die: Die)
    {
        self.dies.push(die);
    }

    /// Append a file and return its index.
    pub fn add_file(&mut self, path: &str) -> u64
    {
        self.files.push(Some(path.to_string()));
        (self.files.len() - 1) as u64
    }
}

/// Supplies compile units to the builder.
pub trait DieSource
{
    /// Read every compile unit in input order.
    ///
    /// ## Errors
    ///
    /// Fatal input errors (missing file, unsupported format, malformed DWARF).
    fn read_units(&self) -> Result<Vec<UnitDies>>;
}

impl DieSource for [UnitDies]
{
    fn read_units(&self) -> Result<Vec<UnitDies>>
    {
        Ok(self.to_vec())
    }
}

impl DieSource for Vec<UnitDies>
{
    fn read_units(&self) -> Result<Vec<UnitDies>>
    {
        Ok(self.clone())
    }
}
