//! ELF/DWARF reader.
//!
//! Loads an object file with `object`, hands the debug sections to `gimli`
//! and flattens every compile unit into a [`UnitDies`].
//!
//! Relocatable objects keep their cross-section offsets (string pool, line
//! programs, `ref_addr`) in relocation addends, so every section is read
//! through its relocation map.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use gimli::{AttributeValue, Dwarf, EndianArcSlice, Reader as _, RelocateReader, RunTimeEndian, SectionId, Unit};
use object::{Object, ObjectSection};
use tracing::{debug, trace, warn};

use crate::die::{AttrValue, Die, DieAttr, DieSource, LineRow, UnitDies};
use crate::error::{map_dwarf_error, Result, ViewError};

type OwnedReader = RelocateReader<EndianArcSlice<RunTimeEndian>, SectionRelocations>;
type OwnedDwarf = Dwarf<OwnedReader>;

const ELF_MAGIC: &[u8; 4] = b"\x7fELF";

/// Relocations of one debug section, keyed by offset within the section.
#[derive(Debug, Clone, Default)]
struct SectionRelocations(Arc<object::read::RelocationMap>);

impl SectionRelocations
{
    fn load(file: &object::File<'_>, section: &object::Section<'_, '_>) -> Self
    {
        let mut map = object::read::RelocationMap::default();
        for (offset, relocation) in section.relocations() {
            if let Err(err) = map.add(file, offset, relocation) {
                warn!(
                    section = section.name().unwrap_or("?"),
                    offset = format_args!("{offset:#010x}"),
                    error = %err,
                    "skipping relocation"
                );
            }
        }
        Self(Arc::new(map))
    }
}

impl gimli::Relocate for SectionRelocations
{
    fn relocate_address(&self, offset: usize, value: u64) -> gimli::Result<u64>
    {
        Ok(self.0.relocate(offset as u64, value))
    }

    fn relocate_offset(&self, offset: usize, value: usize) -> gimli::Result<usize>
    {
        <usize as gimli::ReaderOffset>::from_u64(self.0.relocate(offset as u64, value as u64))
    }
}

/// Reads DIEs from an ELF object file.
#[derive(Debug, Clone)]
pub struct ElfDwarfSource
{
    path: PathBuf,
}

impl ElfDwarfSource
{
    pub fn new(path: impl Into<PathBuf>) -> Self
    {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path
    {
        &self.path
    }

    fn display_path(&self) -> String
    {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Arc<[u8]>>
    {
        let bytes = fs::read(&self.path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => ViewError::FileNotFound {
                path: self.display_path(),
            },
            _ => ViewError::ReadFailed {
                path: self.display_path(),
                source,
            },
        })?;

        if !bytes.starts_with(ELF_MAGIC) {
            return Err(ViewError::InvalidFile {
                path: self.display_path(),
            });
        }
        Ok(Arc::from(bytes))
    }

    fn invalid_dwarf(&self, details: String) -> ViewError
    {
        ViewError::InvalidDwarf {
            path: self.display_path(),
            details,
        }
    }

    fn dwarf(&self, data: &[u8]) -> Result<OwnedDwarf>
    {
        let file = object::File::parse(data).map_err(|err| self.invalid_dwarf(format!("parsing object: {err}")))?;

        let endian = if file.is_little_endian() {
            RunTimeEndian::Little
        } else {
            RunTimeEndian::Big
        };

        let mut sections: HashMap<SectionId, (Arc<[u8]>, SectionRelocations)> = HashMap::new();
        for id in DWARF_SECTIONS {
            if let Some(section) = file.section_by_name(id.name()) {
                let data = section
                    .uncompressed_data()
                    .map_err(|err| self.invalid_dwarf(format!("reading {}: {err}", id.name())))?;
                let data = match data {
                    Cow::Borrowed(bytes) => Arc::<[u8]>::from(bytes.to_vec()),
                    Cow::Owned(vec) => vec.into(),
                };
                sections.insert(*id, (data, SectionRelocations::load(&file, &section)));
            }
        }

        Dwarf::load(|id| {
            let (data, relocations) = sections
                .get(&id)
                .cloned()
                .unwrap_or_else(|| (Arc::from(Vec::new()), SectionRelocations::default()));
            Ok::<_, gimli::Error>(RelocateReader::new(EndianArcSlice::new(data, endian), relocations))
        })
        .map_err(|err| map_dwarf_error(&self.display_path(), "loading DWARF sections", err))
    }
}

const DWARF_SECTIONS: &[SectionId] = &[
    SectionId::DebugAbbrev,
    SectionId::DebugAddr,
    SectionId::DebugInfo,
    SectionId::DebugLine,
    SectionId::DebugLineStr,
    SectionId::DebugRanges,
    SectionId::DebugRngLists,
    SectionId::DebugStr,
    SectionId::DebugStrOffsets,
    SectionId::DebugLoc,
    SectionId::DebugLocLists,
];

impl DieSource for ElfDwarfSource
{
    fn read_units(&self) -> Result<Vec<UnitDies>>
    {
        let data = self.load()?;
        let dwarf = self.dwarf(&data)?;
        let path = self.display_path();

        let mut units = Vec::new();
        let mut headers = dwarf.units();
        while let Some(header) = headers
            .next()
            .map_err(|err| map_dwarf_error(&path, "reading .debug_info unit header", err))?
        {
            let unit = dwarf
                .unit(header)
                .map_err(|err| map_dwarf_error(&path, "parsing compilation unit", err))?;
            units.push(UnitExtractor::new(&dwarf, &unit, &path).extract()?);
        }

        debug!(path = %path, units = units.len(), "read DWARF units");
        Ok(units)
    }
}

/// Flattens one gimli unit.
struct UnitExtractor<'a>
{
    dwarf: &'a OwnedDwarf,
    unit: &'a Unit<OwnedReader>,
    path: &'a str,
}

impl<'a> UnitExtractor<'a>
{
    fn new(dwarf: &'a OwnedDwarf, unit: &'a Unit<OwnedReader>, path: &'a str) -> Self
    {
        Self { dwarf, unit, path }
    }

    fn extract(&self) -> Result<UnitDies>
    {
        let start = self
            .unit
            .header
            .offset()
            .as_debug_info_offset()
            .map_or(0, |offset| offset.0 as u64);

        let mut unit_dies = UnitDies::default();
        self.read_lines(&mut unit_dies)?;
        self.read_dies(&mut unit_dies)?;

        trace!(
            offset = start,
            dies = unit_dies.dies.len(),
            rows = unit_dies.lines.len(),
            "extracted unit"
        );
        Ok(unit_dies)
    }

    fn read_dies(&self, out: &mut UnitDies) -> Result<()>
    {
        let mut cursor = self.unit.entries();
        let mut stack: Vec<u64> = Vec::new();
        let mut depth: isize = 0;

        while let Some((delta, entry)) = cursor
            .next_dfs()
            .map_err(|err| map_dwarf_error(self.path, "traversing DIE tree", err))?
        {
            depth += delta;
            stack.truncate(depth.max(0) as usize);

            let offset = entry
                .offset()
                .to_debug_info_offset(&self.unit.header)
                .map_or(0, |offset| offset.0 as u64);
            let parent = stack.last().copied();

            let forms: Vec<gimli::DwForm> = self
                .unit
                .abbreviations
                .get(entry.code())
                .map(|abbrev| abbrev.attributes().iter().map(|spec| spec.form()).collect())
                .unwrap_or_default();

            let mut die = Die::new(offset, entry.tag(), parent);
            let mut attrs = entry.attrs();
            let mut index = 0;
            while let Some(attr) = attrs
                .next()
                .map_err(|err| map_dwarf_error(self.path, "reading DIE attributes", err))?
            {
                let form = forms.get(index).copied().unwrap_or(gimli::DwForm(0));
                index += 1;
                die.attrs.push(DieAttr {
                    name: attr.name(),
                    form,
                    value: self.convert(attr.value())?,
                });
            }

            out.dies.push(die);
            stack.push(offset);
        }

        Ok(())
    }

    fn convert(&self, value: AttributeValue<OwnedReader>) -> Result<AttrValue>
    {
        let converted = match value {
            AttributeValue::String(_)
            | AttributeValue::DebugStrRef(_)
            | AttributeValue::DebugStrRefSup(_)
            | AttributeValue::DebugLineStrRef(_)
            | AttributeValue::DebugStrOffsetsIndex(_) => AttrValue::String(self.string(value)?),
            AttributeValue::Data1(v) => AttrValue::Unsigned(u64::from(v)),
            AttributeValue::Data2(v) => AttrValue::Unsigned(u64::from(v)),
            AttributeValue::Data4(v) => AttrValue::Unsigned(u64::from(v)),
            AttributeValue::Data8(v) | AttributeValue::Udata(v) | AttributeValue::FileIndex(v) => {
                AttrValue::Unsigned(v)
            }
            AttributeValue::Sdata(v) => AttrValue::Signed(v),
            AttributeValue::Flag(v) => AttrValue::Flag(v),
            AttributeValue::Accessibility(v) => AttrValue::Unsigned(u64::from(v.0)),
            AttributeValue::Inline(v) => AttrValue::Unsigned(u64::from(v.0)),
            AttributeValue::Language(v) => AttrValue::Unsigned(u64::from(v.0)),
            AttributeValue::Encoding(v) => AttrValue::Unsigned(u64::from(v.0)),
            AttributeValue::Virtuality(v) => AttrValue::Unsigned(u64::from(v.0)),
            AttributeValue::Visibility(v) => AttrValue::Unsigned(u64::from(v.0)),
            AttributeValue::CallingConvention(v) => AttrValue::Unsigned(u64::from(v.0)),
            AttributeValue::UnitRef(offset) => match offset.to_debug_info_offset(&self.unit.header) {
                Some(absolute) => AttrValue::Reference(absolute.0 as u64),
                None => AttrValue::Unsupported,
            },
            AttributeValue::DebugInfoRef(offset) => AttrValue::Reference(offset.0 as u64),
            AttributeValue::Exprloc(_) => AttrValue::Exprloc,
            AttributeValue::Block(_) => AttrValue::Block,
            _ => AttrValue::Unsupported,
        };
        Ok(converted)
    }

    fn string(&self, value: AttributeValue<OwnedReader>) -> Result<String>
    {
        let reader = self
            .dwarf
            .attr_string(self.unit, value)
            .map_err(|err| map_dwarf_error(self.path, "resolving DWARF string", err))?;
        let owned = reader
            .to_string_lossy()
            .map_err(|err| map_dwarf_error(self.path, "decoding DWARF string", err))?
            .into_owned();
        Ok(owned)
    }

    fn read_lines(&self, out: &mut UnitDies) -> Result<()>
    {
        let Some(program) = self.unit.line_program.clone() else {
            out.files = vec![None];
            return Ok(());
        };

        let header = program.header();
        // Before DWARF 5 file numbering starts at 1; index 0 means "no file".
        let mut files = if header.version() < 5 { vec![None] } else { Vec::new() };
        for file in header.file_names() {
            files.push(Some(self.string(file.path_name())?));
        }
        out.files = files;

        let mut rows = program.rows();
        while let Some((_, row)) = rows
            .next_row()
            .map_err(|err| map_dwarf_error(self.path, "running line program", err))?
        {
            out.lines.push(LineRow {
                line: row.line().map_or(0, |line| line.get()),
                address: row.address(),
                file: row.file_index(),
                discriminator: row.discriminator(),
                is_stmt: row.is_stmt(),
                basic_block: row.basic_block(),
                end_sequence: row.end_sequence(),
                prologue_end: row.prologue_end(),
                epilogue_begin: row.epilogue_begin(),
            });
        }
        Ok(())
    }
}
