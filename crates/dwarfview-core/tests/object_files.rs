//! Tests for reading relocatable objects produced by gcc
//!
//! `tests/data/scale.c` is compiled with
//! `gcc -g -gdwarf-N -O0 -fno-asynchronous-unwind-tables -fdebug-prefix-map=$PWD=/src -c`.
//! Both objects keep their string-pool and line-program offsets in
//! relocation addends.

use std::path::PathBuf;

use dwarfview_core::die::{AttrValue, DieSource};
use dwarfview_core::settings::ViewSettings;
use dwarfview_core::{process, ElfDwarfSource};

/// The default view, after the `{InputFile}` header line.
const EXPECTED_TEXT: &str = "    {CompileUnit} \"scale.c\"

{Source} \"scale.c\"
 1    {Variable} \"counter\" -> \"int\"
 3    {Function} static \"scale\" -> \"int\"
          - No declaration
 3      {Parameter} \"value\" -> \"int\"
 5      {Variable} \"factor\" -> \"int\"
 9    {Function} \"accumulate\" -> \"int\"
          - No declaration
 9      {Parameter} \"amount\" -> \"int\"
";

fn fixture(name: &str) -> ElfDwarfSource
{
    ElfDwarfSource::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name))
}

fn names(source: &ElfDwarfSource) -> Vec<String>
{
    let units = source.read_units().unwrap();
    assert_eq!(units.len(), 1);
    units[0]
        .dies
        .iter()
        .filter_map(|die| match die.attr(gimli::DW_AT_name).map(|attr| &attr.value) {
            Some(AttrValue::String(name)) => Some(name.clone()),
            _ => None,
        })
        .collect()
}

fn check_names(object: &str)
{
    assert_eq!(
        names(&fixture(object)),
        ["scale.c", "counter", "int", "accumulate", "amount", "scale", "value", "factor"]
    );
}

fn check_text(object: &str)
{
    let report = process(&fixture(object), object, &ViewSettings::default()).unwrap();
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(report.output, format!("{{InputFile}} \"{object}\"\n{EXPECTED_TEXT}"));
}

#[test]
fn test_dwarf4_strings_are_relocated()
{
    check_names("scale-dwarf4.o");
}

#[test]
fn test_dwarf5_strings_are_relocated()
{
    check_names("scale-dwarf5.o");
}

#[test]
fn test_dwarf4_default_view()
{
    check_text("scale-dwarf4.o");
}

#[test]
fn test_dwarf5_default_view()
{
    check_text("scale-dwarf5.o");
}

#[test]
fn test_dwarf5_file_table_starts_at_zero()
{
    let units = fixture("scale-dwarf5.o").read_units().unwrap();
    let files = &units[0].files;
    assert_eq!(files[0].as_deref(), Some("scale.c"));
    assert_eq!(files[1].as_deref(), Some("scale.c"));

    let units = fixture("scale-dwarf4.o").read_units().unwrap();
    assert_eq!(units[0].files, [None, Some("scale.c".to_string())]);
}

#[test]
fn test_line_rows_come_from_the_relocated_program()
{
    let units = fixture("scale-dwarf5.o").read_units().unwrap();
    let lines: Vec<u64> = units[0].lines.iter().map(|row| row.line).collect();
    assert_eq!(lines.first(), Some(&4));
    assert_eq!(lines.iter().max(), Some(&13));
    assert!(units[0].lines.last().is_some_and(|row| row.end_sequence));
}
