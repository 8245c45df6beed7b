//! Tests for the logical view pipeline driven by synthetic DIE streams

use dwarfview_core::builder::build;
use dwarfview_core::die::{Die, UnitDies};
use dwarfview_core::select::Selection;
use dwarfview_core::settings::{ShowAction, ShowOption, SortKey, ViewSettings};
use dwarfview_core::sort::sort_view;
use dwarfview_core::summary::Summary;
use dwarfview_core::{process, ObjectKind};
use gimli::{
    DW_AT_accessibility, DW_AT_byte_size, DW_AT_external, DW_TAG_base_type, DW_TAG_class_type, DW_TAG_compile_unit,
    DW_TAG_formal_parameter, DW_TAG_member, DW_TAG_structure_type, DW_TAG_subprogram, DW_TAG_typedef,
    DW_TAG_variable,
};

fn unit_with_file(name: &str) -> UnitDies
{
    let mut unit = UnitDies::new();
    unit.add_file(name);
    unit.push(Die::new(0xb, DW_TAG_compile_unit, None).name(name));
    unit
}

fn base_type(offset: u64, name: &str, size: u64) -> Die
{
    Die::new(offset, DW_TAG_base_type, Some(0xb))
        .name(name)
        .unsigned(DW_AT_byte_size, size)
}

/// `int foo(char c) { int x; }` on lines 10 and 11, with external linkage.
fn function_unit() -> UnitDies
{
    let mut unit = unit_with_file("a.cpp");
    unit.push(
        Die::new(0x20, DW_TAG_subprogram, Some(0xb))
            .name("foo")
            .decl(1, 10)
            .type_ref(0x40)
            .flag(DW_AT_external),
    );
    unit.push(Die::new(0x28, DW_TAG_formal_parameter, Some(0x20)).name("c").decl(1, 10).type_ref(0x48));
    unit.push(Die::new(0x30, DW_TAG_variable, Some(0x20)).name("x").decl(1, 11).type_ref(0x40));
    unit.push(base_type(0x40, "int", 4));
    unit.push(base_type(0x48, "char", 1));
    unit
}

#[test]
fn test_function_with_parameter_and_local()
{
    let report = process(&vec![function_unit()], "a.o", &ViewSettings::default()).unwrap();
    let expected = "\
{InputFile} \"a.o\"
    {CompileUnit} \"a.cpp\"

{Source} \"a.cpp\"
10    {Function} \"foo\" -> \"int\"
          - No declaration
10      {Parameter} \"c\" -> \"char\"
11      {Variable} \"x\" -> \"int\"
";
    assert!(report.warnings.is_empty());
    assert_eq!(report.output, expected);
}

#[test]
fn test_show_none_then_show_member()
{
    let mut unit = unit_with_file("s.cpp");
    unit.push(Die::new(0x20, DW_TAG_structure_type, Some(0xb)).name("S").decl(1, 1));
    unit.push(
        Die::new(0x28, DW_TAG_member, Some(0x20))
            .name("a")
            .decl(1, 2)
            .type_ref(0x40)
            .unsigned(DW_AT_accessibility, 3),
    );
    unit.push(
        Die::new(0x30, DW_TAG_member, Some(0x20))
            .name("b")
            .decl(1, 3)
            .type_ref(0x40)
            .unsigned(DW_AT_accessibility, 3),
    );
    unit.push(base_type(0x40, "int", 4));

    let mut settings = ViewSettings::default();
    settings.apply(ShowAction::None);
    settings.apply(ShowAction::Set(ShowOption::Member, true));

    let output = process(&vec![unit], "s.o", &settings).unwrap().output;
    let members: Vec<&str> = output.lines().filter(|line| line.contains("{Member}")).collect();
    assert_eq!(members.len(), 2);
    assert!(members.iter().all(|line| line.contains("{Member} private")));
    assert!(!output.contains("{Struct}"));
    assert!(!output.contains("{Class}"));
}

fn sorted_children(key: SortKey) -> Vec<String>
{
    let mut unit = unit_with_file("order.cpp");
    unit.push(Die::new(0x20, DW_TAG_variable, Some(0xb)).name("mid").decl(1, 3));
    unit.push(Die::new(0x30, DW_TAG_typedef, Some(0xb)).name("alpha").decl(1, 2));
    unit.push(Die::new(0x40, DW_TAG_class_type, Some(0xb)).name("zed").decl(1, 1));
    unit.push(Die::new(0x50, DW_TAG_subprogram, Some(0xb)).name("beta").decl(1, 4));

    let mut view = build("order.o", &[unit], &ViewSettings::default()).view;
    sort_view(&mut view, key);
    let cu = view.compile_units()[0];
    view.children(cu).map(|id| view.get(id).name.clone()).collect()
}

#[test]
fn test_three_sort_orders_differ()
{
    let by_line = sorted_children(SortKey::Line);
    let by_name = sorted_children(SortKey::Name);
    let by_offset = sorted_children(SortKey::Offset);

    assert_eq!(by_line, ["zed", "alpha", "mid", "beta"]);
    assert_eq!(by_name, ["alpha", "beta", "mid", "zed"]);
    assert_eq!(by_offset, ["mid", "alpha", "zed", "beta"]);

    // Re-sorting is stable.
    assert_eq!(sorted_children(SortKey::Name), by_name);
}

#[test]
fn test_unknown_tag_leaves_other_objects_alone()
{
    let clean = process(&vec![function_unit()], "a.o", &ViewSettings::default()).unwrap();

    let mut unit = function_unit();
    unit.push(Die::new(0x60, gimli::DW_TAG_call_site, Some(0x20)));
    let noisy = process(&vec![unit], "a.o", &ViewSettings::default()).unwrap();

    assert_eq!(noisy.warnings, ["Ignoring unknown/unsupported DWARF tag 'DW_TAG_call_site'."]);
    assert_eq!(noisy.output, clean.output);
}

#[test]
fn test_summary_totals_bound_printed()
{
    let mut settings = ViewSettings::default();
    settings.apply(ShowAction::All);
    let mut view = build("a.o", &[function_unit()], &settings).view;
    sort_view(&mut view, settings.sort);

    for show in [ShowAction::All, ShowAction::Brief, ShowAction::None] {
        settings.apply(show);
        let selection = Selection::select(&view, &settings);
        let summary = Summary::from_selection(&view, &selection);
        assert!(summary.rows().iter().all(|row| row.total >= row.printed));
        assert_eq!(summary.total(), summary.rows().iter().map(|row| row.total).sum::<usize>());
        assert_eq!(summary.printed(), summary.rows().iter().map(|row| row.printed).sum::<usize>());
    }
}

#[test]
fn test_references_resolve_to_their_offsets()
{
    let mut unit = function_unit();
    unit.push(Die::new(0x70, DW_TAG_variable, Some(0xb)).name("dangling").type_ref(0x999));
    let view = build("a.o", &[unit], &ViewSettings::default()).view;

    for object in view.objects() {
        if let (Some(offset), Some(id)) = (object.type_offset, object.type_id) {
            assert_eq!(view.get(id).offset, offset);
        }
    }
    let dangling = view.get(view.find(0x70).unwrap());
    assert_eq!(dangling.type_offset, Some(0x999));
    assert!(dangling.type_id.is_none());
    assert_eq!(view.count(ObjectKind::PrimitiveType), 2);
}
