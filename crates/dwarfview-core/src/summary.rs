//! Object count summary table.

use std::fmt::Write as _;

use crate::model::{LogicalView, ObjectKind};
use crate::select::Selection;

const INDENT: usize = 5;
const LABEL_WIDTH: usize = 19;
const COLUMN_WIDTH: usize = 9;

/// One table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryRow
{
    pub kind: ObjectKind,
    pub total: usize,
    pub printed: usize,
}

/// Per-kind totals versus printed objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary
{
    rows: Vec<SummaryRow>,
}

impl Summary
{
    /// Counts for text output: printed means selected.
    pub fn from_selection(view: &LogicalView, selection: &Selection) -> Self
    {
        Self::build(view, |kind| selection.count(view, kind))
    }

    /// Counts for YAML output, which lists every object.
    pub fn all_printed(view: &LogicalView) -> Self
    {
        Self::build(view, |kind| view.count(kind))
    }

    fn build(view: &LogicalView, printed: impl Fn(ObjectKind) -> usize) -> Self
    {
        let rows = ObjectKind::SUMMARY
            .iter()
            .map(|&kind| SummaryRow {
                kind,
                total: view.count(kind),
                printed: printed(kind),
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[SummaryRow]
    {
        &self.rows
    }

    pub fn total(&self) -> usize
    {
        self.rows.iter().map(|row| row.total).sum()
    }

    pub fn printed(&self) -> usize
    {
        self.rows.iter().map(|row| row.printed).sum()
    }

    /// The table, with a leading and a trailing blank line.
    pub fn render(&self) -> String
    {
        let (total, printed) = (self.total(), self.printed());
        let label = self
            .rows
            .iter()
            .map(|row| row.kind.as_str().len() + 1)
            .max()
            .unwrap_or(0)
            .max(LABEL_WIDTH);
        let column = [total, printed]
            .iter()
            .map(|count| count.to_string().len() + 1)
            .max()
            .unwrap_or(0)
            .max(COLUMN_WIDTH);

        let indent = " ".repeat(INDENT);
        let divider = "-".repeat(label + 2 * column);
        let mut out = String::new();
        let _ = writeln!(out, "\n{indent}{divider}");
        let _ = writeln!(out, "{indent}{:<label$}{:>column$}{:>column$}", "Object", "Total", "Printed");
        let _ = writeln!(out, "{indent}{divider}");
        for row in &self.rows {
            let _ = writeln!(
                out,
                "{indent}{:<label$}{:>column$}{:>column$}",
                row.kind.as_str(),
                row.total,
                row.printed
            );
        }
        let _ = writeln!(out, "{indent}{divider}");
        let _ = writeln!(out, "{indent}{:<label$}{total:>column$}{printed:>column$}", "Totals");
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::model::LogicalObject;

    #[test]
    fn test_layout()
    {
        let mut view = LogicalView::new("a.o");
        let cu = view.insert(LogicalObject::new(ObjectKind::CompileUnit, 0xb), view.root());
        view.insert(LogicalObject::new(ObjectKind::Variable, 0x20), cu);

        let table = Summary::all_printed(&view).render();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "");
        assert_eq!(lines[1], format!("     {}", "-".repeat(37)));
        assert_eq!(lines[2], "     Object                 Total  Printed");
        assert_eq!(lines[8], "     CompileUnit                1        1");
        assert_eq!(lines[19], "     Variable                   1        1");
        assert_eq!(lines[21], "     Totals                     2        2");
        assert!(table.ends_with("\n\n"));
    }

    #[test]
    fn test_totals_are_row_sums()
    {
        let mut view = LogicalView::new("a.o");
        let cu = view.insert(LogicalObject::new(ObjectKind::CompileUnit, 0xb), view.root());
        for offset in 0..3 {
            view.insert(LogicalObject::new(ObjectKind::Function, 0x20 + offset), cu);
        }
        let selection = Selection::default();
        let summary = Summary::from_selection(&view, &selection);

        assert_eq!(summary.total(), 4);
        assert_eq!(summary.printed(), 0);
        assert!(summary.rows().iter().all(|row| row.total >= row.printed));
    }
}
