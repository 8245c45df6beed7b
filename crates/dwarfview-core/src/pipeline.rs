//! # Per-File Pipeline
//!
//! Runs one input file through every stage in order: read, build, sort,
//! select, render, and either collect the rendering for stdout or write
//! split files.
//!
//! Nothing is printed here. The caller gets a [`FileReport`] and decides where
//! warnings and output go, which keeps warnings ahead of the tree and lets a
//! fatal error suppress all output for the file.
//!
//! ## Example
//!
//! ```rust
//! use dwarfview_core::die::{Die, UnitDies};
//! use dwarfview_core::pipeline::process;
//! use dwarfview_core::settings::ViewSettings;
//!
//! let mut unit = UnitDies::new();
//! unit.push(Die::new(0xb, gimli::DW_TAG_compile_unit, None).name("a.cpp"));
//!
//! let report = process(&vec![unit], "a.o", &ViewSettings::default()).unwrap();
//! assert!(report.output.contains("{CompileUnit} \"a.cpp\""));
//! ```

use std::path::PathBuf;

use tracing::{debug, info};

use crate::builder::build;
use crate::die::DieSource;
use crate::error::Result;
use crate::model::LogicalView;
use crate::render::{render_text, render_yaml};
use crate::select::Selection;
use crate::settings::{OutputFormat, ViewSettings};
use crate::sort::sort_view;
use crate::split::{split_dir, write_split};
use crate::summary::Summary;

/// Everything one input file produced.
#[derive(Debug, Clone, Default)]
pub struct FileReport
{
    /// Data anomalies, in the order they were found.
    pub warnings: Vec<String>,
    /// What belongs on stdout: renderings (unless split or quiet) and the
    /// summary table when requested.
    pub output: String,
    /// Files written in split mode.
    pub split_files: Vec<PathBuf>,
}

/// Run `source` through the whole pipeline.
///
/// `input` names the file in the `{InputFile}` header and the YAML
/// `input_file` field.
///
/// ## Errors
///
/// Fatal input errors from `source`, and split output failures.
pub fn process<S>(source: &S, input: &str, settings: &ViewSettings) -> Result<FileReport>
where
    S: DieSource + ?Sized,
{
    let units = source.read_units()?;
    let built = build(input, &units, settings);
    let mut view = built.view;
    sort_view(&mut view, settings.sort);

    let mut report = FileReport {
        warnings: built.diagnostics.warnings().to_vec(),
        ..FileReport::default()
    };

    let selection = Selection::select(&view, settings);
    debug!(input, objects = view.len(), selected = selection.entries().len(), "selection complete");

    if settings.split {
        let dir = split_dir(&view, settings);
        for &format in &settings.outputs {
            report.split_files.extend(write_split(&view, settings, format, &dir)?);
        }
    } else if !settings.quiet {
        report.output = render_all(&view, &selection, settings);
    }

    if settings.summary {
        let summary = if settings.wants(OutputFormat::Yaml) {
            Summary::all_printed(&view)
        } else {
            Summary::from_selection(&view, &selection)
        };
        report.output.push_str(&summary.render());
    }

    info!(input, warnings = report.warnings.len(), "input processed");
    Ok(report)
}

fn render_all(view: &LogicalView, selection: &Selection, settings: &ViewSettings) -> String
{
    let mut out = String::new();
    for format in &settings.outputs {
        match format {
            OutputFormat::Text => out.push_str(&render_text(view, selection, settings)),
            OutputFormat::Yaml => out.push_str(&render_yaml(view)),
        }
    }
    out
}
