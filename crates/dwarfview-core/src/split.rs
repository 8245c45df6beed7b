//! # Split Output
//!
//! Writes one file per compile unit instead of a single stream. Each file
//! starts with the format's header; the object content of all files, in
//! order, is exactly the object content of the unsplit output.
//!
//! ## Errors
//!
//! - [`ViewError::MakeDirFailure`] when the directory cannot be created
//! - [`ViewError::SplitOpenFailure`] when a file cannot be written; files
//!   written before it are left in place

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, ViewError};
use crate::model::LogicalView;
use crate::render::{TextRenderer, YamlRenderer};
use crate::select::Selection;
use crate::settings::{OutputFormat, ViewSettings};

/// Replace path separators and dots so a name can be used as a file name.
pub fn flatten_path(path: &str) -> String
{
    path.chars()
        .map(|c| if matches!(c, '.' | '/' | '\\') { '_' } else { c })
        .collect()
}

/// The split directory: the configured one, else the flattened input name.
pub fn split_dir(view: &LogicalView, settings: &ViewSettings) -> PathBuf
{
    settings
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(flatten_path(view.input_file())))
}

/// Write every compile unit of `view` to its own `format` file under `dir`.
///
/// Returns the written paths in order. Nothing is created for a view
/// without compile units.
///
/// ## Errors
///
/// See the module documentation.
pub fn write_split(view: &LogicalView, settings: &ViewSettings, format: OutputFormat, dir: &Path) -> Result<Vec<PathBuf>>
{
    let units = view.compile_units();
    if units.is_empty() {
        return Ok(Vec::new());
    }

    fs::create_dir_all(dir).map_err(|source| ViewError::MakeDirFailure {
        path: dir.display().to_string(),
        source,
    })?;

    let mut text = TextRenderer::new(view, settings);
    let yaml = YamlRenderer::new(view);
    let mut written = Vec::with_capacity(units.len());

    for unit in units {
        let path = dir.join(format!("{}.{}", flatten_path(&view.get(unit).name), format.extension()));
        let content = match format {
            OutputFormat::Text => {
                let selection = Selection::select_from(view, settings, unit);
                let mut out = text.header();
                text.render(selection.entries(), &mut out);
                out
            }
            OutputFormat::Yaml => {
                let mut out = yaml.header();
                yaml.render_object(unit, 1, &mut out);
                out
            }
        };

        fs::write(&path, content).map_err(|source| ViewError::SplitOpenFailure {
            path: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "wrote split output");
        written.push(path);
    }

    info!(dir = %dir.display(), files = written.len(), %format, "split output written");
    Ok(written)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_flatten_path()
    {
        assert_eq!(flatten_path("src/a.cpp"), "src_a_cpp");
        assert_eq!(flatten_path("C:\\x\\b.c"), "C:_x_b_c");
    }

    #[test]
    fn test_empty_view_writes_nothing()
    {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("never");
        let view = LogicalView::new("a.o");

        let written = write_split(&view, &ViewSettings::default(), OutputFormat::Text, &target).unwrap();
        assert!(written.is_empty());
        assert!(!target.exists());
    }

    #[test]
    fn test_default_dir_is_flattened_input()
    {
        let view = LogicalView::new("build/a.o");
        assert_eq!(split_dir(&view, &ViewSettings::default()), PathBuf::from("build_a_o"));
    }
}
