//! # dwarfview-core
//!
//! Reconstructs a source-level "Logical View" from the DWARF debug
//! information in ELF object files.
//!
//! The crate is a straight pipeline over one input file:
//! - [`die`] / [`reader`]: flatten `.debug_info` and `.debug_line` into DIEs
//! - [`builder`]: materialize the [`model::LogicalView`] and resolve
//!   references, names and declarations
//! - [`sort`] and [`select`]: order siblings and choose what gets printed
//! - [`render`] and [`summary`]: text and YAML output, and the count table
//! - [`split`]: one output file per compile unit
//!
//! [`pipeline::process`] runs all of it.
//!
//! ## Error model
//!
//! Fatal conditions are [`ViewError`]s with a stable [`ErrorCode`]. Data
//! anomalies never fail the run; they come back as warnings from
//! [`diagnostics::Diagnostics`].

pub mod builder;
pub mod diagnostics;
pub mod die;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod reader;
pub mod render;
pub mod select;
pub mod settings;
pub mod sort;
pub mod split;
pub mod summary;

pub use error::{ErrorCode, Result, ViewError};
pub use model::{LogicalObject, LogicalView, ObjectId, ObjectKind};
pub use pipeline::{process, FileReport};
pub use reader::ElfDwarfSource;
pub use settings::{OutputFormat, ShowAction, ShowOption, SortKey, ViewSettings};
