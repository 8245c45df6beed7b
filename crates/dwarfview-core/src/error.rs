//! # Error Types
//!
//! Fatal error handling for the logical view pipeline.
//!
//! Every fatal condition carries a stable [`ErrorCode`]. The code name and the
//! message template are part of the tool's user-facing contract: the command
//! line prints them as `<CODE>: <message>` and exits with a non-zero status.
//!
//! Data anomalies (unknown tags, odd attribute forms) are *not* errors; they
//! are reported through [`crate::diagnostics::Diagnostics`] and processing
//! continues.

use std::fmt;

use thiserror::Error;

/// Stable identifiers for fatal errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode
{
    /// A `--filter`/`--tree` pattern is not a valid regular expression.
    CmdInvalidRegex,
    /// The input file exists but could not be read.
    ReadFailed,
    /// The input is an object file whose DWARF could not be parsed.
    InvalidDwarf,
    /// A split output directory could not be created.
    FileIoMakeDirFailure,
    /// A split output file could not be opened for writing.
    SplitUnableToOpenFile,
    /// The input file does not exist.
    FileNotFound,
    /// The input file is not in a supported object format.
    InvalidFile,
}

impl ErrorCode
{
    /// The stable code name, e.g. `ERR_INVALID_DWARF`.
    pub const fn as_str(self) -> &'static str
    {
        match self {
            ErrorCode::CmdInvalidRegex => "ERR_CMD_INVALID_REGEX",
            ErrorCode::ReadFailed => "ERR_READ_FAILED",
            ErrorCode::InvalidDwarf => "ERR_INVALID_DWARF",
            ErrorCode::FileIoMakeDirFailure => "ERR_FILEIO_MAKE_DIR_FAILURE",
            ErrorCode::SplitUnableToOpenFile => "ERR_SPLIT_UNABLE_TO_OPEN_FILE",
            ErrorCode::FileNotFound => "ERR_FILE_NOT_FOUND",
            ErrorCode::InvalidFile => "ERR_INVALID_FILE",
        }
    }

    /// Render the message template for `subject` (a path or pattern).
    pub fn message(self, subject: &str) -> String
    {
        match self {
            ErrorCode::CmdInvalidRegex => format!("Invalid Regular Expression '{subject}'."),
            ErrorCode::ReadFailed => format!("Failed to read '{subject}'."),
            ErrorCode::InvalidDwarf => format!("Failed to read DWARF from '{subject}'"),
            ErrorCode::FileIoMakeDirFailure => format!("Unable to create directory '{subject}'."),
            ErrorCode::SplitUnableToOpenFile => format!("Unable to open file '{subject}' for Logical View Split."),
            ErrorCode::FileNotFound => format!("Unable to open file '{subject}'."),
            ErrorCode::InvalidFile => {
                format!("Invalid input file '{subject}', please provide a file in a supported format.")
            }
        }
    }
}

impl fmt::Display for ErrorCode
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.as_str())
    }
}

/// Main error type for logical view operations
///
/// Each variant maps onto exactly one [`ErrorCode`]; `Display` renders the
/// user-facing `<CODE>: <message>` line.
#[derive(Error, Debug)]
pub enum ViewError
{
    /// A filter pattern failed to compile
    #[error("{}: {}", ErrorCode::CmdInvalidRegex, ErrorCode::CmdInvalidRegex.message(.pattern))]
    InvalidRegex
    {
        /// The pattern as given on the command line
        pattern: String,
        /// Details from the regex compiler (logged, not printed)
        #[source]
        source: regex::Error,
    },

    /// The input file exists but reading it failed
    #[error("{}: {}", ErrorCode::ReadFailed, ErrorCode::ReadFailed.message(.path))]
    ReadFailed
    {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Malformed or unreadable DWARF inside an object file
    ///
    /// No partial tree is produced when this happens.
    #[error("{}: {}", ErrorCode::InvalidDwarf, ErrorCode::InvalidDwarf.message(.path))]
    InvalidDwarf
    {
        path: String,
        /// What the reader was doing when it failed
        details: String,
    },

    /// The split output directory could not be created
    #[error("{}: {}", ErrorCode::FileIoMakeDirFailure, ErrorCode::FileIoMakeDirFailure.message(.path))]
    MakeDirFailure
    {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A split output destination could not be opened
    ///
    /// Destinations written before this one are left intact.
    #[error("{}: {}", ErrorCode::SplitUnableToOpenFile, ErrorCode::SplitUnableToOpenFile.message(.path))]
    SplitOpenFailure
    {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The input file does not exist
    #[error("{}: {}", ErrorCode::FileNotFound, ErrorCode::FileNotFound.message(.path))]
    FileNotFound
    {
        path: String
    },

    /// The input file is not an ELF object
    #[error("{}: {}", ErrorCode::InvalidFile, ErrorCode::InvalidFile.message(.path))]
    InvalidFile
    {
        path: String
    },
}

impl ViewError
{
    /// The stable code for this error.
    pub fn code(&self) -> ErrorCode
    {
        match self {
            ViewError::InvalidRegex { .. } => ErrorCode::CmdInvalidRegex,
            ViewError::ReadFailed { .. } => ErrorCode::ReadFailed,
            ViewError::InvalidDwarf { .. } => ErrorCode::InvalidDwarf,
            ViewError::MakeDirFailure { .. } => ErrorCode::FileIoMakeDirFailure,
            ViewError::SplitOpenFailure { .. } => ErrorCode::SplitUnableToOpenFile,
            ViewError::FileNotFound { .. } => ErrorCode::FileNotFound,
            ViewError::InvalidFile { .. } => ErrorCode::InvalidFile,
        }
    }
}

/// Convenience type alias for `Result<T, ViewError>`
///
/// ```rust
/// use dwarfview_core::error::Result;
/// fn foo() -> Result<()>
/// {
///     Ok(())
/// }
/// ```
pub type Result<T> = std::result::Result<T, ViewError>;

/// Wrap a gimli failure as [`ViewError::InvalidDwarf`] with some context.
pub(crate) fn map_dwarf_error(path: &str, context: &str, err: gimli::Error) -> ViewError
{
    ViewError::InvalidDwarf {
        path: path.to_string(),
        details: format!("{context}: {err}"),
    }
}
