//! Tests for error handling

use std::error::Error as _;
use std::io;

use dwarfview_core::error::{ErrorCode, Result, ViewError};

#[test]
fn test_every_code_has_a_stable_name()
{
    let codes = [
        (ErrorCode::CmdInvalidRegex, "ERR_CMD_INVALID_REGEX"),
        (ErrorCode::ReadFailed, "ERR_READ_FAILED"),
        (ErrorCode::InvalidDwarf, "ERR_INVALID_DWARF"),
        (ErrorCode::FileIoMakeDirFailure, "ERR_FILEIO_MAKE_DIR_FAILURE"),
        (ErrorCode::SplitUnableToOpenFile, "ERR_SPLIT_UNABLE_TO_OPEN_FILE"),
        (ErrorCode::FileNotFound, "ERR_FILE_NOT_FOUND"),
        (ErrorCode::InvalidFile, "ERR_INVALID_FILE"),
    ];
    for (code, name) in codes {
        assert_eq!(code.as_str(), name);
        assert_eq!(code.to_string(), name);
    }
}

#[test]
fn test_file_not_found_message()
{
    let err = ViewError::FileNotFound {
        path: "missing.o".to_string(),
    };
    assert_eq!(err.to_string(), "ERR_FILE_NOT_FOUND: Unable to open file 'missing.o'.");
}

#[test]
fn test_invalid_file_message()
{
    let err = ViewError::InvalidFile {
        path: "notes.txt".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "ERR_INVALID_FILE: Invalid input file 'notes.txt', please provide a file in a supported format."
    );
}

#[test]
fn test_make_dir_failure_keeps_io_source()
{
    let err = ViewError::MakeDirFailure {
        path: "out".to_string(),
        source: io::Error::from(io::ErrorKind::PermissionDenied),
    };
    assert_eq!(err.code(), ErrorCode::FileIoMakeDirFailure);
    assert_eq!(err.to_string(), "ERR_FILEIO_MAKE_DIR_FAILURE: Unable to create directory 'out'.");
    assert!(err.source().is_some());
}

#[test]
fn test_read_failed_message()
{
    let err = ViewError::ReadFailed {
        path: "a.o".to_string(),
        source: io::Error::from(io::ErrorKind::PermissionDenied),
    };
    assert_eq!(err.to_string(), "ERR_READ_FAILED: Failed to read 'a.o'.");
}

#[test]
fn test_result_alias_propagates()
{
    fn inner() -> Result<u32>
    {
        Err(ViewError::FileNotFound {
            path: "x".to_string(),
        })
    }
    fn outer() -> Result<u32>
    {
        let value = inner()?;
        Ok(value + 1)
    }
    assert_eq!(outer().unwrap_err().code(), ErrorCode::FileNotFound);
}
