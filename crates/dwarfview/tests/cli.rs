//! Tests for the dwarfview binary: output on real objects, exit codes and
//! error lines

use std::fs;
use std::path::PathBuf;
use std::process::Command;

/// gcc-built objects shared with the core crate's tests.
fn data_dir() -> PathBuf
{
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../dwarfview-core/tests/data")
}

fn command(args: &[&str]) -> Command
{
    let mut command = Command::new(env!("CARGO_BIN_EXE_dwarfview"));
    command
        .args(args)
        .current_dir(data_dir())
        .env_remove("RUST_LOG")
        .env_remove("DWARFVIEW_LOG_FILE");
    command
}

fn dwarfview(args: &[&str]) -> std::process::Output
{
    command(args).output().unwrap()
}

fn expected_view(object: &str) -> String
{
    format!(
        "\
{{InputFile}} \"{object}\"
    {{CompileUnit}} \"scale.c\"

{{Source}} \"scale.c\"
 1    {{Variable}} \"counter\" -> \"int\"
 3    {{Function}} static \"scale\" -> \"int\"
          - No declaration
 3      {{Parameter}} \"value\" -> \"int\"
 5      {{Variable}} \"factor\" -> \"int\"
 9    {{Function}} \"accumulate\" -> \"int\"
          - No declaration
 9      {{Parameter}} \"amount\" -> \"int\"
"
    )
}

/// `(total, printed)` of one summary row.
fn summary_row(output: &str, kind: &str) -> (usize, usize)
{
    let line = output
        .lines()
        .find(|line| line.split_whitespace().next() == Some(kind))
        .unwrap();
    let counts: Vec<usize> = line.split_whitespace().skip(1).map(|n| n.parse().unwrap()).collect();
    (counts[0], counts[1])
}

fn check_default_view(object: &str)
{
    let output = dwarfview(&[object]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&output.stdout), expected_view(object));
    assert!(output.stderr.is_empty(), "{}", String::from_utf8_lossy(&output.stderr));
}

fn check_summary(object: &str)
{
    let output = dwarfview(&["-t", object]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with(&expected_view(object)));

    assert_eq!(summary_row(&stdout, "CompileUnit"), (1, 1));
    assert_eq!(summary_row(&stdout, "Function"), (2, 2));
    assert_eq!(summary_row(&stdout, "Parameter"), (2, 2));
    assert_eq!(summary_row(&stdout, "Variable"), (2, 2));
    assert_eq!(summary_row(&stdout, "PrimitiveType"), (1, 0));
    let (lines, printed) = summary_row(&stdout, "CodeLine");
    assert!(lines > 0);
    assert_eq!(printed, 0);
    assert_eq!(summary_row(&stdout, "Totals").1, 7);
}

#[test]
fn test_default_view_of_dwarf4_object()
{
    check_default_view("scale-dwarf4.o");
}

#[test]
fn test_default_view_of_dwarf5_object()
{
    check_default_view("scale-dwarf5.o");
}

#[test]
fn test_summary_of_dwarf4_object()
{
    check_summary("scale-dwarf4.o");
}

#[test]
fn test_summary_of_dwarf5_object()
{
    check_summary("scale-dwarf5.o");
}

#[cfg(target_os = "linux")]
#[test]
fn test_failed_stdout_write_is_fatal()
{
    use std::fs::File;
    use std::process::Stdio;

    let output = command(&["scale-dwarf4.o"])
        .stdout(Stdio::from(File::create("/dev/full").unwrap()))
        .stderr(Stdio::piped())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to write output"));
}

#[test]
fn test_missing_file_is_fatal()
{
    let output = dwarfview(&["definitely-missing.o"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("\nERR_FILE_NOT_FOUND: Unable to open file 'definitely-missing.o'.\n"));
}

#[test]
fn test_non_object_file_is_invalid()
{
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "not an object file").unwrap();
    let path = path.to_string_lossy().into_owned();

    let output = dwarfview(&[&path]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(&format!("ERR_INVALID_FILE: Invalid input file '{path}'")));
}

#[test]
fn test_invalid_regex_is_fatal()
{
    let output = dwarfview(&["--filter=[", "a.o"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERR_CMD_INVALID_REGEX: Invalid Regular Expression '['."));
}

#[test]
fn test_usage_error_exits_with_two()
{
    let output = dwarfview(&["--sort=size", "a.o"]);
    assert_eq!(output.status.code(), Some(2));
}
