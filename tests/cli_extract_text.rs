mod common;

use common::{TestResult, cli_json, path_string, sample_file};
use std::process::Command;
use tempfile::tempdir;

#[test]
fn cli_extract_text_outputs_text() -> TestResult {
    let dir = tempdir()?;
    let file_path = sample_file(dir.path(), &["Hello CLI"])?;

    let output = Command::new(env!("CARGO_BIN_EXE_hwp-ops"))
        .args(["extract-text", "--path", &path_string(&file_path)])
        .output()?;

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Hello CLI"));
    Ok(())
}

#[test]
fn cli_extract_text_json_is_the_envelope() -> TestResult {
    let dir = tempdir()?;
    let file_path = sample_file(dir.path(), &["Hello CLI"])?;
    let path = path_string(&file_path);

    let envelope = cli_json(
        "hwp.extract_text",
        &["extract-text", "--path", &path, "--max-chars", "5"],
    )?;
    assert_eq!(envelope["data"]["char_count"], 5);
    assert_eq!(envelope["data"]["truncated"], true);
    assert_eq!(envelope["output"]["path"], path.as_str());
    assert_eq!(envelope["output"]["isSession"], false);
    Ok(())
}

#[test]
fn cli_extract_text_reports_errors_on_stderr() -> TestResult {
    let dir = tempdir()?;
    let missing = path_string(&dir.path().join("missing.hwp"));

    let output = Command::new(env!("CARGO_BIN_EXE_hwp-ops"))
        .args(["extract-text", "--path", &missing])
        .output()?;

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr)?;
    assert!(stderr.contains("parameter 'path'"));
    Ok(())
}
