mod common;

use common::{TestResult, cli_json, path_string, sample_file};
use tempfile::tempdir;

#[test]
fn cli_inspect_metadata_outputs_json() -> TestResult {
    let dir = tempdir()?;
    let file_path = sample_file(dir.path(), &["Hello"])?;
    let path = path_string(&file_path);

    let envelope = cli_json(
        "hwp.inspect_metadata",
        &["inspect-metadata", "--path", &path, "--format", "hwp"],
    )?;
    let data = &envelope["data"];
    assert_eq!(data["format"], "hwp");
    assert!(data["sections"].as_u64().expect("sections") >= 1);
    assert!(data["paragraphs"].as_u64().expect("paragraphs") >= 1);
    assert_eq!(envelope["output"]["path"], path.as_str());
    Ok(())
}
