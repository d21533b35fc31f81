mod common;

use common::{Server, TestResult};
use std::collections::HashSet;

#[test]
fn tools_list_includes_expected_tools() -> TestResult {
    let mut server = Server::start()?;
    let tools = server.tools()?;

    let names: HashSet<&str> = tools
        .iter()
        .filter_map(|tool| tool.get("name").and_then(|value| value.as_str()))
        .collect();
    let expected: HashSet<&str> = [
        "hwp.extract_text",
        "hwp.inspect_metadata",
        "hwp.summarize_structure",
        "hwp.get_paragraph",
        "hwp.convert",
        "hwp.create_document",
        "hwp.append_paragraph",
    ]
    .into_iter()
    .collect();
    assert_eq!(names, expected);

    for tool in &tools {
        let output_schema = tool.get("outputSchema").expect("outputSchema");
        assert_eq!(output_schema["required"], serde_json::json!(["data", "output"]));
        assert_eq!(tool["inputSchema"]["type"], "object");
        let group = tool["_meta"]["group"].as_str().expect("group");
        assert!(group == "read" || group == "write", "{tool}");
    }
    Ok(())
}

#[test]
fn tools_list_hides_disabled_tools() -> TestResult {
    let mut server = Server::start_with(&["--disable", "hwp.convert,hwp.append_paragraph"])?;

    let names: HashSet<String> = server
        .tools()?
        .iter()
        .filter_map(|tool| tool.get("name").and_then(|value| value.as_str()))
        .map(str::to_string)
        .collect();
    assert_eq!(names.len(), 5);
    assert!(!names.contains("hwp.convert"));
    assert!(!names.contains("hwp.append_paragraph"));

    let refused = server.call_tool("hwp.convert", serde_json::json!({"to": "hwp"}))?;
    assert_eq!(refused["isError"], true);
    assert_eq!(refused["structuredContent"]["error"]["kind"], "disabled");
    Ok(())
}

#[test]
fn allow_list_limits_tools() -> TestResult {
    let mut server = Server::start_with(&["--enable", "HWP.EXTRACT_TEXT"])?;
    let tools = server.tools()?;
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["name"], "hwp.extract_text");
    Ok(())
}
