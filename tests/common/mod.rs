#![allow(dead_code)]

use hwpers::HwpWriter;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// `hwp-ops serve --stdio` child speaking NDJSON.
pub struct Server {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    next_id: i64,
    output_schemas: Option<HashMap<String, Value>>,
}

impl Server {
    pub fn start() -> TestResult<Self> {
        Self::start_with(&[])
    }

    pub fn start_with(extra_args: &[&str]) -> TestResult<Self> {
        let mut child = Command::new(env!("CARGO_BIN_EXE_hwp-ops"))
            .args(["serve", "--stdio"])
            .args(extra_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()?;
        let stdin = child.stdin.take().expect("stdin available");
        let stdout = BufReader::new(child.stdout.take().expect("stdout available"));
        Ok(Self {
            child,
            stdin,
            stdout,
            next_id: 1,
            output_schemas: None,
        })
    }

    pub fn send_line(&mut self, line: &str) -> TestResult {
        writeln!(self.stdin, "{line}")?;
        self.stdin.flush()?;
        Ok(())
    }

    pub fn read_response(&mut self) -> TestResult<Value> {
        let mut line = String::new();
        self.stdout.read_line(&mut line)?;
        Ok(serde_json::from_str(line.trim())?)
    }

    /// Sends one request and returns the whole JSON-RPC response.
    pub fn request(&mut self, method: &str, params: Value) -> TestResult<Value> {
        let id = self.next_id;
        self.next_id += 1;
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        });
        self.send_line(&serde_json::to_string(&request)?)?;
        let response = self.read_response()?;
        assert_eq!(response.get("id").and_then(|v| v.as_i64()), Some(id));
        Ok(response)
    }

    pub fn tools(&mut self) -> TestResult<Vec<Value>> {
        let response = self.request("tools/list", json!({}))?;
        Ok(response["result"]["tools"]
            .as_array()
            .expect("tools array present")
            .clone())
    }

    /// `tools/call` result object, success or failure.
    pub fn call_tool(&mut self, name: &str, arguments: Value) -> TestResult<Value> {
        let response = self.request(
            "tools/call",
            json!({ "name": name, "arguments": arguments }),
        )?;
        Ok(response.get("result").expect("result present").clone())
    }

    /// Calls a tool that must succeed and checks its `structuredContent`
    /// against the `outputSchema` advertised by `tools/list`.
    pub fn call_ok(&mut self, name: &str, arguments: Value) -> TestResult<Value> {
        let result = self.call_tool(name, arguments)?;
        assert_eq!(
            result.get("isError").and_then(|v| v.as_bool()),
            Some(false),
            "{name}: {result}"
        );
        let structured = result
            .get("structuredContent")
            .expect("structured content present")
            .clone();
        let schema = self.output_schema(name)?;
        assert_valid(&schema, &structured);
        assert_eq!(structured["output"]["isSession"], false);
        assert!(structured["output"].get("sessionId").is_none());
        Ok(structured)
    }

    pub fn output_schema(&mut self, name: &str) -> TestResult<Value> {
        if self.output_schemas.is_none() {
            let schemas = self
                .tools()?
                .into_iter()
                .filter_map(|tool| {
                    let name = tool.get("name")?.as_str()?.to_string();
                    Some((name, tool.get("outputSchema")?.clone()))
                })
                .collect();
            self.output_schemas = Some(schemas);
        }
        Ok(self
            .output_schemas
            .as_ref()
            .and_then(|schemas| schemas.get(name))
            .cloned()
            .expect("outputSchema advertised"))
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub fn assert_valid(schema: &Value, instance: &Value) {
    let validator = jsonschema::validator_for(schema).expect("valid schema");
    let failures: Vec<String> = validator
        .iter_errors(instance)
        .map(|e| format!("{}: {}", e.instance_path, e))
        .collect();
    assert!(failures.is_empty(), "{failures:?} in {instance}");
}

/// Writes an HWP file with one paragraph per entry.
pub fn sample_file(dir: &Path, paragraphs: &[&str]) -> TestResult<PathBuf> {
    let file_path = dir.join("sample.hwp");
    let mut writer = HwpWriter::new();
    for paragraph in paragraphs {
        writer.add_paragraph(paragraph)?;
    }
    writer.save_to_file(&file_path)?;
    Ok(file_path)
}

pub fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Output schema printed by `hwp-ops schema --operation NAME`.
pub fn cli_output_schema(operation: &str) -> TestResult<Value> {
    let output = Command::new(env!("CARGO_BIN_EXE_hwp-ops"))
        .args(["schema", "--operation", operation])
        .output()?;
    assert!(output.status.success());
    Ok(serde_json::from_slice(&output.stdout)?)
}

/// Runs a CLI subcommand with `--json` and validates the printed envelope.
pub fn cli_json(operation: &str, args: &[&str]) -> TestResult<Value> {
    let output = Command::new(env!("CARGO_BIN_EXE_hwp-ops"))
        .args(args)
        .arg("--json")
        .output()?;
    assert!(output.status.success());
    let envelope: Value = serde_json::from_slice(&output.stdout)?;
    assert_valid(&cli_output_schema(operation)?, &envelope);
    Ok(envelope)
}
