use crate::context::OperationContext;
use crate::document::DocumentTarget;
use crate::error::{OpsError, Result};
use crate::mcp::contracts::MAX_OUTPUT_BYTES;
use crate::mcp::errors;
use crate::registry::Outcome;
use crate::schema::{Field, FieldType, ResultFamily, ResultShape, Shape};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use std::fs;

/// Document bytes written to the caller's `output_path`.
#[derive(Debug, Serialize)]
pub struct SavedDocument {
    pub format: &'static str,
    pub path: String,
    pub uri: String,
    pub bytes_len: u64,
    pub warnings: Vec<String>,
}

/// Document bytes returned inline when no `output_path` was given.
#[derive(Debug, Serialize)]
pub struct InlineDocument {
    pub format: &'static str,
    pub base64: String,
    pub bytes_len: u64,
    pub warnings: Vec<String>,
}

impl ResultShape for SavedDocument {
    const NAME: &'static str = "SavedDocument";

    fn shape() -> Shape {
        Shape::object([
            Field::string("format"),
            Field::string("path"),
            Field::string("uri"),
            Field::integer("bytes_len"),
            Field::array("warnings", FieldType::String),
        ])
    }
}

impl ResultShape for InlineDocument {
    const NAME: &'static str = "InlineDocument";

    fn shape() -> Shape {
        Shape::object([
            Field::string("format"),
            Field::string("base64"),
            Field::integer("bytes_len"),
            Field::array("warnings", FieldType::String),
        ])
    }
}

pub fn document_results() -> ResultFamily {
    ResultFamily::single::<SavedDocument>().or::<InlineDocument>()
}

/// Hands produced document bytes back to the caller and records the change
/// on the context.
pub fn emit(
    context: &mut OperationContext<DocumentTarget>,
    format: &'static str,
    bytes: Vec<u8>,
    warnings: Vec<String>,
) -> Result<Outcome> {
    let bytes_len = bytes.len() as u64;

    if let Some(path) = context.output_path() {
        if path.trim().is_empty() {
            return Err(OpsError::parameter("output_path", "must not be empty"));
        }
        fs::write(path, &bytes).map_err(|err| {
            OpsError::engine(
                errors::INTERNAL_ERROR,
                format!("failed to write output: {err}"),
            )
        })?;
        let saved = SavedDocument {
            format,
            path: path.to_string(),
            uri: format!("file://{path}"),
            bytes_len,
            warnings,
        };
        tracing::info!(path = %saved.path, bytes_len, "document written");
        context.mark_modified();
        return Outcome::new(&saved, format!("document written to {}", saved.path));
    }

    if bytes_len > MAX_OUTPUT_BYTES {
        return Err(OpsError::engine(
            errors::TOO_LARGE,
            format!("output exceeds limit: {bytes_len} bytes (max {MAX_OUTPUT_BYTES})"),
        ));
    }
    let inline = InlineDocument {
        format,
        base64: STANDARD.encode(&bytes),
        bytes_len,
        warnings,
    };
    context.mark_modified();
    Outcome::new(&inline, format!("created {format} document ({bytes_len} bytes)"))
}
