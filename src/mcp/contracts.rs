use serde_json::{Map, Value, json};

pub const TOOL_EXTRACT_TEXT: &str = "hwp.extract_text";
pub const TOOL_INSPECT_METADATA: &str = "hwp.inspect_metadata";
pub const TOOL_SUMMARIZE_STRUCTURE: &str = "hwp.summarize_structure";
pub const TOOL_GET_PARAGRAPH: &str = "hwp.get_paragraph";
pub const TOOL_CONVERT: &str = "hwp.convert";
pub const TOOL_CREATE_DOCUMENT: &str = "hwp.create_document";
pub const TOOL_APPEND_PARAGRAPH: &str = "hwp.append_paragraph";

pub const GROUP_READ: &str = "read";
pub const GROUP_WRITE: &str = "write";

pub const MAX_INPUT_BYTES: u64 = 50 * 1024 * 1024;
pub const MAX_OUTPUT_BYTES: u64 = 20 * 1024 * 1024;

/// Input schema for tools reading an existing document, merged with the
/// tool's own properties.
fn document_input_schema(extra: Value, required: &[&str]) -> Value {
    let mut properties = Map::new();
    properties.insert("path".to_string(), json!({ "type": "string" }));
    properties.insert("base64".to_string(), json!({ "type": "string" }));
    properties.insert(
        "format".to_string(),
        json!({ "type": "string", "enum": ["auto", "hwp", "hwpx"] }),
    );
    if let Value::Object(extra) = extra {
        properties.extend(extra);
    }

    let mut schema = json!({
        "type": "object",
        "properties": properties,
        "oneOf": [
            { "required": ["path"] },
            { "required": ["base64"] }
        ],
        "additionalProperties": false
    });
    if !required.is_empty()
        && let Some(obj) = schema.as_object_mut()
    {
        obj.insert("required".to_string(), json!(required));
    }
    schema
}

pub fn extract_text_schema() -> Value {
    document_input_schema(
        json!({
            "max_chars": { "type": "integer", "minimum": 0 },
            "include_newlines": { "type": "boolean" },
            "normalize_whitespace": { "type": "boolean" }
        }),
        &[],
    )
}

pub fn inspect_metadata_schema() -> Value {
    document_input_schema(json!({}), &[])
}

pub fn summarize_structure_schema() -> Value {
    document_input_schema(
        json!({
            "max_sections": { "type": "integer", "minimum": 0 },
            "max_paragraphs_per_section": { "type": "integer", "minimum": 0 },
            "preview_chars": { "type": "integer", "minimum": 0 }
        }),
        &[],
    )
}

pub fn get_paragraph_schema() -> Value {
    document_input_schema(
        json!({
            "section": { "type": "integer", "minimum": 0 },
            "paragraph": { "type": "integer", "minimum": 0 }
        }),
        &["section", "paragraph"],
    )
}

pub fn convert_schema() -> Value {
    document_input_schema(
        json!({
            "to": { "type": "string", "enum": ["hwp", "hwpx"] },
            "output_path": { "type": "string" }
        }),
        &["to"],
    )
}

pub fn append_paragraph_schema() -> Value {
    document_input_schema(
        json!({
            "text": { "type": "string" },
            "output_path": { "type": "string" }
        }),
        &["text"],
    )
}

pub fn create_document_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "text": { "type": "string" },
            "output_path": { "type": "string" }
        },
        "required": ["text"],
        "additionalProperties": false
    })
}
