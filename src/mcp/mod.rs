use crate::error::OpsError;
use serde_json::{Value, json};

pub mod contracts;
pub mod dispatch;
pub mod errors;

pub use dispatch::Dispatcher;

pub fn tool_definitions(dispatcher: &Dispatcher) -> Vec<Value> {
    dispatcher
        .registry()
        .handlers()
        .filter(|handler| dispatcher.is_enabled(handler.name()))
        .map(|handler| {
            let mut tool = json!({
                "name": handler.name(),
                "description": handler.description(),
                "inputSchema": handler.input_schema(),
                "_meta": { "group": handler.group() }
            });
            if let Some(schema) = dispatcher.catalog().operation_schema(handler.name())
                && let Some(obj) = tool.as_object_mut()
            {
                obj.insert("outputSchema".to_string(), schema.clone());
            }
            tool
        })
        .collect()
}

/// `tools/call` result for one operation, success or failure.
pub fn call_tool(dispatcher: &Dispatcher, name: &str, arguments: &Value) -> Value {
    match dispatcher.call(name, arguments) {
        Ok(result) => json!({
            "content": [{"type": "text", "text": result.summary}],
            "structuredContent": result.envelope,
            "isError": false
        }),
        Err(err) => error_result(&err, Some(name).filter(|name| !name.is_empty())),
    }
}

pub fn error_result(err: &OpsError, source: Option<&str>) -> Value {
    let message = err.to_string();
    let mut error = json!({
        "kind": err.kind(),
        "message": message,
    });

    if let Some(source) = source
        && let Some(obj) = error.as_object_mut()
    {
        obj.insert("source".to_string(), json!(source));
    }

    json!({
        "content": [{"type": "text", "text": format!("Error: {message}")}],
        "structuredContent": {"error": error},
        "isError": true
    })
}
