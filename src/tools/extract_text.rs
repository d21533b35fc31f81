use crate::context::OperationContext;
use crate::document::DocumentTarget;
use crate::error::Result;
use crate::mcp::contracts::{self, GROUP_READ, TOOL_EXTRACT_TEXT};
use crate::params::ParameterBag;
use crate::registry::{Handler, Outcome};
use crate::schema::{Field, ResultFamily, ResultShape, Shape};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct ExtractedText {
    pub text: String,
    pub char_count: u64,
    pub truncated: bool,
    /// Character limit the caller asked for, when one was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_chars: Option<u64>,
}

impl ResultShape for ExtractedText {
    const NAME: &'static str = "ExtractedText";

    fn shape() -> Shape {
        Shape::object([
            Field::string("text"),
            Field::integer("char_count"),
            Field::boolean("truncated"),
            Field::integer("max_chars").optional(),
        ])
    }
}

pub struct ExtractText;

pub fn handler() -> Box<dyn Handler<DocumentTarget>> {
    Box::new(ExtractText)
}

impl Handler<DocumentTarget> for ExtractText {
    fn name(&self) -> &'static str {
        TOOL_EXTRACT_TEXT
    }

    fn group(&self) -> &'static str {
        GROUP_READ
    }

    fn description(&self) -> &'static str {
        "Extract plain text from HWP documents."
    }

    fn input_schema(&self) -> Value {
        contracts::extract_text_schema()
    }

    fn results(&self) -> ResultFamily {
        ResultFamily::single::<ExtractedText>()
    }

    fn execute(
        &self,
        context: &mut OperationContext<DocumentTarget>,
        params: &ParameterBag,
    ) -> Result<Outcome> {
        let include_newlines = params.get_optional("include_newlines", true)?;
        let normalize_whitespace = params.get_optional("normalize_whitespace", false)?;
        let max_chars = params.get::<u64>("max_chars")?;

        let text = context.target().loaded()?.document.extract_text();
        let normalized = normalize_text(&text, include_newlines, normalize_whitespace);
        let total = normalized.chars().count();
        let limited = apply_max_chars(normalized, max_chars);
        let char_count = limited.chars().count();

        let result = ExtractedText {
            char_count: char_count as u64,
            truncated: char_count < total,
            text: limited,
            max_chars,
        };
        Outcome::new(&result, result.text.as_str())
    }
}

fn normalize_text(text: &str, include_newlines: bool, normalize_whitespace: bool) -> String {
    let mut output = text.replace("\r\n", "\n").replace('\r', "\n");

    if !include_newlines {
        output = output.replace('\n', " ");
    }

    if normalize_whitespace {
        if include_newlines {
            let lines: Vec<String> = output
                .lines()
                .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
                .collect();
            output = lines.join("\n");
        } else {
            output = output.split_whitespace().collect::<Vec<_>>().join(" ");
        }
    }

    output
}

fn apply_max_chars(text: String, max_chars: Option<u64>) -> String {
    let Some(max_chars) = max_chars else {
        return text;
    };
    let limit = usize::try_from(max_chars).unwrap_or(usize::MAX);
    text.chars().take(limit).collect()
}
