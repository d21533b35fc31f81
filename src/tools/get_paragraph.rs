use crate::context::OperationContext;
use crate::document::{DocumentTarget, paragraph_text};
use crate::error::{OpsError, Result};
use crate::mcp::contracts::{self, GROUP_READ, TOOL_GET_PARAGRAPH};
use crate::params::ParameterBag;
use crate::registry::{Handler, Outcome};
use crate::schema::{Field, ResultFamily, ResultShape, Shape, Variant};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct ParagraphContent {
    pub section: u64,
    pub paragraph: u64,
    #[serde(flatten)]
    pub body: ParagraphBody,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParagraphBody {
    Text { text: String, char_count: u64 },
    Empty {},
}

impl ResultShape for ParagraphContent {
    const NAME: &'static str = "ParagraphContent";

    fn shape() -> Shape {
        Shape::polymorphic(
            "kind",
            [Field::integer("section"), Field::integer("paragraph")],
            [
                Variant::new(
                    "text",
                    [Field::string("text"), Field::integer("char_count")],
                ),
                Variant::new("empty", Vec::new()),
            ],
        )
    }
}

pub struct GetParagraph;

pub fn handler() -> Box<dyn Handler<DocumentTarget>> {
    Box::new(GetParagraph)
}

impl Handler<DocumentTarget> for GetParagraph {
    fn name(&self) -> &'static str {
        TOOL_GET_PARAGRAPH
    }

    fn group(&self) -> &'static str {
        GROUP_READ
    }

    fn description(&self) -> &'static str {
        "Read one paragraph of an HWP document by section and paragraph index."
    }

    fn input_schema(&self) -> Value {
        contracts::get_paragraph_schema()
    }

    fn results(&self) -> ResultFamily {
        ResultFamily::single::<ParagraphContent>()
    }

    fn execute(
        &self,
        context: &mut OperationContext<DocumentTarget>,
        params: &ParameterBag,
    ) -> Result<Outcome> {
        let section_index = params.get_required::<usize>("section")?;
        let paragraph_index = params.get_required::<usize>("paragraph")?;

        let loaded = context.target().loaded()?;
        let section = loaded
            .document
            .sections()
            .nth(section_index)
            .ok_or_else(|| {
                OpsError::parameter("section", format!("out of range: {section_index}"))
            })?;
        let paragraph = section.paragraphs.get(paragraph_index).ok_or_else(|| {
            OpsError::parameter("paragraph", format!("out of range: {paragraph_index}"))
        })?;

        let text = paragraph_text(paragraph);

        let (body, summary) = if text.is_empty() {
            (ParagraphBody::Empty {}, "(empty paragraph)".to_string())
        } else {
            (
                ParagraphBody::Text {
                    text: text.to_string(),
                    char_count: text.chars().count() as u64,
                },
                text.to_string(),
            )
        };

        let content = ParagraphContent {
            section: section_index as u64,
            paragraph: paragraph_index as u64,
            body,
        };
        Outcome::new(&content, summary)
    }
}
