use crate::context::OperationContext;
use crate::document::{DocumentTarget, paragraph_text};
use crate::error::Result;
use crate::mcp::contracts::{self, GROUP_READ, TOOL_SUMMARIZE_STRUCTURE};
use crate::params::ParameterBag;
use crate::registry::{Handler, Outcome};
use crate::schema::{Field, FieldType, ResultFamily, ResultShape, Shape};
use serde::Serialize;
use serde_json::Value;

const DEFAULT_PREVIEW_CHARS: usize = 120;

#[derive(Debug, Serialize)]
pub struct StructureSummary {
    pub format: &'static str,
    pub sections: Vec<SectionSummary>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SectionSummary {
    pub index: u64,
    pub paragraphs: Vec<ParagraphSummary>,
}

#[derive(Debug, Serialize)]
pub struct ParagraphSummary {
    pub index: u64,
    pub char_count: u64,
    pub preview: String,
}

impl ResultShape for StructureSummary {
    const NAME: &'static str = "StructureSummary";

    fn shape() -> Shape {
        Shape::object([
            Field::string("format"),
            Field::array("sections", FieldType::nested::<SectionSummary>()),
            Field::array("warnings", FieldType::String),
        ])
    }
}

impl ResultShape for SectionSummary {
    const NAME: &'static str = "SectionSummary";

    fn shape() -> Shape {
        Shape::object([
            Field::integer("index"),
            Field::array("paragraphs", FieldType::nested::<ParagraphSummary>()),
        ])
    }
}

impl ResultShape for ParagraphSummary {
    const NAME: &'static str = "ParagraphSummary";

    fn shape() -> Shape {
        Shape::object([
            Field::integer("index"),
            Field::integer("char_count"),
            Field::string("preview"),
        ])
    }
}

pub struct SummarizeStructure;

pub fn handler() -> Box<dyn Handler<DocumentTarget>> {
    Box::new(SummarizeStructure)
}

impl Handler<DocumentTarget> for SummarizeStructure {
    fn name(&self) -> &'static str {
        TOOL_SUMMARIZE_STRUCTURE
    }

    fn group(&self) -> &'static str {
        GROUP_READ
    }

    fn description(&self) -> &'static str {
        "Summarize document structure for HWP documents."
    }

    fn input_schema(&self) -> Value {
        contracts::summarize_structure_schema()
    }

    fn results(&self) -> ResultFamily {
        ResultFamily::single::<StructureSummary>()
    }

    fn execute(
        &self,
        context: &mut OperationContext<DocumentTarget>,
        params: &ParameterBag,
    ) -> Result<Outcome> {
        let max_sections = params.get_optional("max_sections", usize::MAX)?;
        let max_paragraphs = params.get_optional("max_paragraphs_per_section", usize::MAX)?;
        let preview_chars = params.get_optional("preview_chars", DEFAULT_PREVIEW_CHARS)?;

        let loaded = context.target().loaded()?;

        let mut sections = Vec::new();
        let mut paragraph_count: u64 = 0;

        for (section_index, section) in loaded.document.sections().enumerate() {
            if section_index >= max_sections {
                break;
            }

            let mut paragraphs = Vec::new();
            for (paragraph_index, paragraph) in section.paragraphs.iter().enumerate() {
                if paragraph_index >= max_paragraphs {
                    break;
                }

                let text = paragraph_text(paragraph);

                paragraphs.push(ParagraphSummary {
                    index: paragraph_index as u64,
                    char_count: text.chars().count() as u64,
                    preview: text.chars().take(preview_chars).collect(),
                });
                paragraph_count += 1;
            }

            sections.push(SectionSummary {
                index: section_index as u64,
                paragraphs,
            });
        }

        let summary = format!(
            "sections: {}, paragraphs: {paragraph_count} (preview_chars={preview_chars})",
            sections.len()
        );
        let structure = StructureSummary {
            format: loaded.format.as_str(),
            sections,
            warnings: loaded.warnings.clone(),
        };
        Outcome::new(&structure, summary)
    }
}
