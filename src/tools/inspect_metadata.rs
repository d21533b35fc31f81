use crate::context::OperationContext;
use crate::document::DocumentTarget;
use crate::error::Result;
use crate::mcp::contracts::{self, GROUP_READ, TOOL_INSPECT_METADATA};
use crate::params::ParameterBag;
use crate::registry::{Handler, Outcome};
use crate::schema::{Field, FieldType, ResultFamily, ResultShape, Shape};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct DocumentMetadata {
    pub format: &'static str,
    pub version: String,
    pub sections: u64,
    pub paragraphs: u64,
    pub encrypted: bool,
    pub compressed: bool,
    pub warnings: Vec<String>,
}

impl ResultShape for DocumentMetadata {
    const NAME: &'static str = "DocumentMetadata";

    fn shape() -> Shape {
        Shape::object([
            Field::string("format"),
            Field::string("version"),
            Field::integer("sections"),
            Field::integer("paragraphs"),
            Field::boolean("encrypted"),
            Field::boolean("compressed"),
            Field::array("warnings", FieldType::String),
        ])
    }
}

pub struct InspectMetadata;

pub fn handler() -> Box<dyn Handler<DocumentTarget>> {
    Box::new(InspectMetadata)
}

impl Handler<DocumentTarget> for InspectMetadata {
    fn name(&self) -> &'static str {
        TOOL_INSPECT_METADATA
    }

    fn group(&self) -> &'static str {
        GROUP_READ
    }

    fn description(&self) -> &'static str {
        "Inspect metadata from HWP documents."
    }

    fn input_schema(&self) -> Value {
        contracts::inspect_metadata_schema()
    }

    fn results(&self) -> ResultFamily {
        ResultFamily::single::<DocumentMetadata>()
    }

    fn execute(
        &self,
        context: &mut OperationContext<DocumentTarget>,
        _params: &ParameterBag,
    ) -> Result<Outcome> {
        let loaded = context.target().loaded()?;
        let document = &loaded.document;

        let sections = document.sections().count() as u64;
        let paragraphs = document
            .sections()
            .map(|section| section.paragraphs.len() as u64)
            .sum::<u64>();

        let metadata = DocumentMetadata {
            format: loaded.format.as_str(),
            version: document.header.version_string().to_string(),
            sections,
            paragraphs,
            encrypted: document.is_encrypted(),
            compressed: document.header.is_compressed(),
            warnings: loaded.warnings.clone(),
        };
        Outcome::new(
            &metadata,
            format!("sections: {sections}, paragraphs: {paragraphs}"),
        )
    }
}
