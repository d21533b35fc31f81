use crate::context::OperationContext;
use crate::document::{DocumentTarget, map_hwp_error_with_stage};
use crate::error::Result;
use crate::input::InputFormat;
use crate::mcp::contracts::{self, GROUP_WRITE, TOOL_APPEND_PARAGRAPH};
use crate::params::ParameterBag;
use crate::registry::{Handler, Outcome};
use crate::schema::ResultFamily;
use crate::tools::create_document::{add_paragraphs, non_empty_text};
use crate::tools::output;
use hwpers::HwpWriter;
use serde_json::Value;

pub struct AppendParagraph;

pub fn handler() -> Box<dyn Handler<DocumentTarget>> {
    Box::new(AppendParagraph)
}

impl Handler<DocumentTarget> for AppendParagraph {
    fn name(&self) -> &'static str {
        TOOL_APPEND_PARAGRAPH
    }

    fn group(&self) -> &'static str {
        GROUP_WRITE
    }

    fn description(&self) -> &'static str {
        "Append paragraphs to an existing HWP document and return the result as HWP."
    }

    fn input_schema(&self) -> Value {
        contracts::append_paragraph_schema()
    }

    fn results(&self) -> ResultFamily {
        output::document_results()
    }

    fn execute(
        &self,
        context: &mut OperationContext<DocumentTarget>,
        params: &ParameterBag,
    ) -> Result<Outcome> {
        let text = non_empty_text(params)?;
        let loaded = context.target_mut().take_loaded()?;

        let mut warnings = loaded.warnings;
        if loaded.format == InputFormat::Hwpx {
            warnings.push("hwpx input re-encoded as hwp".to_string());
        }

        let mut writer = HwpWriter::from_document(loaded.document);
        add_paragraphs(&mut writer, &text)?;
        let bytes = writer
            .to_bytes()
            .map_err(|error| map_hwp_error_with_stage(error, "write document"))?;

        output::emit(context, "hwp", bytes, warnings)
    }
}
