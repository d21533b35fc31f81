use crate::context::OperationContext;
use crate::document::{DocumentTarget, map_hwp_error_with_stage};
use crate::error::{OpsError, Result};
use crate::mcp::contracts::{self, GROUP_WRITE, TOOL_CREATE_DOCUMENT};
use crate::params::ParameterBag;
use crate::registry::{Handler, Outcome};
use crate::schema::ResultFamily;
use crate::tools::output;
use hwpers::HwpWriter;
use serde_json::Value;

pub struct CreateDocument;

pub fn handler() -> Box<dyn Handler<DocumentTarget>> {
    Box::new(CreateDocument)
}

impl Handler<DocumentTarget> for CreateDocument {
    fn name(&self) -> &'static str {
        TOOL_CREATE_DOCUMENT
    }

    fn group(&self) -> &'static str {
        GROUP_WRITE
    }

    fn description(&self) -> &'static str {
        "Create new HWP documents from text."
    }

    fn input_schema(&self) -> Value {
        contracts::create_document_schema()
    }

    fn results(&self) -> ResultFamily {
        output::document_results()
    }

    fn needs_existing_target(&self) -> bool {
        false
    }

    fn execute(
        &self,
        context: &mut OperationContext<DocumentTarget>,
        params: &ParameterBag,
    ) -> Result<Outcome> {
        let text = non_empty_text(params)?;

        let mut writer = HwpWriter::new();
        add_paragraphs(&mut writer, &text)?;
        let bytes = writer
            .to_bytes()
            .map_err(|error| map_hwp_error_with_stage(error, "write document"))?;

        output::emit(context, "hwp", bytes, Vec::new())
    }
}

pub(crate) fn non_empty_text(params: &ParameterBag) -> Result<String> {
    let text = params.get_required::<String>("text")?;
    if text.trim().is_empty() {
        return Err(OpsError::parameter("text", "must not be empty"));
    }
    Ok(text)
}

/// One paragraph per line of `text`.
pub(crate) fn add_paragraphs(writer: &mut HwpWriter, text: &str) -> Result<()> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    for paragraph in normalized.split('\n') {
        writer
            .add_paragraph(paragraph)
            .map_err(|error| map_hwp_error_with_stage(error, "add paragraph"))?;
    }
    Ok(())
}
