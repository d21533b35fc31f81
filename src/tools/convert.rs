use crate::context::OperationContext;
use crate::document::{DocumentTarget, map_hwp_error_with_stage};
use crate::error::{OpsError, Result};
use crate::mcp::contracts::{self, GROUP_WRITE, TOOL_CONVERT};
use crate::params::ParameterBag;
use crate::registry::{Handler, Outcome};
use crate::schema::ResultFamily;
use crate::tools::output;
use hwpers::{HwpWriter, HwpxWriter};
use serde_json::Value;

pub struct Convert;

pub fn handler() -> Box<dyn Handler<DocumentTarget>> {
    Box::new(Convert)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Hwp,
    Hwpx,
}

impl OutputFormat {
    fn parse(params: &ParameterBag) -> Result<Self> {
        match params.get_required::<String>("to")?.as_str() {
            "hwp" => Ok(OutputFormat::Hwp),
            "hwpx" => Ok(OutputFormat::Hwpx),
            _ => Err(OpsError::parameter("to", "must be hwp or hwpx")),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Hwp => "hwp",
            OutputFormat::Hwpx => "hwpx",
        }
    }
}

impl Handler<DocumentTarget> for Convert {
    fn name(&self) -> &'static str {
        TOOL_CONVERT
    }

    fn group(&self) -> &'static str {
        GROUP_WRITE
    }

    fn description(&self) -> &'static str {
        "Convert HWP documents between formats."
    }

    fn input_schema(&self) -> Value {
        contracts::convert_schema()
    }

    fn results(&self) -> ResultFamily {
        output::document_results()
    }

    fn execute(
        &self,
        context: &mut OperationContext<DocumentTarget>,
        params: &ParameterBag,
    ) -> Result<Outcome> {
        let to_format = OutputFormat::parse(params)?;
        let loaded = context.target_mut().take_loaded()?;

        let bytes = match to_format {
            OutputFormat::Hwp => HwpWriter::from_document(loaded.document)
                .to_bytes()
                .map_err(|error| map_hwp_error_with_stage(error, "convert to hwp")),
            OutputFormat::Hwpx => HwpxWriter::from_document(loaded.document)
                .to_bytes()
                .map_err(|error| map_hwp_error_with_stage(error, "convert to hwpx")),
        }?;

        output::emit(context, to_format.as_str(), bytes, loaded.warnings)
    }
}
