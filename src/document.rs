use crate::error::{OpsError, Result};
use crate::input::{InputFormat, InputPayload};
use crate::mcp::errors;
use hwpers::model::paragraph::Paragraph;
use hwpers::{HwpDocument, HwpError, HwpReader, HwpxReader};

/// A parsed document plus what was learned while reading it.
pub struct LoadedDocument {
    pub document: HwpDocument,
    pub format: InputFormat,
    pub warnings: Vec<String>,
    pub source: String,
}

/// Resource an operation context wraps for the HWP handlers.
pub enum DocumentTarget {
    Blank,
    Loaded(Box<LoadedDocument>),
}

impl DocumentTarget {
    pub fn load(payload: &InputPayload) -> Result<Self> {
        let loaded = parse_document(&payload.bytes, payload.format, &payload.source)?;
        tracing::debug!(
            source = %loaded.source,
            format = loaded.format.as_str(),
            sections = loaded.document.sections().count(),
            "document loaded"
        );
        Ok(DocumentTarget::Loaded(Box::new(loaded)))
    }

    pub fn loaded(&self) -> Result<&LoadedDocument> {
        match self {
            DocumentTarget::Loaded(loaded) => Ok(loaded.as_ref()),
            DocumentTarget::Blank => Err(no_document()),
        }
    }

    /// Moves the document out, leaving a blank target behind.
    pub fn take_loaded(&mut self) -> Result<LoadedDocument> {
        match std::mem::replace(self, DocumentTarget::Blank) {
            DocumentTarget::Loaded(loaded) => Ok(*loaded),
            DocumentTarget::Blank => Err(no_document()),
        }
    }
}

fn no_document() -> OpsError {
    OpsError::validation("target", "operation requires a loaded document")
}

pub fn parse_document(bytes: &[u8], format: InputFormat, source: &str) -> Result<LoadedDocument> {
    let loaded = |document, format, warnings| LoadedDocument {
        document,
        format,
        warnings,
        source: source.to_string(),
    };

    match format {
        InputFormat::Hwp => HwpReader::from_bytes(bytes)
            .map(|document| loaded(document, format, Vec::new()))
            .map_err(|error| map_hwp_error_with_stage(error, "hwp parse")),
        InputFormat::Hwpx => HwpxReader::from_bytes(bytes)
            .map(|document| loaded(document, format, Vec::new()))
            .map_err(|error| map_hwp_error_with_stage(error, "hwpx parse")),
        InputFormat::Auto => match HwpReader::from_bytes(bytes) {
            Ok(document) => Ok(loaded(document, InputFormat::Hwp, Vec::new())),
            Err(hwp_err) => match HwpxReader::from_bytes(bytes) {
                Ok(document) => Ok(loaded(
                    document,
                    InputFormat::Hwpx,
                    vec!["auto format: hwp parse failed; hwpx succeeded".to_string()],
                )),
                Err(hwpx_err) => Err(OpsError::engine(
                    errors::PARSE_FAILED,
                    format!("auto format parse failed (hwp: {hwp_err}; hwpx: {hwpx_err})"),
                )),
            },
        },
    }
}

/// Paragraph text without the trailing paragraph terminator the engine keeps.
pub fn paragraph_text(paragraph: &Paragraph) -> &str {
    paragraph
        .text
        .as_ref()
        .map(|para_text| para_text.content.trim_end_matches(['\r', '\n']))
        .unwrap_or("")
}

pub fn map_hwp_error(error: HwpError) -> OpsError {
    match error {
        HwpError::UnsupportedVersion(message) => {
            if message.contains("Password-encrypted") {
                OpsError::engine(errors::ENCRYPTED, message)
            } else {
                OpsError::engine(errors::PARSE_FAILED, message)
            }
        }
        HwpError::InvalidInput(message) => OpsError::engine(errors::INVALID_INPUT, message),
        HwpError::Io(err) => OpsError::engine(errors::INVALID_INPUT, err.to_string()),
        HwpError::InvalidFormat(message)
        | HwpError::Cfb(message)
        | HwpError::CompressionError(message)
        | HwpError::ParseError(message)
        | HwpError::EncodingError(message)
        | HwpError::NotFound(message) => OpsError::engine(errors::PARSE_FAILED, message),
    }
}

pub fn map_hwp_error_with_stage(error: HwpError, stage: &str) -> OpsError {
    match map_hwp_error(error) {
        OpsError::Engine { kind, message } => {
            OpsError::engine(kind, format!("{stage} failed: {message}"))
        }
        other => other,
    }
}
