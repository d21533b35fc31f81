use crate::error::{OpsError, Result};
use crate::mcp::contracts::MAX_INPUT_BYTES;
use crate::mcp::errors;
use crate::params::ParameterBag;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Auto,
    Hwp,
    Hwpx,
}

impl InputFormat {
    fn parse(params: &ParameterBag) -> Result<Self> {
        let Some(value) = params.get::<String>("format")? else {
            return Ok(InputFormat::Auto);
        };
        match value.as_str() {
            "auto" => Ok(InputFormat::Auto),
            "hwp" => Ok(InputFormat::Hwp),
            "hwpx" => Ok(InputFormat::Hwpx),
            _ => Err(OpsError::engine(
                errors::UNSUPPORTED_FORMAT,
                "format must be auto, hwp, or hwpx",
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InputFormat::Auto => "auto",
            InputFormat::Hwp => "hwp",
            InputFormat::Hwpx => "hwpx",
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputPayload {
    pub bytes: Vec<u8>,
    pub format: InputFormat,
    pub source: String,
    pub path: Option<String>,
}

fn too_large(len: u64) -> OpsError {
    OpsError::engine(
        errors::TOO_LARGE,
        format!("input exceeds limit: {len} bytes (max {MAX_INPUT_BYTES})"),
    )
}

pub fn load_input(params: &ParameterBag) -> Result<InputPayload> {
    let path = params.get::<String>("path")?;
    let base64 = params.get::<String>("base64")?;
    let format = InputFormat::parse(params)?;

    match (path, base64) {
        (None, None) => Err(OpsError::validation(
            "input",
            "either path or base64 is required",
        )),
        (Some(_), Some(_)) => Err(OpsError::validation(
            "input",
            "path and base64 cannot both be set",
        )),
        (Some(path), None) => {
            let path_ref = Path::new(&path);
            let metadata = fs::metadata(path_ref)
                .map_err(|_| OpsError::parameter("path", "must exist and be a file"))?;
            if !metadata.is_file() {
                return Err(OpsError::parameter("path", "must be a file"));
            }
            let len = metadata.len();
            if len > MAX_INPUT_BYTES {
                return Err(too_large(len));
            }
            let bytes = fs::read(path_ref)
                .map_err(|_| OpsError::parameter("path", "failed to read contents"))?;
            Ok(InputPayload {
                bytes,
                format,
                source: format!("path:{path}"),
                path: Some(path),
            })
        }
        (None, Some(encoded)) => {
            let bytes = STANDARD
                .decode(encoded.as_bytes())
                .map_err(|_| OpsError::parameter("base64", "must be valid"))?;
            if bytes.len() as u64 > MAX_INPUT_BYTES {
                return Err(too_large(bytes.len() as u64));
            }
            Ok(InputPayload {
                bytes,
                format,
                source: "base64".to_string(),
                path: None,
            })
        }
    }
}
