use crate::document::DocumentTarget;
use crate::error::Result;
use crate::registry::{HandlerFactory, Registry};

pub mod append_paragraph;
pub mod convert;
pub mod create_document;
pub mod extract_text;
pub mod get_paragraph;
pub mod inspect_metadata;
pub mod output;
pub mod summarize_structure;

/// Every operation the server exposes. Names are checked for uniqueness when
/// the registry is built.
pub const HANDLERS: &[HandlerFactory<DocumentTarget>] = &[
    extract_text::handler,
    inspect_metadata::handler,
    summarize_structure::handler,
    get_paragraph::handler,
    create_document::handler,
    append_paragraph::handler,
    convert::handler,
];

pub fn build_registry() -> Result<Registry<DocumentTarget>> {
    Registry::from_factories(HANDLERS)
}
