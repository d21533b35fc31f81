use crate::context::OperationContext;
use crate::document::DocumentTarget;
use crate::error::{OpsError, Result};
use crate::input::load_input;
use crate::params::ParameterBag;
use crate::policy::EnablementPolicy;
use crate::registry::Registry;
use crate::schema::SchemaCatalog;
use crate::tools;
use serde::Serialize;
use serde_json::Value;

/// Response metadata shared by every operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub is_session: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub data: Value,
    pub output: OutputInfo,
}

#[derive(Debug, Clone)]
pub struct CallResult {
    pub envelope: Envelope,
    pub summary: String,
}

/// Registry, schema catalog and policy, built once at start-up and only read
/// afterwards.
pub struct Dispatcher {
    registry: Registry<DocumentTarget>,
    catalog: SchemaCatalog,
    policy: Box<dyn EnablementPolicy>,
}

impl Dispatcher {
    pub fn new(policy: impl EnablementPolicy + 'static) -> Result<Self> {
        let registry = tools::build_registry()?;
        let catalog = SchemaCatalog::build(&registry)?;
        tracing::info!(operations = registry.len(), "dispatcher ready");
        Ok(Self {
            registry,
            catalog,
            policy: Box::new(policy),
        })
    }

    pub fn registry(&self) -> &Registry<DocumentTarget> {
        &self.registry
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.policy.is_enabled(name)
    }

    /// Runs one operation end to end: policy, lookup, parameter bag, target
    /// preparation, execution and envelope.
    pub fn call(&self, name: &str, arguments: &Value) -> Result<CallResult> {
        if !self.policy.is_enabled(name) {
            tracing::warn!(operation = name, "call to disabled operation");
            return Err(OpsError::Disabled(name.to_string()));
        }
        let handler = self.registry.get_handler(name)?;
        let params = ParameterBag::from_arguments(arguments)?;
        let output_path = params.get::<String>("output_path")?;

        let (target, source_path) = if handler.needs_existing_target() {
            let payload = load_input(&params)?;
            (DocumentTarget::load(&payload)?, payload.path)
        } else {
            (DocumentTarget::Blank, None)
        };

        let mut context = OperationContext::new(target)
            .with_source_path(source_path)
            .with_output_path(output_path);

        let span = tracing::info_span!("operation", name = handler.name());
        let _entered = span.enter();
        tracing::debug!(arguments = ?params.keys().collect::<Vec<_>>(), "dispatching");
        let outcome = handler.execute(&mut context, &params).inspect_err(|err| {
            tracing::debug!(kind = err.kind(), error = %err, "operation failed");
        })?;
        debug_assert!(
            handler.results().contains(&outcome.shape),
            "{} returned undeclared result type {:?}",
            handler.name(),
            outcome.shape
        );

        let path = context.reported_path().map(str::to_string);
        tracing::debug!(modified = context.is_modified(), "operation finished");

        Ok(CallResult {
            envelope: Envelope {
                data: outcome.data,
                output: OutputInfo {
                    path,
                    session_id: None,
                    is_session: false,
                },
            },
            summary: outcome.summary,
        })
    }
}
