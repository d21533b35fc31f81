use crate::context::OperationContext;
use crate::error::{OpsError, Result};
use crate::params::ParameterBag;
use crate::schema::{ResultFamily, ResultShape, ShapeRef};
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::{BTreeMap, BTreeSet};

/// One operation exposed through the dispatch boundary.
///
/// `R` is the target resource a handler works on. Handlers are built once
/// when the registry is constructed and never mutated afterwards.
pub trait Handler<R>: Send + Sync {
    fn name(&self) -> &'static str;

    /// Tool category the operation is listed under.
    fn group(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn input_schema(&self) -> Value {
        json!({ "type": "object" })
    }

    /// Every result shape `execute` may produce.
    fn results(&self) -> ResultFamily;

    /// Whether the caller must load an existing target before dispatch.
    fn needs_existing_target(&self) -> bool {
        true
    }

    fn execute(&self, context: &mut OperationContext<R>, params: &ParameterBag)
    -> Result<Outcome>;

    fn type_label(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

pub type HandlerFactory<R> = fn() -> Box<dyn Handler<R>>;

/// Successful handler output: serialized result data plus a one-line summary
/// for text-only clients. `shape` records which result type produced `data`.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub data: Value,
    pub summary: String,
    pub shape: ShapeRef,
}

impl Outcome {
    pub fn new<T: Serialize + ResultShape>(data: &T, summary: impl Into<String>) -> Result<Self> {
        Ok(Self {
            data: serde_json::to_value(data)?,
            summary: summary.into(),
            shape: ShapeRef::of::<T>(),
        })
    }
}

pub struct RegistryBuilder<R> {
    handlers: BTreeMap<String, Box<dyn Handler<R>>>,
}

impl<R> Default for RegistryBuilder<R> {
    fn default() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }
}

impl<R> RegistryBuilder<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes the builder so a failed registration leaves nothing usable.
    pub fn register(mut self, handler: Box<dyn Handler<R>>) -> Result<Self> {
        let key = handler.name().to_lowercase();
        if key.trim().is_empty() {
            return Err(OpsError::Configuration(format!(
                "{} declares an empty operation name",
                handler.type_label()
            )));
        }
        if let Some(existing) = self.handlers.get(&key) {
            return Err(OpsError::Configuration(format!(
                "duplicate operation name '{}': {} conflicts with '{}' from {}",
                handler.name(),
                handler.type_label(),
                existing.name(),
                existing.type_label()
            )));
        }
        tracing::debug!(
            operation = handler.name(),
            group = handler.group(),
            "registered handler"
        );
        self.handlers.insert(key, handler);
        Ok(self)
    }

    pub fn build(self) -> Registry<R> {
        Registry {
            handlers: self.handlers,
        }
    }
}

/// Immutable operation-name → handler table.
pub struct Registry<R> {
    handlers: BTreeMap<String, Box<dyn Handler<R>>>,
}

impl<R> Registry<R> {
    pub fn builder() -> RegistryBuilder<R> {
        RegistryBuilder::new()
    }

    pub fn from_factories(factories: &[HandlerFactory<R>]) -> Result<Self> {
        let builder = factories
            .iter()
            .try_fold(Self::builder(), |builder, factory| {
                builder.register(factory())
            })?;
        Ok(builder.build())
    }

    pub fn get_handler(&self, name: &str) -> Result<&dyn Handler<R>> {
        let found = self.handlers.get(&name.to_lowercase());
        match found {
            Some(handler) => Ok(handler.as_ref()),
            None => {
                tracing::debug!(operation = name, "no handler registered");
                Err(OpsError::NotFound {
                    name: name.to_string(),
                    available: self.names().into_iter().map(str::to_string).collect(),
                })
            }
        }
    }

    /// Declared names, ordered case-insensitively.
    pub fn names(&self) -> Vec<&'static str> {
        self.handlers.values().map(|handler| handler.name()).collect()
    }

    pub fn handlers(&self) -> impl Iterator<Item = &dyn Handler<R>> {
        self.handlers.values().map(|handler| handler.as_ref())
    }

    pub fn groups(&self) -> Vec<&'static str> {
        self.handlers
            .values()
            .map(|handler| handler.group())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn handlers_in_group(&self, group: &str) -> Vec<&dyn Handler<R>> {
        self.handlers()
            .filter(|handler| handler.group().eq_ignore_ascii_case(group))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }
}
