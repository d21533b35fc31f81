use super::{Field, FieldType, Shape, ShapeRef, Variant};
use crate::error::{OpsError, Result};
use crate::registry::Registry;
use serde_json::{Map, Value, json};
use std::any::TypeId;
use std::collections::{HashMap, HashSet};

/// Compiles result shapes into JSON Schema nodes, memoized per type.
#[derive(Debug, Default)]
pub struct SchemaSynthesizer {
    cache: HashMap<TypeId, Value>,
    in_progress: HashSet<TypeId>,
}

impl SchemaSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self, shape: &ShapeRef) -> Option<&Value> {
        self.cache.get(&shape.id())
    }

    pub fn compile(&mut self, shape: ShapeRef) -> Result<Value> {
        if let Some(node) = self.cache.get(&shape.id()) {
            return Ok(node.clone());
        }
        if !self.in_progress.insert(shape.id()) {
            // Re-entered through a member of itself.
            tracing::trace!(shape = shape.name(), "recursive shape reference");
            return Ok(json!({ "type": "object", "title": shape.name() }));
        }

        let compiled = self.compile_shape(shape.name(), shape.shape());
        self.in_progress.remove(&shape.id());
        let node = compiled?;

        tracing::trace!(shape = shape.name(), "compiled result shape");
        self.cache.insert(shape.id(), node.clone());
        Ok(node)
    }

    /// One candidate compiles to its own node; several to a `oneOf`.
    pub fn family(&mut self, candidates: &[ShapeRef]) -> Result<Value> {
        let nodes = candidates
            .iter()
            .map(|candidate| self.compile(*candidate))
            .collect::<Result<Vec<_>>>()?;
        union(nodes)
    }

    fn compile_shape(&mut self, name: &'static str, shape: Shape) -> Result<Value> {
        match shape {
            Shape::Object(fields) => self.object_node(name, name, &fields, None),
            Shape::Polymorphic {
                base,
                discriminator,
                variants,
            } => self.polymorphic_node(name, &base, discriminator, &variants),
        }
    }

    fn polymorphic_node(
        &mut self,
        name: &'static str,
        base: &[Field],
        discriminator: &'static str,
        variants: &[Variant],
    ) -> Result<Value> {
        if discriminator.is_empty() {
            return Err(OpsError::schema(name, "discriminator name is empty"));
        }
        if variants.is_empty() {
            return Err(OpsError::schema(name, "polymorphic shape declares no variants"));
        }

        let mut tags = HashSet::new();
        let mut one_of = Vec::with_capacity(variants.len());
        for variant in variants {
            if !tags.insert(variant.tag) {
                return Err(OpsError::schema(
                    name,
                    format!("variant tag '{}' is declared twice", variant.tag),
                ));
            }
            let fields: Vec<Field> = base.iter().chain(&variant.fields).cloned().collect();
            let title = format!("{name}.{}", variant.tag);
            one_of.push(self.object_node(
                name,
                &title,
                &fields,
                Some((discriminator, variant.tag)),
            )?);
        }

        Ok(json!({ "title": name, "oneOf": one_of }))
    }

    fn object_node(
        &mut self,
        name: &'static str,
        title: &str,
        fields: &[Field],
        discriminator: Option<(&'static str, &'static str)>,
    ) -> Result<Value> {
        let mut properties = Map::new();
        let mut required = Vec::new();

        if let Some((property, tag)) = discriminator {
            properties.insert(
                property.to_string(),
                json!({ "type": "string", "const": tag }),
            );
            required.push(json!(property));
        }

        for field in fields {
            if discriminator.is_some_and(|(property, _)| property == field.name) {
                return Err(OpsError::schema(
                    name,
                    format!("member '{}' collides with the discriminator", field.name),
                ));
            }
            if properties.contains_key(field.name) {
                return Err(OpsError::schema(
                    name,
                    format!("member '{}' is declared twice", field.name),
                ));
            }
            let node = self.field_node(&field.ty)?;
            properties.insert(field.name.to_string(), node);
            if !field.optional {
                required.push(json!(field.name));
            }
        }

        Ok(json!({
            "type": "object",
            "title": title,
            "properties": properties,
            "required": required
        }))
    }

    fn field_node(&mut self, ty: &FieldType) -> Result<Value> {
        Ok(match ty {
            FieldType::String => json!({ "type": "string" }),
            FieldType::Integer => json!({ "type": "integer" }),
            FieldType::Boolean => json!({ "type": "boolean" }),
            FieldType::Array(items) => json!({
                "type": "array",
                "items": self.field_node(items)?
            }),
            FieldType::Nested(shape) => self.compile(*shape)?,
        })
    }
}

fn union(nodes: Vec<Value>) -> Result<Value> {
    match nodes.len() {
        0 => Err(OpsError::validation(
            "result types",
            "at least one candidate result type is required",
        )),
        1 => Ok(nodes.into_iter().next().unwrap_or_default()),
        _ => Ok(json!({ "oneOf": nodes })),
    }
}

/// Wraps a result node in the response envelope every operation shares.
pub fn envelope_schema(data: Value) -> Value {
    json!({
        "type": "object",
        "properties": {
            "data": data,
            "output": {
                "type": "object",
                "properties": {
                    "path": { "type": "string" },
                    "sessionId": { "type": "string" },
                    "isSession": { "type": "boolean" }
                },
                "required": ["isSession"]
            }
        },
        "required": ["data", "output"]
    })
}

/// Output schemas for every registered operation, compiled once at start-up.
#[derive(Debug)]
pub struct SchemaCatalog {
    operations: HashMap<String, Value>,
    synthesizer: SchemaSynthesizer,
}

impl SchemaCatalog {
    pub fn build<R>(registry: &Registry<R>) -> Result<Self> {
        let mut synthesizer = SchemaSynthesizer::new();
        let mut operations = HashMap::new();
        for handler in registry.handlers() {
            let node = synthesizer.family(handler.results().candidates())?;
            operations.insert(handler.name().to_lowercase(), envelope_schema(node));
        }
        tracing::debug!(
            operations = operations.len(),
            shapes = synthesizer.cache.len(),
            "schema catalog built"
        );
        Ok(Self {
            operations,
            synthesizer,
        })
    }

    pub fn operation_schema(&self, name: &str) -> Option<&Value> {
        self.operations.get(&name.to_lowercase())
    }

    /// Union of every result shape reachable from a group's handlers.
    /// `None` when no handler belongs to the group.
    pub fn group_schema<R>(&self, registry: &Registry<R>, group: &str) -> Result<Option<Value>> {
        let handlers = registry.handlers_in_group(group);
        if handlers.is_empty() {
            return Ok(None);
        }

        let mut seen = HashSet::new();
        let mut nodes = Vec::new();
        for handler in handlers {
            for candidate in handler.results().candidates() {
                if !seen.insert(candidate.id()) {
                    continue;
                }
                let node = self.synthesizer.cached(candidate).ok_or_else(|| {
                    OpsError::schema(candidate.name(), "shape was not compiled at start-up")
                })?;
                nodes.push(node.clone());
            }
        }
        union(nodes).map(|node| Some(envelope_schema(node)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::errors;
    use crate::schema::{ResultShape, Variant};

    struct Message;

    impl ResultShape for Message {
        const NAME: &'static str = "Message";

        fn shape() -> Shape {
            Shape::object([Field::string("message")])
        }
    }

    struct Counted;

    impl ResultShape for Counted {
        const NAME: &'static str = "Counted";

        fn shape() -> Shape {
            Shape::object([
                Field::integer("count"),
                Field::string("note").optional(),
                Field::array("items", FieldType::nested::<Message>()),
            ])
        }
    }

    struct FieldInfo;

    impl ResultShape for FieldInfo {
        const NAME: &'static str = "FieldInfo";

        fn shape() -> Shape {
            Shape::polymorphic(
                "type",
                [Field::integer("index"), Field::string("code")],
                [
                    Variant::new("date", [Field::string("format")]),
                    Variant::new("page", [Field::integer("page"), Field::boolean("total")]),
                    Variant::new("merge", [Field::string("name").optional()]),
                ],
            )
        }
    }

    struct TreeNode;

    impl ResultShape for TreeNode {
        const NAME: &'static str = "TreeNode";

        fn shape() -> Shape {
            Shape::object([
                Field::string("label"),
                Field::array("children", FieldType::nested::<TreeNode>()),
            ])
        }
    }

    struct Chapter;

    impl ResultShape for Chapter {
        const NAME: &'static str = "Chapter";

        fn shape() -> Shape {
            Shape::object([
                Field::string("title"),
                Field::array("notes", FieldType::nested::<Footnote>()),
            ])
        }
    }

    struct Footnote;

    impl ResultShape for Footnote {
        const NAME: &'static str = "Footnote";

        fn shape() -> Shape {
            Shape::object([
                Field::string("body"),
                Field::new("chapter", FieldType::nested::<Chapter>()),
            ])
        }
    }

    struct DuplicateTags;

    impl ResultShape for DuplicateTags {
        const NAME: &'static str = "DuplicateTags";

        fn shape() -> Shape {
            Shape::polymorphic(
                "kind",
                Vec::new(),
                [Variant::new("a", Vec::new()), Variant::new("a", Vec::new())],
            )
        }
    }

    struct Clashing;

    impl ResultShape for Clashing {
        const NAME: &'static str = "Clashing";

        fn shape() -> Shape {
            Shape::polymorphic(
                "kind",
                [Field::string("kind")],
                [Variant::new("a", Vec::new())],
            )
        }
    }

    struct NoVariants;

    impl ResultShape for NoVariants {
        const NAME: &'static str = "NoVariants";

        fn shape() -> Shape {
            Shape::polymorphic("kind", [Field::string("id")], Vec::new())
        }
    }

    struct Twice;

    impl ResultShape for Twice {
        const NAME: &'static str = "Twice";

        fn shape() -> Shape {
            Shape::object([Field::string("id"), Field::integer("id")])
        }
    }

    fn compile<T: ResultShape>() -> Result<Value> {
        SchemaSynthesizer::new().compile(ShapeRef::of::<T>())
    }

    #[test]
    fn plain_shape_lists_members() {
        let node = compile::<Message>().expect("schema");
        assert_eq!(node["type"], "object");
        assert_eq!(node["properties"], json!({ "message": { "type": "string" } }));
        assert_eq!(node["required"], json!(["message"]));
    }

    #[test]
    fn optional_members_are_not_required() {
        let node = compile::<Counted>().expect("schema");
        let required = node["required"].as_array().expect("required");
        assert!(required.contains(&json!("count")));
        assert!(required.contains(&json!("items")));
        assert!(!required.contains(&json!("note")));
        assert_eq!(node["properties"]["note"], json!({ "type": "string" }));
        assert_eq!(node["properties"]["items"]["type"], "array");
        assert_eq!(
            node["properties"]["items"]["items"]["properties"]["message"]["type"],
            "string"
        );
    }

    #[test]
    fn polymorphic_shape_fans_out_per_variant() {
        let node = compile::<FieldInfo>().expect("schema");
        let one_of = node["oneOf"].as_array().expect("oneOf");
        assert_eq!(one_of.len(), 3);

        let tags: Vec<_> = one_of
            .iter()
            .map(|variant| variant["properties"]["type"]["const"].clone())
            .collect();
        assert_eq!(tags, vec![json!("date"), json!("page"), json!("merge")]);

        for variant in one_of {
            let properties = variant["properties"].as_object().expect("properties");
            assert!(properties.contains_key("index"));
            assert!(properties.contains_key("code"));
            let required = variant["required"].as_array().expect("required");
            assert!(required.contains(&json!("type")));
        }
        assert!(one_of[1]["properties"].get("page").is_some());
        assert!(one_of[1]["properties"].get("format").is_none());
        assert!(
            !one_of[2]["required"]
                .as_array()
                .expect("required")
                .contains(&json!("name"))
        );
    }

    #[test]
    fn polymorphic_output_is_stable() {
        let first = compile::<FieldInfo>().expect("schema");
        let second = compile::<FieldInfo>().expect("schema");
        assert_eq!(first, second);
    }

    #[test]
    fn single_candidate_is_emitted_directly() {
        let mut synthesizer = SchemaSynthesizer::new();
        let node = synthesizer
            .family(&[ShapeRef::of::<Message>()])
            .expect("schema");
        assert!(node.get("oneOf").is_none());
        assert_eq!(node["type"], "object");
    }

    #[test]
    fn several_candidates_become_one_of() {
        let mut synthesizer = SchemaSynthesizer::new();
        let node = synthesizer
            .family(&[ShapeRef::of::<Message>(), ShapeRef::of::<Counted>()])
            .expect("schema");
        assert_eq!(node["oneOf"].as_array().expect("oneOf").len(), 2);
    }

    #[test]
    fn empty_candidate_list_is_rejected() {
        let err = SchemaSynthesizer::new().family(&[]).expect_err("error");
        assert_eq!(err.kind(), errors::INVALID_INPUT);
    }

    #[test]
    fn self_reference_terminates() {
        let node = compile::<TreeNode>().expect("schema");
        assert_eq!(
            node["properties"]["children"]["items"],
            json!({ "type": "object", "title": "TreeNode" })
        );
    }

    #[test]
    fn mutual_references_terminate() {
        let mut synthesizer = SchemaSynthesizer::new();
        let chapter = synthesizer
            .compile(ShapeRef::of::<Chapter>())
            .expect("schema");
        let footnote = &chapter["properties"]["notes"]["items"];
        assert_eq!(footnote["title"], "Footnote");
        assert_eq!(
            footnote["properties"]["chapter"],
            json!({ "type": "object", "title": "Chapter" })
        );

        // Footnote was cached while Chapter was in progress.
        let cached = synthesizer
            .cached(&ShapeRef::of::<Footnote>())
            .expect("cached");
        assert_eq!(cached, footnote);
        let again = synthesizer
            .compile(ShapeRef::of::<Footnote>())
            .expect("schema");
        assert_eq!(&again, footnote);
    }

    #[test]
    fn shapes_are_memoized() {
        let mut synthesizer = SchemaSynthesizer::new();
        synthesizer.compile(ShapeRef::of::<Counted>()).expect("schema");
        assert!(synthesizer.cached(&ShapeRef::of::<Message>()).is_some());
        assert!(synthesizer.cached(&ShapeRef::of::<FieldInfo>()).is_none());
    }

    #[test]
    fn structural_violations_name_the_type() {
        for (err, type_name) in [
            (compile::<DuplicateTags>().expect_err("error"), "DuplicateTags"),
            (compile::<Clashing>().expect_err("error"), "Clashing"),
            (compile::<NoVariants>().expect_err("error"), "NoVariants"),
            (compile::<Twice>().expect_err("error"), "Twice"),
        ] {
            assert_eq!(err.kind(), errors::SCHEMA_GENERATION);
            assert!(err.to_string().contains(type_name));
        }
    }

    #[test]
    fn envelope_wraps_data_and_output() {
        let schema = envelope_schema(json!({ "type": "string" }));
        assert_eq!(schema["required"], json!(["data", "output"]));
        assert_eq!(schema["properties"]["data"], json!({ "type": "string" }));
        let output = schema["properties"]["output"]["properties"]
            .as_object()
            .expect("output properties");
        assert_eq!(output.len(), 3);
        assert_eq!(output["isSession"]["type"], "boolean");
    }
}
