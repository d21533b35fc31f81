//! Result shape declarations and the JSON Schema synthesizer built on them.
//!
//! Every result type declares its structure next to its definition by
//! implementing [`ResultShape`]. Polymorphic results list their variants
//! explicitly, so the set is closed and checked when the catalog is built at
//! start-up rather than discovered at call time.

use std::any::TypeId;
use std::fmt;

mod synth;

pub use synth::SchemaCatalog;

pub trait ResultShape: 'static {
    const NAME: &'static str;

    fn shape() -> Shape;
}

/// Type-erased handle on a [`ResultShape`] implementor; identity is the
/// implementor's `TypeId`.
#[derive(Clone, Copy)]
pub struct ShapeRef {
    id: TypeId,
    name: &'static str,
    build: fn() -> Shape,
}

impl ShapeRef {
    pub fn of<T: ResultShape>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: T::NAME,
            build: T::shape,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn shape(&self) -> Shape {
        (self.build)()
    }
}

impl fmt::Debug for ShapeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ShapeRef").field(&self.name).finish()
    }
}

impl PartialEq for ShapeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ShapeRef {}

#[derive(Debug, Clone)]
pub enum Shape {
    Object(Vec<Field>),
    /// Base members shared by every variant, the name of the tag property and
    /// the closed list of variants in a stable order.
    Polymorphic {
        base: Vec<Field>,
        discriminator: &'static str,
        variants: Vec<Variant>,
    },
}

impl Shape {
    pub fn object(fields: impl IntoIterator<Item = Field>) -> Self {
        Shape::Object(fields.into_iter().collect())
    }

    pub fn polymorphic(
        discriminator: &'static str,
        base: impl IntoIterator<Item = Field>,
        variants: impl IntoIterator<Item = Variant>,
    ) -> Self {
        Shape::Polymorphic {
            base: base.into_iter().collect(),
            discriminator,
            variants: variants.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Variant {
    pub tag: &'static str,
    pub fields: Vec<Field>,
}

impl Variant {
    pub fn new(tag: &'static str, fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            tag,
            fields: fields.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
    pub optional: bool,
}

impl Field {
    pub fn new(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            optional: false,
        }
    }

    pub fn string(name: &'static str) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn integer(name: &'static str) -> Self {
        Self::new(name, FieldType::Integer)
    }

    pub fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub fn array(name: &'static str, items: FieldType) -> Self {
        Self::new(name, FieldType::Array(Box::new(items)))
    }

    /// Optional members must be skipped when absent on the wire
    /// (`skip_serializing_if = "Option::is_none"`), never written as null.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

#[derive(Debug, Clone)]
pub enum FieldType {
    String,
    Integer,
    Boolean,
    Array(Box<FieldType>),
    Nested(ShapeRef),
}

impl FieldType {
    pub fn nested<T: ResultShape>() -> Self {
        FieldType::Nested(ShapeRef::of::<T>())
    }
}

/// Candidate result shapes of one operation, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ResultFamily {
    candidates: Vec<ShapeRef>,
}

impl ResultFamily {
    pub fn new(candidates: Vec<ShapeRef>) -> Self {
        Self { candidates }
    }

    pub fn single<T: ResultShape>() -> Self {
        Self::new(vec![ShapeRef::of::<T>()])
    }

    pub fn or<T: ResultShape>(mut self) -> Self {
        self.candidates.push(ShapeRef::of::<T>());
        self
    }

    pub fn candidates(&self) -> &[ShapeRef] {
        &self.candidates
    }

    pub fn contains(&self, shape: &ShapeRef) -> bool {
        self.candidates.contains(shape)
    }
}
