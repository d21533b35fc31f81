use crate::error::{OpsError, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

/// Per-call view over the `arguments` object of a tool call.
///
/// Extraction is type-directed through [`FromParam`]; nothing is coerced
/// until a handler asks for a key, so validation errors always name the key
/// the handler was reading.
#[derive(Debug, Clone, Default)]
pub struct ParameterBag {
    values: Map<String, Value>,
}

impl ParameterBag {
    pub fn new(values: Map<String, Value>) -> Self {
        Self { values }
    }

    pub fn from_arguments(arguments: &Value) -> Result<Self> {
        match arguments {
            Value::Null => Ok(Self::default()),
            Value::Object(map) => Ok(Self::new(map.clone())),
            _ => Err(OpsError::validation(
                "arguments",
                "arguments must be an object",
            )),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// `None` when the key is absent; a present key must coerce to `T`.
    pub fn get<T: FromParam>(&self, key: &str) -> Result<Option<T>> {
        let Some(value) = self.values.get(key) else {
            return Ok(None);
        };
        if value.is_null() {
            return Err(OpsError::parameter(key, "must not be null"));
        }
        T::from_param(value).map(Some).ok_or_else(|| {
            OpsError::parameter(
                key,
                format!("expected {}, got {}", T::EXPECTED, describe(value)),
            )
        })
    }

    pub fn get_required<T: FromParam>(&self, key: &str) -> Result<T> {
        self.get(key)?
            .ok_or_else(|| OpsError::parameter(key, "is required"))
    }

    pub fn get_optional<T: FromParam>(&self, key: &str, default: T) -> Result<T> {
        Ok(self.get(key)?.unwrap_or(default))
    }
}

/// Explicit conversion from a wire value into a typed parameter.
///
/// Only exact JSON types convert, with one exception: numbers convert
/// between numeric targets when the value fits. A string `"true"` is not a
/// boolean and `"3"` is not a number.
pub trait FromParam: Sized {
    const EXPECTED: &'static str;

    fn from_param(value: &Value) -> Option<Self>;
}

impl FromParam for bool {
    const EXPECTED: &'static str = "a boolean";

    fn from_param(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromParam for String {
    const EXPECTED: &'static str = "a string";

    fn from_param(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

fn integral(number: &Number) -> Option<i128> {
    if let Some(value) = number.as_i64() {
        return Some(i128::from(value));
    }
    if let Some(value) = number.as_u64() {
        return Some(i128::from(value));
    }
    let value = number.as_f64()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e38 {
        Some(value as i128)
    } else {
        None
    }
}

macro_rules! integer_param {
    ($($ty:ty => $expected:literal),* $(,)?) => {
        $(
            impl FromParam for $ty {
                const EXPECTED: &'static str = $expected;

                fn from_param(value: &Value) -> Option<Self> {
                    let Value::Number(number) = value else {
                        return None;
                    };
                    <$ty>::try_from(integral(number)?).ok()
                }
            }
        )*
    };
}

integer_param! {
    i32 => "a 32-bit integer",
    i64 => "an integer",
    u32 => "a non-negative 32-bit integer",
    u64 => "a non-negative integer",
    usize => "a non-negative integer",
}

impl FromParam for f64 {
    const EXPECTED: &'static str = "a number";

    fn from_param(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromParam for f32 {
    const EXPECTED: &'static str = "a number";

    fn from_param(value: &Value) -> Option<Self> {
        let narrowed = value.as_f64()? as f32;
        narrowed.is_finite().then_some(narrowed)
    }
}

impl<T: FromParam> FromParam for Vec<T> {
    const EXPECTED: &'static str = "an array";

    fn from_param(value: &Value) -> Option<Self> {
        value.as_array()?.iter().map(T::from_param).collect()
    }
}

/// A structured parameter decoded from a JSON object into `T`'s own shape.
// None of the document operations take an object parameter yet.
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub struct Nested<T>(pub T);

impl<T: DeserializeOwned> FromParam for Nested<T> {
    const EXPECTED: &'static str = "an object of the declared shape";

    fn from_param(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok().map(Nested)
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
