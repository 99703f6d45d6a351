//! Values a descriptor can hold.

use std::any::Any;

use indexmap::IndexMap;

/// A scalar or array descriptor value.
///
/// Arrays come in two shapes: ordered lists and string-keyed maps. Anything
/// else (payload objects, handles, closures) is not a descriptor value.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum DescriptorValue {
    /// No value.
    #[default]
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text, usually a URI or a title.
    String(String),
    /// Ordered list.
    Array(Vec<DescriptorValue>),
    /// String-keyed map, in insertion order.
    Map(IndexMap<String, DescriptorValue>),
}

impl DescriptorValue {
    /// `true` for [`DescriptorValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, DescriptorValue::Null)
    }

    /// The boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DescriptorValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The integer, if this is one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DescriptorValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The number as a float; integers convert.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DescriptorValue::Float(f) => Some(*f),
            DescriptorValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// The text, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DescriptorValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The list items, if this is a list.
    pub fn as_array(&self) -> Option<&[DescriptorValue]> {
        match self {
            DescriptorValue::Array(items) => Some(items),
            _ => None,
        }
    }

    /// The entries, if this is a map.
    pub fn as_map(&self) -> Option<&IndexMap<String, DescriptorValue>> {
        match self {
            DescriptorValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Short name of the variant, for messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            DescriptorValue::Null => "null",
            DescriptorValue::Bool(_) => "boolean",
            DescriptorValue::Int(_) => "integer",
            DescriptorValue::Float(_) => "double",
            DescriptorValue::String(_) => "string",
            DescriptorValue::Array(_) | DescriptorValue::Map(_) => "array",
        }
    }

    /// Convert a dynamically typed value.
    ///
    /// Recognizes `()`, booleans, every integer width, floats, `String`,
    /// `&'static str`, [`DescriptorValue`], and `Vec<T>` or
    /// `IndexMap<String, T>` of any of those except `()`. Returns `None` for
    /// everything else.
    pub fn from_any(value: &dyn Any) -> Option<Self> {
        macro_rules! downcast {
            ($($ty:ty),*) => {$(
                if let Some(v) = value.downcast_ref::<$ty>() {
                    return Some(DescriptorValue::from(v.clone()));
                }
                if let Some(items) = value.downcast_ref::<Vec<$ty>>() {
                    return Some(items.iter().cloned().collect());
                }
                if let Some(map) = value.downcast_ref::<IndexMap<String, $ty>>() {
                    return Some(DescriptorValue::from(map.clone()));
                }
            )*};
        }

        if value.is::<()>() {
            return Some(DescriptorValue::Null);
        }
        downcast!(
            DescriptorValue,
            bool,
            i8,
            i16,
            i32,
            i64,
            isize,
            u8,
            u16,
            u32,
            u64,
            usize,
            f32,
            f64,
            String,
            &'static str
        );
        None
    }
}

impl From<bool> for DescriptorValue {
    fn from(value: bool) -> Self {
        DescriptorValue::Bool(value)
    }
}

macro_rules! from_int {
    ($($ty:ty),*) => {$(
        impl From<$ty> for DescriptorValue {
            fn from(value: $ty) -> Self {
                DescriptorValue::Int(i64::from(value))
            }
        }
    )*};
}

from_int!(i8, i16, i32, i64, u8, u16, u32);

// Integers past `i64::MAX` degrade to floats.
macro_rules! from_wide_int {
    ($($ty:ty),*) => {$(
        impl From<$ty> for DescriptorValue {
            fn from(value: $ty) -> Self {
                i64::try_from(value)
                    .map_or(DescriptorValue::Float(value as f64), DescriptorValue::Int)
            }
        }
    )*};
}

from_wide_int!(isize, u64, usize);

impl From<f32> for DescriptorValue {
    fn from(value: f32) -> Self {
        DescriptorValue::Float(f64::from(value))
    }
}

impl From<f64> for DescriptorValue {
    fn from(value: f64) -> Self {
        DescriptorValue::Float(value)
    }
}

impl From<&str> for DescriptorValue {
    fn from(value: &str) -> Self {
        DescriptorValue::String(value.to_string())
    }
}

impl From<String> for DescriptorValue {
    fn from(value: String) -> Self {
        DescriptorValue::String(value)
    }
}

impl<T: Into<DescriptorValue>> From<Vec<T>> for DescriptorValue {
    fn from(items: Vec<T>) -> Self {
        DescriptorValue::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<DescriptorValue>> From<Option<T>> for DescriptorValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(DescriptorValue::Null, Into::into)
    }
}

impl<T: Into<DescriptorValue>> From<IndexMap<String, T>> for DescriptorValue {
    fn from(map: IndexMap<String, T>) -> Self {
        DescriptorValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<DescriptorValue>> FromIterator<T> for DescriptorValue {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        DescriptorValue::Array(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Value> for DescriptorValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => DescriptorValue::Null,
            Value::Bool(b) => DescriptorValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => DescriptorValue::Int(i),
                None => n.as_f64().map_or(DescriptorValue::Null, DescriptorValue::Float),
            },
            Value::String(s) => DescriptorValue::String(s),
            Value::Array(items) => items.into_iter().collect(),
            Value::Object(map) => {
                DescriptorValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

#[cfg(feature = "serde")]
impl From<DescriptorValue> for serde_json::Value {
    fn from(value: DescriptorValue) -> Self {
        use serde_json::Value;
        match value {
            DescriptorValue::Null => Value::Null,
            DescriptorValue::Bool(b) => Value::Bool(b),
            DescriptorValue::Int(i) => Value::from(i),
            // Non-finite floats have no JSON form.
            DescriptorValue::Float(f) => {
                serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number)
            }
            DescriptorValue::String(s) => Value::String(s),
            DescriptorValue::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            DescriptorValue::Map(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}
