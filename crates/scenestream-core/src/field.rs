//! Typed data fields
//!
//! A field is a named, indexable sequence of values owned by an object.
//! Consumers never see the concrete storage: they ask for the four type
//! facets, the stride and the length, then read values by flat index.

use serde::{Deserialize, Serialize};

/// Type facets of a data field
///
/// The facets are independent: a field can be a container of integers,
/// a single scalar, a piece of text, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TypeInfo {
    /// The field is a sequence of elements
    pub is_container: bool,
    /// The field holds text
    pub is_text: bool,
    /// Elements are floating-point values
    pub is_scalar: bool,
    /// Elements are integer values
    pub is_integer: bool,
}

impl TypeInfo {
    /// Sequence of floating-point values
    pub fn scalar_container() -> Self {
        Self {
            is_container: true,
            is_scalar: true,
            ..Default::default()
        }
    }

    /// Sequence of integer values
    pub fn integer_container() -> Self {
        Self {
            is_container: true,
            is_integer: true,
            ..Default::default()
        }
    }

    /// Textual value
    pub fn text() -> Self {
        Self {
            is_text: true,
            ..Default::default()
        }
    }
}

/// Read-only view over a named field
///
/// `read_float` and `read_int` take a flat index in `0..len()`. Items are
/// `stride()` consecutive elements.
pub trait TypedField {
    /// Field name, e.g. `position` or `triangles`
    fn name(&self) -> &str;

    /// Type facets
    fn type_info(&self) -> TypeInfo;

    /// Components per logical item
    fn stride(&self) -> usize;

    /// Total element count
    fn len(&self) -> usize;

    /// Read a floating-point value at a flat index
    fn read_float(&self, index: usize) -> f64;

    /// Read an integer value at a flat index
    fn read_int(&self, index: usize) -> i64;

    /// Check if the field holds no elements
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of complete items (`len / stride`), zero when stride is zero
    fn item_count(&self) -> usize {
        match self.stride() {
            0 => 0,
            stride => self.len() / stride,
        }
    }
}

/// Storage of an owned field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValues {
    /// Flat sequence of floating-point values
    Scalars(Vec<f64>),
    /// Flat sequence of integer values
    Integers(Vec<i64>),
    /// Single floating-point value
    Scalar(f64),
    /// Single integer value
    Integer(i64),
    /// Text value
    Text(String),
}

/// Owned data field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataField {
    pub name: String,

    /// Components per logical item
    #[serde(default = "default_stride")]
    pub stride: usize,

    pub values: FieldValues,
}

fn default_stride() -> usize {
    1
}

impl DataField {
    /// Create a field from raw parts
    pub fn new(name: impl Into<String>, stride: usize, values: FieldValues) -> Self {
        Self {
            name: name.into(),
            stride,
            values,
        }
    }

    /// Container of floating-point values, `stride` per item
    pub fn scalars(name: impl Into<String>, stride: usize, values: Vec<f64>) -> Self {
        Self::new(name, stride, FieldValues::Scalars(values))
    }

    /// Container of integer values, `stride` per item
    pub fn integers(name: impl Into<String>, stride: usize, values: Vec<i64>) -> Self {
        Self::new(name, stride, FieldValues::Integers(values))
    }

    /// Text field
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, 1, FieldValues::Text(value.into()))
    }
}

impl TypedField for DataField {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_info(&self) -> TypeInfo {
        match &self.values {
            FieldValues::Scalars(_) => TypeInfo::scalar_container(),
            FieldValues::Integers(_) => TypeInfo::integer_container(),
            FieldValues::Scalar(_) => TypeInfo {
                is_scalar: true,
                ..Default::default()
            },
            FieldValues::Integer(_) => TypeInfo {
                is_integer: true,
                ..Default::default()
            },
            FieldValues::Text(_) => TypeInfo::text(),
        }
    }

    fn stride(&self) -> usize {
        self.stride
    }

    fn len(&self) -> usize {
        match &self.values {
            FieldValues::Scalars(values) => values.len(),
            FieldValues::Integers(values) => values.len(),
            FieldValues::Scalar(_) | FieldValues::Integer(_) | FieldValues::Text(_) => 1,
        }
    }

    fn read_float(&self, index: usize) -> f64 {
        match &self.values {
            FieldValues::Scalars(values) => values[index],
            FieldValues::Integers(values) => values[index] as f64,
            FieldValues::Scalar(value) => *value,
            FieldValues::Integer(value) => *value as f64,
            FieldValues::Text(_) => 0.0,
        }
    }

    fn read_int(&self, index: usize) -> i64 {
        match &self.values {
            FieldValues::Scalars(values) => values[index] as i64,
            FieldValues::Integers(values) => values[index],
            FieldValues::Scalar(value) => *value as i64,
            FieldValues::Integer(value) => *value,
            FieldValues::Text(_) => 0,
        }
    }
}
