//! Frontmatter property model
//!
//! Frontmatter arrives from the host as `serde_json::Value` and is converted
//! exactly once into a tagged [`PropertyValue`]:
//!
//! - String → `Scalar`
//! - Array → `List` (non-string elements dropped)
//! - anything else → `Other`
//!
//! Both the match engine and the aggregators read frontmatter through this
//! one conversion, so there is a single place that decides what counts as a
//! usable string value.

use serde_json::Value;
use std::collections::HashMap;

/// A single frontmatter value in its usable form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// One string value
    Scalar(String),
    /// A list of string values, in frontmatter order
    List(Vec<String>),
    /// Numbers, booleans, nested objects, null — never matchable
    Other,
}

impl PropertyValue {
    /// Convert a raw frontmatter value into its tagged form.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => PropertyValue::Scalar(s.clone()),
            Value::Array(items) => PropertyValue::List(
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_owned))
                    .collect(),
            ),
            _ => PropertyValue::Other,
        }
    }

    /// The string values carried by this property, in order.
    ///
    /// A scalar yields one value, a list yields its elements, `Other` yields
    /// nothing.
    pub fn strings(&self) -> &[String] {
        match self {
            PropertyValue::Scalar(s) => std::slice::from_ref(s),
            PropertyValue::List(items) => items,
            PropertyValue::Other => &[],
        }
    }

    /// First string value, if any.
    pub fn first_string(&self) -> Option<&str> {
        self.strings().first().map(String::as_str)
    }
}

/// A note's frontmatter after conversion
pub type PropertyMap = HashMap<String, PropertyValue>;

/// Convert a whole frontmatter map in one pass.
pub fn property_map(frontmatter: &HashMap<String, Value>) -> PropertyMap {
    frontmatter
        .iter()
        .map(|(key, value)| (key.clone(), PropertyValue::from_json(value)))
        .collect()
}
