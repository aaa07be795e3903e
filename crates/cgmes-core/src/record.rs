//! Generic attribute records and the query seam that supplies them.
//!
//! A [`PropertyBag`] is one row of a relation: an ordered mapping from
//! attribute name to a loosely typed [`PropertyValue`]. All objects of one
//! kind (every `Terminal`, every `TransformerEnd`, ...) come back from a
//! [`RecordQuery`] as [`PropertyBags`].
//!
//! The relation engine that turns RDF content into records lives outside this
//! crate; [`InMemoryRecords`] is the in-process implementation used when the
//! records are already at hand.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use serde::Serialize;

use crate::subset::CgmesSubset;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    String(String),
    Number(f64),
    Boolean(bool),
    /// Reference to another object, usually a URI or `#_id` fragment
    Identifier(String),
}

impl PropertyValue {
    pub fn id(value: impl Into<String>) -> Self {
        PropertyValue::Identifier(value.into())
    }

    /// Textual form, whatever the underlying variant.
    pub fn as_text(&self) -> String {
        match self {
            PropertyValue::String(s) | PropertyValue::Identifier(s) => s.clone(),
            PropertyValue::Number(n) => n.to_string(),
            PropertyValue::Boolean(b) => b.to_string(),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Number(value as f64)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Boolean(value)
    }
}

/// One record: attribute name to value, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PropertyBag {
    values: IndexMap<String, PropertyValue>,
}

pub type PropertyBags = Vec<PropertyBag>;

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    pub fn with(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.put(name, value);
        self
    }

    pub fn put(&mut self, name: &str, value: impl Into<PropertyValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw text of an attribute.
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).map(PropertyValue::as_text)
    }

    /// Object identity held in an attribute: the fragment after the last `#`,
    /// or the whole value when it carries no fragment.
    pub fn id(&self, name: &str) -> Option<String> {
        let text = self.text(name)?;
        let id = match text.rfind('#') {
            Some(pos) => &text[pos + 1..],
            None => text.as_str(),
        };
        if id.is_empty() {
            None
        } else {
            Some(id.to_string())
        }
    }

    /// Local name of a URI-valued attribute (enumeration literals such as
    /// `http://iec.ch/TC57/2013/CIM-schema-cim16#WindingType.primary`).
    pub fn local(&self, name: &str) -> Option<String> {
        self.id(name)
    }

    pub fn as_f64(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            PropertyValue::Number(n) => Some(*n),
            PropertyValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_i64(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            PropertyValue::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            PropertyValue::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            PropertyValue::Boolean(b) => Some(*b),
            PropertyValue::String(s) => match s.trim() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Seam to the relation-query engine: all records of one kind, in engine order.
pub trait RecordQuery: Send + Sync {
    /// Records of `kind` (a CIM class name such as `"Terminal"`).
    fn records(&self, kind: &str) -> PropertyBags;

    /// Add records of `kind` to the given subset.
    fn add(&mut self, subset: CgmesSubset, kind: &str, records: PropertyBags);

    /// Remove every record contributed by `subset`.
    fn clear(&mut self, subset: CgmesSubset);
}

/// Records held in memory, partitioned by subset so a subset can be cleared.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecords {
    subsets: BTreeMap<CgmesSubset, HashMap<String, PropertyBags>>,
}

impl InMemoryRecords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, subset: CgmesSubset, kind: &str, records: PropertyBags) -> Self {
        self.add(subset, kind, records);
        self
    }
}

impl RecordQuery for InMemoryRecords {
    fn records(&self, kind: &str) -> PropertyBags {
        self.subsets
            .values()
            .filter_map(|kinds| kinds.get(kind))
            .flatten()
            .cloned()
            .collect()
    }

    fn add(&mut self, subset: CgmesSubset, kind: &str, records: PropertyBags) {
        self.subsets
            .entry(subset)
            .or_default()
            .entry(kind.to_string())
            .or_default()
            .extend(records);
    }

    fn clear(&mut self, subset: CgmesSubset) {
        self.subsets.remove(&subset);
    }
}
