//! Untyped parameter maps and runtime kind classification.

use serde_yaml::Value;
use std::collections::BTreeMap;

/// String-keyed parameter mapping with deterministic iteration order.
pub type ParameterMap = BTreeMap<String, Value>;

/// Runtime kind of a parameter value.
///
/// Integers are non-negative: every integral engine parameter is a count,
/// a size or a token id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamKind {
    Integer,
    Float,
    Bool,
    Text,
    Sequence(Box<ParamKind>),
    EmptySequence,
    Mapping,
    Null,
    Other,
}

impl ParamKind {
    /// Classifies a YAML value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ParamKind::Null,
            Value::Bool(_) => ParamKind::Bool,
            Value::Number(n) if n.is_u64() => ParamKind::Integer,
            Value::Number(n) if n.is_f64() => ParamKind::Float,
            // negative integers
            Value::Number(_) => ParamKind::Other,
            Value::String(_) => ParamKind::Text,
            Value::Sequence(items) => match items.first() {
                None => ParamKind::EmptySequence,
                Some(first) => {
                    let kind = ParamKind::of(first);
                    if items.iter().all(|item| ParamKind::of(item) == kind) {
                        ParamKind::Sequence(Box::new(kind))
                    } else {
                        ParamKind::Other
                    }
                }
            },
            Value::Mapping(_) => ParamKind::Mapping,
            Value::Tagged(_) => ParamKind::Other,
        }
    }

    /// Whether a value of kind `self` may stand in for a default of kind `expected`.
    ///
    /// Integers widen to floats. A list default that has entries only accepts
    /// a list with entries; an empty list default accepts any list.
    pub fn accepts_as(&self, expected: &ParamKind) -> bool {
        match (self, expected) {
            (a, b) if a == b => !matches!(a, ParamKind::Other | ParamKind::Null),
            (ParamKind::Integer, ParamKind::Float) => true,
            (ParamKind::Sequence(_), ParamKind::EmptySequence) => true,
            (ParamKind::Sequence(actual), ParamKind::Sequence(inner)) => actual.accepts_as(inner),
            _ => false,
        }
    }

    /// Whether this is a plain scalar.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            ParamKind::Integer | ParamKind::Float | ParamKind::Bool | ParamKind::Text
        )
    }
}

/// Raw settings as parsed from the settings document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawConfig {
    entries: ParameterMap,
}

impl RawConfig {
    /// Creates a raw config from parsed entries.
    pub fn new(entries: ParameterMap) -> Self {
        Self { entries }
    }

    /// Creates an empty raw config.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Value)> for RawConfig {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Settings entries that passed shape and type validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedFields {
    entries: ParameterMap,
}

impl NormalizedFields {
    pub(crate) fn new(entries: ParameterMap) -> Self {
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &ParameterMap {
        &self.entries
    }

    pub fn into_entries(self) -> ParameterMap {
        self.entries
    }

    /// Reinterprets the fields as raw settings, e.g. to normalize them again.
    pub fn to_raw(&self) -> RawConfig {
        RawConfig::new(self.entries.clone())
    }
}
