use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{Error, Result};

/// Selects which evaluator handles a condition.
///
/// Unknown tags are kept verbatim in `Other` so hosts can register
/// evaluators for kinds of their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ConditionKind {
    Basic,
    Role,
    Platform,
    Pattern,
    Custom,
    Other(String),
}

impl ConditionKind {
    pub fn as_str(&self) -> &str {
        match self {
            ConditionKind::Basic => "basic",
            ConditionKind::Role => "role",
            ConditionKind::Platform => "k8s",
            ConditionKind::Pattern => "regex",
            ConditionKind::Custom => "custom",
            ConditionKind::Other(tag) => tag,
        }
    }
}

impl From<&str> for ConditionKind {
    fn from(tag: &str) -> Self {
        match tag {
            "basic" => ConditionKind::Basic,
            "role" => ConditionKind::Role,
            "k8s" => ConditionKind::Platform,
            "regex" => ConditionKind::Pattern,
            "custom" => ConditionKind::Custom,
            other => ConditionKind::Other(other.to_string()),
        }
    }
}

impl From<String> for ConditionKind {
    fn from(tag: String) -> Self {
        ConditionKind::from(tag.as_str())
    }
}

impl From<ConditionKind> for String {
    fn from(kind: ConditionKind) -> Self {
        kind.as_str().to_string()
    }
}

impl Default for ConditionKind {
    fn default() -> Self {
        ConditionKind::Other(String::new())
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comparison an evaluator should perform. Evaluators support a subset
/// and reject the rest with an evaluation error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Equals,
    NotEquals,
    In,
    NotIn,
    Contains,
    Matches,
    Other(String),
}

impl Operator {
    pub fn as_str(&self) -> &str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "notEquals",
            Operator::In => "in",
            Operator::NotIn => "notIn",
            Operator::Contains => "contains",
            Operator::Matches => "matches",
            Operator::Other(tag) => tag,
        }
    }
}

impl From<&str> for Operator {
    fn from(tag: &str) -> Self {
        match tag {
            "equals" => Operator::Equals,
            "notEquals" => Operator::NotEquals,
            "in" => Operator::In,
            "notIn" => Operator::NotIn,
            "contains" => Operator::Contains,
            "matches" => Operator::Matches,
            other => Operator::Other(other.to_string()),
        }
    }
}

impl From<String> for Operator {
    fn from(tag: String) -> Self {
        Operator::from(tag.as_str())
    }
}

impl From<Operator> for String {
    fn from(operator: Operator) -> Self {
        operator.as_str().to_string()
    }
}

impl Default for Operator {
    fn default() -> Self {
        Operator::Other(String::new())
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Right-hand side of a condition.
///
/// Variant order matters for deserialization: an array of strings is tried
/// first, then a plain string, and anything else lands in `Structured`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    List(Vec<String>),
    Text(String),
    Structured(Value),
}

impl ConditionValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ConditionValue::Structured(Value::Null))
    }

    /// Expected values as a list of strings, if the value has that shape.
    /// A structured array qualifies only when every element is a string.
    pub fn as_strings(&self) -> Option<Vec<&str>> {
        match self {
            ConditionValue::Text(value) => Some(vec![value.as_str()]),
            ConditionValue::List(values) => Some(values.iter().map(String::as_str).collect()),
            ConditionValue::Structured(Value::String(value)) => Some(vec![value.as_str()]),
            ConditionValue::Structured(Value::Array(values)) => {
                values.iter().map(Value::as_str).collect()
            }
            ConditionValue::Structured(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ConditionValue::Text(value) => Value::String(value.clone()),
            ConditionValue::List(values) => {
                Value::Array(values.iter().cloned().map(Value::String).collect())
            }
            ConditionValue::Structured(value) => value.clone(),
        }
    }
}

impl Default for ConditionValue {
    fn default() -> Self {
        ConditionValue::Structured(Value::Null)
    }
}

impl From<&str> for ConditionValue {
    fn from(value: &str) -> Self {
        ConditionValue::Text(value.to_string())
    }
}

impl From<String> for ConditionValue {
    fn from(value: String) -> Self {
        ConditionValue::Text(value)
    }
}

impl From<Vec<String>> for ConditionValue {
    fn from(values: Vec<String>) -> Self {
        ConditionValue::List(values)
    }
}

impl From<Vec<&str>> for ConditionValue {
    fn from(values: Vec<&str>) -> Self {
        ConditionValue::List(values.into_iter().map(str::to_string).collect())
    }
}

impl From<bool> for ConditionValue {
    fn from(value: bool) -> Self {
        ConditionValue::Structured(Value::Bool(value))
    }
}

/// Strings and all-string arrays are stored as `Text` and `List`, the same
/// shapes deserialization produces for them.
impl From<Value> for ConditionValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => ConditionValue::Text(text),
            Value::Array(items) if items.iter().all(Value::is_string) => ConditionValue::List(
                items
                    .into_iter()
                    .filter_map(|item| match item {
                        Value::String(text) => Some(text),
                        _ => None,
                    })
                    .collect(),
            ),
            other => ConditionValue::Structured(other),
        }
    }
}

/// A single typed predicate a rule requires to hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type", default)]
    pub kind: ConditionKind,
    #[serde(rename = "operation", default)]
    pub operator: Operator,
    #[serde(default)]
    pub value: ConditionValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Condition {
    pub fn new(
        kind: impl Into<ConditionKind>,
        operator: impl Into<Operator>,
        value: impl Into<ConditionValue>,
    ) -> Self {
        Self {
            kind: kind.into(),
            operator: operator.into(),
            value: value.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.kind.as_str().is_empty() {
            return Err(Error::invalid_condition("condition type is required"));
        }
        if self.operator.as_str().is_empty() {
            return Err(Error::invalid_condition("condition operation is required"));
        }
        if self.value.is_null() {
            return Err(Error::invalid_condition("condition value is required"));
        }
        Ok(())
    }

    /// Same as `validate`, tagging the error with the key the condition is stored under.
    pub fn validate_field(&self, field: &str) -> Result<()> {
        self.validate().map_err(|e| match e {
            Error::InvalidCondition { message, .. } => Error::invalid_condition_field(field, message),
            other => other,
        })
    }
}
