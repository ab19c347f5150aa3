use super::{required_attribute, unsupported_operator, ConditionEvaluator};
use crate::{Condition, Context, Operator, Result, Scope};

/// Compares a single context attribute with the expected value.
///
/// Reads `user.value` unless built with [`BasicEvaluator::new`]. Only
/// `equals` and `notEquals` are supported.
#[derive(Debug)]
pub struct BasicEvaluator {
    scope: Scope,
    key: String,
}

impl BasicEvaluator {
    pub fn new(scope: Scope, key: impl Into<String>) -> Self {
        Self {
            scope,
            key: key.into(),
        }
    }
}

impl Default for BasicEvaluator {
    fn default() -> Self {
        Self::new(Scope::User, "value")
    }
}

impl ConditionEvaluator for BasicEvaluator {
    fn evaluate(&self, condition: &Condition, context: &Context) -> Result<bool> {
        let negate = match &condition.operator {
            Operator::Equals => false,
            Operator::NotEquals => true,
            other => return Err(unsupported_operator("basic", other)),
        };

        let actual = required_attribute(context, self.scope, &self.key)?;
        Ok((*actual == condition.value.to_json()) != negate)
    }
}
