use std::collections::HashMap;

use parking_lot::Mutex;
use regex::Regex;

use super::{required_attribute, unsupported_operator, ConditionEvaluator};
use crate::{Condition, Context, Error, Operator, Result, Scope};

/// Matches a string attribute against the expected pattern(s).
///
/// Reads `resource.name` unless built with [`PatternEvaluator::new`].
/// `matches` treats each expected value as a regular expression, `contains`
/// as a plain substring; either succeeds when any expected value hits.
#[derive(Debug)]
pub struct PatternEvaluator {
    scope: Scope,
    key: String,
    compiled: Mutex<HashMap<String, Regex>>,
}

impl PatternEvaluator {
    pub fn new(scope: Scope, key: impl Into<String>) -> Self {
        Self {
            scope,
            key: key.into(),
            compiled: Mutex::new(HashMap::new()),
        }
    }

    fn is_match(&self, pattern: &str, input: &str) -> Result<bool> {
        let mut compiled = self.compiled.lock();
        if let Some(regex) = compiled.get(pattern) {
            return Ok(regex.is_match(input));
        }

        let regex = Regex::new(pattern)
            .map_err(|e| Error::evaluation(format!("invalid pattern '{}': {}", pattern, e)))?;
        let matched = regex.is_match(input);
        compiled.insert(pattern.to_string(), regex);
        Ok(matched)
    }
}

impl Default for PatternEvaluator {
    fn default() -> Self {
        Self::new(Scope::Resource, "name")
    }
}

impl ConditionEvaluator for PatternEvaluator {
    fn evaluate(&self, condition: &Condition, context: &Context) -> Result<bool> {
        let patterns = condition.value.as_strings().ok_or_else(|| {
            Error::evaluation("pattern condition value must be a string or a list of strings")
        })?;

        let input = required_attribute(context, self.scope, &self.key)?
            .as_str()
            .ok_or_else(|| {
                Error::evaluation(format!(
                    "{}.{} must be a string",
                    self.scope.as_str(),
                    self.key
                ))
            })?;

        match &condition.operator {
            Operator::Matches => {
                for pattern in patterns {
                    if self.is_match(pattern, input)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Operator::Contains => Ok(patterns.iter().any(|pattern| input.contains(pattern))),
            other => Err(unsupported_operator("pattern", other)),
        }
    }
}
