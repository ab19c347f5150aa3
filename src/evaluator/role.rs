use serde_json::Value;

use super::{unsupported_operator, ConditionEvaluator};
use crate::{Condition, Context, Error, Operator, Result};

/// Checks the user's roles against the expected role(s).
///
/// Roles are read from `user.roles` (list of strings) or, failing that,
/// `user.role` (single string). `equals`/`in` succeed when any role is
/// expected; `notEquals`/`notIn` succeed when none is.
#[derive(Debug, Default)]
pub struct RoleEvaluator;

impl ConditionEvaluator for RoleEvaluator {
    fn evaluate(&self, condition: &Condition, context: &Context) -> Result<bool> {
        let negate = match &condition.operator {
            Operator::Equals | Operator::In => false,
            Operator::NotEquals | Operator::NotIn => true,
            other => return Err(unsupported_operator("role", other)),
        };

        let expected = condition.value.as_strings().ok_or_else(|| {
            Error::evaluation("role condition value must be a string or a list of strings")
        })?;

        let roles = user_roles(context)?;
        let found = roles.iter().any(|role| expected.contains(role));
        Ok(found != negate)
    }
}

fn user_roles(context: &Context) -> Result<Vec<&str>> {
    let user = context.user();

    if let Some(roles) = user.get("roles") {
        return match roles {
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .ok_or_else(|| Error::evaluation("user.roles must contain only strings"))
                })
                .collect(),
            _ => Err(Error::evaluation("user.roles must be a list of strings")),
        };
    }

    match user.get("role") {
        Some(Value::String(role)) => Ok(vec![role.as_str()]),
        Some(_) => Err(Error::evaluation("user.role must be a string")),
        None => Err(Error::evaluation("user role not found in context")),
    }
}
