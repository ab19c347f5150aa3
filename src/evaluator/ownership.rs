use super::ConditionEvaluator;
use crate::{Condition, Context, Result};

/// Succeeds when `user.id` equals `resource.owner`.
///
/// Ownership that cannot be proven, because either key is absent or null,
/// is an unmet condition rather than an error.
#[derive(Debug, Default)]
pub struct OwnershipEvaluator;

impl ConditionEvaluator for OwnershipEvaluator {
    fn evaluate(&self, _condition: &Condition, context: &Context) -> Result<bool> {
        let user_id = context.user().get("id").filter(|id| !id.is_null());
        let owner = context.resource().get("owner").filter(|owner| !owner.is_null());

        Ok(match (user_id, owner) {
            (Some(id), Some(owner)) => id == owner,
            _ => false,
        })
    }
}
