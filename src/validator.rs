use crate::{errors::Result, Rule};

/// Host-defined validation applied to every rule at registration, after
/// the built-in structural checks have passed.
pub trait RuleValidator: Send + Sync {
    fn validate(&self, rule: &Rule) -> Result<()>;
}

/// Accepts every structurally valid rule.
#[derive(Debug, Default)]
pub struct DefaultValidator;

impl RuleValidator for DefaultValidator {
    fn validate(&self, _rule: &Rule) -> Result<()> {
        Ok(())
    }
}

/// Rejects rules without an id, for hosts that audit decisions by rule id.
#[derive(Debug, Default)]
pub struct RequireId;

impl RuleValidator for RequireId {
    fn validate(&self, rule: &Rule) -> Result<()> {
        if rule.id.is_empty() {
            return Err(crate::Error::InvalidRule("id is required".into()));
        }
        Ok(())
    }
}
