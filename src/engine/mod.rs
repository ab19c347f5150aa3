mod builder;
pub use builder::EngineBuilder;

use parking_lot::RwLock;
use tracing::{debug, trace, warn};

use crate::errors::Result;
use crate::{
    ConditionEvaluator, ConditionKind, Context, DefaultValidator, Effect, Error,
    EvaluatorRegistry, Rule, RuleValidator,
};

/// Access-control engine. Owns a set of validated rules and the evaluators
/// used to judge their conditions.
///
/// Decisions are conjunctive over all matching rules:
/// - no matching rule denies (default deny);
/// - a matching rule with an unmet condition denies;
/// - a matching deny rule with all conditions met denies;
/// - any evaluation error aborts the decision with that error.
///
/// Only when every matching rule is satisfied and allows is the request allowed.
/// The engine is `Send + Sync`; share it behind an `Arc`.
#[derive(Debug)]
pub struct Engine<V = DefaultValidator> {
    rules: RwLock<Vec<Rule>>,
    evaluators: EvaluatorRegistry,
    validator: V,
}

impl Engine<DefaultValidator> {
    /// Engine with the built-in evaluators and no rules.
    pub fn new() -> Self {
        Self::from_parts(Vec::new(), EvaluatorRegistry::with_builtins(), DefaultValidator)
    }

    pub fn builder() -> EngineBuilder<DefaultValidator> {
        EngineBuilder::new()
    }
}

impl Default for Engine<DefaultValidator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Engine<V>
where
    V: RuleValidator,
{
    fn from_parts(rules: Vec<Rule>, evaluators: EvaluatorRegistry, validator: V) -> Self {
        Self {
            rules: RwLock::new(rules),
            evaluators,
            validator,
        }
    }

    /// Validates and registers a rule. On error the engine is left unchanged.
    pub fn add_rule(&self, rule: Rule) -> Result<()> {
        self.validate(&rule)?;

        debug!(
            rule_id = %rule.id,
            resource = %rule.resource,
            action = %rule.action,
            effect = ?rule.effect,
            "registering rule"
        );
        self.rules.write().push(rule);
        Ok(())
    }

    /// Registers several rules at once. Either all of them are added or,
    /// if any is invalid, none is.
    pub fn add_rules<I>(&self, rules: I) -> Result<()>
    where
        I: IntoIterator<Item = Rule>,
    {
        let rules: Vec<Rule> = rules.into_iter().collect();
        for rule in &rules {
            self.validate(rule)?;
        }

        debug!(count = rules.len(), "registering rules");
        self.rules.write().extend(rules);
        Ok(())
    }

    /// Registers `evaluator` for `kind`, replacing any previous one.
    /// Decisions already in flight keep the evaluator they looked up.
    pub fn register_evaluator<E>(&self, kind: impl Into<ConditionKind>, evaluator: E)
    where
        E: ConditionEvaluator + 'static,
    {
        self.evaluators.register(kind.into(), evaluator);
    }

    pub fn evaluators(&self) -> &EvaluatorRegistry {
        &self.evaluators
    }

    /// Snapshot of the registered rules in insertion order.
    pub fn rules(&self) -> Vec<Rule> {
        self.rules.read().clone()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.read().len()
    }

    /// Decides whether `action` on `resource` is permitted for `context`.
    ///
    /// Returns `Ok(false)` when access is denied and `Err` when the decision
    /// could not be made. An error never means "allowed".
    pub fn is_allowed<'a>(
        &self,
        resource: &str,
        action: &str,
        context: impl Into<Option<&'a Context>>,
    ) -> Result<bool> {
        self.decide(resource, action, context)
            .map(|decision| decision.is_allowed())
    }

    /// Same as `is_allowed`, but explains a denial.
    pub fn decide<'a>(
        &self,
        resource: &str,
        action: &str,
        context: impl Into<Option<&'a Context>>,
    ) -> Result<Decision> {
        let context: Option<&Context> = context.into();
        let context = context.ok_or_else(|| Error::InvalidContext("context is required".into()))?;

        let rules = self.rules.read();
        let mut matched = 0_usize;

        for rule in rules.iter().filter(|rule| rule.matches(resource, action)) {
            matched += 1;
            let outcome = self.evaluate_rule(rule, context).map_err(|e| {
                warn!(resource, action, rule_id = %rule.id, error = %e, "decision aborted");
                e
            })?;

            if let Some(reason) = outcome {
                debug!(resource, action, reason = ?reason, "access denied");
                return Ok(Decision::Denied(reason));
            }
        }

        if matched == 0 {
            debug!(resource, action, "no matching rule, access denied");
            return Ok(Decision::Denied(DenyReason::NoMatchingRule));
        }

        debug!(resource, action, rules = matched, "access allowed");
        Ok(Decision::Allowed)
    }

    fn validate(&self, rule: &Rule) -> Result<()> {
        rule.validate()?;
        self.validator.validate(rule)
    }

    /// `Ok(None)` when the rule is satisfied and allows, otherwise the
    /// reason it denies.
    fn evaluate_rule(&self, rule: &Rule, context: &Context) -> Result<Option<DenyReason>> {
        for (key, condition) in &rule.conditions {
            let evaluator = self.evaluators.lookup(&condition.kind).ok_or_else(|| {
                rule_error(
                    &rule.id,
                    format!(
                        "condition '{}': no evaluator registered for type '{}'",
                        key, condition.kind
                    ),
                )
            })?;

            let matched = evaluator
                .evaluate(condition, context)
                .map_err(|e| condition_error(e, &rule.id, key))?;

            trace!(rule_id = %rule.id, condition = %key, matched, "condition evaluated");

            if !matched {
                return Ok(Some(DenyReason::ConditionNotMet {
                    rule_id: rule.id.clone(),
                    condition: key.clone(),
                    message: condition.message.clone(),
                }));
            }
        }

        match rule.effect {
            Effect::Allow => Ok(None),
            Effect::Deny => Ok(Some(DenyReason::DenyRule {
                rule_id: rule.id.clone(),
            })),
        }
    }
}

fn rule_error(rule_id: &str, message: String) -> Error {
    Error::Evaluation {
        rule_id: Some(rule_id.to_string()).filter(|id| !id.is_empty()),
        message,
    }
}

fn condition_error(error: Error, rule_id: &str, key: &str) -> Error {
    let message = match error {
        Error::Evaluation { message, .. } => message,
        other => other.to_string(),
    };
    rule_error(rule_id, format!("condition '{}': {}", key, message))
}

/// Outcome of a decision.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    Allowed,
    Denied(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }
}

/// Why a request was denied. When several matching rules would deny, the
/// first one in registration order is reported.
#[derive(Debug, Clone, PartialEq)]
pub enum DenyReason {
    NoMatchingRule,
    DenyRule {
        rule_id: String,
    },
    ConditionNotMet {
        rule_id: String,
        condition: String,
        message: Option<String>,
    },
}
