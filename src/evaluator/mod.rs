mod basic;
mod ownership;
mod pattern;
mod role;

pub use basic::BasicEvaluator;
pub use ownership::OwnershipEvaluator;
pub use pattern::PatternEvaluator;
pub use role::RoleEvaluator;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::debug;

use crate::{Condition, ConditionKind, Context, Error, Operator, Result, Scope};

/// Judges one condition against an evaluation context.
///
/// `Ok(false)` means the condition is legitimately unmet. `Err` means no
/// determination could be made (missing or malformed attribute, unsupported
/// operator) and aborts the whole decision.
pub trait ConditionEvaluator: Send + Sync {
    fn evaluate(&self, condition: &Condition, context: &Context) -> Result<bool>;
}

impl<F> ConditionEvaluator for F
where
    F: Fn(&Condition, &Context) -> Result<bool> + Send + Sync,
{
    fn evaluate(&self, condition: &Condition, context: &Context) -> Result<bool> {
        self(condition, context)
    }
}

/// Maps condition kinds to evaluators.
///
/// Each entry is an `Arc`, so a lookup racing a `register` observes either
/// the previous or the new evaluator, never a partial one.
pub struct EvaluatorRegistry {
    evaluators: RwLock<HashMap<ConditionKind, Arc<dyn ConditionEvaluator>>>,
}

impl EvaluatorRegistry {
    pub fn empty() -> Self {
        Self {
            evaluators: RwLock::new(HashMap::new()),
        }
    }

    /// Registry with `basic`, `role`, `custom` (resource ownership) and
    /// `regex` evaluators. `k8s` is left unregistered.
    pub fn with_builtins() -> Self {
        let registry = Self::empty();
        registry.register(ConditionKind::Basic, BasicEvaluator::default());
        registry.register(ConditionKind::Role, RoleEvaluator);
        registry.register(ConditionKind::Custom, OwnershipEvaluator);
        registry.register(ConditionKind::Pattern, PatternEvaluator::default());
        registry
    }

    /// Registers `evaluator` for `kind`, replacing any previous one.
    pub fn register<E>(&self, kind: ConditionKind, evaluator: E)
    where
        E: ConditionEvaluator + 'static,
    {
        self.register_shared(kind, Arc::new(evaluator));
    }

    pub fn register_shared(&self, kind: ConditionKind, evaluator: Arc<dyn ConditionEvaluator>) {
        debug!(kind = %kind, "registering condition evaluator");
        self.evaluators.write().insert(kind, evaluator);
    }

    pub fn lookup(&self, kind: &ConditionKind) -> Option<Arc<dyn ConditionEvaluator>> {
        self.evaluators.read().get(kind).cloned()
    }

    pub fn contains(&self, kind: &ConditionKind) -> bool {
        self.evaluators.read().contains_key(kind)
    }

    pub fn kinds(&self) -> Vec<ConditionKind> {
        self.evaluators.read().keys().cloned().collect()
    }
}

impl Default for EvaluatorRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for EvaluatorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<String> = self.kinds().into_iter().map(String::from).collect();
        kinds.sort();
        f.debug_struct("EvaluatorRegistry")
            .field("kinds", &kinds)
            .finish()
    }
}

fn unsupported_operator(evaluator: &str, operator: &Operator) -> Error {
    Error::evaluation(format!(
        "{} evaluator does not support operator '{}'",
        evaluator, operator
    ))
}

fn required_attribute<'a>(context: &'a Context, scope: Scope, key: &str) -> Result<&'a Value> {
    context.attribute(scope, key).ok_or_else(|| {
        Error::evaluation(format!("{}.{} not found in context", scope.as_str(), key))
    })
}
