//! Embeddable access-control rule engine.
//!
//! The host registers [`Rule`]s with an [`Engine`] and asks whether an action
//! on a resource is allowed for a given [`Context`]. Conditions are judged by
//! pluggable [`ConditionEvaluator`]s selected by the condition's kind.
//!
//! ```
//! use rulegate::{attributes, Condition, ConditionKind, Context, Effect, Engine, Operator, Rule};
//! use serde_json::json;
//!
//! let engine = Engine::new();
//! engine.add_rule(
//!     Rule::new()
//!         .with_id("doc-access")
//!         .for_resource("documents")
//!         .with_action("read")
//!         .with_effect(Effect::Allow)
//!         .with_structured_condition(
//!             "userRole",
//!             Condition::new(ConditionKind::Role, Operator::In, vec!["admin", "editor"])
//!                 .with_message("Must be admin or editor"),
//!         ),
//! )?;
//!
//! let ctx = Context::new().with_user(attributes(vec![
//!     ("id", json!("user123")),
//!     ("roles", json!(["admin"])),
//! ]));
//!
//! assert!(engine.is_allowed("documents", "read", &ctx)?);
//! assert!(!engine.is_allowed("documents", "delete", &ctx)?);
//! # Ok::<(), rulegate::Error>(())
//! ```
#![deny(rust_2018_idioms, warnings)]
#![deny(clippy::all, clippy::pedantic)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::new_without_default
)]
mod condition;
mod context;
mod engine;
mod errors;
mod evaluator;
mod rule;
mod validator;

pub use condition::{Condition, ConditionKind, ConditionValue, Operator};
pub use context::{attributes, Attributes, Context, Scope};
pub use engine::{Decision, DenyReason, Engine, EngineBuilder};
pub use errors::{
    Error, Result, DESERIALIZING_ERROR, EVALUATION_ERROR, INVALID_CONDITION, INVALID_CONTEXT,
    INVALID_RULE,
};
pub use evaluator::{
    BasicEvaluator, ConditionEvaluator, EvaluatorRegistry, OwnershipEvaluator, PatternEvaluator,
    RoleEvaluator,
};
pub use rule::{Effect, Rule, RuleType, Severity, WILDCARD};
pub use validator::{DefaultValidator, RequireId, RuleValidator};
