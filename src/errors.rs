use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

pub const INVALID_RULE: &str = "INVALID_RULE";
pub const INVALID_CONTEXT: &str = "INVALID_CONTEXT";
pub const INVALID_CONDITION: &str = "INVALID_CONDITION";
pub const EVALUATION_ERROR: &str = "EVALUATION_ERROR";
pub const DESERIALIZING_ERROR: &str = "DESERIALIZING_ERROR";

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    #[error("invalid context: {0}")]
    InvalidContext(String),

    #[error(
        "invalid condition{}: {message}",
        .field.as_ref().map(|f| format!(" in field '{}'", f)).unwrap_or_default()
    )]
    InvalidCondition {
        field: Option<String>,
        message: String,
    },

    #[error(
        "evaluation error{}: {message}",
        .rule_id.as_ref().map(|id| format!(" for rule '{}'", id)).unwrap_or_default()
    )]
    Evaluation {
        rule_id: Option<String>,
        message: String,
    },

    #[error("an error occurred deserializing rule set: {0}")]
    Deserializing(#[source] serde_json::Error),
}

impl Error {
    pub fn invalid_condition(message: impl Into<String>) -> Self {
        Error::InvalidCondition {
            field: None,
            message: message.into(),
        }
    }

    pub fn invalid_condition_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidCondition {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Evaluation error not yet attributed to a rule. Evaluators return these;
    /// the engine tags them with the rule id before surfacing.
    pub fn evaluation(message: impl Into<String>) -> Self {
        Error::Evaluation {
            rule_id: None,
            message: message.into(),
        }
    }

    pub fn rule_evaluation(rule_id: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Evaluation {
            rule_id: Some(rule_id.into()),
            message: message.into(),
        }
    }

    /// Machine-checkable category of the error.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidRule(_) => INVALID_RULE,
            Error::InvalidContext(_) => INVALID_CONTEXT,
            Error::InvalidCondition { .. } => INVALID_CONDITION,
            Error::Evaluation { .. } => EVALUATION_ERROR,
            Error::Deserializing(_) => DESERIALIZING_ERROR,
        }
    }

    pub fn is_invalid_rule(&self) -> bool {
        matches!(self, Error::InvalidRule(_))
    }

    pub fn is_invalid_context(&self) -> bool {
        matches!(self, Error::InvalidContext(_))
    }

    pub fn is_invalid_condition(&self) -> bool {
        matches!(self, Error::InvalidCondition { .. })
    }

    pub fn is_evaluation(&self) -> bool {
        matches!(self, Error::Evaluation { .. })
    }
}
