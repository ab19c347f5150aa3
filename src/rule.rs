use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Condition, ConditionKind, ConditionValue, Error, Operator, Result};

/// Matches any value of the resource or action field.
pub const WILDCARD: &str = "*";

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    Kubernetes,
    Network,
    #[default]
    Resource,
    Custom,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
    #[default]
    Low,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    Allow,
    #[default]
    Deny,
}

/// An access rule: a resource/action matcher, an effect, and the conditions
/// that must all hold for the effect to apply.
///
/// Identity and metadata fields are carried for auditing only; matching and
/// evaluation look at `resource`, `action`, `effect` and `conditions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub rule_type: RuleType,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub effect: Effect,
    #[serde(default)]
    pub conditions: BTreeMap<String, Condition>,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Rule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_type(mut self, rule_type: RuleType) -> Self {
        self.rule_type = rule_type;
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn for_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = resource.into();
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effect = effect;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Shorthand for a basic `equals` condition.
    pub fn with_condition(self, key: impl Into<String>, value: impl Into<ConditionValue>) -> Self {
        self.with_structured_condition(
            key,
            Condition::new(ConditionKind::Basic, Operator::Equals, value),
        )
    }

    pub fn with_structured_condition(mut self, key: impl Into<String>, condition: Condition) -> Self {
        self.conditions.insert(key.into(), condition);
        self
    }

    /// Whether the rule applies to the given resource and action.
    /// `*` in either field matches any value for that field.
    pub fn matches(&self, resource: &str, action: &str) -> bool {
        (self.resource == resource || self.resource == WILDCARD)
            && (self.action == action || self.action == WILDCARD)
    }

    /// Structural validation run once at registration.
    pub fn validate(&self) -> Result<()> {
        if self.resource.is_empty() {
            return Err(Error::InvalidRule("resource is required".into()));
        }
        if self.action.is_empty() {
            return Err(Error::InvalidRule("action is required".into()));
        }
        for (key, condition) in &self.conditions {
            condition
                .validate_field(key)
                .map_err(|e| Error::InvalidRule(e.to_string()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use serde_json::json;
    use test_case::test_case;

    #[test]
    fn defaults() {
        let rule = Rule::new();
        assert_eq!(RuleType::Resource, rule.rule_type);
        assert_eq!(Severity::Low, rule.severity);
        assert_eq!(Effect::Deny, rule.effect);
        assert!(rule.conditions.is_empty());
        assert!(rule.metadata.is_empty());
    }

    #[test]
    fn with_condition_creates_basic_equals() {
        let rule = Rule::new().with_condition("userRole", "admin");
        assert_eq!(
            Some(&Condition::new(ConditionKind::Basic, Operator::Equals, "admin")),
            rule.conditions.get("userRole")
        );
    }

    #[test_case(Rule::new().for_resource("documents").with_action("read").with_effect(Effect::Allow), true ; "valid rule")]
    #[test_case(Rule::new().with_action("read").with_effect(Effect::Allow), false ; "missing resource")]
    #[test_case(Rule::new().for_resource("documents").with_effect(Effect::Allow), false ; "missing action")]
    #[test_case(
        Rule::new()
            .for_resource("documents")
            .with_action("read")
            .with_structured_condition("userRole", Condition::new("role", "", "admin")),
        false ;
        "invalid condition"
    )]
    fn validate(rule: Rule, valid: bool) {
        let result = rule.validate();
        if valid {
            assert_matches!(result, Ok(()));
        } else {
            assert_matches!(result, Err(Error::InvalidRule(_)));
        }
    }

    #[test]
    fn invalid_condition_message_names_the_key() {
        let rule = Rule::new()
            .for_resource("documents")
            .with_action("read")
            .with_structured_condition("userRole", Condition::new("role", "in", json!(null)));

        let err = rule.validate().unwrap_err();
        assert!(err.to_string().contains("userRole"), "{}", err);
    }

    #[test_case("pods", "create", "pods", "create", true ; "exact match")]
    #[test_case("*", "create", "pods", "create", true ; "wildcard resource")]
    #[test_case("pods", "*", "pods", "delete", true ; "wildcard action")]
    #[test_case("*", "*", "services", "delete", true ; "wildcard both")]
    #[test_case("pods", "create", "services", "delete", false ; "no match")]
    #[test_case("*", "create", "pods", "delete", false ; "wildcard resource wrong action")]
    fn matches(rule_resource: &str, rule_action: &str, resource: &str, action: &str, want: bool) {
        let rule = Rule::new().for_resource(rule_resource).with_action(rule_action);
        assert_eq!(want, rule.matches(resource, action));
    }

    #[test]
    fn json_round_trip() {
        let rule = Rule::new()
            .with_id("test-rule")
            .with_name("Test Rule")
            .with_description("Test Description")
            .with_type(RuleType::Kubernetes)
            .with_severity(Severity::High)
            .for_resource("pods")
            .with_action("create")
            .with_effect(Effect::Allow)
            .with_metadata("version", "v1")
            .with_structured_condition(
                "userRole",
                Condition::new(ConditionKind::Role, Operator::In, vec!["admin"])
                    .with_message("Admin access required"),
            );

        let data = serde_json::to_string(&rule).unwrap();
        let restored: Rule = serde_json::from_str(&data).unwrap();
        assert_eq!(rule, restored);
    }

    #[test]
    fn enums_serialize_as_tags() {
        let rule = Rule::new()
            .with_type(RuleType::Network)
            .with_severity(Severity::Critical)
            .with_effect(Effect::Allow);
        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(json!("network"), value["type"]);
        assert_eq!(json!("CRITICAL"), value["severity"]);
        assert_eq!(json!("allow"), value["effect"]);
    }

    #[test]
    fn missing_collections_deserialize_empty() {
        let rule: Rule = serde_json::from_str(
            r#"{ "id": "r1", "resource": "documents", "action": "read", "effect": "allow" }"#,
        )
        .unwrap();
        assert!(rule.conditions.is_empty());
        assert!(rule.metadata.is_empty());
        assert_eq!(Effect::Allow, rule.effect);
    }

    #[test]
    fn unknown_effect_is_rejected() {
        let result: std::result::Result<Rule, _> = serde_json::from_str(
            r#"{ "resource": "documents", "action": "read", "effect": "maybe" }"#,
        );
        assert!(result.is_err());
    }

    proptest! {
        #[test]
        fn wildcard_rule_matches_everything(resource in ".*", action in ".*") {
            let rule = Rule::new().for_resource(WILDCARD).with_action(WILDCARD);
            prop_assert!(rule.matches(&resource, &action));
        }

        #[test]
        fn wildcard_resource_only_matches_its_action(resource in ".*", action in "[a-z]{1,8}") {
            let rule = Rule::new().for_resource(WILDCARD).with_action("read");
            prop_assert_eq!(action == "read", rule.matches(&resource, &action));
        }
    }
}
