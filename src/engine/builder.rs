use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::{
    ConditionEvaluator, ConditionKind, DefaultValidator, Engine, Error, EvaluatorRegistry,
    Result, Rule, RuleValidator,
};

/// Configures an [`Engine`]: validator, evaluators and initial rules.
pub struct EngineBuilder<V = DefaultValidator> {
    validator: V,
    builtin_evaluators: bool,
    evaluators: Vec<(ConditionKind, Arc<dyn ConditionEvaluator>)>,
    json: Option<String>,
    rules: Vec<Rule>,
}

impl EngineBuilder<DefaultValidator> {
    pub fn new() -> Self {
        Self {
            validator: DefaultValidator,
            builtin_evaluators: true,
            evaluators: Vec::new(),
            json: None,
            rules: Vec::new(),
        }
    }

    /// Seeds the engine from a JSON rule set of the form `{"rules": [...]}`.
    /// The document is parsed in `build`.
    pub fn from_json(json: &str) -> Self {
        Self {
            json: Some(json.into()),
            ..Self::new()
        }
    }
}

impl Default for EngineBuilder<DefaultValidator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> EngineBuilder<V>
where
    V: RuleValidator,
{
    pub fn with_validator<W>(self, validator: W) -> EngineBuilder<W>
    where
        W: RuleValidator,
    {
        EngineBuilder {
            validator,
            builtin_evaluators: self.builtin_evaluators,
            evaluators: self.evaluators,
            json: self.json,
            rules: self.rules,
        }
    }

    pub fn with_evaluator<E>(mut self, kind: impl Into<ConditionKind>, evaluator: E) -> Self
    where
        E: ConditionEvaluator + 'static,
    {
        self.evaluators.push((kind.into(), Arc::new(evaluator)));
        self
    }

    pub fn without_builtin_evaluators(mut self) -> Self {
        self.builtin_evaluators = false;
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = Rule>,
    {
        self.rules.extend(rules);
        self
    }

    /// Builds the engine. Rules from JSON come first, followed by the ones
    /// added with `with_rule(s)`. Any invalid rule fails the whole build.
    pub fn build(self) -> Result<Engine<V>> {
        let mut rules = match &self.json {
            Some(json) => {
                let definition: RuleSetDefinition =
                    serde_json::from_str(json).map_err(Error::Deserializing)?;
                definition.rules
            }
            None => Vec::new(),
        };
        rules.extend(self.rules);

        let registry = if self.builtin_evaluators {
            EvaluatorRegistry::with_builtins()
        } else {
            EvaluatorRegistry::empty()
        };
        for (kind, evaluator) in self.evaluators {
            registry.register_shared(kind, evaluator);
        }

        let engine = Engine::from_parts(Vec::new(), registry, self.validator);
        engine.add_rules(rules)?;

        debug!(rules = engine.rule_count(), "engine built");
        Ok(engine)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleSetDefinition {
    #[serde(default)]
    rules: Vec<Rule>,
}
