use std::collections::HashMap;

use serde_json::Value;

/// Attribute map of one context section.
pub type Attributes = HashMap<String, Value>;

/// Evaluation context supplied per decision request.
///
/// The three sections are independent of each other. No key is required at
/// this level; which keys must be present is up to the evaluators in use.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    user: Attributes,
    resource: Attributes,
    environment: Attributes,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: Attributes) -> Self {
        self.user = user;
        self
    }

    pub fn with_resource(mut self, resource: Attributes) -> Self {
        self.resource = resource;
        self
    }

    pub fn with_environment(mut self, environment: Attributes) -> Self {
        self.environment = environment;
        self
    }

    pub fn set_user(&mut self, user: Attributes) {
        self.user = user;
    }

    pub fn set_resource(&mut self, resource: Attributes) {
        self.resource = resource;
    }

    pub fn set_environment(&mut self, environment: Attributes) {
        self.environment = environment;
    }

    pub fn user(&self) -> &Attributes {
        &self.user
    }

    pub fn resource(&self) -> &Attributes {
        &self.resource
    }

    pub fn environment(&self) -> &Attributes {
        &self.environment
    }

    pub fn attribute(&self, scope: Scope, key: &str) -> Option<&Value> {
        match scope {
            Scope::User => self.user.get(key),
            Scope::Resource => self.resource.get(key),
            Scope::Environment => self.environment.get(key),
        }
    }
}

/// Addresses one section of a `Context`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Scope {
    User,
    Resource,
    Environment,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::User => "user",
            Scope::Resource => "resource",
            Scope::Environment => "environment",
        }
    }
}

/// Builds an `Attributes` map from key/value pairs.
pub fn attributes<K, V, I>(pairs: I) -> Attributes
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}
