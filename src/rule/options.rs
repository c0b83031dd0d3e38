use crate::enums::{HttpMethod, RuleMode};
use crate::normalizer::UrlNormalizer;
use crate::types::RouteParams;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Which normalizer a rule runs its path info through.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleNormalizer {
    /// Use the manager's normalizer, if it has one.
    #[default]
    Inherit,
    Disabled,
    Own(UrlNormalizer),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlRuleOptions {
    pub name: Option<String>,
    pub pattern: String,
    pub route: String,
    pub host: Option<String>,
    pub defaults: RouteParams,
    pub suffix: Option<String>,
    pub verbs: Vec<HttpMethod>,
    pub mode: RuleMode,
    pub encode_params: bool,
    pub normalizer: RuleNormalizer,
    /// Shorthand tokens replaced in the pattern before it is compiled.
    pub tokens: BTreeMap<String, String>,
}

impl Default for UrlRuleOptions {
    fn default() -> Self {
        Self {
            name: None,
            pattern: String::new(),
            route: String::new(),
            host: None,
            defaults: RouteParams::new(),
            suffix: None,
            verbs: Vec::new(),
            mode: RuleMode::default(),
            encode_params: true,
            normalizer: RuleNormalizer::default(),
            tokens: BTreeMap::new(),
        }
    }
}

impl UrlRuleOptions {
    pub fn builder() -> UrlRuleOptionsBuilder {
        UrlRuleOptionsBuilder::default()
    }
}

#[derive(Debug, Default, Clone)]
pub struct UrlRuleOptionsBuilder {
    options: UrlRuleOptions,
}

impl UrlRuleOptionsBuilder {
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.options.name = Some(name.into());
        self
    }

    pub fn pattern<S: Into<String>>(mut self, pattern: S) -> Self {
        self.options.pattern = pattern.into();
        self
    }

    pub fn route<S: Into<String>>(mut self, route: S) -> Self {
        self.options.route = route.into();
        self
    }

    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.options.host = Some(host.into());
        self
    }

    pub fn defaults(mut self, defaults: RouteParams) -> Self {
        self.options.defaults = defaults;
        self
    }

    pub fn default_value<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.options.defaults.insert(name.into(), value.into());
        self
    }

    pub fn suffix<S: Into<String>>(mut self, suffix: S) -> Self {
        self.options.suffix = Some(suffix.into());
        self
    }

    pub fn verbs<I>(mut self, verbs: I) -> Self
    where
        I: Into<Vec<HttpMethod>>,
    {
        self.options.verbs = verbs.into();
        self
    }

    pub fn mode(mut self, mode: RuleMode) -> Self {
        self.options.mode = mode;
        self
    }

    pub fn encode_params(mut self, value: bool) -> Self {
        self.options.encode_params = value;
        self
    }

    pub fn normalizer(mut self, normalizer: RuleNormalizer) -> Self {
        self.options.normalizer = normalizer;
        self
    }

    pub fn token<K: Into<String>, V: Into<String>>(mut self, token: K, replacement: V) -> Self {
        self.options.tokens.insert(token.into(), replacement.into());
        self
    }

    pub fn tokens(mut self, tokens: BTreeMap<String, String>) -> Self {
        self.options.tokens = tokens;
        self
    }

    pub fn build(self) -> UrlRuleOptions {
        self.options
    }
}
