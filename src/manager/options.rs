use crate::normalizer::UrlNormalizer;
use crate::rule::RuleDeclaration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_ROUTE_PARAM: &str = "r";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlManagerOptions {
    pub enable_pretty_url: bool,
    /// Turns off the fallback that treats an unmatched path as the route.
    pub enable_strict_parsing: bool,
    pub suffix: Option<String>,
    /// `None` gives relative URLs (`post/1`); `Some("")` gives `/post/1`.
    pub base_url: Option<String>,
    pub script_url: Option<String>,
    pub show_script_name: bool,
    /// `scheme://host`, needed by absolute URL creation.
    pub host_info: Option<String>,
    pub route_param: String,
    pub enable_rule_cache: bool,
    pub detect_shadowed_rules: bool,
    pub debug: bool,
    pub normalizer: Option<UrlNormalizer>,
}

impl Default for UrlManagerOptions {
    fn default() -> Self {
        Self {
            enable_pretty_url: true,
            enable_strict_parsing: false,
            suffix: None,
            base_url: None,
            script_url: None,
            show_script_name: false,
            host_info: None,
            route_param: DEFAULT_ROUTE_PARAM.to_string(),
            enable_rule_cache: true,
            detect_shadowed_rules: false,
            debug: false,
            normalizer: None,
        }
    }
}

impl UrlManagerOptions {
    pub fn builder() -> UrlManagerOptionsBuilder {
        UrlManagerOptionsBuilder::default()
    }

    pub fn validate(&self) -> Result<(), UrlManagerOptionsError> {
        if self.route_param.trim().is_empty() {
            return Err(UrlManagerOptionsError::EmptyRouteParam);
        }
        if let Some(host_info) = &self.host_info
            && !host_info.contains("://")
        {
            return Err(UrlManagerOptionsError::HostInfoWithoutScheme {
                value: host_info.clone(),
            });
        }
        if let Some(base_url) = &self.base_url
            && base_url.ends_with('/')
        {
            return Err(UrlManagerOptionsError::BaseUrlTrailingSlash {
                value: base_url.clone(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct UrlManagerOptionsBuilder {
    options: UrlManagerOptions,
}

impl UrlManagerOptionsBuilder {
    pub fn enable_pretty_url(mut self, value: bool) -> Self {
        self.options.enable_pretty_url = value;
        self
    }

    pub fn enable_strict_parsing(mut self, value: bool) -> Self {
        self.options.enable_strict_parsing = value;
        self
    }

    pub fn suffix<S: Into<String>>(mut self, suffix: S) -> Self {
        self.options.suffix = Some(suffix.into());
        self
    }

    pub fn base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        self.options.base_url = Some(base_url.into());
        self
    }

    pub fn script_url<S: Into<String>>(mut self, script_url: S) -> Self {
        self.options.script_url = Some(script_url.into());
        self
    }

    pub fn show_script_name(mut self, value: bool) -> Self {
        self.options.show_script_name = value;
        self
    }

    pub fn host_info<S: Into<String>>(mut self, host_info: S) -> Self {
        self.options.host_info = Some(host_info.into());
        self
    }

    pub fn route_param<S: Into<String>>(mut self, route_param: S) -> Self {
        self.options.route_param = route_param.into();
        self
    }

    pub fn enable_rule_cache(mut self, value: bool) -> Self {
        self.options.enable_rule_cache = value;
        self
    }

    pub fn detect_shadowed_rules(mut self, value: bool) -> Self {
        self.options.detect_shadowed_rules = value;
        self
    }

    pub fn debug(mut self, value: bool) -> Self {
        self.options.debug = value;
        self
    }

    pub fn normalizer(mut self, normalizer: UrlNormalizer) -> Self {
        self.options.normalizer = Some(normalizer);
        self
    }

    pub fn build(self) -> Result<UrlManagerOptions, UrlManagerOptionsError> {
        let options = self.options;
        options.validate()?;
        Ok(options)
    }
}

/// Options plus rules, as read from a JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrlManagerConfig {
    #[serde(flatten)]
    pub options: UrlManagerOptions,
    #[serde(default)]
    pub rules: Vec<RuleDeclaration>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UrlManagerOptionsError {
    #[error("route_param must not be empty")]
    EmptyRouteParam,
    #[error("host_info '{value}' must include a scheme, e.g. 'https://example.com'")]
    HostInfoWithoutScheme { value: String },
    #[error("base_url '{value}' must not end with '/'")]
    BaseUrlTrailingSlash { value: String },
}
