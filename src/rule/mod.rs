mod declaration;
mod error;
mod options;
mod query;
mod status;
mod url_rule;

pub use declaration::{RuleDeclaration, VerbKey, parse_verb_key};
pub use error::{RuleError, RuleResult};
pub use options::{RuleNormalizer, UrlRuleOptions, UrlRuleOptionsBuilder};
pub use query::build_query;
pub use status::CreateStatus;
pub use url_rule::UrlRule;

pub(crate) use url_rule::strip_suffix;

use crate::enums::HttpMethod;
use crate::normalizer::{RouteOutcome, UrlNormalizer};
use crate::request::Request;
use crate::types::RouteParams;
use std::fmt;
use std::sync::Arc;

/// Manager-level settings a rule falls back to.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleContext<'a> {
    pub suffix: &'a str,
    pub normalizer: Option<&'a UrlNormalizer>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlCreation {
    pub url: Option<String>,
    pub status: CreateStatus,
}

impl UrlCreation {
    pub fn created(url: String) -> Self {
        Self {
            url: Some(url),
            status: CreateStatus::SUCCESS,
        }
    }

    pub fn failed(status: CreateStatus) -> Self {
        Self { url: None, status }
    }

    pub fn is_success(&self) -> bool {
        self.url.is_some()
    }
}

/// What decides whether a rule can parse a request at all. A later rule whose
/// signature is covered by an earlier one never gets to parse anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSignature {
    pub verbs: Vec<HttpMethod>,
    pub matcher: String,
    pub suffix: Option<String>,
}

impl RuleSignature {
    pub fn shadows(&self, later: &RuleSignature) -> bool {
        self.matcher == later.matcher
            && self.suffix == later.suffix
            && (self.verbs.is_empty()
                || (!later.verbs.is_empty() && later.verbs.iter().all(|v| self.verbs.contains(v))))
    }
}

pub trait Rule: Send + Sync + fmt::Debug {
    /// `None` when the rule does not apply to `request`.
    fn parse_request(&self, ctx: &RuleContext<'_>, request: &Request) -> Option<RouteOutcome>;

    /// A `#` param becomes the URL fragment.
    fn create_url(&self, ctx: &RuleContext<'_>, route: &str, params: &RouteParams) -> UrlCreation;

    fn signature(&self) -> Option<RuleSignature> {
        None
    }

    fn describe(&self) -> String {
        "custom rule".to_string()
    }
}

/// Tries `rules` in order and returns the first URL. On failure the statuses
/// of every rule tried are OR-ed onto `acc` and returned.
pub fn iterate_rules<'r, I>(
    rules: I,
    ctx: &RuleContext<'_>,
    route: &str,
    params: &RouteParams,
    acc: CreateStatus,
) -> Result<String, CreateStatus>
where
    I: IntoIterator<Item = &'r Arc<dyn Rule>>,
{
    let mut acc = acc;
    for rule in rules {
        let creation = rule.create_url(ctx, route, params);
        match creation.url {
            Some(url) => return Ok(url),
            None => acc |= creation.status,
        }
    }
    Err(acc)
}

/// Composite creation: a failure that collected no status at all means no
/// child could create URLs and is reported as parsing-only.
pub fn create_with_rules<'r, I>(
    rules: I,
    ctx: &RuleContext<'_>,
    route: &str,
    params: &RouteParams,
) -> UrlCreation
where
    I: IntoIterator<Item = &'r Arc<dyn Rule>>,
{
    match iterate_rules(rules, ctx, route, params, CreateStatus::SUCCESS) {
        Ok(url) => UrlCreation::created(url),
        Err(status) if status.is_success() => UrlCreation::failed(CreateStatus::PARSING_ONLY),
        Err(status) => UrlCreation::failed(status),
    }
}

pub fn parse_with_rules<'r, I>(
    rules: I,
    ctx: &RuleContext<'_>,
    request: &Request,
) -> Option<RouteOutcome>
where
    I: IntoIterator<Item = &'r Arc<dyn Rule>>,
{
    rules
        .into_iter()
        .find_map(|rule| rule.parse_request(ctx, request))
}
