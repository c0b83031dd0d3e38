use crate::errors::{UrlManagerError, UrlManagerResult};
use crate::normalizer::RouteOutcome;
use crate::request::Request;
use crate::rule::{
    CreateStatus, Rule, RuleContext, RuleDeclaration, RuleResult, build_query, strip_suffix,
};
use crate::types::{ANCHOR_PARAM, ParsedRoute, RouteParams};
use memchr::memchr;
use parking_lot::RwLock;
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::Level;

use super::cache::{CacheStats, RuleCache};
use super::{CreatedUrl, Resolution, ShadowedRule, UrlManagerConfig, UrlManagerOptions};

/// Ordered rule set that parses requests and creates URLs.
#[derive(Debug)]
pub struct UrlManager {
    options: UrlManagerOptions,
    rules: Vec<Arc<dyn Rule>>,
    cache: Option<RwLock<RuleCache>>,
    cache_stats: Option<CacheStats>,
    shadowed: Vec<ShadowedRule>,
}

impl UrlManager {
    pub fn new(
        options: UrlManagerOptions,
        declarations: Vec<RuleDeclaration>,
    ) -> UrlManagerResult<Self> {
        options.validate()?;

        let enable_cache = options.enable_rule_cache;
        let mut manager = Self {
            options,
            rules: Vec::new(),
            cache: enable_cache.then(|| RwLock::new(RuleCache::new())),
            cache_stats: enable_cache.then(CacheStats::default),
            shadowed: Vec::new(),
        };
        manager.add_rules(declarations, true)?;
        Ok(manager)
    }

    pub fn from_config(config: UrlManagerConfig) -> UrlManagerResult<Self> {
        Self::new(config.options, config.rules)
    }

    pub fn from_json(json: &str) -> UrlManagerResult<Self> {
        let config: UrlManagerConfig = serde_json::from_str(json)?;
        Self::from_config(config)
    }

    /// Builds `declarations` and adds them after (or before) the existing
    /// rules. Any configuration change empties the creation cache.
    pub fn add_rules(
        &mut self,
        declarations: Vec<RuleDeclaration>,
        append: bool,
    ) -> UrlManagerResult<()> {
        let built = declarations
            .into_iter()
            .map(RuleDeclaration::into_rule)
            .collect::<RuleResult<Vec<_>>>()?;

        if append {
            self.rules.extend(built);
        } else {
            let existing = std::mem::replace(&mut self.rules, built);
            self.rules.extend(existing);
        }

        self.clear_cache();
        self.detect_shadowed();
        Ok(())
    }

    pub fn options(&self) -> &UrlManagerOptions {
        &self.options
    }

    pub fn rules(&self) -> &[Arc<dyn Rule>] {
        &self.rules
    }

    pub fn shadowed_rules(&self) -> &[ShadowedRule] {
        &self.shadowed
    }

    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.write().clear();
        }
    }

    /// `(hits, misses)` of the creation cache, `None` when it is disabled.
    pub fn cache_metrics(&self) -> Option<(u64, u64)> {
        self.cache_stats.as_ref().map(|stats| stats.snapshot())
    }

    fn context(&self) -> RuleContext<'_> {
        RuleContext {
            suffix: self.options.suffix.as_deref().unwrap_or(""),
            normalizer: self.options.normalizer.as_ref(),
        }
    }

    #[tracing::instrument(level = "trace", skip(self, request), fields(method=%request.method(), path=%request.path_info()))]
    pub fn parse_request(&self, request: &Request) -> Option<Resolution> {
        if !self.options.enable_pretty_url {
            let route = request.query_param(&self.options.route_param).unwrap_or("");
            return Some(Resolution::Route(ParsedRoute::route_only(route)));
        }

        let ctx = self.context();
        for (index, rule) in self.rules.iter().enumerate() {
            if let Some(outcome) = rule.parse_request(&ctx, request) {
                if self.options.debug {
                    tracing::event!(
                        Level::DEBUG,
                        index,
                        rule = %rule.describe(),
                        "request parsed by url rule"
                    );
                }
                return Some(self.resolve(outcome));
            }
        }

        if self.options.enable_strict_parsing {
            return None;
        }
        if self.options.debug {
            tracing::event!(
                Level::DEBUG,
                path = %request.path_info(),
                "no url rule matched, using the path as route"
            );
        }

        let normalized = self
            .options
            .normalizer
            .as_ref()
            .map(|n| n.normalize_path_info(request.path_info(), ctx.suffix));
        let (path, changed) = match &normalized {
            Some(out) => (out.path.as_ref(), out.changed),
            None => (request.path_info(), false),
        };
        let route = ParsedRoute::route_only(strip_suffix(path, ctx.suffix)?);

        match &self.options.normalizer {
            Some(normalizer) if changed => Some(self.resolve(normalizer.normalize_route(route))),
            _ => Some(Resolution::Route(route)),
        }
    }

    fn resolve(&self, outcome: RouteOutcome) -> Resolution {
        match outcome {
            RouteOutcome::Matched(route) => Resolution::Route(route),
            RouteOutcome::Redirect { target, status } => Resolution::Redirect {
                url: self.create_url(&target.route, &target.params).url,
                status,
            },
            RouteOutcome::NotFound => Resolution::NotFound,
        }
    }

    #[tracing::instrument(level = "trace", skip(self, params), fields(route=%route, param_count=params.len() as u64))]
    pub fn create_url(&self, route: &str, params: &RouteParams) -> CreatedUrl {
        let mut params = params.clone();
        let anchor = params
            .remove(ANCHOR_PARAM)
            .map(|fragment| format!("#{fragment}"))
            .unwrap_or_default();
        params.remove(&self.options.route_param);
        let route = route.trim_matches('/');

        if !self.options.enable_pretty_url {
            let mut url = format!(
                "{}?{}={}",
                self.script_url().unwrap_or(""),
                self.options.route_param,
                urlencoding::encode(route)
            );
            let query = build_query(&params);
            if !query.is_empty() {
                url.push('&');
                url.push_str(&query);
            }
            url.push_str(&anchor);
            return CreatedUrl {
                url,
                status: CreateStatus::SUCCESS,
            };
        }

        let base_url = if self.options.show_script_name {
            self.script_url()
        } else {
            self.options.base_url.as_deref()
        };

        match self.create_with_rules(route, &params) {
            Ok(url) => CreatedUrl {
                url: with_base_url(&url, base_url, &anchor),
                status: CreateStatus::SUCCESS,
            },
            Err(status) => {
                let mut url = route.to_string();
                if let Some(suffix) = &self.options.suffix {
                    url.push_str(suffix);
                }
                let query = build_query(&params);
                if !query.is_empty() {
                    url.push('?');
                    url.push_str(&query);
                }
                CreatedUrl {
                    url: with_base_url(&url, base_url, &anchor),
                    status: if status.is_success() {
                        CreateStatus::ROUTE_MISMATCH
                    } else {
                        status
                    },
                }
            }
        }
    }

    /// Like [`Self::create_url`] but always returns `scheme://host/...`.
    /// `scheme` forces a scheme; `Some("")` gives a protocol-relative URL.
    pub fn create_absolute_url(
        &self,
        route: &str,
        params: &RouteParams,
        scheme: Option<&str>,
    ) -> UrlManagerResult<CreatedUrl> {
        let CreatedUrl { mut url, status } = self.create_url(route, params);

        if !url.contains("://") {
            let host_info = self
                .options
                .host_info
                .as_deref()
                .ok_or(UrlManagerError::HostInfoMissing)?;
            url = if url.starts_with("//") {
                let scheme_end = host_info.find("://").unwrap_or(0);
                format!("{}:{url}", &host_info[..scheme_end])
            } else if url.starts_with('/') {
                format!("{host_info}{url}")
            } else {
                format!("{host_info}/{url}")
            };
        }

        Ok(CreatedUrl {
            url: ensure_scheme(url, scheme),
            status,
        })
    }

    fn script_url(&self) -> Option<&str> {
        self.options
            .script_url
            .as_deref()
            .or(self.options.base_url.as_deref())
    }

    /// Tries the cached candidates for `route` first, then every other rule
    /// in declaration order. Rules that might succeed for `route` with other
    /// params are remembered once a URL is found.
    fn create_with_rules(&self, route: &str, params: &RouteParams) -> Result<String, CreateStatus> {
        let ctx = self.context();
        let mut status = CreateStatus::SUCCESS;

        let cached = self.cache.as_ref().and_then(|cache| cache.read().peek(route));
        if let Some(stats) = &self.cache_stats {
            if cached.is_some() {
                stats.record_hit();
            } else {
                stats.record_miss();
            }
        }
        if self.options.debug && self.cache.is_some() {
            let lookup = if cached.is_some() { "hit" } else { "miss" };
            tracing::event!(
                Level::DEBUG,
                cache = lookup,
                route = %route,
                "url rule cache lookup"
            );
        }

        let cached = cached.unwrap_or_default();
        for &index in &cached {
            let Some(rule) = self.rules.get(index) else {
                continue;
            };
            let creation = rule.create_url(&ctx, route, params);
            match creation.url {
                Some(url) => return Ok(url),
                None => status |= creation.status,
            }
        }

        let mut candidates: SmallVec<[usize; 4]> = SmallVec::new();
        for (index, rule) in self.rules.iter().enumerate() {
            if cached.contains(&index) {
                continue;
            }
            let creation = rule.create_url(&ctx, route, params);
            if creation.status.is_success()
                || creation.status.contains(CreateStatus::PARAMS_MISMATCH)
            {
                candidates.push(index);
            }
            match creation.url {
                Some(url) => {
                    if let Some(cache) = &self.cache {
                        cache.write().remember(route, &candidates);
                    }
                    return Ok(url);
                }
                None => status |= creation.status,
            }
        }

        Err(status)
    }

    fn detect_shadowed(&mut self) {
        self.shadowed.clear();
        if !self.options.detect_shadowed_rules {
            return;
        }

        let signatures: Vec<_> = self.rules.iter().map(|rule| rule.signature()).collect();
        for (index, signature) in signatures.iter().enumerate() {
            let Some(signature) = signature else {
                continue;
            };
            let earlier = signatures[..index]
                .iter()
                .position(|e| e.as_ref().is_some_and(|e| e.shadows(signature)));
            if let Some(shadowed_by) = earlier {
                tracing::warn!(
                    index,
                    shadowed_by,
                    rule = %self.rules[index].describe(),
                    earlier = %self.rules[shadowed_by].describe(),
                    "url rule is unreachable for parsing; an earlier rule matches the same requests"
                );
                self.shadowed.push(ShadowedRule { index, shadowed_by });
            }
        }
    }
}

/// Places `url` under `base_url`. Absolute and protocol-relative URLs get
/// the base inserted after their host.
fn with_base_url(url: &str, base_url: Option<&str>, anchor: &str) -> String {
    let host_end = if url.contains("://") {
        Some(8)
    } else if url.starts_with("//") {
        Some(2)
    } else {
        None
    };

    match (host_end, base_url) {
        (Some(from), Some(base)) if !base.is_empty() => {
            match url.as_bytes().get(from..).and_then(|tail| memchr(b'/', tail)) {
                Some(rel) => {
                    let pos = from + rel;
                    format!("{}{base}{}{anchor}", &url[..pos], &url[pos..])
                }
                None => format!("{url}{base}{anchor}"),
            }
        }
        (Some(_), _) => format!("{url}{anchor}"),
        (None, Some(base)) => format!("{base}/{}{anchor}", url.trim_start_matches('/')),
        (None, None) => format!("{}{anchor}", url.trim_start_matches('/')),
    }
}

fn ensure_scheme(url: String, scheme: Option<&str>) -> String {
    let Some(scheme) = scheme else {
        return url;
    };
    if url.starts_with("//") {
        return if scheme.is_empty() {
            url
        } else {
            format!("{scheme}:{url}")
        };
    }
    match url.find("://") {
        Some(pos) if scheme.is_empty() => url[pos + 1..].to_string(),
        Some(pos) => format!("{scheme}{}", &url[pos..]),
        None => url,
    }
}
