use crate::enums::{HttpMethod, RuleMode};
use crate::normalizer::{RouteOutcome, UrlNormalizer};
use crate::pattern::{
    CompileOptions, CompiledPattern, PatternError, PatternToken, full_match_regex, tokenize_route,
};
use crate::request::Request;
use crate::types::{ANCHOR_PARAM, ParsedRoute, RouteParams};
use memchr::memchr;
use regex::Regex;
use smallvec::SmallVec;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use super::{
    CreateStatus, Rule, RuleContext, RuleError, RuleNormalizer, RuleResult, RuleSignature,
    UrlCreation, UrlRuleOptions, build_query,
};

/// Where a placeholder's value ends up after a match.
#[derive(Debug, Clone)]
enum PlaceholderRole {
    /// Substituted into the route, never returned as a param.
    Route,
    /// Returned as a param; the regex is `None` for the default `[^/]+`.
    Param(Option<Regex>),
}

#[derive(Debug, Clone)]
enum RoutePart {
    Literal(String),
    Placeholder(usize),
}

/// A single pattern/route pair.
#[derive(Debug)]
pub struct UrlRule {
    name: String,
    host: Option<String>,
    pattern: CompiledPattern,
    roles: Vec<PlaceholderRole>,
    route: String,
    route_parts: Vec<RoutePart>,
    route_matcher: Option<Regex>,
    defaults: RouteParams,
    suffix: Option<String>,
    verbs: SmallVec<[HttpMethod; 2]>,
    mode: RuleMode,
    encode_params: bool,
    normalizer: RuleNormalizer,
}

impl UrlRule {
    pub fn new(options: UrlRuleOptions) -> RuleResult<Self> {
        let UrlRuleOptions {
            name,
            pattern: raw_pattern,
            route,
            host,
            defaults,
            suffix,
            verbs,
            mode,
            encode_params,
            normalizer,
            tokens,
        } = options;

        let raw_pattern = expand_tokens(&raw_pattern, &tokens).into_owned();
        let name = name.unwrap_or_else(|| raw_pattern.clone());
        let route = route.trim_matches('/').to_string();
        let mut host = host.map(|h| h.trim_end_matches('/').to_string());
        let mut source = trim_slashes(&raw_pattern).into_owned();
        let mut wrapper = "";

        if let Some(h) = &host {
            source = format!("{h}/{source}").trim_end_matches('/').to_string();
        } else if source.is_empty() {
            // matches the empty path only
        } else if let Some(pos) = source.find("://") {
            host = Some(host_prefix(&source, pos + 3).to_string());
        } else if source.starts_with("//") {
            host = Some(host_prefix(&source, 2).to_string());
        } else {
            source = format!("/{source}/");
            wrapper = "/";
        }

        let pattern = if source.is_empty() {
            CompiledPattern::empty()
        } else {
            let is_optional = |param: &str| defaults.contains_key(param);
            CompiledPattern::compile(
                &source,
                &CompileOptions {
                    is_optional: &is_optional,
                    protocol_relative: host.as_deref().is_some_and(|h| h.starts_with("//")),
                    trailing_wrapper: wrapper,
                },
            )?
        };

        let mut route_parts = Vec::new();
        let mut route_regex = String::from("^");
        let mut route_indices: SmallVec<[usize; 4]> = SmallVec::new();
        for token in tokenize_route(&route)? {
            match token {
                PatternToken::Literal(text) => {
                    route_regex.push_str(&regex::escape(&text));
                    route_parts.push(RoutePart::Literal(text));
                }
                PatternToken::Placeholder(ph) => {
                    let index = pattern
                        .placeholders()
                        .iter()
                        .position(|spec| spec.name == ph.name)
                        .ok_or_else(|| RuleError::RouteParamNotInPattern {
                            route: route.clone(),
                            pattern: raw_pattern.clone(),
                            name: ph.name.clone(),
                        })?;
                    let spec = &pattern.placeholders()[index];
                    route_regex.push_str(&format!("(?P<{}>{})", spec.group, spec.regex_source()));
                    route_parts.push(RoutePart::Placeholder(index));
                    route_indices.push(index);
                }
            }
        }
        route_regex.push('$');

        let route_matcher = if route_indices.is_empty() {
            None
        } else {
            Some(
                Regex::new(&route_regex).map_err(|err| PatternError::MatcherInvalid {
                    pattern: route.clone(),
                    error: err.to_string(),
                })?,
            )
        };

        let mut roles = Vec::with_capacity(pattern.placeholders().len());
        for (index, spec) in pattern.placeholders().iter().enumerate() {
            if route_indices.contains(&index) {
                roles.push(PlaceholderRole::Route);
                continue;
            }
            let check = match &spec.constraint {
                Some(constraint) => Some(full_match_regex(&source, &spec.name, constraint)?),
                None => None,
            };
            roles.push(PlaceholderRole::Param(check));
        }

        Ok(Self {
            name,
            host,
            pattern,
            roles,
            route,
            route_parts,
            route_matcher,
            defaults,
            suffix,
            verbs: verbs.into_iter().collect(),
            mode,
            encode_params,
            normalizer,
        })
    }

    /// Shorthand for a rule with only a pattern and a route.
    pub fn from_pattern(pattern: &str, route: &str) -> RuleResult<Self> {
        Self::new(
            UrlRuleOptions::builder()
                .pattern(pattern)
                .route(route)
                .build(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    pub fn verbs(&self) -> &[HttpMethod] {
        &self.verbs
    }

    pub fn mode(&self) -> RuleMode {
        self.mode
    }

    pub fn defaults(&self) -> &RouteParams {
        &self.defaults
    }

    fn normalizer<'a>(&'a self, ctx: &RuleContext<'a>) -> Option<&'a UrlNormalizer> {
        match &self.normalizer {
            RuleNormalizer::Inherit => ctx.normalizer,
            RuleNormalizer::Disabled => None,
            RuleNormalizer::Own(normalizer) => Some(normalizer),
        }
    }

    fn param_index(&self, name: &str) -> Option<usize> {
        self.pattern
            .placeholders()
            .iter()
            .position(|spec| spec.name == name)
            .filter(|&index| matches!(self.roles[index], PlaceholderRole::Param(_)))
    }

    fn is_route_param(&self, name: &str) -> bool {
        self.pattern
            .placeholders()
            .iter()
            .position(|spec| spec.name == name)
            .is_some_and(|index| matches!(self.roles[index], PlaceholderRole::Route))
    }

    fn finish_url(&self, url: String) -> String {
        if self.host.is_some() {
            match url.as_bytes().get(8..).and_then(|tail| memchr(b'/', tail)) {
                Some(rel) => {
                    let pos = rel + 8;
                    format!("{}{}", &url[..pos], squeeze_slashes(&url[pos..]))
                }
                None => url,
            }
        } else if url.contains("//") {
            squeeze_slashes(url.trim_matches('/'))
        } else {
            url
        }
    }

    fn render_values(&self, values: &[String]) -> String {
        let rendered = self.pattern.render(values);
        self.finish_url(trim_slashes(&rendered).into_owned())
    }

    /// Whether parsing `path` puts every value back into its own slot.
    fn reparses_as(&self, path: &str, values: &[String]) -> bool {
        let path = percent_decoded(path);
        let subject: Cow<'_, str> = if path.starts_with("//") {
            Cow::Owned(format!("http:{path}"))
        } else {
            Cow::Borrowed(path.as_ref())
        };
        self.pattern.match_str(&subject).is_some_and(|matched| {
            values.iter().enumerate().all(|(index, value)| {
                matched.get(index).unwrap_or("") == percent_decoded(value).as_ref()
            })
        })
    }

    /// The value a placeholder is written out with when eliding its default
    /// would be ambiguous.
    fn written_default(&self, index: usize) -> Option<String> {
        let spec = &self.pattern.placeholders()[index];
        let default = self.defaults.get(&spec.name)?;
        Some(match self.roles[index] {
            PlaceholderRole::Param(_) if self.encode_params => {
                urlencoding::encode(default).into_owned()
            }
            _ => default.clone(),
        })
    }

    /// Renders `values`. When the result would parse back differently, elided
    /// defaults are written out again: first those followed by a written
    /// value, then all of them.
    fn render_path(&self, values: &mut [String]) -> String {
        let mut path = self.render_values(values);
        if self.reparses_as(&path, values) {
            return path;
        }

        let last_written = values.iter().rposition(|value| !value.is_empty());
        for restore_all in [false, true] {
            let mut restored = false;
            for index in 0..values.len() {
                if !values[index].is_empty() {
                    continue;
                }
                if !restore_all && last_written.is_none_or(|last| index > last) {
                    continue;
                }
                if let Some(default) = self.written_default(index) {
                    values[index] = default;
                    restored = true;
                }
            }
            if !restored {
                continue;
            }
            path = self.render_values(values);
            if self.reparses_as(&path, values) {
                break;
            }
        }
        path
    }
}

impl Rule for UrlRule {
    #[tracing::instrument(level = "trace", skip(self, ctx, request), fields(rule=%self.name, path=%request.path_info()))]
    fn parse_request(&self, ctx: &RuleContext<'_>, request: &Request) -> Option<RouteOutcome> {
        if !self.mode.can_parse() {
            return None;
        }
        if !self.verbs.is_empty() && !self.verbs.contains(&request.method()) {
            return None;
        }

        let suffix = self.suffix.as_deref().unwrap_or(ctx.suffix);
        let normalizer = self.normalizer(ctx);
        let normalized = normalizer.map(|n| n.normalize_path_info(request.path_info(), suffix));
        let (path, changed) = match &normalized {
            Some(out) => (out.path.as_ref(), out.changed),
            None => (request.path_info(), false),
        };

        let path = strip_suffix(path, suffix)?;
        let subject: Cow<'_, str> = if self.host.is_some() {
            let host_info = request.host_info().to_lowercase();
            if path.is_empty() {
                Cow::Owned(host_info)
            } else {
                Cow::Owned(format!("{host_info}/{path}"))
            }
        } else {
            Cow::Borrowed(path)
        };

        let matched = self.pattern.match_str(&subject)?;

        let mut params = self.defaults.clone();
        let mut values: SmallVec<[Option<String>; 8]> = SmallVec::new();
        for (index, spec) in self.pattern.placeholders().iter().enumerate() {
            let value = match matched.get(index) {
                Some(captured) if !captured.is_empty() => Some(captured.to_string()),
                _ => self.defaults.get(&spec.name).cloned(),
            };
            match self.roles[index] {
                PlaceholderRole::Route => {
                    params.remove(&spec.name);
                }
                PlaceholderRole::Param(_) => {
                    if let Some(value) = &value {
                        params.insert(spec.name.clone(), value.clone());
                    }
                }
            }
            values.push(value);
        }

        let route = if self.route_matcher.is_some() {
            let mut route = String::with_capacity(self.route.len());
            for part in &self.route_parts {
                match part {
                    RoutePart::Literal(text) => route.push_str(text),
                    RoutePart::Placeholder(index) => {
                        if let Some(Some(value)) = values.get(*index) {
                            route.push_str(value);
                        }
                    }
                }
            }
            route
        } else {
            self.route.clone()
        };

        let parsed = ParsedRoute::new(route, params);
        match normalizer {
            Some(normalizer) if changed => Some(normalizer.normalize_route(parsed)),
            _ => Some(RouteOutcome::Matched(parsed)),
        }
    }

    fn create_url(&self, ctx: &RuleContext<'_>, route: &str, params: &RouteParams) -> UrlCreation {
        if !self.mode.can_create() {
            return UrlCreation::failed(CreateStatus::PARSING_ONLY);
        }

        let placeholders = self.pattern.placeholders();
        let mut values = vec![String::new(); placeholders.len()];

        if route != self.route {
            let Some(captures) = self
                .route_matcher
                .as_ref()
                .and_then(|matcher| matcher.captures(route))
            else {
                return UrlCreation::failed(CreateStatus::ROUTE_MISMATCH);
            };
            for (index, spec) in placeholders.iter().enumerate() {
                if !matches!(self.roles[index], PlaceholderRole::Route) {
                    continue;
                }
                let value = captures.name(&spec.group).map_or("", |m| m.as_str());
                if self.defaults.get(&spec.name).is_none_or(|d| d != value) {
                    values[index] = value.to_string();
                }
            }
        }

        let mut remaining = params.clone();
        let anchor = remaining.remove(ANCHOR_PARAM);

        for (name, default) in &self.defaults {
            if self.is_route_param(name) {
                continue;
            }
            let in_pattern = self.param_index(name).is_some();
            match remaining.get(name) {
                // an omitted placeholder takes its default and is elided
                None if in_pattern => {}
                None => return UrlCreation::failed(CreateStatus::PARAMS_MISMATCH),
                Some(value) if value == default => {
                    remaining.remove(name);
                }
                Some(_) if !in_pattern => {
                    return UrlCreation::failed(CreateStatus::PARAMS_MISMATCH);
                }
                Some(_) => {}
            }
        }

        for (index, spec) in placeholders.iter().enumerate() {
            let PlaceholderRole::Param(check) = &self.roles[index] else {
                continue;
            };
            match remaining.get(&spec.name) {
                Some(value) if check.as_ref().is_none_or(|re| re.is_match(value)) => {
                    values[index] = if self.encode_params {
                        urlencoding::encode(value).into_owned()
                    } else {
                        value.clone()
                    };
                    remaining.remove(&spec.name);
                }
                Some(_) => return UrlCreation::failed(CreateStatus::PARAMS_MISMATCH),
                None if self.defaults.contains_key(&spec.name) => {}
                None => return UrlCreation::failed(CreateStatus::PARAMS_MISMATCH),
            }
        }

        let mut url = self.render_path(&mut values);
        if !url.is_empty() {
            url.push_str(self.suffix.as_deref().unwrap_or(ctx.suffix));
        }

        let query = build_query(&remaining);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        if let Some(fragment) = anchor {
            url.push('#');
            url.push_str(&fragment);
        }

        UrlCreation::created(url)
    }

    fn signature(&self) -> Option<RuleSignature> {
        if !self.mode.can_parse() {
            return None;
        }
        let mut verbs: Vec<HttpMethod> = self.verbs.to_vec();
        verbs.sort();
        verbs.dedup();
        Some(RuleSignature {
            verbs,
            matcher: self
                .pattern
                .shapes()
                .iter()
                .map(|shape| shape.regex().as_str())
                .collect::<Vec<_>>()
                .join("|"),
            suffix: self.suffix.clone(),
        })
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for UrlRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        if !self.verbs.is_empty() {
            let verbs: Vec<&str> = self.verbs.iter().map(HttpMethod::as_str).collect();
            out.push_str(&verbs.join(","));
            out.push(' ');
        }
        if let Some(host) = &self.host
            && !self.name.contains(host.as_str())
        {
            out.push_str(host);
            out.push('/');
        }
        out.push_str(&self.name);

        if out.is_empty() {
            f.write_str("/")
        } else {
            f.write_str(&out)
        }
    }
}

/// Removes `suffix` from the end of `path`. `None` when the suffix is missing
/// or is all there is.
pub(crate) fn strip_suffix<'a>(path: &'a str, suffix: &str) -> Option<&'a str> {
    if suffix.is_empty() || path.is_empty() {
        return Some(path);
    }
    match path.strip_suffix(suffix) {
        Some("") | None => None,
        Some(stripped) => Some(stripped),
    }
}

/// Replaces shorthand tokens such as `{id}`, longest token first, in a single
/// pass so replacements are never expanded again.
pub(crate) fn expand_tokens<'a>(
    pattern: &'a str,
    tokens: &BTreeMap<String, String>,
) -> Cow<'a, str> {
    if tokens.is_empty() || !tokens.keys().any(|token| pattern.contains(token.as_str())) {
        return Cow::Borrowed(pattern);
    }

    let mut ordered: SmallVec<[(&str, &str); 4]> = tokens
        .iter()
        .filter(|(token, _)| !token.is_empty())
        .map(|(token, replacement)| (token.as_str(), replacement.as_str()))
        .collect();
    ordered.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

    let mut out = String::with_capacity(pattern.len());
    let mut rest = pattern;
    'outer: while !rest.is_empty() {
        for (token, replacement) in &ordered {
            if let Some(tail) = rest.strip_prefix(token) {
                out.push_str(replacement);
                rest = tail;
                continue 'outer;
            }
        }
        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            out.push(ch);
        }
        rest = chars.as_str();
    }
    Cow::Owned(out)
}

fn percent_decoded(value: &str) -> Cow<'_, str> {
    urlencoding::decode(value).unwrap_or(Cow::Borrowed(value))
}

/// Trims slashes on both ends but keeps a protocol-relative `//`.
fn trim_slashes(value: &str) -> Cow<'_, str> {
    if value.starts_with("//") {
        Cow::Owned(format!("//{}", value.trim_matches('/')))
    } else {
        Cow::Borrowed(value.trim_matches('/'))
    }
}

/// The `scheme://host` (or `//host`) part of a host-bearing pattern.
fn host_prefix(pattern: &str, from: usize) -> &str {
    match pattern.as_bytes().get(from..).and_then(|tail| memchr(b'/', tail)) {
        Some(rel) => &pattern[..from + rel],
        None => pattern,
    }
}

fn squeeze_slashes(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut prev_slash = false;
    for ch in value.chars() {
        if ch == '/' {
            if !prev_slash {
                out.push(ch);
            }
            prev_slash = true;
        } else {
            out.push(ch);
            prev_slash = false;
        }
    }
    out
}
