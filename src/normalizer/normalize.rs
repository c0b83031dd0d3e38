use crate::types::ParsedRoute;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use super::{NormalizerAction, RedirectStatus, RouteOutcome};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlNormalizer {
    pub collapse_slashes: bool,
    pub normalize_trailing_slash: bool,
    pub action: NormalizerAction,
}

impl Default for UrlNormalizer {
    fn default() -> Self {
        Self {
            collapse_slashes: true,
            normalize_trailing_slash: true,
            action: NormalizerAction::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPath<'a> {
    pub path: Cow<'a, str>,
    pub changed: bool,
}

impl UrlNormalizer {
    pub fn with_action(action: NormalizerAction) -> Self {
        Self {
            action,
            ..Self::default()
        }
    }

    #[tracing::instrument(level = "trace", skip(self), fields(path_len=path_info.len() as u64))]
    pub fn normalize_path_info<'a>(&self, path_info: &'a str, suffix: &str) -> NormalizedPath<'a> {
        if path_info.is_empty() {
            return NormalizedPath {
                path: Cow::Borrowed(path_info),
                changed: false,
            };
        }

        let mut path = Cow::Borrowed(path_info);
        if self.collapse_slashes {
            path = collapse_slashes(path);
        }
        if self.normalize_trailing_slash {
            path = normalize_trailing_slash(path, suffix);
        }

        let changed = path != path_info;
        NormalizedPath { path, changed }
    }

    pub fn normalize_route(&self, route: ParsedRoute) -> RouteOutcome {
        match &self.action {
            NormalizerAction::None => RouteOutcome::Matched(route),
            NormalizerAction::RedirectPermanent => RouteOutcome::Redirect {
                target: route,
                status: RedirectStatus::MovedPermanently,
            },
            NormalizerAction::RedirectTemporary => RouteOutcome::Redirect {
                target: route,
                status: RedirectStatus::Found,
            },
            NormalizerAction::NotFound => RouteOutcome::NotFound,
            NormalizerAction::Custom(transform) => transform(route, self),
        }
    }
}

/// Replaces every run of slashes with one and drops leading slashes.
pub fn collapse_slashes(path: Cow<'_, str>) -> Cow<'_, str> {
    if !path.contains("//") && !path.starts_with('/') {
        return path;
    }

    let mut output = String::with_capacity(path.len());
    let mut prev_was_slash = true;
    for ch in path.chars() {
        if ch == '/' {
            if !prev_was_slash {
                output.push(ch);
            }
            prev_was_slash = true;
        } else {
            output.push(ch);
            prev_was_slash = false;
        }
    }
    Cow::Owned(output)
}

/// Makes the trailing slash follow the suffix: present when the suffix ends
/// with `/`, absent otherwise.
pub fn normalize_trailing_slash<'a>(path: Cow<'a, str>, suffix: &str) -> Cow<'a, str> {
    let wants_slash = suffix.ends_with('/');
    let has_slash = path.ends_with('/');

    if wants_slash && !has_slash {
        let mut owned = path.into_owned();
        owned.push('/');
        Cow::Owned(owned)
    } else if !wants_slash && has_slash {
        Cow::Owned(path.trim_end_matches('/').to_string())
    } else {
        path
    }
}
