use crate::types::ParsedRoute;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::UrlNormalizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RedirectStatus {
    MovedPermanently,
    Found,
}

impl RedirectStatus {
    pub fn code(&self) -> u16 {
        match self {
            RedirectStatus::MovedPermanently => 301,
            RedirectStatus::Found => 302,
        }
    }
}

/// What a rule hands back after a successful structural match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    Matched(ParsedRoute),
    Redirect {
        target: ParsedRoute,
        status: RedirectStatus,
    },
    NotFound,
}

pub type RouteTransform =
    Arc<dyn Fn(ParsedRoute, &UrlNormalizer) -> RouteOutcome + Send + Sync + 'static>;

/// Applied to a route whose path info had to be normalized.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizerAction {
    None,
    #[default]
    RedirectPermanent,
    RedirectTemporary,
    NotFound,
    #[serde(skip)]
    Custom(RouteTransform),
}

impl NormalizerAction {
    pub fn custom<F>(transform: F) -> Self
    where
        F: Fn(ParsedRoute, &UrlNormalizer) -> RouteOutcome + Send + Sync + 'static,
    {
        NormalizerAction::Custom(Arc::new(transform))
    }
}

impl fmt::Debug for NormalizerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NormalizerAction::None => f.write_str("None"),
            NormalizerAction::RedirectPermanent => f.write_str("RedirectPermanent"),
            NormalizerAction::RedirectTemporary => f.write_str("RedirectTemporary"),
            NormalizerAction::NotFound => f.write_str("NotFound"),
            NormalizerAction::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}
