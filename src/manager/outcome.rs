use crate::normalizer::RedirectStatus;
use crate::rule::CreateStatus;
use crate::types::ParsedRoute;

/// Result of parsing a request at manager level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Route(ParsedRoute),
    /// The path was not canonical; `url` is the canonical one.
    Redirect { url: String, status: RedirectStatus },
    NotFound,
}

impl Resolution {
    pub fn route(&self) -> Option<&ParsedRoute> {
        match self {
            Resolution::Route(route) => Some(route),
            _ => None,
        }
    }
}

/// A URL from [`crate::UrlManager::create_url`]. The URL is always usable;
/// a non-success status means no rule produced it and the plain fallback
/// form was used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedUrl {
    pub url: String,
    pub status: CreateStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowedRule {
    pub index: usize,
    pub shadowed_by: usize,
}
