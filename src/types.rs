use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type RouteParams = BTreeMap<String, String>;

/// Key of the params entry rendered as the URL fragment.
pub const ANCHOR_PARAM: &str = "#";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRoute {
    pub route: String,
    pub params: RouteParams,
}

impl ParsedRoute {
    pub fn new<S: Into<String>>(route: S, params: RouteParams) -> Self {
        Self {
            route: route.into(),
            params,
        }
    }

    pub fn route_only<S: Into<String>>(route: S) -> Self {
        Self::new(route, RouteParams::new())
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Builds a [`RouteParams`] map from string pairs.
pub fn params<I, K, V>(pairs: I) -> RouteParams
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
