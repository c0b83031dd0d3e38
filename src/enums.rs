use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const HTTP_METHOD_COUNT: usize = 7;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
    Patch = 4,
    Head = 5,
    Options = 6,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; HTTP_METHOD_COUNT] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Delete,
        HttpMethod::Patch,
        HttpMethod::Head,
        HttpMethod::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }

    /// Strict form used by rule keys: only the upper-case spelling is a verb,
    /// anything else is part of the pattern.
    pub fn from_keyword(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == value)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown http method '{value}'")]
pub struct UnknownHttpMethod {
    pub value: String,
}

impl FromStr for HttpMethod {
    type Err = UnknownHttpMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::from_keyword(&upper).ok_or_else(|| UnknownHttpMethod {
            value: s.to_string(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RuleMode {
    #[default]
    Both,
    ParsingOnly,
    CreationOnly,
}

impl RuleMode {
    pub fn can_parse(&self) -> bool {
        !matches!(self, RuleMode::CreationOnly)
    }

    pub fn can_create(&self) -> bool {
        !matches!(self, RuleMode::ParsingOnly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_methods_case_insensitively() {
        assert_eq!("patch".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
        assert_eq!(" Get ".parse::<HttpMethod>(), Ok(HttpMethod::Get));
    }

    #[test]
    fn rejects_unknown_methods() {
        let err = "TRACE".parse::<HttpMethod>().unwrap_err();
        assert_eq!(err.value, "TRACE");
    }

    #[test]
    fn keyword_form_is_case_sensitive() {
        assert_eq!(HttpMethod::from_keyword("DELETE"), Some(HttpMethod::Delete));
        assert_eq!(HttpMethod::from_keyword("delete"), None);
    }
}
