use crate::enums::HttpMethod;
use crate::types::RouteParams;
use std::borrow::Cow;

const DEFAULT_SCHEME: &str = "http";

/// The slice of an HTTP request the rules look at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: HttpMethod,
    path_info: String,
    host: Option<String>,
    scheme: Option<String>,
    query: RouteParams,
}

impl Request {
    /// `path` may carry one leading slash and percent-encoding; both are
    /// removed here so rules only ever see the decoded path info.
    pub fn new(method: HttpMethod, path: &str) -> Self {
        let trimmed = path.strip_prefix('/').unwrap_or(path);
        let path_info = match urlencoding::decode(trimmed) {
            Ok(Cow::Borrowed(_)) => trimmed.to_string(),
            Ok(Cow::Owned(decoded)) => decoded,
            Err(_) => trimmed.to_string(),
        };

        Self {
            method,
            path_info,
            host: None,
            scheme: None,
            query: RouteParams::new(),
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn with_host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_scheme<S: Into<String>>(mut self, scheme: S) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    pub fn with_query(mut self, query: RouteParams) -> Self {
        self.query = query;
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path_info(&self) -> &str {
        &self.path_info
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn scheme(&self) -> &str {
        self.scheme.as_deref().unwrap_or(DEFAULT_SCHEME)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// `scheme://host`, or an empty string when the host is unknown.
    pub fn host_info(&self) -> String {
        match self.host.as_deref() {
            Some(host) => format!("{}://{}", self.scheme(), host),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_a_single_leading_slash() {
        assert_eq!(Request::get("/post/1").path_info(), "post/1");
        assert_eq!(Request::get("//post").path_info(), "/post");
        assert_eq!(Request::get("post").path_info(), "post");
    }

    #[test]
    fn decodes_percent_encoding() {
        assert_eq!(Request::get("/tag/a%20b").path_info(), "tag/a b");
    }

    #[test]
    fn builds_host_info_with_default_scheme() {
        let req = Request::get("/").with_host("en.example.com");
        assert_eq!(req.host_info(), "http://en.example.com");
        let req = req.with_scheme("https");
        assert_eq!(req.host_info(), "https://en.example.com");
        assert_eq!(Request::get("/").host_info(), "");
    }
}
