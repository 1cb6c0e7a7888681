use axum::http::Method;
use identity::Visibility;
use regex::Regex;

#[derive(Debug, Clone)]
pub enum MethodMatcher {
    Any,
    Only(Vec<Method>),
}

impl MethodMatcher {
    pub fn only(methods: impl IntoIterator<Item = Method>) -> Self {
        Self::Only(methods.into_iter().collect())
    }

    pub fn matches(&self, method: &Method) -> bool {
        match self {
            MethodMatcher::Any => true,
            MethodMatcher::Only(methods) => methods.contains(method),
        }
    }
}

#[derive(Debug, Clone)]
pub enum PathMatcher {
    Exact(String),
    /// Whole segments only: `/a/b` covers `/a/b` and `/a/b/...`, not `/a/bc`.
    Prefix(String),
    Pattern(Regex),
}

impl PathMatcher {
    pub fn exact(path: impl Into<String>) -> Self {
        Self::Exact(path.into())
    }

    pub fn prefix(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self::Prefix(prefix.trim_end_matches('/').to_string())
    }

    /// Compile an anchored pattern.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        let anchored = format!(
            "^(?:{})$",
            pattern.trim_start_matches('^').trim_end_matches('$')
        );
        Regex::new(&anchored).map(Self::Pattern)
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathMatcher::Exact(expected) => path == expected,
            PathMatcher::Prefix(prefix) => segment_prefix(path, prefix),
            PathMatcher::Pattern(re) => re.is_match(path),
        }
    }
}

pub(crate) fn segment_prefix(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[derive(Debug, Clone)]
pub struct RouteRule {
    pub method: MethodMatcher,
    pub path: PathMatcher,
    pub visibility: Visibility,
}

impl RouteRule {
    pub fn new(method: MethodMatcher, path: PathMatcher, visibility: Visibility) -> Self {
        Self {
            method,
            path,
            visibility,
        }
    }

    pub fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.matches(method) && self.path.matches(path)
    }
}
