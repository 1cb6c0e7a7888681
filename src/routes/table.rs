use axum::http::Method;
use identity::Visibility;

use super::rule::{MethodMatcher, PathMatcher, RouteRule};

/// Ordered rule list. More specific rules must come before the broader
/// rules that would otherwise shadow them.
#[derive(Debug, Clone)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
    fallback: Visibility,
}

impl RouteTable {
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self {
            rules,
            fallback: Visibility::Protected,
        }
    }

    /// The edge policy for this deployment.
    pub fn standard() -> Result<Self, regex::Error> {
        use Visibility::*;

        let read = || MethodMatcher::only([Method::GET, Method::HEAD]);

        let mut rules = Vec::new();

        // Health and API metadata
        for prefix in ["/health", "/v3/api-docs", "/swagger-ui", "/docs"] {
            rules.push(RouteRule::new(
                MethodMatcher::Any,
                PathMatcher::prefix(prefix),
                Public,
            ));
        }

        // Pre-flight never hits authentication
        rules.push(RouteRule::new(
            MethodMatcher::only([Method::OPTIONS]),
            PathMatcher::pattern(".*")?,
            Public,
        ));

        for path in ["/auth/register", "/auth/login"] {
            rules.push(RouteRule::new(
                MethodMatcher::only([Method::POST]),
                PathMatcher::exact(path),
                Public,
            ));
        }

        // Nested inside the public listing namespace, so it goes first
        rules.push(RouteRule::new(
            MethodMatcher::Any,
            PathMatcher::prefix("/properties/admin"),
            AdminOnly,
        ));

        rules.push(RouteRule::new(
            read(),
            PathMatcher::exact("/properties"),
            PublicOptional,
        ));
        rules.push(RouteRule::new(
            read(),
            PathMatcher::prefix("/properties/search"),
            PublicOptional,
        ));
        rules.push(RouteRule::new(
            read(),
            PathMatcher::pattern(r"/properties/\d+")?,
            PublicOptional,
        ));

        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn classify(&self, method: &Method, path: &str) -> Visibility {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map(|rule| rule.visibility)
            .unwrap_or(self.fallback)
    }
}
