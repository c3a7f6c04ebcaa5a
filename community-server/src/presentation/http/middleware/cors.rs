use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Browsers cache a preflight answer for this long.
const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(600);

/// Which browser origins may call the API, parsed from `CORS_ORIGINS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CorsPolicy {
    AnyOrigin,
    Origins(Vec<HeaderValue>),
}

impl CorsPolicy {
    /// `*` alone opens the API to every origin. Otherwise each entry must be a
    /// bare `scheme://host[:port]`, the exact form browsers send in `Origin`.
    pub(crate) fn parse(origins: &[String]) -> Result<Self> {
        if origins.is_empty() {
            bail!("CORS_ORIGINS must list at least one origin or `*`");
        }
        if origins.iter().any(|origin| origin == "*") {
            if origins.len() > 1 {
                bail!("`*` cannot be combined with explicit CORS origins");
            }
            return Ok(CorsPolicy::AnyOrigin);
        }

        origins
            .iter()
            .map(|origin| parse_origin(origin))
            .collect::<Result<Vec<_>>>()
            .map(CorsPolicy::Origins)
    }

    fn allow_origin(self) -> AllowOrigin {
        match self {
            CorsPolicy::AnyOrigin => AllowOrigin::any(),
            CorsPolicy::Origins(origins) => AllowOrigin::list(origins),
        }
    }
}

fn parse_origin(origin: &str) -> Result<HeaderValue> {
    let rest = origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"))
        .ok_or_else(|| anyhow!("CORS origin `{origin}` must start with http:// or https://"))?;
    if rest.is_empty() || rest.contains('/') {
        bail!("CORS origin `{origin}` must not carry a path or trailing slash");
    }

    origin
        .parse::<HeaderValue>()
        .map_err(|err| anyhow!("invalid CORS origin `{origin}`: {err}"))
}

pub(crate) fn build_cors_layer(policy: CorsPolicy) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(policy.allow_origin())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(PREFLIGHT_MAX_AGE)
}

pub(crate) fn apply_cors(router: Router, origins: &[String]) -> Result<Router> {
    let policy = CorsPolicy::parse(origins)?;
    Ok(router.layer(build_cors_layer(policy)))
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode, header},
        routing::get,
    };
    use tower::ServiceExt;

    use super::{CorsPolicy, apply_cors};

    fn origins(list: &[&str]) -> Vec<String> {
        list.iter().map(|origin| origin.to_string()).collect()
    }

    async fn preflight(router: Router, origin: &str) -> (StatusCode, Option<String>) {
        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/posts")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .expect("request must build");
        let response = router.oneshot(request).await.expect("router is infallible");
        let allowed = response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        (response.status(), allowed)
    }

    fn app(list: &[&str]) -> Router {
        apply_cors(Router::new().route("/api/posts", get(|| async {})), &origins(list))
            .expect("origins must be accepted")
    }

    #[test]
    fn policy_rejects_misconfigured_origin_lists() {
        assert!(CorsPolicy::parse(&[]).is_err());
        assert!(CorsPolicy::parse(&origins(&["*", "http://a.test"])).is_err());
        assert!(CorsPolicy::parse(&origins(&["a.test"])).is_err());
        assert!(CorsPolicy::parse(&origins(&["http://a.test/"])).is_err());
        assert!(CorsPolicy::parse(&origins(&["http://bad\norigin"])).is_err());
        assert_eq!(
            CorsPolicy::parse(&origins(&["*"])).expect("wildcard is valid"),
            CorsPolicy::AnyOrigin
        );
    }

    #[tokio::test]
    async fn preflight_echoes_only_listed_origins() {
        let router = app(&["http://localhost:3000", "https://community.test"]);

        let (status, allowed) = preflight(router.clone(), "https://community.test").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(allowed.as_deref(), Some("https://community.test"));

        let (_, allowed) = preflight(router, "https://evil.test").await;
        assert_eq!(allowed, None);
    }

    #[tokio::test]
    async fn wildcard_allows_any_origin() {
        let (_, allowed) = preflight(app(&["*"]), "https://anywhere.test").await;
        assert_eq!(allowed.as_deref(), Some("*"));
    }
}
