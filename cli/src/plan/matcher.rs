use async_trait::async_trait;
use preload_core::{Location, MatchedRoute, PreloadError, RouteMatch, RouteMatcher, RouteParams};

use super::{split_path, CompiledRoute, RouteTarget, Segment};

/// [`RouteMatcher`] over a loaded plan. The first matching route wins.
///
/// Components are built once at load time, so the same component keeps its
/// identity across navigations.
pub struct PlanMatcher {
    routes: Vec<CompiledRoute>,
}

impl std::fmt::Debug for PlanMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlanMatcher")
            .field("routes", &self.routes.len())
            .finish()
    }
}

impl PlanMatcher {
    pub(crate) fn new(routes: Vec<CompiledRoute>) -> Self {
        Self { routes }
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn resolve(&self, location: &Location) -> Option<RouteMatch> {
        self.routes.iter().find_map(|route| {
            let params = match_segments(&route.segments, &location.pathname)?;
            Some(match &route.target {
                RouteTarget::Redirect(target) => RouteMatch::Redirect(target.clone()),
                RouteTarget::Components(components) => RouteMatch::Matched(MatchedRoute {
                    components: components.clone(),
                    params,
                    route_path: route.pattern.clone(),
                }),
            })
        })
    }
}

#[async_trait]
impl RouteMatcher for PlanMatcher {
    async fn match_route(&self, location: &Location) -> Result<RouteMatch, PreloadError> {
        self.resolve(location).ok_or_else(|| {
            PreloadError::Routing(anyhow::anyhow!("no route matches {}", location.pathname))
        })
    }
}

fn match_segments(pattern: &[Segment], pathname: &str) -> Option<RouteParams> {
    let parts: Vec<&str> = split_path(pathname).collect();
    if parts.len() != pattern.len() {
        return None;
    }

    let mut params = RouteParams::new();
    for (segment, part) in pattern.iter().zip(parts) {
        match segment {
            Segment::Static(s) if s == part => {}
            Segment::Static(_) => return None,
            Segment::Param(name) => {
                params.insert(name.clone(), part.to_string());
            }
        }
    }
    Some(params)
}

#[cfg(test)]
mod tests {
    use super::super::parse_plan;
    use super::*;
    use pretty_assertions::assert_eq;

    const PLAN: &str = r#"
        [[routes]]
        path = "/"

        [[routes.components]]
        id = "Shell"

        [[routes]]
        path = "/users/:id/posts/:post"

        [[routes.components]]
        id = "Shell"

        [[routes.components]]
        id = "Post"
        load = { delay_ms = 5 }

        [[routes]]
        path = "/legacy"
        redirect = "/?from=legacy"
    "#;

    #[test]
    fn test_captures_params() {
        let matcher = parse_plan(PLAN).unwrap();
        match matcher.resolve(&Location::parse("/users/7/posts/42?x=1")) {
            Some(RouteMatch::Matched(route)) => {
                assert_eq!(route.route_path, "/users/:id/posts/:post");
                assert_eq!(route.params.get("id").map(String::as_str), Some("7"));
                assert_eq!(route.params.get("post").map(String::as_str), Some("42"));
                assert_eq!(route.components.len(), 2);
            }
            other => panic!("unexpected match: {other:?}"),
        }
    }

    #[test]
    fn test_root_and_redirect_routes() {
        let matcher = parse_plan(PLAN).unwrap();
        assert!(matches!(
            matcher.resolve(&Location::new("/")),
            Some(RouteMatch::Matched(_))
        ));
        match matcher.resolve(&Location::new("/legacy")) {
            Some(RouteMatch::Redirect(target)) => assert_eq!(target.url(), "/?from=legacy"),
            other => panic!("unexpected match: {other:?}"),
        }
        assert!(matcher.resolve(&Location::new("/users/7")).is_none());
    }

    #[tokio::test]
    async fn test_unmatched_location_is_a_routing_error() {
        let matcher = parse_plan(PLAN).unwrap();
        let err = matcher
            .match_route(&Location::new("/nowhere"))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), preload_core::ErrorCode::RoutingError);
    }
}
