use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::PreloadError;
use crate::executor::LoadTask;
use crate::location::{Location, RouteParams};

/// A component along a matched route.
pub trait RouteComponent: Send + Sync {
    /// Stable identity, used by the client-side skip policy.
    fn id(&self) -> &str;

    fn loader(&self) -> Option<Arc<dyn LoadTask>> {
        None
    }
}

/// Plain [`RouteComponent`] with an optional load task.
#[derive(Clone)]
pub struct Component {
    id: String,
    loader: Option<Arc<dyn LoadTask>>,
}

impl Component {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            loader: None,
        }
    }

    pub fn with_loader(mut self, task: impl LoadTask + 'static) -> Self {
        self.loader = Some(Arc::new(task));
        self
    }

    pub fn with_shared_loader(mut self, task: Arc<dyn LoadTask>) -> Self {
        self.loader = Some(task);
        self
    }
}

impl RouteComponent for Component {
    fn id(&self) -> &str {
        &self.id
    }

    fn loader(&self) -> Option<Arc<dyn LoadTask>> {
        self.loader.clone()
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("id", &self.id)
            .field("has_loader", &self.loader.is_some())
            .finish()
    }
}

/// Matched state: components from outermost to innermost.
#[derive(Clone)]
pub struct MatchedRoute {
    pub components: Vec<Arc<dyn RouteComponent>>,
    pub params: RouteParams,
    /// Route pattern, e.g. `/users/:id`.
    pub route_path: String,
}

impl fmt::Debug for MatchedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self.components.iter().map(|c| c.id()).collect();
        f.debug_struct("MatchedRoute")
            .field("components", &ids)
            .field("params", &self.params)
            .field("route_path", &self.route_path)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum RouteMatch {
    Matched(MatchedRoute),
    Redirect(Location),
}

/// Route resolution, supplied by the application.
#[async_trait]
pub trait RouteMatcher: Send + Sync {
    async fn match_route(&self, location: &Location) -> Result<RouteMatch, PreloadError>;
}
