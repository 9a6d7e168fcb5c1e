//! Descriptor list builder.
//!
//! Turns the matched route's components (outermost first) into the ordered
//! list of load-task descriptors for one navigation, applying the
//! environment filters and the client-side skip policy.

mod previous;

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::{PreloadSettings, QueryScope};
use crate::dispatch::PreloadDispatcher;
use crate::executor::{LoadOptions, LoadTask, TaskHandle};
use crate::location::{Location, RouteParams};
use crate::navigation::MatchedRoute;
use crate::runtime::Environment;

pub use previous::{PreviousRoutes, RouteEntry};

/// Arguments handed to every load task of one navigation.
#[derive(Clone)]
pub struct LoadContext {
    pub location: Location,
    pub params: RouteParams,
    pub route_path: String,
    pub server: bool,
    pub dispatch: PreloadDispatcher,
}

impl fmt::Debug for LoadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadContext")
            .field("location", &self.location)
            .field("params", &self.params)
            .field("route_path", &self.route_path)
            .field("server", &self.server)
            .finish_non_exhaustive()
    }
}

/// A load task paired with its options, bound to one navigation's context.
#[derive(Clone)]
pub struct Descriptor {
    component_id: String,
    options: LoadOptions,
    task: Arc<dyn LoadTask>,
    ctx: LoadContext,
}

impl Descriptor {
    pub fn new(component_id: impl Into<String>, task: Arc<dyn LoadTask>, ctx: LoadContext) -> Self {
        let options = task.options();
        Self {
            component_id: component_id.into(),
            options,
            task,
            ctx,
        }
    }

    pub fn component_id(&self) -> &str {
        &self.component_id
    }

    pub fn options(&self) -> LoadOptions {
        self.options
    }

    pub fn is_blocking(&self) -> bool {
        self.options.blocking
    }

    /// Launch the task. Never panics on a misbehaving task: a non-async
    /// return settles as a configuration error instead.
    pub fn invoke(&self) -> TaskHandle {
        TaskHandle::from_return(&self.component_id, self.task.load(self.ctx.clone()))
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("component_id", &self.component_id)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Client-side skip optimization for components unchanged since the
/// previous navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkipPolicy {
    pub enabled: bool,
    pub query_scope: QueryScope,
}

impl SkipPolicy {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            query_scope: QueryScope::Innermost,
        }
    }
}

impl Default for SkipPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            query_scope: QueryScope::Innermost,
        }
    }
}

impl From<&PreloadSettings> for SkipPolicy {
    fn from(settings: &PreloadSettings) -> Self {
        Self {
            enabled: settings.skip_unchanged,
            query_scope: settings.query_scope,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DescriptorListBuilder {
    env: Environment,
    initial_client_side_preload: bool,
    skip: SkipPolicy,
}

impl DescriptorListBuilder {
    pub fn new(env: Environment) -> Self {
        Self {
            env,
            initial_client_side_preload: false,
            skip: SkipPolicy::default(),
        }
    }

    /// Mark this pass as the post-hydration client pass: only client-only
    /// tasks run, everything else was already loaded on the server.
    pub fn initial_client_side_preload(mut self, initial: bool) -> Self {
        self.initial_client_side_preload = initial;
        self
    }

    pub fn skip_policy(mut self, skip: SkipPolicy) -> Self {
        self.skip = skip;
        self
    }

    pub fn build(
        &self,
        route: &MatchedRoute,
        previous: &PreviousRoutes,
        ctx: &LoadContext,
    ) -> Vec<Descriptor> {
        let start = self.first_retained(route, previous, &ctx.location);
        if start > 0 {
            debug!(
                skipped = start,
                route = %route.route_path,
                "skipping unchanged outer components"
            );
        }

        route.components[start..]
            .iter()
            .filter_map(|component| {
                let task = component.loader()?;
                let options = task.options();
                if !self.admits(options) {
                    debug!(
                        component = component.id(),
                        env = %self.env,
                        client = options.client,
                        "load task filtered out"
                    );
                    return None;
                }
                Some(Descriptor::new(component.id(), task, ctx.clone()))
            })
            .collect()
    }

    fn admits(&self, options: LoadOptions) -> bool {
        if options.client && self.env.is_server() {
            return false;
        }
        if self.initial_client_side_preload && !options.client {
            return false;
        }
        true
    }

    /// Index of the first component that must be loaded. The innermost
    /// component is always retained.
    fn first_retained(
        &self,
        route: &MatchedRoute,
        previous: &PreviousRoutes,
        location: &Location,
    ) -> usize {
        let total = route.components.len();
        if total == 0 || self.env.is_server() || !self.skip.enabled || previous.is_empty() {
            return 0;
        }
        if self.skip.query_scope == QueryScope::All && previous.search() != location.search {
            return 0;
        }

        let unchanged = previous.unchanged_prefix(&route.components, &route.params);
        unchanged.min(total - 1)
    }
}
