//! Routing plans: a TOML description of routes, their components and the
//! simulated load task each component declares.
//!
//! ```toml
//! [[routes]]
//! path = "/users/:id"
//!
//! [[routes.components]]
//! id = "Shell"
//! load = { delay_ms = 20 }
//!
//! [[routes.components]]
//! id = "Profile"
//! load = { delay_ms = 50, blocking = false, fail = "backend down" }
//!
//! [[routes]]
//! path = "/old"
//! redirect = "/users/1"
//! ```

mod matcher;
mod task;

use std::path::Path;
use std::sync::Arc;

use preload_core::error::CliError;
use preload_core::{Component, Location, RouteComponent};
use serde::Deserialize;

pub use matcher::PlanMatcher;
pub use task::{SimulatedTask, TaskSpec};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanFile {
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteSpec {
    /// Pattern; `:name` segments capture route params.
    pub path: String,

    /// Resolve this route to a redirect instead of components.
    #[serde(default)]
    pub redirect: Option<String>,

    /// Outermost first.
    #[serde(default)]
    pub components: Vec<ComponentSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentSpec {
    pub id: String,

    #[serde(default)]
    pub load: Option<TaskSpec>,
}

#[derive(Clone)]
pub(crate) enum RouteTarget {
    Components(Vec<Arc<dyn RouteComponent>>),
    Redirect(Location),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    Static(String),
    Param(String),
}

#[derive(Clone)]
pub(crate) struct CompiledRoute {
    pub pattern: String,
    pub segments: Vec<Segment>,
    pub target: RouteTarget,
}

/// Parse and validate a plan file.
pub fn load_plan(path: &Path) -> Result<PlanMatcher, CliError> {
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|e| CliError::plan(&display, e))?;
    parse_plan(&raw).map_err(|reason| CliError::plan(&display, reason))
}

pub fn parse_plan(raw: &str) -> Result<PlanMatcher, String> {
    let file: PlanFile = toml::from_str(raw).map_err(|e| e.to_string())?;
    if file.routes.is_empty() {
        return Err("plan declares no routes".to_string());
    }

    let routes = file
        .routes
        .into_iter()
        .map(compile_route)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(PlanMatcher::new(routes))
}

fn compile_route(spec: RouteSpec) -> Result<CompiledRoute, String> {
    if !spec.path.starts_with('/') {
        return Err(format!("route path must start with '/': {}", spec.path));
    }

    let segments = split_path(&spec.path)
        .map(|s| match s.strip_prefix(':') {
            Some(name) if !name.is_empty() => Ok(Segment::Param(name.to_string())),
            Some(_) => Err(format!("empty param name in {}", spec.path)),
            None => Ok(Segment::Static(s.to_string())),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let target = match spec.redirect {
        Some(_) if !spec.components.is_empty() => {
            return Err(format!(
                "route {} declares both a redirect and components",
                spec.path
            ));
        }
        Some(target) => RouteTarget::Redirect(Location::parse(&target)),
        None => {
            let mut components: Vec<Arc<dyn RouteComponent>> = Vec::new();
            for c in spec.components {
                if c.id.trim().is_empty() {
                    return Err(format!("component without id in route {}", spec.path));
                }
                let component = match c.load {
                    Some(load) => {
                        Component::new(&c.id).with_loader(SimulatedTask::new(&c.id, load))
                    }
                    None => Component::new(&c.id),
                };
                components.push(Arc::new(component));
            }
            RouteTarget::Components(components)
        }
    };

    Ok(CompiledRoute {
        pattern: spec.path,
        segments,
        target,
    })
}

pub(crate) fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}
