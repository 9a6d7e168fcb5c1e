use std::path::Path;
use std::sync::Arc;

use preload_core::config::PreloadConfig;
use preload_core::error::CliError;
use preload_core::{
    Chain, DescriptorListBuilder, Environment, LoadContext, Location, NullDispatcher,
    PreloadDispatcher, PreviousRoutes, RouteMatch, RouteMatcher, SessionHandle, SkipPolicy,
};
use serde::Serialize;

use crate::output::JsonLines;
use crate::plan::load_plan;

use super::cli::PlanArgs;

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Layout {
    Chain {
        location: String,
        route: String,
        env: &'static str,
        stages: Vec<Stage>,
    },
    Redirect {
        location: String,
        target: String,
    },
}

#[derive(Debug, Serialize)]
struct Stage {
    batch: bool,
    components: Vec<String>,
}

/// Print the stage layout of a first navigation to `args.location`.
pub async fn run(args: PlanArgs, cfg: &PreloadConfig) -> Result<i32, CliError> {
    let matcher = load_plan(Path::new(&args.source.plan))?;
    let location = Location::parse(&args.location);
    let env = if args.source.server {
        Environment::Server
    } else {
        Environment::Client
    };

    let layout = match matcher.match_route(&location).await? {
        RouteMatch::Redirect(target) => Layout::Redirect {
            location: location.url(),
            target: target.url(),
        },
        RouteMatch::Matched(route) => {
            let session = SessionHandle::new(location.clone());
            let ctx = LoadContext {
                location: location.clone(),
                params: route.params.clone(),
                route_path: route.route_path.clone(),
                server: env.is_server(),
                dispatch: PreloadDispatcher::new(Arc::new(NullDispatcher), env, session),
            };
            let descriptors = DescriptorListBuilder::new(env)
                .initial_client_side_preload(args.source.hydrated)
                .skip_policy(SkipPolicy::from(&cfg.preload))
                .build(&route, &PreviousRoutes::new(), &ctx);
            let chain = Chain::build(descriptors);

            Layout::Chain {
                location: location.url(),
                route: route.route_path.clone(),
                env: env.as_str(),
                stages: chain
                    .stages()
                    .iter()
                    .map(|stage| Stage {
                        batch: stage.is_batch(),
                        components: stage.component_ids(),
                    })
                    .collect(),
            }
        }
    };

    JsonLines::default().print(&layout);
    Ok(0)
}
