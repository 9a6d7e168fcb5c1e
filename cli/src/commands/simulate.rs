use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use preload_core::config::PreloadConfig;
use preload_core::error::CliError;
use preload_core::{
    Environment, Location, NavigationAction, Navigator, Outcome, PreloadError, PreloadStats,
};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info, warn};

use crate::output::{ErrorRecord, JsonLines, NavigationRecord};
use crate::plan::{load_plan, PlanMatcher};

use super::cli::SimulateArgs;

pub async fn run(args: SimulateArgs, cfg: &PreloadConfig) -> Result<i32, CliError> {
    let matcher = Arc::new(load_plan(Path::new(&args.source.plan))?);
    info!(plan = %args.source.plan, routes = matcher.route_count(), "plan loaded");

    if args.source.server {
        run_server(&args, cfg, matcher).await
    } else {
        run_client(&args, cfg, matcher).await
    }
}

/// Every location is a separate request with its own runtime context.
async fn run_server(
    args: &SimulateArgs,
    cfg: &PreloadConfig,
    matcher: Arc<PlanMatcher>,
) -> Result<i32, CliError> {
    let out = Arc::new(JsonLines::default());
    let request = |idx: usize| {
        let navigator =
            build_navigator(Environment::Server, matcher.clone(), out.clone(), cfg, false);
        let action = NavigationAction::initial(Location::parse(&args.locations[idx]));
        let out = out.clone();
        async move { navigate(&navigator, &out, action).await }
    };

    let results = match args.stagger_ms {
        Some(ms) => {
            join_all((0..args.locations.len()).map(|idx| {
                let fut = request(idx);
                async move {
                    tokio::time::sleep(stagger(ms, idx)).await;
                    fut.await
                }
            }))
            .await
        }
        None => {
            let mut results = Vec::with_capacity(args.locations.len());
            for idx in 0..args.locations.len() {
                results.push(request(idx).await);
            }
            results
        }
    };

    for result in results {
        result?;
    }
    Ok(0)
}

/// All locations share one runtime context; later navigations supersede
/// pending ones.
async fn run_client(
    args: &SimulateArgs,
    cfg: &PreloadConfig,
    matcher: Arc<PlanMatcher>,
) -> Result<i32, CliError> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let out = Arc::new(JsonLines::following(tx));
    let navigator = build_navigator(
        Environment::Client,
        matcher,
        out.clone(),
        cfg,
        args.source.hydrated,
    );
    let max_redirects = cfg.preload.max_redirects;

    let action = |idx: usize| {
        let location = Location::parse(&args.locations[idx]);
        if idx == 0 {
            NavigationAction::initial(location)
        } else {
            NavigationAction::to(location)
        }
    };

    match args.stagger_ms {
        Some(ms) => {
            let navigator = &navigator;
            let out = &out;
            let results = join_all((0..args.locations.len()).map(|idx| {
                let action = action(idx);
                async move {
                    tokio::time::sleep(stagger(ms, idx)).await;
                    navigate(navigator, out, action).await
                }
            }))
            .await;
            for result in results {
                result?;
            }
            follow_up(navigator, out, &mut rx, max_redirects).await?;
        }
        None => {
            for idx in 0..args.locations.len() {
                navigate(&navigator, &out, action(idx)).await?;
                follow_up(&navigator, &out, &mut rx, max_redirects).await?;
            }
        }
    }

    Ok(0)
}

/// Run navigations dispatched while preloading (redirects, task-initiated
/// navigations) until none are left.
async fn follow_up(
    navigator: &Navigator,
    out: &JsonLines,
    rx: &mut UnboundedReceiver<NavigationAction>,
    max_redirects: usize,
) -> Result<(), CliError> {
    let mut hops = 0;
    while let Ok(next) = rx.try_recv() {
        if hops == max_redirects {
            warn!(target = %next.location, max_redirects, "redirect limit reached");
            return Err(CliError::Command(format!(
                "more than {max_redirects} follow-up navigations, last target {}",
                next.location
            )));
        }
        hops += 1;
        debug!(target = %next.location, hops, "following dispatched navigation");
        navigate(navigator, out, next).await?;
    }
    Ok(())
}

async fn navigate(
    navigator: &Navigator,
    out: &JsonLines,
    action: NavigationAction,
) -> Result<Outcome, PreloadError> {
    let navigation = action.location.url();
    let result = navigator.navigate(action).await;
    match &result {
        Ok(outcome) => out.print(&NavigationRecord {
            navigation,
            outcome,
        }),
        Err(err) => out.print(&ErrorRecord {
            navigation,
            outcome: "error",
            error: err.to_string(),
            code: err.error_code().as_u16(),
        }),
    }
    result
}

fn build_navigator(
    env: Environment,
    matcher: Arc<PlanMatcher>,
    out: Arc<JsonLines>,
    cfg: &PreloadConfig,
    hydrated: bool,
) -> Navigator {
    Navigator::builder(env, matcher, out)
        .settings(cfg.preload.clone())
        .server_rendered(hydrated)
        .on_navigate(Arc::new(|location: &Location| {
            debug!(url = %location, "navigating");
        }))
        .report_stats(Arc::new(|stats: PreloadStats| {
            info!(
                url = %stats.url,
                route = %stats.route,
                preload_ms = stats.time.preload,
                "preload stats"
            );
        }))
        .build()
}

fn stagger(ms: u64, idx: usize) -> Duration {
    Duration::from_millis(ms.saturating_mul(idx as u64))
}
