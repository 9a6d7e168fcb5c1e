#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use preload_core::{
    Action, Cancellable, Component, Descriptor, Dispatcher, Environment, LoadContext, LoadFn,
    LoadOptions, LoadReturn, LoadTask, Location, MatchedRoute, NullDispatcher, PreloadDispatcher,
    PreloadError, PreloadEvent, RouteComponent, RouteMatch, RouteMatcher, SessionHandle,
};

/// Ordered log of task lifecycle points, e.g. `"A:start"`, `"A:end"`.
#[derive(Clone, Default)]
pub struct Timeline {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Timeline {
    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().unwrap().clone()
    }

    pub fn position(&self, entry: &str) -> usize {
        self.entries()
            .iter()
            .position(|e| e == entry)
            .unwrap_or_else(|| panic!("{entry} not recorded in {:?}", self.entries()))
    }

    pub fn count(&self, entry: &str) -> usize {
        self.entries().iter().filter(|e| *e == entry).count()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.entries().iter().any(|e| e == entry)
    }
}

/// Task that records its start, sleeps `ms`, records its end, then settles.
pub fn scripted(
    timeline: &Timeline,
    name: &str,
    ms: u64,
    fail: bool,
    options: LoadOptions,
) -> Arc<dyn LoadTask> {
    let timeline = timeline.clone();
    let label = name.to_string();
    Arc::new(
        LoadFn::new(move |_ctx: LoadContext| {
            let timeline = timeline.clone();
            let label = label.clone();
            LoadReturn::future(async move {
                timeline.push(format!("{label}:start"));
                tokio::time::sleep(Duration::from_millis(ms)).await;
                timeline.push(format!("{label}:end"));
                if fail {
                    Err(PreloadError::from(anyhow::anyhow!("{label} failed")))
                } else {
                    Ok(())
                }
            })
        })
        .with_options(options),
    )
}

/// Like [`scripted`], but rejects on its first `failures` invocations.
pub fn flaky(timeline: &Timeline, name: &str, ms: u64, failures: usize) -> Arc<dyn LoadTask> {
    let timeline = timeline.clone();
    let label = name.to_string();
    let calls = Arc::new(AtomicUsize::new(0));
    Arc::new(LoadFn::new(move |_ctx: LoadContext| {
        let timeline = timeline.clone();
        let label = label.clone();
        let fail = calls.fetch_add(1, Ordering::SeqCst) < failures;
        LoadReturn::future(async move {
            timeline.push(format!("{label}:start"));
            tokio::time::sleep(Duration::from_millis(ms)).await;
            timeline.push(format!("{label}:end"));
            if fail {
                Err(PreloadError::from(anyhow::anyhow!("{label} down")))
            } else {
                Ok(())
            }
        })
    }))
}

pub fn component(name: &str, task: Arc<dyn LoadTask>) -> Arc<dyn RouteComponent> {
    Arc::new(Component::new(name).with_shared_loader(task))
}

pub fn context(env: Environment, session: &SessionHandle) -> LoadContext {
    LoadContext {
        location: session.location(),
        params: Default::default(),
        route_path: session.location().pathname,
        server: env.is_server(),
        dispatch: PreloadDispatcher::new(Arc::new(NullDispatcher), env, session.clone()),
    }
}

pub fn descriptor(name: &str, task: Arc<dyn LoadTask>, ctx: &LoadContext) -> Descriptor {
    Descriptor::new(name, task, ctx.clone())
}

/// Counts how often its cancel handle was invoked.
#[derive(Default)]
pub struct CancelProbe {
    calls: AtomicUsize,
}

impl CancelProbe {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Cancellable for CancelProbe {
    fn cancel(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Cancellable task sleeping `ms` before succeeding.
pub fn cancellable(
    timeline: &Timeline,
    name: &str,
    ms: u64,
    probe: Arc<CancelProbe>,
    options: LoadOptions,
) -> Arc<dyn LoadTask> {
    let timeline = timeline.clone();
    let label = name.to_string();
    Arc::new(
        LoadFn::new(move |_ctx: LoadContext| {
            let timeline = timeline.clone();
            let label = label.clone();
            LoadReturn::cancellable(
                async move {
                    timeline.push(format!("{label}:start"));
                    tokio::time::sleep(Duration::from_millis(ms)).await;
                    timeline.push(format!("{label}:end"));
                    Ok(())
                },
                probe.clone(),
            )
        })
        .with_options(options),
    )
}

/// Task that dispatches a navigation through its preload dispatcher.
pub fn navigating(target: &str) -> Arc<dyn LoadTask> {
    let target = target.to_string();
    Arc::new(LoadFn::new(move |ctx: LoadContext| {
        let target = target.clone();
        LoadReturn::future(async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            ctx.dispatch.dispatch(Action::Navigate(
                preload_core::NavigationAction::to(target.as_str()),
            ))?;
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok::<(), PreloadError>(())
        })
    }))
}

/// Dispatcher recording every action.
#[derive(Default)]
pub struct Recorder {
    actions: Mutex<Vec<Action>>,
}

impl Recorder {
    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<PreloadEvent> {
        self.actions()
            .into_iter()
            .filter_map(|a| match a {
                Action::Preload(event) => Some(event),
                _ => None,
            })
            .collect()
    }

    /// Compact trace: `preload.started`, `superseded`, `location_changed:/b`, `navigate:/x`.
    pub fn trace(&self) -> Vec<String> {
        self.actions()
            .iter()
            .map(|a| match a {
                Action::Preload(e) if e.is_superseded() => "superseded".to_string(),
                Action::Preload(e) => e.kind().to_string(),
                Action::LocationChanged(l) => format!("location_changed:{l}"),
                Action::Navigate(n) => format!("navigate:{}", n.location),
                Action::Custom(v) => format!("custom:{v}"),
            })
            .collect()
    }
}

impl Dispatcher for Recorder {
    fn dispatch(&self, action: Action) {
        self.actions.lock().unwrap().push(action);
    }
}

/// Matcher over a fixed path table.
#[derive(Default)]
pub struct StaticMatcher {
    routes: HashMap<String, RouteMatch>,
    delay_ms: u64,
}

impl StaticMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, path: &str, components: Vec<Arc<dyn RouteComponent>>) -> Self {
        self.routes.insert(
            path.to_string(),
            RouteMatch::Matched(MatchedRoute {
                components,
                params: Default::default(),
                route_path: path.to_string(),
            }),
        );
        self
    }

    pub fn redirect(mut self, path: &str, target: &str) -> Self {
        self.routes
            .insert(path.to_string(), RouteMatch::Redirect(Location::parse(target)));
        self
    }

    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

#[async_trait]
impl RouteMatcher for StaticMatcher {
    async fn match_route(&self, location: &Location) -> Result<RouteMatch, PreloadError> {
        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }
        self.routes
            .get(&location.pathname)
            .cloned()
            .ok_or_else(|| PreloadError::Routing(anyhow::anyhow!("no route for {location}")))
    }
}
