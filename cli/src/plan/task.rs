use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use preload_core::{
    Action, Cancellable, LoadContext, LoadOptions, LoadReturn, LoadTask, NavigationAction,
    PreloadError,
};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskSpec {
    #[serde(default)]
    pub delay_ms: u64,

    #[serde(default = "default_blocking")]
    pub blocking: bool,

    #[serde(default)]
    pub client: bool,

    /// Reject with this message after the delay.
    #[serde(default)]
    pub fail: Option<String>,

    /// Dispatch a navigation to this location after the delay.
    #[serde(default)]
    pub navigate: Option<String>,

    /// Return a list of this many futures instead of a single one.
    #[serde(default)]
    pub parts: Option<usize>,

    /// Expose a cooperative cancel handle.
    #[serde(default)]
    pub cancellable: bool,

    /// Return a non-future value of this kind.
    #[serde(default)]
    pub unsupported: Option<String>,
}

fn default_blocking() -> bool {
    true
}

/// Load task driven by a [`TaskSpec`]. On success it dispatches a custom
/// `loaded` action carrying the route params.
pub struct SimulatedTask {
    component: String,
    spec: TaskSpec,
}

impl SimulatedTask {
    pub fn new(component: impl Into<String>, spec: TaskSpec) -> Self {
        Self {
            component: component.into(),
            spec,
        }
    }

    fn run(
        &self,
        ctx: LoadContext,
        part: Option<usize>,
        cancel: Option<Arc<CancelFlag>>,
    ) -> impl Future<Output = Result<(), PreloadError>> + Send + 'static {
        let component = self.component.clone();
        let spec = self.spec.clone();
        async move {
            debug!(component = %component, ?part, url = %ctx.location, "simulated load start");
            tokio::time::sleep(Duration::from_millis(spec.delay_ms)).await;

            if cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                debug!(component = %component, "simulated load observed cancellation");
                return Ok(());
            }

            if let Some(target) = &spec.navigate {
                ctx.dispatch
                    .dispatch(Action::Navigate(NavigationAction::to(target.as_str())))?;
            }
            if let Some(message) = &spec.fail {
                return Err(PreloadError::rejected(
                    component,
                    anyhow::anyhow!(message.clone()),
                ));
            }

            ctx.dispatch.dispatch(Action::Custom(json!({
                "loaded": component,
                "part": part,
                "url": ctx.location.url(),
                "params": ctx.params,
            })))
        }
    }
}

impl LoadTask for SimulatedTask {
    fn options(&self) -> LoadOptions {
        LoadOptions::default()
            .with_blocking(self.spec.blocking)
            .with_client(self.spec.client)
    }

    fn load(&self, ctx: LoadContext) -> LoadReturn {
        if let Some(kind) = &self.spec.unsupported {
            return LoadReturn::unsupported(kind.clone());
        }

        let cancel = self.spec.cancellable.then(|| {
            Arc::new(CancelFlag {
                component: self.component.clone(),
                cancelled: AtomicBool::new(false),
            })
        });

        let ret = match self.spec.parts {
            Some(parts) => LoadReturn::all(
                (0..parts).map(|part| self.run(ctx.clone(), Some(part), cancel.clone())),
            ),
            None => LoadReturn::future(self.run(ctx, None, cancel.clone())),
        };

        match (ret, cancel) {
            (LoadReturn::Future(future), Some(handle)) => LoadReturn::Cancellable { future, handle },
            (ret, _) => ret,
        }
    }
}

struct CancelFlag {
    component: String,
    cancelled: AtomicBool,
}

impl CancelFlag {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Cancellable for CancelFlag {
    fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            debug!(component = %self.component, "simulated load cancelled");
        }
    }
}
