use std::future::Future;
use std::sync::Arc;

use futures::future::{self, BoxFuture};
use futures::TryFutureExt;
use serde::{Deserialize, Serialize};

use crate::descriptor::LoadContext;
use crate::error::PreloadError;

/// Output of one load task invocation.
pub type TaskFuture = BoxFuture<'static, Result<(), PreloadError>>;

/// Per-component scheduling options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadOptions {
    /// Must complete before any later stage starts.
    #[serde(default = "default_blocking")]
    pub blocking: bool,

    /// Only runs in the browser runtime, never during server-side rendering.
    #[serde(default)]
    pub client: bool,
}

fn default_blocking() -> bool {
    true
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            blocking: default_blocking(),
            client: false,
        }
    }
}

impl LoadOptions {
    pub fn non_blocking() -> Self {
        Self {
            blocking: false,
            ..Self::default()
        }
    }

    pub fn client_only() -> Self {
        Self {
            client: true,
            ..Self::default()
        }
    }

    pub fn with_blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    pub fn with_client(mut self, client: bool) -> Self {
        self.client = client;
        self
    }
}

/// Cooperative cancellation capability a task invocation may expose.
pub trait Cancellable: Send + Sync {
    fn cancel(&self);
}

/// What a load task hands back when invoked.
pub enum LoadReturn {
    Future(TaskFuture),

    /// Equivalent to an aggregate future over the list; the first rejection wins.
    All(Vec<TaskFuture>),

    Cancellable {
        future: TaskFuture,
        handle: Arc<dyn Cancellable>,
    },

    /// The task produced something that is not asynchronous. Invoking it
    /// settles with [`PreloadError::Configuration`].
    Unsupported(String),
}

impl LoadReturn {
    pub fn future<F>(fut: F) -> Self
    where
        F: Future<Output = Result<(), PreloadError>> + Send + 'static,
    {
        Self::Future(Box::pin(fut))
    }

    pub fn all<I, F>(futs: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = Result<(), PreloadError>> + Send + 'static,
    {
        Self::All(
            futs.into_iter()
                .map(|f| Box::pin(f) as TaskFuture)
                .collect(),
        )
    }

    pub fn cancellable<F>(fut: F, handle: Arc<dyn Cancellable>) -> Self
    where
        F: Future<Output = Result<(), PreloadError>> + Send + 'static,
    {
        Self::Cancellable {
            future: Box::pin(fut),
            handle,
        }
    }

    pub fn unsupported(kind: impl Into<String>) -> Self {
        Self::Unsupported(kind.into())
    }
}

/// A data-fetch task declared by a route component.
pub trait LoadTask: Send + Sync {
    fn options(&self) -> LoadOptions {
        LoadOptions::default()
    }

    fn load(&self, ctx: LoadContext) -> LoadReturn;
}

/// Closure-backed [`LoadTask`].
pub struct LoadFn<F> {
    options: LoadOptions,
    f: F,
}

impl<F> LoadFn<F>
where
    F: Fn(LoadContext) -> LoadReturn + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self {
            options: LoadOptions::default(),
            f,
        }
    }

    pub fn with_options(mut self, options: LoadOptions) -> Self {
        self.options = options;
        self
    }
}

impl<F> LoadTask for LoadFn<F>
where
    F: Fn(LoadContext) -> LoadReturn + Send + Sync,
{
    fn options(&self) -> LoadOptions {
        self.options
    }

    fn load(&self, ctx: LoadContext) -> LoadReturn {
        (self.f)(ctx)
    }
}

/// A launched task: its future plus an optional cooperative cancel handle.
pub struct TaskHandle {
    pub component: String,
    pub future: TaskFuture,
    pub cancel: Option<Arc<dyn Cancellable>>,
}

impl TaskHandle {
    /// Normalize a [`LoadReturn`] into a single future whose errors are
    /// attributed to `component`.
    pub fn from_return(component: &str, ret: LoadReturn) -> Self {
        let mut cancel = None;
        let fut: TaskFuture = match ret {
            LoadReturn::Future(fut) => fut,
            LoadReturn::All(futs) => Box::pin(future::try_join_all(futs).map_ok(|_| ())),
            LoadReturn::Cancellable { future: fut, handle } => {
                cancel = Some(handle);
                fut
            }
            LoadReturn::Unsupported(kind) => {
                let err = PreloadError::configuration(
                    component,
                    format!("load task returned {kind}, expected a future or a list of futures"),
                );
                Box::pin(future::ready(Err(err)))
            }
        };

        let owner = component.to_string();
        Self {
            component: component.to_string(),
            future: Box::pin(fut.map_err(move |e| e.attributed_to(&owner))),
            cancel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unsupported_return_settles_with_configuration_error() {
        let handle = TaskHandle::from_return("widget", LoadReturn::unsupported("a number"));
        let err = handle.future.await.unwrap_err();
        match err {
            PreloadError::Configuration { component, reason } => {
                assert_eq!(component, "widget");
                assert!(reason.contains("a number"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejection_is_attributed_to_component() {
        let ret = LoadReturn::future(async { Err(anyhow::anyhow!("404").into()) });
        let err = TaskHandle::from_return("profile", ret).future.await.unwrap_err();
        assert_eq!(err.to_string(), "load task of 'profile' rejected: 404");
    }

    #[test]
    fn test_default_options() {
        let opts = LoadOptions::default();
        assert!(opts.blocking);
        assert!(!opts.client);
        assert!(!LoadOptions::non_blocking().blocking);
        assert!(LoadOptions::client_only().client);
    }
}
