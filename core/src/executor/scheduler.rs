use std::sync::Arc;

use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::PreloadError;

use super::types::{BatchFailurePolicy, Cancellable, TaskHandle};

type Indexed = BoxFuture<'static, (usize, Result<(), PreloadError>)>;

/// How a single stage settled.
#[derive(Debug)]
pub enum StageSettlement {
    Completed,
    /// First rejection among the stage's tasks.
    Rejected(PreloadError),
    /// The session token fired before the stage settled.
    Interrupted,
}

/// Run all tasks of one stage concurrently.
///
/// Succeeds once every task succeeds; settles with the first rejection
/// without waiting for siblings. Still-pending futures are never dropped
/// silently mid-flight under [`BatchFailurePolicy::Detach`] or on
/// interruption: they are moved to a detached task and run to completion
/// with their results discarded.
pub async fn run_stage(
    handles: Vec<TaskHandle>,
    policy: BatchFailurePolicy,
    token: &CancellationToken,
) -> StageSettlement {
    let mut cancels: Vec<Option<Arc<dyn Cancellable>>> = Vec::with_capacity(handles.len());
    let mut components: Vec<String> = Vec::with_capacity(handles.len());
    let mut pending: FuturesUnordered<Indexed> = FuturesUnordered::new();

    for (idx, handle) in handles.into_iter().enumerate() {
        cancels.push(handle.cancel);
        components.push(handle.component);
        let fut = handle.future;
        pending.push(Box::pin(async move { (idx, fut.await) }));
    }

    loop {
        tokio::select! {
            biased;

            _ = token.cancelled() => {
                cancel_remaining(&cancels);
                detach(pending);
                return StageSettlement::Interrupted;
            }

            next = pending.next() => match next {
                None => return StageSettlement::Completed,
                Some((idx, Ok(()))) => {
                    cancels[idx] = None;
                    debug!(component = %components[idx], "load task settled");
                }
                Some((idx, Err(err))) => {
                    cancels[idx] = None;
                    debug!(component = %components[idx], error = %err, "load task rejected");
                    match policy {
                        BatchFailurePolicy::Detach => detach(pending),
                        BatchFailurePolicy::CancelSiblings => {
                            cancel_remaining(&cancels);
                            drop(pending);
                        }
                    }
                    return StageSettlement::Rejected(err);
                }
            },
        }
    }
}

fn cancel_remaining(cancels: &[Option<Arc<dyn Cancellable>>]) {
    for handle in cancels.iter().flatten() {
        handle.cancel();
    }
}

fn detach(mut pending: FuturesUnordered<Indexed>) {
    if pending.is_empty() {
        return;
    }
    debug!(remaining = pending.len(), "detaching in-flight load tasks");
    tokio::spawn(async move {
        while let Some((_, result)) = pending.next().await {
            if let Err(err) = result {
                debug!(error = %err, "detached load task rejected after its stage settled");
            }
        }
    });
}
