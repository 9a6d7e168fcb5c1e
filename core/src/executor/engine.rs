use tokio::time::Instant;
use tracing::{debug, info};

use crate::state::SessionHandle;

use super::chain::Chain;
use super::scheduler::{run_stage, StageSettlement};
use super::types::{BatchFailurePolicy, ChainResult, TaskHandle};

/// Reduces a [`Chain`] into one cancellable operation.
///
/// Stages run strictly in order; a stage starts only after the previous one
/// settled successfully. Cancelling the session stops the engine from
/// starting further stages and suppresses the result of the in-flight one.
#[derive(Debug, Clone, Default)]
pub struct ExecutionEngine {
    policy: BatchFailurePolicy,
}

impl ExecutionEngine {
    pub fn new(policy: BatchFailurePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> BatchFailurePolicy {
        self.policy
    }

    pub async fn execute(&self, chain: Chain, session: &SessionHandle) -> ChainResult {
        let start = Instant::now();
        let total_stages = chain.len();

        debug!(
            session_id = session.id(),
            stages = ?chain.layout(),
            "executing preload chain"
        );

        for (stage_id, stage) in chain.into_stages().into_iter().enumerate() {
            if session.is_cancelled() {
                debug!(session_id = session.id(), stage_id, "session cancelled between stages");
                return ChainResult::Cancelled;
            }

            debug!(
                session_id = session.id(),
                stage_id,
                total_stages,
                batch = stage.is_batch(),
                components = ?stage.component_ids(),
                "stage start"
            );

            let handles: Vec<TaskHandle> = stage.descriptors().iter().map(|d| d.invoke()).collect();

            match run_stage(handles, self.policy, session.token()).await {
                StageSettlement::Completed => {
                    debug!(session_id = session.id(), stage_id, "stage end");
                }
                StageSettlement::Rejected(err) => {
                    if session.is_cancelled() {
                        return ChainResult::Cancelled;
                    }
                    info!(
                        session_id = session.id(),
                        stage_id,
                        error = %err,
                        "preload chain rejected"
                    );
                    return ChainResult::Failed(err);
                }
                StageSettlement::Interrupted => {
                    debug!(session_id = session.id(), stage_id, "stage interrupted by cancellation");
                    return ChainResult::Cancelled;
                }
            }
        }

        if session.is_cancelled() {
            return ChainResult::Cancelled;
        }

        let elapsed = start.elapsed();
        debug!(
            session_id = session.id(),
            elapsed_ms = elapsed.as_millis() as u64,
            "preload chain finished"
        );
        ChainResult::Finished { elapsed }
    }
}
