/// Workflow orchestration errors.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// A run aborted after it started. The failed OpsRun is resolvable by `run_id`.
    #[error("{workflow} run {run_id} failed: {reason}")]
    RunFailed {
        run_id: String,
        workflow: String,
        reason: String,
    },

    #[error("invalid trigger input: {reason}")]
    InvalidInput { reason: String },
}
