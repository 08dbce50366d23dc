//! Span definitions per workflow and step.

/// Span wrapping one workflow run.
#[macro_export]
macro_rules! workflow_span {
    ($workflow:expr, $run_id:expr) => {
        tracing::info_span!("opsgate.workflow", workflow = %$workflow, run_id = %$run_id)
    };
}

/// Span wrapping one step of a run.
#[macro_export]
macro_rules! step_span {
    ($step:expr) => {
        tracing::debug_span!("opsgate.step", step = %$step)
    };
}

/// Span wrapping a hybrid retrieval.
#[macro_export]
macro_rules! retrieval_span {
    ($collection:expr, $k:expr) => {
        tracing::debug_span!("opsgate.retrieval", collection = %$collection, k = $k)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const WORKFLOW: &str = "opsgate.workflow";
    pub const STEP: &str = "opsgate.step";
    pub const RETRIEVAL: &str = "opsgate.retrieval";
}
