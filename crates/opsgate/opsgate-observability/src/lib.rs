//! # opsgate-observability
//!
//! Structured tracing with span definitions and event helpers, the append-only
//! OpsRun audit trail, and metric recording. Audit and metric writes are
//! non-critical side effects: they report an [`EffectOutcome`] instead of
//! failing the workflow that issued them.

pub mod audit;
pub mod metrics;
pub mod side_effect;
pub mod tracing_setup;

pub use audit::AuditTrailRecorder;
pub use metrics::{MetricsRecorder, MetricsReport};
pub use side_effect::EffectOutcome;
