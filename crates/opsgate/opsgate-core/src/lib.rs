//! # opsgate-core
//!
//! Foundation crate for the opsgate triage engine.
//! Defines the document model, store and embedding ports, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::OpsgateConfig;
pub use errors::{OpsgateError, OpsgateResult};
pub use models::{Citation, ConfidenceTier, Incident, OpsRun, Ticket, WorkflowOutcome};
pub use traits::{IDocumentStore, IEmbeddingProvider};
