//! # opsgate-workflow
//!
//! Evidence-gated workflow orchestration: rule classification, citation gate,
//! incident and ticket deduplication, spike detection, template drafting, and
//! the incident-detection, ticket-triage and ticket-intake state machines.
//! [`WorkflowEngine`] is the single entry point.

pub mod classification;
pub mod dedup;
pub mod detection;
pub mod drafting;
pub mod engine;
pub mod gate;
pub mod timeline;
pub mod tools;
pub mod workflows;

pub use classification::classify;
pub use engine::WorkflowEngine;
pub use gate::CitationGate;
pub use timeline::RunTimeline;
pub use tools::{TicketToolRequest, TicketToolResponse};
pub use workflows::WorkflowContext;
