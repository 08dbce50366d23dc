//! Minimum-evidence gate applied before every automated write.

pub mod citation_gate;

pub use citation_gate::CitationGate;
