//! # opsgate-retrieval
//!
//! Query builders for every search the workflows issue, and hybrid retrieval:
//! independent lexical and vector searches fused by Reciprocal Rank Fusion.

pub mod search;
pub mod search_templates;

pub use search::rrf_fusion::{fuse, FusedHit, ListContribution};
pub use search::{Explain, HybridHit, HybridResults, HybridSearcher, SearchMode};
pub use search_templates::TicketListing;
