//! Windowed error-rate aggregation over application logs.

pub mod spike;

pub use spike::SpikeDetector;
