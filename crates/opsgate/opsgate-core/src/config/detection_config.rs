use serde::{Deserialize, Serialize};

use super::defaults;

/// Incident detection configuration.
///
/// The spike window and the incident dedup window are independent; neither
/// is derived from the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Trailing window counted by spike detection, in seconds.
    pub spike_window_secs: i64,
    /// Minimum error count per (service, env) to report a spike.
    pub spike_threshold: u64,
    /// Trailing window searched for an existing open incident, in seconds.
    pub incident_dedup_window_secs: i64,
    /// Error count at or above which an incident is critical.
    pub critical_error_count: u64,
    /// MTTA recorded for auto-detected incidents.
    pub mtta_seconds: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            spike_window_secs: defaults::DEFAULT_SPIKE_WINDOW_SECS,
            spike_threshold: defaults::DEFAULT_SPIKE_THRESHOLD,
            incident_dedup_window_secs: defaults::DEFAULT_INCIDENT_DEDUP_WINDOW_SECS,
            critical_error_count: defaults::DEFAULT_CRITICAL_ERROR_COUNT,
            mtta_seconds: defaults::DEFAULT_MTTA_SECONDS,
        }
    }
}
