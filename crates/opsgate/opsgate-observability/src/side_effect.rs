//! Advisory writes whose failure is logged and swallowed.

use serde::{Deserialize, Serialize};

use opsgate_core::OpsgateResult;

use crate::tracing_setup::events;

/// Result of a non-critical side effect. Never escalated to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EffectOutcome {
    Applied,
    Dropped { reason: String },
}

impl EffectOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    /// Run `effect`, converting any error into a logged `Dropped`.
    pub fn capture<T>(effect: &str, result: OpsgateResult<T>) -> Self {
        match result {
            Ok(_) => Self::Applied,
            Err(e) => {
                let reason = e.to_string();
                events::side_effect_dropped(effect, &reason);
                Self::Dropped { reason }
            }
        }
    }
}
