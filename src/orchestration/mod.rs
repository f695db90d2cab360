mod aggregator;
mod orchestrator;

pub use aggregator::Aggregate;
pub use orchestrator::ChainRuleOrchestrator;

use serde::{Deserialize, Serialize};

/// What a pass does when its totals hold a NaN or an infinity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NonFinitePolicy {
    /// Fail the pass with `ChainRuleErr::NonFinite`.
    #[default]
    Abort,
    /// Log a warning and return the totals as they are.
    Warn,
}
