use serde::{Deserialize, Serialize};

/// Free-form advice block, either produced by the remote advisory
/// collaborator or assembled deterministically as a degraded fallback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    pub summary: String,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    pub recommendations: Vec<String>,
    /// True when the remote collaborator was unavailable and the block was
    /// built locally from the rule-based notes.
    pub degraded: bool,
}
