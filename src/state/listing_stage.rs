//! Stage definitions for a listing moving through the pipeline
//!
//! This module defines the stages a single property passes through between
//! link discovery and record emission.

use std::fmt;

/// Represents the current stage of a listing in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingStage {
    // ===== Active Stages =====
    /// Detail link found on an index page; nothing fetched yet
    Discovered,

    /// Detail page fetched and extracted; record partially populated
    DetailFetched,

    /// Agent lookup resolved (merged, or failed and left empty)
    AgentFetched,

    // ===== Terminal Stage =====
    /// Record handed to the output boundary
    Emitted,
}

impl ListingStage {
    /// Returns true once the record has been emitted
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Emitted)
    }

    /// Whether the pipeline may move a listing from `self` to `next`
    ///
    /// `DetailFetched -> Emitted` is structurally allowed; whether it is
    /// allowed for a given listing depends on its pending agent lookup and is
    /// checked by the listing context.
    pub fn can_transition_to(&self, next: ListingStage) -> bool {
        matches!(
            (self, next),
            (Self::Discovered, Self::DetailFetched)
                | (Self::DetailFetched, Self::AgentFetched)
                | (Self::DetailFetched, Self::Emitted)
                | (Self::AgentFetched, Self::Emitted)
        )
    }

    /// Short lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::DetailFetched => "detail_fetched",
            Self::AgentFetched => "agent_fetched",
            Self::Emitted => "emitted",
        }
    }

    /// Returns all stages in pipeline order
    pub fn all_stages() -> Vec<Self> {
        vec![
            Self::Discovered,
            Self::DetailFetched,
            Self::AgentFetched,
            Self::Emitted,
        ]
    }
}

impl fmt::Display for ListingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
