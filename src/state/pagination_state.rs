/// Pagination state definitions
///
/// This module defines the states the pagination loop moves through and the
/// transitions allowed between them.
use std::fmt;

/// Represents where the pagination loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaginationState {
    // ===== Active States =====
    /// Retrieving the rendered content of the current page
    Fetching,

    /// Turning the retrieved content into records
    Extracting,

    /// Inspecting the next control and moving to the following page
    Advancing,

    // ===== Terminal States =====
    /// The listing ended (normally or on a masked interaction error)
    Terminated,

    /// The driver became unusable; nothing more can be done this session
    Failed,
}

impl PaginationState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated | Self::Failed)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    ///
    /// | From | To |
    /// |------|----|
    /// | Fetching | Extracting, Terminated, Failed |
    /// | Extracting | Advancing |
    /// | Advancing | Fetching, Terminated, Failed |
    /// | Terminated | (none) |
    /// | Failed | (none) |
    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Fetching, Self::Extracting)
                | (Self::Fetching, Self::Terminated)
                | (Self::Fetching, Self::Failed)
                | (Self::Extracting, Self::Advancing)
                | (Self::Advancing, Self::Fetching)
                | (Self::Advancing, Self::Terminated)
                | (Self::Advancing, Self::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Advancing => "advancing",
            Self::Terminated => "terminated",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible pagination states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Fetching,
            Self::Extracting,
            Self::Advancing,
            Self::Terminated,
            Self::Failed,
        ]
    }
}

impl fmt::Display for PaginationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
