use std::fmt;

/// Why a listing stopped normally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndCause {
    /// The next control was not on the page
    ControlAbsent,

    /// The next control carried the disabled marker
    ControlDisabled,

    /// The configured page limit was reached
    PageLimitReached,
}

/// How a pagination run ended
///
/// Both variants stop the loop the same way. `EndedOnInteractionError`
/// exists so callers can alert on runs that may have stopped early and
/// returned fewer records than the listing holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    NormalEnd(EndCause),
    EndedOnInteractionError(String),
}

impl Termination {
    pub fn is_normal_end(&self) -> bool {
        matches!(self, Self::NormalEnd(_))
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NormalEnd(EndCause::ControlAbsent) => write!(f, "normal end (no next control)"),
            Self::NormalEnd(EndCause::ControlDisabled) => {
                write!(f, "normal end (next control disabled)")
            }
            Self::NormalEnd(EndCause::PageLimitReached) => write!(f, "normal end (page limit)"),
            Self::EndedOnInteractionError(message) => {
                write!(f, "ended on interaction error: {}", message)
            }
        }
    }
}

/// Position in a paginated listing
///
/// There is no notion of a total page count; the only truth is whether the
/// next control could be followed. The termination latch is one-way: once
/// set it is never cleared or overwritten.
#[derive(Debug, Clone, Default)]
pub struct PaginationCursor {
    /// Number of pages whose content has been retrieved
    pages_fetched: u32,

    /// Set once, when the listing ends
    termination: Option<Termination>,
}

impl PaginationCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that another page's content was retrieved
    pub fn record_fetch(&mut self) {
        self.pages_fetched += 1;
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Sets the termination latch
    ///
    /// Returns false, leaving the first termination in place, if the latch
    /// was already set.
    pub fn terminate(&mut self, termination: Termination) -> bool {
        if self.termination.is_some() {
            return false;
        }
        self.termination = Some(termination);
        true
    }

    pub fn is_terminated(&self) -> bool {
        self.termination.is_some()
    }

    pub fn termination(&self) -> Option<&Termination> {
        self.termination.as_ref()
    }
}
