/// Page state definitions for tracking mirror progress
///
/// This module defines the states a page passes through during a mirror run.
use std::fmt;

/// Represents the current state of a page in the mirror run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// Page has been discovered and queued but not yet requested
    Discovered,

    /// Page is currently being fetched
    Fetching,

    /// Page body was received and is waiting to be rewritten
    Fetched,

    // ===== Terminal States =====
    /// Page was rewritten and written to the mirror
    RewrittenAndWritten,

    /// Page fetch, parse or write failed
    Failed,
}

impl PageState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::RewrittenAndWritten | Self::Failed)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: PageState) -> bool {
        matches!(
            (self, next),
            (Self::Discovered, Self::Fetching)
                | (Self::Fetching, Self::Fetched)
                | (Self::Fetching, Self::Failed)
                | (Self::Fetched, Self::RewrittenAndWritten)
                | (Self::Fetched, Self::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Fetching => "fetching",
            Self::Fetched => "fetched",
            Self::RewrittenAndWritten => "written",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_terminal() {
        assert!(!PageState::Discovered.is_terminal());
        assert!(!PageState::Fetching.is_terminal());
        assert!(!PageState::Fetched.is_terminal());

        assert!(PageState::RewrittenAndWritten.is_terminal());
        assert!(PageState::Failed.is_terminal());
    }

    #[test]
    fn test_happy_path_transitions() {
        assert!(PageState::Discovered.can_transition_to(PageState::Fetching));
        assert!(PageState::Fetching.can_transition_to(PageState::Fetched));
        assert!(PageState::Fetched.can_transition_to(PageState::RewrittenAndWritten));
    }

    #[test]
    fn test_failure_transitions() {
        assert!(PageState::Fetching.can_transition_to(PageState::Failed));
        assert!(PageState::Fetched.can_transition_to(PageState::Failed));
        assert!(!PageState::Discovered.can_transition_to(PageState::Failed));
    }

    #[test]
    fn test_terminal_states_are_final() {
        for next in [
            PageState::Discovered,
            PageState::Fetching,
            PageState::Fetched,
            PageState::RewrittenAndWritten,
            PageState::Failed,
        ] {
            assert!(!PageState::Failed.can_transition_to(next));
            assert!(!PageState::RewrittenAndWritten.can_transition_to(next));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", PageState::Discovered), "discovered");
        assert_eq!(format!("{}", PageState::RewrittenAndWritten), "written");
        assert_eq!(format!("{}", PageState::Failed), "failed");
    }
}
