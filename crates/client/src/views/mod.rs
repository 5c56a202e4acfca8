//! Views: per-page state plus pure view-model functions.
//!
//! Each view owns its state and the API handle it needs. Rendering is a
//! pure function from that state to a view model (rows, labels, button
//! enablement, flash message), so a front end only has to bind the view
//! model to its output.

pub mod auth;
pub mod dashboard;
pub mod listing;

use std::sync::atomic::{AtomicU64, Ordering};

pub use auth::{FormOutcome, LoginForm, SignupForm, submit_login, submit_signup};
pub use dashboard::{DashboardRow, DashboardView, DashboardViewModel, Gate, RowAction};
pub use listing::{ListingRow, ListingView, ListingViewModel, PageRequest};

/// Pages a view can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Listing,
    Login,
    Signup,
    Dashboard,
}

/// Whether a flash message reports success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

/// A one-shot notice for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub text: String,
}

impl Flash {
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            text: text.into(),
        }
    }
}

/// What a front end should do after a view action completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Remain on the current page and re-render.
    Stay,
    /// Leave for another page.
    Redirect(Page),
}

/// Ticket identifying one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Monotonic request counter for discarding stale responses.
///
/// Each fetch takes a ticket when issued. When its response arrives, it may
/// only update state if no newer ticket has been issued since.
#[derive(Debug, Default)]
pub struct RequestSeq {
    latest: AtomicU64,
}

impl RequestSeq {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a ticket newer than every ticket issued before it.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::AcqRel) + 1)
    }

    /// Whether `ticket` is the most recently issued one.
    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::Acquire) == ticket.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_latest_ticket_is_current() {
        let seq = RequestSeq::new();
        let first = seq.issue();
        assert!(seq.is_current(first));

        let second = seq.issue();
        assert!(second > first);
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
    }
}
