//! Domain model for tracking daily check-ins of a single community.
//!
//! Nothing in here talks to Discord or a database directly. The bot crate
//! feeds plain facts in and renders the resulting reports back out.

use std::fmt;

pub mod checkin;
pub mod command;
pub mod date;
pub mod report;
pub mod store;

pub use date::MonthDay;

/// Identifies a community member by their Discord user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemberId(pub u64);

impl MemberId {
    /// Gets a value that formats as a Discord user mention.
    #[must_use]
    pub const fn mention(self) -> Mention {
        Mention(self)
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Formats a [`MemberId`] as `<@id>`.
#[derive(Debug, Clone, Copy)]
pub struct Mention(MemberId);

impl fmt::Display for Mention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<@{}>", self.0.0)
    }
}
