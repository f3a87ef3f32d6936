//! lostfound/crates/lf-match/src/lib.rs
//!
//! The matching core: visual similarity scoring, the first-match-wins
//! scan with its atomic state transition, and the post-commit
//! notification fan-out.

pub mod scorer;
pub mod matcher;
pub mod notify;
pub mod feed;

pub use matcher::{MatchOutcome, Matcher, MATCH_THRESHOLD};
pub use notify::{Notifier, MATCH_TOPIC};
pub use feed::{FeedMessage, MatchFeed};

#[cfg(test)]
mod testutil;
