//! # Record Sources
//!
//! Adapters from already-fetched payloads to typed records. Each one knows
//! the shape of one upstream format; none of them does network I/O. The
//! caller fetches, hands the text over, and gets back groups or records
//! ready for a [`Chart`](crate::model::Chart).
//!
//! - [`ovapi`]: stop-area passes into one group per stop
//! - [`ns`]: a departure board into one headerless group
//! - [`calendar`]: birthdays into three month groups
//! - [`ranking`]: counts into shuffled, top-ranked pie records
//! - [`rss`]: the first item of a feed into banner lines

pub mod calendar;
pub mod ns;
pub mod ovapi;
pub mod ranking;
pub mod rss;

use crate::error::PlacardError;

pub(crate) fn source_error(what: &str, detail: impl std::fmt::Display) -> PlacardError {
    PlacardError::Source(format!("{}: {}", what, detail))
}
