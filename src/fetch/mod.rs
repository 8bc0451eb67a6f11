//! Cached fetch with manual refresh and a staleness window.

pub mod refresh;

pub use refresh::{FetchStatus, Refreshable, Ticket};
