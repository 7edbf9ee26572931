//! Domain correlation analyzers.
//!
//! Each analyzer is a pure function over series that were already fetched for
//! one lookback window. `None` means the inputs cannot support a report.

pub mod attribution;
pub mod hashtags;
pub mod sentiment;
pub mod weather;
