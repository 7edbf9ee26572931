//! Cross-signal correlation engine for festival social-media analytics.
//!
//! Daily series from weather, engagement, sentiment, hashtag and link-click
//! sources are aligned by date, correlated, and turned into insight text and
//! prioritized action items. The engine only reads; every report is rebuilt
//! from scratch on each call.

pub mod align;
pub mod analyzers;
pub mod db;
pub mod error;
pub mod models;
pub mod quality;
pub mod report;
pub mod source;
pub mod stats;
pub mod synthesizer;

pub use error::{InsightsError, Result};
pub use models::FullInsightsReport;
pub use source::{LookbackWindow, MetricsSource};
pub use synthesizer::InsightsEngine;
