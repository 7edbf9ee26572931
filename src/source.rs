use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{ClickEvent, DailyMetricPoint, EngagementDay, HashtagUsage, Period, WeatherDay};

pub const MIN_LOOKBACK_DAYS: i64 = 7;
pub const MAX_LOOKBACK_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookbackWindow {
    days: i64,
}

impl LookbackWindow {
    pub fn new(days: i64) -> Self {
        Self {
            days: days.clamp(MIN_LOOKBACK_DAYS, MAX_LOOKBACK_DAYS),
        }
    }

    pub fn days(&self) -> i64 {
        self.days
    }

    pub fn since(&self, today: NaiveDate) -> NaiveDate {
        today - Duration::days(self.days)
    }

    pub fn period(&self, today: NaiveDate) -> Period {
        Period {
            start: self.since(today),
            end: today,
            days: self.days,
        }
    }
}

/// Backing stores gated by a record count before their analyzer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSource {
    Weather,
    HashtagUsage,
    Sentiment,
    LinkClicks,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::HashtagUsage => "hashtag_usage",
            Self::Sentiment => "sentiment",
            Self::LinkClicks => "link_clicks",
        }
    }
}

/// Read side of the warehouse. Every method returns records on or after `since`.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Total records ever stored for a source, regardless of window.
    async fn count_records(&self, source: DataSource) -> Result<i64>;

    async fn weather(&self, since: NaiveDate) -> Result<Vec<WeatherDay>>;

    async fn engagement(&self, since: NaiveDate) -> Result<Vec<EngagementDay>>;

    async fn sentiment(&self, since: NaiveDate) -> Result<Vec<DailyMetricPoint>>;

    async fn followers(&self, since: NaiveDate) -> Result<Vec<DailyMetricPoint>>;

    async fn hashtag_usage(&self, since: NaiveDate) -> Result<Vec<HashtagUsage>>;

    async fn clicks(&self, since: NaiveDate) -> Result<Vec<ClickEvent>>;
}
