use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One value of a daily series. Dates carry no time of day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyMetricPoint {
    pub date: NaiveDate,
    pub value: f64,
}

impl DailyMetricPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherDay {
    pub date: NaiveDate,
    pub temp_avg: f64,
    pub precipitation: f64,
    pub conditions: String,
}

impl WeatherDay {
    pub fn is_rainy(&self) -> bool {
        self.precipitation > 0.0 || self.conditions.to_lowercase().contains("rain")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementDay {
    pub date: NaiveDate,
    pub engagement: f64,
    pub reach: f64,
}

/// Trending classification supplied by the hashtag vendor. Opaque to us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendColor {
    Green,
    Blue,
    Red,
}

impl TrendColor {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "green" => Some(Self::Green),
            "blue" => Some(Self::Blue),
            "red" => Some(Self::Red),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Red => "red",
        }
    }
}

/// One hashtag attached to one piece of content, pre-joined to that content's totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashtagUsage {
    pub hashtag: String,
    pub color: Option<TrendColor>,
    pub likes: f64,
    pub comments: f64,
    pub shares: f64,
    pub saves: f64,
    pub reach: f64,
}

impl HashtagUsage {
    pub fn engagement(&self) -> f64 {
        self.likes + self.comments + self.shares + self.saves
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub timestamp: DateTime<Utc>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub converted: bool,
    pub conversion_value: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    None,
    Weak,
    Moderate,
    Strong,
}

impl Strength {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Strong => "Strong",
            Self::Moderate => "Moderate",
            Self::Weak => "Weak",
            Self::None => "No",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub coefficient: f64,
    pub strength: Strength,
    pub sample_size: usize,
    pub insight: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainImpact {
    pub sunny_days: usize,
    pub rainy_days: usize,
    pub sunny_days_avg_engagement: f64,
    pub rainy_days_avg_engagement: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherCorrelationReport {
    pub period: Period,
    pub temperature_vs_engagement: CorrelationResult,
    pub temperature_vs_reach: CorrelationResult,
    pub rain_vs_engagement: CorrelationResult,
    pub rain_impact: RainImpact,
    pub insights: Vec<String>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashtagPerformance {
    pub hashtag: String,
    pub color: Option<TrendColor>,
    pub times_used: usize,
    pub total_engagement: f64,
    pub total_reach: f64,
    pub avg_engagement_rate: f64,
    pub avg_reach: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorBucket {
    pub color: TrendColor,
    pub hashtags: usize,
    pub avg_engagement_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashtagCorrelationReport {
    pub period: Period,
    pub min_usage: usize,
    pub top_performers: Vec<HashtagPerformance>,
    pub bottom_performers: Vec<HashtagPerformance>,
    pub by_color: Vec<ColorBucket>,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentBuckets {
    pub high_positive_days: usize,
    pub neutral_days: usize,
    pub high_negative_days: usize,
    pub high_positive_avg_growth: f64,
    pub neutral_avg_growth: f64,
    pub high_negative_avg_growth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentCorrelationReport {
    pub period: Period,
    pub sentiment_vs_growth: CorrelationResult,
    pub buckets: SentimentBuckets,
    pub follower_quality: DataQualityAssessment,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Facebook,
    Instagram,
    Other,
}

impl Platform {
    pub fn from_utm(source: Option<&str>) -> Self {
        let Some(source) = source else {
            return Self::Other;
        };
        match source.trim().to_lowercase().as_str() {
            "facebook" | "fb" | "facebook.com" | "m.facebook.com" => Self::Facebook,
            "instagram" | "ig" | "instagram.com" => Self::Instagram,
            _ => Self::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Facebook => "Facebook",
            Self::Instagram => "Instagram",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Medium {
    Post,
    Story,
    Reel,
    Ad,
    Other,
}

impl Medium {
    pub fn from_utm(medium: Option<&str>) -> Self {
        let Some(medium) = medium else {
            return Self::Other;
        };
        match medium.trim().to_lowercase().as_str() {
            "post" | "posts" | "feed" => Self::Post,
            "story" | "stories" => Self::Story,
            "reel" | "reels" => Self::Reel,
            "ad" | "ads" | "paid" | "cpc" => Self::Ad,
            _ => Self::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Post => "Post",
            Self::Story => "Story",
            Self::Reel => "Reel",
            Self::Ad => "Ad",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub platform: Platform,
    pub clicks: usize,
    pub conversions: usize,
    pub rate: f64,
    pub conversion_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediumStats {
    pub medium: Medium,
    pub clicks: usize,
    pub conversions: usize,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformComparison {
    pub winner: Platform,
    pub runner_up: Platform,
    pub relative_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionReport {
    pub period: Period,
    pub total_clicks: usize,
    pub by_platform: Vec<PlatformStats>,
    pub by_medium: Vec<MediumStats>,
    pub winning_platform: Option<PlatformComparison>,
    pub insights: Vec<String>,
}

impl AttributionReport {
    pub fn platform(&self, platform: Platform) -> Option<&PlatformStats> {
        self.by_platform.iter().find(|stats| stats.platform == platform)
    }

    pub fn medium(&self, medium: Medium) -> Option<&MediumStats> {
        self.by_medium.iter().find(|stats| stats.medium == medium)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum UnavailableReason {
    /// The backing source holds no records at all.
    NotConnected,
    NoRecords,
    InsufficientData { matched_days: usize, required: usize },
}

impl UnavailableReason {
    pub fn describe(&self) -> String {
        match self {
            Self::NotConnected => "not connected".to_string(),
            Self::NoRecords => "no records in this window".to_string(),
            Self::InsufficientData {
                matched_days,
                required,
            } => format!("not enough data ({matched_days} of {required} matched days)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Section<T> {
    Available(T),
    Unavailable(UnavailableReason),
    Failed(String),
}

impl<T> Section<T> {
    pub fn available(&self) -> Option<&T> {
        match self {
            Self::Available(report) => Some(report),
            _ => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
    pub priority: Priority,
    pub action: String,
    pub expected_impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullInsightsReport {
    pub generated_for: Period,
    pub weather: Section<WeatherCorrelationReport>,
    pub hashtags: Section<HashtagCorrelationReport>,
    pub sentiment: Section<SentimentCorrelationReport>,
    pub attribution: Section<AttributionReport>,
    pub key_insights: Vec<String>,
    pub action_items: Vec<ActionItem>,
    pub data_quality: Vec<DataQualityAssessment>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataQualityAssessment {
    pub metric: String,
    pub window_days: usize,
    pub populated_days: usize,
    pub min_populated_days: usize,
    pub reliable: bool,
    pub warnings: Vec<String>,
}
