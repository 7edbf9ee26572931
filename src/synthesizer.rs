use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use chrono::NaiveDate;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::align::{align_pair, daily_deltas, MIN_MATCHED_DAYS};
use crate::analyzers::{attribution, hashtags, sentiment, weather};
use crate::error::Result;
use crate::models::{
    ActionItem, AttributionReport, DailyMetricPoint, DataQualityAssessment, FullInsightsReport,
    HashtagCorrelationReport, Period, Priority, Section, SentimentCorrelationReport,
    UnavailableReason, WeatherCorrelationReport,
};
use crate::quality;
use crate::source::{DataSource, LookbackWindow, MetricsSource};

pub const DEFAULT_ACTION: &str = "Continue collecting data for more accurate insights";
pub const DEFAULT_IMPACT: &str = "Better correlation analysis with more data points";

const TOP_HASHTAGS_IN_ACTION: usize = 3;

/// Runs every analyzer for one window and merges the results.
///
/// Holds no state between calls; any caching belongs to the caller.
pub struct InsightsEngine<S> {
    source: Arc<S>,
    min_usage: usize,
}

impl<S> InsightsEngine<S>
where
    S: MetricsSource + 'static,
{
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            min_usage: hashtags::DEFAULT_MIN_USAGE,
        }
    }

    pub fn with_min_usage(mut self, min_usage: usize) -> Self {
        self.min_usage = min_usage.max(1);
        self
    }

    /// Dropping the returned future aborts every analyzer still in flight.
    pub async fn generate(&self, window: LookbackWindow, today: NaiveDate) -> FullInsightsReport {
        let period = window.period(today);
        info!(days = period.days, since = %period.start, "generating insights");

        let weather_task = AnalyzerTask::spawn(weather_section(self.source.clone(), period));
        let hashtag_task =
            AnalyzerTask::spawn(hashtag_section(self.source.clone(), period, self.min_usage));
        let sentiment_task = AnalyzerTask::spawn(sentiment_section(self.source.clone(), period));
        let attribution_task =
            AnalyzerTask::spawn(attribution_section(self.source.clone(), period));

        let (weather, hashtags, sentiment, attribution) =
            tokio::join!(weather_task, hashtag_task, sentiment_task, attribution_task);

        let weather = settle(DataSource::Weather, weather);
        let hashtags = settle(DataSource::HashtagUsage, hashtags);
        let sentiment = settle(DataSource::Sentiment, sentiment);
        let attribution = settle(DataSource::LinkClicks, attribution);

        let data_quality: Vec<DataQualityAssessment> = [
            &weather.quality,
            &hashtags.quality,
            &sentiment.quality,
            &attribution.quality,
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect();

        synthesize(
            period,
            weather.section,
            hashtags.section,
            sentiment.section,
            attribution.section,
            data_quality,
        )
    }
}

/// A spawned analyzer that is aborted when its handle is dropped.
struct AnalyzerTask<T>(JoinHandle<T>);

impl<T: Send + 'static> AnalyzerTask<T> {
    fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self(tokio::spawn(future))
    }
}

impl<T> Future for AnalyzerTask<T> {
    type Output = std::result::Result<T, JoinError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx)
    }
}

impl<T> Drop for AnalyzerTask<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// One analyzer's section plus the density checks run on its inputs.
struct Outcome<T> {
    section: Section<T>,
    quality: Vec<DataQualityAssessment>,
}

impl<T> Outcome<T> {
    fn bare(section: Section<T>) -> Self {
        Self {
            section,
            quality: Vec::new(),
        }
    }
}

fn settle<T>(
    source: DataSource,
    outcome: std::result::Result<Result<Outcome<T>>, JoinError>,
) -> Outcome<T> {
    match outcome {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(err)) => {
            warn!(analyzer = source.as_str(), error = %err, "analyzer failed");
            Outcome::bare(Section::Failed(err.to_string()))
        }
        Err(err) => {
            warn!(analyzer = source.as_str(), error = %err, "analyzer task aborted");
            Outcome::bare(Section::Failed(format!("analyzer task aborted: {err}")))
        }
    }
}

async fn is_connected<S: MetricsSource>(source: &S, data: DataSource) -> Result<bool> {
    let count = source.count_records(data).await?;
    debug!(source = data.as_str(), count, "pre-check");
    Ok(count > 0)
}

fn window_days(period: Period) -> usize {
    period.days.max(0) as usize
}

async fn weather_section<S: MetricsSource>(
    source: Arc<S>,
    period: Period,
) -> Result<Outcome<WeatherCorrelationReport>> {
    if !is_connected(source.as_ref(), DataSource::Weather).await? {
        return Ok(Outcome::bare(Section::Unavailable(
            UnavailableReason::NotConnected,
        )));
    }

    let (weather_days, engagement_days) =
        tokio::try_join!(source.weather(period.start), source.engagement(period.start))?;

    let engagement_series: Vec<DailyMetricPoint> = engagement_days
        .iter()
        .map(|day| DailyMetricPoint::new(day.date, day.engagement))
        .collect();
    let quality = vec![quality::assess(
        "engagement",
        &engagement_series,
        window_days(period),
    )];

    let section = match weather::analyze(period, &weather_days, &engagement_days) {
        Some(report) => Section::Available(report),
        None => Section::Unavailable(UnavailableReason::InsufficientData {
            matched_days: weather::matched_days(&weather_days, &engagement_days),
            required: MIN_MATCHED_DAYS,
        }),
    };
    Ok(Outcome { section, quality })
}

async fn hashtag_section<S: MetricsSource>(
    source: Arc<S>,
    period: Period,
    min_usage: usize,
) -> Result<Outcome<HashtagCorrelationReport>> {
    if !is_connected(source.as_ref(), DataSource::HashtagUsage).await? {
        return Ok(Outcome::bare(Section::Unavailable(
            UnavailableReason::NotConnected,
        )));
    }

    let usages = source.hashtag_usage(period.start).await?;
    Ok(Outcome::bare(
        match hashtags::analyze(period, &usages, min_usage) {
            Some(report) => Section::Available(report),
            None => Section::Unavailable(UnavailableReason::NoRecords),
        },
    ))
}

async fn sentiment_section<S: MetricsSource>(
    source: Arc<S>,
    period: Period,
) -> Result<Outcome<SentimentCorrelationReport>> {
    if !is_connected(source.as_ref(), DataSource::Sentiment).await? {
        return Ok(Outcome::bare(Section::Unavailable(
            UnavailableReason::NotConnected,
        )));
    }

    let (scores, followers) =
        tokio::try_join!(source.sentiment(period.start), source.followers(period.start))?;

    // Runs whatever the analyzer decides, so sparse follower data is flagged
    // even when there are too few days for a report.
    let quality = vec![quality::assess("follower", &followers, window_days(period))];

    let section = match sentiment::analyze(period, &scores, &followers) {
        Some(report) => Section::Available(report),
        None => Section::Unavailable(UnavailableReason::InsufficientData {
            matched_days: align_pair(&scores, &daily_deltas(&followers)).len(),
            required: MIN_MATCHED_DAYS,
        }),
    };
    Ok(Outcome { section, quality })
}

async fn attribution_section<S: MetricsSource>(
    source: Arc<S>,
    period: Period,
) -> Result<Outcome<AttributionReport>> {
    if !is_connected(source.as_ref(), DataSource::LinkClicks).await? {
        return Ok(Outcome::bare(Section::Unavailable(
            UnavailableReason::NotConnected,
        )));
    }

    let clicks = source.clicks(period.start).await?;
    Ok(Outcome::bare(match attribution::analyze(period, &clicks) {
        Some(report) => Section::Available(report),
        None => Section::Unavailable(UnavailableReason::NoRecords),
    }))
}

/// Merges analyzer sections into one report. Pure over its inputs.
pub fn synthesize(
    period: Period,
    weather: Section<WeatherCorrelationReport>,
    hashtags: Section<HashtagCorrelationReport>,
    sentiment: Section<SentimentCorrelationReport>,
    attribution: Section<AttributionReport>,
    data_quality: Vec<DataQualityAssessment>,
) -> FullInsightsReport {
    let mut key_insights = Vec::new();
    let mut seen = HashSet::new();
    let mut push_unique = |insights: &[String]| {
        for insight in insights {
            if seen.insert(insight.clone()) {
                key_insights.push(insight.clone());
            }
        }
    };

    if let Some(report) = weather.available() {
        push_unique(report.insights.as_slice());
    }
    if let Some(report) = hashtags.available() {
        push_unique(report.insights.as_slice());
    }
    if let Some(report) = sentiment.available() {
        push_unique(report.insights.as_slice());
    }
    if let Some(report) = attribution.available() {
        push_unique(report.insights.as_slice());
    }

    let action_items = action_items(
        weather.available(),
        hashtags.available(),
        attribution.available(),
    );

    let section_quality = sentiment.available().map(|report| &report.follower_quality);
    let mut warnings: Vec<String> = Vec::new();
    for assessment in data_quality.iter().chain(section_quality) {
        for warning in &assessment.warnings {
            if !warnings.contains(warning) {
                warnings.push(warning.clone());
            }
        }
    }

    info!(
        insights = key_insights.len(),
        actions = action_items.len(),
        warnings = warnings.len(),
        "insights synthesized"
    );

    FullInsightsReport {
        generated_for: period,
        weather,
        hashtags,
        sentiment,
        attribution,
        key_insights,
        action_items,
        data_quality,
        warnings,
    }
}

fn action_items(
    weather: Option<&WeatherCorrelationReport>,
    hashtags: Option<&HashtagCorrelationReport>,
    attribution: Option<&AttributionReport>,
) -> Vec<ActionItem> {
    let mut items = Vec::new();

    if let Some(report) = hashtags {
        if let Some(best) = report.top_performers.first() {
            let tags: Vec<String> = report
                .top_performers
                .iter()
                .take(TOP_HASHTAGS_IN_ACTION)
                .map(|perf| format!("#{}", perf.hashtag))
                .collect();
            items.push(ActionItem {
                priority: Priority::High,
                action: format!("Continue using {}", tags.join(", ")),
                expected_impact: format!(
                    "Keep engagement near the {:.2}% rate of your best hashtag",
                    best.avg_engagement_rate
                ),
            });
        }
    }

    if let Some(comparison) = attribution.and_then(|report| report.winning_platform.as_ref()) {
        items.push(ActionItem {
            priority: Priority::High,
            action: format!("Increase budget on {}", comparison.winner.label()),
            expected_impact: format!(
                "{} converts {:.0}% better than {}",
                comparison.winner.label(),
                comparison.relative_percent,
                comparison.runner_up.label()
            ),
        });
    }

    if let Some(report) = weather {
        for recommendation in &report.recommendations {
            items.push(ActionItem {
                priority: Priority::Medium,
                action: recommendation.clone(),
                expected_impact: "Higher engagement by matching content to the forecast"
                    .to_string(),
            });
        }
    }

    if items.is_empty() {
        items.push(ActionItem {
            priority: Priority::Medium,
            action: DEFAULT_ACTION.to_string(),
            expected_impact: DEFAULT_IMPACT.to_string(),
        });
    }

    items
}
