use std::fmt::Write;

use crate::models::{CorrelationResult, FullInsightsReport, Section};

fn section_status<T>(section: &Section<T>) -> Option<String> {
    match section {
        Section::Available(_) => None,
        Section::Unavailable(reason) => Some(format!("Not available: {}.", reason.describe())),
        Section::Failed(error) => Some(format!("Could not be loaded: {error}")),
    }
}

fn correlation_line(label: &str, result: &CorrelationResult) -> String {
    format!(
        "- {}: r = {:.2} ({:?}, {} days)",
        label, result.coefficient, result.strength, result.sample_size
    )
}

pub fn build_markdown(report: &FullInsightsReport) -> String {
    let mut output = String::new();
    let period = &report.generated_for;

    let _ = writeln!(output, "# Festival Social Insights");
    let _ = writeln!(
        output,
        "Window: {} to {} ({} days)",
        period.start, period.end, period.days
    );

    if !report.warnings.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Data Quality Warnings");
        for warning in &report.warnings {
            let _ = writeln!(output, "- {warning}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Key Insights");
    if report.key_insights.is_empty() {
        let _ = writeln!(output, "No insights for this window yet.");
    } else {
        for insight in &report.key_insights {
            let _ = writeln!(output, "- {insight}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Action Items");
    for item in &report.action_items {
        let _ = writeln!(
            output,
            "- [{}] {} (expected: {})",
            item.priority.as_str(),
            item.action,
            item.expected_impact
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Weather and Engagement");
    match report.weather.available() {
        Some(weather) => {
            let _ = writeln!(
                output,
                "{}",
                correlation_line("Temperature vs engagement", &weather.temperature_vs_engagement)
            );
            let _ = writeln!(
                output,
                "{}",
                correlation_line("Temperature vs reach", &weather.temperature_vs_reach)
            );
            let _ = writeln!(
                output,
                "{}",
                correlation_line("Rain vs engagement", &weather.rain_vs_engagement)
            );
            let _ = writeln!(
                output,
                "- Sunny days ({}): {:.1} avg engagement; rainy days ({}): {:.1}",
                weather.rain_impact.sunny_days,
                weather.rain_impact.sunny_days_avg_engagement,
                weather.rain_impact.rainy_days,
                weather.rain_impact.rainy_days_avg_engagement
            );
        }
        None => {
            let _ = writeln!(output, "{}", section_status(&report.weather).unwrap_or_default());
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Hashtags");
    match report.hashtags.available() {
        Some(hashtags) if hashtags.top_performers.is_empty() => {
            let _ = writeln!(
                output,
                "No hashtag was used at least {} times.",
                hashtags.min_usage
            );
        }
        Some(hashtags) => {
            for perf in hashtags.top_performers.iter().take(5) {
                let _ = writeln!(
                    output,
                    "- #{}: {:.2}% engagement rate, {:.0} avg reach, used {} times",
                    perf.hashtag, perf.avg_engagement_rate, perf.avg_reach, perf.times_used
                );
            }
            for bucket in &hashtags.by_color {
                let _ = writeln!(
                    output,
                    "- {} trend bucket: {:.2}% across {} hashtags",
                    bucket.color.as_str(),
                    bucket.avg_engagement_rate,
                    bucket.hashtags
                );
            }
        }
        None => {
            let _ = writeln!(output, "{}", section_status(&report.hashtags).unwrap_or_default());
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Sentiment and Follower Growth");
    match report.sentiment.available() {
        Some(sentiment) => {
            let _ = writeln!(
                output,
                "{}",
                correlation_line("Sentiment vs follower growth", &sentiment.sentiment_vs_growth)
            );
            if sentiment.follower_quality.reliable {
                let buckets = &sentiment.buckets;
                let _ = writeln!(
                    output,
                    "- Avg growth: positive {:.1}, neutral {:.1}, negative {:.1}",
                    buckets.high_positive_avg_growth,
                    buckets.neutral_avg_growth,
                    buckets.high_negative_avg_growth
                );
            } else {
                let _ = writeln!(output, "- Follower growth withheld: tracking is sparse.");
            }
        }
        None => {
            let _ = writeln!(output, "{}", section_status(&report.sentiment).unwrap_or_default());
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Link Attribution");
    match report.attribution.available() {
        Some(attribution) => {
            for stats in &attribution.by_platform {
                let _ = writeln!(
                    output,
                    "- {}: {} clicks, {} conversions ({:.1}%), value {:.2}",
                    stats.platform.label(),
                    stats.clicks,
                    stats.conversions,
                    stats.rate,
                    stats.conversion_value
                );
            }
        }
        None => {
            let _ = writeln!(
                output,
                "{}",
                section_status(&report.attribution).unwrap_or_default()
            );
        }
    }

    output
}
