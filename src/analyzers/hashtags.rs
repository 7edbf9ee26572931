use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::{
    ColorBucket, HashtagCorrelationReport, HashtagPerformance, HashtagUsage, Period, TrendColor,
};
use crate::stats::mean;

pub const DEFAULT_MIN_USAGE: usize = 3;
const RANKED_LIMIT: usize = 10;

#[derive(Default)]
struct Totals {
    times_used: usize,
    engagement: f64,
    reach: f64,
    color: Option<TrendColor>,
}

pub fn normalize_hashtag(raw: &str) -> String {
    raw.trim().trim_start_matches('#').to_lowercase()
}

pub fn analyze(
    period: Period,
    usages: &[HashtagUsage],
    min_usage: usize,
) -> Option<HashtagCorrelationReport> {
    if usages.is_empty() {
        return None;
    }

    let mut totals: BTreeMap<String, Totals> = BTreeMap::new();
    for usage in usages {
        let tag = normalize_hashtag(&usage.hashtag);
        if tag.is_empty() {
            continue;
        }
        let entry = totals.entry(tag).or_default();
        entry.times_used += 1;
        entry.engagement += usage.engagement();
        entry.reach += usage.reach;
        if usage.color.is_some() {
            entry.color = usage.color;
        }
    }

    let performances: Vec<HashtagPerformance> = totals
        .into_iter()
        .filter(|(_, totals)| totals.times_used >= min_usage)
        .map(|(hashtag, totals)| HashtagPerformance {
            hashtag,
            color: totals.color,
            times_used: totals.times_used,
            total_engagement: totals.engagement,
            total_reach: totals.reach,
            avg_engagement_rate: if totals.reach > 0.0 {
                totals.engagement / totals.reach * 100.0
            } else {
                0.0
            },
            avg_reach: totals.reach / totals.times_used as f64,
        })
        .collect();

    let by_rate = |a: &HashtagPerformance, b: &HashtagPerformance| {
        a.avg_engagement_rate
            .partial_cmp(&b.avg_engagement_rate)
            .unwrap_or(Ordering::Equal)
    };

    let mut top_performers = performances.clone();
    top_performers.sort_by(|a, b| by_rate(b, a));
    top_performers.truncate(RANKED_LIMIT);

    let mut bottom_performers = performances.clone();
    bottom_performers.sort_by(by_rate);
    bottom_performers.truncate(RANKED_LIMIT);

    let by_color: Vec<ColorBucket> = [TrendColor::Green, TrendColor::Blue, TrendColor::Red]
        .into_iter()
        .filter_map(|color| {
            let rates: Vec<f64> = performances
                .iter()
                .filter(|perf| perf.color == Some(color))
                .map(|perf| perf.avg_engagement_rate)
                .collect();
            (!rates.is_empty()).then(|| ColorBucket {
                color,
                hashtags: rates.len(),
                avg_engagement_rate: mean(&rates),
            })
        })
        .collect();

    let mut insights = Vec::new();
    if let Some(best) = top_performers.first() {
        insights.push(format!(
            "#{} is the top performing hashtag at {:.2}% average engagement rate across {} posts.",
            best.hashtag, best.avg_engagement_rate, best.times_used
        ));
    }

    let bucket_rate = |color: TrendColor| {
        by_color
            .iter()
            .find(|bucket| bucket.color == color)
            .map(|bucket| bucket.avg_engagement_rate)
    };

    if let Some(green) = bucket_rate(TrendColor::Green) {
        let blue = bucket_rate(TrendColor::Blue);
        let red = bucket_rate(TrendColor::Red);

        let beats_others = (blue.is_some() || red.is_some())
            && blue.map_or(true, |rate| green > rate)
            && red.map_or(true, |rate| green > rate);
        if beats_others {
            insights.push(format!(
                "Trending (green) hashtags average {green:.2}% engagement; keep using trending hashtags."
            ));
        }

        if let Some(red) = red {
            if red < green / 2.0 {
                insights.push(format!(
                    "Overused (red) hashtags average only {red:.2}% engagement versus {green:.2}% for trending ones; avoid overused hashtags."
                ));
            }
        }
    }

    Some(HashtagCorrelationReport {
        period,
        min_usage,
        top_performers,
        bottom_performers,
        by_color,
        insights,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn period() -> Period {
        let start = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        Period {
            start,
            end: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            days: 30,
        }
    }

    fn usage(tag: &str, color: Option<TrendColor>, likes: f64, reach: f64) -> HashtagUsage {
        HashtagUsage {
            hashtag: tag.to_string(),
            color,
            likes,
            comments: 0.0,
            shares: 0.0,
            saves: 0.0,
            reach,
        }
    }

    fn repeated(tag: &str, color: Option<TrendColor>, likes: f64, reach: f64, times: usize) -> Vec<HashtagUsage> {
        (0..times).map(|_| usage(tag, color, likes, reach)).collect()
    }

    #[test]
    fn no_usage_means_no_report() {
        assert!(analyze(period(), &[], DEFAULT_MIN_USAGE).is_none());
    }

    #[test]
    fn aggregates_rates_and_reach() {
        let mut usages = repeated("#Festival", Some(TrendColor::Green), 10.0, 100.0, 2);
        usages.push(HashtagUsage {
            hashtag: "festival".to_string(),
            color: None,
            likes: 4.0,
            comments: 3.0,
            shares: 2.0,
            saves: 1.0,
            reach: 200.0,
        });

        let report = analyze(period(), &usages, DEFAULT_MIN_USAGE).unwrap();
        let festival = &report.top_performers[0];
        assert_eq!(festival.hashtag, "festival");
        assert_eq!(festival.times_used, 3);
        assert_eq!(festival.total_engagement, 30.0);
        assert_eq!(festival.total_reach, 400.0);
        assert_eq!(festival.avg_engagement_rate, 7.5);
        assert!((festival.avg_reach - 133.333).abs() < 0.001);
        assert_eq!(festival.color, Some(TrendColor::Green));
    }

    #[test]
    fn rarely_used_tags_are_excluded_but_report_survives() {
        let usages = repeated("once", None, 5.0, 10.0, 2);
        let report = analyze(period(), &usages, DEFAULT_MIN_USAGE).unwrap();
        assert!(report.top_performers.is_empty());
        assert!(report.insights.is_empty());
    }

    #[test]
    fn ranks_and_trending_rules() {
        let mut usages = Vec::new();
        usages.extend(repeated("lineup", Some(TrendColor::Green), 8.0, 100.0, 3));
        usages.extend(repeated("summer", Some(TrendColor::Blue), 5.0, 100.0, 3));
        usages.extend(repeated("music", Some(TrendColor::Red), 2.0, 100.0, 4));

        let report = analyze(period(), &usages, DEFAULT_MIN_USAGE).unwrap();
        let top: Vec<&str> = report.top_performers.iter().map(|p| p.hashtag.as_str()).collect();
        let bottom: Vec<&str> = report.bottom_performers.iter().map(|p| p.hashtag.as_str()).collect();
        assert_eq!(top, vec!["lineup", "summer", "music"]);
        assert_eq!(bottom, vec!["music", "summer", "lineup"]);

        assert!(report.insights[0].starts_with("#lineup is the top performing hashtag"));
        assert!(report.insights.iter().any(|i| i.contains("keep using trending hashtags")));
        assert!(report.insights.iter().any(|i| i.contains("avoid overused hashtags")));
        assert_eq!(report.by_color.len(), 3);
    }

    #[test]
    fn missing_green_bucket_makes_no_trending_claim() {
        let mut usages = Vec::new();
        usages.extend(repeated("summer", Some(TrendColor::Blue), 6.0, 100.0, 3));
        usages.extend(repeated("music", Some(TrendColor::Red), 1.0, 100.0, 3));

        let report = analyze(period(), &usages, DEFAULT_MIN_USAGE).unwrap();
        let colors: Vec<TrendColor> = report.by_color.iter().map(|b| b.color).collect();
        assert_eq!(colors, vec![TrendColor::Blue, TrendColor::Red]);
        assert_eq!(report.insights.len(), 1);
        assert!(report.insights[0].starts_with("#summer"));
    }

    #[test]
    fn green_alone_has_nothing_to_beat() {
        let usages = repeated("lineup", Some(TrendColor::Green), 9.0, 100.0, 4);

        let report = analyze(period(), &usages, DEFAULT_MIN_USAGE).unwrap();
        assert_eq!(report.by_color.len(), 1);
        assert!(report.insights.iter().all(|i| !i.contains("trending")));
        assert!(report.insights.iter().all(|i| !i.contains("overused")));
    }

    #[test]
    fn analysis_is_repeatable() {
        let mut usages = Vec::new();
        usages.extend(repeated("lineup", Some(TrendColor::Green), 8.0, 100.0, 3));
        usages.extend(repeated("camping", None, 8.0, 100.0, 3));
        usages.extend(repeated("music", Some(TrendColor::Red), 2.0, 100.0, 3));

        assert_eq!(
            analyze(period(), &usages, DEFAULT_MIN_USAGE),
            analyze(period(), &usages, DEFAULT_MIN_USAGE)
        );
    }

    #[test]
    fn ranked_lists_cap_at_ten() {
        let mut usages = Vec::new();
        for i in 0..15 {
            usages.extend(repeated(&format!("tag{i}"), None, i as f64, 100.0, 3));
        }
        let report = analyze(period(), &usages, DEFAULT_MIN_USAGE).unwrap();
        assert_eq!(report.top_performers.len(), 10);
        assert_eq!(report.bottom_performers.len(), 10);
        assert_eq!(report.top_performers[0].hashtag, "tag14");
        assert_eq!(report.bottom_performers[0].hashtag, "tag0");
    }
}
