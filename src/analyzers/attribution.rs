use std::collections::BTreeMap;

use crate::models::{
    AttributionReport, ClickEvent, Medium, MediumStats, Period, Platform, PlatformComparison,
    PlatformStats,
};
use crate::stats::percentage_change;

const PLATFORM_GAP_RATIO: f64 = 1.5;
const MIN_MEDIUM_CLICKS: usize = 10;

#[derive(Default)]
struct Tally {
    clicks: usize,
    conversions: usize,
    value: f64,
}

impl Tally {
    fn record(&mut self, click: &ClickEvent) {
        self.clicks += 1;
        if click.converted {
            self.conversions += 1;
            self.value += click.conversion_value.unwrap_or(0.0);
        }
    }

    fn rate(&self) -> f64 {
        if self.clicks == 0 {
            0.0
        } else {
            self.conversions as f64 * 100.0 / self.clicks as f64
        }
    }
}

pub fn analyze(period: Period, clicks: &[ClickEvent]) -> Option<AttributionReport> {
    if clicks.is_empty() {
        return None;
    }

    let mut platforms: BTreeMap<Platform, Tally> = BTreeMap::new();
    let mut mediums: BTreeMap<Medium, Tally> = BTreeMap::new();
    for click in clicks {
        platforms
            .entry(Platform::from_utm(click.utm_source.as_deref()))
            .or_default()
            .record(click);
        mediums
            .entry(Medium::from_utm(click.utm_medium.as_deref()))
            .or_default()
            .record(click);
    }

    let by_platform: Vec<PlatformStats> = platforms
        .iter()
        .map(|(platform, tally)| PlatformStats {
            platform: *platform,
            clicks: tally.clicks,
            conversions: tally.conversions,
            rate: tally.rate(),
            conversion_value: tally.value,
        })
        .collect();

    let by_medium: Vec<MediumStats> = mediums
        .iter()
        .map(|(medium, tally)| MediumStats {
            medium: *medium,
            clicks: tally.clicks,
            conversions: tally.conversions,
            rate: tally.rate(),
        })
        .collect();

    let mut insights = Vec::new();

    let winning_platform = compare_platforms(&by_platform);
    if let Some(comparison) = &winning_platform {
        let rate_of = |platform: Platform| {
            by_platform
                .iter()
                .find(|stats| stats.platform == platform)
                .map_or(0.0, |stats| stats.rate)
        };
        insights.push(format!(
            "{} links convert {:.0}% better than {} ({:.1}% vs {:.1}%).",
            comparison.winner.label(),
            comparison.relative_percent,
            comparison.runner_up.label(),
            rate_of(comparison.winner),
            rate_of(comparison.runner_up)
        ));
    }

    let mut ranked: Vec<&MediumStats> = by_medium
        .iter()
        .filter(|stats| stats.clicks >= MIN_MEDIUM_CLICKS)
        .collect();
    ranked.sort_by(|a, b| b.rate.total_cmp(&a.rate));
    if let Some(best) = ranked.first().filter(|best| best.rate > 0.0) {
        insights.push(format!(
            "{} links have the highest conversion rate at {:.1}% ({} of {} clicks).",
            best.medium.label(),
            best.rate,
            best.conversions,
            best.clicks
        ));
    }

    Some(AttributionReport {
        period,
        total_clicks: clicks.len(),
        by_platform,
        by_medium,
        winning_platform,
        insights,
    })
}

fn compare_platforms(stats: &[PlatformStats]) -> Option<PlatformComparison> {
    let facebook = stats.iter().find(|s| s.platform == Platform::Facebook)?;
    let instagram = stats.iter().find(|s| s.platform == Platform::Instagram)?;

    let (winner, runner_up) = if facebook.rate >= instagram.rate {
        (facebook, instagram)
    } else {
        (instagram, facebook)
    };

    if winner.rate > 0.0 && winner.rate > runner_up.rate * PLATFORM_GAP_RATIO {
        Some(PlatformComparison {
            winner: winner.platform,
            runner_up: runner_up.platform,
            relative_percent: percentage_change(runner_up.rate, winner.rate),
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn period() -> Period {
        Period {
            start: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 7, 1).unwrap(),
            days: 30,
        }
    }

    fn clicks(source: &str, medium: &str, total: usize, converted: usize, value: f64) -> Vec<ClickEvent> {
        (0..total)
            .map(|i| ClickEvent {
                timestamp: Utc.with_ymd_and_hms(2026, 6, 10, 12, 0, 0).unwrap(),
                utm_source: Some(source.to_string()),
                utm_medium: Some(medium.to_string()),
                converted: i < converted,
                conversion_value: (i < converted).then_some(value),
            })
            .collect()
    }

    #[test]
    fn no_clicks_means_no_report() {
        assert!(analyze(period(), &[]).is_none());
    }

    #[test]
    fn facebook_outconverting_instagram() {
        let mut events = clicks("facebook", "post", 100, 10, 25.0);
        events.extend(clicks("instagram", "story", 100, 4, 25.0));

        let report = analyze(period(), &events).unwrap();
        let facebook = report.platform(Platform::Facebook).unwrap();
        let instagram = report.platform(Platform::Instagram).unwrap();
        assert_eq!(facebook.rate, 10.0);
        assert_eq!(instagram.rate, 4.0);
        assert_eq!(facebook.conversion_value, 250.0);

        let comparison = report.winning_platform.as_ref().unwrap();
        assert_eq!(comparison.winner, Platform::Facebook);
        assert_eq!(comparison.relative_percent, 150.0);
        assert_eq!(
            report.insights[0],
            "Facebook links convert 150% better than Instagram (10.0% vs 4.0%)."
        );
        assert!(report.insights[1].starts_with("Post links have the highest conversion rate"));
    }

    #[test]
    fn close_rates_produce_no_platform_winner() {
        let mut events = clicks("fb", "reel", 50, 5, 0.0);
        events.extend(clicks("ig", "reel", 50, 4, 0.0));

        let report = analyze(period(), &events).unwrap();
        assert!(report.winning_platform.is_none());
        assert_eq!(report.medium(Medium::Reel).unwrap().clicks, 100);
        assert_eq!(report.insights.len(), 1);
    }

    #[test]
    fn thin_mediums_are_not_ranked() {
        let mut events = clicks("newsletter", "email", 9, 9, 0.0);
        events.extend(clicks("facebook", "ad", 20, 2, 0.0));

        let report = analyze(period(), &events).unwrap();
        assert_eq!(report.platform(Platform::Other).unwrap().clicks, 9);
        assert!(report.winning_platform.is_none());
        assert_eq!(report.insights, vec![
            "Ad links have the highest conversion rate at 10.0% (2 of 20 clicks).".to_string()
        ]);
    }

    #[test]
    fn instagram_can_win_the_comparison() {
        let mut events = clicks("facebook", "post", 50, 2, 10.0);
        events.extend(clicks("instagram", "post", 50, 6, 10.0));

        let report = analyze(period(), &events).unwrap();
        let comparison = report.winning_platform.as_ref().unwrap();
        assert_eq!(comparison.winner, Platform::Instagram);
        assert_eq!(comparison.runner_up, Platform::Facebook);
        assert_eq!(comparison.relative_percent, 200.0);
        assert_eq!(
            report.insights[0],
            "Instagram links convert 200% better than Facebook (12.0% vs 4.0%)."
        );
    }

    #[test]
    fn busy_medium_without_conversions_is_not_praised() {
        let mut events = clicks("facebook", "story", 30, 0, 0.0);
        events.extend(clicks("instagram", "story", 30, 0, 0.0));

        let report = analyze(period(), &events).unwrap();
        assert_eq!(report.medium(Medium::Story).unwrap().clicks, 60);
        assert_eq!(report.medium(Medium::Story).unwrap().rate, 0.0);
        assert!(report.winning_platform.is_none());
        assert!(report.insights.is_empty());
    }

    #[test]
    fn analysis_is_repeatable() {
        let mut events = clicks("facebook", "ad", 40, 8, 30.0);
        events.extend(clicks("instagram", "reel", 40, 3, 30.0));
        events.extend(clicks("newsletter", "email", 5, 1, 30.0));

        assert_eq!(analyze(period(), &events), analyze(period(), &events));
    }

    #[test]
    fn missing_utm_tags_fall_back_to_other() {
        let events = vec![ClickEvent {
            timestamp: Utc.with_ymd_and_hms(2026, 6, 2, 8, 30, 0).unwrap(),
            utm_source: None,
            utm_medium: None,
            converted: false,
            conversion_value: None,
        }];
        let report = analyze(period(), &events).unwrap();
        assert_eq!(report.total_clicks, 1);
        assert_eq!(report.by_medium[0].medium, Medium::Other);
        assert!(report.insights.is_empty());
    }
}
