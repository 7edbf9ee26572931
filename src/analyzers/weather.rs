use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::align::{align_series, MIN_MATCHED_DAYS};
use crate::models::{
    DailyMetricPoint, EngagementDay, Period, RainImpact, WeatherCorrelationReport, WeatherDay,
};
use crate::stats::{correlate, mean, percentage_change};

const TEMPERATURE_INSIGHT_THRESHOLD: f64 = 0.3;
const RAIN_GAP_RATIO: f64 = 1.2;

pub fn analyze(
    period: Period,
    weather: &[WeatherDay],
    engagement: &[EngagementDay],
) -> Option<WeatherCorrelationReport> {
    let temperature: Vec<DailyMetricPoint> = weather
        .iter()
        .map(|day| DailyMetricPoint::new(day.date, day.temp_avg))
        .collect();
    let rain: Vec<DailyMetricPoint> = weather
        .iter()
        .map(|day| DailyMetricPoint::new(day.date, if day.is_rainy() { 1.0 } else { 0.0 }))
        .collect();
    let engaged: Vec<DailyMetricPoint> = engagement
        .iter()
        .map(|day| DailyMetricPoint::new(day.date, day.engagement))
        .collect();
    let reach: Vec<DailyMetricPoint> = engagement
        .iter()
        .map(|day| DailyMetricPoint::new(day.date, day.reach))
        .collect();

    let rows = align_series(&[&temperature, &rain, &engaged, &reach]);
    if rows.len() < MIN_MATCHED_DAYS {
        return None;
    }

    let temps: Vec<f64> = rows.iter().map(|row| row.values[0]).collect();
    let rain_flags: Vec<f64> = rows.iter().map(|row| row.values[1]).collect();
    let engagements: Vec<f64> = rows.iter().map(|row| row.values[2]).collect();
    let reaches: Vec<f64> = rows.iter().map(|row| row.values[3]).collect();

    let temperature_vs_engagement = correlate("temperature", "engagement", &temps, &engagements);
    let temperature_vs_reach = correlate("temperature", "reach", &temps, &reaches);
    let rain_vs_engagement = correlate("rain", "engagement", &rain_flags, &engagements);

    let mut rainy = Vec::new();
    let mut sunny = Vec::new();
    for (flag, value) in rain_flags.iter().zip(&engagements) {
        if *flag > 0.0 {
            rainy.push(*value);
        } else {
            sunny.push(*value);
        }
    }

    let rain_impact = RainImpact {
        sunny_days: sunny.len(),
        rainy_days: rainy.len(),
        sunny_days_avg_engagement: mean(&sunny),
        rainy_days_avg_engagement: mean(&rainy),
    };

    let mut insights = Vec::new();
    let mut recommendations = Vec::new();

    if temperature_vs_engagement.coefficient > TEMPERATURE_INSIGHT_THRESHOLD {
        insights.push(format!(
            "Warmer days bring more engagement (r = {:.2}).",
            temperature_vs_engagement.coefficient
        ));
        recommendations.push(
            "Schedule key festival announcements for days with warm forecasts.".to_string(),
        );
    }

    if rain_impact.sunny_days > 0 && rain_impact.rainy_days > 0 {
        let sunny_avg = rain_impact.sunny_days_avg_engagement;
        let rainy_avg = rain_impact.rainy_days_avg_engagement;
        if sunny_avg > rainy_avg * RAIN_GAP_RATIO {
            insights.push(format!(
                "Sunny days outperform rainy days by {:.0}% in engagement.",
                percentage_change(rainy_avg, sunny_avg)
            ));
            recommendations
                .push("Plan outdoor and on-site content for dry, sunny days.".to_string());
        } else if rainy_avg > sunny_avg * RAIN_GAP_RATIO {
            insights.push(format!(
                "Rainy days drive {:.0}% more engagement as audiences spend time indoors on their phones.",
                percentage_change(sunny_avg, rainy_avg)
            ));
            recommendations
                .push("Publish indoor and behind-the-scenes content on rainy days.".to_string());
        }
    }

    Some(WeatherCorrelationReport {
        period,
        temperature_vs_engagement,
        temperature_vs_reach,
        rain_vs_engagement,
        rain_impact,
        insights,
        recommendations,
    })
}

/// Matched weather/engagement days, for callers reporting why a section is absent.
pub fn matched_days(weather: &[WeatherDay], engagement: &[EngagementDay]) -> usize {
    let weather_dates: BTreeSet<NaiveDate> = weather.iter().map(|day| day.date).collect();
    engagement
        .iter()
        .map(|day| day.date)
        .filter(|date| weather_dates.contains(date))
        .collect::<BTreeSet<_>>()
        .len()
}
