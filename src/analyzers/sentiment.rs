use crate::align::{align_pair, daily_deltas, MIN_MATCHED_DAYS};
use crate::models::{DailyMetricPoint, Period, SentimentBuckets, SentimentCorrelationReport};
use crate::quality;
use crate::stats::{correlate, mean, percentage_change};

const HIGH_SENTIMENT: f64 = 0.3;
const GROWTH_INSIGHT_THRESHOLD: f64 = 0.3;
const BUCKET_GAP_RATIO: f64 = 1.5;

pub fn analyze(
    period: Period,
    sentiment: &[DailyMetricPoint],
    followers: &[DailyMetricPoint],
) -> Option<SentimentCorrelationReport> {
    let growth = daily_deltas(followers);
    let aligned = align_pair(sentiment, &growth);
    if aligned.len() < MIN_MATCHED_DAYS {
        return None;
    }

    let follower_quality = quality::assess("follower", followers, period.days.max(0) as usize);
    let sentiment_vs_growth = correlate("sentiment", "follower growth", &aligned.x, &aligned.y);

    let mut positive = Vec::new();
    let mut neutral = Vec::new();
    let mut negative = Vec::new();
    for (score, delta) in aligned.x.iter().zip(&aligned.y) {
        if *score > HIGH_SENTIMENT {
            positive.push(*delta);
        } else if *score < -HIGH_SENTIMENT {
            negative.push(*delta);
        } else {
            neutral.push(*delta);
        }
    }

    let buckets = SentimentBuckets {
        high_positive_days: positive.len(),
        neutral_days: neutral.len(),
        high_negative_days: negative.len(),
        high_positive_avg_growth: mean(&positive),
        neutral_avg_growth: mean(&neutral),
        high_negative_avg_growth: mean(&negative),
    };

    let mut insights = Vec::new();
    if follower_quality.reliable {
        if sentiment_vs_growth.coefficient > GROWTH_INSIGHT_THRESHOLD {
            insights.push(format!(
                "Positive sentiment days line up with follower growth (r = {:.2}).",
                sentiment_vs_growth.coefficient
            ));
        }

        if !positive.is_empty() && !negative.is_empty() {
            let positive_avg = buckets.high_positive_avg_growth;
            let negative_avg = buckets.high_negative_avg_growth;
            // A relative change is only meaningful against a positive base.
            if negative_avg > 0.0 && positive_avg > negative_avg * BUCKET_GAP_RATIO {
                insights.push(format!(
                    "Highly positive days gain {:.0}% more followers than highly negative days.",
                    percentage_change(negative_avg, positive_avg)
                ));
            } else if negative_avg <= 0.0 && positive_avg > negative_avg {
                insights.push(format!(
                    "Highly positive days average {:.1} more followers per day than highly \
                     negative days ({:.1} vs {:.1}).",
                    positive_avg - negative_avg,
                    positive_avg,
                    negative_avg
                ));
            }
        }
    } else {
        insights.extend(follower_quality.warnings.iter().take(1).cloned());
    }

    Some(SentimentCorrelationReport {
        period,
        sentiment_vs_growth,
        buckets,
        follower_quality,
        insights,
    })
}
