use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::DailyMetricPoint;

/// Days that every analyzer needs before it will draw a conclusion.
pub const MIN_MATCHED_DAYS: usize = 7;

/// One joined day; `values[i]` comes from the i-th input series.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRow {
    pub date: NaiveDate,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AlignedSeriesPair {
    pub dates: Vec<NaiveDate>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl AlignedSeriesPair {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Inner join of any number of daily series on date, ascending.
///
/// A date survives only when every series observed it; nothing is zero-filled.
/// Within one series a repeated date keeps the last value seen.
pub fn align_series(series: &[&[DailyMetricPoint]]) -> Vec<AlignedRow> {
    if series.is_empty() {
        return Vec::new();
    }

    let width = series.len();
    let mut joined: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();

    for (index, points) in series.iter().enumerate() {
        for point in points.iter() {
            let slots = joined
                .entry(point.date)
                .or_insert_with(|| vec![None; width]);
            slots[index] = Some(point.value);
        }
    }

    joined
        .into_iter()
        .filter_map(|(date, slots)| {
            let values: Option<Vec<f64>> = slots.into_iter().collect();
            values.map(|values| AlignedRow { date, values })
        })
        .collect()
}

pub fn align_pair(x: &[DailyMetricPoint], y: &[DailyMetricPoint]) -> AlignedSeriesPair {
    let mut pair = AlignedSeriesPair::default();
    for row in align_series(&[x, y]) {
        pair.dates.push(row.date);
        pair.x.push(row.values[0]);
        pair.y.push(row.values[1]);
    }
    pair
}

/// Day-over-day deltas of a cumulative series such as follower count.
///
/// Computed on the source series before any join so each delta is taken
/// against the true previous observation. The first day has no delta.
pub fn daily_deltas(points: &[DailyMetricPoint]) -> Vec<DailyMetricPoint> {
    let by_date: BTreeMap<NaiveDate, f64> = points
        .iter()
        .map(|point| (point.date, point.value))
        .collect();
    let sorted: Vec<DailyMetricPoint> = by_date
        .into_iter()
        .map(|(date, value)| DailyMetricPoint::new(date, value))
        .collect();

    sorted
        .windows(2)
        .map(|pair| DailyMetricPoint::new(pair[1].date, pair[1].value - pair[0].value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    fn series(days: &[u32], value: f64) -> Vec<DailyMetricPoint> {
        days.iter()
            .map(|d| DailyMetricPoint::new(day(*d), value + *d as f64))
            .collect()
    }

    #[test]
    fn pair_keeps_only_intersection_in_date_order() {
        let a = series(&[5, 1, 2, 3, 4], 0.0);
        let b = series(&[3, 4, 5, 6, 7], 100.0);
        let pair = align_pair(&a, &b);

        assert_eq!(pair.len(), 3);
        assert_eq!(pair.dates, vec![day(3), day(4), day(5)]);
        assert_eq!(pair.x, vec![3.0, 4.0, 5.0]);
        assert_eq!(pair.y, vec![103.0, 104.0, 105.0]);
    }

    #[test]
    fn disjoint_series_align_to_nothing() {
        let pair = align_pair(&series(&[1, 2], 0.0), &series(&[3, 4], 0.0));
        assert!(pair.is_empty());
    }

    #[test]
    fn multi_series_join_requires_every_source() {
        let a = series(&[1, 2, 3], 0.0);
        let b = series(&[2, 3], 10.0);
        let c = series(&[3, 1], 20.0);
        let rows = align_series(&[&a, &b, &c]);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, day(3));
        assert_eq!(rows[0].values, vec![3.0, 13.0, 23.0]);
    }

    #[test]
    fn real_zero_values_are_kept() {
        let a = vec![DailyMetricPoint::new(day(1), 0.0)];
        let b = vec![DailyMetricPoint::new(day(1), 0.0)];
        assert_eq!(align_pair(&a, &b).len(), 1);
    }

    #[test]
    fn deltas_use_source_neighbours() {
        let followers = vec![
            DailyMetricPoint::new(day(3), 130.0),
            DailyMetricPoint::new(day(1), 100.0),
            DailyMetricPoint::new(day(2), 110.0),
        ];
        let growth = daily_deltas(&followers);

        assert_eq!(
            growth,
            vec![
                DailyMetricPoint::new(day(2), 10.0),
                DailyMetricPoint::new(day(3), 20.0),
            ]
        );
    }

    #[test]
    fn deltas_of_single_point_are_empty() {
        assert!(daily_deltas(&[DailyMetricPoint::new(day(1), 5.0)]).is_empty());
    }
}
