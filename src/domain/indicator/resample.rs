//! Daily resampling of irregular time series.
//!
//! Each calendar day between the first and last observation gets one value:
//! the last non-NaN observation of that day. Days with no observation inherit
//! the previous day's value (forward fill). The fill corrects oversampling
//! gaps in the grid; it is not a claim about missing market data.

use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    pub days: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

impl DailySeries {
    /// Keep days in `[start, end]`; `None` leaves that side open.
    pub fn restrict(self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> DailySeries {
        let (days, values) = self
            .days
            .into_iter()
            .zip(self.values)
            .filter(|(d, _)| start.is_none_or(|s| *d >= s) && end.is_none_or(|e| *d <= e))
            .unzip();
        DailySeries { days, values }
    }

    pub fn index(&self) -> Vec<NaiveDateTime> {
        self.days.iter().filter_map(|d| d.and_hms_opt(0, 0, 0)).collect()
    }
}

/// Calendar days from `first` to `last`, both included.
pub fn day_grid(index: &[NaiveDateTime]) -> Vec<NaiveDate> {
    let (Some(first), Some(last)) = (
        index.iter().map(|t| t.date()).min(),
        index.iter().map(|t| t.date()).max(),
    ) else {
        return Vec::new();
    };
    first.iter_days().take_while(|d| *d <= last).collect()
}

pub fn daily_last(index: &[NaiveDateTime], values: &[f64]) -> DailySeries {
    let mut order: Vec<usize> = (0..index.len()).collect();
    order.sort_by_key(|&i| index[i]);

    let mut last_per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for i in order {
        if !values[i].is_nan() {
            last_per_day.insert(index[i].date(), values[i]);
        }
    }

    let days = day_grid(index);
    let mut carried = f64::NAN;
    let values = days
        .iter()
        .map(|d| {
            if let Some(&v) = last_per_day.get(d) {
                carried = v;
            }
            carried
        })
        .collect();
    DailySeries { days, values }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn last_observation_of_day_wins() {
        let series = daily_last(&[at(1, 9), at(1, 16), at(2, 10)], &[1.0, 2.0, 3.0]);
        assert_eq!(series.days, vec![day(1), day(2)]);
        assert_eq!(series.values, vec![2.0, 3.0]);
    }

    #[test]
    fn unsorted_index_is_ordered_first() {
        let series = daily_last(&[at(1, 16), at(1, 9)], &[2.0, 1.0]);
        assert_eq!(series.values, vec![2.0]);
    }

    #[test]
    fn gaps_are_forward_filled() {
        let series = daily_last(&[at(5, 0), at(8, 0)], &[0.01, 0.02]);
        assert_eq!(series.days.len(), 4);
        assert_eq!(series.values, vec![0.01, 0.01, 0.01, 0.02]);
    }

    #[test]
    fn nan_observations_are_skipped() {
        let series = daily_last(&[at(1, 9), at(1, 10), at(2, 0)], &[1.0, f64::NAN, f64::NAN]);
        assert_eq!(series.values, vec![1.0, 1.0]);
    }

    #[test]
    fn restrict_is_inclusive() {
        let series = daily_last(&[at(1, 0), at(2, 0), at(3, 0)], &[1.0, 2.0, 3.0]);
        let sub = series.clone().restrict(Some(day(2)), Some(day(3)));
        assert_eq!(sub.values, vec![2.0, 3.0]);
        let sub = series.restrict(None, Some(day(1)));
        assert_eq!(sub.values, vec![1.0]);
    }

    #[test]
    fn empty_input() {
        let series = daily_last(&[], &[]);
        assert!(series.days.is_empty());
        assert!(series.values.is_empty());
    }
}
