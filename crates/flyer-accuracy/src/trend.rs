//! Day-bucketed trend analysis and target-date projection.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use flyer_core::models::{DailyAccuracy, ProjectionOutcome, TrendReport, TrendDirection};

use crate::metrics::HistoryEntry;

/// Half-comparison dead band: day halves closer than this count as
/// stable.
const TREND_DEAD_BAND: f64 = 0.05;

/// Bucket history entries inside the window by calendar day and compare
/// the first half of days against the second.
pub fn build_trend(
    history: &[&HistoryEntry],
    window_days: i64,
    now: DateTime<Utc>,
) -> TrendReport {
    let cutoff = now - Duration::days(window_days);
    let recent: Vec<&&HistoryEntry> = history.iter().filter(|e| e.timestamp >= cutoff).collect();

    let mut buckets: BTreeMap<NaiveDate, (u64, u64)> = BTreeMap::new();
    for entry in &recent {
        let day = entry.timestamp.date_naive();
        let bucket = buckets.entry(day).or_default();
        bucket.1 += 1;
        if entry.is_correct {
            bucket.0 += 1;
        }
    }

    let daily: Vec<DailyAccuracy> = buckets
        .into_iter()
        .map(|(date, (correct, total))| DailyAccuracy {
            date,
            accuracy: correct as f64 / total as f64,
            total,
        })
        .collect();

    let direction = if daily.len() < 2 {
        TrendDirection::InsufficientData
    } else {
        let mid = daily.len() / 2;
        let mean = |days: &[DailyAccuracy]| {
            days.iter().map(|d| d.accuracy).sum::<f64>() / days.len() as f64
        };
        let first = mean(&daily[..mid]);
        let second = mean(&daily[mid..]);
        if second > first + TREND_DEAD_BAND {
            TrendDirection::Improving
        } else if second < first - TREND_DEAD_BAND {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        }
    };

    let total: u64 = daily.iter().map(|d| d.total).sum();
    let overall_accuracy = if total == 0 {
        0.0
    } else {
        daily
            .iter()
            .map(|d| d.accuracy * d.total as f64)
            .sum::<f64>()
            / total as f64
    };

    TrendReport {
        window_days,
        data_points: recent.len(),
        direction,
        daily,
        overall_accuracy,
    }
}

/// Fit a least-squares line through the daily accuracies and extrapolate
/// to the target.
pub fn project(trend: &TrendReport, target: f64, now: DateTime<Utc>) -> ProjectionOutcome {
    if trend.data_points == 0 {
        return ProjectionOutcome::InsufficientData;
    }
    if trend.overall_accuracy >= target {
        return ProjectionOutcome::Achieved;
    }
    if trend.daily.len() < 3 {
        return ProjectionOutcome::InsufficientData;
    }

    let slope = ols_slope(&trend.daily);
    if slope <= 0.0 {
        return ProjectionOutcome::NotImproving { daily_slope: slope };
    }

    let gap = target - trend.overall_accuracy;
    let estimated_days = (gap / slope) as i64;
    if estimated_days > 365 {
        return ProjectionOutcome::LongTerm {
            estimated_days,
            daily_slope: slope,
        };
    }

    ProjectionOutcome::Estimated {
        date: (now + Duration::days(estimated_days)).date_naive(),
        estimated_days,
        daily_slope: slope,
    }
}

fn ols_slope(daily: &[DailyAccuracy]) -> f64 {
    let n = daily.len() as f64;
    let mean_x = (n - 1.0) / 2.0;
    let mean_y = daily.iter().map(|d| d.accuracy).sum::<f64>() / n;

    let mut num = 0.0;
    let mut den = 0.0;
    for (i, d) in daily.iter().enumerate() {
        let dx = i as f64 - mean_x;
        num += dx * (d.accuracy - mean_y);
        den += dx * dx;
    }
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flyer_core::DealType;
    use proptest::prelude::*;

    fn entries(day_accuracies: &[(i64, &[bool])], now: DateTime<Utc>) -> Vec<HistoryEntry> {
        let mut out = Vec::new();
        for (days_ago, results) in day_accuracies {
            for &is_correct in *results {
                out.push(HistoryEntry {
                    timestamp: now - Duration::days(*days_ago),
                    is_correct,
                    phase: 1,
                    deal_type: DealType::Price,
                });
            }
        }
        out
    }

    fn refs(entries: &[HistoryEntry]) -> Vec<&HistoryEntry> {
        entries.iter().collect()
    }

    #[test]
    fn empty_history_is_insufficient() {
        let now = Utc::now();
        let trend = build_trend(&[], 7, now);
        assert_eq!(trend.direction, TrendDirection::InsufficientData);
        assert_eq!(trend.data_points, 0);
        assert_eq!(project(&trend, 0.85, now), ProjectionOutcome::InsufficientData);
    }

    #[test]
    fn improving_run_is_detected() {
        let now = Utc::now();
        let history = entries(
            &[
                (3, &[false, false, false, true]),
                (2, &[false, false, true, true]),
                (1, &[false, true, true, true]),
                (0, &[true, true, true, true]),
            ],
            now,
        );
        let trend = build_trend(&refs(&history), 7, now);
        assert_eq!(trend.direction, TrendDirection::Improving);
        assert_eq!(trend.daily.len(), 4);
        assert_eq!(trend.data_points, 16);
    }

    #[test]
    fn flat_run_is_stable() {
        let now = Utc::now();
        let history = entries(
            &[
                (2, &[true, false]),
                (1, &[true, false]),
                (0, &[true, false]),
            ],
            now,
        );
        let trend = build_trend(&refs(&history), 7, now);
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert!((trend.overall_accuracy - 0.5).abs() < 1e-9);
    }

    #[test]
    fn entries_outside_window_are_ignored() {
        let now = Utc::now();
        let history = entries(&[(30, &[true, true]), (0, &[false])], now);
        let trend = build_trend(&refs(&history), 7, now);
        assert_eq!(trend.data_points, 1);
        assert_eq!(trend.overall_accuracy, 0.0);
    }

    #[test]
    fn achieved_target_short_circuits() {
        let now = Utc::now();
        let history = entries(&[(1, &[true, true]), (0, &[true, true])], now);
        let trend = build_trend(&refs(&history), 14, now);
        assert_eq!(project(&trend, 0.85, now), ProjectionOutcome::Achieved);
    }

    #[test]
    fn declining_slope_is_not_improving() {
        let now = Utc::now();
        let history = entries(
            &[
                (2, &[true, true, true, true]),
                (1, &[true, true, false, false]),
                (0, &[false, false, false, true]),
            ],
            now,
        );
        let trend = build_trend(&refs(&history), 14, now);
        match project(&trend, 0.95, now) {
            ProjectionOutcome::NotImproving { daily_slope } => assert!(daily_slope < 0.0),
            other => panic!("expected NotImproving, got {other:?}"),
        }
    }

    #[test]
    fn steady_improvement_estimates_a_date() {
        let now = Utc::now();
        let history = entries(
            &[
                (3, &[false, false, false, true]),
                (2, &[false, false, true, true]),
                (1, &[false, true, true, true]),
                (0, &[false, true, true, true]),
            ],
            now,
        );
        let trend = build_trend(&refs(&history), 14, now);
        match project(&trend, 0.9, now) {
            ProjectionOutcome::Estimated {
                estimated_days,
                daily_slope,
                ..
            } => {
                assert!(daily_slope > 0.0);
                assert!(estimated_days > 0);
                assert!(estimated_days <= 365);
            }
            other => panic!("expected Estimated, got {other:?}"),
        }
    }

    #[test]
    fn glacial_improvement_is_long_term() {
        let now = Utc::now();
        // Slope of ~0.0001/day against a 0.4 gap.
        let mut history = Vec::new();
        for days_ago in 0..5i64 {
            for i in 0..1000i64 {
                history.push(HistoryEntry {
                    timestamp: now - Duration::days(days_ago),
                    is_correct: i < 500 + (5 - days_ago),
                    phase: 1,
                    deal_type: DealType::Price,
                });
            }
        }
        let trend = build_trend(&refs(&history), 14, now);
        match project(&trend, 0.95, now) {
            ProjectionOutcome::LongTerm { estimated_days, .. } => {
                assert!(estimated_days > 365);
            }
            other => panic!("expected LongTerm, got {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn trend_accuracies_stay_in_unit_interval(
            events in proptest::collection::vec((0i64..30, any::<bool>()), 0..80)
        ) {
            let now = Utc::now();
            let history: Vec<HistoryEntry> = events
                .iter()
                .map(|&(days_ago, is_correct)| HistoryEntry {
                    timestamp: now - Duration::days(days_ago),
                    is_correct,
                    phase: 2,
                    deal_type: DealType::Price,
                })
                .collect();
            let trend = build_trend(&refs(&history), 30, now);
            prop_assert_eq!(trend.data_points, history.len());
            prop_assert!((0.0..=1.0 + 1e-9).contains(&trend.overall_accuracy));
            for day in &trend.daily {
                prop_assert!((0.0..=1.0).contains(&day.accuracy));
                prop_assert!(day.total > 0);
            }
        }
    }
}
