//! Deterministic overflow forecasting over recent fill-level readings.
//!
//! The model is a straight line through the newest and oldest fresh reading.
//! It never extrapolates from a single anomalous jump, never forecasts for
//! faulty sensors, and caps how far into the future it commits to a number.

use std::cmp::Reverse;

use chrono::{DateTime, Duration, Utc};

use crate::config::PredictionPolicy;
use crate::model::{BinId, PredictionResult, PredictionStatus, Reading, SensorStatus};
use crate::ports::Forecaster;

const FULL_PERCENT: f64 = 100.0;
const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Linear-trend forecaster over a bin's recent readings.
#[derive(Debug, Clone, Default)]
pub struct OverflowPredictor {
    policy: PredictionPolicy,
}

impl OverflowPredictor {
    /// Create a forecaster with the given policy.
    #[must_use]
    pub fn new(policy: PredictionPolicy) -> Self {
        Self { policy }
    }

    /// Forecast when the bin will overflow.
    ///
    /// Pure and deterministic: identical `history` and `now` always yield
    /// the identical result. The caller contract is newest-first ordering,
    /// but the rate math silently corrupts if that is violated, so the
    /// history is re-sorted locally before use.
    #[must_use]
    pub fn predict(
        &self,
        bin_id: &BinId,
        history: &[Reading],
        now: DateTime<Utc>,
    ) -> PredictionResult {
        let mut result = PredictionResult {
            bin_id: bin_id.clone(),
            current_fill: 0.0,
            fill_rate_per_hour: 0.0,
            predicted_overflow_at: None,
            prediction_status: PredictionStatus::NotEnoughData,
        };

        let mut readings: Vec<&Reading> = history.iter().collect();
        readings.sort_by_key(|reading| Reverse(reading.recorded_at));

        let Some(latest) = readings.first() else {
            return result;
        };
        result.current_fill = latest.fill_percent;

        // A bin reporting a sensor fault never gets a forecast, even when
        // older readings look healthy.
        match latest.status {
            SensorStatus::Offline => {
                result.prediction_status = PredictionStatus::Offline;
                return result;
            }
            SensorStatus::Blocked => {
                result.prediction_status = PredictionStatus::Blocked;
                return result;
            }
            SensorStatus::Normal => {}
        }

        let freshness = Duration::hours(self.policy.freshness_window_hours);
        let valid: Vec<&Reading> = readings
            .into_iter()
            .filter(|reading| {
                reading.status == SensorStatus::Normal && now - reading.recorded_at <= freshness
            })
            .collect();

        if valid.len() < self.policy.min_trend_readings {
            return result;
        }

        result.prediction_status = PredictionStatus::Valid;

        let (Some(newest), Some(oldest)) = (valid.first(), valid.last()) else {
            return result;
        };

        let time_diff_hours = hours_between(oldest.recorded_at, newest.recorded_at);
        let fill_diff = newest.fill_percent - oldest.fill_percent;

        // Flat or freshly emptied bins are not at risk.
        if fill_diff <= 0.0 || time_diff_hours <= 0.0 {
            return result;
        }

        // A large jump within a short window is a dumping event, not a
        // filling trend; the rate stays zero.
        if fill_diff > self.policy.anomaly_jump_percent
            && time_diff_hours < self.policy.anomaly_window_hours
        {
            return result;
        }

        let rate = round_two_decimals(fill_diff / time_diff_hours);
        result.fill_rate_per_hour = rate;

        // A rate that rounds down to zero cannot project an overflow.
        if rate <= 0.0 {
            return result;
        }

        let hours_to_overflow = (FULL_PERCENT - newest.fill_percent) / rate;
        if hours_to_overflow > self.policy.max_horizon_hours {
            return result;
        }

        result.predicted_overflow_at = Some(newest.recorded_at + hours_duration(hours_to_overflow));
        result
    }
}

impl Forecaster for OverflowPredictor {
    fn predict(
        &self,
        bin_id: &BinId,
        history: &[Reading],
        now: DateTime<Utc>,
    ) -> PredictionResult {
        Self::predict(self, bin_id, history, now)
    }
}

fn hours_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

fn hours_duration(hours: f64) -> Duration {
    Duration::milliseconds((hours * MILLIS_PER_HOUR).round() as i64)
}

fn round_two_decimals(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    fn reading(fill: f64, minutes_ago: i64, status: SensorStatus) -> Reading {
        Reading {
            fill_percent: fill,
            recorded_at: anchor() - Duration::minutes(minutes_ago),
            status,
        }
    }

    fn predict(history: &[Reading]) -> PredictionResult {
        OverflowPredictor::default().predict(&BinId("BIN-1".to_owned()), history, anchor())
    }

    #[test]
    fn empty_history_reports_not_enough_data() {
        let result = predict(&[]);

        assert_eq!(result.prediction_status, PredictionStatus::NotEnoughData);
        assert_eq!(result.current_fill, 0.0, "no reading means no fill");
        assert!(result.predicted_overflow_at.is_none(), "no forecast");
    }

    #[test]
    fn single_reading_reports_not_enough_data() {
        let result = predict(&[reading(55.0, 0, SensorStatus::Normal)]);

        assert_eq!(result.prediction_status, PredictionStatus::NotEnoughData);
        assert_eq!(result.current_fill, 55.0, "fill comes from newest reading");
    }

    #[test]
    fn offline_newest_short_circuits_regardless_of_history() {
        let history = [
            reading(70.0, 0, SensorStatus::Offline),
            reading(60.0, 120, SensorStatus::Normal),
            reading(50.0, 240, SensorStatus::Normal),
        ];

        let result = predict(&history);

        assert_eq!(result.prediction_status, PredictionStatus::Offline);
        assert_eq!(result.current_fill, 70.0, "fill comes from newest reading");
        assert_eq!(result.fill_rate_per_hour, 0.0, "no trend math after fault");
        assert!(result.predicted_overflow_at.is_none(), "no forecast");
    }

    #[test]
    fn blocked_newest_short_circuits_regardless_of_history() {
        let history = [
            reading(70.0, 0, SensorStatus::Blocked),
            reading(60.0, 120, SensorStatus::Normal),
        ];

        let result = predict(&history);

        assert_eq!(result.prediction_status, PredictionStatus::Blocked);
        assert!(result.predicted_overflow_at.is_none(), "no forecast");
    }

    #[test]
    fn stale_readings_do_not_count_toward_the_minimum() {
        // Second reading is outside the 48 h freshness window.
        let history = [
            reading(60.0, 0, SensorStatus::Normal),
            reading(40.0, 50 * 60, SensorStatus::Normal),
        ];

        let result = predict(&history);

        assert_eq!(result.prediction_status, PredictionStatus::NotEnoughData);
    }

    #[test]
    fn rising_trend_yields_rate_and_overflow_time() {
        // 40 -> 60 percent over 10 hours: 2.0 %/h, 20 h to overflow.
        let history = [
            reading(60.0, 0, SensorStatus::Normal),
            reading(40.0, 600, SensorStatus::Normal),
        ];

        let result = predict(&history);

        assert_eq!(result.prediction_status, PredictionStatus::Valid);
        assert_eq!(result.fill_rate_per_hour, 2.0, "fill diff over time diff");
        assert_eq!(
            result.predicted_overflow_at,
            Some(anchor() + Duration::hours(20)),
            "remaining capacity divided by rate, anchored at the newest reading"
        );
    }

    #[test]
    fn faulty_middle_readings_are_skipped_in_the_trend() {
        let history = [
            reading(60.0, 0, SensorStatus::Normal),
            reading(55.0, 60, SensorStatus::Offline),
            reading(50.0, 300, SensorStatus::Normal),
        ];

        let result = predict(&history);

        // Trend spans the two healthy readings: 10 points over 5 hours.
        assert_eq!(result.fill_rate_per_hour, 2.0, "offline sample ignored");
        assert_eq!(
            result.predicted_overflow_at,
            Some(anchor() + Duration::hours(20)),
            "20 h at 2 %/h from 60 %"
        );
    }

    #[test]
    fn emptied_bin_is_flat_valid_without_forecast() {
        let history = [
            reading(10.0, 0, SensorStatus::Normal),
            reading(80.0, 360, SensorStatus::Normal),
        ];

        let result = predict(&history);

        assert_eq!(result.prediction_status, PredictionStatus::Valid);
        assert_eq!(result.fill_rate_per_hour, 0.0, "negative trend stays zero");
        assert!(result.predicted_overflow_at.is_none(), "bin not at risk");
    }

    #[test]
    fn dumping_event_suppresses_the_forecast() {
        // 40 points in half an hour trips the anomaly guard.
        let history = [
            reading(75.0, 0, SensorStatus::Normal),
            reading(35.0, 30, SensorStatus::Normal),
        ];

        let result = predict(&history);

        assert_eq!(result.prediction_status, PredictionStatus::Valid);
        assert_eq!(result.fill_rate_per_hour, 0.0, "jump is not used as a rate");
        assert!(result.predicted_overflow_at.is_none(), "no forecast");
    }

    #[test]
    fn large_jump_over_a_longer_window_is_a_trend() {
        // Same 40-point diff, but spread over 2 hours: a legitimate trend.
        let history = [
            reading(75.0, 0, SensorStatus::Normal),
            reading(35.0, 120, SensorStatus::Normal),
        ];

        let result = predict(&history);

        assert_eq!(result.fill_rate_per_hour, 20.0, "40 points over 2 h");
        assert_eq!(
            result.predicted_overflow_at,
            Some(anchor() + Duration::minutes(75)),
            "25 points remaining at 20 %/h"
        );
    }

    #[test]
    fn forecast_beyond_the_horizon_is_suppressed() {
        // 0.1 %/h from 10 percent needs 900 hours, far past the cap.
        let history = [
            reading(10.0, 0, SensorStatus::Normal),
            reading(9.0, 600, SensorStatus::Normal),
        ];

        let result = predict(&history);

        assert_eq!(result.prediction_status, PredictionStatus::Valid);
        assert_eq!(result.fill_rate_per_hour, 0.1, "rate is still reported");
        assert!(result.predicted_overflow_at.is_none(), "too far out");
    }

    #[test]
    fn unordered_history_is_resorted_before_use() {
        let newest_first = [
            reading(60.0, 0, SensorStatus::Normal),
            reading(50.0, 300, SensorStatus::Normal),
            reading(40.0, 600, SensorStatus::Normal),
        ];
        let mut shuffled = newest_first.to_vec();
        shuffled.reverse();

        let expected = predict(&newest_first);
        let actual = predict(&shuffled);

        assert_eq!(actual.fill_rate_per_hour, expected.fill_rate_per_hour, "same trend");
        assert_eq!(
            actual.predicted_overflow_at, expected.predicted_overflow_at,
            "ordering must not change the forecast"
        );
    }

    #[test]
    fn rate_is_rounded_to_two_decimals() {
        // 1 point over 3 hours: 0.3333... rounds to 0.33.
        let history = [
            reading(91.0, 0, SensorStatus::Normal),
            reading(90.0, 180, SensorStatus::Normal),
        ];

        let result = predict(&history);

        assert_eq!(result.fill_rate_per_hour, 0.33, "rounded before use");

        let predicted = result.predicted_overflow_at.expect("within horizon");
        let hours = (predicted - anchor()).num_milliseconds() as f64 / 3_600_000.0;
        assert!(
            (hours - 9.0 / 0.33).abs() < 0.001,
            "overflow projected with the rounded rate, got {hours}"
        );
    }

    #[test]
    fn policy_minimum_is_respected() {
        let predictor = OverflowPredictor::new(PredictionPolicy {
            min_trend_readings: 3,
            ..PredictionPolicy::default()
        });
        let history = [
            reading(60.0, 0, SensorStatus::Normal),
            reading(40.0, 600, SensorStatus::Normal),
        ];

        let result = predictor.predict(&BinId("BIN-1".to_owned()), &history, anchor());

        assert_eq!(result.prediction_status, PredictionStatus::NotEnoughData);
    }
}
