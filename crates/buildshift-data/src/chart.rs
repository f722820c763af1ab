//! Dataset-global duration scaling for the analytics chart.
//!
//! The chart displays counter-session durations next to counts; to keep the
//! axis readable the whole batch is divided by one divisor chosen from the
//! dataset maximum. The scaling decision is global, never per-record, so
//! every bar shares a unit label.

use buildshift_core::types::SessionSample;

/// Display divisor and unit label for a batch of durations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationScale {
    pub divisor: f64,
    pub label: &'static str,
}

impl DurationScale {
    /// Scale in seconds (divisor 1).
    pub const SECONDS: Self = Self {
        divisor: 1.0,
        label: "s",
    };
    /// Scale in minutes (divisor 60).
    pub const MINUTES: Self = Self {
        divisor: 60.0,
        label: "min",
    };
    /// Scale in hours (divisor 3600).
    pub const HOURS: Self = Self {
        divisor: 3600.0,
        label: "h",
    };

    /// Pick the scale for a dataset maximum, in seconds.
    ///
    /// Strictly greater comparisons: a maximum of exactly 3600 stays in
    /// minutes and exactly 60 stays in seconds.
    pub fn for_max(max_secs: f64) -> Self {
        if max_secs > 3600.0 {
            Self::HOURS
        } else if max_secs > 60.0 {
            Self::MINUTES
        } else {
            Self::SECONDS
        }
    }

    /// Pick the scale for a batch of samples.
    pub fn for_samples(samples: &[SessionSample]) -> Self {
        let max = samples
            .iter()
            .map(|s| s.duration_secs)
            .fold(0.0_f64, f64::max);
        Self::for_max(max)
    }

    /// Apply the divisor to a raw duration in seconds.
    pub fn apply(&self, secs: f64) -> f64 {
        secs / self.divisor
    }
}

/// One chart row: a grouping label with its count and scaled duration.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub label: String,
    pub count: f64,
    pub duration: f64,
}

/// Build chart rows from session samples, scaling every duration by the
/// batch-global divisor.
///
/// Returns the points together with the scale used, for axis labelling.
pub fn build_points(samples: &[SessionSample]) -> (Vec<ChartPoint>, DurationScale) {
    let scale = DurationScale::for_samples(samples);
    let points = samples
        .iter()
        .map(|s| ChartPoint {
            label: s.user.clone(),
            count: s.count,
            duration: scale.apply(s.duration_secs),
        })
        .collect();
    (points, scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(user: &str, count: f64, duration_secs: f64) -> SessionSample {
        SessionSample {
            user: user.to_string(),
            count,
            duration_secs,
        }
    }

    #[test]
    fn test_scale_selection() {
        assert_eq!(DurationScale::for_max(10.0), DurationScale::SECONDS);
        assert_eq!(DurationScale::for_max(61.0), DurationScale::MINUTES);
        assert_eq!(DurationScale::for_max(3601.0), DurationScale::HOURS);
    }

    #[test]
    fn test_scale_boundaries_are_strict() {
        assert_eq!(DurationScale::for_max(60.0), DurationScale::SECONDS);
        assert_eq!(DurationScale::for_max(3600.0), DurationScale::MINUTES);
    }

    #[test]
    fn test_scale_is_monotonic_in_max() {
        // Larger maxima never pick a smaller divisor
        let maxima = [0.0, 30.0, 60.0, 61.0, 600.0, 3600.0, 3601.0, 90000.0];
        let mut last_divisor = 0.0;
        for max in maxima {
            let scale = DurationScale::for_max(max);
            assert!(scale.divisor >= last_divisor, "max={max}");
            last_divisor = scale.divisor;
        }
    }

    #[test]
    fn test_whole_batch_shares_one_scale() {
        // One long session drags the entire batch into hours
        let samples = vec![
            sample("alice", 10.0, 30.0),
            sample("bob", 20.0, 7200.0),
        ];
        let (points, scale) = build_points(&samples);
        assert_eq!(scale, DurationScale::HOURS);
        assert!((points[0].duration - 30.0 / 3600.0).abs() < 1e-9);
        assert_eq!(points[1].duration, 2.0);
    }

    #[test]
    fn test_empty_batch_defaults_to_seconds() {
        let (points, scale) = build_points(&[]);
        assert!(points.is_empty());
        assert_eq!(scale, DurationScale::SECONDS);
    }

    #[test]
    fn test_points_preserve_order_and_labels() {
        let samples = vec![sample("carla", 5.0, 45.0), sample("dan", 7.0, 50.0)];
        let (points, scale) = build_points(&samples);
        assert_eq!(scale, DurationScale::SECONDS);
        assert_eq!(points[0].label, "carla");
        assert_eq!(points[1].label, "dan");
        assert_eq!(points[1].duration, 50.0);
    }
}
