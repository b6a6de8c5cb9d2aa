//! Acquisition-of-signal (AOS) classification of the time item.

use serde::{Deserialize, Serialize};

/// `Status.Class` value the feed reports while the station link is live.
pub const LIVE_STATUS_CLASS: &str = "24";

/// Maximum tolerated lag between wall clock and feed timestamp, in hours (about 5.5 s).
pub const STALE_THRESHOLD_HOURS: f64 = 0.00153680542553047;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalStatus {
    #[default]
    Lost,
    Acquired,
    Stale,
}

impl SignalStatus {
    /// Numeric code mirroring the status: lost 0, acquired 1, stale 2.
    pub fn code(self) -> u8 {
        match self {
            SignalStatus::Lost => 0,
            SignalStatus::Acquired => 1,
            SignalStatus::Stale => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SignalStatus::Lost => "Signal Lost",
            SignalStatus::Acquired => "Signal Acquired",
            SignalStatus::Stale => "Stale Signal",
        }
    }
}

/// Classifies one time item update.
///
/// Evaluated from scratch on every update; there is no hysteresis.
pub fn classify(status_class: &str, difference_hours: f64) -> SignalStatus {
    if status_class != LIVE_STATUS_CLASS {
        SignalStatus::Lost
    } else if difference_hours > STALE_THRESHOLD_HOURS {
        SignalStatus::Stale
    } else {
        SignalStatus::Acquired
    }
}

/// Freshness of the feed as of the last time item update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryStatus {
    /// Reported timestamp, hours of year.
    pub timestamp: f64,
    pub status: SignalStatus,
    pub code: u8,
    /// Wall clock minus reported timestamp, in hours.
    pub difference: f64,
}

impl TelemetryStatus {
    /// Recomputes the whole record from one time item update.
    ///
    /// `now_hours` is the local wall clock in the same unit (see [`crate::clock`]).
    /// A timestamp that does not parse yields `NaN`, which never counts as stale.
    pub fn evaluate(timestamp: &str, status_class: &str, now_hours: f64) -> Self {
        let timestamp = timestamp.trim().parse::<f64>().unwrap_or_else(|_| {
            tracing::warn!(timestamp, "non-numeric feed timestamp");
            f64::NAN
        });
        let difference = now_hours - timestamp;
        let status = classify(status_class, difference);

        Self {
            timestamp,
            status,
            code: status.code(),
            difference,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_live_is_always_lost() {
        for difference in [0.0, -5.0, STALE_THRESHOLD_HOURS, 10.0, f64::NAN] {
            for class in ["", "0", "23", "25", " 24"] {
                assert_eq!(classify(class, difference), SignalStatus::Lost);
            }
        }
    }

    #[test]
    fn threshold_is_inclusive_for_acquired() {
        assert_eq!(classify("24", 0.0), SignalStatus::Acquired);
        assert_eq!(classify("24", STALE_THRESHOLD_HOURS), SignalStatus::Acquired);
        assert_eq!(classify("24", -1.0), SignalStatus::Acquired);
        assert_eq!(
            classify("24", STALE_THRESHOLD_HOURS + 1e-12),
            SignalStatus::Stale
        );
        assert_eq!(classify("24", 2.0), SignalStatus::Stale);
    }

    #[test]
    fn codes_mirror_status() {
        assert_eq!(SignalStatus::Lost.code(), 0);
        assert_eq!(SignalStatus::Acquired.code(), 1);
        assert_eq!(SignalStatus::Stale.code(), 2);
    }

    #[test]
    fn evaluate_recomputes_whole_record() {
        let status = TelemetryStatus::evaluate("4000.5", "24", 4000.5005);
        assert_eq!(status.timestamp, 4000.5);
        assert_eq!(status.status, SignalStatus::Acquired);
        assert_eq!(status.code, 1);
        assert!((status.difference - 0.0005).abs() < 1e-9);

        let stale = TelemetryStatus::evaluate("4000.5", "24", 4000.6);
        assert_eq!(stale.status, SignalStatus::Stale);
        assert_eq!(stale.code, 2);

        let lost = TelemetryStatus::evaluate("4000.5", "0", 4000.5);
        assert_eq!(lost.status, SignalStatus::Lost);
        assert_eq!(lost.code, 0);
    }

    #[test]
    fn default_is_lost() {
        let status = TelemetryStatus::default();
        assert_eq!(status.status, SignalStatus::Lost);
        assert_eq!(status.code, 0);
    }
}
