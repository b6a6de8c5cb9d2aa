//! Wall clock expressed in the unit of the ISS time item: hours since the start of the year.
//!
//! This mirrors how the feed's timestamp is compared on the ground, including its
//! quirks: the day of year comes from the local calendar, the time of day from UTC,
//! and seconds are whole seconds.

use chrono::{Datelike, Local, NaiveTime, Timelike, Utc};

/// `day_of_year * 24 + hour + minute / 60 + second / 3600`.
pub fn hours_of_year(day_of_year: u32, utc_time: NaiveTime) -> f64 {
    f64::from(day_of_year) * 24.0
        + f64::from(utc_time.hour())
        + f64::from(utc_time.minute()) / 60.0
        + f64::from(utc_time.second()) / 3600.0
}

pub fn now_hours_of_year() -> f64 {
    let local = Local::now();
    let utc = local.with_timezone(&Utc);
    hours_of_year(local.ordinal(), utc.time())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn midnight_on_first_day() {
        let t = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
        assert_eq!(hours_of_year(1, t), 24.0);
    }

    #[test]
    fn fractional_hours() {
        let t = NaiveTime::from_hms_opt(13, 30, 36).unwrap();
        let expected = 100.0 * 24.0 + 13.0 + 0.5 + 0.01;
        assert!((hours_of_year(100, t) - expected).abs() < 1e-9);
    }

    #[test]
    fn sub_second_precision_is_dropped() {
        let whole = NaiveTime::from_hms_opt(5, 6, 7).unwrap();
        let with_millis = NaiveTime::from_hms_milli_opt(5, 6, 7, 999).unwrap();
        assert_eq!(hours_of_year(42, whole), hours_of_year(42, with_millis));
    }

    #[test]
    fn now_is_within_the_year() {
        let now = now_hours_of_year();
        assert!(now >= 24.0);
        assert!(now < 367.0 * 24.0);
    }
}
