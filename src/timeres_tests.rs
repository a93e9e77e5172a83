use super::*;
use chrono::TimeZone;

#[test]
fn resolves_future_time_today() {
    // "Now" is 9am UTC; target 8pm UTC today should be ~11h away.
    let now = Utc.with_ymd_and_hms(2026, 7, 28, 9, 0, 0).unwrap();
    let resolved = resolve(8, 0, "pm", "UTC", now).unwrap();
    assert_eq!(resolved, Utc.with_ymd_and_hms(2026, 7, 28, 20, 0, 0).unwrap());
}

#[test]
fn advances_to_next_day_when_target_already_passed() {
    let now = Utc.with_ymd_and_hms(2026, 7, 28, 21, 0, 0).unwrap();
    let resolved = resolve(8, 0, "pm", "UTC", now).unwrap();
    assert_eq!(resolved, Utc.with_ymd_and_hms(2026, 7, 29, 20, 0, 0).unwrap());
}

#[test]
fn midnight_boundary_resolves_within_a_minute() {
    // 11:59pm local, target 12am: must resolve within the next minute, not 24h later.
    let now = Utc.with_ymd_and_hms(2026, 7, 28, 23, 59, 0).unwrap();
    let resolved = resolve(12, 0, "am", "UTC", now).unwrap();
    let delta = resolved - now;
    assert!(delta <= chrono::Duration::minutes(1), "delta was {delta:?}");
    assert!(delta > chrono::Duration::zero());
}

#[test]
fn twelve_pm_is_noon_not_midnight() {
    let now = Utc.with_ymd_and_hms(2026, 7, 28, 0, 0, 0).unwrap();
    let resolved = resolve(12, 0, "pm", "UTC", now).unwrap();
    assert_eq!(resolved, Utc.with_ymd_and_hms(2026, 7, 28, 12, 0, 0).unwrap());
}

#[test]
fn named_zone_converts_through_tz_database() {
    let now = Utc.with_ymd_and_hms(2026, 7, 28, 0, 0, 0).unwrap();
    let resolved = resolve(8, 0, "pm", "Asia/Dhaka", now).unwrap();
    // Asia/Dhaka is UTC+6 year-round (no DST).
    assert_eq!(resolved, Utc.with_ymd_and_hms(2026, 7, 28, 14, 0, 0).unwrap());
}

#[test]
fn unknown_timezone_is_rejected() {
    let now = Utc::now();
    let err = resolve(8, 0, "pm", "Mars/Olympus", now).unwrap_err();
    assert!(err.to_string().contains("INVALID_TIMEZONE") || err.to_string().contains("Mars/Olympus"));
}

#[test]
fn out_of_range_hour_is_rejected() {
    let now = Utc::now();
    assert!(resolve(13, 0, "pm", "UTC", now).is_err());
}

#[test]
fn invalid_meridiem_is_rejected() {
    let now = Utc::now();
    assert!(resolve(8, 0, "zz", "UTC", now).is_err());
}

#[test]
fn remaining_saturates_to_zero_past_deadline() {
    let now = Utc::now();
    let deadline = now - chrono::Duration::seconds(30);
    assert_eq!(remaining(deadline, now), std::time::Duration::ZERO);
}

#[test]
fn remaining_reports_positive_duration_before_deadline() {
    let now = Utc::now();
    let deadline = now + chrono::Duration::seconds(30);
    assert_eq!(remaining(deadline, now), std::time::Duration::from_secs(30));
}
