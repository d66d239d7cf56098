use chrono::{Duration, TimeZone, Utc};
use dadnovin::domain::{
    SubscriptionStatus, TEHRAN_UTC_OFFSET_MINUTES, utc_offset, wall_clock_as_utc,
};

#[test]
fn given_no_valid_until_when_evaluating_then_missing() {
    assert_eq!(
        SubscriptionStatus::evaluate(None, Utc::now()),
        SubscriptionStatus::Missing
    );
}

#[test]
fn given_future_valid_until_when_evaluating_then_active() {
    let now = Utc::now();
    let valid_until = now + Duration::days(1);
    assert_eq!(
        SubscriptionStatus::evaluate(Some(valid_until), now),
        SubscriptionStatus::Active { valid_until }
    );
}

#[test]
fn given_valid_until_equal_to_now_when_evaluating_then_expired() {
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    let status = SubscriptionStatus::evaluate(Some(now), now);
    assert_eq!(status, SubscriptionStatus::Expired { valid_until: now });
}

#[test]
fn given_tehran_offset_when_reading_wall_clock_then_shifts_by_three_and_a_half_hours() {
    let tehran = utc_offset(TEHRAN_UTC_OFFSET_MINUTES).unwrap();
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 11, 0, 0).unwrap();

    assert_eq!(
        wall_clock_as_utc(now, tehran),
        Utc.with_ymd_and_hms(2025, 3, 1, 14, 30, 0).unwrap()
    );
}

#[test]
fn given_zero_offset_when_reading_wall_clock_then_unchanged() {
    let now = Utc.with_ymd_and_hms(2025, 3, 1, 11, 0, 0).unwrap();
    assert_eq!(wall_clock_as_utc(now, utc_offset(0).unwrap()), now);
}

#[test]
fn given_tehran_offset_when_built_then_is_three_and_a_half_hours() {
    let tehran = utc_offset(TEHRAN_UTC_OFFSET_MINUTES).unwrap();
    assert_eq!(tehran.local_minus_utc(), 12_600);
}
