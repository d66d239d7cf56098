use chrono::{DateTime, FixedOffset, Utc};

/// Asia/Tehran has had no daylight saving since 2022.
pub const TEHRAN_UTC_OFFSET_MINUTES: i32 = 3 * 60 + 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Active { valid_until: DateTime<Utc> },
    Missing,
    Expired { valid_until: DateTime<Utc> },
}

impl SubscriptionStatus {
    /// Access is granted iff `now < valid_until`.
    pub fn evaluate(valid_until: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        match valid_until {
            None => Self::Missing,
            Some(valid_until) if now < valid_until => Self::Active { valid_until },
            Some(valid_until) => Self::Expired { valid_until },
        }
    }
}

/// The wall clock at `offset`, read as if it were UTC.
///
/// Expiry is judged against Tehran local time taken at face value, so with a
/// +03:30 offset a subscription lapses three and a half hours before its
/// stored instant.
pub fn wall_clock_as_utc(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
    now.with_timezone(&offset).naive_local().and_utc()
}

pub fn utc_offset(minutes: i32) -> Option<FixedOffset> {
    FixedOffset::east_opt(minutes * 60)
}
