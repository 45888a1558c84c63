//! BSON `DateTime`과 chrono 사이의 변환

use chrono::{DateTime as ChronoDateTime, Duration, TimeZone, Utc};
use mongodb::bson::DateTime;

pub fn to_chrono(value: DateTime) -> ChronoDateTime<Utc> {
    Utc.timestamp_millis_opt(value.timestamp_millis())
        .single()
        .unwrap_or_default()
}

pub fn from_chrono(value: ChronoDateTime<Utc>) -> DateTime {
    DateTime::from_millis(value.timestamp_millis())
}

/// 현재 시각으로부터 `ttl` 뒤의 BSON 시각
pub fn bson_after(ttl: Duration) -> DateTime {
    from_chrono(Utc::now() + ttl)
}
