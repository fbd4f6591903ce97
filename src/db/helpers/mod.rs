use anyhow::{Context, Result};
use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};

/// Timestamps are stored with microsecond precision so lexical and
/// chronological order agree.
pub fn format_datetime(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Next `updated_at` for a row last touched at `previous`; always strictly later.
pub fn advance_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let current = now();
    if current > previous {
        current
    } else {
        previous + Duration::microseconds(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn format_round_trips_through_parse() {
        let stamp = Utc.with_ymd_and_hms(2024, 7, 1, 9, 30, 0).unwrap() + Duration::microseconds(42);
        let text = format_datetime(&stamp);
        assert_eq!(text, "2024-07-01T09:30:00.000042Z");
        assert_eq!(parse_datetime(&text, "created_at").unwrap(), stamp);
    }

    #[test]
    fn parse_names_the_field_on_failure() {
        let err = parse_datetime("yesterday", "updated_at").unwrap_err();
        assert_eq!(err.to_string(), "failed to parse updated_at");
    }

    #[test]
    fn advance_is_strictly_later_even_for_future_previous() {
        let future = now() + Duration::hours(1);
        let next = advance_timestamp(future);
        assert_eq!(next, future + Duration::microseconds(1));

        let past = now() - Duration::hours(1);
        assert!(advance_timestamp(past) > past);
    }
}
