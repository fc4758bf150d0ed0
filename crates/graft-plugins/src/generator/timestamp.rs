//! Generation timestamps that honour `SOURCE_DATE_EPOCH`.

use std::env;

use time::OffsetDateTime;

const SOURCE_DATE_EPOCH: &str = "SOURCE_DATE_EPOCH";

enum SourceDateError {
    InvalidInteger,
    InvalidTimestamp,
}

/// Returns the timestamp to stamp into generated files.
///
/// When `SOURCE_DATE_EPOCH` holds integer seconds since the Unix epoch that
/// value is used, so repeated builds render identical files. Otherwise the
/// current UTC time is returned. A malformed variable adds a message to
/// `warnings` instead of failing.
pub fn generation_timestamp(warnings: &mut Vec<String>) -> OffsetDateTime {
    let raw = env::var(SOURCE_DATE_EPOCH).ok();
    timestamp_from(raw.as_deref(), OffsetDateTime::now_utc(), warnings)
}

pub(crate) fn timestamp_from(
    raw: Option<&str>,
    now: OffsetDateTime,
    warnings: &mut Vec<String>,
) -> OffsetDateTime {
    let Some(value) = raw else {
        return now;
    };

    match parse_source_date(value) {
        Ok(timestamp) => timestamp,
        Err(SourceDateError::InvalidInteger) => {
            warnings.push(format!(
                "Invalid {SOURCE_DATE_EPOCH} '{value}'; expected integer seconds since Unix \
                 epoch; using the current time"
            ));
            now
        }
        Err(SourceDateError::InvalidTimestamp) => {
            warnings.push(format!(
                "Invalid {SOURCE_DATE_EPOCH} '{value}'; not a valid Unix timestamp; using the \
                 current time"
            ));
            now
        }
    }
}

fn parse_source_date(value: &str) -> Result<OffsetDateTime, SourceDateError> {
    let seconds = value
        .trim()
        .parse::<i64>()
        .map_err(|_| SourceDateError::InvalidInteger)?;
    OffsetDateTime::from_unix_timestamp(seconds).map_err(|_| SourceDateError::InvalidTimestamp)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn now() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).expect("valid timestamp")
    }

    #[test]
    fn missing_variable_uses_now() {
        let mut warnings = Vec::new();
        assert_eq!(timestamp_from(None, now(), &mut warnings), now());
        assert!(warnings.is_empty());
    }

    #[rstest]
    #[case("0", 0)]
    #[case("1704067200", 1_704_067_200)]
    #[case(" 86400 ", 86_400)]
    fn valid_epoch_is_used(#[case] raw: &str, #[case] expected: i64) {
        let mut warnings = Vec::new();
        let timestamp = timestamp_from(Some(raw), now(), &mut warnings);

        assert_eq!(timestamp.unix_timestamp(), expected);
        assert!(warnings.is_empty());
    }

    #[rstest]
    #[case("yesterday", "expected integer seconds")]
    #[case("99999999999999999", "not a valid Unix timestamp")]
    fn malformed_epoch_warns_and_uses_now(#[case] raw: &str, #[case] expected: &str) {
        let mut warnings = Vec::new();
        let timestamp = timestamp_from(Some(raw), now(), &mut warnings);

        assert_eq!(timestamp, now());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains(expected), "warning: {}", warnings[0]);
    }
}
