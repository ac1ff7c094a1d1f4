//! Oracle NLS session formats and their chrono equivalents.
//!
//! [`SessionInit`](crate::session::SessionInit) sets the session to the `NLS_*`
//! formats below, so date and time values rendered with the matching chrono
//! format strings can be bound as plain text.

/// `NLS_TIME_FORMAT`
pub const NLS_TIME: &str = "HH24:MI:SS";
/// `NLS_DATE_FORMAT`
pub const NLS_DATE: &str = "YYYY-MM-DD HH24:MI:SS";
/// `NLS_TIMESTAMP_FORMAT`
pub const NLS_TIMESTAMP: &str = "YYYY-MM-DD HH24:MI:SS";
/// `NLS_TIMESTAMP_TZ_FORMAT`
pub const NLS_TIMESTAMP_TZ: &str = "YYYY-MM-DD HH24:MI:SS TZH:TZM";
/// `NLS_NUMERIC_CHARACTERS`: decimal separator then group separator.
pub const NLS_NUMERIC_CHARACTERS: &str = ".,";

/// chrono format for [`NLS_TIME`].
pub const TIME: &str = "%H:%M:%S";
/// chrono format for [`NLS_DATE`].
pub const DATE: &str = "%Y-%m-%d %H:%M:%S";
/// chrono format for [`NLS_TIMESTAMP`].
pub const TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";
/// chrono format for [`NLS_TIMESTAMP_TZ`].
pub const TIMESTAMP_TZ: &str = "%Y-%m-%d %H:%M:%S %:z";

/// Parse a `DATE`/`TIMESTAMP` column fetched under the session formats.
pub fn parse_timestamp(text: &str) -> Result<chrono::NaiveDateTime, chrono::ParseError> {
    chrono::NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP)
}

/// Parse a `TIMESTAMP WITH TIME ZONE` column fetched under the session formats.
pub fn parse_timestamp_tz(
    text: &str,
) -> Result<chrono::DateTime<chrono::FixedOffset>, chrono::ParseError> {
    chrono::DateTime::parse_from_str(text.trim(), TIMESTAMP_TZ)
}
