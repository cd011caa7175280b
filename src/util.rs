use chrono::{SecondsFormat, Utc};

/// Current instant as an ISO-8601 string with millisecond precision.
pub(crate) fn now_iso8601() -> String {
  Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
