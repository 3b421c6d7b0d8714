use chrono::{DateTime, Datelike, Local, SecondsFormat, TimeZone, Timelike, Utc};
use serde::Serialize;

/// Wall-clock fields exposed to templates as `now` and `utcnow`.
///
/// Numeric parts are zero-padded strings so templates can concatenate them
/// directly (`{{now.year}}-{{now.month}}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemporalContext {
    pub iso: String,
    pub year: String,
    pub month: String,
    pub day: String,
    pub hour: String,
    pub minute: String,
    pub second: String,
}

impl TemporalContext {
    pub fn utc(at: DateTime<Utc>) -> Self {
        Self::from_datetime(&at, at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn local(at: DateTime<Utc>) -> Self {
        let local = at.with_timezone(&Local);
        let iso = local.to_rfc3339_opts(SecondsFormat::Millis, false);
        Self::from_datetime(&local, iso)
    }

    fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>, iso: String) -> Self {
        Self {
            iso,
            year: format!("{:04}", dt.year()),
            month: format!("{:02}", dt.month()),
            day: format!("{:02}", dt.day()),
            hour: format!("{:02}", dt.hour()),
            minute: format!("{:02}", dt.minute()),
            second: format!("{:02}", dt.second()),
        }
    }
}
