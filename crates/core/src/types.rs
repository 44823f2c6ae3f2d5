/// Application-level record identifier. Always a string, whatever the
/// backend uses natively.
pub type CheckId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar day without a time zone (`yyyy-mm-dd` on the wire).
pub type Day = chrono::NaiveDate;

/// Wire format for every date field.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `yyyy-mm-dd` string into a [`Day`].
pub fn parse_day(raw: &str) -> Option<Day> {
    Day::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Today's date in UTC.
pub fn today() -> Day {
    chrono::Utc::now().date_naive()
}
