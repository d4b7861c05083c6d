use chrono::NaiveDate;

/// This is the standard way of converting a date to a completion-record key
/// in habitrack. Keys are zero-padded `YYYY-MM-DD`, so two moments on the
/// same local calendar day always produce the same key and distinct days
/// always produce distinct keys.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
