use chrono::{Datelike, NaiveDate};

/// First day of a month. `month0` is zero-based (0 = January) here and in
/// every other function taking a month, matching how the consuming views
/// index months.
pub fn first_of_month(year: i32, month0: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month0 + 1, 1).expect("month index should be in 0..12")
}

/// Number of calendar days in a month, leap years included.
pub fn days_in_month(year: i32, month0: u32) -> u32 {
    let first = first_of_month(year, month0);
    let next = if month0 == 11 {
        first_of_month(year + 1, 0)
    } else {
        first_of_month(year, month0 + 1)
    };
    (next - first).num_days() as u32
}

/// Zero-based weekday of the first day of a month, with 0 = Sunday. Used by
/// calendar grids to compute leading blank cells.
pub fn first_weekday_of_month(year: i32, month0: u32) -> u32 {
    first_of_month(year, month0).weekday().num_days_from_sunday()
}

/// Iterates every day of a month in order.
pub fn month_days(year: i32, month0: u32) -> impl Iterator<Item = NaiveDate> {
    first_of_month(year, month0)
        .iter_days()
        .take(days_in_month(year, month0) as usize)
}
