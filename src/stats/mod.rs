//! Pure aggregation over the completion record. Every function here is
//! deterministic given its inputs and free of side effects; consumers pass
//! in a snapshot of the record plus the current habit list and recompute on
//! every render.

pub mod calendar;
pub mod completion;
pub mod streaks;

/// Weekday display names, indexed by
/// [chrono::Weekday::num_days_from_sunday] (0 = Sunday).
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];
