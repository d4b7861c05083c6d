use chrono::{DateTime, Local, NaiveDate};

/// Represents an entity responsible for providing dates across the
/// application. This can allow it to be used for testing
pub trait Clock {
    fn time(&self) -> DateTime<Local>;

    /// The local calendar day, independent of time of day.
    fn today(&self) -> NaiveDate {
        self.time().date_naive()
    }
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Local> {
        Local::now()
    }
}
