use std::{fmt::Display, ops::Deref};

/// Whole-number percentage in `0..=100`. All habit statistics are reported
/// as integers, rounding half up, and a zero denominator yields 0 instead
/// of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Percentage(u8);

impl Percentage {
    pub const ZERO: Percentage = Percentage(0);

    /// Rounds `numerator / denominator` to a whole percentage. `x.5` rounds
    /// up, matching the rounding the statistics views expect.
    pub fn from_ratio(numerator: u32, denominator: u32) -> Percentage {
        if denominator == 0 {
            return Percentage::ZERO;
        }
        let scaled = u64::from(numerator) * 100;
        let denominator = u64::from(denominator);
        Percentage(((scaled * 2 + denominator) / (denominator * 2)) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Deref for Percentage {
    type Target = u8;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
