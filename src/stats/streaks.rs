use chrono::{Datelike, NaiveDate};

use crate::{
    store::entities::{CompletionRecord, Habit, is_completed},
    utils::{percentage::Percentage, time::day_key},
};

use super::calendar::{days_in_month, first_of_month, month_days};

/// Statistics for one habit over one displayed month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitMonthStats {
    pub habit_id: String,
    /// Days of the month the habit was completed on.
    pub completed: u32,
    /// `completed` over the number of days in the month.
    pub percentage: Percentage,
    /// Consecutive completed days ending at the reference date. Zero
    /// whenever the displayed month is not the month containing the
    /// reference date, since "current" only means something for today's
    /// month.
    pub current_streak: u32,
    /// Longest run of consecutive completed days within the month. Runs do
    /// not span month boundaries.
    pub longest_streak: u32,
}

/// Derives per-habit statistics for a displayed month, in habit display
/// order. `reference` is the day current streaks are anchored to, normally
/// today.
pub fn month_streaks(
    record: &CompletionRecord,
    habits: &[Habit],
    reference: NaiveDate,
    year: i32,
    month0: u32,
) -> Vec<HabitMonthStats> {
    habits
        .iter()
        .map(|habit| single_habit_stats(record, habit, reference, year, month0))
        .collect()
}

fn single_habit_stats(
    record: &CompletionRecord,
    habit: &Habit,
    reference: NaiveDate,
    year: i32,
    month0: u32,
) -> HabitMonthStats {
    let mut completed = 0u32;
    let mut longest_streak = 0u32;
    let mut run = 0u32;

    for date in month_days(year, month0) {
        if is_completed(record, &day_key(date), &habit.id) {
            completed += 1;
            run += 1;
            longest_streak = longest_streak.max(run);
        } else {
            run = 0;
        }
    }

    HabitMonthStats {
        habit_id: habit.id.clone(),
        completed,
        percentage: Percentage::from_ratio(completed, days_in_month(year, month0)),
        current_streak: current_streak(record, &habit.id, reference, year, month0),
        longest_streak,
    }
}

/// Walks backward from the reference date counting consecutive completed
/// days, stopping at the first miss or at the start of the month.
fn current_streak(
    record: &CompletionRecord,
    habit_id: &str,
    reference: NaiveDate,
    year: i32,
    month0: u32,
) -> u32 {
    if reference.year() != year || reference.month0() != month0 {
        return 0;
    }

    let first = first_of_month(year, month0);
    let mut streak = 0;
    let mut date = reference;
    loop {
        if !is_completed(record, &day_key(date), habit_id) {
            break;
        }
        streak += 1;
        if date == first {
            break;
        }
        date = date
            .pred_opt()
            .expect("predecessor should exist past the month's first day");
    }
    streak
}
