use std::collections::HashMap;

use chrono::Datelike;

use crate::{
    store::entities::{CompletionRecord, Habit, is_completed},
    utils::{percentage::Percentage, time::day_key},
};

use super::{
    WEEKDAY_NAMES,
    calendar::{days_in_month, month_days},
};

/// Percentage of `habits` completed under `day` in the record. A day with
/// no entry and an empty habit list both yield 0.
pub fn day_completion(record: &CompletionRecord, day: &str, habits: &[Habit]) -> Percentage {
    let completed = completed_count(record, day, habits);
    Percentage::from_ratio(completed, habits.len() as u32)
}

/// Monthly completion score. Every day of the month and every habit count
/// toward the denominator, whether or not the record holds an entry for
/// them; a habit added mid-month therefore scores as not completed for the
/// days before it existed.
pub fn monthly_score(
    record: &CompletionRecord,
    year: i32,
    month0: u32,
    habits: &[Habit],
) -> Percentage {
    let completed: u32 = month_days(year, month0)
        .map(|date| completed_count(record, &day_key(date), habits))
        .sum();

    Percentage::from_ratio(completed, habits.len() as u32 * days_in_month(year, month0))
}

/// For each weekday name and each habit, the percentage of that weekday's
/// occurrences within the month on which the habit was completed. The
/// denominator is how often the weekday lands in the month, so a weekday
/// with no occurrences yields 0 for every habit.
pub fn weekly_breakdown(
    record: &CompletionRecord,
    year: i32,
    month0: u32,
    habits: &[Habit],
) -> HashMap<&'static str, HashMap<String, Percentage>> {
    let mut occurrences = [0u32; 7];
    let mut completions = vec![[0u32; 7]; habits.len()];

    for date in month_days(year, month0) {
        let weekday = date.weekday().num_days_from_sunday() as usize;
        occurrences[weekday] += 1;
        let key = day_key(date);
        for (habit, per_weekday) in habits.iter().zip(&mut completions) {
            if is_completed(record, &key, &habit.id) {
                per_weekday[weekday] += 1;
            }
        }
    }

    WEEKDAY_NAMES
        .iter()
        .enumerate()
        .map(|(weekday, name)| {
            let per_habit = habits
                .iter()
                .zip(&completions)
                .map(|(habit, per_weekday)| {
                    (
                        habit.id.clone(),
                        Percentage::from_ratio(per_weekday[weekday], occurrences[weekday]),
                    )
                })
                .collect();
            (*name, per_habit)
        })
        .collect()
}

/// Per-day completion percentages for the whole month, in day order. Feeds
/// the daily completion heatmap.
pub fn month_heatmap(
    record: &CompletionRecord,
    year: i32,
    month0: u32,
    habits: &[Habit],
) -> Vec<Percentage> {
    month_days(year, month0)
        .map(|date| day_completion(record, &day_key(date), habits))
        .collect()
}

fn completed_count(record: &CompletionRecord, day: &str, habits: &[Habit]) -> u32 {
    habits
        .iter()
        .filter(|habit| is_completed(record, day, &habit.id))
        .count() as u32
}
