use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::utils::clock::Clock;

/// Cap on the number of habits a user may hold at once. Enforced by callers
/// at the point of creation, never by the store and never retroactively.
pub const MAX_HABITS: usize = 6;

/// Size of the fixed display palette [Habit::color_index] points into.
pub const PALETTE_SIZE: usize = 6;

/// A tracked behavior. The identifier stays stable for the habit's
/// lifetime; name and color are editable in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub color_index: usize,
}

impl Habit {
    /// Builds a fresh habit for `position` in the display order. The
    /// identifier is derived from the creation timestamp; the color cycles
    /// through the palette.
    pub fn create(name: impl Into<String>, position: usize, clock: &impl Clock) -> Habit {
        Habit {
            id: format!("habit-{}", clock.time().timestamp_millis()),
            name: name.into(),
            color_index: position % PALETTE_SIZE,
        }
    }
}

/// Per-habit completion flags for a single day. A missing id reads as not
/// completed; an explicit `false` and an absent key are equivalent.
pub type DayEntry = BTreeMap<String, bool>;

/// Mapping from `YYYY-MM-DD` day keys to per-habit completion flags,
/// covering every day ever interacted with. Entries for habits that no
/// longer exist are retained; aggregation never sums them because iteration
/// is driven by the current habit list, not by record keys.
pub type CompletionRecord = BTreeMap<String, DayEntry>;

/// Looks up a single (day, habit) completion flag, treating absence of
/// either key as `false`.
pub fn is_completed(record: &CompletionRecord, day_key: &str, habit_id: &str) -> bool {
    record
        .get(day_key)
        .and_then(|day| day.get(habit_id))
        .copied()
        .unwrap_or(false)
}

/// Onboarding and profile flags, read on every start to pick the initial
/// view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub onboarded: bool,
    pub user_name: String,
}
