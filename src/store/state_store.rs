use std::{
    fs::File,
    io::{ErrorKind, Read, Seek, SeekFrom, Write},
    ops::Deref,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use anyhow::Result;
use fs4::fs_std::FileExt;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

use crate::utils::dir::create_application_default_path;

use super::entities::{CompletionRecord, Habit, Profile};

/// Interface for abstracting durable storage of the three application
/// records: the habit list, the completion record, and the profile flags.
///
/// Reads never fail. An absent or malformed record degrades to its empty
/// default. Writes replace a record wholesale and surface medium failures
/// to the caller; no validation happens here, so invariants like the habit
/// cap belong to callers.
#[cfg_attr(test, mockall::automock)]
pub trait StateStore {
    /// The stored habit list in display (insertion) order.
    fn habits(&self) -> Vec<Habit>;

    fn set_habits(&self, habits: &[Habit]) -> Result<()>;

    /// The full completion record.
    fn completions(&self) -> CompletionRecord;

    fn set_completions(&self, record: &CompletionRecord) -> Result<()>;

    /// Flips one (day, habit) completion flag and returns the updated
    /// record so callers can refresh their snapshot without a second read.
    /// A missing flag counts as `false` before the flip, so the first
    /// toggle sets it to `true` and toggling twice restores the original
    /// state. The read-modify-write happens as one atomic unit.
    fn toggle_completion(&self, day_key: &str, habit_id: &str) -> Result<CompletionRecord>;

    fn is_onboarded(&self) -> bool;

    fn set_onboarded(&self, value: bool) -> Result<()>;

    fn user_name(&self) -> String;

    fn set_user_name(&self, name: &str) -> Result<()>;

    /// Clears all three records in one logical operation, leaving the store
    /// indistinguishable from a fresh install.
    fn reset(&self) -> Result<()>;
}

impl<T: Deref> StateStore for T
where
    T::Target: StateStore,
{
    fn habits(&self) -> Vec<Habit> {
        self.deref().habits()
    }

    fn set_habits(&self, habits: &[Habit]) -> Result<()> {
        self.deref().set_habits(habits)
    }

    fn completions(&self) -> CompletionRecord {
        self.deref().completions()
    }

    fn set_completions(&self, record: &CompletionRecord) -> Result<()> {
        self.deref().set_completions(record)
    }

    fn toggle_completion(&self, day_key: &str, habit_id: &str) -> Result<CompletionRecord> {
        self.deref().toggle_completion(day_key, habit_id)
    }

    fn is_onboarded(&self) -> bool {
        self.deref().is_onboarded()
    }

    fn set_onboarded(&self, value: bool) -> Result<()> {
        self.deref().set_onboarded(value)
    }

    fn user_name(&self) -> String {
        self.deref().user_name()
    }

    fn set_user_name(&self, name: &str) -> Result<()> {
        self.deref().set_user_name(name)
    }

    fn reset(&self) -> Result<()> {
        self.deref().reset()
    }
}

const HABITS_FILE: &str = "habits.json";
const COMPLETIONS_FILE: &str = "completions.json";
const PROFILE_FILE: &str = "profile.json";

/// Flips one flag in place, creating missing outer and inner entries. The
/// single mutation primitive behind [StateStore::toggle_completion].
fn flip_completion(record: &mut CompletionRecord, day_key: &str, habit_id: &str) {
    let day = record.entry(day_key.to_owned()).or_default();
    let flag = day.entry(habit_id.to_owned()).or_insert(false);
    *flag = !*flag;
}

fn parse_or_default<R: DeserializeOwned + Default>(name: &str, contents: &str) -> R {
    match serde_json::from_str(contents) {
        Ok(v) => v,
        Err(e) => {
            // Might be left behind by an interrupted write. Treated the
            // same as an absent record.
            warn!("Record {name} holds illegal json: {e}");
            R::default()
        }
    }
}

/// The main realization of [StateStore]. Each record lives in its own JSON
/// file under the store directory, guarded by shared/exclusive file locks.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, std::io::Error> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;

        Ok(Self { dir })
    }

    /// Opens the store in the platform state directory ($XDG_STATE_HOME or
    /// $HOME/.local/state on Linux, %APPDATA% on Windows).
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(create_application_default_path()?)?)
    }

    fn open_rw(path: &Path) -> Result<File, std::io::Error> {
        File::options()
            .write(true)
            .create(true)
            .read(true)
            .truncate(false)
            .open(path)
    }

    fn read_record<R: DeserializeOwned + Default>(&self, name: &str) -> R {
        match Self::read_locked(&self.dir.join(name)) {
            Ok(Some(contents)) => parse_or_default(name, &contents),
            Ok(None) => R::default(),
            Err(e) => {
                warn!("Failed to read record {name}: {e}");
                R::default()
            }
        }
    }

    fn read_locked(path: &Path) -> Result<Option<String>, std::io::Error> {
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        file.lock_shared()?;
        let mut contents = String::new();
        let result = file.read_to_string(&mut contents);
        file.unlock()?;
        result?;
        Ok(Some(contents))
    }

    fn write_record<R: Serialize>(&self, name: &str, record: &R) -> Result<()> {
        let file = Self::open_rw(&self.dir.join(name))?;
        // Semi-safe acquire-release for a file
        file.lock_exclusive()?;
        let result = Self::overwrite(&file, record);
        file.unlock()?;
        result
    }

    /// Reads a record, applies `update` to it, and writes it back, all
    /// under one exclusive lock.
    fn update_record<R, T>(&self, name: &str, update: impl FnOnce(&mut R) -> T) -> Result<T>
    where
        R: DeserializeOwned + Serialize + Default,
    {
        let file = Self::open_rw(&self.dir.join(name))?;
        file.lock_exclusive()?;
        let result = Self::update_with_file(&file, name, update);
        file.unlock()?;
        result
    }

    fn update_with_file<R, T>(
        mut file: &File,
        name: &str,
        update: impl FnOnce(&mut R) -> T,
    ) -> Result<T>
    where
        R: DeserializeOwned + Serialize + Default,
    {
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        let mut record: R = if contents.is_empty() {
            // Brand new file, not a corrupt one.
            R::default()
        } else {
            parse_or_default(name, &contents)
        };
        let value = update(&mut record);
        Self::overwrite(file, &record)?;
        Ok(value)
    }

    fn overwrite<R: Serialize>(mut file: &File, record: &R) -> Result<()> {
        let mut buffer = Vec::<u8>::new();
        serde_json::to_writer(&mut buffer, record)?;

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&buffer)?;
        file.flush()?;
        Ok(())
    }
}

impl StateStore for FileStore {
    fn habits(&self) -> Vec<Habit> {
        self.read_record(HABITS_FILE)
    }

    fn set_habits(&self, habits: &[Habit]) -> Result<()> {
        self.write_record(HABITS_FILE, &habits)
    }

    fn completions(&self) -> CompletionRecord {
        self.read_record(COMPLETIONS_FILE)
    }

    fn set_completions(&self, record: &CompletionRecord) -> Result<()> {
        self.write_record(COMPLETIONS_FILE, record)
    }

    fn toggle_completion(&self, day_key: &str, habit_id: &str) -> Result<CompletionRecord> {
        self.update_record(COMPLETIONS_FILE, |record: &mut CompletionRecord| {
            flip_completion(record, day_key, habit_id);
            record.clone()
        })
    }

    fn is_onboarded(&self) -> bool {
        self.read_record::<Profile>(PROFILE_FILE).onboarded
    }

    fn set_onboarded(&self, value: bool) -> Result<()> {
        self.update_record(PROFILE_FILE, |profile: &mut Profile| {
            profile.onboarded = value;
        })
    }

    fn user_name(&self) -> String {
        self.read_record::<Profile>(PROFILE_FILE).user_name
    }

    fn set_user_name(&self, name: &str) -> Result<()> {
        self.update_record(PROFILE_FILE, |profile: &mut Profile| {
            profile.user_name = name.to_owned();
        })
    }

    fn reset(&self) -> Result<()> {
        for name in [HABITS_FILE, COMPLETIONS_FILE, PROFILE_FILE] {
            match std::fs::remove_file(self.dir.join(name)) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        debug!("Store reset to fresh state");
        Ok(())
    }
}

/// In-memory realization of [StateStore] with the same semantics as
/// [FileStore]. Useful for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    habits: Vec<Habit>,
    completions: CompletionRecord,
    profile: Profile,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().expect("state lock should not be poisoned")
    }
}

impl StateStore for MemoryStore {
    fn habits(&self) -> Vec<Habit> {
        self.state().habits.clone()
    }

    fn set_habits(&self, habits: &[Habit]) -> Result<()> {
        self.state().habits = habits.to_vec();
        Ok(())
    }

    fn completions(&self) -> CompletionRecord {
        self.state().completions.clone()
    }

    fn set_completions(&self, record: &CompletionRecord) -> Result<()> {
        self.state().completions = record.clone();
        Ok(())
    }

    fn toggle_completion(&self, day_key: &str, habit_id: &str) -> Result<CompletionRecord> {
        let mut state = self.state();
        flip_completion(&mut state.completions, day_key, habit_id);
        Ok(state.completions.clone())
    }

    fn is_onboarded(&self) -> bool {
        self.state().profile.onboarded
    }

    fn set_onboarded(&self, value: bool) -> Result<()> {
        self.state().profile.onboarded = value;
        Ok(())
    }

    fn user_name(&self) -> String {
        self.state().profile.user_name.clone()
    }

    fn set_user_name(&self, name: &str) -> Result<()> {
        self.state().profile.user_name = name.to_owned();
        Ok(())
    }

    fn reset(&self) -> Result<()> {
        *self.state() = MemoryState::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use crate::{
        store::entities::{CompletionRecord, Habit, is_completed},
        utils::logging::TEST_LOGGING,
    };

    use super::{FileStore, MemoryStore, MockStateStore, StateStore};

    fn sample_habits() -> Vec<Habit> {
        vec![
            Habit {
                id: "a".into(),
                name: "Run".into(),
                color_index: 0,
            },
            Habit {
                id: "b".into(),
                name: "Read".into(),
                color_index: 1,
            },
        ]
    }

    #[test]
    fn test_fresh_store_reads_defaults() -> Result<()> {
        let dir = tempdir()?;
        let store = FileStore::new(dir.path())?;

        assert!(store.habits().is_empty());
        assert!(store.completions().is_empty());
        assert!(!store.is_onboarded());
        assert_eq!(store.user_name(), "");
        Ok(())
    }

    #[test]
    fn test_habits_roundtrip_preserves_order() -> Result<()> {
        let dir = tempdir()?;
        let store = FileStore::new(dir.path())?;

        let habits = sample_habits();
        store.set_habits(&habits)?;
        assert_eq!(store.habits(), habits);
        Ok(())
    }

    #[test]
    fn test_toggle_is_an_involution() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let store = FileStore::new(dir.path())?;

        let once = store.toggle_completion("2024-03-01", "a")?;
        assert!(is_completed(&once, "2024-03-01", "a"));

        let twice = store.toggle_completion("2024-03-01", "a")?;
        assert!(!is_completed(&twice, "2024-03-01", "a"));
        // The day entry survives even though the flag is back to false.
        assert!(twice.contains_key("2024-03-01"));
        Ok(())
    }

    #[test]
    fn test_toggle_returns_current_snapshot() -> Result<()> {
        let dir = tempdir()?;
        let store = FileStore::new(dir.path())?;

        let returned = store.toggle_completion("2024-03-05", "b")?;
        assert_eq!(returned, store.completions());
        Ok(())
    }

    #[test]
    fn test_corrupt_records_read_as_empty() -> Result<()> {
        *TEST_LOGGING;
        let dir = tempdir()?;
        let store = FileStore::new(dir.path())?;

        for name in ["habits.json", "completions.json", "profile.json"] {
            std::fs::write(dir.path().join(name), "{not json")?;
        }

        assert!(store.habits().is_empty());
        assert!(store.completions().is_empty());
        assert!(!store.is_onboarded());
        assert_eq!(store.user_name(), "");
        Ok(())
    }

    #[test]
    fn test_toggle_on_corrupt_record_starts_over() -> Result<()> {
        let dir = tempdir()?;
        let store = FileStore::new(dir.path())?;

        std::fs::write(dir.path().join("completions.json"), "][")?;
        let record = store.toggle_completion("2024-03-01", "a")?;

        assert_eq!(record.len(), 1);
        assert!(is_completed(&record, "2024-03-01", "a"));
        Ok(())
    }

    #[test]
    fn test_profile_accessors() -> Result<()> {
        let dir = tempdir()?;
        let store = FileStore::new(dir.path())?;

        store.set_user_name("Ada")?;
        store.set_onboarded(true)?;

        assert_eq!(store.user_name(), "Ada");
        assert!(store.is_onboarded());
        Ok(())
    }

    #[test]
    fn test_reset_matches_fresh_install() -> Result<()> {
        let dir = tempdir()?;
        let store = FileStore::new(dir.path())?;

        store.set_habits(&sample_habits())?;
        store.toggle_completion("2024-03-01", "a")?;
        store.set_onboarded(true)?;
        store.set_user_name("Ada")?;

        store.reset()?;

        assert!(store.habits().is_empty());
        assert!(store.completions().is_empty());
        assert!(!store.is_onboarded());
        assert_eq!(store.user_name(), "");

        // Resetting twice is fine, the records are simply absent.
        store.reset()?;
        Ok(())
    }

    #[test]
    fn test_removed_habit_keeps_history() -> Result<()> {
        let dir = tempdir()?;
        let store = FileStore::new(dir.path())?;

        store.set_habits(&sample_habits())?;
        store.toggle_completion("2024-03-01", "a")?;

        // Remove habit "a"; its history stays orphaned in the record.
        let remaining: Vec<Habit> = sample_habits().drain(1..).collect();
        store.set_habits(&remaining)?;
        assert!(is_completed(&store.completions(), "2024-03-01", "a"));

        // A replacement habit gets a fresh id and no resurrected history.
        assert!(!is_completed(&store.completions(), "2024-03-01", "habit-123"));
        Ok(())
    }

    #[test]
    fn test_memory_store_involution_and_reset() -> Result<()> {
        let store = MemoryStore::new();

        store.set_habits(&sample_habits())?;
        let once = store.toggle_completion("2024-03-01", "a")?;
        assert!(is_completed(&once, "2024-03-01", "a"));
        let twice = store.toggle_completion("2024-03-01", "a")?;
        assert!(!is_completed(&twice, "2024-03-01", "a"));

        store.reset()?;
        assert!(store.habits().is_empty());
        assert!(store.completions().is_empty());
        Ok(())
    }

    #[test]
    fn test_store_is_usable_behind_pointers_and_mocks() {
        // Presentation layers hold the store behind a pointer type and swap
        // a mock in for tests; both go through the blanket impl.
        let boxed: Box<dyn StateStore> = Box::new(MemoryStore::new());
        assert!(boxed.habits().is_empty());

        let mut mock = MockStateStore::new();
        mock.expect_is_onboarded().return_const(false);
        mock.expect_completions()
            .returning(CompletionRecord::default);
        let mock = Box::new(mock);
        assert!(!mock.is_onboarded());
        assert!(mock.completions().is_empty());
    }
}
