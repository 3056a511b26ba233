use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::backup::StreakState;
use crate::error::{AppError, Result};
use crate::models::DEFAULT_TRANSLATION;

const MILLIS_PER_DAY: i64 = 1000 * 60 * 60 * 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceData {
    pub translation: String,
    pub daily_pace: u32,
    pub streak: i32,
    pub longest_streak: i32,
    pub last_study_date: i64,

    pub reminders_enabled: bool,
    pub reminder_start_hour: u32,
    pub reminder_end_hour: u32,

    pub current_book: Option<String>,
    pub current_chapter: u32,

    pub verse_of_the_day_text: Option<String>,
    pub verse_of_the_day_ref: Option<String>,
    /// Days since the Unix epoch.
    pub verse_of_the_day_date: i64,
}

impl Default for PreferenceData {
    fn default() -> Self {
        Self {
            translation: DEFAULT_TRANSLATION.to_string(),
            daily_pace: 1,
            streak: 0,
            longest_streak: 0,
            last_study_date: 0,
            reminders_enabled: false,
            reminder_start_hour: 9,
            reminder_end_hour: 21,
            current_book: None,
            current_chapter: 1,
            verse_of_the_day_text: None,
            verse_of_the_day_ref: None,
            verse_of_the_day_date: 0,
        }
    }
}

impl PreferenceData {
    pub fn streak_state(&self) -> StreakState {
        StreakState {
            streak: self.streak,
            longest_streak: self.longest_streak,
            last_study_date: self.last_study_date,
        }
    }
}

/// Settings file with atomic edits.
///
/// Each edit is applied to a copy, written to a sibling temp file and renamed
/// over the original. Memory only changes once the rename succeeded.
pub struct UserPreferences {
    path: PathBuf,
    data: Mutex<PreferenceData>,
}

impl UserPreferences {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            toml::from_str(&content)?
        } else {
            PreferenceData::default()
        };

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn get(&self) -> PreferenceData {
        self.data.lock().await.clone()
    }

    pub async fn streak_state(&self) -> StreakState {
        self.data.lock().await.streak_state()
    }

    async fn edit<F>(&self, f: F) -> Result<PreferenceData>
    where
        F: FnOnce(&mut PreferenceData),
    {
        // Held across the write so edits land on disk in order
        let mut guard = self.data.lock().await;
        let mut updated = guard.clone();
        f(&mut updated);

        let path = self.path.clone();
        let content = toml::to_string_pretty(&updated)?;
        tokio::task::spawn_blocking(move || persist(&path, &content)).await??;

        *guard = updated.clone();
        Ok(updated)
    }

    pub async fn update_streak(&self, streak: i32) -> Result<()> {
        self.edit(|p| {
            p.streak = streak;
            p.longest_streak = p.longest_streak.max(streak);
        })
        .await?;
        Ok(())
    }

    /// Records a study session at `now_ms`.
    ///
    /// Same calendar day (UTC day number) keeps the streak, the following day
    /// extends it, any longer gap restarts it at 1.
    pub async fn mark_study_complete(&self, now_ms: i64) -> Result<StreakState> {
        let updated = self
            .edit(|p| {
                let today = now_ms / MILLIS_PER_DAY;
                let last_day = p.last_study_date / MILLIS_PER_DAY;

                let streak = if p.last_study_date > 0 && today == last_day {
                    p.streak.max(1)
                } else if p.last_study_date > 0 && today == last_day + 1 {
                    p.streak + 1
                } else {
                    1
                };

                p.streak = streak;
                p.longest_streak = p.longest_streak.max(streak);
                p.last_study_date = now_ms;
            })
            .await?;
        Ok(updated.streak_state())
    }

    /// Writes streak values recovered from a backup.
    pub async fn apply_streak(&self, streak: StreakState) -> Result<()> {
        self.edit(|p| {
            p.streak = streak.streak;
            p.longest_streak = streak.longest_streak.max(streak.streak);
            p.last_study_date = streak.last_study_date;
        })
        .await?;
        Ok(())
    }

    pub async fn set_reminders_enabled(&self, enabled: bool) -> Result<()> {
        self.edit(|p| p.reminders_enabled = enabled).await?;
        Ok(())
    }

    pub async fn set_reminder_window(&self, start_hour: u32, end_hour: u32) -> Result<()> {
        if start_hour >= end_hour || end_hour > 24 {
            return Err(AppError::InvalidInput(format!(
                "reminder window {}..{} is not a valid range of hours",
                start_hour, end_hour
            )));
        }
        self.edit(|p| {
            p.reminder_start_hour = start_hour;
            p.reminder_end_hour = end_hour;
        })
        .await?;
        Ok(())
    }

    pub async fn set_current_position(&self, book: &str, chapter: u32) -> Result<()> {
        let book = book.to_string();
        self.edit(|p| {
            p.current_book = Some(book);
            p.current_chapter = chapter;
        })
        .await?;
        Ok(())
    }

    pub async fn save_verse_of_the_day(
        &self,
        text: &str,
        reference: &str,
        day: Option<i64>,
    ) -> Result<()> {
        let text = text.to_string();
        let reference = reference.to_string();
        self.edit(|p| {
            p.verse_of_the_day_text = Some(text);
            p.verse_of_the_day_ref = Some(reference);
            if let Some(day) = day {
                p.verse_of_the_day_date = day;
            }
        })
        .await?;
        Ok(())
    }
}

fn persist(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = MILLIS_PER_DAY;

    fn prefs_in(dir: &tempfile::TempDir) -> UserPreferences {
        UserPreferences::load(dir.path().join("preferences.toml")).unwrap()
    }

    #[tokio::test]
    async fn defaults_when_file_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = prefs_in(&dir);
        let data = prefs.get().await;
        assert_eq!(data, PreferenceData::default());
        assert_eq!(data.translation, "WEB");
        assert_eq!((data.reminder_start_hour, data.reminder_end_hour), (9, 21));
        assert!(!prefs.path().exists());
    }

    #[tokio::test]
    async fn edits_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = prefs_in(&dir);
        prefs.set_current_position("Psalms", 23).await.unwrap();
        prefs.set_reminders_enabled(true).await.unwrap();
        prefs
            .save_verse_of_the_day("Jesus wept.", "John 11:35", Some(19_800))
            .await
            .unwrap();

        let reloaded = prefs_in(&dir).get().await;
        assert_eq!(reloaded.current_book.as_deref(), Some("Psalms"));
        assert_eq!(reloaded.current_chapter, 23);
        assert!(reloaded.reminders_enabled);
        assert_eq!(reloaded.verse_of_the_day_date, 19_800);
        assert!(!dir.path().join("preferences.toml.tmp").exists());
    }

    #[tokio::test]
    async fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("preferences.toml"), "streak = 5\n").unwrap();
        let data = prefs_in(&dir).get().await;
        assert_eq!(data.streak, 5);
        assert_eq!(data.daily_pace, 1);
    }

    #[tokio::test]
    async fn streak_rules() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = prefs_in(&dir);
        let start = 20_000 * DAY + 3_600_000;

        assert_eq!(prefs.mark_study_complete(start).await.unwrap().streak, 1);
        // same day
        assert_eq!(prefs.mark_study_complete(start + 60_000).await.unwrap().streak, 1);
        // next day
        assert_eq!(prefs.mark_study_complete(start + DAY).await.unwrap().streak, 2);
        assert_eq!(prefs.mark_study_complete(start + 2 * DAY).await.unwrap().streak, 3);
        // gap
        let state = prefs.mark_study_complete(start + 5 * DAY).await.unwrap();
        assert_eq!(state.streak, 1);
        assert_eq!(state.longest_streak, 3);
        assert_eq!(state.last_study_date, start + 5 * DAY);
    }

    #[tokio::test]
    async fn apply_streak_overwrites_values() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = prefs_in(&dir);
        let restored = StreakState {
            streak: 4,
            longest_streak: 10,
            last_study_date: 123,
        };
        prefs.apply_streak(restored).await.unwrap();
        assert_eq!(prefs.streak_state().await, restored);
        assert_eq!(prefs_in(&dir).streak_state().await, restored);
    }

    #[tokio::test]
    async fn invalid_reminder_window_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = prefs_in(&dir);
        assert!(matches!(
            prefs.set_reminder_window(21, 9).await,
            Err(AppError::InvalidInput(_))
        ));
        tokio_test::assert_ok!(prefs.set_reminder_window(7, 10).await);
        let data = prefs.get().await;
        assert_eq!((data.reminder_start_hour, data.reminder_end_hour), (7, 10));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_edits_all_reach_disk() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = std::sync::Arc::new(prefs_in(&dir));

        let tasks: Vec<_> = (1..=8)
            .map(|chapter| {
                let prefs = std::sync::Arc::clone(&prefs);
                tokio::spawn(async move {
                    prefs.set_current_position("Acts", chapter).await.unwrap();
                    prefs.update_streak(chapter as i32).await.unwrap();
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let in_memory = prefs.get().await;
        assert_eq!(in_memory.longest_streak, 8);
        assert_eq!(prefs_in(&dir).get().await, in_memory);
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        // parent is a file, so the directory cannot be created
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let prefs = UserPreferences::load(blocker.join("preferences.toml")).unwrap();

        assert!(matches!(
            prefs.set_reminders_enabled(true).await,
            Err(AppError::Io(_))
        ));
        assert!(!prefs.get().await.reminders_enabled);
    }

    #[tokio::test]
    async fn update_streak_raises_longest() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = prefs_in(&dir);
        prefs.update_streak(6).await.unwrap();
        prefs.update_streak(2).await.unwrap();
        let state = prefs.streak_state().await;
        assert_eq!((state.streak, state.longest_streak), (2, 6));
    }
}
