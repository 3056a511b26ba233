use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{Favorite, Note, ReadingProgress};

pub const FORMAT_VERSION: u32 = 1;

/// Study streak values carried alongside the records. They live in the
/// preference store, so callers pass them in and apply them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreakState {
    pub streak: i32,
    pub longest_streak: i32,
    pub last_study_date: i64,
}

#[derive(Deserialize)]
struct VersionHeader {
    version: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupSnapshot {
    pub version: u32,
    pub export_date: i64,
    pub progress: Vec<ReadingProgress>,
    pub notes: Vec<Note>,
    pub favorites: Vec<Favorite>,
    pub streak: i32,
    pub longest_streak: i32,
    pub last_study_date: i64,
}

impl BackupSnapshot {
    pub fn new(
        progress: Vec<ReadingProgress>,
        notes: Vec<Note>,
        favorites: Vec<Favorite>,
        streak: StreakState,
    ) -> Self {
        Self {
            version: FORMAT_VERSION,
            export_date: chrono::Utc::now().timestamp_millis(),
            progress,
            notes,
            favorites,
            streak: streak.streak,
            longest_streak: streak.longest_streak,
            last_study_date: streak.last_study_date,
        }
    }

    pub fn streak_state(&self) -> StreakState {
        StreakState {
            streak: self.streak,
            longest_streak: self.longest_streak,
            last_study_date: self.last_study_date,
        }
    }

    pub fn to_pretty_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Parses a document and rejects versions this build cannot replay.
    ///
    /// The version is checked before the rest of the layout, so a newer
    /// document reports its version rather than whichever field changed.
    /// Notes must carry their stored id: id 0 would be assigned a fresh id on
    /// every restore.
    pub fn from_json(json: &str) -> Result<Self> {
        let header: VersionHeader = serde_json::from_str(json)?;
        if header.version != FORMAT_VERSION {
            return Err(AppError::UnsupportedVersion {
                found: header.version,
                expected: FORMAT_VERSION,
            });
        }

        let snapshot: BackupSnapshot = serde_json::from_str(json)?;
        if let Some(note) = snapshot.notes.iter().find(|n| n.id == 0) {
            return Err(AppError::InvalidInput(format!(
                "backup note for {} {}:{} has no id",
                note.book_name, note.chapter, note.verse
            )));
        }
        Ok(snapshot)
    }

    pub fn from_reader<R: Read>(mut source: R) -> Result<Self> {
        let mut json = String::new();
        source.read_to_string(&mut json)?;
        Self::from_json(&json)
    }

    pub fn summary(&self) -> String {
        format!(
            "version {}, {} progress, {} notes, {} favorites, streak {} (longest {})",
            self.version,
            self.progress.len(),
            self.notes.len(),
            self.favorites.len(),
            self.streak,
            self.longest_streak
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = r#"{
  "version": 1,
  "exportDate": 1709625429000,
  "progress": [
    { "chapterId": "Genesis-1", "bookName": "Genesis", "chapter": 1, "isCompleted": true, "completedAt": 1709625000000 },
    { "chapterId": "Genesis-2", "bookName": "Genesis", "chapter": 2, "isCompleted": false, "completedAt": null }
  ],
  "notes": [
    { "id": 7, "bookName": "Genesis", "chapter": 1, "verse": 1, "content": "In the beginning", "timestamp": 1709625100000 }
  ],
  "favorites": [
    { "verseId": "Genesis-1-3", "bookName": "Genesis", "chapter": 1, "verseNumber": 3, "verseText": "Let there be light", "savedAt": 1709625200000 }
  ],
  "streak": 4,
  "longestStreak": 9,
  "lastStudyDate": 1709625300000
}"#;

    #[test]
    fn parses_documented_layout() {
        let snapshot = BackupSnapshot::from_json(DOCUMENT).unwrap();
        assert_eq!(snapshot.version, 1);
        assert_eq!(snapshot.export_date, 1_709_625_429_000);
        assert_eq!(snapshot.progress[1].completed_at, None);
        assert_eq!(snapshot.notes[0].id, 7);
        assert_eq!(snapshot.favorites[0].verse_number, 3);
        assert_eq!(
            snapshot.streak_state(),
            StreakState {
                streak: 4,
                longest_streak: 9,
                last_study_date: 1_709_625_300_000,
            }
        );
    }

    #[test]
    fn writes_camel_case_keys_and_null_completion() {
        let snapshot = BackupSnapshot::new(
            vec![ReadingProgress::visited("Ruth", 1)],
            vec![],
            vec![],
            StreakState::default(),
        );
        let json = String::from_utf8(snapshot.to_pretty_json().unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["version"], 1);
        assert!(value["exportDate"].is_i64());
        assert_eq!(value["progress"][0]["chapterId"], "Ruth-1");
        assert!(value["progress"][0]["completedAt"].is_null());
        assert_eq!(value["longestStreak"], 0);
        // pretty-printed
        assert!(json.contains("\n  \"version\": 1"));
    }

    #[test]
    fn large_timestamps_survive() {
        let mut snapshot = BackupSnapshot::from_json(DOCUMENT).unwrap();
        snapshot.last_study_date = i64::MAX;
        let bytes = snapshot.to_pretty_json().unwrap();
        let parsed = BackupSnapshot::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(parsed.last_study_date, i64::MAX);
    }

    #[test]
    fn missing_version_is_a_parse_error() {
        let doc = DOCUMENT.replace("\"version\": 1,", "");
        let err = BackupSnapshot::from_json(&doc).unwrap_err();
        assert!(matches!(err, AppError::Json(_)));
    }

    #[test]
    fn non_numeric_version_is_a_parse_error() {
        let doc = DOCUMENT.replace("\"version\": 1,", "\"version\": \"one\",");
        let err = BackupSnapshot::from_json(&doc).unwrap_err();
        assert!(matches!(err, AppError::Json(_)));
    }

    #[test]
    fn other_versions_are_rejected() {
        let doc = DOCUMENT.replace("\"version\": 1,", "\"version\": 2,");
        let err = BackupSnapshot::from_json(&doc).unwrap_err();
        assert!(matches!(
            err,
            AppError::UnsupportedVersion {
                found: 2,
                expected: 1
            }
        ));
    }

    #[test]
    fn newer_layout_reports_its_version() {
        let doc = r#"{
  "version": 2,
  "exportedAt": "2024-03-05T08:07:09Z",
  "collections": { "progress": [], "notes": [], "favorites": [], "quizzes": [] },
  "streakState": { "current": 1, "longest": 1, "lastStudyDate": 0 }
}"#;
        let err = BackupSnapshot::from_json(doc).unwrap_err();
        assert!(matches!(
            err,
            AppError::UnsupportedVersion {
                found: 2,
                expected: 1
            }
        ));
    }

    #[test]
    fn note_without_id_is_rejected() {
        let doc = DOCUMENT.replace("\"id\": 7,", "\"id\": 0,");
        assert!(matches!(
            BackupSnapshot::from_json(&doc),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn missing_collection_is_a_parse_error() {
        let value: serde_json::Value = serde_json::from_str(DOCUMENT).unwrap();
        let mut object = value.as_object().unwrap().clone();
        object.remove("favorites");
        let doc = serde_json::to_string(&object).unwrap();
        assert!(matches!(
            BackupSnapshot::from_json(&doc),
            Err(AppError::Json(_))
        ));
    }
}
