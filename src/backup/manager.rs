use std::fmt::Display;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};

use crate::error::{AppError, Result};

use super::snapshot::{BackupSnapshot, StreakState};
use super::store::BackupStore;

const FILENAME_PREFIX: &str = "path_backup_";
const FILENAME_TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Suggested export filename for the current local time.
pub fn backup_filename() -> String {
    backup_filename_at(&Local::now())
}

pub fn backup_filename_at<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{}{}.json", FILENAME_PREFIX, at.format(FILENAME_TIME_FORMAT))
}

/// Reads and validates a backup document without touching storage.
pub async fn read_snapshot<R>(source: R) -> Result<BackupSnapshot>
where
    R: Read + Send + 'static,
{
    tokio::task::spawn_blocking(move || BackupSnapshot::from_reader(source)).await?
}

#[derive(Debug, Default)]
struct ReplayCounts {
    progress: usize,
    notes: usize,
    favorites: usize,
}

/// Exports storage to a JSON document and replays documents back into it.
///
/// Operations are not serialized against each other; callers must avoid
/// running an export and a restore (or two restores) at the same time.
pub struct BackupManager<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for BackupManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> BackupManager<S>
where
    S: BackupStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Writes a full snapshot to `sink`, then flushes and closes it.
    ///
    /// Any error means the export failed, whatever bytes reached the sink.
    pub async fn create_backup<W>(&self, sink: W, streak: StreakState) -> Result<()>
    where
        W: Write + Send + 'static,
    {
        let progress = self.store.all_progress().await?;
        let notes = self.store.all_notes().await?;
        let favorites = self.store.all_favorites().await?;

        let snapshot = BackupSnapshot::new(progress, notes, favorites, streak);
        let summary = snapshot.summary();

        tokio::task::spawn_blocking(move || write_snapshot(sink, &snapshot)).await??;

        tracing::info!("Backup written: {}", summary);
        Ok(())
    }

    /// Creates a file named by [`backup_filename`] in `dir` and exports into it.
    pub async fn export_to_dir(&self, dir: &Path, streak: StreakState) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(backup_filename());
        self.export_to_file(&path, streak).await?;
        Ok(path)
    }

    /// Exports into `path`. A file left behind by a failed export is removed.
    pub async fn export_to_file(&self, path: &Path, streak: StreakState) -> Result<()> {
        let file = tokio::fs::File::create(path).await?.into_std().await;
        if let Err(e) = self.create_backup(file, streak).await {
            if let Err(remove_err) = tokio::fs::remove_file(path).await {
                tracing::warn!("Failed to remove incomplete backup {:?}: {}", path, remove_err);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Parses a document from `source` and replays it into storage.
    ///
    /// Nothing is written unless the whole document parses and validates
    /// (see [`BackupSnapshot::from_json`]). Replay runs
    /// progress, then notes, then favorites, each upserted by key, with no
    /// enclosing transaction: a failing write stops the replay and is
    /// returned as [`AppError::PartialRestore`] with everything before it
    /// left committed. Streak values come back in the returned snapshot and
    /// are not persisted here.
    pub async fn restore_backup<R>(&self, source: R) -> Result<BackupSnapshot>
    where
        R: Read + Send + 'static,
    {
        let snapshot = read_snapshot(source).await?;

        let mut counts = ReplayCounts::default();
        if let Err(e) = self.replay(&snapshot, &mut counts).await {
            tracing::warn!(
                "Restore aborted after {} progress, {} notes, {} favorites: {}",
                counts.progress,
                counts.notes,
                counts.favorites,
                e
            );
            return Err(AppError::PartialRestore {
                progress: counts.progress,
                notes: counts.notes,
                favorites: counts.favorites,
                source: Box::new(e),
            });
        }

        tracing::info!("Backup restored: {}", snapshot.summary());
        Ok(snapshot)
    }

    pub async fn restore_from_file(&self, path: &Path) -> Result<BackupSnapshot> {
        let file = tokio::fs::File::open(path).await?.into_std().await;
        self.restore_backup(file).await
    }

    async fn replay(&self, snapshot: &BackupSnapshot, counts: &mut ReplayCounts) -> Result<()> {
        for progress in &snapshot.progress {
            self.store.upsert_progress(progress.clone()).await?;
            counts.progress += 1;
        }
        for note in &snapshot.notes {
            self.store.insert_note(note.clone()).await?;
            counts.notes += 1;
        }
        for favorite in &snapshot.favorites {
            self.store.insert_favorite(favorite.clone()).await?;
            counts.favorites += 1;
        }
        Ok(())
    }
}

fn write_snapshot<W: Write>(mut sink: W, snapshot: &BackupSnapshot) -> Result<()> {
    let json = snapshot.to_pretty_json()?;
    sink.write_all(&json)?;
    sink.flush()?;
    drop(sink);
    Ok(())
}
