use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;

use crate::backup::{BackupManager, BackupSnapshot, StreakState};
use crate::config::Config;
use crate::db::Repository;
use crate::error::{AppError, Result};
use crate::models::{book_info, ReadingProgress};
use crate::prefs::UserPreferences;
use crate::reminder::{next_chapter, LogNotifier, NextChapter, StudyReminderWorker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupKind {
    Export,
    Restore,
}

// Message for a finished background backup job
#[derive(Debug)]
pub enum BackupOutcome {
    Exported(PathBuf),
    Restored(BackupSnapshot),
    /// `error` is the engine's error as returned, so a restore that stopped
    /// partway is still an [`AppError::PartialRestore`].
    Failed { kind: BackupKind, error: AppError },
}

pub struct Status {
    pub completed_chapters: usize,
    pub notes: usize,
    pub favorites: usize,
    pub streak: StreakState,
    pub next: NextChapter,
}

pub struct App {
    // Services
    pub repository: Repository,
    pub preferences: Arc<UserPreferences>,
    backup: BackupManager<Repository>,
    backup_dir: PathBuf,

    // Async state
    pub backup_in_flight: bool,
    backup_rx: mpsc::Receiver<BackupOutcome>,
    backup_tx: mpsc::Sender<BackupOutcome>,
}

impl App {
    pub async fn new(config: &Config) -> Result<Self> {
        let repository = Repository::new(&config.db_path).await?;
        let preferences = Arc::new(UserPreferences::load(&config.preferences_path)?);
        Ok(Self::with_parts(
            repository,
            preferences,
            PathBuf::from(&config.backup_dir),
        ))
    }

    pub fn with_parts(
        repository: Repository,
        preferences: Arc<UserPreferences>,
        backup_dir: PathBuf,
    ) -> Self {
        let backup = BackupManager::new(Arc::new(repository.clone()));
        let (backup_tx, backup_rx) = mpsc::channel(1);

        Self {
            repository,
            preferences,
            backup,
            backup_dir,
            backup_in_flight: false,
            backup_rx,
            backup_tx,
        }
    }

    /// Starts an export on a background task. Without a target the file is
    /// created in the backup directory under a generated name.
    ///
    /// Returns false when another backup job is still running.
    pub async fn start_export(&mut self, target: Option<PathBuf>) -> bool {
        if self.backup_in_flight {
            tracing::warn!("Backup already in progress, ignoring export request");
            return false;
        }

        let streak = self.preferences.streak_state().await;
        let manager = self.backup.clone();
        let backup_dir = self.backup_dir.clone();
        let tx = self.backup_tx.clone();
        self.backup_in_flight = true;

        tokio::spawn(async move {
            let result = match target {
                Some(path) => manager.export_to_file(&path, streak).await.map(|_| path),
                None => manager.export_to_dir(&backup_dir, streak).await,
            };

            let outcome = match result {
                Ok(path) => BackupOutcome::Exported(path),
                Err(error) => BackupOutcome::Failed {
                    kind: BackupKind::Export,
                    error,
                },
            };
            let _ = tx.send(outcome).await;
        });

        true
    }

    /// Starts a restore on a background task.
    ///
    /// Returns false when another backup job is still running.
    pub fn start_restore(&mut self, path: PathBuf) -> bool {
        if self.backup_in_flight {
            tracing::warn!("Backup already in progress, ignoring restore request");
            return false;
        }

        let manager = self.backup.clone();
        let tx = self.backup_tx.clone();
        self.backup_in_flight = true;

        tokio::spawn(async move {
            let outcome = match manager.restore_from_file(&path).await {
                Ok(snapshot) => BackupOutcome::Restored(snapshot),
                Err(error) => BackupOutcome::Failed {
                    kind: BackupKind::Restore,
                    error,
                },
            };
            let _ = tx.send(outcome).await;
        });

        true
    }

    /// Poll for a finished backup job (non-blocking)
    pub async fn poll_backup_result(&mut self) -> Result<Option<BackupOutcome>> {
        match self.backup_rx.try_recv() {
            Ok(outcome) => self.finish_backup(outcome).await.map(Some),
            Err(_) => Ok(None),
        }
    }

    /// Wait for the running backup job, if any.
    pub async fn wait_backup_result(&mut self) -> Result<Option<BackupOutcome>> {
        if !self.backup_in_flight {
            return Ok(None);
        }
        match self.backup_rx.recv().await {
            Some(outcome) => self.finish_backup(outcome).await.map(Some),
            None => Ok(None),
        }
    }

    async fn finish_backup(&mut self, outcome: BackupOutcome) -> Result<BackupOutcome> {
        self.backup_in_flight = false;

        match &outcome {
            BackupOutcome::Exported(path) => {
                tracing::info!("Exported backup to {:?}", path);
            }
            BackupOutcome::Restored(snapshot) => {
                // The engine leaves preferences alone; streak values are ours to apply
                self.preferences.apply_streak(snapshot.streak_state()).await?;
                tracing::info!("Restored backup: {}", snapshot.summary());
            }
            BackupOutcome::Failed { kind, error } => {
                tracing::error!("Backup {:?} failed: {}", kind, error);
            }
        }

        Ok(outcome)
    }

    /// Marks a chapter read, moves the study position there and counts the
    /// day towards the streak.
    pub async fn mark_chapter_complete(&self, book: &str, chapter: u32) -> Result<StreakState> {
        let info = book_info(book)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown book: {}", book)))?;
        if chapter == 0 || chapter > info.chapters {
            return Err(AppError::InvalidInput(format!(
                "{} has {} chapters, got {}",
                info.name, info.chapters, chapter
            )));
        }

        let now = Utc::now().timestamp_millis();
        self.repository
            .upsert_progress(ReadingProgress::completed(info.name, chapter as i32, now))
            .await?;
        self.preferences.set_current_position(info.name, chapter).await?;
        self.preferences.mark_study_complete(now).await
    }

    pub async fn status(&self) -> Result<Status> {
        let progress = self.repository.get_all_progress().await?;
        let notes = self.repository.get_all_notes().await?;
        let favorites = self.repository.get_all_favorites().await?;
        let prefs = self.preferences.get().await;

        let current = prefs
            .current_book
            .as_deref()
            .map(|book| (book, prefs.current_chapter));

        Ok(Status {
            completed_chapters: progress.iter().filter(|p| p.is_completed).count(),
            notes: notes.len(),
            favorites: favorites.len(),
            streak: prefs.streak_state(),
            next: next_chapter(&progress, current),
        })
    }

    pub fn reminder_worker(&self) -> StudyReminderWorker<LogNotifier> {
        StudyReminderWorker::new(
            self.repository.clone(),
            Arc::clone(&self.preferences),
            LogNotifier,
        )
    }
}
