use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, Timelike};

use crate::db::Repository;
use crate::error::Result;
use crate::prefs::UserPreferences;

use super::resolver::{next_chapter, NextChapter};
use super::schedule::{delay_until_next_day, delay_until_reminder, ReminderWindow};

/// Delivers a user-visible study reminder.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_study_reminder(&self, book: &str, chapter: u32) -> Result<()>;
}

/// Prints the reminder to the terminal.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_study_reminder(&self, book: &str, chapter: u32) -> Result<()> {
        tracing::info!("Sending study reminder for {} {}", book, chapter);
        println!("Time for today's reading: {} {}", book, chapter);
        Ok(())
    }
}

pub struct StudyReminderWorker<N> {
    repository: Repository,
    preferences: Arc<UserPreferences>,
    notifier: N,
}

impl<N: Notifier> StudyReminderWorker<N> {
    pub fn new(repository: Repository, preferences: Arc<UserPreferences>, notifier: N) -> Self {
        Self {
            repository,
            preferences,
            notifier,
        }
    }

    /// Resolves the next unread chapter and sends one reminder for it.
    pub async fn run(&self) -> Result<NextChapter> {
        let prefs = self.preferences.get().await;
        let progress = self.repository.get_all_progress().await?;

        let current = prefs
            .current_book
            .as_deref()
            .map(|book| (book, prefs.current_chapter));
        let next = next_chapter(&progress, current);

        self.notifier
            .send_study_reminder(next.book, next.chapter)
            .await?;
        Ok(next)
    }

    /// Sends a reminder once a day inside the configured window while
    /// reminders are enabled. Only returns on an invalid window.
    pub async fn run_forever(self) -> Result<()> {
        let mut delay = self.delay_from_now().await?;
        loop {
            tracing::info!("Next study reminder in {} minutes", delay.as_secs() / 60);
            tokio::time::sleep(delay).await;

            let prefs = self.preferences.get().await;
            if !prefs.reminders_enabled {
                tracing::debug!("Reminders disabled, skipping");
                delay = self.delay_from_now().await?;
                continue;
            }

            match self.run().await {
                Ok(_) => {
                    let window =
                        ReminderWindow::new(prefs.reminder_start_hour, prefs.reminder_end_hour)?;
                    delay = delay_until_next_day(window, &mut rand::thread_rng());
                }
                Err(e) => {
                    tracing::error!("Failed to send study reminder: {}", e);
                    delay = self.delay_from_now().await?;
                }
            }
        }
    }

    async fn delay_from_now(&self) -> Result<Duration> {
        let prefs = self.preferences.get().await;
        let window = ReminderWindow::new(prefs.reminder_start_hour, prefs.reminder_end_hour)?;
        Ok(delay_until_reminder(
            Local::now().hour(),
            window,
            &mut rand::thread_rng(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::AppError;
    use crate::models::ReadingProgress;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, u32)>>,
    }

    #[async_trait]
    impl Notifier for Arc<RecordingNotifier> {
        async fn send_study_reminder(&self, book: &str, chapter: u32) -> Result<()> {
            self.sent.lock().unwrap().push((book.to_string(), chapter));
            Ok(())
        }
    }

    struct FailingNotifier;

    #[async_trait]
    impl Notifier for FailingNotifier {
        async fn send_study_reminder(&self, _book: &str, _chapter: u32) -> Result<()> {
            Err(AppError::Notify("channel unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn reminds_about_next_unread_chapter_from_current_position() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Arc::new(UserPreferences::load(dir.path().join("prefs.toml")).unwrap());
        prefs.set_current_position("Mark", 2).await.unwrap();

        let repo = Repository::in_memory().await.unwrap();
        repo.upsert_progress(ReadingProgress::completed("Mark", 2, 1))
            .await
            .unwrap();

        let notifier = Arc::new(RecordingNotifier::default());
        let worker = StudyReminderWorker::new(repo, prefs, Arc::clone(&notifier));
        let next = worker.run().await.unwrap();

        assert_eq!((next.book, next.chapter), ("Mark", 3));
        assert_eq!(
            notifier.sent.lock().unwrap().clone(),
            vec![("Mark".to_string(), 3)]
        );
    }

    #[tokio::test]
    async fn notifier_failure_is_returned() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = Arc::new(UserPreferences::load(dir.path().join("prefs.toml")).unwrap());
        let repo = Repository::in_memory().await.unwrap();

        let worker = StudyReminderWorker::new(repo, prefs, FailingNotifier);
        assert!(matches!(worker.run().await, Err(AppError::Notify(_))));
    }
}
