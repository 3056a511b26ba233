use async_trait::async_trait;

use crate::db::Repository;
use crate::error::Result;
use crate::models::{Favorite, Note, ReadingProgress};

/// The slice of storage the backup engine reads from and replays into.
#[async_trait]
pub trait BackupStore: Send + Sync {
    async fn all_progress(&self) -> Result<Vec<ReadingProgress>>;
    async fn all_notes(&self) -> Result<Vec<Note>>;
    async fn all_favorites(&self) -> Result<Vec<Favorite>>;

    async fn upsert_progress(&self, progress: ReadingProgress) -> Result<()>;
    async fn insert_note(&self, note: Note) -> Result<()>;
    async fn insert_favorite(&self, favorite: Favorite) -> Result<()>;
}

#[async_trait]
impl BackupStore for Repository {
    async fn all_progress(&self) -> Result<Vec<ReadingProgress>> {
        self.get_all_progress().await
    }

    async fn all_notes(&self) -> Result<Vec<Note>> {
        self.get_all_notes().await
    }

    async fn all_favorites(&self) -> Result<Vec<Favorite>> {
        self.get_all_favorites().await
    }

    async fn upsert_progress(&self, progress: ReadingProgress) -> Result<()> {
        Repository::upsert_progress(self, progress).await
    }

    async fn insert_note(&self, note: Note) -> Result<()> {
        Repository::insert_note(self, note).await.map(|_| ())
    }

    async fn insert_favorite(&self, favorite: Favorite) -> Result<()> {
        Repository::insert_favorite(self, favorite).await
    }
}
