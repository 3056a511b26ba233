use std::future::Future;

use futures::stream::{self, Stream};
use rusqlite::{params, OptionalExtension, Row};
use tokio::sync::broadcast;
use tokio_rusqlite::Connection;

use crate::error::Result;
use crate::models::{BibleVerse, Favorite, Note, QuizResult, QuizStats, ReadingProgress};

use super::schema::SCHEMA;

/// Which table a committed write touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Progress,
    Notes,
    Favorites,
    Quizzes,
    Verses,
}

const CHANGE_BUFFER: usize = 64;

#[derive(Clone)]
pub struct Repository {
    conn: Connection,
    changes: broadcast::Sender<Collection>,
}

impl Repository {
    pub async fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).await?;
        Self::with_connection(conn).await
    }

    pub async fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::with_connection(conn).await
    }

    async fn with_connection(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Ok(Self { conn, changes })
    }

    fn notify(&self, collection: Collection) {
        // No subscribers is not an error
        let _ = self.changes.send(collection);
    }

    /// Yields `fetch()` once immediately, then again after every write to
    /// `collection`. A lagging subscriber just re-queries.
    fn watch<T, F, Fut>(
        &self,
        collection: Collection,
        fetch: F,
    ) -> impl Stream<Item = Result<T>> + Send + 'static
    where
        T: Send + 'static,
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let rx = self.changes.subscribe();
        stream::unfold((rx, fetch, true), move |(mut rx, fetch, first)| async move {
            if !first {
                loop {
                    match rx.recv().await {
                        Ok(changed) if changed == collection => break,
                        Ok(_) => continue,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::debug!("Change feed lagged by {} events", skipped);
                            break;
                        }
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
            }
            let item = fetch().await;
            Some((item, (rx, fetch, false)))
        })
    }

    // Progress operations

    pub async fn get_all_progress(&self) -> Result<Vec<ReadingProgress>> {
        let progress = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT chapter_id, book_name, chapter, is_completed, completed_at FROM progress",
                )?;
                let progress = stmt
                    .query_map([], progress_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(progress)
            })
            .await?;
        Ok(progress)
    }

    pub fn watch_progress(
        &self,
    ) -> impl Stream<Item = Result<Vec<ReadingProgress>>> + Send + 'static {
        let repo = self.clone();
        self.watch(Collection::Progress, move || {
            let repo = repo.clone();
            async move { repo.get_all_progress().await }
        })
    }

    pub async fn get_progress(&self, chapter_id: &str) -> Result<Option<ReadingProgress>> {
        let chapter_id = chapter_id.to_string();
        let progress = self
            .conn
            .call(move |conn| {
                let progress = conn
                    .query_row(
                        "SELECT chapter_id, book_name, chapter, is_completed, completed_at FROM progress WHERE chapter_id = ?1",
                        params![chapter_id],
                        progress_from_row,
                    )
                    .optional()?;
                Ok(progress)
            })
            .await?;
        Ok(progress)
    }

    pub async fn upsert_progress(&self, progress: ReadingProgress) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT OR REPLACE INTO progress (chapter_id, book_name, chapter, is_completed, completed_at)
                       VALUES (?1, ?2, ?3, ?4, ?5)"#,
                    params![
                        progress.chapter_id,
                        progress.book_name,
                        progress.chapter,
                        progress.is_completed,
                        progress.completed_at,
                    ],
                )?;
                Ok(())
            })
            .await?;
        self.notify(Collection::Progress);
        Ok(())
    }

    pub async fn delete_progress(&self, chapter_id: &str) -> Result<()> {
        let chapter_id = chapter_id.to_string();
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM progress WHERE chapter_id = ?1", params![chapter_id])?;
                Ok(())
            })
            .await?;
        self.notify(Collection::Progress);
        Ok(())
    }

    // Note operations

    pub async fn get_all_notes(&self) -> Result<Vec<Note>> {
        let notes = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, book_name, chapter, verse, content, timestamp FROM notes ORDER BY timestamp DESC",
                )?;
                let notes = stmt
                    .query_map([], note_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(notes)
            })
            .await?;
        Ok(notes)
    }

    pub fn watch_notes(
        &self,
    ) -> impl Stream<Item = Result<Vec<Note>>> + Send + 'static {
        let repo = self.clone();
        self.watch(Collection::Notes, move || {
            let repo = repo.clone();
            async move { repo.get_all_notes().await }
        })
    }

    pub async fn get_notes_for_chapter(&self, book_name: &str, chapter: i32) -> Result<Vec<Note>> {
        let book_name = book_name.to_string();
        let notes = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT id, book_name, chapter, verse, content, timestamp FROM notes
                       WHERE book_name = ?1 AND chapter = ?2
                       ORDER BY verse, timestamp"#,
                )?;
                let notes = stmt
                    .query_map(params![book_name, chapter], note_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(notes)
            })
            .await?;
        Ok(notes)
    }

    pub async fn get_note(&self, id: i64) -> Result<Option<Note>> {
        let note = self
            .conn
            .call(move |conn| {
                let note = conn
                    .query_row(
                        "SELECT id, book_name, chapter, verse, content, timestamp FROM notes WHERE id = ?1",
                        params![id],
                        note_from_row,
                    )
                    .optional()?;
                Ok(note)
            })
            .await?;
        Ok(note)
    }

    /// Inserts or replaces by id. A note with id 0 gets a fresh id.
    pub async fn insert_note(&self, note: Note) -> Result<i64> {
        let id = self
            .conn
            .call(move |conn| {
                let id = (note.id != 0).then_some(note.id);
                conn.execute(
                    r#"INSERT OR REPLACE INTO notes (id, book_name, chapter, verse, content, timestamp)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
                    params![
                        id,
                        note.book_name,
                        note.chapter,
                        note.verse,
                        note.content,
                        note.timestamp,
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        self.notify(Collection::Notes);
        Ok(id)
    }

    pub async fn delete_note(&self, id: i64) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM notes WHERE id = ?1", params![id])?;
                Ok(())
            })
            .await?;
        self.notify(Collection::Notes);
        Ok(())
    }

    // Favorite operations

    pub async fn get_all_favorites(&self) -> Result<Vec<Favorite>> {
        let favorites = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT verse_id, book_name, chapter, verse_number, verse_text, saved_at
                       FROM favorites ORDER BY saved_at DESC"#,
                )?;
                let favorites = stmt
                    .query_map([], favorite_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(favorites)
            })
            .await?;
        Ok(favorites)
    }

    pub fn watch_favorites(
        &self,
    ) -> impl Stream<Item = Result<Vec<Favorite>>> + Send + 'static {
        let repo = self.clone();
        self.watch(Collection::Favorites, move || {
            let repo = repo.clone();
            async move { repo.get_all_favorites().await }
        })
    }

    pub async fn get_favorite(&self, verse_id: &str) -> Result<Option<Favorite>> {
        let verse_id = verse_id.to_string();
        let favorite = self
            .conn
            .call(move |conn| {
                let favorite = conn
                    .query_row(
                        r#"SELECT verse_id, book_name, chapter, verse_number, verse_text, saved_at
                           FROM favorites WHERE verse_id = ?1"#,
                        params![verse_id],
                        favorite_from_row,
                    )
                    .optional()?;
                Ok(favorite)
            })
            .await?;
        Ok(favorite)
    }

    pub async fn insert_favorite(&self, favorite: Favorite) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT OR REPLACE INTO favorites (verse_id, book_name, chapter, verse_number, verse_text, saved_at)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
                    params![
                        favorite.verse_id,
                        favorite.book_name,
                        favorite.chapter,
                        favorite.verse_number,
                        favorite.verse_text,
                        favorite.saved_at,
                    ],
                )?;
                Ok(())
            })
            .await?;
        self.notify(Collection::Favorites);
        Ok(())
    }

    pub async fn delete_favorite(&self, verse_id: &str) -> Result<()> {
        let verse_id = verse_id.to_string();
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM favorites WHERE verse_id = ?1", params![verse_id])?;
                Ok(())
            })
            .await?;
        self.notify(Collection::Favorites);
        Ok(())
    }

    pub async fn is_favorite(&self, verse_id: &str) -> Result<bool> {
        let verse_id = verse_id.to_string();
        let exists = self
            .conn
            .call(move |conn| {
                let exists: bool = conn.query_row(
                    "SELECT EXISTS(SELECT 1 FROM favorites WHERE verse_id = ?1)",
                    params![verse_id],
                    |row| row.get(0),
                )?;
                Ok(exists)
            })
            .await?;
        Ok(exists)
    }

    // Quiz operations

    pub async fn get_all_quizzes(&self) -> Result<Vec<QuizResult>> {
        let quizzes = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT quiz_id, chapter_id, book_name, chapter, score, total_questions, completed_at
                       FROM quizzes ORDER BY completed_at DESC"#,
                )?;
                let quizzes = stmt
                    .query_map([], quiz_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(quizzes)
            })
            .await?;
        Ok(quizzes)
    }

    pub fn watch_quizzes(
        &self,
    ) -> impl Stream<Item = Result<Vec<QuizResult>>> + Send + 'static {
        let repo = self.clone();
        self.watch(Collection::Quizzes, move || {
            let repo = repo.clone();
            async move { repo.get_all_quizzes().await }
        })
    }

    pub async fn get_quiz(&self, quiz_id: &str) -> Result<Option<QuizResult>> {
        let quiz_id = quiz_id.to_string();
        let quiz = self
            .conn
            .call(move |conn| {
                let quiz = conn
                    .query_row(
                        r#"SELECT quiz_id, chapter_id, book_name, chapter, score, total_questions, completed_at
                           FROM quizzes WHERE quiz_id = ?1"#,
                        params![quiz_id],
                        quiz_from_row,
                    )
                    .optional()?;
                Ok(quiz)
            })
            .await?;
        Ok(quiz)
    }

    pub async fn get_quizzes_for_chapter(&self, chapter_id: &str) -> Result<Vec<QuizResult>> {
        let chapter_id = chapter_id.to_string();
        let quizzes = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT quiz_id, chapter_id, book_name, chapter, score, total_questions, completed_at
                       FROM quizzes WHERE chapter_id = ?1 ORDER BY completed_at DESC"#,
                )?;
                let quizzes = stmt
                    .query_map(params![chapter_id], quiz_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(quizzes)
            })
            .await?;
        Ok(quizzes)
    }

    pub async fn insert_quiz(&self, quiz: QuizResult) -> Result<()> {
        self.conn
            .call(move |conn| {
                conn.execute(
                    r#"INSERT OR REPLACE INTO quizzes (quiz_id, chapter_id, book_name, chapter, score, total_questions, completed_at)
                       VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
                    params![
                        quiz.quiz_id,
                        quiz.chapter_id,
                        quiz.book_name,
                        quiz.chapter,
                        quiz.score,
                        quiz.total_questions,
                        quiz.completed_at,
                    ],
                )?;
                Ok(())
            })
            .await?;
        self.notify(Collection::Quizzes);
        Ok(())
    }

    pub async fn delete_quiz(&self, quiz_id: &str) -> Result<()> {
        let quiz_id = quiz_id.to_string();
        self.conn
            .call(move |conn| {
                conn.execute("DELETE FROM quizzes WHERE quiz_id = ?1", params![quiz_id])?;
                Ok(())
            })
            .await?;
        self.notify(Collection::Quizzes);
        Ok(())
    }

    pub async fn get_quiz_stats_for_chapter(&self, chapter_id: &str) -> Result<QuizStats> {
        let chapter_id = chapter_id.to_string();
        let stats = self
            .conn
            .call(move |conn| {
                let stats = conn.query_row(
                    r#"SELECT MAX(score), COUNT(*), MAX(completed_at)
                       FROM quizzes WHERE chapter_id = ?1"#,
                    params![chapter_id],
                    |row| {
                        Ok(QuizStats {
                            best_score: row.get(0)?,
                            attempt_count: row.get(1)?,
                            last_attempt_at: row.get(2)?,
                        })
                    },
                )?;
                Ok(stats)
            })
            .await?;
        Ok(stats)
    }

    // Verse cache operations

    pub async fn get_chapter(
        &self,
        book: &str,
        chapter: i32,
        translation: &str,
    ) -> Result<Vec<BibleVerse>> {
        let book = book.to_string();
        let translation = translation.to_string();
        let verses = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    r#"SELECT id, book, chapter, number, text, translation FROM verses
                       WHERE book = ?1 AND chapter = ?2 AND translation = ?3
                       ORDER BY number ASC"#,
                )?;
                let verses = stmt
                    .query_map(params![book, chapter, translation], verse_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(verses)
            })
            .await?;
        Ok(verses)
    }

    /// Stores a batch of verses in one transaction, replacing any cached copy.
    pub async fn insert_verses(&self, verses: Vec<BibleVerse>) -> Result<usize> {
        let count = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        r#"INSERT OR REPLACE INTO verses (id, book, chapter, number, text, translation)
                           VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
                    )?;
                    for verse in &verses {
                        let id = (verse.id != 0).then_some(verse.id);
                        stmt.execute(params![
                            id,
                            verse.book,
                            verse.chapter,
                            verse.number,
                            verse.text,
                            verse.translation,
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(verses.len())
            })
            .await?;
        self.notify(Collection::Verses);
        Ok(count)
    }

    pub async fn get_verse_count(&self, translation: &str) -> Result<i64> {
        let translation = translation.to_string();
        let count = self
            .conn
            .call(move |conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM verses WHERE translation = ?1",
                    params![translation],
                    |row| row.get(0),
                )?;
                Ok(count)
            })
            .await?;
        Ok(count)
    }

    pub async fn get_downloaded_books(&self, translation: &str) -> Result<Vec<String>> {
        let translation = translation.to_string();
        let books = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT DISTINCT book FROM verses WHERE translation = ?1 ORDER BY book ASC",
                )?;
                let books = stmt
                    .query_map(params![translation], |row| row.get(0))?
                    .collect::<std::result::Result<Vec<String>, _>>()?;
                Ok(books)
            })
            .await?;
        Ok(books)
    }

    pub async fn get_max_chapter(&self, book: &str, translation: &str) -> Result<Option<i32>> {
        let book = book.to_string();
        let translation = translation.to_string();
        let max = self
            .conn
            .call(move |conn| {
                let max: Option<i32> = conn.query_row(
                    "SELECT MAX(chapter) FROM verses WHERE book = ?1 AND translation = ?2",
                    params![book, translation],
                    |row| row.get(0),
                )?;
                Ok(max)
            })
            .await?;
        Ok(max)
    }
}

fn progress_from_row(row: &Row) -> rusqlite::Result<ReadingProgress> {
    Ok(ReadingProgress {
        chapter_id: row.get(0)?,
        book_name: row.get(1)?,
        chapter: row.get(2)?,
        is_completed: row.get(3)?,
        completed_at: row.get(4)?,
    })
}

fn note_from_row(row: &Row) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get(0)?,
        book_name: row.get(1)?,
        chapter: row.get(2)?,
        verse: row.get(3)?,
        content: row.get(4)?,
        timestamp: row.get(5)?,
    })
}

fn favorite_from_row(row: &Row) -> rusqlite::Result<Favorite> {
    Ok(Favorite {
        verse_id: row.get(0)?,
        book_name: row.get(1)?,
        chapter: row.get(2)?,
        verse_number: row.get(3)?,
        verse_text: row.get(4)?,
        saved_at: row.get(5)?,
    })
}

fn quiz_from_row(row: &Row) -> rusqlite::Result<QuizResult> {
    Ok(QuizResult {
        quiz_id: row.get(0)?,
        chapter_id: row.get(1)?,
        book_name: row.get(2)?,
        chapter: row.get(3)?,
        score: row.get(4)?,
        total_questions: row.get(5)?,
        completed_at: row.get(6)?,
    })
}

fn verse_from_row(row: &Row) -> rusqlite::Result<BibleVerse> {
    Ok(BibleVerse {
        id: row.get(0)?,
        book: row.get(1)?,
        chapter: row.get(2)?,
        number: row.get(3)?,
        text: row.get(4)?,
        translation: row.get(5)?,
    })
}
