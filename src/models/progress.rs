use serde::{Deserialize, Serialize};

/// Reading state of one chapter, keyed by `"<book>-<chapter>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingProgress {
    pub chapter_id: String,
    pub book_name: String,
    pub chapter: i32,
    pub is_completed: bool,
    pub completed_at: Option<i64>,
}

impl ReadingProgress {
    pub fn chapter_key(book: &str, chapter: i32) -> String {
        format!("{}-{}", book, chapter)
    }

    pub fn completed(book: &str, chapter: i32, completed_at: i64) -> Self {
        Self {
            chapter_id: Self::chapter_key(book, chapter),
            book_name: book.to_string(),
            chapter,
            is_completed: true,
            completed_at: Some(completed_at),
        }
    }

    pub fn visited(book: &str, chapter: i32) -> Self {
        Self {
            chapter_id: Self::chapter_key(book, chapter),
            book_name: book.to_string(),
            chapter,
            is_completed: false,
            completed_at: None,
        }
    }
}
