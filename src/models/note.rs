use serde::{Deserialize, Serialize};

/// A free-text note attached to a verse.
///
/// An `id` of 0 means the note has not been stored yet; inserting it assigns
/// a fresh id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i64,
    pub book_name: String,
    pub chapter: i32,
    pub verse: i32,
    pub content: String,
    pub timestamp: i64,
}

impl Note {
    pub fn new(book: &str, chapter: i32, verse: i32, content: impl Into<String>) -> Self {
        Self {
            id: 0,
            book_name: book.to_string(),
            chapter,
            verse,
            content: content.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}
