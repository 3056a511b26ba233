use serde::{Deserialize, Serialize};

/// A saved verse. `verse_text` is a snapshot taken when the verse was saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub verse_id: String,
    pub book_name: String,
    pub chapter: i32,
    pub verse_number: i32,
    pub verse_text: String,
    pub saved_at: i64,
}

impl Favorite {
    pub fn verse_key(book: &str, chapter: i32, verse: i32) -> String {
        format!("{}-{}-{}", book, chapter, verse)
    }

    pub fn new(book: &str, chapter: i32, verse_number: i32, verse_text: impl Into<String>) -> Self {
        Self {
            verse_id: Self::verse_key(book, chapter, verse_number),
            book_name: book.to_string(),
            chapter,
            verse_number,
            verse_text: verse_text.into(),
            saved_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}
