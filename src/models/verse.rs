use serde::{Deserialize, Serialize};

pub const DEFAULT_TRANSLATION: &str = "WEB";

/// Cached scripture text for a single verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibleVerse {
    pub id: i64,
    pub book: String,
    pub chapter: i32,
    pub number: i32,
    pub text: String,
    pub translation: String,
}

impl BibleVerse {
    pub fn new(book: &str, chapter: i32, number: i32, text: impl Into<String>) -> Self {
        Self {
            id: 0,
            book: book.to_string(),
            chapter,
            number,
            text: text.into(),
            translation: DEFAULT_TRANSLATION.to_string(),
        }
    }
}
