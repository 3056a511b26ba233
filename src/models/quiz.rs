use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ReadingProgress;

pub const QUESTIONS_PER_QUIZ: i32 = 5;

/// One quiz attempt. Attempts are only ever appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub quiz_id: String,
    pub chapter_id: String,
    pub book_name: String,
    pub chapter: i32,
    pub score: i32,
    pub total_questions: i32,
    pub completed_at: i64,
}

impl QuizResult {
    pub fn new(book: &str, chapter: i32, score: i32) -> Self {
        Self {
            quiz_id: Uuid::new_v4().to_string(),
            chapter_id: ReadingProgress::chapter_key(book, chapter),
            book_name: book.to_string(),
            chapter,
            score,
            total_questions: QUESTIONS_PER_QUIZ,
            completed_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuizStats {
    pub best_score: Option<i32>,
    pub attempt_count: i64,
    pub last_attempt_at: Option<i64>,
}
