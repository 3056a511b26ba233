mod books;
mod favorite;
mod note;
mod progress;
mod quiz;
mod verse;

pub use books::{book_info, book_position, BookInfo, Testament, ALL_BOOKS};
pub use favorite::Favorite;
pub use note::Note;
pub use progress::ReadingProgress;
pub use quiz::{QuizResult, QuizStats, QUESTIONS_PER_QUIZ};
pub use verse::{BibleVerse, DEFAULT_TRANSLATION};
