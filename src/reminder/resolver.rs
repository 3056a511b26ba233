use std::collections::HashSet;

use crate::models::{book_position, ReadingProgress, ALL_BOOKS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextChapter {
    pub book: &'static str,
    pub chapter: u32,
}

impl NextChapter {
    const START: NextChapter = NextChapter {
        book: "Genesis",
        chapter: 1,
    };
}

/// First chapter at or after `current` that is not marked completed.
///
/// Wraps around to Genesis 1 when everything after `current` is done, and
/// falls back to Genesis 1 when the whole canon is complete.
pub fn next_chapter(progress: &[ReadingProgress], current: Option<(&str, u32)>) -> NextChapter {
    let completed: HashSet<&str> = progress
        .iter()
        .filter(|p| p.is_completed)
        .map(|p| p.chapter_id.as_str())
        .collect();

    let start = current.and_then(|(book, chapter)| {
        book_position(book).map(|index| (index, chapter.max(1)))
    });

    if let Some(found) = scan(&completed, start.unwrap_or((0, 1))) {
        return found;
    }
    if start.is_some() {
        if let Some(found) = scan(&completed, (0, 1)) {
            return found;
        }
    }
    NextChapter::START
}

fn scan(
    completed: &HashSet<&str>,
    (start_book, start_chapter): (usize, u32),
) -> Option<NextChapter> {
    ALL_BOOKS
        .iter()
        .enumerate()
        .skip(start_book)
        .find_map(|(index, book)| {
            let first = if index == start_book { start_chapter } else { 1 };
            (first..=book.chapters)
                .find(|chapter| {
                    let key = ReadingProgress::chapter_key(book.name, *chapter as i32);
                    !completed.contains(key.as_str())
                })
                .map(|chapter| NextChapter {
                    book: book.name,
                    chapter,
                })
        })
}
