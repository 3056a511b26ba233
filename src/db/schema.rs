pub const SCHEMA: &str = r#"
-- progress table
CREATE TABLE IF NOT EXISTS progress (
    chapter_id TEXT PRIMARY KEY NOT NULL,
    book_name TEXT NOT NULL,
    chapter INTEGER NOT NULL,
    is_completed INTEGER NOT NULL DEFAULT 0,
    completed_at INTEGER
);

-- notes table
CREATE TABLE IF NOT EXISTS notes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    book_name TEXT NOT NULL,
    chapter INTEGER NOT NULL,
    verse INTEGER NOT NULL,
    content TEXT NOT NULL,
    timestamp INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_notes_chapter ON notes(book_name, chapter);
CREATE INDEX IF NOT EXISTS idx_notes_timestamp ON notes(timestamp DESC);

-- favorites table
CREATE TABLE IF NOT EXISTS favorites (
    verse_id TEXT PRIMARY KEY NOT NULL,
    book_name TEXT NOT NULL,
    chapter INTEGER NOT NULL,
    verse_number INTEGER NOT NULL,
    verse_text TEXT NOT NULL,
    saved_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_favorites_saved_at ON favorites(saved_at DESC);

-- quizzes table (append-only attempt log)
CREATE TABLE IF NOT EXISTS quizzes (
    quiz_id TEXT PRIMARY KEY NOT NULL,
    chapter_id TEXT NOT NULL,
    book_name TEXT NOT NULL,
    chapter INTEGER NOT NULL,
    score INTEGER NOT NULL,
    total_questions INTEGER NOT NULL,
    completed_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_quizzes_chapter_id ON quizzes(chapter_id);

-- verses table (cached scripture text)
CREATE TABLE IF NOT EXISTS verses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    book TEXT NOT NULL,
    chapter INTEGER NOT NULL,
    number INTEGER NOT NULL,
    text TEXT NOT NULL,
    translation TEXT NOT NULL DEFAULT 'WEB',
    UNIQUE(book, chapter, number, translation)
);

CREATE INDEX IF NOT EXISTS idx_verses_lookup ON verses(translation, book, chapter);
"#;
