/// Canonical book order with chapter counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Testament {
    Old,
    New,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookInfo {
    pub name: &'static str,
    pub chapters: u32,
    pub testament: Testament,
}

impl BookInfo {
    const fn new(name: &'static str, chapters: u32, testament: Testament) -> Self {
        Self {
            name,
            chapters,
            testament,
        }
    }
}

pub const ALL_BOOKS: [BookInfo; 66] = [
    BookInfo::new("Genesis", 50, Testament::Old),
    BookInfo::new("Exodus", 40, Testament::Old),
    BookInfo::new("Leviticus", 27, Testament::Old),
    BookInfo::new("Numbers", 36, Testament::Old),
    BookInfo::new("Deuteronomy", 34, Testament::Old),
    BookInfo::new("Joshua", 24, Testament::Old),
    BookInfo::new("Judges", 21, Testament::Old),
    BookInfo::new("Ruth", 4, Testament::Old),
    BookInfo::new("1 Samuel", 31, Testament::Old),
    BookInfo::new("2 Samuel", 24, Testament::Old),
    BookInfo::new("1 Kings", 22, Testament::Old),
    BookInfo::new("2 Kings", 25, Testament::Old),
    BookInfo::new("1 Chronicles", 29, Testament::Old),
    BookInfo::new("2 Chronicles", 36, Testament::Old),
    BookInfo::new("Ezra", 10, Testament::Old),
    BookInfo::new("Nehemiah", 13, Testament::Old),
    BookInfo::new("Esther", 10, Testament::Old),
    BookInfo::new("Job", 42, Testament::Old),
    BookInfo::new("Psalms", 150, Testament::Old),
    BookInfo::new("Proverbs", 31, Testament::Old),
    BookInfo::new("Ecclesiastes", 12, Testament::Old),
    BookInfo::new("Song of Solomon", 8, Testament::Old),
    BookInfo::new("Isaiah", 66, Testament::Old),
    BookInfo::new("Jeremiah", 52, Testament::Old),
    BookInfo::new("Lamentations", 5, Testament::Old),
    BookInfo::new("Ezekiel", 48, Testament::Old),
    BookInfo::new("Daniel", 12, Testament::Old),
    BookInfo::new("Hosea", 14, Testament::Old),
    BookInfo::new("Joel", 3, Testament::Old),
    BookInfo::new("Amos", 9, Testament::Old),
    BookInfo::new("Obadiah", 1, Testament::Old),
    BookInfo::new("Jonah", 4, Testament::Old),
    BookInfo::new("Micah", 7, Testament::Old),
    BookInfo::new("Nahum", 3, Testament::Old),
    BookInfo::new("Habakkuk", 3, Testament::Old),
    BookInfo::new("Zephaniah", 3, Testament::Old),
    BookInfo::new("Haggai", 2, Testament::Old),
    BookInfo::new("Zechariah", 14, Testament::Old),
    BookInfo::new("Malachi", 4, Testament::Old),
    BookInfo::new("Matthew", 28, Testament::New),
    BookInfo::new("Mark", 16, Testament::New),
    BookInfo::new("Luke", 24, Testament::New),
    BookInfo::new("John", 21, Testament::New),
    BookInfo::new("Acts", 28, Testament::New),
    BookInfo::new("Romans", 16, Testament::New),
    BookInfo::new("1 Corinthians", 16, Testament::New),
    BookInfo::new("2 Corinthians", 13, Testament::New),
    BookInfo::new("Galatians", 6, Testament::New),
    BookInfo::new("Ephesians", 6, Testament::New),
    BookInfo::new("Philippians", 4, Testament::New),
    BookInfo::new("Colossians", 4, Testament::New),
    BookInfo::new("1 Thessalonians", 5, Testament::New),
    BookInfo::new("2 Thessalonians", 3, Testament::New),
    BookInfo::new("1 Timothy", 6, Testament::New),
    BookInfo::new("2 Timothy", 4, Testament::New),
    BookInfo::new("Titus", 3, Testament::New),
    BookInfo::new("Philemon", 1, Testament::New),
    BookInfo::new("Hebrews", 13, Testament::New),
    BookInfo::new("James", 5, Testament::New),
    BookInfo::new("1 Peter", 5, Testament::New),
    BookInfo::new("2 Peter", 3, Testament::New),
    BookInfo::new("1 John", 5, Testament::New),
    BookInfo::new("2 John", 1, Testament::New),
    BookInfo::new("3 John", 1, Testament::New),
    BookInfo::new("Jude", 1, Testament::New),
    BookInfo::new("Revelation", 22, Testament::New),
];

pub fn book_info(name: &str) -> Option<&'static BookInfo> {
    ALL_BOOKS.iter().find(|b| b.name.eq_ignore_ascii_case(name))
}

/// Index of a book in canonical order.
pub fn book_position(name: &str) -> Option<usize> {
    ALL_BOOKS.iter().position(|b| b.name.eq_ignore_ascii_case(name))
}
