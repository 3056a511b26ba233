mod resolver;
mod schedule;
mod worker;

pub use resolver::{next_chapter, NextChapter};
pub use schedule::{delay_until_next_day, delay_until_reminder, ReminderWindow};
pub use worker::{LogNotifier, Notifier, StudyReminderWorker};
