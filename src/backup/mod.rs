//! JSON backup and restore of reading progress, notes and favorites.
//!
//! Quiz results and the verse cache are not part of the backup format.

mod manager;
mod snapshot;
mod store;

pub use manager::{backup_filename, backup_filename_at, read_snapshot, BackupManager};
pub use snapshot::{BackupSnapshot, StreakState, FORMAT_VERSION};
pub use store::BackupStore;
