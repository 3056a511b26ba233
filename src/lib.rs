//! Data layer for the Path Bible reading app.
//!
//! Reading progress, notes, favorites, quiz results and cached verses live in
//! SQLite (`db`). Study streak and reminder settings live in a preferences
//! file (`prefs`). `backup` moves progress, notes and favorites to and from a
//! portable JSON document, and `reminder` works out what to read next.

pub mod app;
pub mod backup;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod prefs;
pub mod reminder;

pub use error::{AppError, Result};
