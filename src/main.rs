use std::path::PathBuf;

use path_data::app::{App, BackupOutcome};
use path_data::backup::read_snapshot;
use path_data::config::Config;
use path_data::error::{AppError, Result};

const USAGE: &str = "Usage:
  path-data                          show reading status
  path-data --export [file]          write a backup (default: backup dir)
  path-data --restore <file>         restore a backup
  path-data --inspect <file>         show what a backup contains
  path-data --complete <book> <ch>   mark a chapter as read
  path-data --remind                 send one study reminder
  path-data --reminders              keep sending daily reminders";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let flag = args.get(1).map(String::as_str);
    let arg = |i: usize| args.get(i).cloned();

    // Load configuration
    let config = Config::load()?;

    // --inspect never opens the database
    if flag == Some("--inspect") {
        let path = arg(2).ok_or_else(|| usage_error("--inspect needs a file"))?;
        let file = std::fs::File::open(&path)?;
        let snapshot = read_snapshot(file).await?;
        println!("{}: {}", path, snapshot.summary());
        return Ok(());
    }

    let mut app = App::new(&config).await?;

    match flag {
        None => {
            let status = app.status().await?;
            println!(
                "{} chapters read, {} notes, {} favorites",
                status.completed_chapters, status.notes, status.favorites
            );
            println!(
                "Streak: {} days (longest {})",
                status.streak.streak, status.streak.longest_streak
            );
            println!("Next: {} {}", status.next.book, status.next.chapter);
        }

        Some("--export") => {
            app.start_export(arg(2).map(PathBuf::from)).await;
            report(app.wait_backup_result().await?)?;
        }

        Some("--restore") => {
            let path = arg(2).ok_or_else(|| usage_error("--restore needs a file"))?;
            app.start_restore(PathBuf::from(path));
            report(app.wait_backup_result().await?)?;
        }

        Some("--complete") => {
            let book = arg(2).ok_or_else(|| usage_error("--complete needs a book"))?;
            let chapter = arg(3)
                .and_then(|c| c.parse::<u32>().ok())
                .ok_or_else(|| usage_error("--complete needs a chapter number"))?;
            let streak = app.mark_chapter_complete(&book, chapter).await?;
            println!("Marked {} {} as read. Streak: {} days", book, chapter, streak.streak);
        }

        Some("--remind") => {
            app.reminder_worker().run().await?;
        }

        Some("--reminders") => {
            app.reminder_worker().run_forever().await?;
        }

        Some(other) => {
            eprintln!("{}", USAGE);
            return Err(anyhow::anyhow!("Unknown option: {}", other).into());
        }
    }

    Ok(())
}

fn report(outcome: Option<BackupOutcome>) -> Result<()> {
    match outcome {
        Some(BackupOutcome::Exported(path)) => {
            println!("Backup written to {}", path.display());
            Ok(())
        }
        Some(BackupOutcome::Restored(snapshot)) => {
            println!("Restored {}", snapshot.summary());
            Ok(())
        }
        Some(BackupOutcome::Failed { error, .. }) => {
            if let AppError::PartialRestore {
                progress,
                notes,
                favorites,
                ..
            } = &error
            {
                eprintln!(
                    "Restore stopped partway. {} progress, {} notes and {} favorites were already \
                     written, so storage now mixes restored and earlier records. \
                     Restoring the same file again is safe.",
                    progress, notes, favorites
                );
            }
            Err(error)
        }
        None => Ok(()),
    }
}

fn usage_error(message: &str) -> AppError {
    AppError::InvalidInput(format!("{}\n\n{}", message, USAGE))
}
