use std::time::Duration;

use rand::Rng;

use crate::error::{AppError, Result};

/// Hours of the day (local time, `start..end`) in which reminders may fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderWindow {
    start_hour: u32,
    end_hour: u32,
}

impl ReminderWindow {
    pub fn new(start_hour: u32, end_hour: u32) -> Result<Self> {
        if start_hour >= end_hour || end_hour > 24 {
            return Err(AppError::InvalidInput(format!(
                "reminder window {}..{} is not a valid range of hours",
                start_hour, end_hour
            )));
        }
        Ok(Self {
            start_hour,
            end_hour,
        })
    }

    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u32 {
        self.end_hour
    }

    fn hours(&self) -> u32 {
        self.end_hour - self.start_hour
    }
}

/// Random delay from `now_hour` to a moment inside the next reminder window.
///
/// Before the window the reminder lands somewhere in today's window, after it
/// in tomorrow's, and inside it somewhere in the hours that remain.
pub fn delay_until_reminder<R: Rng>(
    now_hour: u32,
    window: ReminderWindow,
    rng: &mut R,
) -> Duration {
    let now_hour = now_hour.min(23);
    let minute = rng.gen_range(0..60);

    let minutes = if now_hour < window.start_hour {
        let until_start = window.start_hour - now_hour;
        (until_start + rng.gen_range(0..window.hours())) * 60 + minute
    } else if now_hour >= window.end_hour {
        let until_tomorrow = 24 - now_hour + window.start_hour;
        (until_tomorrow + rng.gen_range(0..window.hours())) * 60 + minute
    } else {
        let remaining = (window.end_hour - now_hour).max(1);
        rng.gen_range(0..remaining) * 60 + minute
    };

    minutes_to_duration(minutes)
}

/// Delay for the follow-up reminder after one has been delivered.
pub fn delay_until_next_day<R: Rng>(window: ReminderWindow, rng: &mut R) -> Duration {
    let hour = rng.gen_range(0..window.hours());
    let minute = rng.gen_range(0..60);
    minutes_to_duration((24 - window.hours() + hour) * 60 + minute)
}

fn minutes_to_duration(minutes: u32) -> Duration {
    Duration::from_secs(u64::from(minutes) * 60)
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn window() -> ReminderWindow {
        ReminderWindow::new(9, 21).unwrap()
    }

    fn minutes(d: Duration) -> u64 {
        d.as_secs() / 60
    }

    #[test]
    fn rejects_empty_or_inverted_windows() {
        assert!(ReminderWindow::new(9, 9).is_err());
        assert!(ReminderWindow::new(21, 9).is_err());
        assert!(ReminderWindow::new(0, 25).is_err());
        assert!(ReminderWindow::new(0, 24).is_ok());
    }

    #[test]
    fn before_window_lands_in_todays_window() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let m = minutes(delay_until_reminder(6, window(), &mut rng));
            // 3h until 09:00, at most 11h59m further
            assert!((180..180 + 12 * 60).contains(&m), "{m}");
        }
    }

    #[test]
    fn after_window_lands_in_tomorrows_window() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let m = minutes(delay_until_reminder(22, window(), &mut rng));
            // 22:00 -> 09:00 is 11h
            assert!((11 * 60..11 * 60 + 12 * 60).contains(&m), "{m}");
        }
    }

    #[test]
    fn inside_window_stays_within_remaining_hours() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let m = minutes(delay_until_reminder(19, window(), &mut rng));
            assert!(m < 2 * 60, "{m}");
        }
        // last hour of the window still allows a delay
        let m = minutes(delay_until_reminder(20, window(), &mut rng));
        assert!(m < 60);
    }

    #[test]
    fn next_day_delay_spans_a_day() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..200 {
            let m = minutes(delay_until_next_day(window(), &mut rng));
            assert!((12 * 60..24 * 60).contains(&m), "{m}");
        }
    }
}
