//! Pure query functions over the in-memory task collection.
//!
//! The collection has no ordering guarantee on disk; ordering is always
//! computed here on read.

use crate::models::{DayStats, DayStatus, Task, WeekPoint};
use chrono::{Duration, NaiveDate};

/// Tasks for a single day, in display order.
///
/// Sorted by completion (incomplete first), then priority (High first),
/// then creation time. The sort is stable, so ties keep their input order.
pub fn tasks_for_date(tasks: &[Task], date: NaiveDate) -> Vec<Task> {
    let mut day: Vec<Task> = tasks.iter().filter(|t| t.date == date).cloned().collect();
    day.sort_by(|a, b| {
        a.completed
            .cmp(&b.completed)
            .then(b.priority.cmp(&a.priority))
            .then(a.created_at.cmp(&b.created_at))
    });
    day
}

/// Aggregate completion state for a day.
pub fn day_status(tasks: &[Task], date: NaiveDate) -> DayStatus {
    let mut total = 0usize;
    let mut completed = 0usize;
    for task in tasks.iter().filter(|t| t.date == date) {
        total += 1;
        if task.completed {
            completed += 1;
        }
    }

    if total == 0 {
        DayStatus::None
    } else if completed == total {
        DayStatus::Complete
    } else {
        DayStatus::Pending
    }
}

/// Completion statistics for a day. An empty day has rate 0.
pub fn day_stats(tasks: &[Task], date: NaiveDate) -> DayStats {
    let total = tasks.iter().filter(|t| t.date == date).count();
    let completed = tasks
        .iter()
        .filter(|t| t.date == date && t.completed)
        .count();

    DayStats {
        date,
        total,
        completed,
        rate: rate_percent(completed, total),
    }
}

/// Completion rates for the 7 days ending at `end`, in chronological order.
pub fn weekly_series(tasks: &[Task], end: NaiveDate) -> Vec<WeekPoint> {
    (0..7)
        .rev()
        .map(|back| {
            let date = end - Duration::days(back);
            let stats = day_stats(tasks, date);
            WeekPoint {
                date,
                day_name: date.format("%a").to_string(),
                completed: stats.completed,
                rate: stats.rate,
            }
        })
        .collect()
}

/// Integer completion percentage, rounded. Zero when `total` is zero.
fn rate_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        0
    } else {
        ((completed as f64 / total as f64) * 100.0).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(
        text: &str,
        priority: Priority,
        day: NaiveDate,
        completed: bool,
        created_secs: i64,
    ) -> Task {
        let mut t = Task::new(text, priority, day);
        t.completed = completed;
        t.created_at = Utc.timestamp_opt(created_secs, 0).unwrap();
        t
    }

    #[test]
    fn test_tasks_for_date_filters_to_day() {
        let may1 = date(2024, 5, 1);
        let may2 = date(2024, 5, 2);
        let tasks = vec![
            task("a", Priority::Low, may1, false, 1),
            task("b", Priority::Low, may2, false, 2),
        ];

        let day = tasks_for_date(&tasks, may1);
        assert_eq!(day.len(), 1);
        assert!(day.iter().all(|t| t.date == may1));
        assert!(tasks_for_date(&tasks, date(2024, 5, 3)).is_empty());
    }

    #[test]
    fn test_tasks_for_date_ordering() {
        // High-incomplete, Low-completed, Medium-incomplete,
        // created in that order, all on the same day.
        let may1 = date(2024, 5, 1);
        let tasks = vec![
            task("high", Priority::High, may1, false, 1),
            task("low", Priority::Low, may1, true, 2),
            task("medium", Priority::Medium, may1, false, 3),
        ];

        let ordered = tasks_for_date(&tasks, may1);
        let texts: Vec<&str> = ordered.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["high", "medium", "low"]);
    }

    #[test]
    fn test_tasks_for_date_created_at_tiebreak() {
        let may1 = date(2024, 5, 1);
        let tasks = vec![
            task("second", Priority::Medium, may1, false, 20),
            task("first", Priority::Medium, may1, false, 10),
        ];

        let ordered = tasks_for_date(&tasks, may1);
        assert_eq!(ordered[0].text, "first");
        assert_eq!(ordered[1].text, "second");
    }

    #[test]
    fn test_tasks_for_date_idempotent() {
        let may1 = date(2024, 5, 1);
        let tasks = vec![
            task("a", Priority::High, may1, true, 1),
            task("b", Priority::Low, may1, false, 2),
            task("c", Priority::Medium, may1, false, 3),
        ];

        let first = tasks_for_date(&tasks, may1);
        let second = tasks_for_date(&tasks, may1);
        let ids_first: Vec<_> = first.iter().map(|t| t.id).collect();
        let ids_second: Vec<_> = second.iter().map(|t| t.id).collect();
        assert_eq!(ids_first, ids_second);
    }

    #[test]
    fn test_day_status_branches() {
        let may1 = date(2024, 5, 1);

        assert_eq!(day_status(&[], may1), DayStatus::None);

        let pending = vec![
            task("a", Priority::Low, may1, true, 1),
            task("b", Priority::Low, may1, false, 2),
        ];
        assert_eq!(day_status(&pending, may1), DayStatus::Pending);

        let complete = vec![
            task("a", Priority::Low, may1, true, 1),
            task("b", Priority::Low, may1, true, 2),
        ];
        assert_eq!(day_status(&complete, may1), DayStatus::Complete);
    }

    #[test]
    fn test_day_stats_empty_day() {
        let stats = day_stats(&[], date(2024, 5, 1));
        assert_eq!(stats.total, 0);
        assert_eq!(stats.completed, 0);
        assert_eq!(stats.rate, 0);
    }

    #[test]
    fn test_day_stats_three_of_four() {
        // 4 tasks, 3 completed -> 75%, still pending.
        let may1 = date(2024, 5, 1);
        let tasks = vec![
            task("a", Priority::Low, may1, true, 1),
            task("b", Priority::Low, may1, true, 2),
            task("c", Priority::Low, may1, true, 3),
            task("d", Priority::Low, may1, false, 4),
        ];

        let stats = day_stats(&tasks, may1);
        assert_eq!(stats.rate, 75);
        assert_eq!(day_status(&tasks, may1), DayStatus::Pending);
    }

    #[test]
    fn test_day_stats_rate_bounds() {
        let may1 = date(2024, 5, 1);
        for completed_count in 0..=3usize {
            let tasks: Vec<Task> = (0..3)
                .map(|i| task("t", Priority::Low, may1, i < completed_count, i as i64))
                .collect();
            let stats = day_stats(&tasks, may1);
            assert!(stats.rate <= 100);
            assert_eq!(stats.rate == 0, completed_count == 0);
        }
    }

    #[test]
    fn test_weekly_series_window() {
        // A series ending 2024-05-07 covers May 1 through 7.
        let series = weekly_series(&[], date(2024, 5, 7));
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, date(2024, 5, 1));
        assert_eq!(series[6].date, date(2024, 5, 7));
        for pair in series.windows(2) {
            assert_eq!(pair[1].date, pair[0].date + Duration::days(1));
        }
    }

    #[test]
    fn test_weekly_series_rates() {
        let may7 = date(2024, 5, 7);
        let may5 = date(2024, 5, 5);
        let tasks = vec![
            task("a", Priority::Low, may5, true, 1),
            task("b", Priority::Low, may5, false, 2),
            task("c", Priority::Low, may7, true, 3),
        ];

        let series = weekly_series(&tasks, may7);
        assert_eq!(series[4].rate, 50);
        assert_eq!(series[4].completed, 1);
        assert_eq!(series[6].rate, 100);
        // Days with no tasks stay at zero.
        assert_eq!(series[0].rate, 0);
    }

    #[test]
    fn test_weekly_series_idempotent() {
        let may7 = date(2024, 5, 7);
        let tasks = vec![task("a", Priority::Low, may7, true, 1)];
        assert_eq!(weekly_series(&tasks, may7), weekly_series(&tasks, may7));
    }
}
