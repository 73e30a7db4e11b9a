//! Data models for per-day task tracking.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique task identifier.
pub type TaskId = Uuid;

/// A single task scoped to one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, assigned at creation.
    pub id: TaskId,
    /// Free-form description. Non-empty at creation.
    pub text: String,
    /// Whether the task is done.
    pub completed: bool,
    /// Priority, fixed at creation.
    pub priority: Priority,
    /// The calendar day this task belongs to.
    pub date: NaiveDate,
    /// Creation timestamp, used as an ordering tie-breaker.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a new incomplete task for a day.
    pub fn new(text: impl Into<String>, priority: Priority, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            completed: false,
            priority,
            date,
            created_at: Utc::now(),
        }
    }
}

/// Task priority levels, ordered from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    /// Numeric sort weight. Higher means more urgent.
    pub fn weight(&self) -> u8 {
        match self {
            Priority::Low => 1,
            Priority::Medium => 2,
            Priority::High => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Priority::Low => "○",
            Priority::Medium => "◐",
            Priority::High => "●",
        }
    }

    /// Cycle through priorities in the input form.
    pub fn next(&self) -> Priority {
        match self {
            Priority::Low => Priority::Medium,
            Priority::Medium => Priority::High,
            Priority::High => Priority::Low,
        }
    }
}

/// Aggregate completion state of a day's tasks. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStatus {
    /// No tasks on this day.
    None,
    /// At least one task is still open.
    Pending,
    /// Every task on this day is completed.
    Complete,
}

/// Per-day completion statistics. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayStats {
    pub date: NaiveDate,
    pub total: usize,
    pub completed: usize,
    /// Integer completion percentage in [0, 100]. Zero when `total` is zero.
    pub rate: u8,
}

/// One point of the rolling 7-day completion chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekPoint {
    pub date: NaiveDate,
    /// Short weekday name ("Mon", "Tue", ...).
    pub day_name: String,
    pub completed: usize,
    pub rate: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_ordering() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
        assert_eq!(Priority::Low.weight(), 1);
        assert_eq!(Priority::Medium.weight(), 2);
        assert_eq!(Priority::High.weight(), 3);
    }

    #[test]
    fn test_priority_cycle() {
        assert_eq!(Priority::Low.next(), Priority::Medium);
        assert_eq!(Priority::Medium.next(), Priority::High);
        assert_eq!(Priority::High.next(), Priority::Low);
    }

    #[test]
    fn test_task_creation() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let task = Task::new("Write report", Priority::High, date);
        assert_eq!(task.text, "Write report");
        assert!(!task.completed);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.date, date);
    }

    #[test]
    fn test_task_ids_are_unique() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let a = Task::new("a", Priority::Low, date);
        let b = Task::new("b", Priority::Low, date);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_date_serializes_as_ymd() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let task = Task::new("a", Priority::Low, date);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["date"], "2024-05-01");
    }
}
