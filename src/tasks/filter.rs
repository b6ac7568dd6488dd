//! Task query/filter engine.
//!
//! All supplied predicates are ANDed; an empty filter is the identity and
//! preserves store order.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use super::model::{Priority, Task, TaskStatus};
use crate::error::ApiError;

/// Optional predicates over a task list.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Case-insensitive substring on title or details.
    pub title_query: Option<String>,
    pub priorities: Vec<Priority>,
    pub statuses: Vec<TaskStatus>,
    /// Inclusive lower bound on `created_at`, unparsed.
    pub date_from: Option<String>,
    /// Inclusive upper bound on `created_at`, unparsed.
    pub date_to: Option<String>,
}

impl TaskFilter {
    /// Build from raw query pairs. Multi-valued keys may repeat or be
    /// comma-separated. Unknown enum values are rejected; unknown keys are
    /// ignored.
    pub fn from_query_pairs(pairs: &[(String, String)]) -> Result<Self, ApiError> {
        let mut filter = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "priority" => {
                    for raw in split_multi(value) {
                        filter.priorities.push(raw.parse().map_err(ApiError::Validation)?);
                    }
                }
                "status" => {
                    for raw in split_multi(value) {
                        filter.statuses.push(raw.parse().map_err(ApiError::Validation)?);
                    }
                }
                "title_query" => filter.title_query = non_empty(value),
                "date_from" => filter.date_from = non_empty(value),
                "date_to" => filter.date_to = non_empty(value),
                _ => {}
            }
        }
        Ok(filter)
    }

    pub fn is_empty(&self) -> bool {
        self.title_query.is_none()
            && self.priorities.is_empty()
            && self.statuses.is_empty()
            && self.date_from.is_none()
            && self.date_to.is_none()
    }

    /// Keep the tasks satisfying every supplied predicate, in input order.
    pub fn apply(&self, tasks: Vec<Task>) -> Vec<Task> {
        if self.is_empty() {
            return tasks;
        }
        let range = self.date_range();
        let query = self.title_query.as_deref().map(str::to_lowercase);
        tasks
            .into_iter()
            .filter(|task| self.matches(task, query.as_deref(), range.as_ref()))
            .collect()
    }

    fn matches(&self, task: &Task, query: Option<&str>, range: Option<&DateRange>) -> bool {
        if let Some(q) = query {
            if !text_matches(task, q) {
                return false;
            }
        }
        if !self.priorities.is_empty() && !self.priorities.contains(&task.priority) {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&task.status) {
            return false;
        }
        if let Some(range) = range {
            if range.from.is_some_and(|from| task.created_at < from) {
                return false;
            }
            if range.to.is_some_and(|to| task.created_at > to) {
                return false;
            }
        }
        true
    }

    /// Parsed date bounds, or `None` when there are no bounds or either
    /// supplied bound fails to parse (the date predicate is then skipped).
    fn date_range(&self) -> Option<DateRange> {
        if self.date_from.is_none() && self.date_to.is_none() {
            return None;
        }
        let from = match &self.date_from {
            Some(raw) => Some(parse_timestamp(raw)?),
            None => None,
        };
        let to = match &self.date_to {
            Some(raw) => Some(parse_timestamp(raw)?),
            None => None,
        };
        Some(DateRange { from, to })
    }
}

struct DateRange {
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
}

fn split_multi(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn text_matches(task: &Task, lowered_query: &str) -> bool {
    task.title.to_lowercase().contains(lowered_query)
        || task.details.to_lowercase().contains(lowered_query)
}

/// Parse an ISO-8601 bound: RFC 3339, a naive datetime, or a bare date
/// (midnight). Naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Tasks whose title or details contain `query`, case-insensitively.
pub fn search(tasks: Vec<Task>, query: &str) -> Vec<Task> {
    let lowered = query.to_lowercase();
    tasks.into_iter().filter(|t| text_matches(t, &lowered)).collect()
}

/// Totals by status and priority. Every enum key is present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskStats {
    pub total: usize,
    pub by_status: BTreeMap<&'static str, usize>,
    pub by_priority: BTreeMap<&'static str, usize>,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let mut by_status: BTreeMap<&'static str, usize> =
            TaskStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect();
        let mut by_priority: BTreeMap<&'static str, usize> =
            Priority::ALL.iter().map(|p| (p.as_str(), 0)).collect();
        for task in tasks {
            *by_status.entry(task.status.as_str()).or_default() += 1;
            *by_priority.entry(task.priority.as_str()).or_default() += 1;
        }
        Self {
            total: tasks.len(),
            by_status,
            by_priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn task(title: &str, priority: Priority, status: TaskStatus) -> Task {
        let mut t = Task::new(title, "", priority);
        t.status = status;
        t
    }

    fn dated(title: &str, y: i32, m: u32, d: u32) -> Task {
        let mut t = Task::new(title, "", Priority::Medium);
        t.created_at = Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap();
        t
    }

    fn titles(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.title.as_str()).collect()
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn sample() -> Vec<Task> {
        vec![
            task("first", Priority::High, TaskStatus::Pending),
            task("second", Priority::Low, TaskStatus::Done),
        ]
    }

    #[test]
    fn empty_filter_is_identity() {
        let tasks = sample();
        assert_eq!(TaskFilter::default().apply(tasks.clone()), tasks);
    }

    #[test]
    fn priority_and_status_predicates() {
        let by_priority = TaskFilter {
            priorities: vec![Priority::High],
            ..Default::default()
        };
        assert_eq!(titles(&by_priority.apply(sample())), vec!["first"]);

        let by_status = TaskFilter {
            statuses: vec![TaskStatus::Done],
            ..Default::default()
        };
        assert_eq!(titles(&by_status.apply(sample())), vec!["second"]);

        let both = TaskFilter {
            priorities: vec![Priority::High],
            statuses: vec![TaskStatus::Done],
            ..Default::default()
        };
        assert!(both.apply(sample()).is_empty());
    }

    #[test]
    fn membership_accepts_any_listed_value() {
        let filter = TaskFilter {
            priorities: vec![Priority::High, Priority::Low],
            ..Default::default()
        };
        assert_eq!(filter.apply(sample()).len(), 2);
    }

    #[test]
    fn title_query_matches_title_or_details() {
        let tasks = vec![
            Task::new("Groceries", "buy MILK", Priority::Low),
            Task::new("Milk run", "", Priority::Low),
            Task::new("Other", "", Priority::Low),
        ];
        let filter = TaskFilter {
            title_query: Some("milk".into()),
            ..Default::default()
        };
        assert_eq!(titles(&filter.apply(tasks)), vec!["Groceries", "Milk run"]);
    }

    #[test]
    fn date_bounds_are_inclusive() {
        let tasks = vec![
            dated("jan", 2024, 1, 10),
            dated("feb", 2024, 2, 10),
            dated("mar", 2024, 3, 10),
        ];
        let filter = TaskFilter {
            date_from: Some("2024-02-10T12:00:00Z".into()),
            date_to: Some("2024-03-10T12:00:00".into()),
            ..Default::default()
        };
        assert_eq!(titles(&filter.apply(tasks.clone())), vec!["feb", "mar"]);

        let only_from = TaskFilter {
            date_from: Some("2024-02-01".into()),
            ..Default::default()
        };
        assert_eq!(titles(&only_from.apply(tasks)), vec!["feb", "mar"]);
    }

    #[test]
    fn unparseable_date_skips_date_predicate_only() {
        let tasks = vec![dated("jan", 2024, 1, 10), dated("feb", 2024, 2, 10)];
        let filter = TaskFilter {
            date_from: Some("2024-02-01".into()),
            date_to: Some("not-a-date".into()),
            title_query: Some("jan".into()),
            ..Default::default()
        };
        // The date range would exclude "jan", but it is ignored.
        assert_eq!(titles(&filter.apply(tasks)), vec!["jan"]);
    }

    #[test]
    fn results_satisfy_every_predicate() {
        let mut tasks = Vec::new();
        for p in Priority::ALL {
            for s in TaskStatus::ALL {
                tasks.push(task(&format!("{p}-{s}"), p, s));
            }
        }
        let filter = TaskFilter {
            priorities: vec![Priority::Medium, Priority::High],
            statuses: vec![TaskStatus::InProgress],
            ..Default::default()
        };
        let result = filter.apply(tasks.clone());
        assert_eq!(result.len(), 2);
        for t in &result {
            assert!(tasks.contains(t));
            assert!(filter.priorities.contains(&t.priority));
            assert_eq!(t.status, TaskStatus::InProgress);
        }
    }

    #[test]
    fn query_pairs_support_repeats_and_commas() {
        let filter = TaskFilter::from_query_pairs(&pairs(&[
            ("priority", "high"),
            ("priority", "low,medium"),
            ("status", "done"),
            ("title_query", "  "),
            ("page", "2"),
        ]))
        .unwrap();
        assert_eq!(filter.priorities, vec![Priority::High, Priority::Low, Priority::Medium]);
        assert_eq!(filter.statuses, vec![TaskStatus::Done]);
        assert!(filter.title_query.is_none());
    }

    #[test]
    fn query_pairs_reject_unknown_enum_values() {
        let err = TaskFilter::from_query_pairs(&pairs(&[("status", "archived")])).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn parse_timestamp_formats() {
        let midnight = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-05-01"), Some(midnight));
        assert_eq!(parse_timestamp("2024-05-01T00:00:00"), Some(midnight));
        assert_eq!(parse_timestamp("2024-05-01T02:00:00+02:00"), Some(midnight));
        assert_eq!(parse_timestamp("05/01/2024"), None);
    }

    #[test]
    fn search_is_case_insensitive() {
        assert_eq!(titles(&search(sample(), "FIR")), vec!["first"]);
        assert!(search(sample(), "zzz").is_empty());
    }

    #[test]
    fn stats_include_zero_counts() {
        let stats = TaskStats::from_tasks(&sample());
        assert_eq!(stats.total, 2);
        assert_eq!(stats.by_status["pending"], 1);
        assert_eq!(stats.by_status["in_progress"], 0);
        assert_eq!(stats.by_priority["medium"], 0);
        assert_eq!(stats.by_priority["high"], 1);
    }
}
