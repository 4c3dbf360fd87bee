//! Display ordering for parsed logs.
//!
//! A sort spec is a comma-separated list of `column=asc|desc` pairs, e.g.
//! `"tot_time=desc,resource=asc"`. Columns are compared in the order they
//! appear; the first column that differs decides.

use std::cmp::Ordering;

use crate::error::TfProfError;
use crate::model::{ParsedLog, ResourceMetric, Status};
use crate::Result;

/// One sortable column of the resource table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Resource,
    NumCalls,
    TotalTime,
    StartedIndex,
    CompletedIndex,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy)]
struct SortKey {
    column: Column,
    order: Order,
}

fn parse_spec(spec: &str) -> Result<Vec<SortKey>> {
    let invalid = || TfProfError::InvalidSortSpec(spec.to_string());

    spec.split(',')
        .map(|item| {
            let (column, order) = item.split_once('=').ok_or_else(invalid)?;
            let column = match column {
                "resource" => Column::Resource,
                "n" => Column::NumCalls,
                "tot_time" => Column::TotalTime,
                "idx_creation" => Column::StartedIndex,
                "idx_created" => Column::CompletedIndex,
                "status" => Column::Status,
                _ => return Err(invalid()),
            };
            let order = match order {
                "asc" => Order::Asc,
                "desc" => Order::Desc,
                _ => return Err(invalid()),
            };
            Ok(SortKey { column, order })
        })
        .collect()
}

// Gives statuses a stable rank for sorting.
fn status_rank(status: Status) -> i64 {
    match status {
        Status::Unknown => 0,
        Status::NotCreated => 1,
        Status::Created => 2,
        Status::Failed => 3,
        Status::Multiple => 4,
    }
}

fn compare(a: (&str, &ResourceMetric), b: (&str, &ResourceMetric), keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ordering = match key.column {
            Column::Resource => a.0.cmp(b.0),
            Column::NumCalls => a.1.num_calls.cmp(&b.1.num_calls),
            Column::TotalTime => a.1.total_time.cmp(&b.1.total_time),
            Column::StartedIndex => a
                .1
                .modification_started_index
                .cmp(&b.1.modification_started_index),
            Column::CompletedIndex => a
                .1
                .modification_completed_index
                .cmp(&b.1.modification_completed_index),
            Column::Status => status_rank(a.1.after_status).cmp(&status_rank(b.1.after_status)),
        };
        let ordering = match key.order {
            Order::Asc => ordering,
            Order::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Return the resource names of a log, ordered by the sort spec.
pub fn sorted_resources(log: &ParsedLog, spec: &str) -> Result<Vec<String>> {
    let keys = parse_spec(spec)?;

    let mut entries: Vec<(&str, &ResourceMetric)> = log
        .resources
        .iter()
        .map(|(name, metric)| (name.as_str(), metric))
        .collect();
    entries.sort_by(|a, b| compare(*a, *b, &keys));

    Ok(entries.into_iter().map(|(name, _)| name.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_with_times(entries: &[(&str, i64)]) -> ParsedLog {
        let mut log = ParsedLog::new();
        for (name, total_time) in entries {
            log.resources.insert(
                name.to_string(),
                ResourceMetric {
                    total_time: *total_time,
                    ..ResourceMetric::default()
                },
            );
        }
        log
    }

    #[test]
    fn test_sort_by_time_descending() {
        let log = log_with_times(&[("a", 10), ("b", 30), ("c", 20)]);
        let names = sorted_resources(&log, "tot_time=desc").unwrap();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_ties_fall_through_to_next_key() {
        let log = log_with_times(&[("b", 10), ("a", 10), ("c", 5)]);
        let names = sorted_resources(&log, "tot_time=desc,resource=asc").unwrap();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sort_by_name() {
        let log = log_with_times(&[("b", 1), ("a", 2)]);
        let names = sorted_resources(&log, "resource=asc").unwrap();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_invalid_specs_are_rejected() {
        let log = log_with_times(&[("a", 1)]);
        for bad in ["tot_time", "tot_time=up", "bogus=asc", ""] {
            assert!(
                matches!(
                    sorted_resources(&log, bad),
                    Err(TfProfError::InvalidSortSpec(_))
                ),
                "expected '{}' to be rejected",
                bad
            );
        }
    }
}
