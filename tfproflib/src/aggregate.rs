//! Loop-instance aggregation.
//!
//! Resources created by `count` or `for_each` loops show up in the log as
//! `resource[0]`, `resource[1]`, ... or `resource["key"]`. After parsing,
//! these are merged into a single record under a wildcard key
//! (`resource[*]`) so that tables and stats report the loop once.

use crate::model::{Operation, ParsedLog, ResourceMetric, Status, UNSET};
use crate::Result;

/// Merge loop-instance resources in a parsed log.
///
/// Pure transform: the input log is left untouched and a new registry is
/// returned. The error return is reserved for interface symmetry with
/// [`parse`](crate::parse); aggregation cannot fail on a well-formed log.
pub fn aggregate(log: &ParsedLog) -> Result<ParsedLog> {
    let mut result = ParsedLog {
        resources: Default::default(),
        ..log.clone()
    };

    // Names iterate in lexicographic order (BTreeMap), so members of a
    // loop are adjacent: they share a literal prefix up to the last '['.
    let mut run: Vec<&str> = Vec::new();
    for name in log.resources.keys() {
        match run.last() {
            Some(last) if !mergeable(name, last) => {
                let (key, metric) = merge_run(log, &run);
                result.resources.insert(key, metric);
                run.clear();
            }
            _ => {}
        }
        run.push(name);
    }
    if !run.is_empty() {
        let (key, metric) = merge_run(log, &run);
        result.resources.insert(key, metric);
    }

    Ok(result)
}

/// Two names are mergeable when both are indexed (end in `]`) and the
/// part before the final bracket group is identical. Index values are
/// not compared: a numeric and a quoted-string index under the same
/// prefix merge as well.
fn mergeable(a: &str, b: &str) -> bool {
    if !a.ends_with(']') || !b.ends_with(']') {
        return false;
    }
    match (a.rfind('['), b.rfind('[')) {
        (Some(i), Some(j)) => a[..i] == b[..j],
        _ => false,
    }
}

/// Wildcard key for a run: the shared prefix plus `[*]`.
fn wildcard_name(name: &str) -> String {
    match name.rfind('[') {
        Some(i) => format!("{}[*]", &name[..i]),
        None => name.to_string(),
    }
}

fn merge_run(log: &ParsedLog, run: &[&str]) -> (String, ResourceMetric) {
    // A singleton is emitted unchanged, without renaming.
    if let [name] = run {
        return (name.to_string(), log.resources[*name].clone());
    }

    let metrics: Vec<&ResourceMetric> = run.iter().map(|name| &log.resources[*name]).collect();
    (wildcard_name(run[0]), merge_metrics(&metrics))
}

/// Merge the metrics of one run.
///
/// `num_calls` becomes the run length and `total_time` the sum of the
/// members. The started index/event keep the minimum set value (first to
/// start), the completed index/event the maximum (last to finish). Each
/// status field independently keeps its value if all members agree and
/// collapses to `Multiple` otherwise.
fn merge_metrics(metrics: &[&ResourceMetric]) -> ResourceMetric {
    let mut merged = ResourceMetric {
        num_calls: metrics.len() as i64,
        total_time: 0,
        ..ResourceMetric::default()
    };

    let mut before = None;
    let mut after = None;
    let mut desired = None;
    let mut operation = None;

    for metric in metrics {
        merged.total_time += metric.total_time;

        if metric.modification_started_index != UNSET {
            merged.modification_started_index = min_set(
                merged.modification_started_index,
                metric.modification_started_index,
            );
        }
        if metric.modification_started_event != UNSET {
            merged.modification_started_event = min_set(
                merged.modification_started_event,
                metric.modification_started_event,
            );
        }
        merged.modification_completed_index = merged
            .modification_completed_index
            .max(metric.modification_completed_index);
        merged.modification_completed_event = merged
            .modification_completed_event
            .max(metric.modification_completed_event);

        before = collapse(before, metric.before_status, Status::Multiple);
        after = collapse(after, metric.after_status, Status::Multiple);
        desired = collapse(desired, metric.desired_status, Status::Multiple);
        operation = collapse(operation, metric.operation, Operation::Multiple);
    }

    merged.before_status = before.unwrap_or_default();
    merged.after_status = after.unwrap_or_default();
    merged.desired_status = desired.unwrap_or_default();
    merged.operation = operation.unwrap_or_default();
    merged
}

fn min_set(current: i64, value: i64) -> i64 {
    if current == UNSET {
        value
    } else {
        current.min(value)
    }
}

fn collapse<T: PartialEq>(acc: Option<T>, value: T, multiple: T) -> Option<T> {
    match acc {
        None => Some(value),
        Some(prev) if prev == value => Some(value),
        Some(_) => Some(multiple),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn metric(total_time: i64, after: Status) -> ResourceMetric {
        ResourceMetric {
            total_time,
            after_status: after,
            ..ResourceMetric::default()
        }
    }

    #[test]
    fn test_mergeable_names() {
        assert!(mergeable("r[1]", "r[2]"));
        assert!(mergeable(r#"r["a"]"#, "r[10]"));
        assert!(mergeable("module.x[0].r[1]", "module.x[0].r[2]"));
        assert!(!mergeable("r[1]", "s[1]"));
        assert!(!mergeable("r[1]", "r"));
        assert!(!mergeable("r", "s"));
    }

    #[test]
    fn test_aggregates_a_count_loop() {
        let mut log = ParsedLog::new();
        for i in 0..3 {
            log.resources
                .insert(format!("r[{}]", i), metric(1, Status::Created));
        }

        let result = aggregate(&log).unwrap();
        assert_eq!(result.resources.len(), 1);
        let merged = &result.resources["r[*]"];
        assert_eq!(merged.num_calls, 3);
        assert_eq!(merged.total_time, 3);
        assert_eq!(merged.after_status, Status::Created);
    }

    #[test]
    fn test_mixed_statuses_collapse_to_multiple() {
        let mut log = ParsedLog::new();
        log.resources.insert("r[0]".into(), metric(1, Status::Created));
        log.resources.insert("r[1]".into(), metric(1, Status::Failed));
        log.resources
            .insert("r[2]".into(), metric(1, Status::NotCreated));

        let result = aggregate(&log).unwrap();
        assert_eq!(result.resources["r[*]"].after_status, Status::Multiple);
    }

    #[test]
    fn test_singletons_pass_through_unchanged() {
        let mut log = ParsedLog::new();
        log.resources
            .insert("aws_instance.web".into(), metric(5, Status::Created));
        log.resources.insert("r[7]".into(), metric(2, Status::Created));

        let result = aggregate(&log).unwrap();
        assert_eq!(result.resources.len(), 2);
        // A lone indexed resource keeps its key and fields.
        assert_eq!(result.resources["r[7]"].num_calls, 1);
        assert_eq!(result.resources["aws_instance.web"].total_time, 5);
    }

    #[test]
    fn test_started_takes_min_completed_takes_max() {
        let mut log = ParsedLog::new();
        for (i, (started, completed)) in [(3, 8), (1, 9), (2, 7)].into_iter().enumerate() {
            let m = ResourceMetric {
                modification_started_index: started,
                modification_started_event: started,
                modification_completed_index: completed,
                modification_completed_event: completed,
                ..ResourceMetric::default()
            };
            log.resources.insert(format!("r[{}]", i), m);
        }

        let merged = aggregate(&log).unwrap().resources["r[*]"].clone();
        assert_eq!(merged.modification_started_index, 1);
        assert_eq!(merged.modification_started_event, 1);
        assert_eq!(merged.modification_completed_index, 9);
        assert_eq!(merged.modification_completed_event, 9);
    }

    #[test]
    fn test_unstarted_members_do_not_win_the_minimum() {
        let mut log = ParsedLog::new();
        log.resources.insert(
            "r[0]".into(),
            ResourceMetric {
                modification_started_index: UNSET,
                ..ResourceMetric::default()
            },
        );
        log.resources.insert(
            "r[1]".into(),
            ResourceMetric {
                modification_started_index: 4,
                ..ResourceMetric::default()
            },
        );

        let merged = aggregate(&log).unwrap().resources["r[*]"].clone();
        assert_eq!(merged.modification_started_index, 4);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let input = "\
r[0]: Creating...
r[1]: Creating...
r[0]: Creation complete after 1s [id=a]
r[1]: Creation complete after 1s [id=b]
s.t: Creating...
s.t: Creation complete after 2s [id=c]
";
        let log = parse(input.as_bytes()).unwrap();
        let once = aggregate(&log).unwrap();
        let twice = aggregate(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_preserves_counters_and_flags() {
        let input = "\
Terraform will perform the following actions:
  # r will be created
r: Creating...
r: Creation complete after 1s [id=a]
";
        let log = parse(input.as_bytes()).unwrap();
        let result = aggregate(&log).unwrap();
        assert!(result.contains_plan);
        assert!(result.contains_apply);
        assert_eq!(result.current_event, log.current_event);
    }

    #[test]
    fn test_input_is_not_mutated() {
        let mut log = ParsedLog::new();
        log.resources.insert("r[0]".into(), metric(1, Status::Created));
        log.resources.insert("r[1]".into(), metric(1, Status::Created));
        let before = log.clone();

        let _ = aggregate(&log).unwrap();
        assert_eq!(log, before);
    }
}
