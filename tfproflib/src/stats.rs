//! High-level rollup statistics over a parsed log.
//!
//! These are straight sums/counts/maxima over the per-resource metrics,
//! grouped into the sections the `stats` command prints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::ParsedLog;
use crate::duration::format_duration;

/// One key/value row in the stats output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub name: String,
    pub value: String,
}

impl Stat {
    fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// All stats sections in display order.
pub fn all_stats(log: &ParsedLog) -> Vec<Vec<Stat>> {
    vec![
        basic_stats(log),
        time_stats(log),
        status_stats(log),
        module_stats(log),
    ]
}

/// Number of resources in the configuration, counting loop instances.
pub fn basic_stats(log: &ParsedLog) -> Vec<Stat> {
    let num_calls: i64 = log.resources.values().map(|m| m.num_calls).sum();
    vec![Stat::new(
        "Number of resources in configuration",
        num_calls.to_string(),
    )]
}

/// Cumulative and worst-case apply times.
pub fn time_stats(log: &ParsedLog) -> Vec<Stat> {
    let mut total_seconds = 0;
    let mut slowest_time = -1;
    let mut slowest_resource = String::new();

    for (name, metric) in &log.resources {
        total_seconds += metric.total_time.max(0) / 1000;
        if metric.total_time > slowest_time {
            slowest_time = metric.total_time;
            slowest_resource = name.clone();
        }
    }

    vec![
        Stat::new("Cumulative duration", format_duration(total_seconds)),
        Stat::new("Longest apply time", format_duration(slowest_time.max(0) / 1000)),
        Stat::new("Longest apply resource", slowest_resource),
    ]
}

/// Per-status resource counts.
pub fn status_stats(log: &ParsedLog) -> Vec<Stat> {
    let mut counts: BTreeMap<String, i64> = BTreeMap::new();
    for metric in log.resources.values() {
        *counts.entry(metric.after_status.to_string()).or_default() += metric.num_calls;
    }

    counts
        .into_iter()
        .map(|(status, count)| {
            Stat::new(
                format!("No. resources in state {}", status),
                count.to_string(),
            )
        })
        .collect()
}

/// Module shape: number, size and depth of modules in the configuration.
pub fn module_stats(log: &ParsedLog) -> Vec<Stat> {
    let mut top_level: BTreeMap<String, i64> = BTreeMap::new();
    let mut leaf: BTreeMap<String, i64> = BTreeMap::new();
    let mut deepest_depth = 0;
    let mut deepest_name = "/".to_string();

    for (name, metric) in &log.resources {
        if let Some(module) = top_level_module(name) {
            *top_level.entry(module).or_default() += metric.num_calls;
        }
        if let Some(module) = leaf_module(name) {
            *leaf.entry(module).or_default() += metric.num_calls;
        }
        if module_depth(name) > deepest_depth {
            deepest_depth = module_depth(name);
            deepest_name = module_of(name);
        }
    }

    let (largest_top, largest_top_size) = largest(&top_level);
    let (largest_leaf, largest_leaf_size) = largest(&leaf);
    let largest_leaf = if largest_leaf == "/" {
        largest_leaf
    } else {
        format!("module.{}", largest_leaf)
    };

    vec![
        Stat::new("Number of top-level modules", top_level.len().to_string()),
        Stat::new("Largest top-level module", largest_top),
        Stat::new("Size of largest top-level module", largest_top_size.to_string()),
        Stat::new("Deepest module", deepest_name),
        Stat::new("Deepest module depth", deepest_depth.to_string()),
        Stat::new("Largest leaf module", largest_leaf),
        Stat::new("Size of largest leaf module", largest_leaf_size.to_string()),
    ]
}

fn largest(counts: &BTreeMap<String, i64>) -> (String, i64) {
    counts
        .iter()
        .max_by_key(|(_, count)| **count)
        .map(|(name, count)| (name.clone(), *count))
        .unwrap_or_else(|| ("/".to_string(), 0))
}

/// Top-level module of an address:
/// "module.mymod.aws_subnet.test" -> "module.mymod".
pub fn top_level_module(name: &str) -> Option<String> {
    let mut parts = name.split('.');
    match (parts.next(), parts.next()) {
        (Some("module"), Some(module)) => Some(format!("module.{}", module)),
        _ => None,
    }
}

/// Module nesting depth of an address:
/// "aws_subnet.test" -> 0, "module.a.module.b.aws_subnet.test" -> 2.
pub fn module_depth(name: &str) -> usize {
    let parts = name.split('.').count();
    parts.saturating_sub(2) / 2
}

/// Full module path of an address, without the resource itself:
/// "module.a.module.b.aws_subnet.test" -> "module.a.module.b".
pub fn module_of(name: &str) -> String {
    let parts: Vec<&str> = name.split('.').collect();
    parts[..parts.len().saturating_sub(2)].join(".")
}

/// Name of the deepest module an address belongs to, without parents:
/// "module.a.module.b.aws_subnet.test" -> "b".
pub fn leaf_module(name: &str) -> Option<String> {
    let parts: Vec<&str> = name.split('.').collect();
    let mut leaf = None;
    for window in parts.windows(2) {
        if window[0] == "module" {
            leaf = Some(window[1].to_string());
        }
    }
    leaf
}
