//! Table-ready data for the resource-level profile.
//!
//! `ProfileTable` is the final data structure before presentation: the
//! renderer iterates over headers and rows and applies formatting, no
//! computation. It can also be serialized to JSON directly.

use serde::{Deserialize, Serialize};

use crate::model::ParsedLog;
use crate::sort::sorted_resources;
use crate::Result;

/// A single data row of the profile table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Resource address (possibly a wildcard key after aggregation)
    pub resource: String,
    /// Remaining column values, as display-ready strings
    pub values: Vec<String>,
}

/// Table-ready profile data: one row per resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileTable {
    /// Column headers, starting with the resource column
    pub headers: Vec<String>,
    /// Data rows, in the order requested by the sort spec
    pub rows: Vec<TableRow>,
}

impl ProfileTable {
    /// Build a table from a (usually aggregated) log, ordered by the
    /// given sort spec.
    pub fn from_log(log: &ParsedLog, sort_spec: &str) -> Result<Self> {
        let headers = ["resource", "n", "tot_time", "idx_creation", "idx_created", "status"]
            .map(String::from)
            .to_vec();

        let mut rows = Vec::with_capacity(log.resources.len());
        for name in sorted_resources(log, sort_spec)? {
            let metric = &log.resources[&name];
            rows.push(TableRow {
                resource: name,
                values: vec![
                    metric.num_calls.to_string(),
                    metric.total_time.to_string(),
                    metric.modification_started_index.to_string(),
                    metric.modification_completed_index.to_string(),
                    metric.after_status.to_string(),
                ],
            });
        }

        Ok(ProfileTable { headers, rows })
    }
}
