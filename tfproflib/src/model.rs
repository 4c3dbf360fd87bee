//! Core data structures for Terraform run profiling.
//!
//! A parse produces a [`ParsedLog`]: per-resource [`ResourceMetric`]s keyed
//! by the fully qualified resource address, plus the process state the
//! handlers thread through the parse (monotonic counters and phase flags).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TfProfError;
use crate::Result;

/// Sentinel for "not set" / "not finished yet" in indices, events and times.
pub const UNSET: i64 = -1;

/// Lifecycle state of a resource, before, after or as desired by a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Nothing is known about this resource (yet)
    #[default]
    Unknown,
    /// The resource does not exist (destroyed, or creation never finished)
    NotCreated,
    /// The resource exists
    Created,
    /// The last operation on the resource failed
    Failed,
    /// Aggregated resources disagree on their status
    Multiple,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::Unknown => "Unknown",
            Status::NotCreated => "NotCreated",
            Status::Created => "Created",
            Status::Failed => "Failed",
            Status::Multiple => "Multiple",
        };
        write!(f, "{}", s)
    }
}

/// The operation Terraform applied to a resource.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    /// No operation seen
    #[default]
    None,
    Create,
    Modify,
    /// Destroy followed by Create on the same address
    Replace,
    Destroy,
    /// Aggregated resources disagree on their operation
    Multiple,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Operation::None => "None",
            Operation::Create => "Create",
            Operation::Modify => "Modify",
            Operation::Replace => "Replace",
            Operation::Destroy => "Destroy",
            Operation::Multiple => "Multiple",
        };
        write!(f, "{}", s)
    }
}

/// All metrics recorded for one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceMetric {
    /// Number of underlying instances this record represents.
    /// Always 1 before aggregation.
    pub num_calls: i64,
    /// Milliseconds spent on the terminal operation, [`UNSET`] until a
    /// completion line is seen.
    pub total_time: i64,
    /// Resource was the Nth to start a modification
    pub modification_started_index: i64,
    /// Resource was the Nth to complete a modification
    pub modification_completed_index: i64,
    /// Global event index at which the modification started. Global events
    /// can be compared chronologically across resources.
    pub modification_started_event: i64,
    /// Global event index at which the modification completed
    pub modification_completed_event: i64,
    /// State before the run (currently only known after aggregation)
    pub before_status: Status,
    /// State after the apply phase
    pub after_status: Status,
    /// State the plan phase promised
    pub desired_status: Status,
    /// Operation the apply phase performed
    pub operation: Operation,
}

impl Default for ResourceMetric {
    fn default() -> Self {
        Self {
            num_calls: 1,
            total_time: UNSET,
            modification_started_index: UNSET,
            modification_completed_index: UNSET,
            modification_started_event: UNSET,
            modification_completed_event: UNSET,
            before_status: Status::Unknown,
            after_status: Status::Unknown,
            desired_status: Status::Unknown,
            operation: Operation::None,
        }
    }
}

/// The result of parsing a Terraform log: one [`ResourceMetric`] per
/// resource address, plus the counters and phase flags accumulated while
/// parsing.
///
/// The counters are threaded through the handlers as plain fields rather
/// than ambient globals, so handlers stay deterministic and testable in
/// isolation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedLog {
    /// Per-resource metrics, keyed by fully qualified address
    pub resources: BTreeMap<String, ResourceMetric>,
    /// Next rank handed out to a modification start
    pub current_modification_started_index: i64,
    /// Next rank handed out to a modification completion
    pub current_modification_completed_index: i64,
    /// Next global event index. Any start or completion of any resource's
    /// modification is an event.
    pub current_event: i64,
    /// A refresh-phase line was recognized
    pub contains_refresh: bool,
    /// A plan-phase line was recognized
    pub contains_plan: bool,
    /// An apply-phase line was recognized
    pub contains_apply: bool,
}

impl ParsedLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource. A no-op if the address was seen before;
    /// otherwise a default metric is inserted.
    pub fn register(&mut self, resource: &str) {
        self.resources
            .entry(resource.to_string())
            .or_insert_with(ResourceMetric::default);
    }

    fn metric_mut(&mut self, resource: &str) -> Result<&mut ResourceMetric> {
        self.resources
            .get_mut(resource)
            .ok_or_else(|| TfProfError::ResourceNotFound(resource.to_string()))
    }

    /// Set the total time (in milliseconds) spent on a resource
    pub fn set_total_time(&mut self, resource: &str, millis: i64) -> Result<()> {
        self.metric_mut(resource)?.total_time = millis;
        Ok(())
    }

    /// Set the rank of a resource among all modification starts
    pub fn set_modification_started_index(&mut self, resource: &str, idx: i64) -> Result<()> {
        self.metric_mut(resource)?.modification_started_index = idx;
        Ok(())
    }

    /// Set the rank of a resource among all modification completions
    pub fn set_modification_completed_index(&mut self, resource: &str, idx: i64) -> Result<()> {
        self.metric_mut(resource)?.modification_completed_index = idx;
        Ok(())
    }

    /// Set the global event index at which a resource's modification started
    pub fn set_modification_started_event(&mut self, resource: &str, event: i64) -> Result<()> {
        self.metric_mut(resource)?.modification_started_event = event;
        Ok(())
    }

    /// Set the global event index at which a resource's modification completed
    pub fn set_modification_completed_event(&mut self, resource: &str, event: i64) -> Result<()> {
        self.metric_mut(resource)?.modification_completed_event = event;
        Ok(())
    }

    /// Set the status a resource ended the run in
    pub fn set_after_status(&mut self, resource: &str, status: Status) -> Result<()> {
        self.metric_mut(resource)?.after_status = status;
        Ok(())
    }

    /// Set the status the plan phase promised for a resource
    pub fn set_desired_status(&mut self, resource: &str, status: Status) -> Result<()> {
        self.metric_mut(resource)?.desired_status = status;
        Ok(())
    }

    /// Record the operation applied to a resource.
    ///
    /// A Destroy followed by a Create on the same address is Terraform's
    /// destroy-then-recreate pattern and is recorded as Replace. All other
    /// transitions overwrite the previous value.
    pub fn set_operation(&mut self, resource: &str, op: Operation) -> Result<()> {
        let metric = self.metric_mut(resource)?;
        if metric.operation == Operation::Destroy && op == Operation::Create {
            metric.operation = Operation::Replace;
        } else {
            metric.operation = op;
        }
        Ok(())
    }
}
