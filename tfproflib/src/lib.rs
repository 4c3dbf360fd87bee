//! # tfproflib
//!
//! A library for profiling Terraform runs from their logs.
//!
//! ## Overview
//!
//! Terraform writes an append-only, line-oriented log while it refreshes,
//! plans and applies. This library turns that free text into a structured
//! record of what happened to each managed resource:
//!
//! - **Parsing**: a line-by-line classifier recognizes lifecycle events
//!   (refresh, plan promises, creation/modification/destruction starts and
//!   completions, failures) and accumulates per-resource metrics.
//! - **Aggregation**: resources produced by `count`/`for_each` loops
//!   (`r[0]`, `r[1]`, ...) are merged into one record under a wildcard key
//!   (`r[*]`).
//! - **Reporting**: sorted tables, rollup statistics, log filtering and
//!   gnuplot Gantt output over the parsed data.
//!
//! The parser is strictly sequential: each line's interpretation can
//! depend on everything before it (global event ordering, previously
//! registered resources). ANSI terminal formatting is stripped before any
//! pattern sees a line.
//!
//! ## Example
//!
//! ```rust
//! use tfproflib::{aggregate, parse, Status};
//!
//! let log = "\
//! aws_instance.web[0]: Creating...
//! aws_instance.web[1]: Creating...
//! aws_instance.web[0]: Creation complete after 10s [id=i-1]
//! aws_instance.web[1]: Creation complete after 20s [id=i-2]
//! ";
//!
//! let parsed = parse(log.as_bytes()).unwrap();
//! assert_eq!(parsed.resources.len(), 2);
//!
//! let aggregated = aggregate(&parsed).unwrap();
//! let merged = &aggregated.resources["aws_instance.web[*]"];
//! assert_eq!(merged.num_calls, 2);
//! assert_eq!(merged.total_time, 30_000);
//! assert_eq!(merged.after_status, Status::Created);
//! ```

pub mod aggregate;
pub mod duration;
pub mod error;
pub mod filter;
pub mod graph;
pub mod model;
pub mod parser;
pub mod sort;
pub mod stats;
pub mod table;
pub mod text;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub use aggregate::aggregate;
pub use duration::{format_duration, parse_duration};
pub use error::TfProfError;
pub use filter::{clean_pattern, filter_lines};
pub use graph::{gnuplot_script, repair_unfinished};
pub use model::{Operation, ParsedLog, ResourceMetric, Status, UNSET};
pub use parser::parse;
pub use sort::sorted_resources;
pub use stats::{all_stats, Stat};
pub use table::{ProfileTable, TableRow};
pub use text::strip_ansi;

/// Result type for tfproflib operations
pub type Result<T> = std::result::Result<T, TfProfError>;

/// Parse a Terraform log file into a [`ParsedLog`].
pub fn parse_file(path: &Path) -> Result<ParsedLog> {
    let file = File::open(path).map_err(|source| TfProfError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    parse(BufReader::new(file))
}
