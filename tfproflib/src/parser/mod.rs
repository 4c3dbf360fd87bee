//! The event parser: a line-by-line classifier over Terraform output.
//!
//! Each run phase (refresh, plan, apply) has an ordered list of handlers.
//! A handler inspects one line and, when it recognizes it, records the
//! event in the [`ParsedLog`] and claims the line. The driver offers every
//! line to the refresh handlers first, then plan, then apply; the first
//! family to claim a line ends the scan for that line. Lines nobody
//! claims (headers, diff bodies, free text) are ignored.
//!
//! Handlers distinguish "this line is not for me" (no match, scan goes
//! on) from "this line is for me but broken" (a [`MalformedLine`] error
//! that aborts the whole parse).
//!
//! [`MalformedLine`]: crate::TfProfError::MalformedLine

mod apply;
mod plan;
mod refresh;

use std::io::BufRead;

use crate::error::TfProfError;
use crate::model::ParsedLog;
use crate::text::strip_ansi;
use crate::Result;

/// A line handler: returns whether it claimed the line.
pub type Handler = fn(&str, &mut ParsedLog) -> Result<bool>;

/// Character class matching a fully qualified resource address
/// (module path, indexing, quotes, hyphenated names and string keys
/// with spaces). Simplified, but it will do.
pub(crate) const RESOURCE_NAME: &str = r#"[0-9a-zA-Z_. \[\]"/:-]+"#;

/// Handlers for the refresh phase, in priority order.
pub const REFRESH_HANDLERS: &[Handler] = &[refresh::refreshing];

/// Handlers for the plan phase, in priority order.
pub const PLAN_HANDLERS: &[Handler] = &[
    plan::plan_start,
    plan::tainted,
    plan::explicit_replace,
    plan::will_be_destroyed,
    plan::will_be_modified,
    plan::forced_replace,
    plan::will_be_created,
];

/// Handlers for the apply phase, in priority order.
pub const APPLY_HANDLERS: &[Handler] = &[
    apply::creation_started,
    apply::creation_completed,
    apply::operation_failed,
    apply::destruction_started,
    apply::destruction_completed,
    apply::modification_started,
    apply::modification_completed,
];

/// Parse a Terraform log into a [`ParsedLog`].
///
/// Reads the input line by line, strips terminal formatting, and applies
/// the phase handlers to each line. Fails fast on the first malformed
/// line; a failed parse yields no partial result.
pub fn parse<R: BufRead>(input: R) -> Result<ParsedLog> {
    let mut log = ParsedLog::new();
    for line in input.lines() {
        let line = line?;
        parse_line(&strip_ansi(&line), &mut log)?;
    }
    Ok(log)
}

/// Offer one (already cleaned) line to the handler families in order.
pub fn parse_line(line: &str, log: &mut ParsedLog) -> Result<()> {
    if run_family(REFRESH_HANDLERS, line, log)? {
        log.contains_refresh = true;
        return Ok(());
    }
    if run_family(PLAN_HANDLERS, line, log)? {
        log.contains_plan = true;
        return Ok(());
    }
    if run_family(APPLY_HANDLERS, line, log)? {
        log.contains_apply = true;
    }
    Ok(())
}

fn run_family(handlers: &[Handler], line: &str, log: &mut ParsedLog) -> Result<bool> {
    for handler in handlers {
        if handler(line, log)? {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(crate) fn malformed(stage: &'static str, line: &str) -> TfProfError {
    TfProfError::MalformedLine {
        stage,
        line: line.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Operation, Status};

    #[test]
    fn test_parse_sets_phase_flags() {
        let input = "\
aws_instance.web: Refreshing state... [id=i-1234]
Terraform will perform the following actions:
  # aws_instance.web will be updated in-place
aws_instance.web: Modifying... [id=i-1234]
aws_instance.web: Modifications complete after 4s [id=i-1234]
";
        let log = parse(input.as_bytes()).unwrap();
        assert!(log.contains_refresh);
        assert!(log.contains_plan);
        assert!(log.contains_apply);
    }

    #[test]
    fn test_unrecognized_lines_are_ignored() {
        let input = "\
Initializing the backend...

Plan: 1 to add, 0 to change, 0 to destroy.
      + tags = {}
";
        let log = parse(input.as_bytes()).unwrap();
        assert!(log.resources.is_empty());
        assert!(!log.contains_refresh);
        assert!(!log.contains_plan);
        assert!(!log.contains_apply);
    }

    #[test]
    fn test_create_lifecycle() {
        let input = "\
foo: Creating...
foo: Creation complete after 10s [id=xyz]
";
        let log = parse(input.as_bytes()).unwrap();
        let metric = &log.resources["foo"];
        assert_eq!(metric.num_calls, 1);
        assert_eq!(metric.total_time, 10_000);
        assert_eq!(metric.after_status, Status::Created);
        assert_eq!(metric.operation, Operation::Create);
    }

    #[test]
    fn test_destroy_then_create_is_replace() {
        let input = "\
foo: Destroying... [id=abc]
foo: Destruction complete after 2s
foo: Creating...
foo: Creation complete after 3s [id=def]
";
        let log = parse(input.as_bytes()).unwrap();
        assert_eq!(log.resources["foo"].operation, Operation::Replace);
        assert_eq!(log.resources["foo"].after_status, Status::Created);
    }

    #[test]
    fn test_event_counter_is_global_across_resources() {
        let input = "\
a: Creating...
b: Creating...
b: Creation complete after 1s [id=b]
a: Creation complete after 1s [id=a]
";
        let log = parse(input.as_bytes()).unwrap();
        let a = &log.resources["a"];
        let b = &log.resources["b"];

        assert_eq!(a.modification_started_event, 0);
        assert_eq!(b.modification_started_event, 1);
        assert_eq!(b.modification_completed_event, 2);
        assert_eq!(a.modification_completed_event, 3);

        // Per-kind ranks advance independently of the global counter.
        assert_eq!(a.modification_started_index, 0);
        assert_eq!(b.modification_started_index, 1);
        assert_eq!(b.modification_completed_index, 0);
        assert_eq!(a.modification_completed_index, 1);
        assert_eq!(log.current_event, 4);
    }

    #[test]
    fn test_hyphenated_address_is_recognized() {
        let input = "\
module.my-mod.aws_instance.web: Creating...
module.my-mod.aws_instance.web: Creation complete after 3s [id=i-1]
";
        let log = parse(input.as_bytes()).unwrap();
        let metric = &log.resources["module.my-mod.aws_instance.web"];
        assert_eq!(metric.total_time, 3000);
        assert_eq!(metric.after_status, Status::Created);
    }

    #[test]
    fn test_quoted_string_keys_are_recognized() {
        let input = "\
aws_ssm_parameter.p[\"a-b\"]: Creating...
module.vpc.aws_subnet.s[\"eu west\"]: Refreshing state... [id=subnet-1]
";
        let log = parse(input.as_bytes()).unwrap();
        assert!(log.resources.contains_key("aws_ssm_parameter.p[\"a-b\"]"));
        assert!(log
            .resources
            .contains_key("module.vpc.aws_subnet.s[\"eu west\"]"));
    }

    #[test]
    fn test_malformed_creating_line_is_fatal() {
        let err = parse("Creating...\n".as_bytes()).unwrap_err();
        match err {
            TfProfError::MalformedLine { line, .. } => assert_eq!(line, "Creating..."),
            other => panic!("expected MalformedLine, got {other:?}"),
        }
    }

    #[test]
    fn test_completion_without_start_is_fatal() {
        let err = parse("foo: Creation complete after 10s [id=xyz]\n".as_bytes()).unwrap_err();
        assert!(matches!(err, TfProfError::ResourceNotFound(_)));
    }

    #[test]
    fn test_formatted_lines_are_cleaned_before_matching() {
        let input = "\x1b[1mfoo: Creating...\x1b[0m\n";
        let log = parse(input.as_bytes()).unwrap();
        assert!(log.resources.contains_key("foo"));
    }

    #[test]
    fn test_resource_count_matches_distinct_start_lines() {
        let input = "\
a.b: Refreshing state...
mod.c.d[0]: Creating...
mod.c.d[1]: Creating...
mod.c.d[0]: Creation complete after 1s [id=x]
mod.c.d[1]: Creation complete after 1s [id=y]
";
        let log = parse(input.as_bytes()).unwrap();
        assert_eq!(log.resources.len(), 3);
    }
}
