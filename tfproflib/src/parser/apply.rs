//! Apply-phase handlers.
//!
//! Start lines ("Creating...", "Destroying...", "Modifying...") register
//! the resource, record the operation and stamp the started rank and the
//! global event index. Completion lines ("... complete after <duration>")
//! record the apply time, the resulting status and the completed rank and
//! event index. Failure lines only mark the resource as failed; Terraform
//! prints them without timing information.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{malformed, RESOURCE_NAME};
use crate::duration::parse_duration;
use crate::model::{Operation, ParsedLog, Status};
use crate::Result;

fn start_regex(verb: &str) -> Regex {
    Regex::new(&format!(r"^({}): {}\.\.\.\s*(\[id=.*\])?\s*$", RESOURCE_NAME, verb)).unwrap()
}

fn complete_regex(phrase: &str) -> Regex {
    Regex::new(&format!(
        r"^({}): {} after (\S+)( .*)?$",
        RESOURCE_NAME, phrase
    ))
    .unwrap()
}

/// Record a modification start: register the resource, note the
/// operation, stamp the started rank and event, advance both counters.
fn modification_start(
    line: &str,
    log: &mut ParsedLog,
    phrase: &str,
    regex: &Regex,
    op: Operation,
    stage: &'static str,
) -> Result<bool> {
    if !line.contains(phrase) {
        return Ok(false);
    }
    let caps = regex.captures(line).ok_or_else(|| malformed(stage, line))?;
    let resource = &caps[1];

    log.register(resource);
    log.set_operation(resource, op)?;
    log.set_modification_started_index(resource, log.current_modification_started_index)?;
    log.set_modification_started_event(resource, log.current_event)?;
    log.current_modification_started_index += 1;
    log.current_event += 1;
    Ok(true)
}

/// Record a modification completion: parse the duration, note the
/// resulting status, stamp the completed rank and event, advance both
/// counters. The resource must have been registered before.
fn modification_complete(
    line: &str,
    log: &mut ParsedLog,
    phrase: &str,
    regex: &Regex,
    after: Status,
    stage: &'static str,
) -> Result<bool> {
    if !line.contains(phrase) {
        return Ok(false);
    }
    let caps = regex.captures(line).ok_or_else(|| malformed(stage, line))?;
    let resource = &caps[1];
    let millis = parse_duration(&caps[2])?;

    log.set_total_time(resource, millis)?;
    log.set_after_status(resource, after)?;
    log.set_modification_completed_index(resource, log.current_modification_completed_index)?;
    log.set_modification_completed_event(resource, log.current_event)?;
    log.current_modification_completed_index += 1;
    log.current_event += 1;
    Ok(true)
}

/// "aws_ssm_parameter.p1[2]: Creating..."
pub(super) fn creation_started(line: &str, log: &mut ParsedLog) -> Result<bool> {
    static RE: Lazy<Regex> = Lazy::new(|| start_regex("Creating"));
    modification_start(line, log, "Creating...", &RE, Operation::Create, "apply (creating)")
}

/// "aws_ssm_parameter.p1[2]: Creation complete after 1s [id=...]"
pub(super) fn creation_completed(line: &str, log: &mut ParsedLog) -> Result<bool> {
    static RE: Lazy<Regex> = Lazy::new(|| complete_regex("Creation complete"));
    modification_complete(
        line,
        log,
        "Creation complete after",
        &RE,
        Status::Created,
        "apply (created)",
    )
}

// Failure lines give us one line of context:
//   Error: creating SSM Parameter (/p/1): ValidationException: ...
//     status code: 400, request id: 77765932-...
//     with aws_ssm_parameter.bad[1],
// The deterministic trigger used here is a line ending in
// "with <resource>," regardless of the preamble.
static FAILED: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"with ({}),\s*$", RESOURCE_NAME)).unwrap());

/// "  with aws_ssm_parameter.bad[1],"
pub(super) fn operation_failed(line: &str, log: &mut ParsedLog) -> Result<bool> {
    let caps = match FAILED.captures(line) {
        Some(caps) => caps,
        None => return Ok(false),
    };
    // No timing information on failure lines, only the status changes.
    log.set_after_status(&caps[1], Status::Failed)?;
    Ok(true)
}

/// "aws_ssm_parameter.p1[2]: Destroying... [id=...]"
pub(super) fn destruction_started(line: &str, log: &mut ParsedLog) -> Result<bool> {
    static RE: Lazy<Regex> = Lazy::new(|| start_regex("Destroying"));
    modification_start(line, log, "Destroying...", &RE, Operation::Destroy, "apply (destroying)")
}

/// "aws_ssm_parameter.p1[2]: Destruction complete after 1s"
pub(super) fn destruction_completed(line: &str, log: &mut ParsedLog) -> Result<bool> {
    static RE: Lazy<Regex> = Lazy::new(|| complete_regex("Destruction complete"));
    modification_complete(
        line,
        log,
        "Destruction complete after",
        &RE,
        Status::NotCreated,
        "apply (destroyed)",
    )
}

/// "aws_ssm_parameter.p1[2]: Modifying... [id=...]"
pub(super) fn modification_started(line: &str, log: &mut ParsedLog) -> Result<bool> {
    static RE: Lazy<Regex> = Lazy::new(|| start_regex("Modifying"));
    modification_start(line, log, "Modifying...", &RE, Operation::Modify, "apply (modifying)")
}

/// "aws_ssm_parameter.p1[2]: Modifications complete after 1s [id=...]"
pub(super) fn modification_completed(line: &str, log: &mut ParsedLog) -> Result<bool> {
    static RE: Lazy<Regex> = Lazy::new(|| complete_regex("Modifications complete"));
    modification_complete(
        line,
        log,
        "Modifications complete after",
        &RE,
        Status::Created,
        "apply (modified)",
    )
}
