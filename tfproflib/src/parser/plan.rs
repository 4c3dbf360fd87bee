//! Plan-phase handlers.
//!
//! Plan summary lines announce a resource and a verb phrase, e.g:
//! `  # aws_ssm_parameter.p1 will be created`. Each handler recognizes
//! one phrase and records the status the plan promises.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{malformed, RESOURCE_NAME};
use crate::model::{ParsedLog, Status};
use crate::Result;

const PLAN_START: &str = "Terraform will perform the following actions:";

const TAINTED: &str = " is tainted, so must be replaced";
const EXPLICIT_REPLACE: &str = " will be replaced, as requested";
const WILL_BE_DESTROYED: &str = " will be destroyed";
const WILL_BE_MODIFIED: &str = " will be updated in-place";
const FORCED_REPLACE: &str = " must be replaced";
const WILL_BE_CREATED: &str = " will be created";

fn plan_regex(phrase: &str) -> Regex {
    Regex::new(&format!("# ({}){}", RESOURCE_NAME, regex::escape(phrase))).unwrap()
}

/// Recognize a plan sentence, extract the resource from its
/// `"# <resource> <phrase>"` fragment, and record the desired status.
fn plan_sentence(
    line: &str,
    log: &mut ParsedLog,
    phrase: &str,
    regex: &Regex,
    desired: Status,
    stage: &'static str,
) -> Result<bool> {
    if !line.contains(phrase) {
        return Ok(false);
    }
    let caps = regex.captures(line).ok_or_else(|| malformed(stage, line))?;
    let resource = &caps[1];

    log.register(resource);
    log.set_desired_status(resource, desired)?;
    Ok(true)
}

/// Handle the line that opens the plan section. Flips the plan flag
/// without touching any resource.
pub(super) fn plan_start(line: &str, log: &mut ParsedLog) -> Result<bool> {
    if !line.contains(PLAN_START) {
        return Ok(false);
    }
    log.contains_plan = true;
    Ok(true)
}

/// "  # aws_ssm_parameter.p1 is tainted, so must be replaced"
pub(super) fn tainted(line: &str, log: &mut ParsedLog) -> Result<bool> {
    static RE: Lazy<Regex> = Lazy::new(|| plan_regex(TAINTED));
    plan_sentence(line, log, TAINTED, &RE, Status::Created, "plan (tainted)")
}

/// "  # aws_ssm_parameter.p2 will be replaced, as requested"
pub(super) fn explicit_replace(line: &str, log: &mut ParsedLog) -> Result<bool> {
    static RE: Lazy<Regex> = Lazy::new(|| plan_regex(EXPLICIT_REPLACE));
    plan_sentence(
        line,
        log,
        EXPLICIT_REPLACE,
        &RE,
        Status::Created,
        "plan (explicit replace)",
    )
}

/// "  # aws_ssm_parameter.p3 will be destroyed"
pub(super) fn will_be_destroyed(line: &str, log: &mut ParsedLog) -> Result<bool> {
    static RE: Lazy<Regex> = Lazy::new(|| plan_regex(WILL_BE_DESTROYED));
    plan_sentence(
        line,
        log,
        WILL_BE_DESTROYED,
        &RE,
        Status::NotCreated,
        "plan (destroy)",
    )
}

/// "  # aws_ssm_parameter.p4 will be updated in-place"
pub(super) fn will_be_modified(line: &str, log: &mut ParsedLog) -> Result<bool> {
    static RE: Lazy<Regex> = Lazy::new(|| plan_regex(WILL_BE_MODIFIED));
    plan_sentence(
        line,
        log,
        WILL_BE_MODIFIED,
        &RE,
        Status::Created,
        "plan (modify)",
    )
}

/// "  # aws_ssm_parameter.p5 must be replaced"
pub(super) fn forced_replace(line: &str, log: &mut ParsedLog) -> Result<bool> {
    static RE: Lazy<Regex> = Lazy::new(|| plan_regex(FORCED_REPLACE));
    plan_sentence(
        line,
        log,
        FORCED_REPLACE,
        &RE,
        Status::Created,
        "plan (forced replace)",
    )
}

/// "  # aws_ssm_parameter.p6 will be created"
pub(super) fn will_be_created(line: &str, log: &mut ParsedLog) -> Result<bool> {
    static RE: Lazy<Regex> = Lazy::new(|| plan_regex(WILL_BE_CREATED));
    plan_sentence(
        line,
        log,
        WILL_BE_CREATED,
        &RE,
        Status::Created,
        "plan (create)",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desired(log: &ParsedLog, resource: &str) -> Status {
        log.resources[resource].desired_status
    }

    #[test]
    fn test_plan_start_flips_flag_only() {
        let mut log = ParsedLog::new();
        assert!(plan_start(PLAN_START, &mut log).unwrap());
        assert!(log.contains_plan);
        assert!(log.resources.is_empty());
    }

    #[test]
    fn test_will_be_created() {
        let mut log = ParsedLog::new();
        assert!(will_be_created("  # aws_ssm_parameter.p6 will be created", &mut log).unwrap());
        assert_eq!(desired(&log, "aws_ssm_parameter.p6"), Status::Created);
    }

    #[test]
    fn test_will_be_destroyed() {
        let mut log = ParsedLog::new();
        assert!(will_be_destroyed("  # aws_ssm_parameter.p3 will be destroyed", &mut log).unwrap());
        assert_eq!(desired(&log, "aws_ssm_parameter.p3"), Status::NotCreated);
    }

    #[test]
    fn test_tainted_and_replace_sentences_promise_creation() {
        let mut log = ParsedLog::new();
        assert!(tainted(
            "  # aws_ssm_parameter.p1 is tainted, so must be replaced",
            &mut log
        )
        .unwrap());
        assert!(explicit_replace(
            "  # aws_ssm_parameter.p2 will be replaced, as requested",
            &mut log
        )
        .unwrap());
        assert!(forced_replace("  # aws_ssm_parameter.p5 must be replaced", &mut log).unwrap());

        for r in ["aws_ssm_parameter.p1", "aws_ssm_parameter.p2", "aws_ssm_parameter.p5"] {
            assert_eq!(desired(&log, r), Status::Created);
        }
    }

    #[test]
    fn test_will_be_modified_with_indexed_address() {
        let mut log = ParsedLog::new();
        assert!(will_be_modified(
            "  # module.ssm.aws_ssm_parameter.p[0] will be updated in-place",
            &mut log
        )
        .unwrap());
        assert_eq!(
            desired(&log, "module.ssm.aws_ssm_parameter.p[0]"),
            Status::Created
        );
    }

    #[test]
    fn test_phrase_without_fragment_is_malformed() {
        let mut log = ParsedLog::new();
        assert!(will_be_created("something will be created later", &mut log).is_err());
    }

    #[test]
    fn test_unrelated_line_is_not_claimed() {
        let mut log = ParsedLog::new();
        assert!(!will_be_created("  + resource \"aws_instance\" \"web\" {", &mut log).unwrap());
    }
}
