//! Refresh-phase handler.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{malformed, RESOURCE_NAME};
use crate::model::{ParsedLog, UNSET};
use crate::Result;

static REFRESHING: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"^({}): Refreshing state\.\.\.", RESOURCE_NAME)).unwrap());

/// Handle a refresh line and record the resource in the log. E.g:
/// "aws_instance.web: Refreshing state... [id=i-08a1...]"
pub(super) fn refreshing(line: &str, log: &mut ParsedLog) -> Result<bool> {
    if !line.contains("Refreshing state...") {
        return Ok(false);
    }
    let caps = REFRESHING
        .captures(line)
        .ok_or_else(|| malformed("refresh", line))?;
    let resource = &caps[1];

    // Refreshing is not a timed modification, so no index or event.
    log.register(resource);
    log.set_modification_started_index(resource, UNSET)?;
    log.set_modification_started_event(resource, UNSET)?;
    Ok(true)
}
