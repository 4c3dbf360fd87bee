//! Duration literals as Terraform prints them.
//!
//! Terraform reports apply times as `"10s"` or `"1m30s"`. There is no
//! sub-second precision and no hour unit in the logs we have seen.

use crate::error::TfProfError;
use crate::Result;

/// Convert a duration literal ("10s", "1m30s") into milliseconds.
pub fn parse_duration(input: &str) -> Result<i64> {
    let invalid = || TfProfError::InvalidDuration(input.to_string());

    let body = input.strip_suffix('s').ok_or_else(invalid)?;
    let (minutes, seconds) = match body.split_once('m') {
        Some((m, s)) => (
            m.parse::<i64>().map_err(|_| invalid())?,
            s.parse::<i64>().map_err(|_| invalid())?,
        ),
        None => (0, body.parse::<i64>().map_err(|_| invalid())?),
    };

    Ok(1000 * (60 * minutes + seconds))
}

/// Format a number of seconds as Terraform would ("30s", "2m30s").
pub fn format_duration(seconds: i64) -> String {
    let minutes = seconds / 60;
    let seconds = seconds % 60;
    if minutes == 0 {
        format!("{}s", seconds)
    } else {
        format!("{}m{}s", minutes, seconds)
    }
}
