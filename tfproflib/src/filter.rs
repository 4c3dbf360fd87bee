//! Filter a Terraform log down to the resources that matter.
//!
//! Given a resource query, keeps three kinds of content: plan blocks for
//! matching resources, error blocks that mention them, and any other line
//! that mentions them. Everything else is dropped.

use std::io::BufRead;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::TfProfError;
use crate::text::strip_ansi;
use crate::Result;

// Sentences that open a plan block for a resource.
const PLAN_PHRASES: &[&str] = &[
    "{} is tainted, so must be replaced",
    "{} will be created",
    "{} will be replaced, as requested",
    "{} will be destroyed",
    "{} will be updated in-place",
    "{} must be replaced",
];

static END_OF_ERROR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[0-9]+: (resource|data) ".*" ".*" \{"#).unwrap());

/// Translate a "natural" resource query into a regex.
///
/// Queries like `module.*.my_resource[*]` are not valid regex (`.`, `[`,
/// `]` are metacharacters, `*` stands for `.*`) but make intuitive sense,
/// so the translation escapes those and widens `*`.
pub fn clean_pattern(query: &str) -> String {
    query
        .replace('.', r"\.")
        .replace('[', r"\[")
        .replace(']', r"\]")
        .replace('*', ".*")
}

/// Keep only the lines of a log that relate to resources matching `query`.
pub fn filter_lines<R: BufRead>(input: R, query: &str) -> Result<Vec<String>> {
    let pattern = clean_pattern(query);
    let resource = Regex::new(&pattern)
        .map_err(|_| TfProfError::InvalidQuery(query.to_string()))?;

    let plan_starts: Vec<Regex> = PLAN_PHRASES
        .iter()
        .map(|phrase| {
            let sentence = phrase.replace("{}", &pattern);
            Regex::new(&sentence).map_err(|_| TfProfError::InvalidQuery(query.to_string()))
        })
        .collect::<Result<_>>()?;
    let error_with = Regex::new(&format!("  with {},", pattern))
        .map_err(|_| TfProfError::InvalidQuery(query.to_string()))?;

    let mut output = Vec::new();
    let mut plan_buffer: Option<Vec<String>> = None;
    let mut error_buffer: Option<Vec<String>> = None;

    for line in input.lines() {
        let line = strip_ansi(&line?).into_owned();

        if let Some(buffer) = plan_buffer.as_mut() {
            buffer.push(line.clone());
            if line == "    }" {
                output.extend(plan_buffer.take().unwrap());
                output.push(String::new()); // Spacing below the block.
            }
        } else if let Some(buffer) = error_buffer.as_mut() {
            if END_OF_ERROR.is_match(&line) {
                buffer.push(line);
                output.extend(error_buffer.take().unwrap());
            } else if names_other_resource(&line, &error_with) {
                // Error talks about a resource we are not interested in.
                error_buffer = None;
            } else {
                buffer.push(line);
            }
        } else if plan_starts.iter().any(|re| re.is_match(&line)) {
            plan_buffer = Some(vec![line]);
        } else if line.starts_with("Error: ") {
            error_buffer = Some(vec![line]);
        } else if resource.is_match(&line) {
            output.push(line);
        }
    }

    Ok(output)
}

// An error block's "  with <resource>," line decides whether the block is
// interesting. True when that line names a non-matching resource.
fn names_other_resource(line: &str, error_with: &Regex) -> bool {
    line.starts_with("  with ") && line.ends_with(',') && !error_with.is_match(line)
}
