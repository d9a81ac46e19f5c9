//! Argument extraction for script calls.

use super::{ScriptError, ScriptResult};
use serde_json::{Map, Value};
use std::ops::RangeInclusive;

/// Checks the argument count against `accepted`.
pub(super) fn expect_count(
    method: &'static str,
    args: &[Value],
    accepted: RangeInclusive<usize>,
) -> ScriptResult<()> {
    if accepted.contains(&args.len()) {
        return Ok(());
    }
    let expected = if accepted.start() == accepted.end() {
        accepted.start().to_string()
    } else {
        format!("{} to {}", accepted.start(), accepted.end())
    };
    Err(ScriptError::ArgumentCount {
        method,
        expected,
        actual: args.len(),
    })
}

/// Returns the single configuration object passed to a constructor.
pub(super) fn config_object<'args>(
    export: &'static str,
    args: &'args [Value],
) -> ScriptResult<&'args Value> {
    expect_count(export, args, 1..=1)?;
    args.first()
        .filter(|value| value.is_object())
        .ok_or(ScriptError::InvalidConfigArgument { export })
}

/// Returns the string at `index`, or `missing` when absent or mistyped.
pub(super) fn required_str(
    args: &[Value],
    index: usize,
    missing: ScriptError,
) -> ScriptResult<&str> {
    args.get(index).and_then(Value::as_str).ok_or(missing)
}

/// Returns the optional header object at `index` as name/value pairs.
///
/// An absent or `null` argument yields no headers.
pub(super) fn optional_headers(args: &[Value], index: usize) -> ScriptResult<Vec<(String, String)>> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Object(headers)) => string_pairs(headers),
        Some(_) => Err(ScriptError::InvalidHeaders),
    }
}

fn string_pairs(headers: &Map<String, Value>) -> ScriptResult<Vec<(String, String)>> {
    headers
        .iter()
        .map(|(name, value)| {
            value
                .as_str()
                .map(|text| (name.clone(), text.to_owned()))
                .ok_or(ScriptError::InvalidHeaders)
        })
        .collect()
}
