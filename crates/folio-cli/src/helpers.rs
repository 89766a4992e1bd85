use std::io::IsTerminal;

use dialoguer::Password;
use folio_core::{Filter, FolioError};
use serde_json::Value;

/// Use the given value, or prompt for it when a TTY is available.
pub fn password_or_prompt(value: Option<&str>, prompt: &str) -> anyhow::Result<String> {
    if let Some(value) = value {
        return Ok(value.to_string());
    }
    if !std::io::stdin().is_terminal() {
        return Err(anyhow::anyhow!(
            "No password provided and no TTY available. Pass it as a flag."
        ));
    }
    Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Prompt for a new password with confirmation.
pub fn new_password_or_prompt(value: Option<&str>) -> anyhow::Result<String> {
    if let Some(value) = value {
        return Ok(value.to_string());
    }
    if !std::io::stdin().is_terminal() {
        return Err(anyhow::anyhow!(
            "No new password provided and no TTY available. Use --new."
        ));
    }
    Password::new()
        .with_prompt("New password")
        .with_confirmation("Confirm new password", "Passwords do not match")
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Parse a `field=value` condition. The value is read as JSON when it
/// parses (numbers, booleans, null, quoted strings) and as a plain string
/// otherwise.
pub fn parse_condition(raw: &str) -> anyhow::Result<(String, Value)> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Invalid condition \"{}\" (expected FIELD=VALUE)", raw))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(anyhow::anyhow!("Condition \"{}\" has an empty field name", raw));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((field.to_string(), value))
}

pub fn parse_filter(conditions: &[String]) -> anyhow::Result<Filter> {
    conditions.iter().try_fold(Filter::new(), |filter, raw| {
        let (field, value) = parse_condition(raw)?;
        Ok(filter.eq(field, value))
    })
}

/// Operator-facing text for session failures.
pub fn describe_auth_error(err: FolioError) -> anyhow::Error {
    match err {
        FolioError::ExpiredToken => anyhow::anyhow!("Session expired. Log in again."),
        FolioError::RevokedToken => anyhow::anyhow!(
            "Session invalidated by a password change. Log in again."
        ),
        FolioError::InvalidToken(_) => anyhow::anyhow!("Invalid session token."),
        FolioError::SubjectNotFound(_) => {
            anyhow::anyhow!("The account for this session no longer exists.")
        }
        other => anyhow::Error::new(other),
    }
}

/// Render a JSON value for a table cell.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}
