//! Configuration validation
//!
//! Rules:
//! - workers / channel_capacity / batch_size >= 1 (derive)
//! - retry.max_retries >= 1, retry.multiplier >= 1.0 (derive)
//! - influx.urls and influx.database non-empty (derive)
//! - retry.base_delay_ms <= retry.max_delay_ms
//! - every url is http(s)
//! - limit, when set, is > 0

use contracts::{ContractError, LoaderConfig};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

/// Validate a LoaderConfig
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(config: &LoaderConfig) -> Result<(), ContractError> {
    validate_fields(config)?;
    validate_retry_window(config)?;
    validate_urls(config)?;
    validate_limit(config)?;
    Ok(())
}

/// Derived field rules
fn validate_fields(config: &LoaderConfig) -> Result<(), ContractError> {
    match config.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let (field, message) = first_violation(&errors, "")
                .unwrap_or_else(|| (String::from("<config>"), errors.to_string()));
            Err(ContractError::config_validation(field, message))
        }
    }
}

/// Walk nested validator output and return the first (path, message)
fn first_violation(errors: &ValidationErrors, prefix: &str) -> Option<(String, String)> {
    let mut entries: Vec<_> = errors.errors().iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in entries {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        let found = match kind {
            ValidationErrorsKind::Field(errs) => errs.first().map(|e| (path, describe(e))),
            ValidationErrorsKind::Struct(nested) => first_violation(nested, &path),
            ValidationErrorsKind::List(items) => items
                .iter()
                .find_map(|(idx, nested)| first_violation(nested, &format!("{path}[{idx}]"))),
        };
        if found.is_some() {
            return found;
        }
    }
    None
}

fn describe(error: &ValidationError) -> String {
    let min = error.params.get("min");
    match (error.code.as_ref(), min) {
        ("range", Some(min)) => format!("must be >= {min}"),
        ("length", Some(min)) => format!("must have length >= {min}"),
        (code, _) => format!("failed '{code}' check"),
    }
}

/// Retry delay window must not be inverted
fn validate_retry_window(config: &LoaderConfig) -> Result<(), ContractError> {
    let retry = &config.retry;
    if retry.base_delay_ms > retry.max_delay_ms {
        return Err(ContractError::config_validation(
            "retry.base_delay_ms / retry.max_delay_ms",
            format!(
                "base_delay_ms ({}) must be <= max_delay_ms ({})",
                retry.base_delay_ms, retry.max_delay_ms
            ),
        ));
    }
    Ok(())
}

/// Validate target URLs
fn validate_urls(config: &LoaderConfig) -> Result<(), ContractError> {
    for (idx, url) in config.influx.urls.iter().enumerate() {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ContractError::config_validation(
                format!("influx.urls[{idx}]"),
                format!("'{url}' must start with http:// or https://"),
            ));
        }
    }
    Ok(())
}

fn validate_limit(config: &LoaderConfig) -> Result<(), ContractError> {
    if config.limit == Some(0) {
        return Err(ContractError::config_validation(
            "limit",
            "limit must be > 0 (omit it to load the whole source)",
        ));
    }
    Ok(())
}
