//! Settings form sanitizing.
//!
//! Form binding can deliver a field more than once, joined with commas.
//! These helpers undo that before values reach the settings store.

use crate::models::datasource::{DataSourceConfig, NamedDataSource};

/// Strips leading commas, then surrounding whitespace.
pub fn sanitize_field(raw: &str) -> String {
    raw.trim_start_matches(',').trim().to_string()
}

/// Keeps the part before the first comma, trimmed. Blank becomes `None`.
pub fn sanitize_driver(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let head = raw.split(',').next().unwrap_or(raw).trim();
    if head.is_empty() {
        None
    } else {
        Some(head.to_string())
    }
}

/// Sanitizes one form entry.
///
/// Returns `None` for an untouched template row (blank name and blank url).
/// A filled row without a name is named `source-<position>`, 1-based.
pub fn sanitize_entry(entry: &NamedDataSource, position: usize) -> Option<NamedDataSource> {
    let config = DataSourceConfig {
        url: sanitize_field(&entry.config.url),
        username: sanitize_field(&entry.config.username),
        password: sanitize_field(&entry.config.password),
        driver_class_name: sanitize_driver(entry.config.driver_class_name.as_deref()),
    };
    let name = sanitize_field(&entry.name);

    if name.is_empty() && config.url.is_empty() {
        return None;
    }
    let name = if name.is_empty() {
        format!("source-{}", position)
    } else {
        name
    };
    Some(NamedDataSource { name, config })
}
