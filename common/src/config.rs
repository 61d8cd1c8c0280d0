//! Service configuration.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the working directory. Invalid values fall back to defaults.

use std::str::FromStr;

use crate::models::schema::SchemaProfile;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration shared by a service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Service name used in logs and responses.
    pub service_name: String,
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Upper bound for a single data source round trip, in seconds.
    pub query_timeout_secs: u64,
    /// Column layout expected in every configured data source.
    pub schema_profile: SchemaProfile,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: "roster-service".to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            query_timeout_secs: DEFAULT_QUERY_TIMEOUT_SECS,
            schema_profile: SchemaProfile::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration for the named service from the environment.
    pub fn load_with_service(service_name: &str) -> Self {
        Self::from_lookup(service_name, |key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(service_name: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            service_name: service_name.to_string(),
            host: lookup("SERVER_HOST")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.host),
            port: parse_or("SERVER_PORT", lookup("SERVER_PORT"), defaults.port),
            query_timeout_secs: parse_or(
                "QUERY_TIMEOUT_SECS",
                lookup("QUERY_TIMEOUT_SECS"),
                defaults.query_timeout_secs,
            ),
            schema_profile: parse_or(
                "SCHEMA_PROFILE",
                lookup("SCHEMA_PROFILE"),
                defaults.schema_profile,
            ),
        }
    }

    /// Socket address string, `host:port`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr,
{
    match raw {
        Some(value) => match value.trim().parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                tracing::warn!(key, value = %value, "invalid config value, using default");
                default
            }
        },
        None => default,
    }
}

/// Loads `.env` from the working directory (best-effort, no error if missing).
///
/// Variables already present in the environment win.
pub fn load_dotenv() {
    let Ok(content) = std::fs::read_to_string(".env") else {
        return;
    };
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            if std::env::var(key).is_err() {
                std::env::set_var(key, value.trim());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_lookup("roster-service", lookup(&[]));
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.query_timeout_secs, 30);
        assert_eq!(config.schema_profile, SchemaProfile::UserTable);
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let config = AppConfig::from_lookup(
            "roster-service",
            lookup(&[
                ("SERVER_PORT", "9090"),
                ("QUERY_TIMEOUT_SECS", "soon"),
                ("SCHEMA_PROFILE", "Employees"),
            ]),
        );
        assert_eq!(config.port, 9090);
        assert_eq!(config.query_timeout_secs, 30);
        assert_eq!(config.schema_profile, SchemaProfile::EmployeesTable);
    }
}
