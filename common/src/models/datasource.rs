//! Data source configuration models.
//!
//! Contains the connection settings edited on the settings page.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Connection settings for one data source (stored internally).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceConfig {
    /// Connection URL, e.g. `mysql://host:3306/hr` or `jdbc:sqlite:/data/hr.db`.
    pub url: String,
    /// Login user.
    #[serde(default)]
    pub username: String,
    /// Login password (not serialized in responses).
    #[serde(skip_serializing, default)]
    pub password: String,
    /// Optional driver identifier.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub driver_class_name: Option<String>,
}

impl DataSourceConfig {
    /// A blank URL marks an unconfigured entry that must never be queried.
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

impl std::fmt::Debug for DataSourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataSourceConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("driver_class_name", &self.driver_class_name)
            .finish()
    }
}

/// One named entry of the settings form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedDataSource {
    pub name: String,
    pub config: DataSourceConfig,
}

/// Data source item for API responses (excludes the password).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceItem {
    /// Source name.
    pub name: String,
    /// Connection URL.
    pub url: String,
    /// Login user.
    pub username: String,
    /// Driver identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_class_name: Option<String>,
    /// Whether the entry will be queried.
    pub configured: bool,
}

impl From<NamedDataSource> for DataSourceItem {
    fn from(source: NamedDataSource) -> Self {
        Self {
            configured: source.config.is_configured(),
            name: source.name,
            url: source.config.url,
            username: source.config.username,
            driver_class_name: source.config.driver_class_name,
        }
    }
}

/// Settings form submission.
///
/// Fields arrive as indexed keys (`sources[0].url`, `sources[1].name`, ...).
/// Values are kept raw here; sanitizing happens when the form is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsForm {
    pub sources: Vec<NamedDataSource>,
}

impl SettingsForm {
    /// Groups url-decoded key/value pairs into entries ordered by index.
    ///
    /// Unknown keys are ignored. A repeated key keeps every value joined with
    /// a comma, which is what sanitizing later undoes.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut rows: BTreeMap<usize, RawRow> = BTreeMap::new();
        for (key, value) in pairs {
            let Some((index, field)) = parse_key(key.as_ref()) else {
                continue;
            };
            let row = rows.entry(index).or_default();
            let slot = match field {
                "name" | "dataSourceName" => &mut row.name,
                "url" => &mut row.url,
                "username" => &mut row.username,
                "password" => &mut row.password,
                "driverClassName" => &mut row.driver_class_name,
                _ => continue,
            };
            append(slot, value.into());
        }
        Self {
            sources: rows.into_values().map(RawRow::into_named).collect(),
        }
    }
}

#[derive(Default)]
struct RawRow {
    name: Option<String>,
    url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    driver_class_name: Option<String>,
}

impl RawRow {
    fn into_named(self) -> NamedDataSource {
        NamedDataSource {
            name: self.name.unwrap_or_default(),
            config: DataSourceConfig {
                url: self.url.unwrap_or_default(),
                username: self.username.unwrap_or_default(),
                password: self.password.unwrap_or_default(),
                driver_class_name: self.driver_class_name,
            },
        }
    }
}

fn append(slot: &mut Option<String>, value: String) {
    match slot {
        Some(existing) => {
            existing.push(',');
            existing.push_str(&value);
        }
        None => *slot = Some(value),
    }
}

/// Splits `sources[3].url` into `(3, "url")`.
fn parse_key(key: &str) -> Option<(usize, &str)> {
    let rest = key.strip_prefix("sources[")?;
    let (index, field) = rest.split_once("].")?;
    let index = index.parse().ok()?;
    let field = field.strip_prefix("dataSourceConfig.").unwrap_or(field);
    Some((index, field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_url_is_not_configured() {
        let config = DataSourceConfig {
            url: "   ".into(),
            ..Default::default()
        };
        assert!(!config.is_configured());
    }

    #[test]
    fn test_debug_hides_password() {
        let config = DataSourceConfig {
            url: "mysql://db/hr".into(),
            password: "hunter2".into(),
            ..Default::default()
        };
        assert!(!format!("{:?}", config).contains("hunter2"));
    }

    #[test]
    fn test_from_pairs_groups_by_index() {
        let form = SettingsForm::from_pairs([
            ("sources[1].name", "payroll"),
            ("sources[0].name", "hr"),
            ("sources[0].url", "mysql://hr/db"),
            ("sources[1].url", "sqlite:/tmp/p.db"),
            ("sources[1].driverClassName", "org.sqlite.JDBC"),
            ("csrf", "ignored"),
        ]);
        assert_eq!(form.sources.len(), 2);
        assert_eq!(form.sources[0].name, "hr");
        assert_eq!(form.sources[0].config.driver_class_name, None);
        assert_eq!(form.sources[1].config.url, "sqlite:/tmp/p.db");
        assert_eq!(
            form.sources[1].config.driver_class_name.as_deref(),
            Some("org.sqlite.JDBC")
        );
    }

    #[test]
    fn test_repeated_key_is_comma_joined() {
        let form = SettingsForm::from_pairs([
            ("sources[0].url", ""),
            ("sources[0].url", "mysql://hr/db"),
        ]);
        assert_eq!(form.sources[0].config.url, ",mysql://hr/db");
    }
}
