//! Shared data models.

pub mod datasource;
pub mod schema;
pub mod user;

// Re-export commonly used types
pub use datasource::{DataSourceConfig, DataSourceItem, NamedDataSource, SettingsForm};
pub use schema::{SchemaProfile, SqlDialect, UserColumns};
pub use user::{ListUsersParams, RoleUpdateRequest, SortDirection, SortField, User};
