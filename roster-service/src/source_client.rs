//! Per-request access to configured data sources.
//!
//! Every call opens one connection, runs one fixed statement and closes the
//! connection again. Nothing is pooled or cached between requests.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::MySqlConnectOptions;
use sqlx::postgres::PgConnectOptions;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{
    ColumnIndex, Connection, Decode, MySqlConnection, PgConnection, Row, SqliteConnection, Type,
};

use common::errors::{AppError, AppResult};
use common::models::{DataSourceConfig, SchemaProfile, SqlDialect, User, UserColumns};

/// Reads and updates users in one data source.
#[async_trait]
pub trait UserSource: Send + Sync {
    /// Returns every row of the user table.
    async fn fetch_users(&self, config: &DataSourceConfig) -> AppResult<Vec<User>>;

    /// Sets `role` on the row matching `employee_id`; returns affected rows.
    async fn update_role(
        &self,
        config: &DataSourceConfig,
        employee_id: &str,
        role: &str,
    ) -> AppResult<u64>;
}

/// Drivers this build can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    MySql,
    Postgres,
    Sqlite,
}

impl DriverKind {
    /// Resolves a driver identifier: a short name or a well-known JDBC class.
    pub fn from_identifier(identifier: &str) -> AppResult<Self> {
        match identifier.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" | "com.mysql.cj.jdbc.driver" | "com.mysql.jdbc.driver"
            | "org.mariadb.jdbc.driver" => Ok(DriverKind::MySql),
            "postgres" | "postgresql" | "org.postgresql.driver" => Ok(DriverKind::Postgres),
            "sqlite" | "org.sqlite.jdbc" => Ok(DriverKind::Sqlite),
            _ => Err(AppError::DriverLoad(format!(
                "driver '{}' is not available",
                identifier.trim()
            ))),
        }
    }

    /// Infers the driver from a URL scheme (after `jdbc:` is stripped).
    pub fn from_url(url: &str) -> Option<Self> {
        let (scheme, _) = url.split_once(':')?;
        match scheme.to_lowercase().as_str() {
            "mysql" | "mariadb" => Some(DriverKind::MySql),
            "postgres" | "postgresql" => Some(DriverKind::Postgres),
            "sqlite" => Some(DriverKind::Sqlite),
            _ => None,
        }
    }
}

/// Connection target resolved from a [`DataSourceConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    pub driver: DriverKind,
    pub url: String,
}

impl ResolvedSource {
    /// Picks the driver and normalizes the URL.
    ///
    /// An explicit driver identifier must be loadable, and is checked before
    /// the URL is looked at.
    pub fn resolve(config: &DataSourceConfig) -> AppResult<Self> {
        let explicit = match config.driver_class_name.as_deref() {
            Some(name) if !name.trim().is_empty() => Some(DriverKind::from_identifier(name)?),
            _ => None,
        };

        let trimmed = config.url.trim();
        let url = trimmed
            .strip_prefix("jdbc:")
            .unwrap_or(trimmed)
            .to_string();

        let driver = explicit
            .or_else(|| DriverKind::from_url(&url))
            .ok_or_else(|| {
                AppError::DatabaseConnection(format!("no suitable driver found for {}", url))
            })?;

        Ok(Self { driver, url })
    }
}

/// One open connection, whichever driver it uses.
enum SourceConnection {
    MySql(MySqlConnection),
    Postgres(PgConnection),
    Sqlite(SqliteConnection),
}

impl SourceConnection {
    async fn open(source: &ResolvedSource, config: &DataSourceConfig) -> AppResult<Self> {
        let connect_err = |e: sqlx::Error| AppError::DatabaseConnection(e.to_string());

        match source.driver {
            DriverKind::MySql => {
                let mut options = MySqlConnectOptions::from_str(&source.url).map_err(connect_err)?;
                if !config.username.is_empty() {
                    options = options.username(&config.username);
                }
                if !config.password.is_empty() {
                    options = options.password(&config.password);
                }
                let conn = MySqlConnection::connect_with(&options)
                    .await
                    .map_err(connect_err)?;
                Ok(SourceConnection::MySql(conn))
            }
            DriverKind::Postgres => {
                let mut options = PgConnectOptions::from_str(&source.url).map_err(connect_err)?;
                if !config.username.is_empty() {
                    options = options.username(&config.username);
                }
                if !config.password.is_empty() {
                    options = options.password(&config.password);
                }
                let conn = PgConnection::connect_with(&options)
                    .await
                    .map_err(connect_err)?;
                Ok(SourceConnection::Postgres(conn))
            }
            DriverKind::Sqlite => {
                let options = SqliteConnectOptions::from_str(&source.url).map_err(connect_err)?;
                let conn = SqliteConnection::connect_with(&options)
                    .await
                    .map_err(connect_err)?;
                Ok(SourceConnection::Sqlite(conn))
            }
        }
    }

    async fn fetch_users(&mut self, profile: SchemaProfile) -> AppResult<Vec<User>> {
        let columns = profile.columns();
        match self {
            SourceConnection::MySql(conn) => {
                let sql = profile.select_sql(SqlDialect::MySql);
                let rows = sqlx::query(&sql).fetch_all(&mut *conn).await.map_err(query_err)?;
                rows.iter().map(|row| map_user(row, columns)).collect()
            }
            SourceConnection::Postgres(conn) => {
                let sql = profile.select_sql(SqlDialect::Postgres);
                let rows = sqlx::query(&sql).fetch_all(&mut *conn).await.map_err(query_err)?;
                rows.iter().map(|row| map_user(row, columns)).collect()
            }
            SourceConnection::Sqlite(conn) => {
                let sql = profile.select_sql(SqlDialect::Sqlite);
                let rows = sqlx::query(&sql).fetch_all(&mut *conn).await.map_err(query_err)?;
                rows.iter().map(|row| map_user(row, columns)).collect()
            }
        }
    }

    async fn update_role(
        &mut self,
        profile: SchemaProfile,
        employee_id: &str,
        role: &str,
    ) -> AppResult<u64> {
        let result = match self {
            SourceConnection::MySql(conn) => {
                let sql = profile.update_role_sql(SqlDialect::MySql);
                sqlx::query(&sql)
                    .bind(role)
                    .bind(employee_id)
                    .execute(&mut *conn)
                    .await
                    .map(|r| r.rows_affected())
            }
            SourceConnection::Postgres(conn) => {
                let sql = profile.update_role_sql(SqlDialect::Postgres);
                sqlx::query(&sql)
                    .bind(role)
                    .bind(employee_id)
                    .execute(&mut *conn)
                    .await
                    .map(|r| r.rows_affected())
            }
            SourceConnection::Sqlite(conn) => {
                let sql = profile.update_role_sql(SqlDialect::Sqlite);
                sqlx::query(&sql)
                    .bind(role)
                    .bind(employee_id)
                    .execute(&mut *conn)
                    .await
                    .map(|r| r.rows_affected())
            }
        };
        result.map_err(query_err)
    }

    async fn close(self) {
        let closed = match self {
            SourceConnection::MySql(conn) => conn.close().await,
            SourceConnection::Postgres(conn) => conn.close().await,
            SourceConnection::Sqlite(conn) => conn.close().await,
        };
        if let Err(e) = closed {
            tracing::debug!(error = %e, "连接关闭时出错");
        }
    }
}

fn query_err(e: sqlx::Error) -> AppError {
    AppError::DatabaseQuery(e.to_string())
}

fn map_user<R>(row: &R, columns: &UserColumns) -> AppResult<User>
where
    R: Row,
    for<'c> &'c str: ColumnIndex<R>,
    for<'r> String: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> i64: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> i32: Decode<'r, R::Database> + Type<R::Database>,
{
    Ok(User {
        employee_id: read_text(row, columns.employee_id)?,
        first_name: read_text(row, columns.first_name)?,
        last_name: read_text(row, columns.last_name)?,
        email: read_text(row, columns.email)?,
        role: read_text(row, columns.role)?,
    })
}

/// Reads a column as text; integer ids are rendered in decimal, NULL as "".
fn read_text<R>(row: &R, column: &str) -> AppResult<String>
where
    R: Row,
    for<'c> &'c str: ColumnIndex<R>,
    for<'r> String: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> i64: Decode<'r, R::Database> + Type<R::Database>,
    for<'r> i32: Decode<'r, R::Database> + Type<R::Database>,
{
    match row.try_get::<Option<String>, _>(column) {
        Ok(value) => return Ok(value.unwrap_or_default()),
        Err(sqlx::Error::ColumnDecode { .. }) => {}
        Err(e) => return Err(query_err(e)),
    }
    if let Ok(value) = row.try_get::<Option<i64>, _>(column) {
        return Ok(value.map(|v| v.to_string()).unwrap_or_default());
    }
    row.try_get::<Option<i32>, _>(column)
        .map(|v| v.map(|v| v.to_string()).unwrap_or_default())
        .map_err(query_err)
}

/// [`UserSource`] backed by sqlx, one connection per call.
pub struct SqlUserSource {
    profile: SchemaProfile,
    timeout: Duration,
}

impl SqlUserSource {
    pub fn new(profile: SchemaProfile, timeout: Duration) -> Self {
        Self { profile, timeout }
    }

    async fn bounded<T, F>(&self, work: F) -> AppResult<T>
    where
        F: std::future::Future<Output = AppResult<T>>,
    {
        tokio::time::timeout(self.timeout, work)
            .await
            .map_err(|_| AppError::Timeout(self.timeout.as_secs()))?
    }
}

#[async_trait]
impl UserSource for SqlUserSource {
    async fn fetch_users(&self, config: &DataSourceConfig) -> AppResult<Vec<User>> {
        let source = ResolvedSource::resolve(config)?;
        self.bounded(async {
            let mut conn = SourceConnection::open(&source, config).await?;
            let users = conn.fetch_users(self.profile).await;
            conn.close().await;
            users
        })
        .await
    }

    async fn update_role(
        &self,
        config: &DataSourceConfig,
        employee_id: &str,
        role: &str,
    ) -> AppResult<u64> {
        let source = ResolvedSource::resolve(config)?;
        self.bounded(async {
            let mut conn = SourceConnection::open(&source, config).await?;
            let updated = conn.update_role(self.profile, employee_id, role).await;
            conn.close().await;
            updated
        })
        .await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use sqlx::sqlite::SqliteConnectOptions;
    use std::path::Path;

    /// Creates a SQLite file with a `User` table holding `rows` and returns
    /// its connection URL.
    pub(crate) async fn seed_user_table(path: &Path, rows: &[(i64, &str, &str, &str, &str)]) -> String {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let mut conn = SqliteConnection::connect_with(&options).await.unwrap();
        sqlx::query(
            "CREATE TABLE \"User\" (Id INTEGER PRIMARY KEY, FirstName TEXT, LastName TEXT, EmailAddress TEXT, Role TEXT)",
        )
        .execute(&mut conn)
        .await
        .unwrap();
        for (id, first, last, email, role) in rows {
            sqlx::query("INSERT INTO \"User\" VALUES (?, ?, ?, ?, ?)")
                .bind(*id)
                .bind(*first)
                .bind(*last)
                .bind(*email)
                .bind(*role)
                .execute(&mut conn)
                .await
                .unwrap();
        }
        conn.close().await.unwrap();
        format!("sqlite://{}", path.display())
    }

    fn client() -> SqlUserSource {
        SqlUserSource::new(SchemaProfile::UserTable, Duration::from_secs(5))
    }

    fn config(url: &str) -> DataSourceConfig {
        DataSourceConfig {
            url: url.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_slow_source_times_out() {
        let client = SqlUserSource::new(SchemaProfile::UserTable, Duration::from_millis(10));
        let err = client
            .bounded(std::future::pending::<AppResult<()>>())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Timeout(_)));
    }

    #[test]
    fn test_driver_identifiers() {
        assert_eq!(
            DriverKind::from_identifier("com.mysql.cj.jdbc.Driver").unwrap(),
            DriverKind::MySql
        );
        assert_eq!(
            DriverKind::from_identifier("org.postgresql.Driver").unwrap(),
            DriverKind::Postgres
        );
        assert!(matches!(
            DriverKind::from_identifier("org.driver.Foo"),
            Err(AppError::DriverLoad(_))
        ));
    }

    #[test]
    fn test_resolve_strips_jdbc_prefix() {
        let resolved = ResolvedSource::resolve(&config("jdbc:postgresql://db:5432/hr")).unwrap();
        assert_eq!(resolved.driver, DriverKind::Postgres);
        assert_eq!(resolved.url, "postgresql://db:5432/hr");
    }

    #[test]
    fn test_resolve_unknown_scheme() {
        let err = ResolvedSource::resolve(&config("jdbc:example://host/db")).unwrap_err();
        assert!(matches!(err, AppError::DatabaseConnection(_)));
    }

    #[tokio::test]
    async fn test_unknown_driver_fails_before_connecting() {
        let mut cfg = config("sqlite:///definitely/not/here.db");
        cfg.driver_class_name = Some("org.driver.Foo".into());
        let err = client().fetch_users(&cfg).await.unwrap_err();
        assert!(matches!(err, AppError::DriverLoad(_)));
    }

    #[tokio::test]
    async fn test_fetch_users_from_sqlite() {
        let dir = tempfile::tempdir().unwrap();
        let url = seed_user_table(
            &dir.path().join("hr.db"),
            &[
                (1, "Ada", "Lovelace", "ada@example.com", "admin"),
                (2, "Alan", "Turing", "alan@example.com", "user"),
            ],
        )
        .await;

        let users = client().fetch_users(&config(&url)).await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0], User::new("1", "Ada", "Lovelace", "ada@example.com", "admin"));
    }

    #[tokio::test]
    async fn test_jdbc_sqlite_url_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let url = seed_user_table(&dir.path().join("hr.db"), &[(7, "Grace", "Hopper", "g@example.com", "user")]).await;
        let users = client()
            .fetch_users(&config(&format!("jdbc:{}", url)))
            .await
            .unwrap();
        assert_eq!(users[0].employee_id, "7");
    }

    #[tokio::test]
    async fn test_missing_table_is_query_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.db");
        let options = SqliteConnectOptions::new().filename(&path).create_if_missing(true);
        SqliteConnection::connect_with(&options).await.unwrap().close().await.unwrap();

        let err = client()
            .fetch_users(&config(&format!("sqlite://{}", path.display())))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DatabaseQuery(_)));
    }

    #[tokio::test]
    async fn test_missing_file_is_connection_error() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("absent.db").display());
        let err = client().fetch_users(&config(&url)).await.unwrap_err();
        assert!(matches!(err, AppError::DatabaseConnection(_)));
    }

    #[tokio::test]
    async fn test_update_role_counts_rows() {
        let dir = tempfile::tempdir().unwrap();
        let url = seed_user_table(&dir.path().join("hr.db"), &[(1, "Ada", "Lovelace", "ada@example.com", "user")]).await;
        let cfg = config(&url);

        assert_eq!(client().update_role(&cfg, "1", "admin").await.unwrap(), 1);
        assert_eq!(client().update_role(&cfg, "404", "admin").await.unwrap(), 0);

        let users = client().fetch_users(&cfg).await.unwrap();
        assert_eq!(users[0].role, "admin");
    }
}
