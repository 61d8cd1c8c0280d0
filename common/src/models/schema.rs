//! Schema profiles.
//!
//! Each configured data source is expected to expose one table of users.
//! Two layouts are known; the active one is picked by configuration and
//! applied to every source.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Column names for one user table layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserColumns {
    pub table: &'static str,
    pub employee_id: &'static str,
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub email: &'static str,
    pub role: &'static str,
}

const USER_TABLE: UserColumns = UserColumns {
    table: "User",
    employee_id: "Id",
    first_name: "FirstName",
    last_name: "LastName",
    email: "EmailAddress",
    role: "Role",
};

const EMPLOYEES_TABLE: UserColumns = UserColumns {
    table: "Employees",
    employee_id: "employeeId",
    first_name: "firstName",
    last_name: "lastName",
    email: "email",
    role: "role",
};

/// Known table layouts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SchemaProfile {
    /// `User(Id, FirstName, LastName, EmailAddress, Role)`.
    #[default]
    #[serde(rename = "user")]
    UserTable,
    /// `Employees(employeeId, firstName, lastName, email, role)`.
    #[serde(rename = "employees")]
    EmployeesTable,
}

impl SchemaProfile {
    /// Static column map for this profile.
    pub fn columns(&self) -> &'static UserColumns {
        match self {
            SchemaProfile::UserTable => &USER_TABLE,
            SchemaProfile::EmployeesTable => &EMPLOYEES_TABLE,
        }
    }

    /// The listing query, columns in `User` field order.
    pub fn select_sql(&self, dialect: SqlDialect) -> String {
        let c = self.columns();
        format!(
            "SELECT {}, {}, {}, {}, {} FROM {}",
            dialect.quote(c.employee_id),
            dialect.quote(c.first_name),
            dialect.quote(c.last_name),
            dialect.quote(c.email),
            dialect.quote(c.role),
            dialect.quote(c.table),
        )
    }

    /// Role update; binds role first, then employee id.
    pub fn update_role_sql(&self, dialect: SqlDialect) -> String {
        let c = self.columns();
        format!(
            "UPDATE {} SET {} = {} WHERE {} = {}",
            dialect.quote(c.table),
            dialect.quote(c.role),
            dialect.placeholder(1),
            dialect.quote(c.employee_id),
            dialect.placeholder(2),
        )
    }
}

impl FromStr for SchemaProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" | "users" => Ok(SchemaProfile::UserTable),
            "employees" | "employee" => Ok(SchemaProfile::EmployeesTable),
            other => Err(format!("unknown schema profile: {}", other)),
        }
    }
}

impl std::fmt::Display for SchemaProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaProfile::UserTable => write!(f, "user"),
            SchemaProfile::EmployeesTable => write!(f, "employees"),
        }
    }
}

/// Identifier quoting and placeholder style of a SQL backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlDialect {
    MySql,
    Postgres,
    Sqlite,
}

impl SqlDialect {
    /// Quotes an identifier.
    pub fn quote(&self, ident: &str) -> String {
        match self {
            SqlDialect::MySql => format!("`{}`", ident.replace('`', "``")),
            SqlDialect::Postgres | SqlDialect::Sqlite => {
                format!("\"{}\"", ident.replace('"', "\"\""))
            }
        }
    }

    /// Bind placeholder for the 1-based parameter `n`.
    pub fn placeholder(&self, n: usize) -> String {
        match self {
            SqlDialect::Postgres => format!("${}", n),
            SqlDialect::MySql | SqlDialect::Sqlite => "?".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_table_select() {
        assert_eq!(
            SchemaProfile::UserTable.select_sql(SqlDialect::MySql),
            "SELECT `Id`, `FirstName`, `LastName`, `EmailAddress`, `Role` FROM `User`"
        );
    }

    #[test]
    fn test_employees_update_postgres() {
        assert_eq!(
            SchemaProfile::EmployeesTable.update_role_sql(SqlDialect::Postgres),
            r#"UPDATE "Employees" SET "role" = $1 WHERE "employeeId" = $2"#
        );
    }

    #[test]
    fn test_parse_profile() {
        assert_eq!("USER".parse::<SchemaProfile>(), Ok(SchemaProfile::UserTable));
        assert_eq!(" employees ".parse::<SchemaProfile>(), Ok(SchemaProfile::EmployeesTable));
        assert!("staff".parse::<SchemaProfile>().is_err());
    }
}
