//! User record models.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One aggregated user row. Identity key is `employee_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
}

impl User {
    pub fn new(
        employee_id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            employee_id: employee_id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            role: role.into(),
        }
    }

    /// Value of the given sort field.
    pub fn field(&self, field: SortField) -> &str {
        match field {
            SortField::EmployeeId => &self.employee_id,
            SortField::FirstName => &self.first_name,
            SortField::LastName => &self.last_name,
            SortField::Email => &self.email,
            SortField::Role => &self.role,
        }
    }
}

/// Request body for `POST /updateRole`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleUpdateRequest {
    /// Employee to update.
    #[serde(default)]
    pub employee_id: String,
    /// New role value.
    #[serde(default)]
    pub role: String,
}

/// Columns the home table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    EmployeeId,
    FirstName,
    LastName,
    Email,
    Role,
}

impl SortField {
    pub const ALL: [SortField; 5] = [
        SortField::EmployeeId,
        SortField::FirstName,
        SortField::LastName,
        SortField::Email,
        SortField::Role,
    ];

    /// Parses the wire name; unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "employeeId" => Some(SortField::EmployeeId),
            "firstName" => Some(SortField::FirstName),
            "lastName" => Some(SortField::LastName),
            "email" => Some(SortField::Email),
            "role" => Some(SortField::Role),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::EmployeeId => "employeeId",
            SortField::FirstName => "firstName",
            SortField::LastName => "lastName",
            SortField::Email => "email",
            SortField::Role => "role",
        }
    }

    /// Column heading on the home page.
    pub fn label(&self) -> &'static str {
        match self {
            SortField::EmployeeId => "Employee ID",
            SortField::FirstName => "First Name",
            SortField::LastName => "Last Name",
            SortField::Email => "Email",
            SortField::Role => "Role",
        }
    }
}

/// Sort direction. Only `desc` reverses and only `none` disables sorting;
/// anything else sorts ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
    None,
}

impl SortDirection {
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("desc") {
            SortDirection::Desc
        } else if raw.eq_ignore_ascii_case("none") {
            SortDirection::None
        } else {
            SortDirection::Asc
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
            SortDirection::None => "none",
        }
    }

    /// Direction a column header link should request next.
    pub fn toggled(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc | SortDirection::None => SortDirection::Asc,
        }
    }
}

/// Query parameters of the home page.
///
/// `page` and `size` are signed so that out-of-range values reach
/// [`PageWindow`](crate::response::PageWindow) and get clamped there.
#[derive(Debug, Clone, Deserialize)]
pub struct ListUsersParams {
    pub sort: Option<String>,
    #[serde(default = "default_dir")]
    pub dir: String,
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

fn default_dir() -> String {
    "asc".to_string()
}

fn default_page() -> i64 {
    1
}

fn default_size() -> i64 {
    10
}

impl Default for ListUsersParams {
    fn default() -> Self {
        Self {
            sort: None,
            dir: default_dir(),
            page: default_page(),
            size: default_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_field_round_trip_names() {
        for field in SortField::ALL {
            assert_eq!(SortField::parse(field.as_str()), Some(field));
        }
        assert_eq!(SortField::parse("salary"), None);
        assert_eq!(SortField::parse("LASTNAME"), None);
    }

    #[test]
    fn test_direction_parse_is_lenient() {
        assert_eq!(SortDirection::parse("DESC"), SortDirection::Desc);
        assert_eq!(SortDirection::parse("None"), SortDirection::None);
        assert_eq!(SortDirection::parse("sideways"), SortDirection::Asc);
    }

    #[test]
    fn test_role_update_request_is_camel_case() {
        let req: RoleUpdateRequest =
            serde_json::from_str(r#"{"employeeId":"E-7","role":"admin"}"#).unwrap();
        assert_eq!(req.employee_id, "E-7");
        assert_eq!(req.role, "admin");
    }
}
