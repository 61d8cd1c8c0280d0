//! HTML views.
//!
//! Two pages, `home` and `settings`, rendered from their models. All dynamic
//! text goes through `html_escape`.

use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use common::models::{SortDirection, SortField};

use crate::service::{HomePage, SettingsPage};

const STYLE: &str = "body{font-family:sans-serif;margin:2rem}\
table{border-collapse:collapse}th,td{border:1px solid #ccc;padding:.3rem .6rem}\
.error{color:#a00}.success{color:#070}nav a{margin-right:1rem}";

const ROLE_SCRIPT: &str = r#"<script>
function updateRole(button) {
  const id = button.dataset.employeeId;
  const role = document.getElementById('role-' + id).value;
  fetch('/updateRole', {
    method: 'POST',
    headers: {'Content-Type': 'application/json'},
    body: JSON.stringify({employeeId: id, role: role})
  }).then(r => r.text()).then(t => { document.getElementById('status-' + id).textContent = t; });
}
</script>"#;

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>{}</title>\
         <style>{}</style></head><body>\n\
         <nav><a href=\"/\">Users</a><a href=\"/settings\">Settings</a></nav>\n{}</body></html>\n",
        text(title),
        STYLE,
        body
    )
}

/// Query string for the home page; only known values are emitted.
fn home_href(sort: Option<SortField>, dir: SortDirection, page: u32, size: u32) -> String {
    let mut href = format!("/?page={}&size={}&dir={}", page, size, dir.as_str());
    if let Some(field) = sort {
        let _ = write!(href, "&sort={}", field.as_str());
    }
    href
}

/// Renders the `home` view.
pub fn render_home(page: &HomePage) -> String {
    let window = &page.window;
    let current = page.sort.as_deref().and_then(SortField::parse);
    let mut body = String::from("<h1>Users</h1>\n");

    for error in &page.errors {
        let _ = writeln!(body, "<p class=\"error\">{}</p>", text(error));
    }
    if page.sources_queried == 0 {
        body.push_str("<p>No data sources configured. <a href=\"/settings\">Add one</a>.</p>\n");
    }

    body.push_str("<table>\n<thead><tr><th>#</th>");
    for field in SortField::ALL {
        let dir = if current == Some(field) {
            page.dir.toggled()
        } else {
            SortDirection::Asc
        };
        let href = home_href(Some(field), dir, 1, window.size);
        let _ = write!(
            body,
            "<th><a href=\"{}\">{}</a></th>",
            attr(&href),
            text(field.label())
        );
    }
    body.push_str("<th></th></tr></thead>\n<tbody>\n");

    for (offset, user) in page.users.iter().enumerate() {
        let id = attr(&user.employee_id);
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>\
             <td><input id=\"role-{id}\" value=\"{}\"></td>\
             <td><button data-employee-id=\"{id}\" onclick=\"updateRole(this)\">Save</button> <span id=\"status-{id}\"></span></td></tr>",
            window.start_index + offset,
            text(&user.employee_id),
            text(&user.first_name),
            text(&user.last_name),
            text(&user.email),
            attr(&user.role),
            id = id,
        );
    }
    body.push_str("</tbody>\n</table>\n");

    let _ = write!(
        body,
        "<p>Page {} of {} ({} users)</p>\n<p>",
        window.page, window.total_pages, window.total
    );
    if window.has_prev() {
        let href = home_href(current, page.dir, window.page - 1, window.size);
        let _ = write!(body, "<a href=\"{}\">Previous</a> ", attr(&href));
    }
    if window.has_next() {
        let href = home_href(current, page.dir, window.page + 1, window.size);
        let _ = write!(body, "<a href=\"{}\">Next</a>", attr(&href));
    }
    body.push_str("</p>\n");
    body.push_str(ROLE_SCRIPT);

    layout("Users", &body)
}

/// Renders the `settings` view.
pub fn render_settings(page: &SettingsPage) -> String {
    let mut body = String::from("<h1>Data Sources</h1>\n");
    if let Some(message) = &page.success {
        let _ = writeln!(body, "<p class=\"success\">{}</p>", text(message));
    }

    body.push_str("<form method=\"post\" action=\"/settings\">\n<table>\n");
    body.push_str(
        "<thead><tr><th>Name</th><th>URL</th><th>Username</th><th>Password</th><th>Driver</th></tr></thead>\n<tbody>\n",
    );
    for (i, row) in page.rows.iter().enumerate() {
        let driver = row.config.driver_class_name.as_deref().unwrap_or("");
        let _ = writeln!(
            body,
            "<tr><td><input name=\"sources[{i}].name\" value=\"{}\"></td>\
             <td><input name=\"sources[{i}].url\" value=\"{}\" size=\"40\"></td>\
             <td><input name=\"sources[{i}].username\" value=\"{}\"></td>\
             <td><input type=\"password\" name=\"sources[{i}].password\" value=\"{}\"></td>\
             <td><input name=\"sources[{i}].driverClassName\" value=\"{}\"></td></tr>",
            attr(&row.name),
            attr(&row.config.url),
            attr(&row.config.username),
            attr(&row.config.password),
            attr(driver),
            i = i,
        );
    }
    body.push_str("</tbody>\n</table>\n<button type=\"submit\">Save</button>\n</form>\n");

    layout("Settings", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::{DataSourceConfig, NamedDataSource, User};
    use common::response::PageWindow;

    fn home(users: Vec<User>, errors: Vec<String>) -> HomePage {
        HomePage {
            window: PageWindow::new(1, 10, users.len()),
            users,
            sort: Some("lastName".into()),
            dir: SortDirection::Asc,
            errors,
            sources_queried: 1,
        }
    }

    #[test]
    fn test_home_escapes_cells() {
        let html = render_home(&home(
            vec![User::new("1", "<b>Ada</b>", "Lovelace", "ada@example.com", "admin")],
            vec![],
        ));
        assert!(html.contains("&lt;b&gt;Ada&lt;/b&gt;"));
        assert!(!html.contains("<b>Ada</b>"));
    }

    #[test]
    fn test_employee_id_stays_out_of_script() {
        let html = render_home(&home(
            vec![User::new("x');alert(1);//", "Eve", "Mallory", "eve@example.com", "user")],
            vec![],
        ));
        assert!(!html.contains("updateRole('x')"));
        assert!(html.contains("data-employee-id=\"x');alert(1);//\" onclick=\"updateRole(this)\""));
    }

    #[test]
    fn test_home_shows_errors_and_toggles_sort_link() {
        let html = render_home(&home(vec![], vec!["Could not fetch users from a: refused".into()]));
        assert!(html.contains("<p class=\"error\">Could not fetch users from a: refused</p>"));
        assert!(html.contains("dir=desc&amp;sort=lastName"));
    }

    #[test]
    fn test_settings_rows_are_indexed() {
        let page = SettingsPage {
            rows: vec![
                NamedDataSource {
                    name: "hr".into(),
                    config: DataSourceConfig {
                        url: "mysql://hr/db".into(),
                        ..Default::default()
                    },
                },
                NamedDataSource::default(),
            ],
            success: Some("Settings saved successfully!".into()),
        };
        let html = render_settings(&page);
        assert!(html.contains("name=\"sources[0].name\" value=\"hr\""));
        assert!(html.contains("name=\"sources[1].url\" value=\"\""));
        assert!(html.contains("Settings saved successfully!"));
    }
}
