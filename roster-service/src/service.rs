//! 用户汇总服务模块
//!
//! 依次查询每个已配置的数据源，合并去重、排序、分页后交给视图层。

use std::collections::HashSet;
use std::sync::Arc;

use common::models::{
    DataSourceItem, ListUsersParams, NamedDataSource, RoleUpdateRequest, SettingsForm,
    SortDirection, SortField, User,
};
use common::response::PageWindow;
use common::utils::sanitize_entry;

use crate::settings_store::SettingsStore;
use crate::source_client::UserSource;

/// Fixed body returned by the role update endpoint.
pub const ROLE_UPDATE_RESPONSE: &str = "Failed";

/// Message shown after a settings submission.
pub const SETTINGS_SAVED: &str = "Settings saved successfully!";

/// Model of the `home` view.
#[derive(Debug, Clone)]
pub struct HomePage {
    /// Rows of the current page.
    pub users: Vec<User>,
    pub window: PageWindow,
    /// Echoed sort field, as requested.
    pub sort: Option<String>,
    pub dir: SortDirection,
    /// One message per failed source.
    pub errors: Vec<String>,
    /// Number of sources actually queried.
    pub sources_queried: usize,
}

/// Model of the `settings` view.
#[derive(Debug, Clone)]
pub struct SettingsPage {
    /// Form rows; never empty.
    pub rows: Vec<NamedDataSource>,
    pub success: Option<String>,
}

/// 用户汇总服务
#[derive(Clone)]
pub struct RosterService {
    store: Arc<dyn SettingsStore>,
    source: Arc<dyn UserSource>,
}

impl RosterService {
    /// 创建新的汇总服务实例
    pub fn new(store: Arc<dyn SettingsStore>, source: Arc<dyn UserSource>) -> Self {
        Self { store, source }
    }

    /// 构建首页模型
    pub async fn home(&self, params: &ListUsersParams) -> HomePage {
        let mut batches = Vec::new();
        let mut errors = Vec::new();

        for NamedDataSource { name, config } in self.store.list().await {
            if !config.is_configured() {
                tracing::debug!(source = %name, "跳过未配置的数据源");
                continue;
            }
            match self.source.fetch_users(&config).await {
                Ok(users) => {
                    tracing::info!(source = %name, rows = users.len(), "已读取用户");
                    batches.push(users);
                }
                Err(e) => {
                    tracing::warn!(source = %name, error = %e, "读取用户失败");
                    errors.push(format!("Could not fetch users from {}: {}", name, e));
                }
            }
        }
        let sources_queried = batches.len() + errors.len();

        let mut users = merge_unique(batches);
        let dir = SortDirection::parse(&params.dir);
        if let Some(field) = params.sort.as_deref().and_then(SortField::parse) {
            sort_users(&mut users, field, dir);
        }

        let window = PageWindow::new(params.page, params.size, users.len());
        let users = users.drain(window.range()).collect();

        HomePage {
            users,
            window,
            sort: params.sort.clone(),
            dir,
            errors,
            sources_queried,
        }
    }

    /// 在所有已配置的数据源上更新角色
    ///
    /// Each source is attempted once and independently; failures are only
    /// logged.
    pub async fn update_role(&self, req: &RoleUpdateRequest) -> &'static str {
        for NamedDataSource { name, config } in self.store.list().await {
            if !config.is_configured() {
                continue;
            }
            match self
                .source
                .update_role(&config, &req.employee_id, &req.role)
                .await
            {
                Ok(rows) => tracing::info!(
                    employee_id = %req.employee_id,
                    source = %name,
                    rows,
                    "角色更新已执行"
                ),
                Err(e) => tracing::error!(
                    employee_id = %req.employee_id,
                    source = %name,
                    error = %e,
                    "角色更新失败"
                ),
            }
        }
        // TODO: report per-source outcomes instead of this fixed body; callers
        // currently cannot tell success from failure.
        ROLE_UPDATE_RESPONSE
    }

    /// 构建设置页模型：每个已保存数据源一行，外加一行空白模板
    pub async fn settings_page(&self) -> SettingsPage {
        let mut rows = self.store.list().await;
        rows.push(NamedDataSource::default());
        SettingsPage { rows, success: None }
    }

    /// 保存设置表单
    pub async fn save_settings(&self, form: SettingsForm) -> SettingsPage {
        let mut saved = 0usize;
        for (index, entry) in form.sources.iter().enumerate() {
            let Some(entry) = sanitize_entry(entry, index + 1) else {
                continue;
            };
            self.store.set(&entry.name, entry.config).await;
            saved += 1;
        }
        tracing::info!(saved, submitted = form.sources.len(), "设置已保存");

        let mut page = self.settings_page().await;
        page.success = Some(SETTINGS_SAVED.to_string());
        page
    }

    /// 列出所有数据源（不含密码）
    pub async fn list_sources(&self) -> Vec<DataSourceItem> {
        self.store
            .list()
            .await
            .into_iter()
            .map(DataSourceItem::from)
            .collect()
    }

    /// 数据源数量
    pub async fn source_count(&self) -> usize {
        self.store.list().await.len()
    }
}

/// Concatenates batches in order, keeping the first row seen per employee id.
///
/// Rows without an employee id (NULL in the source) are dropped.
pub fn merge_unique(batches: Vec<Vec<User>>) -> Vec<User> {
    let mut seen = HashSet::new();
    batches
        .into_iter()
        .flatten()
        .filter(|user| !user.employee_id.is_empty())
        .filter(|user| seen.insert(user.employee_id.clone()))
        .collect()
}

/// Stable, case-insensitive sort. `None` leaves the order untouched.
pub fn sort_users(users: &mut [User], field: SortField, dir: SortDirection) {
    match dir {
        SortDirection::None => {}
        SortDirection::Asc => users.sort_by_cached_key(|u| u.field(field).to_lowercase()),
        SortDirection::Desc => users.sort_by_cached_key(|u| {
            std::cmp::Reverse(u.field(field).to_lowercase())
        }),
    }
}
