//! Handler模块

use axum::{
    extract::{Query, State},
    response::Html,
    Form, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use common::errors::AppError;
use common::models::{DataSourceItem, ListUsersParams, RoleUpdateRequest, SettingsForm};
use common::response::ApiResponse;

use crate::state::AppState;
use crate::views;

/// 首页：汇总所有数据源的用户
pub async fn home(
    State(state): State<AppState>,
    Query(params): Query<ListUsersParams>,
) -> Html<String> {
    let page = state.roster().home(&params).await;
    Html(views::render_home(&page))
}

/// 显示数据源设置表单
pub async fn show_settings(State(state): State<AppState>) -> Html<String> {
    let page = state.roster().settings_page().await;
    Html(views::render_settings(&page))
}

/// 保存数据源设置
pub async fn submit_settings(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Html<String> {
    let form = SettingsForm::from_pairs(pairs);
    let page = state.roster().save_settings(form).await;
    Html(views::render_settings(&page))
}

/// 在所有数据源上更新用户角色
#[utoipa::path(
    post,
    path = "/updateRole",
    tag = "users",
    request_body = RoleUpdateRequest,
    responses(
        (status = 200, description = "固定文本响应", body = String, content_type = "text/plain")
    )
)]
pub async fn update_role(
    State(state): State<AppState>,
    Json(req): Json<RoleUpdateRequest>,
) -> &'static str {
    state.roster().update_role(&req).await
}

/// 列出已配置的数据源（不含密码）
#[utoipa::path(
    get,
    path = "/api/sources",
    tag = "settings",
    responses(
        (status = 200, description = "数据源列表", body = ApiResponse<Vec<DataSourceItem>>)
    )
)]
pub async fn list_sources(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DataSourceItem>>>, AppError> {
    let data = state.roster().list_sources().await;
    Ok(Json(ApiResponse::ok_with_service(
        data,
        state.config.service_name.clone(),
    )))
}

/// 健康检查端点
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "服务运行正常", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.config.service_name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        sources: state.roster().source_count().await,
    })
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    /// 已保存的数据源数量
    pub sources: usize,
}
