//! 用户汇总服务
//!
//! 提供以下功能：
//! - 从多个已配置的关系型数据源汇总用户，排序并分页展示
//! - 在所有数据源上更新用户角色
//! - 通过表单维护数据源连接设置

mod handlers;
mod routes;
mod service;
mod settings_store;
mod source_client;
mod state;
mod views;

use anyhow::Context;
use axum::{middleware, routing::get, Json, Router};
use common::config::{load_dotenv, AppConfig};
use common::middleware::request_id::request_id_middleware;
use state::AppState;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;

const SERVICE_NAME: &str = "roster-service";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "用户汇总服务 API",
        version = "0.1.0",
        description = "多数据源用户汇总与角色维护"
    ),
    paths(
        handlers::update_role,
        handlers::list_sources,
        handlers::health_check,
    ),
    components(schemas(
        common::models::RoleUpdateRequest,
        common::models::DataSourceItem,
        common::models::User,
        handlers::HealthResponse,
    )),
    tags(
        (name = "users", description = "用户端点"),
        (name = "settings", description = "数据源设置端点"),
        (name = "health", description = "健康检查端点")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    // 初始化日志追踪
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // 加载配置
    let config = AppConfig::load_with_service(SERVICE_NAME);
    info!(
        schema = %config.schema_profile,
        timeout_secs = config.query_timeout_secs,
        "配置已加载"
    );

    let state = AppState::new(config.clone());
    let app = create_router(state);

    // 启动服务
    let addr = config.bind_addr();
    info!(service = SERVICE_NAME, address = %addr, "启动服务");

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("绑定地址失败: {}", addr))?;
    axum::serve(listener, app).await.context("服务启动失败")?;
    Ok(())
}

fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(routes::router())
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
