pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::file_service::FileService;
use crate::services::storage::StorageService;
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::files::upload::upload_file,
        api::handlers::files::stream::stream_file,
        api::handlers::files::list::list_files,
        api::handlers::files::manage::delete_file,
        api::handlers::files::manage::rename_file,
        api::handlers::files::manage::file_info,
        api::handlers::files::image::upload_image,
        api::handlers::files::image::get_image,
        api::handlers::files::image::delete_image,
        api::handlers::packs::create_pack,
        api::handlers::packs::list_packs,
        api::handlers::packs::get_pack,
        api::handlers::packs::update_pack,
        api::handlers::packs::delete_pack,
        api::handlers::shared::get_shared_pack,
        api::handlers::shared::stream_shared_file,
        api::handlers::shared::random_file,
        api::handlers::tags::list_tags,
        api::handlers::tags::files_for_tag,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            api::handlers::auth::RegisterRequest,
            api::handlers::auth::RegisterResponse,
            api::handlers::auth::LoginRequest,
            api::handlers::auth::AuthResponse,
            api::handlers::files::FileResponse,
            api::handlers::files::FileInfoResponse,
            api::handlers::files::FileListResponse,
            api::handlers::files::UploadResponse,
            api::handlers::files::UploadedFile,
            api::handlers::files::VersionResponse,
            api::handlers::files::RenameRequest,
            api::handlers::files::Pagination,
            api::handlers::packs::CreatePackRequest,
            api::handlers::packs::UpdatePackRequest,
            api::handlers::packs::PackResponse,
            api::handlers::packs::PackDetailResponse,
            api::handlers::shared::SharedPackResponse,
            api::handlers::shared::RandomFileResponse,
            api::handlers::health::HealthResponse,
            services::tag_service::TagWithCount,
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "files", description = "Audio upload, streaming, and management"),
        (name = "packs", description = "Shareable collections"),
        (name = "tags", description = "Tag listing and search")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn StorageService>,
    pub file_service: Arc<FileService>,
    pub config: AppConfig,
}

pub fn create_app(state: AppState) -> Router {
    let authed = |router: Router<AppState>| {
        router.layer(from_fn_with_state(
            state.clone(),
            api::middleware::auth::auth_middleware,
        ))
    };

    let private_api = Router::new()
        .route(
            "/api/upload",
            post(api::handlers::files::upload_file).layer(axum::extract::DefaultBodyLimit::max(
                state.config.max_file_size + 10 * 1024 * 1024, // multipart overhead buffer
            )),
        )
        .route("/api/files", get(api::handlers::files::list_files))
        .route("/api/files/:id", get(api::handlers::files::stream_file))
        .route(
            "/api/files/:id/info",
            get(api::handlers::files::file_info),
        )
        .route(
            "/api/files/:id/delete",
            axum::routing::delete(api::handlers::files::delete_file),
        )
        .route(
            "/api/files/:id/rename",
            axum::routing::put(api::handlers::files::rename_file),
        )
        .route(
            "/api/files/:id/image",
            post(api::handlers::files::upload_image)
                .get(api::handlers::files::get_image)
                .delete(api::handlers::files::delete_image),
        )
        .route(
            "/api/packs",
            get(api::handlers::packs::list_packs).post(api::handlers::packs::create_pack),
        )
        .route(
            "/api/packs/:id",
            get(api::handlers::packs::get_pack)
                .patch(api::handlers::packs::update_pack)
                .delete(api::handlers::packs::delete_pack),
        )
        .route("/api/tags", get(api::handlers::tags::list_tags))
        .route("/api/tags/:name", get(api::handlers::tags::files_for_tag));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route("/api/auth/register", post(api::handlers::auth::register))
        .route("/api/auth/login", post(api::handlers::auth::login))
        .route(
            "/api/shared/random",
            get(api::handlers::shared::random_file),
        )
        .route(
            "/api/shared/:share_link",
            get(api::handlers::shared::get_shared_pack),
        )
        .route(
            "/api/shared/:share_link/files/:id",
            get(api::handlers::shared::stream_shared_file),
        )
        .merge(authed(private_api))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
                .expose_headers(Any),
        )
        .with_state(state)
}
