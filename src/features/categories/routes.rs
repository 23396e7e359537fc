use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::get, Router};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;
use crate::shared::constants::MAX_IMAGE_SIZE;

/// Create routes for the categories feature
pub fn routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route(
            "/api/categories",
            get(handlers::list_categories)
                .post(handlers::create_category)
                // Image limit plus a buffer for the other multipart fields
                .layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE + 1024 * 1024)),
        )
        .route("/api/categories/names", get(handlers::list_category_names))
        .route("/api/categories/roots", get(handlers::list_roots))
        .route("/api/categories/tree", get(handlers::list_localized_tree))
        .route(
            "/api/categories/slug/{slug}",
            get(handlers::get_category_by_slug),
        )
        .route(
            "/api/categories/{id}",
            get(handlers::get_category)
                .put(handlers::update_category)
                .delete(handlers::delete_category)
                .layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE + 1024 * 1024)),
        )
        .route("/api/categories/{id}/children", get(handlers::list_children))
        .with_state(service)
}
