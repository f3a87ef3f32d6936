//! # lf-api
//!
//! The web routing and orchestration layer for the lost-and-found service.

pub mod handlers;
pub mod middleware;
pub mod error;

pub use error::ApiError;
pub use handlers::AppState;

use actix_web::web;

/// Configures the routes for the service.
///
/// # Developer Note
/// We use a scoped configuration to allow the main binary to mount
/// the API under different paths if needed (e.g., /api/v1/).
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            .route("/", web::get().to(handlers::index))
            // Accounts
            .route("/register", web::post().to(handlers::register))
            .route("/login", web::post().to(handlers::login))
            // Reports: upload runs the match scan inline
            .route("/items", web::post().to(handlers::upload_item))
            .route("/items", web::get().to(handlers::list_items))
            .route("/items/{id}", web::get().to(handlers::get_item))
            // Live match announcements (SSE)
            .route("/events", web::get().to(handlers::events)),
    );
}
