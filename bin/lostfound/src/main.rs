//! # lostfound Binary
//!
//! The entry point that assembles the application based on compile-time
//! features: one repo, one blob store, one auth provider, one mailer,
//! all wired behind the lf-core ports.

use actix_web::{web, App, HttpServer};
use lf_api::{configure_routes, handlers::AppState, middleware};
use lf_core::traits::{AuthProvider, BlobStore, ItemRepo, LiveChannel, Mailer, UserRepo};
use lf_match::{MatchFeed, Matcher, Notifier};
use std::sync::Arc;

#[cfg(feature = "db-sqlite")]
use lf_db_sqlite::{SqliteItemRepo, SqliteUserRepo};

#[cfg(feature = "storage-local")]
use lf_storage_local::LocalBlobStore;

#[cfg(feature = "auth-simple")]
use lf_auth_simple::SimpleAuthProvider;

#[cfg(feature = "mail-sendgrid")]
use lf_mail_sendgrid::{DisabledMailer, SendGridMailer};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let database_url = env_or("DATABASE_URL", "sqlite:lostfound.db");
    let upload_dir = env_or("UPLOAD_DIR", "./data/uploads");
    let bind_addr = env_or("BIND_ADDR", "127.0.0.1:8080");

    std::fs::create_dir_all(&upload_dir)?;

    // 1. Initialize database implementation
    #[cfg(feature = "db-sqlite")]
    let pool = lf_db_sqlite::connect(&database_url)
        .await
        .expect("Failed to init SQLite");
    #[cfg(feature = "db-sqlite")]
    let items: Arc<dyn ItemRepo> = Arc::new(SqliteItemRepo::new(pool.clone()));
    #[cfg(feature = "db-sqlite")]
    let users: Arc<dyn UserRepo> = Arc::new(SqliteUserRepo::new(pool));

    // 2. Initialize storage implementation
    #[cfg(feature = "storage-local")]
    let blobs: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(
        upload_dir.clone().into(),
        "/static/uploads".into(),
    ));

    // 3. Initialize auth implementation
    #[cfg(feature = "auth-simple")]
    let auth: Arc<dyn AuthProvider> = Arc::new(SimpleAuthProvider::new());

    // 4. Initialize mail implementation
    #[cfg(feature = "mail-sendgrid")]
    let mailer: Arc<dyn Mailer> = match std::env::var("SENDGRID_API_KEY") {
        Ok(key) if !key.is_empty() => {
            let from = env_or("MAIL_FROM", "lostfound@example.edu");
            Arc::new(SendGridMailer::new(key, from)) as Arc<dyn Mailer>
        }
        _ => {
            log::warn!("SENDGRID_API_KEY not set, match mail is disabled");
            Arc::new(DisabledMailer) as Arc<dyn Mailer>
        }
    };

    // 5. Wire the matching core and its post-commit fan-out
    let feed = Arc::new(MatchFeed::new());
    let matcher = Matcher::new(Arc::clone(&items), Arc::clone(&blobs));
    let notifier = Notifier::new(
        Arc::clone(&feed) as Arc<dyn LiveChannel>,
        mailer,
        Arc::clone(&users),
    );

    let state = web::Data::new(AppState {
        items,
        users,
        blobs,
        auth,
        matcher,
        notifier,
        feed,
    });

    log::info!("lostfound listening on http://{bind_addr}");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::standard_middleware())
            .wrap(middleware::cors_policy())
            .service(actix_files::Files::new("/static/uploads", upload_dir.clone()))
            .configure(configure_routes)
    })
    .bind(bind_addr)?
    .run()
    .await
}
