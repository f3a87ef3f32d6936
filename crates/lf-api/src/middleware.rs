//! lostfound/crates/lf-api/src/middleware.rs
//!
//! Custom middleware for security, logging, and traffic control.

use actix_web::middleware::Logger;
use actix_cors::Cors;

// Returns a standard set of middleware for the API.
pub fn standard_middleware() -> Logger {
    // We use the 'default' logger which outputs:
    // remote-ip "request-line" status-code response-size "referrer" "user-agent"
    Logger::default()
}

// Configures CORS (Cross-Origin Resource Sharing).
// The UI is served separately from the API, so the policy stays open
// for GET/POST like the original deployment.
pub fn cors_policy() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_header()
        .allowed_methods(vec!["GET", "POST"])
        .max_age(3600)
}
