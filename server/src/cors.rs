use rocket::http::Method;
use rocket_cors::{AllowedHeaders, AllowedOrigins, CorsOptions};

use crate::config::env_or;

pub fn allowed_origins() -> Vec<String> {
    env_or(
        "CORS_ALLOWED_ORIGINS",
        "http://localhost:5173".to_string(),
    )
    .split(',')
    .map(|s| s.trim().to_string())
    .filter(|s| !s.is_empty())
    .collect()
}

pub fn create_cors() -> rocket_cors::Cors {
    let allowed_origins = AllowedOrigins::some_exact(&allowed_origins());

    // Credentials are required for the session cookie to reach the API.
    CorsOptions {
        allowed_origins,
        allowed_methods: [Method::Get, Method::Post, Method::Options]
            .into_iter()
            .map(|m| m.into())
            .collect(),
        allowed_headers: AllowedHeaders::some(&["Accept", "Content-Type", "X-Requested-With"]),
        allow_credentials: true,
        ..Default::default()
    }
    .to_cors()
    .expect("Failed to create CORS configuration")
}
