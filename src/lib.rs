pub mod auth;
pub mod config;
pub mod posts;
pub mod profile;
pub mod users;

pub mod core {
    pub mod db;
    pub mod errors;
    pub mod helpers;
    pub mod query_params;
}

pub mod models {
    pub mod models;
}

#[cfg(not(target_arch = "wasm32"))]
pub mod client;

use spin_sdk::http::{Request, Response};
#[cfg(target_arch = "wasm32")]
use spin_sdk::http_component;

use crate::core::errors::ApiError;

#[cfg(target_arch = "wasm32")]
#[http_component]
fn handle(req: Request) -> Response {
    dispatch(req)
}

/// Route a request and convert anything a handler could not deal with into a
/// generic 500. Internals are logged here, never sent to the client.
pub fn dispatch(req: Request) -> Response {
    let method = req.method().to_string();
    let path = req.path().to_string();

    match route(req, &method, &path) {
        Ok(resp) => resp,
        Err(err) => {
            tracing::error!(%method, %path, error = %err, "handler failed");
            ApiError::Internal(err.to_string()).into()
        }
    }
}

fn route(req: Request, method: &str, path: &str) -> anyhow::Result<Response> {
    match (method, path) {
        ("POST", "/api/users") => users::register_user(req),
        ("POST", "/api/auth") => auth::login_user(req),
        ("GET", "/api/auth") => auth::current_user(req),

        ("GET", "/api/profile/me") => profile::get_my_profile(req),
        ("POST", "/api/profile") => profile::upsert_profile(req),
        ("GET", "/api/profile") => profile::list_profiles(req),
        ("DELETE", "/api/profile") => profile::delete_account(req),
        ("PUT", "/api/profile/experience") => profile::add_experience(req),
        ("PUT", "/api/profile/education") => profile::add_education(req),
        ("DELETE", p) if p.starts_with("/api/profile/experience/") => {
            profile::remove_experience(req)
        }
        ("DELETE", p) if p.starts_with("/api/profile/education/") => {
            profile::remove_education(req)
        }
        ("GET", p) if p.starts_with("/api/profile/user/") => profile::get_profile_by_user(req),

        ("POST", "/api/posts") => posts::create_post(req),
        ("GET", "/api/posts") => posts::list_posts(req),
        ("PUT", p) if p.starts_with("/api/posts/like/") => posts::like_post(req),
        ("PUT", p) if p.starts_with("/api/posts/unlike/") => posts::unlike_post(req),
        ("POST", p) if p.starts_with("/api/posts/comment/") => posts::add_comment(req),
        ("DELETE", p) if p.starts_with("/api/posts/comment/") => posts::remove_comment(req),
        ("GET", p) if p.starts_with("/api/posts/") => posts::get_post(req),
        ("DELETE", p) if p.starts_with("/api/posts/") => posts::delete_post(req),

        _ => Ok(Response::builder()
            .status(404)
            .header("Content-Type", "application/json")
            .body(serde_json::to_vec(&serde_json::json!({"error": "No route found"}))?)
            .build()),
    }
}
