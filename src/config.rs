pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const MAX_BIO_LENGTH: usize = 500;
pub const MAX_POST_LENGTH: usize = 5000;
pub const POSTS_PER_PAGE: usize = 20;

pub const USERS_LIST_KEY: &str = "users_list";
pub const PROFILES_LIST_KEY: &str = "profiles_list";
pub const FEED_KEY: &str = "feed";

pub fn user_key(id: &str) -> String {
    format!("user:{}", id)
}

pub fn profile_key(user_id: &str) -> String {
    format!("profile:{}", user_id)
}

pub fn post_key(id: &str) -> String {
    format!("post:{}", id)
}

pub fn server_port() -> u16 {
    std::env::var("DEVLINK_PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(5000)
}

pub fn jwt_secret() -> String {
    std::env::var("DEVLINK_JWT_SECRET").unwrap_or_else(|_| "devlink-dev-secret".to_string())
}

pub fn token_expiration_hours() -> i64 {
    std::env::var("DEVLINK_TOKEN_EXPIRATION_HOURS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(24)
}

pub fn github_token() -> Option<String> {
    std::env::var("DEVLINK_GITHUB_TOKEN").ok()
}
