//! Client-side dispatcher for the REST API.
//!
//! Each action performs one HTTP call and maps the outcome to an [`Event`];
//! server-reported field errors are additionally pushed onto an independent
//! alert queue. A pure [`SessionState`] reducer applies events to view state.
//! No retry, no offline queueing; last write wins.

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Success,
    Warning,
    Danger,
}

/// Side-channel user-facing notification, dispatched independently of events.
#[derive(Debug, Clone)]
pub struct Alert {
    pub id: String,
    pub msg: String,
    pub level: AlertLevel,
}

#[derive(Debug, Clone)]
pub enum Event {
    UserLoaded(Value),
    AuthFailed,
    Registered { token: String },
    RegisterFailed,
    LoggedIn { token: String },
    LoginFailed,
    LoggedOut,
    ProfileLoaded(Value),
    ProfilesLoaded(Vec<Value>),
    ProfileFailed { msg: String, status: u16 },
    AccountDeleted,
    PostsLoaded(Vec<Value>),
    PostAdded(Value),
    PostRemoved(String),
    LikesUpdated { post_id: String, likes: Vec<String> },
    CommentsUpdated { post_id: String, comments: Vec<Value> },
    PostFailed { msg: String, status: u16 },
}

/// Client view state. Events are the only way it changes.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub token: Option<String>,
    pub authenticated: bool,
    pub user: Option<Value>,
    pub profile: Option<Value>,
    pub profiles: Vec<Value>,
    pub posts: Vec<Value>,
    pub last_error: Option<(String, u16)>,
}

impl SessionState {
    pub fn apply(&mut self, event: Event) {
        match event {
            Event::UserLoaded(user) => {
                self.authenticated = true;
                self.user = Some(user);
            }
            Event::AuthFailed | Event::LoggedOut => {
                self.token = None;
                self.authenticated = false;
                self.user = None;
                // Logging out always clears the loaded profile too.
                self.profile = None;
            }
            Event::Registered { token } | Event::LoggedIn { token } => {
                self.token = Some(token);
                self.authenticated = true;
            }
            Event::RegisterFailed | Event::LoginFailed => {
                self.token = None;
                self.authenticated = false;
            }
            Event::ProfileLoaded(profile) => {
                self.profile = Some(profile);
            }
            Event::ProfilesLoaded(profiles) => {
                self.profiles = profiles;
            }
            Event::ProfileFailed { msg, status } => {
                self.last_error = Some((msg, status));
            }
            Event::AccountDeleted => {
                self.token = None;
                self.authenticated = false;
                self.user = None;
                self.profile = None;
                self.posts.clear();
            }
            Event::PostsLoaded(posts) => {
                self.posts = posts;
            }
            Event::PostAdded(post) => {
                self.posts.insert(0, post);
            }
            Event::PostRemoved(id) => {
                self.posts.retain(|p| p["id"] != id.as_str());
            }
            Event::LikesUpdated { post_id, likes } => {
                let likes = json!(likes);
                for post in &mut self.posts {
                    if post["id"] == post_id.as_str() {
                        post["likes"] = likes.clone();
                    }
                }
            }
            Event::CommentsUpdated { post_id, comments } => {
                let comments = json!(comments);
                for post in &mut self.posts {
                    if post["id"] == post_id.as_str() {
                        post["comments"] = comments.clone();
                    }
                }
            }
            Event::PostFailed { msg, status } => {
                self.last_error = Some((msg, status));
            }
        }
    }
}

/// Pull the field messages out of an error body: either
/// `{"errors": [{"msg": ...}]}` or `{"msg": ...}`.
pub fn error_messages(body: &Value) -> Vec<String> {
    if let Some(errors) = body["errors"].as_array() {
        return errors
            .iter()
            .filter_map(|e| e["msg"].as_str())
            .map(str::to_string)
            .collect();
    }
    body["msg"].as_str().map(str::to_string).into_iter().collect()
}

pub struct Dispatcher {
    http: Client,
    base_url: String,
    token: Option<String>,
    alerts: Vec<Alert>,
}

impl Dispatcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            token: None,
            alerts: Vec::new(),
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Drain pending notifications for display.
    pub fn take_alerts(&mut self) -> Vec<Alert> {
        std::mem::take(&mut self.alerts)
    }

    fn alert(&mut self, msg: impl Into<String>, level: AlertLevel) {
        self.alerts.push(Alert {
            id: Uuid::new_v4().to_string(),
            msg: msg.into(),
            level,
        });
    }

    fn alert_errors(&mut self, body: &Value) {
        for msg in error_messages(body) {
            self.alert(msg, AlertLevel::Danger);
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.header("Authorization", format!("Bearer {}", token)),
            None => builder,
        }
    }

    async fn response_parts(resp: Response) -> (StatusCode, Value) {
        let status = resp.status();
        let body = resp.json::<Value>().await.unwrap_or(Value::Null);
        (status, body)
    }

    fn failure(status: StatusCode) -> (String, u16) {
        let msg = status.canonical_reason().unwrap_or("Request failed").to_string();
        (msg, status.as_u16())
    }

    // === Auth actions ===

    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> anyhow::Result<Event> {
        let resp = self
            .http
            .post(self.url("/api/users"))
            .json(&json!({"name": name, "email": email, "password": password}))
            .send()
            .await?;
        let (status, body) = Self::response_parts(resp).await;

        if status.is_success() {
            let token = body["token"].as_str().unwrap_or_default().to_string();
            self.token = Some(token.clone());
            Ok(Event::Registered { token })
        } else {
            self.alert_errors(&body);
            Ok(Event::RegisterFailed)
        }
    }

    pub async fn login(&mut self, email: &str, password: &str) -> anyhow::Result<Event> {
        let resp = self
            .http
            .post(self.url("/api/auth"))
            .json(&json!({"email": email, "password": password}))
            .send()
            .await?;
        let (status, body) = Self::response_parts(resp).await;

        if status.is_success() {
            let token = body["token"].as_str().unwrap_or_default().to_string();
            self.token = Some(token.clone());
            Ok(Event::LoggedIn { token })
        } else {
            self.alert_errors(&body);
            Ok(Event::LoginFailed)
        }
    }

    pub async fn load_user(&mut self) -> anyhow::Result<Event> {
        let resp = self.authed(self.http.get(self.url("/api/auth"))).send().await?;
        let (status, body) = Self::response_parts(resp).await;

        if status.is_success() {
            Ok(Event::UserLoaded(body))
        } else {
            Ok(Event::AuthFailed)
        }
    }

    pub fn logout(&mut self) -> Event {
        self.token = None;
        Event::LoggedOut
    }

    // === Profile actions ===

    pub async fn load_profile(&mut self) -> anyhow::Result<Event> {
        let resp = self
            .authed(self.http.get(self.url("/api/profile/me")))
            .send()
            .await?;
        let (status, body) = Self::response_parts(resp).await;

        if status.is_success() {
            Ok(Event::ProfileLoaded(body))
        } else {
            self.alert("No profile for the user", AlertLevel::Warning);
            let (msg, code) = Self::failure(status);
            Ok(Event::ProfileFailed { msg, status: code })
        }
    }

    pub async fn load_profiles(&mut self) -> anyhow::Result<Event> {
        let resp = self.http.get(self.url("/api/profile")).send().await?;
        let (status, body) = Self::response_parts(resp).await;

        if status.is_success() {
            Ok(Event::ProfilesLoaded(body.as_array().cloned().unwrap_or_default()))
        } else {
            let (msg, code) = Self::failure(status);
            Ok(Event::ProfileFailed { msg, status: code })
        }
    }

    pub async fn save_profile(&mut self, fields: Value) -> anyhow::Result<Event> {
        let resp = self
            .authed(self.http.post(self.url("/api/profile")))
            .json(&fields)
            .send()
            .await?;
        let (status, body) = Self::response_parts(resp).await;

        if status.is_success() {
            self.alert("Profile Updated", AlertLevel::Success);
            Ok(Event::ProfileLoaded(body))
        } else {
            self.alert_errors(&body);
            let (msg, code) = Self::failure(status);
            Ok(Event::ProfileFailed { msg, status: code })
        }
    }

    pub async fn add_experience(&mut self, entry: Value) -> anyhow::Result<Event> {
        self.put_profile_entry("/api/profile/experience", entry, "Experience Added").await
    }

    pub async fn add_education(&mut self, entry: Value) -> anyhow::Result<Event> {
        self.put_profile_entry("/api/profile/education", entry, "Education Added").await
    }

    async fn put_profile_entry(
        &mut self,
        path: &str,
        entry: Value,
        success_msg: &str,
    ) -> anyhow::Result<Event> {
        let resp = self
            .authed(self.http.put(self.url(path)))
            .json(&entry)
            .send()
            .await?;
        let (status, body) = Self::response_parts(resp).await;

        if status.is_success() {
            self.alert(success_msg, AlertLevel::Success);
            Ok(Event::ProfileLoaded(body))
        } else {
            self.alert_errors(&body);
            let (msg, code) = Self::failure(status);
            Ok(Event::ProfileFailed { msg, status: code })
        }
    }

    pub async fn delete_experience(&mut self, id: &str) -> anyhow::Result<Event> {
        self.delete_profile_entry(&format!("/api/profile/experience/{}", id), "Experience Removed")
            .await
    }

    pub async fn delete_education(&mut self, id: &str) -> anyhow::Result<Event> {
        self.delete_profile_entry(&format!("/api/profile/education/{}", id), "Education Removed")
            .await
    }

    async fn delete_profile_entry(
        &mut self,
        path: &str,
        success_msg: &str,
    ) -> anyhow::Result<Event> {
        let resp = self.authed(self.http.delete(self.url(path))).send().await?;
        let (status, body) = Self::response_parts(resp).await;

        if status.is_success() {
            self.alert(success_msg, AlertLevel::Success);
            Ok(Event::ProfileLoaded(body))
        } else {
            self.alert_errors(&body);
            let (msg, code) = Self::failure(status);
            Ok(Event::ProfileFailed { msg, status: code })
        }
    }

    pub async fn delete_account(&mut self) -> anyhow::Result<Event> {
        let resp = self
            .authed(self.http.delete(self.url("/api/profile")))
            .send()
            .await?;
        let (status, body) = Self::response_parts(resp).await;

        if status.is_success() {
            self.token = None;
            self.alert("Your account has been permanently deleted", AlertLevel::Danger);
            Ok(Event::AccountDeleted)
        } else {
            self.alert_errors(&body);
            let (msg, code) = Self::failure(status);
            Ok(Event::ProfileFailed { msg, status: code })
        }
    }

    // === Post actions ===

    pub async fn load_posts(&mut self) -> anyhow::Result<Event> {
        let resp = self.authed(self.http.get(self.url("/api/posts"))).send().await?;
        let (status, body) = Self::response_parts(resp).await;

        if status.is_success() {
            Ok(Event::PostsLoaded(body.as_array().cloned().unwrap_or_default()))
        } else {
            let (msg, code) = Self::failure(status);
            Ok(Event::PostFailed { msg, status: code })
        }
    }

    pub async fn add_post(&mut self, text: &str) -> anyhow::Result<Event> {
        let resp = self
            .authed(self.http.post(self.url("/api/posts")))
            .json(&json!({"text": text}))
            .send()
            .await?;
        let (status, body) = Self::response_parts(resp).await;

        if status.is_success() {
            self.alert("Post Created", AlertLevel::Success);
            Ok(Event::PostAdded(body))
        } else {
            self.alert_errors(&body);
            let (msg, code) = Self::failure(status);
            Ok(Event::PostFailed { msg, status: code })
        }
    }

    pub async fn delete_post(&mut self, id: &str) -> anyhow::Result<Event> {
        let resp = self
            .authed(self.http.delete(self.url(&format!("/api/posts/{}", id))))
            .send()
            .await?;
        let (status, body) = Self::response_parts(resp).await;

        if status.is_success() {
            self.alert("Post Removed", AlertLevel::Success);
            Ok(Event::PostRemoved(id.to_string()))
        } else {
            self.alert_errors(&body);
            let (msg, code) = Self::failure(status);
            Ok(Event::PostFailed { msg, status: code })
        }
    }

    pub async fn like_post(&mut self, id: &str) -> anyhow::Result<Event> {
        self.toggle_like(&format!("/api/posts/like/{}", id), id).await
    }

    pub async fn unlike_post(&mut self, id: &str) -> anyhow::Result<Event> {
        self.toggle_like(&format!("/api/posts/unlike/{}", id), id).await
    }

    async fn toggle_like(&mut self, path: &str, post_id: &str) -> anyhow::Result<Event> {
        let resp = self.authed(self.http.put(self.url(path))).send().await?;
        let (status, body) = Self::response_parts(resp).await;

        if status.is_success() {
            let likes = body
                .as_array()
                .map(|arr| {
                    arr.iter()
                        .filter_map(|v| v.as_str())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            Ok(Event::LikesUpdated { post_id: post_id.to_string(), likes })
        } else {
            let (msg, code) = Self::failure(status);
            Ok(Event::PostFailed { msg, status: code })
        }
    }

    pub async fn add_comment(&mut self, post_id: &str, text: &str) -> anyhow::Result<Event> {
        let resp = self
            .authed(self.http.post(self.url(&format!("/api/posts/comment/{}", post_id))))
            .json(&json!({"text": text}))
            .send()
            .await?;
        let (status, body) = Self::response_parts(resp).await;

        if status.is_success() {
            self.alert("Comment Added", AlertLevel::Success);
            Ok(Event::CommentsUpdated {
                post_id: post_id.to_string(),
                comments: body.as_array().cloned().unwrap_or_default(),
            })
        } else {
            self.alert_errors(&body);
            let (msg, code) = Self::failure(status);
            Ok(Event::PostFailed { msg, status: code })
        }
    }

    pub async fn delete_comment(
        &mut self,
        post_id: &str,
        comment_id: &str,
    ) -> anyhow::Result<Event> {
        let resp = self
            .authed(
                self.http
                    .delete(self.url(&format!("/api/posts/comment/{}/{}", post_id, comment_id))),
            )
            .send()
            .await?;
        let (status, body) = Self::response_parts(resp).await;

        if status.is_success() {
            self.alert("Comment Removed", AlertLevel::Success);
            Ok(Event::CommentsUpdated {
                post_id: post_id.to_string(),
                comments: body.as_array().cloned().unwrap_or_default(),
            })
        } else {
            self.alert_errors(&body);
            let (msg, code) = Self::failure(status);
            Ok(Event::PostFailed { msg, status: code })
        }
    }
}
