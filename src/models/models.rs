use serde::{Serialize, Deserialize};

#[derive(Serialize, Deserialize, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub avatar: String,
    pub created_at: String,
}

#[derive(Serialize, Deserialize, Clone, Default)]
pub struct SocialLinks {
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub instagram: Option<String>,
    pub linkedin: Option<String>,
    pub facebook: Option<String>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Experience {
    pub id: String,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub from: String,
    pub to: Option<String>,
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Education {
    pub id: String,
    pub school: String,
    pub degree: String,
    pub fieldofstudy: String,
    pub from: String,
    pub to: Option<String>,
    pub current: bool,
    pub description: Option<String>,
}

/// Extended user data, one document per user. `experience` and `education`
/// are ordered newest-first.
#[derive(Serialize, Deserialize, Clone)]
pub struct Profile {
    pub user_id: String,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub status: String,
    pub skills: Vec<String>,
    pub bio: Option<String>,
    pub githubusername: Option<String>,
    pub social: SocialLinks,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub updated_at: String,
}

impl Profile {
    pub fn add_experience(&mut self, entry: Experience) {
        self.experience.insert(0, entry);
    }

    /// Removes exactly the entry with the given id. Unknown ids are a no-op.
    pub fn remove_experience(&mut self, id: &str) {
        self.experience.retain(|e| e.id != id);
    }

    pub fn add_education(&mut self, entry: Education) {
        self.education.insert(0, entry);
    }

    pub fn remove_education(&mut self, id: &str) {
        self.education.retain(|e| e.id != id);
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub created_at: String,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub likes: Vec<String>,
    pub comments: Vec<Comment>,
    pub created_at: String,
}

/// Session token payload. Stateless, never persisted server-side.
#[derive(Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}
