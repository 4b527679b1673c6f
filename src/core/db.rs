//! Typed access to the key-value store.
//!
//! Documents are JSON blobs keyed per entity (`user:{id}`, `profile:{user_id}`,
//! `post:{id}`); membership lists (`users_list`, `profiles_list`, `feed`) hold
//! ids. The feed list is ordered newest-first.

use spin_sdk::key_value::Store;
use crate::config::{
    user_key, profile_key, post_key, USERS_LIST_KEY, PROFILES_LIST_KEY, FEED_KEY,
};
use crate::models::models::{Post, Profile, User};

// === Users ===

pub fn get_user(store: &Store, id: &str) -> anyhow::Result<Option<User>> {
    Ok(store.get_json(&user_key(id))?)
}

pub fn find_user_by_email(store: &Store, email: &str) -> anyhow::Result<Option<User>> {
    let ids: Vec<String> = store.get_json(USERS_LIST_KEY)?.unwrap_or_default();
    for id in ids {
        if let Some(user) = store.get_json::<User>(&user_key(&id))? {
            if user.email == email {
                return Ok(Some(user));
            }
        }
    }
    Ok(None)
}

pub fn insert_user(store: &Store, user: &User) -> anyhow::Result<()> {
    store.set_json(&user_key(&user.id), user)?;

    let mut ids: Vec<String> = store.get_json(USERS_LIST_KEY)?.unwrap_or_default();
    ids.push(user.id.clone());
    store.set_json(USERS_LIST_KEY, &ids)?;
    Ok(())
}

pub fn delete_user(store: &Store, id: &str) -> anyhow::Result<()> {
    store.delete(&user_key(id))?;

    let mut ids: Vec<String> = store.get_json(USERS_LIST_KEY)?.unwrap_or_default();
    ids.retain(|existing| existing != id);
    store.set_json(USERS_LIST_KEY, &ids)?;
    Ok(())
}

// === Profiles ===

pub fn get_profile(store: &Store, user_id: &str) -> anyhow::Result<Option<Profile>> {
    Ok(store.get_json(&profile_key(user_id))?)
}

/// Upsert: writing twice for the same user replaces the one document.
pub fn put_profile(store: &Store, profile: &Profile) -> anyhow::Result<()> {
    store.set_json(&profile_key(&profile.user_id), profile)?;

    let mut ids: Vec<String> = store.get_json(PROFILES_LIST_KEY)?.unwrap_or_default();
    if !ids.contains(&profile.user_id) {
        ids.push(profile.user_id.clone());
        store.set_json(PROFILES_LIST_KEY, &ids)?;
    }
    Ok(())
}

pub fn delete_profile(store: &Store, user_id: &str) -> anyhow::Result<()> {
    store.delete(&profile_key(user_id))?;

    let mut ids: Vec<String> = store.get_json(PROFILES_LIST_KEY)?.unwrap_or_default();
    ids.retain(|existing| existing != user_id);
    store.set_json(PROFILES_LIST_KEY, &ids)?;
    Ok(())
}

pub fn list_profiles(store: &Store) -> anyhow::Result<Vec<Profile>> {
    let ids: Vec<String> = store.get_json(PROFILES_LIST_KEY)?.unwrap_or_default();
    let mut profiles = Vec::with_capacity(ids.len());
    for user_id in ids {
        if let Some(profile) = store.get_json::<Profile>(&profile_key(&user_id))? {
            profiles.push(profile);
        }
    }
    Ok(profiles)
}

// === Posts ===

pub fn get_post(store: &Store, id: &str) -> anyhow::Result<Option<Post>> {
    Ok(store.get_json(&post_key(id))?)
}

pub fn insert_post(store: &Store, post: &Post) -> anyhow::Result<()> {
    store.set_json(&post_key(&post.id), post)?;

    let mut feed: Vec<String> = store.get_json(FEED_KEY)?.unwrap_or_default();
    feed.insert(0, post.id.clone()); // prepend newest
    store.set_json(FEED_KEY, &feed)?;
    Ok(())
}

/// Rewrite an existing post in place (likes, comments).
pub fn put_post(store: &Store, post: &Post) -> anyhow::Result<()> {
    store.set_json(&post_key(&post.id), post)?;
    Ok(())
}

pub fn delete_post(store: &Store, id: &str) -> anyhow::Result<()> {
    store.delete(&post_key(id))?;

    let mut feed: Vec<String> = store.get_json(FEED_KEY)?.unwrap_or_default();
    feed.retain(|existing| existing != id);
    store.set_json(FEED_KEY, &feed)?;
    Ok(())
}

/// All posts in feed order (newest first).
pub fn feed_posts(store: &Store) -> anyhow::Result<Vec<Post>> {
    let feed: Vec<String> = store.get_json(FEED_KEY)?.unwrap_or_default();
    let mut posts = Vec::with_capacity(feed.len());
    for id in feed {
        if let Some(post) = store.get_json::<Post>(&post_key(&id))? {
            posts.push(post);
        }
    }
    Ok(posts)
}

pub fn delete_posts_by_user(store: &Store, user_id: &str) -> anyhow::Result<()> {
    let feed: Vec<String> = store.get_json(FEED_KEY)?.unwrap_or_default();
    let mut kept = Vec::with_capacity(feed.len());
    for id in feed {
        match store.get_json::<Post>(&post_key(&id))? {
            Some(post) if post.user_id == user_id => {
                store.delete(&post_key(&id))?;
            }
            _ => kept.push(id),
        }
    }
    store.set_json(FEED_KEY, &kept)?;
    Ok(())
}
