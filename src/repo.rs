//! Demo origin repository
//!
//! Stands in for a database: records live in memory and every read pays a
//! configurable latency, which is what makes caching worthwhile.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::LoaderError;
use crate::models::{Blog, User};
use crate::refresh::Loader;

/// In-memory users and blogs with simulated read latency.
#[derive(Debug, Default)]
pub struct Repo {
    users: RwLock<HashMap<Uuid, User>>,
    blogs: RwLock<HashMap<Uuid, Blog>>,
    latency: Duration,
}

impl Repo {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Inserts a user with the given name and returns its id.
    pub async fn insert_user(&self, name: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        let user = User {
            id,
            name: name.into(),
        };
        self.users.write().await.insert(id, user);
        id
    }

    /// Inserts a blog with the given content and returns its id.
    pub async fn insert_blog(&self, content: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        let blog = Blog {
            id,
            content: content.into(),
        };
        self.blogs.write().await.insert(id, blog);
        id
    }

    /// Replaces a user's name, returning false if the user does not exist.
    pub async fn rename_user(&self, id: Uuid, name: impl Into<String>) -> bool {
        match self.users.write().await.get_mut(&id) {
            Some(user) => {
                user.name = name.into();
                true
            }
            None => false,
        }
    }

    pub async fn read_user(&self, id: Uuid) -> Result<User, LoaderError> {
        tokio::time::sleep(self.latency).await;
        self.users
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| LoaderError::NotFound(format!("user {id}")))
    }

    pub async fn read_blog(&self, id: Uuid) -> Result<Blog, LoaderError> {
        tokio::time::sleep(self.latency).await;
        self.blogs
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| LoaderError::NotFound(format!("blog {id}")))
    }

    /// Seeds a few records so a fresh server has something to serve.
    pub async fn seed_demo(&self) -> (Vec<Uuid>, Vec<Uuid>) {
        let mut users = Vec::new();
        for name in ["John Doe", "Jane Roe"] {
            users.push(self.insert_user(name).await);
        }
        let blog = self
            .insert_blog("This is a micro-blog limited to 140 characters.")
            .await;
        (users, vec![blog])
    }
}

// == Loaders ==
/// Loads a user and serializes it as the cached response body.
pub struct UserLoader(pub Arc<Repo>);

#[async_trait]
impl Loader for UserLoader {
    async fn load(&self, id: Uuid) -> Result<Vec<u8>, LoaderError> {
        let user = self.0.read_user(id).await?;
        Ok(serde_json::to_vec(&user)?)
    }
}

/// Loads a blog and serializes it as the cached response body.
pub struct BlogLoader(pub Arc<Repo>);

#[async_trait]
impl Loader for BlogLoader {
    async fn load(&self, id: Uuid) -> Result<Vec<u8>, LoaderError> {
        let blog = self.0.read_blog(id).await?;
        Ok(serde_json::to_vec(&blog)?)
    }
}
