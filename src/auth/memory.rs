use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::repo::{SessionStore, UserStore};
use crate::auth::repo_types::{NewUser, Session, User};
use crate::auth::token;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    email_index: HashMap<String, Uuid>,
    sessions: HashMap<String, Session>,
}

/// Both stores over one lock, so session inserts can check the user exists.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a user record while leaving its sessions behind.
    #[cfg(test)]
    pub async fn forget_user(&self, id: Uuid) {
        let mut t = self.tables.write().await;
        if let Some(user) = t.users.remove(&id) {
            t.email_index.remove(&user.email);
        }
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.tables.read().await.sessions.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let t = self.tables.read().await;
        Ok(t
            .email_index
            .get(email)
            .and_then(|id| t.users.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create(&self, new_user: NewUser) -> anyhow::Result<Option<User>> {
        let mut t = self.tables.write().await;
        if t.email_index.contains_key(&new_user.email) {
            return Ok(None);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            photo: new_user.photo,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        t.email_index.insert(user.email.clone(), user.id);
        t.users.insert(user.id, user.clone());
        Ok(Some(user))
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create(&self, user_id: Uuid) -> anyhow::Result<String> {
        let mut t = self.tables.write().await;
        anyhow::ensure!(
            t.users.contains_key(&user_id),
            "session for unknown user {user_id}"
        );
        let mut token = token::generate();
        while t.sessions.contains_key(&token) {
            token = token::generate();
        }
        let session = Session {
            id: Uuid::new_v4(),
            token: token.clone(),
            user_id,
            created_at: OffsetDateTime::now_utc(),
        };
        t.sessions.insert(token.clone(), session);
        Ok(token)
    }

    async fn find_by_token(&self, token: &str) -> anyhow::Result<Option<Session>> {
        Ok(self.tables.read().await.sessions.get(token).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Ana".into(),
            photo: "p.jpg".into(),
            email: email.into(),
            password_hash: "$argon2id$fake".into(),
        }
    }

    #[tokio::test]
    async fn create_rejects_taken_email_without_touching_original() {
        let store = MemoryStore::new();
        let first = UserStore::create(&store, new_user("ana@x.com"))
            .await
            .unwrap()
            .expect("first insert");

        let mut dup = new_user("ana@x.com");
        dup.name = "Impostor".into();
        assert!(UserStore::create(&store, dup).await.unwrap().is_none());

        let stored = store.find_by_email("ana@x.com").await.unwrap().unwrap();
        assert_eq!(stored.id, first.id);
        assert_eq!(stored.name, "Ana");
    }

    #[tokio::test]
    async fn email_lookup_is_case_sensitive() {
        let store = MemoryStore::new();
        UserStore::create(&store, new_user("Ana@x.com")).await.unwrap();
        assert!(store.find_by_email("ana@x.com").await.unwrap().is_none());
        assert!(UserStore::create(&store, new_user("ana@x.com"))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn concurrent_signups_with_same_email_yield_one_user() {
        let store = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                UserStore::create(store.as_ref(), new_user("race@x.com"))
                    .await
                    .unwrap()
                    .is_some()
            }));
        }
        let mut created = 0;
        for h in handles {
            if h.await.unwrap() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
    }

    #[tokio::test]
    async fn sessions_require_an_existing_user() {
        let store = MemoryStore::new();
        let err = SessionStore::create(&store, Uuid::new_v4()).await.unwrap_err();
        assert!(err.to_string().contains("unknown user"));
    }

    #[tokio::test]
    async fn a_user_may_hold_several_sessions() {
        let store = MemoryStore::new();
        let user = UserStore::create(&store, new_user("ana@x.com"))
            .await
            .unwrap()
            .unwrap();
        let t1 = SessionStore::create(&store, user.id).await.unwrap();
        let t2 = SessionStore::create(&store, user.id).await.unwrap();
        assert_ne!(t1, t2);
        assert_eq!(store.session_count().await, 2);
        for t in [&t1, &t2] {
            let s = store.find_by_token(t).await.unwrap().unwrap();
            assert_eq!(s.user_id, user.id);
        }
        assert!(store.find_by_token("nope").await.unwrap().is_none());
    }
}
