use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub photo: String,
    pub email: String,              // unique across users, stored as given
    #[serde(skip_serializing)]
    pub password_hash: String,      // Argon2 PHC string, never exposed
    pub created_at: OffsetDateTime,
}

/// Fields needed to insert a user; the store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub photo: String,
    pub email: String,
    pub password_hash: String,
}

/// Proof of a successful login.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub token: String,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_user_has_no_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Ana".into(),
            photo: "p.jpg".into(),
            email: "ana@x.com".into(),
            password_hash: "$argon2id$v=19$secret-material".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("ana@x.com"));
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("secret-material"));
    }
}
