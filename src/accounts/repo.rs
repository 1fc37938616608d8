use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{NewUser, User, UserChanges};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn map_sqlx(e: sqlx::Error, what: &'static str) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return StoreError::DuplicateEmail;
        }
    }
    StoreError::Other(anyhow::Error::new(e).context(what))
}

/// Persistence port for user records. Uniqueness of `email` is the store's
/// job; losing a race at insert/update time reports `DuplicateEmail`.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn insert(&self, user: NewUser) -> Result<User, StoreError>;
    /// Returns `None` when no user has this id.
    async fn update_by_id(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError>;
}

const USER_COLUMNS: &str =
    "id, name, email, phone, password_hash, image, created_at, updated_at";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, name, email, phone, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_sqlx(e, "insert user"))
    }

    async fn update_by_id(&self, id: Uuid, changes: UserChanges) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET name = $2, email = $3, phone = $4, password_hash = $5,
                   image = $6, updated_at = now()
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(&changes.phone)
        .bind(&changes.password_hash)
        .bind(&changes.image)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| map_sqlx(e, "update user"))
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::sync::Mutex;

    use time::OffsetDateTime;

    use super::*;

    /// Store backed by a `Vec`, enforcing the same unique-email rule as the
    /// database index.
    #[derive(Default)]
    pub struct InMemoryUserStore {
        users: Mutex<Vec<User>>,
    }

    impl InMemoryUserStore {
        pub fn len(&self) -> usize {
            self.users.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl UserStore for InMemoryUserStore {
        async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.email == email).cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
            let users = self.users.lock().unwrap();
            Ok(users.iter().find(|u| u.id == id).cloned())
        }

        async fn insert(&self, user: NewUser) -> Result<User, StoreError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.email == user.email) {
                return Err(StoreError::DuplicateEmail);
            }
            let now = OffsetDateTime::now_utc();
            let user = User {
                id: Uuid::new_v4(),
                name: user.name,
                email: user.email,
                phone: user.phone,
                password_hash: user.password_hash,
                image: None,
                created_at: now,
                updated_at: now,
            };
            users.push(user.clone());
            Ok(user)
        }

        async fn update_by_id(
            &self,
            id: Uuid,
            changes: UserChanges,
        ) -> Result<Option<User>, StoreError> {
            let mut users = self.users.lock().unwrap();
            if users.iter().any(|u| u.id != id && u.email == changes.email) {
                return Err(StoreError::DuplicateEmail);
            }
            let Some(user) = users.iter_mut().find(|u| u.id == id) else {
                return Ok(None);
            };
            user.name = changes.name;
            user.email = changes.email;
            user.phone = changes.phone;
            user.password_hash = changes.password_hash;
            user.image = changes.image;
            user.updated_at = OffsetDateTime::now_utc();
            Ok(Some(user.clone()))
        }
    }

    #[tokio::test]
    async fn insert_enforces_unique_email() {
        let store = InMemoryUserStore::default();
        let new = NewUser {
            name: "Ana".into(),
            email: "ana@x.com".into(),
            phone: "123".into(),
            password_hash: "h".into(),
        };
        store.insert(new.clone()).await.unwrap();
        assert!(matches!(store.insert(new).await, Err(StoreError::DuplicateEmail)));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn update_unknown_id_is_none() {
        let store = InMemoryUserStore::default();
        let changes = UserChanges {
            name: "n".into(),
            email: "e@x.com".into(),
            phone: "p".into(),
            password_hash: "h".into(),
            image: None,
        };
        assert!(store.update_by_id(Uuid::new_v4(), changes).await.unwrap().is_none());
    }
}
