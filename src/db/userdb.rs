// db/userdb.rs
use async_trait::async_trait;

use super::db::DBClient;

use crate::models::usermodel::{User, UserRole};

const USER_COLUMNS: &str = r#"
    id, name, email, password_hash, phone, role,
    profile_picture_url, location, bio, created_at, updated_at
"#;

#[async_trait]
pub trait UserExt {
    async fn get_user(
        &self,
        user_id: Option<i32>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error>;

    async fn get_users(&self, page: u32, limit: usize) -> Result<Vec<User>, sqlx::Error>;

    async fn get_user_count(&self) -> Result<i64, sqlx::Error>;

    async fn save_user<T: Into<String> + Send>(
        &self,
        name: T,
        email: T,
        password_hash: T,
        phone: Option<String>,
        role: UserRole,
    ) -> Result<User, sqlx::Error>;

    async fn update_user_profile(
        &self,
        user_id: i32,
        name: Option<String>,
        phone: Option<String>,
        profile_picture_url: Option<String>,
        location: Option<String>,
        bio: Option<String>,
    ) -> Result<User, sqlx::Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(
        &self,
        user_id: Option<i32>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut user: Option<User> = None;

        if let Some(user_id) = user_id {
            user = sqlx::query_as::<_, User>(&format!(
                "SELECT {} FROM users WHERE id = $1",
                USER_COLUMNS
            ))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        } else if let Some(email) = email {
            user = sqlx::query_as::<_, User>(&format!(
                "SELECT {} FROM users WHERE email = $1",
                USER_COLUMNS
            ))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        }

        Ok(user)
    }

    async fn get_users(&self, page: u32, limit: usize) -> Result<Vec<User>, sqlx::Error> {
        let offset = (page.max(1) - 1) as i64 * limit as i64;

        sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY id ASC LIMIT $1 OFFSET $2",
            USER_COLUMNS
        ))
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_user_count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
    }

    async fn save_user<T: Into<String> + Send>(
        &self,
        name: T,
        email: T,
        password_hash: T,
        phone: Option<String>,
        role: UserRole,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, phone, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(name.into())
        .bind(email.into())
        .bind(password_hash.into())
        .bind(phone)
        .bind(role)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_user_profile(
        &self,
        user_id: i32,
        name: Option<String>,
        phone: Option<String>,
        profile_picture_url: Option<String>,
        location: Option<String>,
        bio: Option<String>,
    ) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                profile_picture_url = COALESCE($4, profile_picture_url),
                location = COALESCE($5, location),
                bio = COALESCE($6, bio),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(name)
        .bind(phone)
        .bind(profile_picture_url)
        .bind(location)
        .bind(bio)
        .fetch_one(&self.pool)
        .await
    }
}
