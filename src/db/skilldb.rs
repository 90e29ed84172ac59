// db/skilldb.rs
use async_trait::async_trait;

use super::db::DBClient;
use crate::models::usermodel::Skill;

#[async_trait]
pub trait SkillExt {
    async fn get_skills(&self) -> Result<Vec<Skill>, sqlx::Error>;

    async fn get_skill(&self, skill_id: i32) -> Result<Option<Skill>, sqlx::Error>;

    async fn save_skill(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<Skill, sqlx::Error>;

    async fn get_user_skills(&self, user_id: i32) -> Result<Vec<Skill>, sqlx::Error>;

    async fn replace_user_skills(
        &self,
        user_id: i32,
        skill_ids: &[i32],
    ) -> Result<Vec<Skill>, sqlx::Error>;

    async fn add_user_skill(&self, user_id: i32, skill_id: i32) -> Result<(), sqlx::Error>;

    async fn remove_user_skill(&self, user_id: i32, skill_id: i32) -> Result<bool, sqlx::Error>;

    /// Ids from `skill_ids` that have no skills row.
    async fn missing_skill_ids(&self, skill_ids: &[i32]) -> Result<Vec<i32>, sqlx::Error>;
}

#[async_trait]
impl SkillExt for DBClient {
    async fn get_skills(&self) -> Result<Vec<Skill>, sqlx::Error> {
        sqlx::query_as::<_, Skill>("SELECT id, name, description FROM skills ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
    }

    async fn get_skill(&self, skill_id: i32) -> Result<Option<Skill>, sqlx::Error> {
        sqlx::query_as::<_, Skill>("SELECT id, name, description FROM skills WHERE id = $1")
            .bind(skill_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn save_skill(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<Skill, sqlx::Error> {
        sqlx::query_as::<_, Skill>(
            r#"
            INSERT INTO skills (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_user_skills(&self, user_id: i32) -> Result<Vec<Skill>, sqlx::Error> {
        sqlx::query_as::<_, Skill>(
            r#"
            SELECT sk.id, sk.name, sk.description
            FROM user_skills us
            JOIN skills sk ON sk.id = us.skill_id
            WHERE us.user_id = $1
            ORDER BY sk.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn replace_user_skills(
        &self,
        user_id: i32,
        skill_ids: &[i32],
    ) -> Result<Vec<Skill>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM user_skills WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO user_skills (user_id, skill_id)
            SELECT $1, UNNEST($2::int4[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(skill_ids.to_vec())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.get_user_skills(user_id).await
    }

    async fn add_user_skill(&self, user_id: i32, skill_id: i32) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO user_skills (user_id, skill_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(skill_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_user_skill(&self, user_id: i32, skill_id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_skills WHERE user_id = $1 AND skill_id = $2")
            .bind(user_id)
            .bind(skill_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn missing_skill_ids(&self, skill_ids: &[i32]) -> Result<Vec<i32>, sqlx::Error> {
        sqlx::query_scalar::<_, i32>(
            r#"
            SELECT wanted.id
            FROM UNNEST($1::int4[]) AS wanted(id)
            LEFT JOIN skills sk ON sk.id = wanted.id
            WHERE sk.id IS NULL
            "#,
        )
        .bind(skill_ids.to_vec())
        .fetch_all(&self.pool)
        .await
    }
}
