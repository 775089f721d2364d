use async_trait::async_trait;
use uuid::Uuid;

use super::db::DBClient;
use crate::{
    dtos::userdtos::UpdateProfileDto,
    models::usermodel::{AgentSummary, User, UserRole},
};

const USER_COLUMNS: &str = r#"
    id, name, email, password, role,
    phone, city, pincode, profile_picture, bio,
    agency_name, experience, specialties,
    created_at, updated_at
"#;

/// Profile data captured at signup, beyond the credentials.
#[derive(Debug, Default, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
    pub bio: Option<String>,
    pub agency_name: Option<String>,
    pub experience: Option<String>,
    pub specialties: Option<String>,
}

#[async_trait]
pub trait UserExt {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error>;

    async fn save_user(&self, user: NewUser) -> Result<User, sqlx::Error>;

    async fn update_user_name(
        &self,
        email: &str,
        name: &str,
    ) -> Result<Option<User>, sqlx::Error>;

    async fn update_user_profile(
        &self,
        user_id: Uuid,
        profile: UpdateProfileDto,
    ) -> Result<Option<User>, sqlx::Error>;

    async fn update_profile_picture(
        &self,
        user_id: Uuid,
        picture: &str,
    ) -> Result<Option<User>, sqlx::Error>;

    async fn get_agents(&self) -> Result<Vec<AgentSummary>, sqlx::Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(
        &self,
        user_id: Option<Uuid>,
        email: Option<&str>,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut user: Option<User> = None;

        if let Some(user_id) = user_id {
            user = sqlx::query_as::<_, User>(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
            ))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        } else if let Some(email) = email {
            user = sqlx::query_as::<_, User>(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
            ))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        }

        Ok(user)
    }

    async fn save_user(&self, user: NewUser) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (
                name, email, password, role, phone, city, pincode, bio,
                agency_name, experience, specialties
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.name)
        .bind(user.email)
        .bind(user.password)
        .bind(user.role)
        .bind(user.phone)
        .bind(user.city)
        .bind(user.pincode)
        .bind(user.bio)
        .bind(user.agency_name)
        .bind(user.experience)
        .bind(user.specialties)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_user_name(
        &self,
        email: &str,
        name: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET name = $1, updated_at = NOW()
            WHERE LOWER(email) = LOWER($2)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_user_profile(
        &self,
        user_id: Uuid,
        profile: UpdateProfileDto,
    ) -> Result<Option<User>, sqlx::Error> {
        // COALESCE keeps the stored value for every field the caller left out
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                city = COALESCE($4, city),
                pincode = COALESCE($5, pincode),
                profile_picture = COALESCE($6, profile_picture),
                bio = COALESCE($7, bio),
                agency_name = COALESCE($8, agency_name),
                experience = COALESCE($9, experience),
                specialties = COALESCE($10, specialties),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(profile.name)
        .bind(profile.phone)
        .bind(profile.city)
        .bind(profile.pincode)
        .bind(profile.profile_picture)
        .bind(profile.bio)
        .bind(profile.agency_name)
        .bind(profile.experience)
        .bind(profile.specialties)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_profile_picture(
        &self,
        user_id: Uuid,
        picture: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET profile_picture = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(picture)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_agents(&self) -> Result<Vec<AgentSummary>, sqlx::Error> {
        sqlx::query_as::<_, AgentSummary>(
            r#"
            SELECT
                u.id, u.name, u.email, u.phone, u.city, u.profile_picture,
                u.agency_name, u.experience, u.specialties,
                COUNT(p.id) FILTER (WHERE p.deleted = FALSE) AS properties_listed,
                COUNT(p.id) FILTER (WHERE p.deleted = FALSE AND p.listed = FALSE) AS properties_unlisted
            FROM users u
            LEFT JOIN properties p ON p.agent_id = u.id
            WHERE u.role = 'agent'
            GROUP BY u.id
            ORDER BY u.name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
