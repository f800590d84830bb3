use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{dto::UserChanges, models::User, PGPool};

const USER_COLUMNS: &str = "id, name, email, pwd_hash, role";

pub async fn create(user: &User, pool: &PGPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO users (id, name, email, pwd_hash, role)
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(user.id)
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.pwd_hash)
    .bind(user.role)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_by_id(id: Uuid, pool: &PGPool) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn get_by_email(email: &str, pool: &PGPool) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

pub async fn email_exists(email: &str, pool: &PGPool) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
        .bind(email)
        .fetch_one(pool)
        .await
}

pub async fn get_all(pool: &PGPool) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users"))
        .fetch_all(pool)
        .await
}

pub async fn set_fields(id: Uuid, changes: UserChanges, pool: &PGPool) -> Result<u64, sqlx::Error> {
    if changes.is_empty() {
        return Ok(0);
    }
    let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET ");
    let mut fields = query_builder.separated(", ");
    if let Some(name) = &changes.name {
        fields.push("name = ").push_bind_unseparated(name);
    }
    if let Some(email) = &changes.email {
        fields.push("email = ").push_bind_unseparated(email);
    }
    if let Some(pwd_hash) = &changes.pwd_hash {
        fields.push("pwd_hash = ").push_bind_unseparated(pwd_hash);
    }
    query_builder.push(" WHERE id = ").push_bind(id);
    let res = query_builder.build().execute(pool).await?;
    Ok(res.rows_affected())
}
