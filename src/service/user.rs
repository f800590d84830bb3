use uuid::Uuid;

use crate::db;
use crate::dto::{
    LoginDto, RefreshDto, RegisterDto, TokenResponse, UpdateUserDto, UserChanges, UserView,
};
use crate::errors::{db_err, ApiError};
use crate::models::{Role, User};
use crate::service::{auth::jwt, crypto};
use crate::validation;
use crate::{PGPool, ACCESS_TOKEN_EXP, REFRESH_TOKEN_EXP};

pub async fn register(dto: RegisterDto, pool: &PGPool) -> Result<UserView, ApiError> {
    validation::run(&dto)?;
    if db::user::email_exists(&dto.email, pool).await? {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }
    // The role string already passed validation; parse cannot fail here.
    let role = Role::parse(&dto.role).ok_or_else(|| {
        ApiError::BadRequest("Role must be either organizer or attendee".to_string())
    })?;
    let user = User {
        id: Uuid::new_v4(),
        name: dto.name,
        email: dto.email,
        pwd_hash: crypto::get_sha3_256_hash(&dto.password),
        role,
    };
    db::user::create(&user, pool)
        .await
        .map_err(duplicate_email_conflict)?;
    Ok(user.into())
}

pub async fn login(dto: LoginDto, pool: &PGPool) -> Result<TokenResponse, ApiError> {
    validation::run(&dto)?;
    let user = db::user::get_by_email(&dto.email, pool)
        .await?
        .ok_or_else(invalid_credentials)?;
    if user.pwd_hash != crypto::get_sha3_256_hash(&dto.password) {
        return Err(invalid_credentials());
    }
    let access_token = issue(&jwt::TokenType::Access, &user, ACCESS_TOKEN_EXP)?;
    let refresh_token = issue(&jwt::TokenType::Refresh, &user, REFRESH_TOKEN_EXP)?;
    Ok(TokenResponse {
        access_token,
        refresh_token,
    })
}

pub async fn refresh(dto: RefreshDto) -> Result<TokenResponse, ApiError> {
    let data = jwt::decode_claims(&jwt::TokenType::Refresh, &dto.refresh_token)
        .map_err(|_| ApiError::Unauthorized)?;
    let claims = data.claims;
    let access_token = jwt::create(
        &jwt::TokenType::Access,
        &claims.user_id,
        &claims.email,
        claims.role,
        ACCESS_TOKEN_EXP,
    )
    .map_err(|_| ApiError::BadRequest("Failed to issue token".to_string()))?;
    Ok(TokenResponse {
        access_token,
        refresh_token: dto.refresh_token,
    })
}

pub async fn current(user_id: Uuid, pool: &PGPool) -> Result<UserView, ApiError> {
    db::user::get_by_id(user_id, pool)
        .await
        .map(UserView::from)
        .map_err(db_err("User"))
}

pub async fn update_self(
    user_id: Uuid,
    dto: UpdateUserDto,
    pool: &PGPool,
) -> Result<UserView, ApiError> {
    validation::run(&dto)?;
    let existing = db::user::get_by_id(user_id, pool)
        .await
        .map_err(db_err("User"))?;
    if let Some(email) = &dto.email {
        if email != &existing.email && db::user::email_exists(email, pool).await? {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }
    }
    let changes = UserChanges {
        name: dto.name,
        email: dto.email,
        pwd_hash: dto.password.as_deref().map(crypto::get_sha3_256_hash),
    };
    db::user::set_fields(user_id, changes, pool).await?;
    current(user_id, pool).await
}

pub async fn get_all(pool: &PGPool) -> Result<Vec<UserView>, ApiError> {
    Ok(db::user::get_all(pool)
        .await?
        .into_iter()
        .map(UserView::from)
        .collect())
}

fn issue(token_type: &jwt::TokenType, user: &User, exp: i64) -> Result<String, ApiError> {
    jwt::create(token_type, &user.id, &user.email, user.role, exp)
        .map_err(|_| ApiError::BadRequest("Failed to issue token".to_string()))
}

fn invalid_credentials() -> ApiError {
    // Same response whether the email or the password was wrong.
    ApiError::BadRequest("Invalid credentials".to_string())
}

/// Two concurrent registrations can both pass the `email_exists` pre-check;
/// the loser hits the unique index on `users.email` and still deserves the
/// duplicate-email response, not the generic persistence error.
fn duplicate_email_conflict(err: sqlx::Error) -> ApiError {
    if let sqlx::Error::Database(db_err) = &err {
        if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            return ApiError::Conflict("Email already registered".to_string());
        }
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct UniqueViolation;

    impl std::fmt::Display for UniqueViolation {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "duplicate key value violates unique constraint \"users_email_key\"")
        }
    }

    impl std::error::Error for UniqueViolation {}

    impl sqlx::error::DatabaseError for UniqueViolation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint \"users_email_key\""
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    #[test]
    fn losing_a_registration_race_still_reports_the_duplicate_email() {
        let err = duplicate_email_conflict(sqlx::Error::Database(Box::new(UniqueViolation)));
        match err {
            ApiError::Conflict(message) => assert_eq!(message, "Email already registered"),
            other => panic!("expected a conflict, got {:?}", other),
        }
    }

    #[test]
    fn other_insert_failures_stay_generic() {
        let err = duplicate_email_conflict(sqlx::Error::RowNotFound);
        assert!(matches!(err, ApiError::Database));
    }
}
