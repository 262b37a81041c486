use std::sync::Arc;

use anyhow::Context;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use sweetshop_db::Database;
use sweetshop_db::models::UserRow;
use sweetshop_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest};
use sweetshop_types::models::{Role, User};

use crate::error::ApiError;
use crate::util::parse_db_time;
use crate::validation;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

const TOKEN_LIFETIME_DAYS: i64 = 7;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_register(&req)?;

    let username = req.username.trim();
    let email = req.email.trim();

    // Uniqueness checks; the UNIQUE constraints back these up against
    // concurrent registrations.
    if state.db.user_by_email(email)?.is_some() {
        return Err(ApiError::BadRequest("User with this email already exists"));
    }
    if state.db.user_by_username(username)?.is_some() {
        return Err(ApiError::BadRequest(
            "User with this username already exists",
        ));
    }

    let password_hash = hash_password(&req.password)?;
    let user_id = Uuid::new_v4();

    state
        .db
        .create_user(
            &user_id.to_string(),
            username,
            email,
            &password_hash,
            Role::User.as_str(),
        )?;

    // Read the row back so created_at comes from the database.
    let row = state
        .db
        .user_by_id(&user_id.to_string())?
        .context("Registered user missing from database")?;
    let user = user_from_row(row)?;

    let token = create_token(&state.jwt_secret, user.id, user.role)?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_login(&req)?;

    let row = state
        .db
        .user_by_email(req.email.trim())?
        .ok_or(ApiError::Unauthorized("Invalid credentials"))?;

    if !verify_password(&req.password, &row.password)? {
        return Err(ApiError::Unauthorized("Invalid credentials"));
    }

    let user = user_from_row(row)?;
    let token = create_token(&state.jwt_secret, user.id, user.role)?;

    Ok(Json(AuthResponse { token, user }))
}

/// Hash with Argon2id and a fresh random salt.
pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))
}

fn verify_password(password: &str, stored_hash: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| anyhow::anyhow!("Stored password hash unreadable: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn create_token(secret: &str, user_id: Uuid, role: Role) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        role,
        exp: (chrono::Utc::now() + chrono::Duration::days(TOKEN_LIFETIME_DAYS)).timestamp()
            as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

fn user_from_row(row: UserRow) -> Result<User, ApiError> {
    let id = row
        .id
        .parse::<Uuid>()
        .map_err(|e| anyhow::anyhow!("Corrupt user id '{}': {}", row.id, e))?;
    let role = Role::parse(&row.role)
        .ok_or_else(|| anyhow::anyhow!("Unknown role '{}' on user '{}'", row.role, row.id))?;
    let created_at = parse_db_time(&row.created_at, "user");

    Ok(User {
        id,
        username: row.username,
        email: row.email,
        role,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    #[test]
    fn password_hashing_round_trips() {
        let hash = hash_password("password123").unwrap();
        assert_ne!(hash, "password123");
        assert!(verify_password("password123", &hash).unwrap());
        assert!(!verify_password("wrongpassword", &hash).unwrap());
    }

    #[test]
    fn two_hashes_of_the_same_password_differ() {
        // Fresh salt per hash.
        let a = hash_password("password123").unwrap();
        let b = hash_password("password123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn token_carries_subject_and_role() {
        let user_id = Uuid::new_v4();
        let token = create_token("test-secret", user_id, Role::Admin).unwrap();

        let data = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(data.claims.sub, user_id);
        assert_eq!(data.claims.role, Role::Admin);
    }

    #[test]
    fn token_rejected_with_wrong_secret() {
        let token = create_token("test-secret", Uuid::new_v4(), Role::User).unwrap();
        assert!(
            decode::<Claims>(
                &token,
                &DecodingKey::from_secret(b"other-secret"),
                &Validation::default(),
            )
            .is_err()
        );
    }
}
