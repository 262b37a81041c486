use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Role, Sweet, User};

// -- JWT Claims --

/// JWT claims shared by the auth handlers (token minting) and the
/// middleware (token validation). Canonical definition lives here in
/// sweetshop-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub role: Role,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

// -- Sweets --

/// Body for create and update. All fields are required; update
/// replaces every mutable field, exactly like create.
#[derive(Debug, Deserialize)]
pub struct SweetPayload {
    pub name: String,
    pub category: String,
    pub price: f64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct SweetResponse {
    pub message: String,
    pub sweet: Sweet,
}

#[derive(Debug, Serialize)]
pub struct SweetListResponse {
    pub sweets: Vec<Sweet>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
