use serde::Serialize;

use sweetshop_types::api::{LoginRequest, RegisterRequest, SweetPayload};

use crate::error::ApiError;

/// One failed field check, reported back under `{"errors": [...]}`.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

pub fn validate_register(req: &RegisterRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    if req.username.trim().chars().count() < 3 {
        errors.push(FieldError {
            field: "username",
            message: "Username must be at least 3 characters",
        });
    }
    if !is_valid_email(req.email.trim()) {
        errors.push(FieldError {
            field: "email",
            message: "Please provide a valid email",
        });
    }
    if req.password.chars().count() < 6 {
        errors.push(FieldError {
            field: "password",
            message: "Password must be at least 6 characters",
        });
    }
    finish(errors)
}

pub fn validate_login(req: &LoginRequest) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    if !is_valid_email(req.email.trim()) {
        errors.push(FieldError {
            field: "email",
            message: "Please provide a valid email",
        });
    }
    if req.password.is_empty() {
        errors.push(FieldError {
            field: "password",
            message: "Password is required",
        });
    }
    finish(errors)
}

pub fn validate_sweet(payload: &SweetPayload) -> Result<(), ApiError> {
    let mut errors = Vec::new();
    if payload.name.trim().is_empty() {
        errors.push(FieldError {
            field: "name",
            message: "Name is required",
        });
    }
    if payload.category.trim().is_empty() {
        errors.push(FieldError {
            field: "category",
            message: "Category is required",
        });
    }
    if !payload.price.is_finite() || payload.price < 0.0 {
        errors.push(FieldError {
            field: "price",
            message: "Price must be a positive number",
        });
    }
    if payload.quantity < 0 {
        errors.push(FieldError {
            field: "quantity",
            message: "Quantity must be a non-negative integer",
        });
    }
    finish(errors)
}

pub fn validate_restock(quantity: i64) -> Result<(), ApiError> {
    if quantity < 1 {
        return Err(ApiError::Validation(vec![FieldError {
            field: "quantity",
            message: "Restock quantity must be at least 1",
        }]));
    }
    Ok(())
}

/// Parse the optional minPrice/maxPrice query strings. Values must be
/// non-negative numbers.
pub fn parse_price_bounds(
    min: Option<&str>,
    max: Option<&str>,
) -> Result<(Option<f64>, Option<f64>), ApiError> {
    let mut errors = Vec::new();
    let min = parse_bound(min, "minPrice", &mut errors);
    let max = parse_bound(max, "maxPrice", &mut errors);
    finish(errors)?;
    Ok((min, max))
}

fn parse_bound(
    raw: Option<&str>,
    field: &'static str,
    errors: &mut Vec<FieldError>,
) -> Option<f64> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Some(value),
        _ => {
            errors.push(FieldError {
                field,
                message: "Must be a non-negative number",
            });
            None
        }
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), ApiError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

/// Minimal syntactic email check: one '@', non-empty local part, a
/// dot somewhere in the domain, no whitespace.
fn is_valid_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.len() >= 3
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
