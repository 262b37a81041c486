use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use sweetshop_db::models::{PurchaseOutcome, SweetRow};
use sweetshop_types::api::{
    MessageResponse, RestockRequest, SweetListResponse, SweetPayload, SweetResponse,
};
use sweetshop_types::models::Sweet;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::util::parse_db_time;
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub name: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<String>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<String>,
}

pub async fn create_sweet(
    State(state): State<AppState>,
    Json(payload): Json<SweetPayload>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_sweet(&payload)?;

    let name = payload.name.trim();
    let category = payload.category.trim();

    if state.db.sweet_by_name(name)?.is_some() {
        return Err(ApiError::BadRequest("Sweet with this name already exists"));
    }

    let id = Uuid::new_v4();
    state
        .db
        .insert_sweet(&id.to_string(), name, category, payload.price, payload.quantity)?;

    let row = state
        .db
        .sweet_by_id(&id.to_string())?
        .ok_or_else(|| anyhow::anyhow!("Created sweet missing from database"))?;

    info!("Sweet '{}' created ({})", name, id);

    Ok((
        StatusCode::CREATED,
        Json(SweetResponse {
            message: "Sweet created successfully".into(),
            sweet: sweet_from_row(row)?,
        }),
    ))
}

pub async fn list_sweets(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let sweets = state
        .db
        .list_sweets()?
        .into_iter()
        .map(sweet_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(SweetListResponse { sweets }))
}

pub async fn search_sweets(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (min_price, max_price) =
        validation::parse_price_bounds(query.min_price.as_deref(), query.max_price.as_deref())?;

    let name = query.name.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let sweets = state
        .db
        .search_sweets(name, category, min_price, max_price)?
        .into_iter()
        .map(sweet_from_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(SweetListResponse { sweets }))
}

pub async fn update_sweet(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<SweetPayload>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_sweet(&payload)?;

    let name = payload.name.trim();
    let category = payload.category.trim();

    let existing = state
        .db
        .sweet_by_id(&id)?
        .ok_or(ApiError::NotFound("Sweet not found"))?;

    // Renaming onto another sweet's name is a conflict.
    if name != existing.name && state.db.sweet_by_name(name)?.is_some() {
        return Err(ApiError::BadRequest("Sweet with this name already exists"));
    }

    let row = state
        .db
        .update_sweet(&id, name, category, payload.price, payload.quantity)?
        .ok_or(ApiError::NotFound("Sweet not found"))?;

    Ok(Json(SweetResponse {
        message: "Sweet updated successfully".into(),
        sweet: sweet_from_row(row)?,
    }))
}

pub async fn delete_sweet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.db.delete_sweet(&id)? {
        return Err(ApiError::NotFound("Sweet not found"));
    }

    info!("Sweet {} deleted", id);

    Ok(Json(MessageResponse {
        message: "Sweet deleted successfully".into(),
    }))
}

pub async fn purchase_sweet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    match state.db.purchase_sweet(&id)? {
        PurchaseOutcome::Purchased(row) => Ok(Json(SweetResponse {
            message: "Purchase successful".into(),
            sweet: sweet_from_row(row)?,
        })),
        PurchaseOutcome::OutOfStock => Err(ApiError::BadRequest("Sweet is out of stock")),
        PurchaseOutcome::NotFound => Err(ApiError::NotFound("Sweet not found")),
    }
}

pub async fn restock_sweet(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RestockRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validation::validate_restock(req.quantity)?;

    let row = state
        .db
        .restock_sweet(&id, req.quantity)?
        .ok_or(ApiError::NotFound("Sweet not found"))?;

    info!("Sweet {} restocked by {}", id, req.quantity);

    Ok(Json(SweetResponse {
        message: "Restock successful".into(),
        sweet: sweet_from_row(row)?,
    }))
}

fn sweet_from_row(row: SweetRow) -> Result<Sweet, ApiError> {
    let id = row
        .id
        .parse::<Uuid>()
        .map_err(|e| anyhow::anyhow!("Corrupt sweet id '{}': {}", row.id, e))?;
    let created_at = parse_db_time(&row.created_at, "sweet");
    let updated_at = parse_db_time(&row.updated_at, "sweet");

    Ok(Sweet {
        id,
        name: row.name,
        category: row.category,
        price: row.price,
        quantity: row.quantity,
        created_at,
        updated_at,
    })
}
