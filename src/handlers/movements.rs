// src/handlers/movements.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError,
    models::{
        filters::{Filters, validate_filters},
        movement::{MovementDetails, MovementSearch, UpdateMovementRequest, validate_movement},
        user::User,
    },
    store::Models,
    utils::{
        json::ReadJson,
        request::{read_csv, read_id_param, read_int, read_string},
        validator::Validator,
    },
};

/// Sort values accepted by the listing endpoint.
pub const MOVEMENT_SORT_SAFELIST: &[&str] =
    &["id", "name", "difficulty", "-id", "-name", "-difficulty"];

/// Lists movements, filtered, sorted and paginated by the query string.
pub async fn list_movements(
    State(models): State<Models>,
    Query(qs): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    let mut v = Validator::new();

    let search = MovementSearch {
        name: read_string(&qs, "name", ""),
        difficulty: read_string(&qs, "difficulty", ""),
        skilltype: read_csv(&qs, "skilltype", &[]),
        muscles: read_csv(&qs, "muscles", &[]),
        equipments: read_csv(&qs, "equipments", &[]),
    };

    let filters = Filters {
        sort: read_string(&qs, "sort", "id"),
        page: read_int(&qs, "page", 1, &mut v),
        page_size: read_int(&qs, "page_size", 20, &mut v),
        sort_safelist: MOVEMENT_SORT_SAFELIST,
    };

    validate_filters(&mut v, &filters);
    v.finish()?;

    let movements = models.movements.search(&search, &filters).await?;

    Ok(Json(json!({ "movements": movements })))
}

/// Retrieves a single movement by ID.
pub async fn show_movement(
    State(models): State<Models>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = read_id_param(&id)?;
    let movement = models.movements.get(id).await?;

    Ok(Json(json!({ "movement": movement })))
}

/// Creates a movement.
/// Returns 201 Created with a Location header pointing at the new record.
pub async fn create_movement(
    State(models): State<Models>,
    Extension(user): Extension<User>,
    ReadJson(input): ReadJson<MovementDetails>,
) -> Result<impl IntoResponse, AppError> {
    let mut v = Validator::new();
    validate_movement(&mut v, &input);
    v.finish()?;

    let movement = models.movements.insert(&input).await?;
    tracing::info!(movement_id = movement.id, user_id = user.id, "movement created");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/v1/movements/{}", movement.id))],
        Json(json!({ "movement": movement })),
    ))
}

/// Applies a partial update under optimistic concurrency control.
pub async fn update_movement(
    State(models): State<Models>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
    ReadJson(input): ReadJson<UpdateMovementRequest>,
) -> Result<impl IntoResponse, AppError> {
    let id = read_id_param(&id)?;
    let mut movement = models.movements.get(id).await?;

    // The client edited an older copy than the one now stored.
    if input.version.is_some_and(|version| version != movement.version) {
        return Err(AppError::EditConflict);
    }

    input.apply(&mut movement.details);

    let mut v = Validator::new();
    validate_movement(&mut v, &movement.details);
    v.finish()?;

    movement.version = models.movements.update(&movement).await?;
    tracing::info!(
        movement_id = movement.id,
        version = movement.version,
        user_id = user.id,
        "movement updated"
    );

    Ok(Json(json!({ "movement": movement })))
}

/// Deletes a movement by ID.
pub async fn delete_movement(
    State(models): State<Models>,
    Extension(user): Extension<User>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let id = read_id_param(&id)?;
    models.movements.delete(id).await?;
    tracing::info!(movement_id = id, user_id = user.id, "movement deleted");

    Ok(Json(json!({ "message": "movement successfully deleted" })))
}
