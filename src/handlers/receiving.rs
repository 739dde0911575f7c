// src/handlers/receiving.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermValidateArrival, PermValidateTransfer, RequireCapability},
    },
    models::receiving::{ReceiptQuery, RecordReceiptPayload},
};

// GET /api/receiving
#[utoipa::path(
    get,
    path = "/api/receiving",
    tag = "Receiving",
    params(ReceiptQuery),
    responses(
        (status = 200, description = "Réceptions en attente ou historique, filtrées et paginées"),
        (status = 403, description = "Permission 'validate-arrival' requise"),
        (status = 503, description = "Échec du chargement, réessayer")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_receiving(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireCapability<PermValidateArrival>,
    Query(query): Query<ReceiptQuery>,
) -> Result<impl IntoResponse, AppError> {
    let overview = app_state
        .receiving_service
        .overview(user.0.id, &query)
        .await?;

    Ok((StatusCode::OK, Json(overview)))
}

// POST /api/receiving/purchases/{purchase_id}/arrival
#[utoipa::path(
    post,
    path = "/api/receiving/purchases/{purchase_id}/arrival",
    tag = "Receiving",
    request_body = RecordReceiptPayload,
    params(("purchase_id" = Uuid, Path, description = "ID de l'achat")),
    responses(
        (status = 201, description = "Arrivage enregistré"),
        (status = 404, description = "Achat introuvable"),
        (status = 409, description = "Achat déjà réceptionné")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_arrival(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireCapability<PermValidateArrival>,
    Path(purchase_id): Path<Uuid>,
    Json(payload): Json<RecordReceiptPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let arrival = app_state
        .receiving_service
        .record_arrival(user.0.id, user.0.role, purchase_id, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(arrival)))
}

// POST /api/receiving/transfers/{transfer_id}/reception
#[utoipa::path(
    post,
    path = "/api/receiving/transfers/{transfer_id}/reception",
    tag = "Receiving",
    request_body = RecordReceiptPayload,
    params(("transfer_id" = Uuid, Path, description = "ID du transfert")),
    responses(
        (status = 201, description = "Réception enregistrée"),
        (status = 404, description = "Transfert introuvable"),
        (status = 409, description = "Transfert déjà réceptionné ou refusé")
    ),
    security(("api_jwt" = []))
)]
pub async fn record_reception(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireCapability<PermValidateTransfer>,
    Path(transfer_id): Path<Uuid>,
    Json(payload): Json<RecordReceiptPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let reception = app_state
        .receiving_service
        .record_reception(user.0.id, user.0.role, transfer_id, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(reception)))
}

// POST /api/receiving/transfers/{transfer_id}/reject
#[utoipa::path(
    post,
    path = "/api/receiving/transfers/{transfer_id}/reject",
    tag = "Receiving",
    params(("transfer_id" = Uuid, Path, description = "ID du transfert")),
    responses(
        (status = 204, description = "Transfert refusé"),
        (status = 409, description = "Le transfert n'est plus en attente")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_transfer(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireCapability<PermValidateTransfer>,
    Path(transfer_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .receiving_service
        .reject_transfer(user.0.id, user.0.role, transfer_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
