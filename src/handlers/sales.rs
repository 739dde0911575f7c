// src/handlers/sales.rs
//
// Owner-escalable actions have no route guard: a seller may act on their own
// sale, so the check needs the sale's owner and runs inside the service.

use axum::{
    extract::{Path, State},
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
        rbac::{PermResolveSaleError, RequireCapability},
    },
    models::sales::{CreateReturnPayload, Sale, SaleReturn, UpdateSaleMetaPayload},
};

// POST /api/sales/{sale_id}/cancel
#[utoipa::path(
    post,
    path = "/api/sales/{sale_id}/cancel",
    tag = "Sales",
    params(("sale_id" = Uuid, Path, description = "ID de la vente")),
    responses(
        (status = 200, description = "Vente annulée", body = Sale),
        (status = 403, description = "Ni 'cancel-sale' ni vendeur de la vente"),
        (status = 409, description = "Vente déjà annulée")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_sale(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(sale_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let sale = app_state.sales_service.cancel_sale(&user, sale_id).await?;
    Ok((StatusCode::OK, Json(sale)))
}

// PATCH /api/sales/{sale_id}
#[utoipa::path(
    patch,
    path = "/api/sales/{sale_id}",
    tag = "Sales",
    request_body = UpdateSaleMetaPayload,
    params(("sale_id" = Uuid, Path, description = "ID de la vente")),
    responses(
        (status = 200, description = "Vente mise à jour", body = Sale),
        (status = 403, description = "Ni 'edit-sale-meta' ni vendeur de la vente")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_sale_meta(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(sale_id): Path<Uuid>,
    Json(payload): Json<UpdateSaleMetaPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let sale = app_state
        .sales_service
        .update_sale_meta(&user, sale_id, &payload)
        .await?;

    Ok((StatusCode::OK, Json(sale)))
}

// POST /api/sales/{sale_id}/resolve-error
#[utoipa::path(
    post,
    path = "/api/sales/{sale_id}/resolve-error",
    tag = "Sales",
    params(("sale_id" = Uuid, Path, description = "ID de la vente")),
    responses(
        (status = 200, description = "Erreur de vente résolue", body = Sale),
        (status = 403, description = "Permission 'resolve-sale-error' requise"),
        (status = 409, description = "La vente n'est pas en erreur")
    ),
    security(("api_jwt" = []))
)]
pub async fn resolve_sale_error(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    _guard: RequireCapability<PermResolveSaleError>,
    Path(sale_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let sale = app_state
        .sales_service
        .resolve_sale_error(&user, sale_id)
        .await?;

    Ok((StatusCode::OK, Json(sale)))
}

// POST /api/sales/{sale_id}/returns
#[utoipa::path(
    post,
    path = "/api/sales/{sale_id}/returns",
    tag = "Sales",
    request_body = CreateReturnPayload,
    params(("sale_id" = Uuid, Path, description = "ID de la vente")),
    responses(
        (status = 201, description = "Retour ou échange créé", body = SaleReturn),
        (status = 409, description = "Vente annulée")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_return(
    State(app_state): State<AppState>,
    user: AuthenticatedUser,
    Path(sale_id): Path<Uuid>,
    Json(payload): Json<CreateReturnPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let record = app_state
        .sales_service
        .create_return(&user, sale_id, &payload)
        .await?;

    Ok((StatusCode::CREATED, Json(record)))
}
