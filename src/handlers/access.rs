// src/handlers/access.rs

use axum::Json;

use crate::{
    middleware::auth::AuthenticatedUser,
    models::access::{
        CapabilitiesResponse, CapabilityDecision, CheckCapabilityPayload, OwnershipContext,
    },
    services::access_control::{can_perform, grants_for},
};

// GET /api/access/capabilities (the frontend hides what the role can't do)
#[utoipa::path(
    get,
    path = "/api/access/capabilities",
    tag = "Access",
    responses(
        (status = 200, description = "Permissions du rôle courant", body = CapabilitiesResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_capabilities(
    AuthenticatedUser(user): AuthenticatedUser,
) -> Json<CapabilitiesResponse> {
    Json(CapabilitiesResponse {
        role: user.role,
        capabilities: grants_for(user.role),
    })
}

// POST /api/access/check
#[utoipa::path(
    post,
    path = "/api/access/check",
    tag = "Access",
    request_body = CheckCapabilityPayload,
    responses((status = 200, description = "Décision d'accès", body = CapabilityDecision)),
    security(("api_jwt" = []))
)]
pub async fn check_capability(
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CheckCapabilityPayload>,
) -> Json<CapabilityDecision> {
    let ownership = payload
        .owner_id
        .map(|owner_id| OwnershipContext::new(owner_id, user.id));

    Json(CapabilityDecision {
        capability: payload.capability,
        allowed: can_perform(user.role, payload.capability, ownership.as_ref()),
    })
}
