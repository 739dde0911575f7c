// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    models::access::Capability,
    services::access_control::ensure_can_perform,
};

/// 1. A capability known at compile time
pub trait CapabilityDef: Send + Sync + 'static {
    fn capability() -> Capability;
}

/// 2. The extractor: rejects the request with 403 before the handler runs.
/// Ownership-sensitive routes check inside the service instead.
pub struct RequireCapability<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireCapability<T>
where
    T: CapabilityDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::InvalidToken)?;

        ensure_can_perform(user.0.role, T::capability(), None)?;

        Ok(RequireCapability(PhantomData))
    }
}

// ---
// CAPABILITIES USED AS ROUTE GUARDS
// ---

pub struct PermValidateArrival;
impl CapabilityDef for PermValidateArrival {
    fn capability() -> Capability { Capability::ValidateArrival }
}

pub struct PermValidateTransfer;
impl CapabilityDef for PermValidateTransfer {
    fn capability() -> Capability { Capability::ValidateTransfer }
}

pub struct PermResolveSaleError;
impl CapabilityDef for PermResolveSaleError {
    fn capability() -> Capability { Capability::ResolveSaleError }
}

pub struct PermManageUsers;
impl CapabilityDef for PermManageUsers {
    fn capability() -> Capability { Capability::ManageUsers }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{access::Role, auth::User};
    use axum::http::Request;
    use chrono::Utc;
    use uuid::Uuid;

    fn parts_for(role: Option<Role>) -> Parts {
        let (mut parts, _) = Request::new(()).into_parts();
        if let Some(role) = role {
            parts.extensions.insert(AuthenticatedUser(User {
                id: Uuid::new_v4(),
                email: "caisse@gesflex.test".into(),
                full_name: "Caisse 1".into(),
                password_hash: String::new(),
                role,
                store_id: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }));
        }
        parts
    }

    #[tokio::test]
    async fn manager_passes_arrival_guard() {
        let mut parts = parts_for(Some(Role::Manager));
        let result =
            RequireCapability::<PermValidateArrival>::from_request_parts(&mut parts, &()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn seller_is_rejected_by_arrival_guard() {
        let mut parts = parts_for(Some(Role::Vendeur));
        let result =
            RequireCapability::<PermValidateArrival>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(
            result,
            Err(AppError::PermissionDenied { capability: Capability::ValidateArrival })
        ));
    }

    #[tokio::test]
    async fn missing_user_is_unauthorized() {
        let mut parts = parts_for(None);
        let result =
            RequireCapability::<PermManageUsers>::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }
}
