// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::models::access::Capability;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erreur de validation")]
    ValidationError(#[from] validator::ValidationErrors),

    // Denials are never fatal: the caller gets a rejection and the mutation is aborted.
    #[error("Permission refusée: {capability}")]
    PermissionDenied { capability: Capability },

    // Any failed read while assembling a reconciliation. The whole load is aborted.
    #[error("Échec du chargement des données: {0}")]
    Fetch(String),

    #[error("Ressource introuvable")]
    NotFound,

    #[error("Cet élément a déjà été réceptionné")]
    AlreadyReconciled,

    #[error("Transition invalide: {0}")]
    InvalidTransition(String),

    #[error("Identifiants invalides")]
    InvalidCredentials,

    #[error("Jeton invalide")]
    InvalidToken,

    #[error("Cet e-mail est déjà utilisé")]
    EmailAlreadyExists,

    #[error("Erreur de base de données")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erreur interne du serveur")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erreur de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erreur de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Only transient failures are worth a manual retry. A denial won't change
    /// without a role change.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Fetch(_))
    }

    /// Collapses any failure during a read fan-out into a single fetch failure.
    pub fn into_fetch_error(self) -> AppError {
        match self {
            AppError::Fetch(_) => self,
            other => AppError::Fetch(other.to_string()),
        }
    }

    pub fn to_api_error(&self) -> ApiError {
        let retryable = self.is_retryable();

        let (status, error, details) = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                (
                    StatusCode::BAD_REQUEST,
                    "Un ou plusieurs champs sont invalides.".to_string(),
                    Some(json!(details)),
                )
            }
            AppError::PermissionDenied { capability } => (
                StatusCode::FORBIDDEN,
                format!("Vous n'avez pas la permission '{}' pour cette action.", capability),
                Some(json!({ "capability": capability })),
            ),
            AppError::Fetch(reason) => {
                tracing::error!("Échec du chargement: {}", reason);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Impossible de charger les données. Veuillez réessayer.".to_string(),
                    None,
                )
            }
            AppError::NotFound => {
                (StatusCode::NOT_FOUND, "Ressource introuvable.".to_string(), None)
            }
            AppError::AlreadyReconciled => (
                StatusCode::CONFLICT,
                "Cet élément a déjà été réceptionné.".to_string(),
                None,
            ),
            AppError::InvalidTransition(reason) => (StatusCode::CONFLICT, reason.clone(), None),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "E-mail ou mot de passe invalide.".to_string(),
                None,
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Jeton d'authentification invalide ou absent.".to_string(),
                None,
            ),
            AppError::EmailAlreadyExists => (
                StatusCode::CONFLICT,
                "Cet e-mail est déjà utilisé.".to_string(),
                None,
            ),
            // Everything else becomes a 500; the detailed message only goes to the log.
            e => {
                tracing::error!("Erreur interne du serveur: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Une erreur inattendue est survenue.".to_string(),
                    None,
                )
            }
        };

        ApiError {
            status,
            error,
            retryable,
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error().into_response()
    }
}

// Rendered error body, shared by handlers and extractors.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        err.to_api_error()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        AppError::PermissionDenied { capability: Capability::CancelSale },
        StatusCode::FORBIDDEN,
        false
    )]
    #[case(AppError::Fetch("timeout".into()), StatusCode::SERVICE_UNAVAILABLE, true)]
    #[case(AppError::NotFound, StatusCode::NOT_FOUND, false)]
    #[case(AppError::AlreadyReconciled, StatusCode::CONFLICT, false)]
    #[case(AppError::InvalidToken, StatusCode::UNAUTHORIZED, false)]
    #[case(
        AppError::InternalServerError(anyhow::anyhow!("boom")),
        StatusCode::INTERNAL_SERVER_ERROR,
        false
    )]
    fn maps_errors_to_status(
        #[case] err: AppError,
        #[case] status: StatusCode,
        #[case] retryable: bool,
    ) {
        let api = err.to_api_error();
        assert_eq!(api.status, status);
        assert_eq!(api.retryable, retryable);
    }

    #[test]
    fn permission_denied_names_the_capability() {
        let api = AppError::PermissionDenied { capability: Capability::ManageUsers }.to_api_error();
        assert_eq!(api.details, Some(json!({ "capability": "manage-users" })));
        assert!(api.error.contains("manage-users"));
    }

    #[test]
    fn internal_errors_are_redacted() {
        let api = AppError::InternalServerError(anyhow::anyhow!("secret dsn")).to_api_error();
        assert!(!api.error.contains("secret"));
        assert!(api.details.is_none());
    }

    #[test]
    fn into_fetch_error_keeps_existing_fetch() {
        let err = AppError::Fetch("network".into()).into_fetch_error();
        assert!(matches!(err, AppError::Fetch(ref r) if r == "network"));

        let err = AppError::NotFound.into_fetch_error();
        assert!(matches!(err, AppError::Fetch(_)));
        assert!(err.is_retryable());
    }
}
