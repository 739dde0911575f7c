// src/models/sales.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "sale_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    Completed,
    Cancelled,
    // Flagged at checkout (payment mismatch, missing line...) until a manager resolves it
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: Uuid,
    pub store_id: Uuid,
    // Creator of the sale; drives the ownership rule
    pub seller_id: Uuid,
    #[schema(example = "149.90")]
    pub total_amount: Decimal,
    #[schema(example = "cash")]
    pub payment_method: String,
    pub notes: Option<String>,
    pub status: SaleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "return_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReturnKind {
    Refund,
    Exchange,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleReturn {
    pub id: Uuid,
    pub sale_id: Uuid,
    pub kind: ReturnKind,
    pub reason: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSaleMetaPayload {
    #[validate(length(max = 500, message = "La note est trop longue."))]
    pub notes: Option<String>,

    #[validate(length(min = 1, max = 40, message = "Le mode de paiement est invalide."))]
    #[schema(example = "card")]
    pub payment_method: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReturnPayload {
    pub kind: ReturnKind,

    #[validate(length(min = 1, max = 500, message = "Le motif est obligatoire."))]
    #[schema(example = "Taille incorrecte")]
    pub reason: String,
}
