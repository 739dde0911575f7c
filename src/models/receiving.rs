// src/models/receiving.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

// --- Statuses ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "purchase_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Pending,
    Validated,
}

// Rejected is a dead end: no reception is ever recorded for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "transfer_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Pending,
    Validated,
    Rejected,
}

// --- Inbound goods ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub product_id: Uuid,
    pub product_name: String,
    // Destination store
    pub store_id: Uuid,
    pub store_name: String,
    #[schema(example = "12.000")]
    pub quantity: Decimal,
    pub status: PurchaseStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: Uuid,
    pub source_store_id: Uuid,
    pub source_store_name: String,
    pub destination_store_id: Uuid,
    pub destination_store_name: String,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: Decimal,
    pub status: TransferStatus,
    pub created_at: DateTime<Utc>,
}

// --- Reconciliation records ---

/// Confirms a purchase's goods were physically received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArrivalRecord {
    pub id: Uuid,
    pub purchase_id: Uuid,
    pub supplier_id: Uuid,
    pub supplier_name: String,
    pub product_id: Uuid,
    pub product_name: String,
    pub store_id: Uuid,
    pub store_name: String,
    pub ordered_quantity: Decimal,
    pub received_quantity: Decimal,
    pub received_by: Option<Uuid>,
    pub notes: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// Confirms a transfer's goods reached the destination store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceptionRecord {
    pub id: Uuid,
    pub transfer_id: Uuid,
    pub source_store_id: Uuid,
    pub source_store_name: String,
    pub destination_store_id: Uuid,
    pub destination_store_name: String,
    pub product_id: Uuid,
    pub product_name: String,
    pub sent_quantity: Decimal,
    pub received_quantity: Decimal,
    pub received_by: Option<Uuid>,
    pub notes: Option<String>,
    pub received_at: DateTime<Utc>,
}

// --- Tagged inbound items ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Purchase,
    Transfer,
}

/// An inbound item still waiting for its reconciliation record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "origin", rename_all = "lowercase")]
pub enum PendingItem {
    Purchase(Purchase),
    Transfer(Transfer),
}

/// A reconciled inbound item, carried by its arrival or reception.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "origin", rename_all = "lowercase")]
pub enum ReceivedItem {
    Purchase(ArrivalRecord),
    Transfer(ReceptionRecord),
}

/// Read-only view shared by pending and received items, used by search and filters.
pub trait InboundView {
    fn origin(&self) -> Origin;

    /// Id of the underlying purchase or transfer.
    fn source_id(&self) -> Uuid;

    fn search_fields(&self) -> Vec<&str>;

    fn supplier_id(&self) -> Option<Uuid>;

    fn involves_store(&self, store_id: Uuid) -> bool;

    /// Received date for reconciled items, creation date otherwise.
    fn event_at(&self) -> DateTime<Utc>;

    /// `None` while nothing has been received yet.
    fn has_discrepancy(&self) -> Option<bool>;

    /// Rows with missing join data are hidden rather than reported.
    fn is_displayable(&self) -> bool;
}

fn is_present(id: Uuid, name: &str) -> bool {
    !id.is_nil() && !name.trim().is_empty()
}

impl InboundView for PendingItem {
    fn origin(&self) -> Origin {
        match self {
            PendingItem::Purchase(_) => Origin::Purchase,
            PendingItem::Transfer(_) => Origin::Transfer,
        }
    }

    fn source_id(&self) -> Uuid {
        match self {
            PendingItem::Purchase(p) => p.id,
            PendingItem::Transfer(t) => t.id,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        match self {
            PendingItem::Purchase(p) => vec![
                p.product_name.as_str(),
                p.supplier_name.as_str(),
                p.store_name.as_str(),
            ],
            PendingItem::Transfer(t) => vec![
                t.product_name.as_str(),
                t.source_store_name.as_str(),
                t.destination_store_name.as_str(),
            ],
        }
    }

    fn supplier_id(&self) -> Option<Uuid> {
        match self {
            PendingItem::Purchase(p) => Some(p.supplier_id),
            PendingItem::Transfer(_) => None,
        }
    }

    fn involves_store(&self, store_id: Uuid) -> bool {
        match self {
            PendingItem::Purchase(p) => p.store_id == store_id,
            PendingItem::Transfer(t) => {
                t.source_store_id == store_id || t.destination_store_id == store_id
            }
        }
    }

    fn event_at(&self) -> DateTime<Utc> {
        match self {
            PendingItem::Purchase(p) => p.created_at,
            PendingItem::Transfer(t) => t.created_at,
        }
    }

    fn has_discrepancy(&self) -> Option<bool> {
        None
    }

    fn is_displayable(&self) -> bool {
        match self {
            PendingItem::Purchase(p) => {
                is_present(p.id, &p.product_name) && is_present(p.supplier_id, &p.supplier_name)
            }
            PendingItem::Transfer(t) => is_present(t.id, &t.product_name),
        }
    }
}

impl InboundView for ReceivedItem {
    fn origin(&self) -> Origin {
        match self {
            ReceivedItem::Purchase(_) => Origin::Purchase,
            ReceivedItem::Transfer(_) => Origin::Transfer,
        }
    }

    fn source_id(&self) -> Uuid {
        match self {
            ReceivedItem::Purchase(a) => a.purchase_id,
            ReceivedItem::Transfer(r) => r.transfer_id,
        }
    }

    fn search_fields(&self) -> Vec<&str> {
        match self {
            ReceivedItem::Purchase(a) => {
                let mut fields: Vec<&str> = vec![
                    a.product_name.as_str(),
                    a.supplier_name.as_str(),
                    a.store_name.as_str(),
                ];
                if let Some(notes) = a.notes.as_deref() {
                    fields.push(notes);
                }
                fields
            }
            ReceivedItem::Transfer(r) => {
                let mut fields: Vec<&str> = vec![
                    r.product_name.as_str(),
                    r.source_store_name.as_str(),
                    r.destination_store_name.as_str(),
                ];
                if let Some(notes) = r.notes.as_deref() {
                    fields.push(notes);
                }
                fields
            }
        }
    }

    fn supplier_id(&self) -> Option<Uuid> {
        match self {
            ReceivedItem::Purchase(a) => Some(a.supplier_id),
            ReceivedItem::Transfer(_) => None,
        }
    }

    fn involves_store(&self, store_id: Uuid) -> bool {
        match self {
            ReceivedItem::Purchase(a) => a.store_id == store_id,
            ReceivedItem::Transfer(r) => {
                r.source_store_id == store_id || r.destination_store_id == store_id
            }
        }
    }

    fn event_at(&self) -> DateTime<Utc> {
        match self {
            ReceivedItem::Purchase(a) => a.received_at,
            ReceivedItem::Transfer(r) => r.received_at,
        }
    }

    fn has_discrepancy(&self) -> Option<bool> {
        match self {
            ReceivedItem::Purchase(a) => Some(a.received_quantity != a.ordered_quantity),
            ReceivedItem::Transfer(r) => Some(r.received_quantity != r.sent_quantity),
        }
    }

    fn is_displayable(&self) -> bool {
        match self {
            ReceivedItem::Purchase(a) => {
                is_present(a.purchase_id, &a.product_name)
                    && is_present(a.supplier_id, &a.supplier_name)
            }
            ReceivedItem::Transfer(r) => is_present(r.transfer_id, &r.product_name),
        }
    }
}

// --- Query ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptScope {
    #[default]
    Pending,
    History,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DiscrepancyFilter {
    #[default]
    Any,
    Matching,
    Discrepant,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    DateDesc,
    DateAsc,
}

/// Search, filter, sort and page parameters applied after reconciliation.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ReceiptQuery {
    #[serde(default)]
    pub scope: ReceiptScope,
    /// Whitespace separated tokens; each must match one display field.
    pub search: Option<String>,
    pub supplier_id: Option<Uuid>,
    pub store_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub discrepancy: DiscrepancyFilter,
    #[serde(default)]
    pub sort: SortOrder,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// One page of an already filtered list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total_items: usize,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
#[serde(tag = "scope", rename_all = "lowercase")]
pub enum ReceivingResults {
    Pending(Page<PendingItem>),
    History(Page<ReceivedItem>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivingOverview {
    // Counts before search and filters
    pub pending_total: usize,
    pub history_total: usize,
    pub results: ReceivingResults,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordReceiptPayload {
    #[validate(custom(function = "crate::models::validate_not_negative"))]
    #[schema(example = "10.000")]
    pub received_quantity: Decimal,

    #[validate(length(max = 500, message = "La note est trop longue."))]
    pub notes: Option<String>,
}
