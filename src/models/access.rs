// src/models/access.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// Roles are ordered by privilege only informally; Manager and Admin have distinct grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role")]
pub enum Role {
    Vendeur,
    Manager,
    Admin,
    SuperAdmin,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Vendeur, Role::Manager, Role::Admin, Role::SuperAdmin];
}

/// A named permission check evaluated against a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    ViewRevenue,
    AddProduct,
    ViewInventory,
    ManageUsers,
    ManageStores,
    ValidateArrival,
    CreatePurchase,
    CreateSale,
    CreateReturn,
    CreateTransfer,
    ValidateTransfer,
    EditSaleMeta,
    ResolveSaleError,
    CancelSale,
    ConfigurationEdit,
}

impl Capability {
    pub const ALL: [Capability; 15] = [
        Capability::ViewRevenue,
        Capability::AddProduct,
        Capability::ViewInventory,
        Capability::ManageUsers,
        Capability::ManageStores,
        Capability::ValidateArrival,
        Capability::CreatePurchase,
        Capability::CreateSale,
        Capability::CreateReturn,
        Capability::CreateTransfer,
        Capability::ValidateTransfer,
        Capability::EditSaleMeta,
        Capability::ResolveSaleError,
        Capability::CancelSale,
        Capability::ConfigurationEdit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewRevenue => "view-revenue",
            Capability::AddProduct => "add-product",
            Capability::ViewInventory => "view-inventory",
            Capability::ManageUsers => "manage-users",
            Capability::ManageStores => "manage-stores",
            Capability::ValidateArrival => "validate-arrival",
            Capability::CreatePurchase => "create-purchase",
            Capability::CreateSale => "create-sale",
            Capability::CreateReturn => "create-return",
            Capability::CreateTransfer => "create-transfer",
            Capability::ValidateTransfer => "validate-transfer",
            Capability::EditSaleMeta => "edit-sale-meta",
            Capability::ResolveSaleError => "resolve-sale-error",
            Capability::CancelSale => "cancel-sale",
            Capability::ConfigurationEdit => "configuration-edit",
        }
    }

    /// Capabilities a seller regains over a sale or return they created themselves.
    pub fn allows_owner_escalation(&self) -> bool {
        matches!(
            self,
            Capability::CancelSale | Capability::EditSaleMeta | Capability::CreateReturn
        )
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who created the resource and who is acting on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnershipContext {
    pub owner_id: Uuid,
    pub current_user_id: Uuid,
}

impl OwnershipContext {
    pub fn new(owner_id: Uuid, current_user_id: Uuid) -> Self {
        Self { owner_id, current_user_id }
    }

    pub fn is_owner(&self) -> bool {
        self.owner_id == self.current_user_id
    }
}

// Payload for POST /api/access/check
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckCapabilityPayload {
    #[schema(example = "cancel-sale")]
    pub capability: Capability,

    // When set, the ownership rule is evaluated against the caller.
    pub owner_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityDecision {
    pub capability: Capability,
    pub allowed: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitiesResponse {
    pub role: Role,
    pub capabilities: Vec<Capability>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_wire_names_match_as_str() {
        for capability in Capability::ALL {
            let json = serde_json::to_value(capability).unwrap();
            assert_eq!(json, serde_json::Value::String(capability.as_str().to_string()));
        }
    }

    #[test]
    fn capability_parses_from_kebab_case() {
        let parsed: Capability = serde_json::from_str("\"resolve-sale-error\"").unwrap();
        assert_eq!(parsed, Capability::ResolveSaleError);
    }
}
