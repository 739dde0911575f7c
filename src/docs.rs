// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth / Users ---
        handlers::auth::login,
        handlers::auth::get_me,
        handlers::auth::create_user,

        // --- Access ---
        handlers::access::list_capabilities,
        handlers::access::check_capability,

        // --- Receiving ---
        handlers::receiving::get_receiving,
        handlers::receiving::record_arrival,
        handlers::receiving::record_reception,
        handlers::receiving::reject_transfer,

        // --- Sales ---
        handlers::sales::cancel_sale,
        handlers::sales::update_sale_meta,
        handlers::sales::resolve_sale_error,
        handlers::sales::create_return,
    ),
    components(
        schemas(
            // --- Access ---
            models::access::Role,
            models::access::Capability,
            models::access::CheckCapabilityPayload,
            models::access::CapabilityDecision,
            models::access::CapabilitiesResponse,

            // --- Auth ---
            models::auth::User,
            models::auth::LoginUserPayload,
            models::auth::CreateUserPayload,
            models::auth::AuthResponse,

            // --- Receiving ---
            models::receiving::PurchaseStatus,
            models::receiving::TransferStatus,
            models::receiving::Purchase,
            models::receiving::Transfer,
            models::receiving::ArrivalRecord,
            models::receiving::ReceptionRecord,
            models::receiving::Origin,
            models::receiving::ReceiptScope,
            models::receiving::DiscrepancyFilter,
            models::receiving::SortOrder,
            models::receiving::RecordReceiptPayload,

            // --- Sales ---
            models::sales::SaleStatus,
            models::sales::Sale,
            models::sales::ReturnKind,
            models::sales::SaleReturn,
            models::sales::UpdateSaleMetaPayload,
            models::sales::CreateReturnPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Authentification"),
        (name = "Users", description = "Utilisateurs"),
        (name = "Access", description = "Contrôle d'accès par rôle"),
        (name = "Receiving", description = "Arrivages et réceptions de transferts"),
        (name = "Sales", description = "Annulations, corrections et retours de ventes")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/login",
            "/api/access/check",
            "/api/receiving",
            "/api/receiving/purchases/{purchase_id}/arrival",
            "/api/sales/{sale_id}/cancel",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
