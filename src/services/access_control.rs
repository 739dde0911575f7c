// src/services/access_control.rs
//
// Single authority for role checks. Evaluation is pure and total; the database's
// row-level security stays the real enforcement boundary.

use crate::{
    common::error::AppError,
    models::access::{Capability, OwnershipContext, Role},
};

/// Static grant table. No per-user overrides exist.
fn static_grant(role: Role, capability: Capability) -> bool {
    match role {
        Role::SuperAdmin => true,
        Role::Admin => capability != Capability::ConfigurationEdit,
        Role::Manager => matches!(
            capability,
            Capability::AddProduct
                | Capability::ViewInventory
                | Capability::CreateSale
                | Capability::CreateReturn
                | Capability::ValidateArrival
                | Capability::CreatePurchase
                | Capability::CreateTransfer
                | Capability::ValidateTransfer
                | Capability::EditSaleMeta
                | Capability::CancelSale
        ),
        Role::Vendeur => matches!(capability, Capability::CreateSale | Capability::CreateReturn),
    }
}

/// Returns whether `role` may exercise `capability`.
///
/// A seller who created a sale or return may still cancel, edit or start a
/// return on it when `context` shows they own it.
pub fn can_perform(role: Role, capability: Capability, context: Option<&OwnershipContext>) -> bool {
    if static_grant(role, capability) {
        return true;
    }

    role == Role::Vendeur
        && capability.allows_owner_escalation()
        && context.is_some_and(OwnershipContext::is_owner)
}

/// Same as [`can_perform`], but turns a denial into a non-fatal `PermissionDenied`.
pub fn ensure_can_perform(
    role: Role,
    capability: Capability,
    context: Option<&OwnershipContext>,
) -> Result<(), AppError> {
    if can_perform(role, capability, context) {
        return Ok(());
    }

    tracing::warn!(?role, %capability, owner_context = context.is_some(), "capability_denied");
    Err(AppError::PermissionDenied { capability })
}

/// Static grants of a role, in declaration order.
pub fn grants_for(role: Role) -> Vec<Capability> {
    Capability::ALL
        .into_iter()
        .filter(|capability| static_grant(role, *capability))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use uuid::Uuid;

    #[rstest]
    #[case(Capability::ViewRevenue, [false, false, true, true])]
    #[case(Capability::AddProduct, [false, true, true, true])]
    #[case(Capability::ViewInventory, [false, true, true, true])]
    #[case(Capability::ManageUsers, [false, false, true, true])]
    #[case(Capability::ManageStores, [false, false, true, true])]
    #[case(Capability::CreateSale, [true, true, true, true])]
    #[case(Capability::CreateReturn, [true, true, true, true])]
    #[case(Capability::ValidateArrival, [false, true, true, true])]
    #[case(Capability::CreatePurchase, [false, true, true, true])]
    #[case(Capability::CreateTransfer, [false, true, true, true])]
    #[case(Capability::ValidateTransfer, [false, true, true, true])]
    #[case(Capability::EditSaleMeta, [false, true, true, true])]
    #[case(Capability::ResolveSaleError, [false, false, true, true])]
    #[case(Capability::CancelSale, [false, true, true, true])]
    #[case(Capability::ConfigurationEdit, [false, false, false, true])]
    fn static_table(#[case] capability: Capability, #[case] expected: [bool; 4]) {
        for (role, allowed) in Role::ALL.into_iter().zip(expected) {
            assert_eq!(
                can_perform(role, capability, None),
                allowed,
                "{role:?} / {capability}"
            );
        }
    }

    #[test]
    fn evaluation_is_total_and_deterministic() {
        let user = Uuid::new_v4();
        let contexts = [
            None,
            Some(OwnershipContext::new(user, user)),
            Some(OwnershipContext::new(Uuid::new_v4(), user)),
        ];

        for role in Role::ALL {
            for capability in Capability::ALL {
                for context in &contexts {
                    let first = can_perform(role, capability, context.as_ref());
                    let second = can_perform(role, capability, context.as_ref());
                    assert_eq!(first, second);
                }
            }
        }
    }

    #[test]
    fn seller_can_cancel_own_sale() {
        let seller = Uuid::new_v4();
        let ctx = OwnershipContext::new(seller, seller);

        assert!(!can_perform(Role::Vendeur, Capability::CancelSale, None));
        assert!(can_perform(Role::Vendeur, Capability::CancelSale, Some(&ctx)));
        assert!(can_perform(Role::Vendeur, Capability::EditSaleMeta, Some(&ctx)));
    }

    #[test]
    fn seller_cannot_cancel_someone_elses_sale() {
        let ctx = OwnershipContext::new(Uuid::new_v4(), Uuid::new_v4());

        assert!(!can_perform(Role::Vendeur, Capability::CancelSale, Some(&ctx)));
        assert!(!can_perform(Role::Vendeur, Capability::EditSaleMeta, Some(&ctx)));
    }

    #[test]
    fn ownership_does_not_unlock_other_capabilities() {
        let seller = Uuid::new_v4();
        let ctx = OwnershipContext::new(seller, seller);

        assert!(!can_perform(Role::Vendeur, Capability::ResolveSaleError, Some(&ctx)));
        assert!(!can_perform(Role::Vendeur, Capability::ManageUsers, Some(&ctx)));
        assert!(!can_perform(Role::Manager, Capability::ViewRevenue, Some(&ctx)));
    }

    #[test]
    fn ensure_reports_denied_capability() {
        let err = ensure_can_perform(Role::Manager, Capability::ManageUsers, None).unwrap_err();
        assert!(matches!(
            err,
            AppError::PermissionDenied { capability: Capability::ManageUsers }
        ));
        assert!(!err.is_retryable());

        assert!(ensure_can_perform(Role::Admin, Capability::ManageUsers, None).is_ok());
    }

    #[test]
    fn grants_follow_the_table() {
        assert_eq!(
            grants_for(Role::Vendeur),
            vec![Capability::CreateSale, Capability::CreateReturn]
        );
        assert_eq!(grants_for(Role::SuperAdmin).len(), Capability::ALL.len());
        assert!(!grants_for(Role::Admin).contains(&Capability::ConfigurationEdit));
        assert!(!grants_for(Role::Manager).contains(&Capability::ViewRevenue));
    }
}
