// src/services/sales_service.rs

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::{db_utils::begin_rls_transaction, error::AppError},
    db::SalesRepository,
    middleware::auth::AuthenticatedUser,
    models::{
        access::{Capability, OwnershipContext},
        sales::{CreateReturnPayload, Sale, SaleReturn, SaleStatus, UpdateSaleMetaPayload},
    },
    services::access_control::ensure_can_perform,
};

/// Rules a sale has to satisfy before a mutation touches it.
fn check_sale_transition(sale: &Sale, capability: Capability) -> Result<(), AppError> {
    match (capability, sale.status) {
        (Capability::CancelSale, SaleStatus::Cancelled) => Err(AppError::InvalidTransition(
            "Cette vente est déjà annulée.".into(),
        )),
        (Capability::CreateReturn, SaleStatus::Cancelled) => Err(AppError::InvalidTransition(
            "Impossible de retourner une vente annulée.".into(),
        )),
        (Capability::ResolveSaleError, status) if status != SaleStatus::Error => Err(
            AppError::InvalidTransition("Cette vente n'est pas en erreur.".into()),
        ),
        _ => Ok(()),
    }
}

#[derive(Clone)]
pub struct SalesService {
    repo: SalesRepository,
    pool: PgPool,
}

impl SalesService {
    pub fn new(repo: SalesRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    /// Loads the sale under lock and checks the caller may act on it,
    /// the seller's own sales included.
    async fn authorize(
        &self,
        user: &AuthenticatedUser,
        sale_id: Uuid,
        capability: Capability,
    ) -> Result<(Transaction<'static, Postgres>, Sale), AppError> {
        let mut tx = begin_rls_transaction(&self.pool, user.0.id).await?;

        let sale = self
            .repo
            .find_sale_for_update(&mut *tx, sale_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let ownership = OwnershipContext::new(sale.seller_id, user.0.id);
        ensure_can_perform(user.0.role, capability, Some(&ownership))?;
        check_sale_transition(&sale, capability)?;

        Ok((tx, sale))
    }

    pub async fn cancel_sale(
        &self,
        user: &AuthenticatedUser,
        sale_id: Uuid,
    ) -> Result<Sale, AppError> {
        let (mut tx, _) = self.authorize(user, sale_id, Capability::CancelSale).await?;

        let sale = self.repo.set_status(&mut *tx, sale_id, SaleStatus::Cancelled).await?;
        tx.commit().await?;

        tracing::info!(%sale_id, user_id = %user.0.id, "sale_cancelled");
        Ok(sale)
    }

    pub async fn update_sale_meta(
        &self,
        user: &AuthenticatedUser,
        sale_id: Uuid,
        payload: &UpdateSaleMetaPayload,
    ) -> Result<Sale, AppError> {
        let (mut tx, _) = self.authorize(user, sale_id, Capability::EditSaleMeta).await?;

        let sale = self
            .repo
            .update_meta(
                &mut *tx,
                sale_id,
                payload.notes.as_deref(),
                payload.payment_method.as_deref(),
            )
            .await?;
        tx.commit().await?;

        Ok(sale)
    }

    pub async fn resolve_sale_error(
        &self,
        user: &AuthenticatedUser,
        sale_id: Uuid,
    ) -> Result<Sale, AppError> {
        let (mut tx, _) = self.authorize(user, sale_id, Capability::ResolveSaleError).await?;

        let sale = self.repo.set_status(&mut *tx, sale_id, SaleStatus::Completed).await?;
        tx.commit().await?;

        tracing::info!(%sale_id, "sale_error_resolved");
        Ok(sale)
    }

    // Return or exchange
    pub async fn create_return(
        &self,
        user: &AuthenticatedUser,
        sale_id: Uuid,
        payload: &CreateReturnPayload,
    ) -> Result<SaleReturn, AppError> {
        let (mut tx, _) = self.authorize(user, sale_id, Capability::CreateReturn).await?;

        let record = self
            .repo
            .insert_return(&mut *tx, sale_id, payload.kind, &payload.reason, user.0.id)
            .await?;
        tx.commit().await?;

        tracing::info!(%sale_id, return_id = %record.id, kind = ?record.kind, "return_created");
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn sale(status: SaleStatus) -> Sale {
        Sale {
            id: Uuid::new_v4(),
            store_id: Uuid::new_v4(),
            seller_id: Uuid::new_v4(),
            total_amount: Decimal::new(14990, 2),
            payment_method: "cash".into(),
            notes: None,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn cancelled_sale_cannot_be_cancelled_or_returned() {
        let s = sale(SaleStatus::Cancelled);
        assert!(check_sale_transition(&s, Capability::CancelSale).is_err());
        assert!(check_sale_transition(&s, Capability::CreateReturn).is_err());
        assert!(check_sale_transition(&s, Capability::EditSaleMeta).is_ok());
    }

    #[test]
    fn only_sales_in_error_can_be_resolved() {
        assert!(
            check_sale_transition(&sale(SaleStatus::Error), Capability::ResolveSaleError).is_ok()
        );
        let err = check_sale_transition(&sale(SaleStatus::Completed), Capability::ResolveSaleError)
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
    }
}
