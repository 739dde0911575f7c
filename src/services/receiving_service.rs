// src/services/receiving_service.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::begin_rls_transaction, error::AppError},
    db::ReceivingRepository,
    models::{
        access::{Capability, Role},
        receiving::{
            ArrivalRecord, Purchase, PurchaseStatus, ReceiptQuery, ReceiptScope, ReceivedItem,
            ReceivingOverview, ReceivingResults, ReceptionRecord, RecordReceiptPayload, Transfer,
            TransferStatus,
        },
    },
    services::{
        access_control::ensure_can_perform,
        receipt_query,
        reconciliation::{reconcile, Reconciliation},
    },
};

/// Where the four inbound-goods lists come from.
#[async_trait]
pub trait ReceivingSource: Send + Sync {
    async fn fetch_purchases(&self) -> Result<Vec<Purchase>, AppError>;
    async fn fetch_transfers(&self) -> Result<Vec<Transfer>, AppError>;
    async fn fetch_arrivals(&self) -> Result<Vec<ArrivalRecord>, AppError>;
    async fn fetch_receptions(&self) -> Result<Vec<ReceptionRecord>, AppError>;
}

/// Fetches the four lists concurrently and reconciles them.
///
/// Any failed fetch aborts the whole load: there are no partial results, and a
/// retry starts again from scratch.
pub async fn load_reconciliation<S>(source: &S) -> Result<Reconciliation, AppError>
where
    S: ReceivingSource + ?Sized,
{
    let (purchases, transfers, arrivals, receptions) = tokio::try_join!(
        source.fetch_purchases(),
        source.fetch_transfers(),
        source.fetch_arrivals(),
        source.fetch_receptions(),
    )
    .map_err(AppError::into_fetch_error)?;

    Ok(reconcile(&purchases, &transfers, &arrivals, &receptions))
}

/// Applies the query to whichever side of the reconciliation was asked for.
pub fn build_overview(
    reconciliation: Reconciliation,
    query: &ReceiptQuery,
    default_page_size: i64,
) -> ReceivingOverview {
    let pending_total = reconciliation.pending.len();
    let history_total = reconciliation.history.len();

    let results = match query.scope {
        ReceiptScope::Pending => ReceivingResults::Pending(receipt_query::run(
            reconciliation.pending,
            query,
            default_page_size,
        )),
        ReceiptScope::History => ReceivingResults::History(receipt_query::run(
            reconciliation.history,
            query,
            default_page_size,
        )),
    };

    ReceivingOverview {
        pending_total,
        history_total,
        results,
    }
}

#[derive(Clone)]
pub struct ReceivingService {
    repo: ReceivingRepository,
    pool: PgPool,
    default_page_size: i64,
}

impl ReceivingService {
    pub fn new(repo: ReceivingRepository, pool: PgPool, default_page_size: i64) -> Self {
        Self {
            repo,
            pool,
            default_page_size,
        }
    }

    pub async fn overview(
        &self,
        user_id: Uuid,
        query: &ReceiptQuery,
    ) -> Result<ReceivingOverview, AppError> {
        let source = self.repo.scoped_to(user_id);
        let reconciliation = load_reconciliation(&source).await?;
        Ok(build_overview(reconciliation, query, self.default_page_size))
    }

    // --- VALIDATE ARRIVAL (Purchase -> Arrival) ---
    pub async fn record_arrival(
        &self,
        user_id: Uuid,
        role: Role,
        purchase_id: Uuid,
        payload: &RecordReceiptPayload,
    ) -> Result<ReceivedItem, AppError> {
        ensure_can_perform(role, Capability::ValidateArrival, None)?;

        let mut tx = begin_rls_transaction(&self.pool, user_id).await?;

        self.repo
            .find_purchase_status_for_update(&mut *tx, purchase_id)
            .await?
            .ok_or(AppError::NotFound)?;

        // 1. The arrival is the only signal that counts; the unique index keeps it single
        let arrival_id = self
            .repo
            .insert_arrival(
                &mut *tx,
                purchase_id,
                payload.received_quantity,
                user_id,
                payload.notes.as_deref(),
            )
            .await?
            .ok_or(AppError::AlreadyReconciled)?;

        // 2. Keep the status flag in step with it
        self.repo
            .set_purchase_status(&mut *tx, purchase_id, PurchaseStatus::Validated)
            .await?;

        let arrival = self.repo.find_arrival(&mut *tx, arrival_id).await?;
        tx.commit().await?;

        tracing::info!(%purchase_id, %arrival_id, "arrival_recorded");
        Ok(ReceivedItem::Purchase(arrival))
    }

    // --- RECEIVE TRANSFER (Transfer -> Reception) ---
    pub async fn record_reception(
        &self,
        user_id: Uuid,
        role: Role,
        transfer_id: Uuid,
        payload: &RecordReceiptPayload,
    ) -> Result<ReceivedItem, AppError> {
        ensure_can_perform(role, Capability::ValidateTransfer, None)?;

        let mut tx = begin_rls_transaction(&self.pool, user_id).await?;

        let status = self
            .repo
            .find_transfer_status_for_update(&mut *tx, transfer_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if status == TransferStatus::Rejected {
            return Err(AppError::InvalidTransition(
                "Un transfert refusé ne peut pas être réceptionné.".into(),
            ));
        }

        let reception_id = self
            .repo
            .insert_reception(
                &mut *tx,
                transfer_id,
                payload.received_quantity,
                user_id,
                payload.notes.as_deref(),
            )
            .await?
            .ok_or(AppError::AlreadyReconciled)?;

        self.repo
            .set_transfer_status(&mut *tx, transfer_id, TransferStatus::Validated)
            .await?;

        let reception = self.repo.find_reception(&mut *tx, reception_id).await?;
        tx.commit().await?;

        tracing::info!(%transfer_id, %reception_id, "reception_recorded");
        Ok(ReceivedItem::Transfer(reception))
    }

    // --- REJECT TRANSFER (dead end) ---
    pub async fn reject_transfer(
        &self,
        user_id: Uuid,
        role: Role,
        transfer_id: Uuid,
    ) -> Result<(), AppError> {
        ensure_can_perform(role, Capability::ValidateTransfer, None)?;

        let mut tx = begin_rls_transaction(&self.pool, user_id).await?;

        let status = self
            .repo
            .find_transfer_status_for_update(&mut *tx, transfer_id)
            .await?
            .ok_or(AppError::NotFound)?;

        if status != TransferStatus::Pending {
            return Err(AppError::InvalidTransition(
                "Seul un transfert en attente peut être refusé.".into(),
            ));
        }

        self.repo
            .set_transfer_status(&mut *tx, transfer_id, TransferStatus::Rejected)
            .await?;
        tx.commit().await?;

        tracing::info!(%transfer_id, "transfer_rejected");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::receiving::PendingItem;
    use crate::services::fixtures::{arrival_for, purchase, reception_for, transfer};

    #[derive(Default)]
    struct InMemorySource {
        purchases: Vec<Purchase>,
        transfers: Vec<Transfer>,
        arrivals: Vec<ArrivalRecord>,
        receptions: Vec<ReceptionRecord>,
        fail_receptions: bool,
    }

    #[async_trait]
    impl ReceivingSource for InMemorySource {
        async fn fetch_purchases(&self) -> Result<Vec<Purchase>, AppError> {
            Ok(self.purchases.clone())
        }

        async fn fetch_transfers(&self) -> Result<Vec<Transfer>, AppError> {
            Ok(self.transfers.clone())
        }

        async fn fetch_arrivals(&self) -> Result<Vec<ArrivalRecord>, AppError> {
            Ok(self.arrivals.clone())
        }

        async fn fetch_receptions(&self) -> Result<Vec<ReceptionRecord>, AppError> {
            if self.fail_receptions {
                return Err(AppError::DatabaseError(sqlx::Error::PoolTimedOut));
            }
            Ok(self.receptions.clone())
        }
    }

    fn sample_source() -> InMemorySource {
        let purchases = vec![purchase("Blue Widget"), purchase("Gadget"), purchase("Café moulu")];
        let transfers = vec![transfer("Widget rouge"), transfer("Thé vert")];
        let arrivals = vec![arrival_for(&purchases[0], 8)];
        let receptions = vec![reception_for(&transfers[1], 4)];

        InMemorySource {
            purchases,
            transfers,
            arrivals,
            receptions,
            fail_receptions: false,
        }
    }

    #[tokio::test]
    async fn loads_and_reconciles_all_sources() {
        let source = sample_source();

        let result = load_reconciliation(&source).await.unwrap();

        assert_eq!(result.pending.len(), 3);
        assert_eq!(result.history.len(), 2);
    }

    #[tokio::test]
    async fn one_failed_fetch_aborts_the_whole_load() {
        let source = InMemorySource {
            fail_receptions: true,
            ..sample_source()
        };

        let err = load_reconciliation(&source).await.unwrap_err();

        assert!(matches!(err, AppError::Fetch(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn retry_after_failure_runs_from_scratch() {
        let mut source = InMemorySource {
            fail_receptions: true,
            ..sample_source()
        };
        assert!(load_reconciliation(&source).await.is_err());

        source.fail_receptions = false;
        let result = load_reconciliation(&source).await.unwrap();
        assert_eq!(result.history.len(), 2);
    }

    #[tokio::test]
    async fn works_through_a_trait_object() {
        let source: Box<dyn ReceivingSource> = Box::new(sample_source());
        assert!(load_reconciliation(source.as_ref()).await.is_ok());
    }

    #[tokio::test]
    async fn overview_pages_the_requested_scope() {
        let reconciliation = load_reconciliation(&sample_source()).await.unwrap();
        let query = ReceiptQuery {
            search: Some("widget".into()),
            ..Default::default()
        };

        let overview = build_overview(reconciliation.clone(), &query, 20);
        assert_eq!(overview.pending_total, 3);
        assert_eq!(overview.history_total, 2);
        match overview.results {
            ReceivingResults::Pending(page) => {
                assert_eq!(page.total_items, 1);
                assert!(matches!(
                    &page.items[0],
                    PendingItem::Transfer(t) if t.product_name == "Widget rouge"
                ));
            }
            ReceivingResults::History(_) => panic!("expected the pending scope"),
        }

        let query = ReceiptQuery {
            scope: ReceiptScope::History,
            search: Some("widget".into()),
            ..Default::default()
        };
        match build_overview(reconciliation, &query, 20).results {
            ReceivingResults::History(page) => {
                assert_eq!(page.items.len(), 1);
                assert!(matches!(
                    &page.items[0],
                    ReceivedItem::Purchase(a) if a.product_name == "Blue Widget"
                ));
            }
            ReceivingResults::Pending(_) => panic!("expected the history scope"),
        }
    }
}
