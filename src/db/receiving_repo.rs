// src/db/receiving_repo.rs

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::begin_rls_transaction, error::AppError},
    models::receiving::{
        ArrivalRecord, Purchase, PurchaseStatus, ReceptionRecord, Transfer, TransferStatus,
    },
    services::receiving_service::ReceivingSource,
};

const PURCHASE_SELECT: &str = r#"
    SELECT
        p.id, p.supplier_id, s.name AS supplier_name,
        p.product_id, pr.name AS product_name,
        p.store_id, st.name AS store_name,
        p.quantity, p.status, p.created_at
    FROM purchases p
    JOIN suppliers s ON s.id = p.supplier_id
    JOIN products pr ON pr.id = p.product_id
    JOIN stores st ON st.id = p.store_id
"#;

const TRANSFER_SELECT: &str = r#"
    SELECT
        t.id,
        t.source_store_id, src.name AS source_store_name,
        t.destination_store_id, dst.name AS destination_store_name,
        t.product_id, pr.name AS product_name,
        t.quantity, t.status, t.created_at
    FROM store_transfers t
    JOIN stores src ON src.id = t.source_store_id
    JOIN stores dst ON dst.id = t.destination_store_id
    JOIN products pr ON pr.id = t.product_id
"#;

const ARRIVAL_SELECT: &str = r#"
    SELECT
        a.id, a.purchase_id,
        p.supplier_id, s.name AS supplier_name,
        p.product_id, pr.name AS product_name,
        p.store_id, st.name AS store_name,
        p.quantity AS ordered_quantity, a.received_quantity,
        a.received_by, a.notes, a.received_at
    FROM arrivals a
    JOIN purchases p ON p.id = a.purchase_id
    JOIN suppliers s ON s.id = p.supplier_id
    JOIN products pr ON pr.id = p.product_id
    JOIN stores st ON st.id = p.store_id
"#;

const RECEPTION_SELECT: &str = r#"
    SELECT
        r.id, r.transfer_id,
        t.source_store_id, src.name AS source_store_name,
        t.destination_store_id, dst.name AS destination_store_name,
        t.product_id, pr.name AS product_name,
        t.quantity AS sent_quantity, r.received_quantity,
        r.received_by, r.notes, r.received_at
    FROM transfer_receptions r
    JOIN store_transfers t ON t.id = r.transfer_id
    JOIN stores src ON src.id = t.source_store_id
    JOIN stores dst ON dst.id = t.destination_store_id
    JOIN products pr ON pr.id = t.product_id
"#;

#[derive(Clone)]
pub struct ReceivingRepository {
    pool: PgPool,
}

impl ReceivingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A read source whose every fetch runs under the caller's RLS identity.
    pub fn scoped_to(&self, user_id: Uuid) -> ScopedReceivingSource {
        ScopedReceivingSource {
            repo: self.clone(),
            user_id,
        }
    }

    // =========================================================================
    //  READS
    // =========================================================================

    pub async fn list_purchases<'e, E>(&self, executor: E) -> Result<Vec<Purchase>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, Purchase>(&format!(
            "{PURCHASE_SELECT} ORDER BY p.created_at DESC"
        ))
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn list_transfers<'e, E>(&self, executor: E) -> Result<Vec<Transfer>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, Transfer>(&format!(
            "{TRANSFER_SELECT} ORDER BY t.created_at DESC"
        ))
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn list_arrivals<'e, E>(&self, executor: E) -> Result<Vec<ArrivalRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, ArrivalRecord>(&format!(
            "{ARRIVAL_SELECT} ORDER BY a.received_at DESC"
        ))
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    pub async fn list_receptions<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<ReceptionRecord>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rows = sqlx::query_as::<_, ReceptionRecord>(&format!(
            "{RECEPTION_SELECT} ORDER BY r.received_at DESC"
        ))
        .fetch_all(executor)
        .await?;
        Ok(rows)
    }

    // Locks the purchase row for the rest of the transaction
    pub async fn find_purchase_status_for_update<'e, E>(
        &self,
        executor: E,
        purchase_id: Uuid,
    ) -> Result<Option<PurchaseStatus>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let status = sqlx::query_scalar::<_, PurchaseStatus>(
            "SELECT status FROM purchases WHERE id = $1 FOR UPDATE",
        )
        .bind(purchase_id)
        .fetch_optional(executor)
        .await?;
        Ok(status)
    }

    pub async fn find_transfer_status_for_update<'e, E>(
        &self,
        executor: E,
        transfer_id: Uuid,
    ) -> Result<Option<TransferStatus>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let status = sqlx::query_scalar::<_, TransferStatus>(
            "SELECT status FROM store_transfers WHERE id = $1 FOR UPDATE",
        )
        .bind(transfer_id)
        .fetch_optional(executor)
        .await?;
        Ok(status)
    }

    pub async fn find_arrival<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<ArrivalRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ArrivalRecord>(&format!("{ARRIVAL_SELECT} WHERE a.id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn find_reception<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<ReceptionRecord, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ReceptionRecord>(&format!("{RECEPTION_SELECT} WHERE r.id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?
            .ok_or(AppError::NotFound)
    }

    // =========================================================================
    //  WRITES
    // =========================================================================

    /// Inserts the arrival unless one already exists. `None` means it was already reconciled.
    pub async fn insert_arrival<'e, E>(
        &self,
        executor: E,
        purchase_id: Uuid,
        received_quantity: Decimal,
        received_by: Uuid,
        notes: Option<&str>,
    ) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO arrivals (purchase_id, received_quantity, received_by, notes)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (purchase_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(purchase_id)
        .bind(received_quantity)
        .bind(received_by)
        .bind(notes)
        .fetch_optional(executor)
        .await?;
        Ok(id)
    }

    pub async fn insert_reception<'e, E>(
        &self,
        executor: E,
        transfer_id: Uuid,
        received_quantity: Decimal,
        received_by: Uuid,
        notes: Option<&str>,
    ) -> Result<Option<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO transfer_receptions (transfer_id, received_quantity, received_by, notes)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (transfer_id) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(transfer_id)
        .bind(received_quantity)
        .bind(received_by)
        .bind(notes)
        .fetch_optional(executor)
        .await?;
        Ok(id)
    }

    pub async fn set_purchase_status<'e, E>(
        &self,
        executor: E,
        purchase_id: Uuid,
        status: PurchaseStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE purchases SET status = $2 WHERE id = $1")
            .bind(purchase_id)
            .bind(status)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn set_transfer_status<'e, E>(
        &self,
        executor: E,
        transfer_id: Uuid,
        status: TransferStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE store_transfers SET status = $2 WHERE id = $1")
            .bind(transfer_id)
            .bind(status)
            .execute(executor)
            .await?;
        Ok(())
    }
}

/// Read side of the receiving tables for one user. Each fetch opens its own RLS
/// transaction so the four reads can run concurrently.
pub struct ScopedReceivingSource {
    repo: ReceivingRepository,
    user_id: Uuid,
}

#[async_trait]
impl ReceivingSource for ScopedReceivingSource {
    async fn fetch_purchases(&self) -> Result<Vec<Purchase>, AppError> {
        let mut tx = begin_rls_transaction(&self.repo.pool, self.user_id).await?;
        let rows = self.repo.list_purchases(&mut *tx).await?;
        tx.commit().await?;
        Ok(rows)
    }

    async fn fetch_transfers(&self) -> Result<Vec<Transfer>, AppError> {
        let mut tx = begin_rls_transaction(&self.repo.pool, self.user_id).await?;
        let rows = self.repo.list_transfers(&mut *tx).await?;
        tx.commit().await?;
        Ok(rows)
    }

    async fn fetch_arrivals(&self) -> Result<Vec<ArrivalRecord>, AppError> {
        let mut tx = begin_rls_transaction(&self.repo.pool, self.user_id).await?;
        let rows = self.repo.list_arrivals(&mut *tx).await?;
        tx.commit().await?;
        Ok(rows)
    }

    async fn fetch_receptions(&self) -> Result<Vec<ReceptionRecord>, AppError> {
        let mut tx = begin_rls_transaction(&self.repo.pool, self.user_id).await?;
        let rows = self.repo.list_receptions(&mut *tx).await?;
        tx.commit().await?;
        Ok(rows)
    }
}
