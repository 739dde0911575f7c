// src/db/sales_repo.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::sales::{ReturnKind, Sale, SaleReturn, SaleStatus},
};

const SALE_COLUMNS: &str =
    "id, store_id, seller_id, total_amount, payment_method, notes, status, created_at, updated_at";

#[derive(Clone, Default)]
pub struct SalesRepository;

impl SalesRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn find_sale_for_update<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
    ) -> Result<Option<Sale>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = $1 FOR UPDATE"
        ))
        .bind(sale_id)
        .fetch_optional(executor)
        .await?;
        Ok(sale)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        status: SaleStatus,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            r#"
            UPDATE sales SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING {SALE_COLUMNS}
            "#
        ))
        .bind(sale_id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(sale)
    }

    // Fields left as None keep their current value
    pub async fn update_meta<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        notes: Option<&str>,
        payment_method: Option<&str>,
    ) -> Result<Sale, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            r#"
            UPDATE sales
            SET notes = COALESCE($2, notes),
                payment_method = COALESCE($3, payment_method),
                updated_at = now()
            WHERE id = $1
            RETURNING {SALE_COLUMNS}
            "#
        ))
        .bind(sale_id)
        .bind(notes)
        .bind(payment_method)
        .fetch_one(executor)
        .await?;
        Ok(sale)
    }

    pub async fn insert_return<'e, E>(
        &self,
        executor: E,
        sale_id: Uuid,
        kind: ReturnKind,
        reason: &str,
        created_by: Uuid,
    ) -> Result<SaleReturn, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let record = sqlx::query_as::<_, SaleReturn>(
            r#"
            INSERT INTO returns (sale_id, kind, reason, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, sale_id, kind, reason, created_by, created_at
            "#,
        )
        .bind(sale_id)
        .bind(kind)
        .bind(reason)
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(record)
    }
}
