use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::common::error::AppError;

// ---
// RLS helper: the database is the real authorization boundary.
// ---
/// Opens a transaction with `app.user_id` set for row-level security.
/// The setting is transaction-local, so it never leaks back into the pool.
pub(crate) async fn begin_rls_transaction(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Transaction<'static, Postgres>, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT set_config('app.user_id', $1, true)")
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await?;

    Ok(tx)
}
