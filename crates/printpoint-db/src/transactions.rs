//! Transaction repository: CRUD for the transactions table.

use chrono::{DateTime, Utc};
use printpoint_core::models::{
    ColorMode, PaperSize, Transaction, TransactionStatus, ValidatedTransaction,
};
use printpoint_core::AppError;
use sqlx::{Sqlite, SqlitePool};

/// Row type for the transactions table (for FromRow). Enum-ish columns are
/// stored as text and re-parsed leniently on the way out.
#[derive(Debug, sqlx::FromRow)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub amount: i64,
    pub color: String,
    pub pages: String,
    pub copies: i64,
    pub paper: String,
    pub file_path: String,
    pub status: String,
}

impl TransactionRow {
    pub fn to_transaction(self) -> Transaction {
        Transaction {
            id: self.id,
            date: self
                .date
                .parse::<DateTime<Utc>>()
                .unwrap_or_else(|_| Utc::now()),
            amount: self.amount,
            color: ColorMode::parse(&self.color).unwrap_or(ColorMode::Bw),
            pages: self.pages,
            copies: self.copies,
            paper: PaperSize::parse(&self.paper).unwrap_or(PaperSize::Letter),
            file_path: self.file_path,
            status: TransactionStatus::parse_or_pending(&self.status),
        }
    }
}

/// Repository for the transactions table.
#[derive(Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a validated draft and return the new row id.
    #[tracing::instrument(skip(self, draft), fields(db.table = "transactions"))]
    pub async fn create(&self, draft: &ValidatedTransaction) -> Result<i64, AppError> {
        let row: (i64,) = sqlx::query_as::<Sqlite, (i64,)>(
            r#"
            INSERT INTO transactions (date, amount, color, pages, copies, paper, file_path, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(draft.date.to_rfc3339())
        .bind(draft.amount)
        .bind(draft.color.as_str())
        .bind(&draft.pages)
        .bind(draft.copies)
        .bind(draft.paper.as_str())
        .bind(&draft.file_path)
        .bind(draft.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.0)
    }

    /// Overwrite amount and status for a row id. No existence check and no
    /// transition validation; a missing id updates zero rows silently.
    #[tracing::instrument(skip(self), fields(db.table = "transactions", db.record_id = id))]
    pub async fn update_amount_status(
        &self,
        id: i64,
        amount: i64,
        status: TransactionStatus,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE transactions SET amount = $1, status = $2 WHERE id = $3")
            .bind(amount)
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Fetch one row by id.
    #[tracing::instrument(skip(self), fields(db.table = "transactions", db.record_id = id))]
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Transaction>, AppError> {
        let row: Option<TransactionRow> = sqlx::query_as::<Sqlite, TransactionRow>(
            "SELECT id, date, amount, color, pages, copies, paper, file_path, status
             FROM transactions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(TransactionRow::to_transaction))
    }

    /// All rows, newest first.
    #[tracing::instrument(skip(self), fields(db.table = "transactions"))]
    pub async fn list(&self) -> Result<Vec<Transaction>, AppError> {
        let rows: Vec<TransactionRow> = sqlx::query_as::<Sqlite, TransactionRow>(
            "SELECT id, date, amount, color, pages, copies, paper, file_path, status
             FROM transactions ORDER BY date DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(TransactionRow::to_transaction).collect())
    }
}

/// Ledger persistence failures surface their message to the client instead
/// of bubbling to the transport layer.
fn db_err(err: sqlx::Error) -> AppError {
    AppError::Database(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> TransactionRepository {
        let pool = crate::connect("sqlite::memory:", 1).await.unwrap();
        TransactionRepository::new(pool)
    }

    fn validated() -> ValidatedTransaction {
        ValidatedTransaction {
            date: "2024-05-01T09:30:00Z".parse().unwrap(),
            amount: 60,
            color: ColorMode::Color,
            pages: "1-3".to_string(),
            copies: 2,
            paper: PaperSize::Letter,
            file_path: "a1b2c3".to_string(),
            status: TransactionStatus::Pending,
        }
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let repo = repo().await;
        let id = repo.create(&validated()).await.unwrap();
        assert!(id >= 1);

        let tx = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(tx.amount, 60);
        assert_eq!(tx.color, ColorMode::Color);
        assert_eq!(tx.paper, PaperSize::Letter);
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert_eq!(tx.pages, "1-3");
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let repo = repo().await;
        let first = repo.create(&validated()).await.unwrap();
        let second = repo.create(&validated()).await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_update_overwrites_amount_and_status() {
        let repo = repo().await;
        let id = repo.create(&validated()).await.unwrap();

        repo.update_amount_status(id, 120, TransactionStatus::Completed)
            .await
            .unwrap();

        let tx = repo.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(tx.amount, 120);
        assert_eq!(tx.status, TransactionStatus::Completed);
    }

    #[tokio::test]
    async fn test_update_missing_row_is_silent() {
        let repo = repo().await;
        repo.update_amount_status(9999, 1, TransactionStatus::Cancelled)
            .await
            .unwrap();
        assert!(repo.get_by_id(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let repo = repo().await;
        let mut older = validated();
        older.date = "2024-01-01T00:00:00Z".parse().unwrap();
        let old_id = repo.create(&older).await.unwrap();
        let new_id = repo.create(&validated()).await.unwrap();

        let all = repo.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, new_id);
        assert_eq!(all[1].id, old_id);
    }
}
