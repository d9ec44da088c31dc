use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::paper::{ColorMode, PaperSize};
use crate::error::AppError;

/// Ledger row status. Transitions are not validated server-side; the update
/// endpoint clamps unknown values to `Pending` and overwrites whatever is
/// stored, matching the observed behavior of the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Printing,
    Completed,
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Printing => "printing",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<TransactionStatus> {
        match s {
            "pending" => Some(TransactionStatus::Pending),
            "printing" => Some(TransactionStatus::Printing),
            "completed" => Some(TransactionStatus::Completed),
            "cancelled" => Some(TransactionStatus::Cancelled),
            _ => None,
        }
    }

    /// Unknown values fall back to `Pending` instead of failing the request.
    pub fn parse_or_pending(s: &str) -> TransactionStatus {
        Self::parse(s).unwrap_or(TransactionStatus::Pending)
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted ledger row.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub id: i64,
    pub date: DateTime<Utc>,
    /// Monetary amount in whole currency units. Zero until the cost is known.
    pub amount: i64,
    pub color: ColorMode,
    /// The displayed page-spec string, e.g. "1-3,7".
    pub pages: String,
    pub copies: i64,
    pub paper: PaperSize,
    /// Reference to the upload session's artifacts.
    pub file_path: String,
    pub status: TransactionStatus,
}

/// Raw client draft for ledger creation. Fields arrive untyped and are
/// validated by [`TransactionDraft::validate`].
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TransactionDraft {
    pub date: String,
    #[serde(default)]
    pub amount: Option<f64>,
    pub color: String,
    pub pages: String,
    #[serde(default)]
    pub copies: Option<i64>,
    pub paper: String,
    #[serde(rename = "filePath", alias = "file_path")]
    pub file_path: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// A validated draft ready for insertion.
#[derive(Debug, Clone)]
pub struct ValidatedTransaction {
    pub date: DateTime<Utc>,
    pub amount: i64,
    pub color: ColorMode,
    pub pages: String,
    pub copies: i64,
    pub paper: PaperSize,
    pub file_path: String,
    pub status: TransactionStatus,
}

const MAX_FILE_PATH_LEN: usize = 200;

impl TransactionDraft {
    /// Per-field validation: the date must parse; amount defaults to 0 when
    /// missing or negative; copies >= 1 is required; color, paper, and the
    /// page-spec charset are rejected when invalid; the status defaults to
    /// pending rather than failing.
    pub fn validate(self) -> Result<ValidatedTransaction, AppError> {
        let date = self
            .date
            .parse::<DateTime<Utc>>()
            .map_err(|_| AppError::InvalidInput(format!("invalid date: {}", self.date)))?;

        let amount = match self.amount {
            Some(a) if a.is_finite() && a >= 0.0 => a.round() as i64,
            _ => 0,
        };

        let copies = self
            .copies
            .filter(|&c| c >= 1)
            .ok_or_else(|| AppError::InvalidInput("copies must be at least 1".to_string()))?;

        let color = ColorMode::parse(&self.color)
            .ok_or_else(|| AppError::InvalidInput(format!("invalid color mode: {}", self.color)))?;

        if !is_valid_page_spec(&self.pages) {
            return Err(AppError::InvalidInput(format!(
                "invalid page spec: {}",
                self.pages
            )));
        }

        let paper = PaperSize::parse(&self.paper)
            .ok_or_else(|| AppError::InvalidInput(format!("invalid paper size: {}", self.paper)))?;

        if self.file_path.len() > MAX_FILE_PATH_LEN {
            return Err(AppError::InvalidInput(format!(
                "file path exceeds {} characters",
                MAX_FILE_PATH_LEN
            )));
        }

        let status = self
            .status
            .as_deref()
            .map(TransactionStatus::parse_or_pending)
            .unwrap_or(TransactionStatus::Pending);

        Ok(ValidatedTransaction {
            date,
            amount,
            color,
            pages: self.pages,
            copies,
            paper,
            file_path: self.file_path,
            status,
        })
    }
}

/// Page specs in ledger rows: digits, commas, dashes, and spaces only.
pub fn is_valid_page_spec(spec: &str) -> bool {
    static PAGE_SPEC: std::sync::LazyLock<regex::Regex> =
        std::sync::LazyLock::new(|| regex::Regex::new(r"^[0-9,\- ]+$").expect("valid regex"));
    PAGE_SPEC.is_match(spec)
}
