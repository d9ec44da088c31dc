//! Request/response wire types for the kiosk API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Per-paper-size lists of rendered page URLs, in page order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageImages {
    pub letter: Vec<String>,
    pub legal: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub images: PageImages,
    pub total_pages: u32,
    /// Detected size of the first source page ("letter" or "legal"),
    /// informational only.
    pub original_size: String,
    pub base_name: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostRequest {
    pub paper: String,
    pub base_name: String,
    pub color: String,
    /// Comma-joined selected page numbers (already expanded client-side),
    /// or a page-spec string; both parse through the same grammar.
    pub pages: String,
    pub copies: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostResponse {
    pub success: bool,
    pub total_cost: i64,
    pub used_sections: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupRequest {
    pub base_name: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransactionCreateResponse {
    pub success: bool,
    pub id: i64,
}

/// Ledger update payload. Amount and status arrive untyped; non-numeric or
/// negative amounts clamp to 0 and unknown statuses clamp to "pending".
/// Capitalized field names are accepted for backward compatibility.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TransactionUpdateRequest {
    pub id: i64,
    #[serde(default, alias = "Amount")]
    pub amount: serde_json::Value,
    #[serde(default, alias = "Status")]
    pub status: Option<String>,
}

impl TransactionUpdateRequest {
    /// Amount clamped into a non-negative whole currency amount.
    pub fn clamped_amount(&self) -> i64 {
        match self.amount.as_f64() {
            Some(a) if a.is_finite() && a >= 0.0 => a.round() as i64,
            _ => 0,
        }
    }
}
