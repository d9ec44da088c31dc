pub mod paper;
pub mod transaction;
pub mod wire;

pub use paper::{ColorMode, PaperSize};
pub use transaction::{Transaction, TransactionDraft, TransactionStatus, ValidatedTransaction};
pub use wire::{
    CleanupRequest, CostRequest, CostResponse, PageImages, TransactionCreateResponse,
    TransactionUpdateRequest, UploadResponse,
};
