pub mod cleanup;
pub mod cost;
pub mod document_upload;
pub mod health;
pub mod transactions;
