//! Document-to-cache conversion and cost estimation.
//!
//! The pipeline: an uploaded PDF is normalized into the two fixed paper
//! geometries, rasterized to one PNG per page by an external engine, and
//! published into the page cache. Cost requests read the cache back,
//! applying the grayscale transform and the ink-usage scan per page.

pub mod cost;
pub mod coverage;
pub mod grayscale;
pub mod normalizer;
pub mod orchestration;
pub mod rasterizer;

pub use cost::{calculate_cost, CostBreakdown};
pub use normalizer::PdfInfo;
pub use orchestration::{ConversionOutcome, Converter};
pub use rasterizer::Rasterizer;
