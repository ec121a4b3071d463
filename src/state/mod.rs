//! State module for tracking listings through the pipeline
//!
//! # Components
//!
//! - `ListingStage`: The stage a listing is in (discovered, detail fetched, agent fetched, emitted)
//! - `ListingContext`: The per-listing state carried across fetch boundaries

mod listing_context;
mod listing_stage;

// Re-export main types
pub use listing_context::ListingContext;
pub use listing_stage::ListingStage;
