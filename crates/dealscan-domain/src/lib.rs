//! Dealscan Domain Layer
//!
//! Value types shared by every other crate: the read-only projection of a
//! closed opportunity, its attached documents, and the portfolio summary the
//! CLI prints under a listing.
//!
//! ## Key Concepts
//!
//! - **Opportunity**: a closed sales deal as returned by the CRM
//! - **AttachmentLink**: a content document linked to an opportunity
//! - **PortfolioSummary**: totals and won/lost breakdown over a listing
//!
//! Infrastructure (HTTP, OAuth, PDF parsing, model calls) lives in other
//! crates; the only seam defined here is [`traits::CrmSource`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod opportunity;
pub mod summary;
pub mod traits;

// Re-exports for convenience
pub use opportunity::{AttachmentLink, Opportunity};
pub use summary::PortfolioSummary;
pub use traits::CrmSource;
