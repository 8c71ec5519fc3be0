//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and
//! infrastructure. Implementations live in other crates.

use crate::Opportunity;
use async_trait::async_trait;

/// Read-only access to closed opportunities and their documents
///
/// Implemented by the infrastructure layer (dealscan-crm). Implementations
/// own their authorization; callers only pass record and document ids.
#[async_trait]
pub trait CrmSource: Send + Sync {
    /// Error type for CRM operations
    type Error: std::error::Error + Send + Sync + 'static;

    /// Most recently closed opportunities, newest first
    async fn closed_opportunities(&self, limit: usize) -> Result<Vec<Opportunity>, Self::Error>;

    /// Closed opportunities whose name contains `term`
    async fn search_opportunities(
        &self,
        term: &str,
        limit: usize,
    ) -> Result<Vec<Opportunity>, Self::Error>;

    /// Download the latest version of a content document
    async fn fetch_document(&self, document_id: &str) -> Result<Vec<u8>, Self::Error>;
}
