//! In-memory CRM used by the unit tests.

use async_trait::async_trait;
use dealscan_crm::CrmError;
use dealscan_domain::{AttachmentLink, CrmSource, Opportunity};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub(crate) struct FakeCrm {
    pub opportunities: Vec<Opportunity>,
    pub documents: HashMap<String, Vec<u8>>,
    pub list_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
}

impl FakeCrm {
    pub fn with_opportunities(opportunities: Vec<Opportunity>) -> Self {
        Self {
            opportunities,
            ..Self::default()
        }
    }

    pub fn with_document(mut self, id: &str, bytes: &[u8]) -> Self {
        self.documents.insert(id.to_string(), bytes.to_vec());
        self
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CrmSource for FakeCrm {
    type Error = CrmError;

    async fn closed_opportunities(&self, limit: usize) -> Result<Vec<Opportunity>, CrmError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.opportunities.iter().take(limit).cloned().collect())
    }

    async fn search_opportunities(
        &self,
        term: &str,
        limit: usize,
    ) -> Result<Vec<Opportunity>, CrmError> {
        Ok(self
            .opportunities
            .iter()
            .filter(|o| o.name.contains(term))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn fetch_document(&self, document_id: &str) -> Result<Vec<u8>, CrmError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.documents.get(document_id).cloned().ok_or_else(|| {
            CrmError::NotFound(format!("no version found for document {}", document_id))
        })
    }
}

/// Closed Won opportunity with `(document id, extension)` attachments
pub(crate) fn opportunity(id: &str, name: &str, attachments: &[(&str, &str)]) -> Opportunity {
    let mut opp = Opportunity::new(id, name, "Closed Won");
    for (doc_id, ext) in attachments {
        opp.attachments
            .push(AttachmentLink::new(*doc_id, format!("{} file", doc_id)).with_extension(*ext));
    }
    opp
}
