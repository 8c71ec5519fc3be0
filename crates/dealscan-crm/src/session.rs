//! Authorized CRM session: token manager + client + fetcher

use crate::client::CrmClient;
use crate::error::CrmError;
use crate::fetcher::DocumentFetcher;
use async_trait::async_trait;
use dealscan_auth::TokenManager;
use dealscan_domain::{CrmSource, Opportunity};
use std::future::Future;
use std::sync::Arc;
use tracing::warn;

/// A CRM connection that obtains its own bearer tokens
///
/// When a request is rejected as unauthorized, the cached token is cleared
/// and the request is retried exactly once with a freshly obtained token.
pub struct CrmSession {
    tokens: Arc<TokenManager>,
    client: CrmClient,
    fetcher: DocumentFetcher,
}

impl CrmSession {
    /// Create a session
    pub fn new(tokens: Arc<TokenManager>, client: CrmClient) -> Self {
        let fetcher = DocumentFetcher::new(client.clone());
        Self {
            tokens,
            client,
            fetcher,
        }
    }

    /// The token manager backing this session
    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// Opportunities that have at least one linked document
    pub async fn opportunities_with_files(&self, limit: usize) -> Result<Vec<Opportunity>, CrmError> {
        let opportunities = self.closed_opportunities(limit).await?;
        Ok(opportunities
            .into_iter()
            .filter(Opportunity::has_attachments)
            .collect())
    }

    async fn credentials(&self) -> Result<(String, String), CrmError> {
        let token = self.tokens.get_access_token().await.ok_or_else(|| {
            CrmError::Auth(
                "No valid access token. Set SALESFORCE_CONSUMER_KEY and \
                 SALESFORCE_CONSUMER_SECRET, or SALESFORCE_USERNAME and \
                 SALESFORCE_PASSWORD (plus SALESFORCE_SECURITY_TOKEN if required)"
                    .to_string(),
            )
        })?;
        let endpoint = self
            .tokens
            .endpoint_url()
            .await
            .ok_or_else(|| CrmError::Auth("No instance URL known".to_string()))?;
        Ok((token, endpoint))
    }

    /// Run `op` with a token, clearing the store and retrying once on 401/403
    async fn authorized<T, F, Fut>(&self, op: F) -> Result<T, CrmError>
    where
        F: Fn(String, String) -> Fut + Send + Sync,
        Fut: Future<Output = Result<T, CrmError>> + Send,
        T: Send,
    {
        let (token, endpoint) = self.credentials().await?;
        match op(token, endpoint).await {
            Err(e) if e.is_unauthorized() => {
                warn!("Cached token rejected ({}), clearing and retrying once", e);
                self.tokens.clear().await;
                let (token, endpoint) = self.credentials().await?;
                op(token, endpoint).await
            }
            other => other,
        }
    }
}

#[async_trait]
impl CrmSource for CrmSession {
    type Error = CrmError;

    async fn closed_opportunities(&self, limit: usize) -> Result<Vec<Opportunity>, CrmError> {
        self.authorized(|token, endpoint| async move {
            self.client
                .closed_opportunities(&token, &endpoint, limit)
                .await
        })
        .await
    }

    async fn search_opportunities(
        &self,
        term: &str,
        limit: usize,
    ) -> Result<Vec<Opportunity>, CrmError> {
        self.authorized(|token, endpoint| async move {
            self.client
                .search_opportunities(&token, &endpoint, term, limit)
                .await
        })
        .await
    }

    async fn fetch_document(&self, document_id: &str) -> Result<Vec<u8>, CrmError> {
        self.authorized(|token, endpoint| async move {
            self.fetcher.fetch(document_id, &token, &endpoint).await
        })
        .await
    }
}
