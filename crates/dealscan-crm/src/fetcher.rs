//! Document fetcher: latest binary version of a content document

use crate::client::CrmClient;
use crate::error::CrmError;
use crate::records::ContentVersionRecord;
use crate::soql;
use tracing::{debug, info};

/// Downloads the latest version of a content document
#[derive(Debug, Clone)]
pub struct DocumentFetcher {
    client: CrmClient,
}

impl DocumentFetcher {
    /// Create a fetcher on top of a CRM client
    pub fn new(client: CrmClient) -> Self {
        Self { client }
    }

    /// Resolve the latest version of `document_id` and download its bytes
    ///
    /// # Errors
    ///
    /// - [`CrmError::InvalidId`] if the id is malformed
    /// - [`CrmError::NotFound`] if the document has no version
    /// - [`CrmError::Unauthorized`] if the token is rejected
    /// - [`CrmError::Transfer`] for other HTTP or network failures
    pub async fn fetch(
        &self,
        document_id: &str,
        token: &str,
        endpoint_url: &str,
    ) -> Result<Vec<u8>, CrmError> {
        let version = self.latest_version(document_id, token, endpoint_url).await?;
        debug!(
            version_id = %version.id,
            title = ?version.title,
            extension = ?version.file_extension,
            version_number = ?version.version_number,
            "Resolved latest content version"
        );

        let url = format!(
            "{}/sobjects/ContentVersion/{}/VersionData",
            self.client.data_url(endpoint_url),
            version.id
        );
        info!(document_id, "Downloading document");

        let bytes = self
            .client
            .get(token, &url, "version data")
            .await?
            .bytes()
            .await
            .map_err(|e| CrmError::Transfer(e.to_string()))?;

        info!(document_id, size = bytes.len(), "Downloaded document");
        Ok(bytes.to_vec())
    }

    async fn latest_version(
        &self,
        document_id: &str,
        token: &str,
        endpoint_url: &str,
    ) -> Result<ContentVersionRecord, CrmError> {
        let query = soql::latest_version(document_id)?;
        let mut versions: Vec<ContentVersionRecord> =
            self.client.query_records(token, endpoint_url, &query).await?;

        if versions.is_empty() {
            return Err(CrmError::NotFound(format!(
                "no version found for document {}",
                document_id
            )));
        }
        Ok(versions.swap_remove(0))
    }
}
