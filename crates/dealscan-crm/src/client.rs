//! REST client for the CRM query API

use crate::error::CrmError;
use crate::records::{OpportunityRecord, QueryPage};
use crate::soql;
use dealscan_domain::Opportunity;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

/// REST API version used when none is configured
pub const DEFAULT_API_VERSION: &str = "v59.0";

/// Default timeout for CRM requests (30 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default connect timeout for CRM requests (10 seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Settings for [`CrmClient`]
#[derive(Debug, Clone)]
pub struct CrmConfig {
    /// REST API version segment, e.g. `v59.0`
    pub api_version: String,
    /// Total request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl Default for CrmConfig {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

/// Stateless client: every call takes the bearer token and endpoint explicitly
#[derive(Debug, Clone)]
pub struct CrmClient {
    http: reqwest::Client,
    api_version: String,
}

impl CrmClient {
    /// Create a client
    ///
    /// # Errors
    ///
    /// Returns [`CrmError::Transfer`] if the HTTP client cannot be built.
    pub fn new(config: &CrmConfig) -> Result<Self, CrmError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| CrmError::Transfer(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_version: config.api_version.clone(),
        })
    }

    /// REST API version segment
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Base of the versioned data API for `endpoint`
    pub(crate) fn data_url(&self, endpoint: &str) -> String {
        format!(
            "{}/services/data/{}",
            endpoint.trim_end_matches('/'),
            self.api_version
        )
    }

    /// Run a SOQL query, following `nextRecordsUrl` until the last page
    pub async fn query_records<T: DeserializeOwned>(
        &self,
        token: &str,
        endpoint: &str,
        soql: &str,
    ) -> Result<Vec<T>, CrmError> {
        let url = format!("{}/query", self.data_url(endpoint));
        debug!("SOQL: {}", soql);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(&[("q", soql)])
            .send()
            .await?;
        let mut page: QueryPage<T> = check_status(response, "query").await?.json().await?;
        let mut records = std::mem::take(&mut page.records);

        while !page.done {
            let Some(next) = page.next_records_url.take() else {
                break;
            };
            let url = format!("{}{}", endpoint.trim_end_matches('/'), next);
            debug!("Fetching next query page: {}", url);

            let response = self.http.get(&url).bearer_auth(token).send().await?;
            page = check_status(response, "query page").await?.json().await?;
            records.append(&mut page.records);
        }

        Ok(records)
    }

    /// Closed Won opportunities, newest first
    pub async fn closed_opportunities(
        &self,
        token: &str,
        endpoint: &str,
        limit: usize,
    ) -> Result<Vec<Opportunity>, CrmError> {
        info!(limit, "Querying closed won opportunities");
        let records: Vec<OpportunityRecord> = self
            .query_records(token, endpoint, &soql::closed_opportunities(limit))
            .await?;
        Ok(records.into_iter().map(Opportunity::from).collect())
    }

    /// Closed Won opportunities whose name contains `term`
    pub async fn search_opportunities(
        &self,
        token: &str,
        endpoint: &str,
        term: &str,
        limit: usize,
    ) -> Result<Vec<Opportunity>, CrmError> {
        info!(limit, "Searching closed won opportunities");
        let records: Vec<OpportunityRecord> = self
            .query_records(token, endpoint, &soql::search_opportunities(term, limit))
            .await?;
        Ok(records.into_iter().map(Opportunity::from).collect())
    }

    /// Send an authorized GET and return the checked response
    pub(crate) async fn get(
        &self,
        token: &str,
        url: &str,
        what: &str,
    ) -> Result<reqwest::Response, CrmError> {
        let response = self.http.get(url).bearer_auth(token).send().await?;
        check_status(response, what).await
    }
}

/// Map HTTP status codes onto the error taxonomy
pub(crate) async fn check_status(
    response: reqwest::Response,
    what: &str,
) -> Result<reqwest::Response, CrmError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(CrmError::Unauthorized {
            status: status.as_u16(),
        }),
        StatusCode::NOT_FOUND => Err(CrmError::NotFound(what.to_string())),
        _ => {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(CrmError::Transfer(format!("{} failed: HTTP {}: {}", what, status, body)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url() {
        let client = CrmClient::new(&CrmConfig::default()).unwrap();
        assert_eq!(
            client.data_url("https://acme.my.salesforce.com/"),
            "https://acme.my.salesforce.com/services/data/v59.0"
        );
    }

    #[test]
    fn test_default_config() {
        let config = CrmConfig::default();
        assert_eq!(config.api_version, DEFAULT_API_VERSION);
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }
}
