//! Dealscan CRM
//!
//! Read-only access to closed opportunities and their content documents
//! over the CRM REST API.
//!
//! # Architecture
//!
//! ```text
//! CrmSession ──token──▶ TokenManager
//!     │
//!     ├── CrmClient ───────── GET /services/data/<v>/query?q=<SOQL>
//!     └── DocumentFetcher ─── ContentVersion lookup → VersionData download
//! ```
//!
//! [`CrmClient`] and [`DocumentFetcher`] are stateless and take the bearer
//! token and endpoint on every call. [`CrmSession`] owns the token policy:
//! it implements [`dealscan_domain::CrmSource`] and retries once with a
//! fresh token after a 401/403.

#![warn(missing_docs)]

mod client;
mod error;
mod fetcher;
mod records;
mod session;
pub mod soql;

pub use client::{CrmClient, CrmConfig, DEFAULT_API_VERSION};
pub use error::CrmError;
pub use fetcher::DocumentFetcher;
pub use session::CrmSession;
