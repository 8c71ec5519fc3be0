//! Integration tests for the CRM session against an in-process fake CRM

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use dealscan_auth::{AuthConfig, ClientCredentials, TokenManager};
use dealscan_crm::{CrmClient, CrmConfig, CrmError, CrmSession};
use dealscan_domain::CrmSource;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const DOC_ID: &str = "069000000000001AAA";
const VERSION_ID: &str = "068000000000001AAA";
const PDF_BYTES: &[u8] = b"%PDF-1.4 fake contract";

/// Fake CRM: an OAuth endpoint that always issues `fresh-token` plus the
/// query and version-data endpoints, which only accept the current token
#[derive(Clone)]
struct FakeCrm {
    base_url: Arc<Mutex<String>>,
    accepted_token: Arc<Mutex<String>>,
    token_requests: Arc<AtomicUsize>,
    query_requests: Arc<AtomicUsize>,
    downloads: Arc<AtomicUsize>,
    reject_all: Arc<Mutex<bool>>,
    query_status: Arc<Mutex<StatusCode>>,
    opportunities: Arc<Mutex<Vec<Value>>>,
    page_size: Arc<Mutex<usize>>,
    versions: Arc<Mutex<Vec<Value>>>,
}

impl FakeCrm {
    fn new() -> Self {
        Self {
            base_url: Arc::new(Mutex::new(String::new())),
            accepted_token: Arc::new(Mutex::new("fresh-token".to_string())),
            token_requests: Arc::new(AtomicUsize::new(0)),
            query_requests: Arc::new(AtomicUsize::new(0)),
            downloads: Arc::new(AtomicUsize::new(0)),
            reject_all: Arc::new(Mutex::new(false)),
            query_status: Arc::new(Mutex::new(StatusCode::OK)),
            opportunities: Arc::new(Mutex::new(Vec::new())),
            page_size: Arc::new(Mutex::new(usize::MAX)),
            versions: Arc::new(Mutex::new(vec![json!({
                "attributes": {"type": "ContentVersion"},
                "Id": VERSION_ID,
                "Title": "Master Services Agreement",
                "FileExtension": "pdf",
                "VersionNumber": "3"
            })])),
        }
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        if *self.reject_all.lock().unwrap() {
            return false;
        }
        let expected = format!("Bearer {}", self.accepted_token.lock().unwrap());
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == expected)
    }

    fn page(&self, records: &[Value], offset: usize) -> Value {
        let size = *self.page_size.lock().unwrap();
        let end = offset.saturating_add(size).min(records.len());
        let done = end >= records.len();
        let mut page = json!({
            "totalSize": records.len(),
            "done": done,
            "records": records[offset..end].to_vec(),
        });
        if !done {
            page["nextRecordsUrl"] = json!(format!("/services/data/v59.0/query/cursor-{}", end));
        }
        page
    }
}

fn opportunity(id: &str, name: &str, documents: &[(&str, &str)]) -> Value {
    let links = if documents.is_empty() {
        Value::Null
    } else {
        let records: Vec<Value> = documents
            .iter()
            .map(|(doc_id, title)| {
                json!({
                    "ContentDocumentId": doc_id,
                    "ContentDocument": {"Title": title, "FileExtension": "pdf", "ContentSize": 1024}
                })
            })
            .collect();
        json!({"totalSize": records.len(), "done": true, "records": records})
    };
    json!({
        "Id": id,
        "Name": name,
        "Account": {"Name": "Acme"},
        "StageName": "Closed Won",
        "Amount": 1000.0,
        "CloseDate": "2024-03-01",
        "ContentDocumentLinks": links
    })
}

async fn token_handler(State(state): State<FakeCrm>) -> Json<Value> {
    state.token_requests.fetch_add(1, Ordering::SeqCst);
    let base = state.base_url.lock().unwrap().clone();
    Json(json!({
        "access_token": state.accepted_token.lock().unwrap().clone(),
        "instance_url": base,
        "token_type": "Bearer"
    }))
}

async fn query_handler(
    State(state): State<FakeCrm>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.query_requests.fetch_add(1, Ordering::SeqCst);
    if !state.authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!([{"errorCode": "INVALID_SESSION_ID"}])))
            .into_response();
    }
    let status = *state.query_status.lock().unwrap();
    if status != StatusCode::OK {
        return (status, "upstream exploded").into_response();
    }

    let soql = params.get("q").cloned().unwrap_or_default();
    if soql.contains("FROM ContentVersion") {
        let versions = state.versions.lock().unwrap().clone();
        return Json(json!({"totalSize": versions.len(), "done": true, "records": versions}))
            .into_response();
    }

    let opportunities = state.opportunities.lock().unwrap().clone();
    Json(state.page(&opportunities, 0)).into_response()
}

async fn next_page_handler(
    State(state): State<FakeCrm>,
    headers: HeaderMap,
    Path(cursor): Path<String>,
) -> Response {
    state.query_requests.fetch_add(1, Ordering::SeqCst);
    if !state.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let offset: usize = cursor
        .trim_start_matches("cursor-")
        .parse()
        .unwrap_or_default();
    let opportunities = state.opportunities.lock().unwrap().clone();
    Json(state.page(&opportunities, offset)).into_response()
}

async fn version_data_handler(
    State(state): State<FakeCrm>,
    headers: HeaderMap,
    Path(version_id): Path<String>,
) -> Response {
    state.downloads.fetch_add(1, Ordering::SeqCst);
    if !state.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if version_id != VERSION_ID {
        return StatusCode::NOT_FOUND.into_response();
    }
    PDF_BYTES.to_vec().into_response()
}

async fn spawn_server(state: FakeCrm) -> String {
    let app = Router::new()
        .route("/services/oauth2/token", post(token_handler))
        .route("/services/data/v59.0/query", get(query_handler))
        .route("/services/data/v59.0/query/:cursor", get(next_page_handler))
        .route(
            "/services/data/v59.0/sobjects/ContentVersion/:id/VersionData",
            get(version_data_handler),
        )
        .with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    let url = format!("http://{}", addr);
    *state.base_url.lock().unwrap() = url.clone();
    url
}

fn session_for(url: &str, with_credentials: bool) -> CrmSession {
    let mut config = AuthConfig::default().with_instance_url(url);
    if with_credentials {
        config = config
            .with_client_credentials(ClientCredentials::new("consumer-key", "consumer-secret"));
    }
    let tokens = Arc::new(TokenManager::new(config).unwrap());
    let client = CrmClient::new(&CrmConfig::default()).unwrap();
    CrmSession::new(tokens, client)
}

#[tokio::test]
async fn test_closed_opportunities_mapped() {
    let crm = FakeCrm::new();
    crm.opportunities.lock().unwrap().extend([
        opportunity("006000000000001AAA", "Acme renewal", &[(DOC_ID, "MSA")]),
        opportunity("006000000000002AAA", "Globex", &[]),
    ]);
    let url = spawn_server(crm.clone()).await;
    let session = session_for(&url, true);

    let opps = session.closed_opportunities(20).await.unwrap();

    assert_eq!(opps.len(), 2);
    assert_eq!(opps[0].name, "Acme renewal");
    assert_eq!(opps[0].account_name.as_deref(), Some("Acme"));
    assert_eq!(opps[0].attachments.len(), 1);
    assert_eq!(opps[0].attachments[0].content_document_id, DOC_ID);
    assert!(opps[1].attachments.is_empty());
    assert_eq!(crm.token_requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_query_follows_next_records_url() {
    let crm = FakeCrm::new();
    {
        let mut opps = crm.opportunities.lock().unwrap();
        for i in 0..5 {
            opps.push(opportunity(
                &format!("00600000000000{}AAA", i),
                &format!("Deal {}", i),
                &[],
            ));
        }
    }
    *crm.page_size.lock().unwrap() = 2;
    let url = spawn_server(crm.clone()).await;
    let session = session_for(&url, true);

    let opps = session.closed_opportunities(50).await.unwrap();

    let names: Vec<&str> = opps.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, ["Deal 0", "Deal 1", "Deal 2", "Deal 3", "Deal 4"]);
    assert_eq!(crm.query_requests.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_opportunities_with_files_filters() {
    let crm = FakeCrm::new();
    crm.opportunities.lock().unwrap().extend([
        opportunity("006000000000001AAA", "With files", &[(DOC_ID, "MSA")]),
        opportunity("006000000000002AAA", "Without files", &[]),
    ]);
    let url = spawn_server(crm.clone()).await;
    let session = session_for(&url, true);

    let opps = session.opportunities_with_files(20).await.unwrap();

    assert_eq!(opps.len(), 1);
    assert_eq!(opps[0].name, "With files");
}

#[tokio::test]
async fn test_stale_token_is_cleared_and_retried_once() {
    let crm = FakeCrm::new();
    crm.opportunities
        .lock()
        .unwrap()
        .push(opportunity("006000000000001AAA", "Acme", &[]));
    let url = spawn_server(crm.clone()).await;
    let session = session_for(&url, true);
    session
        .tokens()
        .set_token("stale-token", Some(url.clone()), None)
        .await;

    let opps = session.closed_opportunities(10).await.unwrap();

    assert_eq!(opps.len(), 1);
    assert_eq!(crm.query_requests.load(Ordering::SeqCst), 2);
    assert_eq!(crm.token_requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_persistent_unauthorized_is_not_retried_twice() {
    let crm = FakeCrm::new();
    *crm.reject_all.lock().unwrap() = true;
    let url = spawn_server(crm.clone()).await;
    let session = session_for(&url, true);

    let err = session.closed_opportunities(10).await.unwrap_err();

    assert!(matches!(err, CrmError::Unauthorized { status: 401 }));
    assert_eq!(crm.query_requests.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_no_credentials_is_auth_error() {
    let crm = FakeCrm::new();
    let url = spawn_server(crm.clone()).await;
    let session = session_for(&url, false);

    let err = session.closed_opportunities(10).await.unwrap_err();

    assert!(matches!(err, CrmError::Auth(_)));
    assert_eq!(crm.query_requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_server_error_is_transfer_error() {
    let crm = FakeCrm::new();
    *crm.query_status.lock().unwrap() = StatusCode::INTERNAL_SERVER_ERROR;
    let url = spawn_server(crm.clone()).await;
    let session = session_for(&url, true);

    let err = session.search_opportunities("Acme", 10).await.unwrap_err();

    match err {
        CrmError::Transfer(message) => assert!(message.contains("upstream exploded")),
        other => panic!("expected transfer error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_document_downloads_latest_version() {
    let crm = FakeCrm::new();
    let url = spawn_server(crm.clone()).await;
    let session = session_for(&url, true);

    let bytes = session.fetch_document(DOC_ID).await.unwrap();

    assert_eq!(bytes, PDF_BYTES);
    assert_eq!(crm.downloads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fetch_document_without_version_is_not_found() {
    let crm = FakeCrm::new();
    crm.versions.lock().unwrap().clear();
    let url = spawn_server(crm.clone()).await;
    let session = session_for(&url, true);

    let err = session.fetch_document(DOC_ID).await.unwrap_err();

    assert!(matches!(err, CrmError::NotFound(_)));
    assert_eq!(crm.downloads.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_fetch_document_rejects_malformed_id() {
    let crm = FakeCrm::new();
    let url = spawn_server(crm.clone()).await;
    let session = session_for(&url, true);

    let err = session.fetch_document("../../etc").await.unwrap_err();

    assert!(matches!(err, CrmError::InvalidId(_)));
    assert_eq!(crm.query_requests.load(Ordering::SeqCst), 0);
}
