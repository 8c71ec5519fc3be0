//! Wire shapes of the REST query API and their mapping to domain types

use chrono::NaiveDate;
use dealscan_domain::{AttachmentLink, Opportunity};
use serde::Deserialize;

/// One page of a query result
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryPage<T> {
    /// Total number of matching records across all pages
    #[allow(dead_code)]
    pub total_size: u64,
    /// Whether this is the last page
    pub done: bool,
    /// Records on this page
    pub records: Vec<T>,
    /// Relative URL of the next page
    #[serde(default)]
    pub next_records_url: Option<String>,
}

/// Parent reference with a display name (`Account.Name`)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NamedRef {
    pub name: Option<String>,
}

/// Owner reference (`Owner.Name`, `Owner.Email`)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OwnerRef {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Opportunity row as returned by the listing query
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OpportunityRecord {
    pub id: String,
    pub name: String,
    pub account: Option<NamedRef>,
    pub stage_name: String,
    pub amount: Option<f64>,
    pub close_date: Option<NaiveDate>,
    #[serde(rename = "Type")]
    pub kind: Option<String>,
    pub lead_source: Option<String>,
    pub description: Option<String>,
    pub owner: Option<OwnerRef>,
    pub created_date: Option<String>,
    pub last_modified_date: Option<String>,
    pub content_document_links: Option<QueryPage<ContentDocumentLinkRecord>>,
}

/// Row of the nested `ContentDocumentLinks` subquery
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContentDocumentLinkRecord {
    pub content_document_id: String,
    pub content_document: Option<ContentDocumentRef>,
}

/// `ContentDocument` fields selected through the link
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContentDocumentRef {
    pub title: Option<String>,
    pub file_extension: Option<String>,
    pub content_size: Option<u64>,
}

/// Row of the latest-version lookup
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContentVersionRecord {
    pub id: String,
    pub title: Option<String>,
    pub file_extension: Option<String>,
    pub version_number: Option<String>,
}

impl From<ContentDocumentLinkRecord> for AttachmentLink {
    fn from(link: ContentDocumentLinkRecord) -> Self {
        let document = link.content_document;
        let title = document
            .as_ref()
            .and_then(|d| d.title.clone())
            .unwrap_or_else(|| link.content_document_id.clone());

        AttachmentLink {
            content_document_id: link.content_document_id,
            title,
            file_extension: document.as_ref().and_then(|d| d.file_extension.clone()),
            content_size: document.and_then(|d| d.content_size),
        }
    }
}

impl From<OpportunityRecord> for Opportunity {
    fn from(record: OpportunityRecord) -> Self {
        let attachments = record
            .content_document_links
            .map(|page| page.records.into_iter().map(AttachmentLink::from).collect())
            .unwrap_or_default();
        let (owner_name, owner_email) = match record.owner {
            Some(owner) => (owner.name, owner.email),
            None => (None, None),
        };

        Opportunity {
            id: record.id,
            name: record.name,
            account_name: record.account.and_then(|a| a.name),
            stage_name: record.stage_name,
            amount: record.amount,
            close_date: record.close_date,
            kind: record.kind,
            lead_source: record.lead_source,
            description: record.description,
            owner_name,
            owner_email,
            created_date: record.created_date,
            last_modified_date: record.last_modified_date,
            attachments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"{
        "totalSize": 2,
        "done": true,
        "records": [
            {
                "attributes": {"type": "Opportunity", "url": "/services/data/v59.0/sobjects/Opportunity/006A"},
                "Id": "006000000000001AAA",
                "Name": "Acme renewal",
                "AccountId": "001000000000001AAA",
                "Account": {"attributes": {"type": "Account"}, "Name": "Acme"},
                "StageName": "Closed Won",
                "Amount": 150000.0,
                "CloseDate": "2024-01-15",
                "Type": "Renewal",
                "LeadSource": null,
                "Description": null,
                "CreatedDate": "2023-11-01T10:00:00.000+0000",
                "LastModifiedDate": "2024-01-16T09:30:00.000+0000",
                "Owner": {"attributes": {"type": "User"}, "Name": "Dana Smith", "Email": "dana@example.com"},
                "ContentDocumentLinks": {
                    "totalSize": 1,
                    "done": true,
                    "records": [
                        {
                            "attributes": {"type": "ContentDocumentLink"},
                            "ContentDocumentId": "069000000000001AAA",
                            "ContentDocument": {"Title": "MSA", "FileExtension": "pdf", "ContentSize": 20480}
                        }
                    ]
                }
            },
            {
                "Id": "006000000000002AAA",
                "Name": "Globex expansion",
                "Account": null,
                "StageName": "Closed Won",
                "Amount": null,
                "CloseDate": "2024-01-10",
                "Owner": null,
                "ContentDocumentLinks": null
            }
        ]
    }"#;

    #[test]
    fn test_decode_listing() {
        let page: QueryPage<OpportunityRecord> = serde_json::from_str(LISTING).unwrap();
        assert!(page.done);
        assert_eq!(page.records.len(), 2);

        let opps: Vec<Opportunity> = page.records.into_iter().map(Opportunity::from).collect();

        let first = &opps[0];
        assert_eq!(first.account_name.as_deref(), Some("Acme"));
        assert_eq!(first.amount, Some(150000.0));
        assert_eq!(first.close_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(first.kind.as_deref(), Some("Renewal"));
        assert_eq!(first.owner_email.as_deref(), Some("dana@example.com"));
        assert_eq!(first.attachments.len(), 1);
        assert_eq!(first.attachments[0].title, "MSA");
        assert!(first.attachments[0].is_pdf());
        assert_eq!(first.attachments[0].content_size, Some(20480));

        let second = &opps[1];
        assert!(second.account_name.is_none());
        assert!(second.owner_name.is_none());
        assert!(!second.has_attachments());
    }

    #[test]
    fn test_link_without_document_uses_id_as_title() {
        let link = ContentDocumentLinkRecord {
            content_document_id: "069000000000001AAA".to_string(),
            content_document: None,
        };
        let attachment = AttachmentLink::from(link);
        assert_eq!(attachment.title, "069000000000001AAA");
        assert!(attachment.file_extension.is_none());
    }
}
