//! Opportunity module - closed deals and the documents attached to them

use chrono::NaiveDate;
use serde::Serialize;

/// A closed opportunity as seen by dealscan
///
/// This is a read-only projection of the CRM record. Only the fields the
/// listing and extraction flows display are kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Opportunity {
    /// CRM record id
    pub id: String,

    /// Opportunity name
    pub name: String,

    /// Name of the related account, if any
    pub account_name: Option<String>,

    /// Stage name (e.g. "Closed Won")
    pub stage_name: String,

    /// Deal amount in the org currency
    pub amount: Option<f64>,

    /// Close date
    pub close_date: Option<NaiveDate>,

    /// Opportunity type (e.g. "New Business")
    pub kind: Option<String>,

    /// Lead source
    pub lead_source: Option<String>,

    /// Free-text description
    pub description: Option<String>,

    /// Owner display name
    pub owner_name: Option<String>,

    /// Owner email
    pub owner_email: Option<String>,

    /// Creation timestamp as reported by the CRM
    pub created_date: Option<String>,

    /// Last modification timestamp as reported by the CRM
    pub last_modified_date: Option<String>,

    /// Documents linked to this opportunity
    pub attachments: Vec<AttachmentLink>,
}

impl Opportunity {
    /// Create an opportunity with only the required fields set
    ///
    /// # Examples
    ///
    /// ```
    /// use dealscan_domain::Opportunity;
    ///
    /// let opp = Opportunity::new("006000000000001AAA", "Acme renewal", "Closed Won");
    /// assert!(!opp.has_attachments());
    /// ```
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        stage_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            account_name: None,
            stage_name: stage_name.into(),
            amount: None,
            close_date: None,
            kind: None,
            lead_source: None,
            description: None,
            owner_name: None,
            owner_email: None,
            created_date: None,
            last_modified_date: None,
            attachments: Vec::new(),
        }
    }

    /// Whether at least one document is linked to this opportunity
    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }

    /// Attachments that look like PDFs
    pub fn pdf_attachments(&self) -> impl Iterator<Item = &AttachmentLink> {
        self.attachments.iter().filter(|a| a.is_pdf())
    }

    /// Description shortened to `max_chars`, with an ellipsis when cut
    pub fn short_description(&self, max_chars: usize) -> Option<String> {
        let description = self.description.as_deref()?;
        if description.chars().count() <= max_chars {
            return Some(description.to_string());
        }
        let cut: String = description.chars().take(max_chars).collect();
        Some(format!("{}...", cut))
    }
}

/// A content document linked to an opportunity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttachmentLink {
    /// Content document id (not the version id)
    pub content_document_id: String,

    /// Document title
    pub title: String,

    /// File extension without the dot (e.g. "pdf")
    pub file_extension: Option<String>,

    /// Size of the latest version in bytes
    pub content_size: Option<u64>,
}

impl AttachmentLink {
    /// Create a new attachment link
    pub fn new(content_document_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            content_document_id: content_document_id.into(),
            title: title.into(),
            file_extension: None,
            content_size: None,
        }
    }

    /// Set the file extension
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.file_extension = Some(extension.into());
        self
    }

    /// Whether the attachment is a PDF, judged by extension then title
    pub fn is_pdf(&self) -> bool {
        match &self.file_extension {
            Some(ext) => ext.eq_ignore_ascii_case("pdf"),
            None => self.title.to_ascii_lowercase().ends_with(".pdf"),
        }
    }
}
