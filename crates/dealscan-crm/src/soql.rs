//! SOQL query construction
//!
//! Every user-supplied value goes through [`escape_literal`],
//! [`escape_like`] or [`validate_id`] before it is spliced into a query.

use crate::error::CrmError;

/// Largest LIMIT the REST query endpoint accepts in one page
pub const MAX_LIMIT: usize = 2000;

/// Stage the listing and search queries filter on
pub const CLOSED_WON_STAGE: &str = "Closed Won";

const OPPORTUNITY_FIELDS: &str = "Id, Name, AccountId, Account.Name, StageName, Amount, CloseDate, \
Type, LeadSource, Description, CreatedDate, LastModifiedDate, Owner.Name, Owner.Email";

const ATTACHMENT_SUBQUERY: &str = "(SELECT ContentDocumentId, ContentDocument.Title, \
ContentDocument.FileExtension, ContentDocument.ContentSize FROM ContentDocumentLinks)";

/// Check that `id` looks like a CRM record id (15 or 18 alphanumerics)
pub fn validate_id(id: &str) -> Result<&str, CrmError> {
    let valid_len = id.len() == 15 || id.len() == 18;
    if valid_len && id.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(id)
    } else {
        Err(CrmError::InvalidId(id.to_string()))
    }
}

/// Escape a value for use inside a single-quoted SOQL string
pub fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Escape a value for use inside a LIKE pattern, wildcards included
pub fn escape_like(value: &str) -> String {
    escape_literal(value).replace('%', "\\%").replace('_', "\\_")
}

fn clamp_limit(limit: usize) -> usize {
    limit.clamp(1, MAX_LIMIT)
}

/// Closed Won opportunities with their document links, newest close date first
pub fn closed_opportunities(limit: usize) -> String {
    format!(
        "SELECT {OPPORTUNITY_FIELDS}, {ATTACHMENT_SUBQUERY} FROM Opportunity \
         WHERE StageName = '{CLOSED_WON_STAGE}' ORDER BY CloseDate DESC LIMIT {}",
        clamp_limit(limit)
    )
}

/// Closed Won opportunities whose name contains `term`
pub fn search_opportunities(term: &str, limit: usize) -> String {
    format!(
        "SELECT {OPPORTUNITY_FIELDS}, {ATTACHMENT_SUBQUERY} FROM Opportunity \
         WHERE StageName = '{CLOSED_WON_STAGE}' AND Name LIKE '%{}%' \
         ORDER BY CloseDate DESC LIMIT {}",
        escape_like(term),
        clamp_limit(limit)
    )
}

/// Latest version of a content document
pub fn latest_version(document_id: &str) -> Result<String, CrmError> {
    let id = validate_id(document_id)?;
    Ok(format!(
        "SELECT Id, Title, FileExtension, VersionNumber FROM ContentVersion \
         WHERE ContentDocumentId = '{id}' AND IsLatest = true LIMIT 1"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id() {
        assert!(validate_id("069000000000001").is_ok());
        assert!(validate_id("069000000000001AAA").is_ok());
        assert!(validate_id("069").is_err());
        assert!(validate_id("069000000000001' OR ''='").is_err());
        assert!(validate_id("06900000000000-").is_err());
    }

    #[test]
    fn test_escape_literal_quotes() {
        assert_eq!(escape_literal("O'Brien"), "O\\'Brien");
        assert_eq!(escape_literal("a\\b"), "a\\\\b");
        assert_eq!(escape_literal("line\nbreak"), "line\\nbreak");
    }

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("100%_off"), "100\\%\\_off");
        assert_eq!(escape_like("it's"), "it\\'s");
    }

    #[test]
    fn test_closed_opportunities_query() {
        let q = closed_opportunities(20);
        assert!(q.contains("FROM Opportunity"));
        assert!(q.contains("StageName = 'Closed Won'"));
        assert!(q.contains("FROM ContentDocumentLinks"));
        assert!(q.ends_with("LIMIT 20"));
    }

    #[test]
    fn test_limit_is_clamped() {
        assert!(closed_opportunities(0).ends_with("LIMIT 1"));
        assert!(closed_opportunities(50_000).ends_with("LIMIT 2000"));
    }

    #[test]
    fn test_search_query_escapes_term() {
        let q = search_opportunities("Acme' OR Name != '", 5);
        assert!(q.contains("Name LIKE '%Acme\\' OR Name != \\'%'"));
        assert!(q.ends_with("LIMIT 5"));
    }

    #[test]
    fn test_latest_version_query() {
        let q = latest_version("069000000000001AAA").unwrap();
        assert!(q.contains("ContentDocumentId = '069000000000001AAA'"));
        assert!(q.contains("IsLatest = true"));

        assert!(matches!(latest_version("bad id"), Err(CrmError::InvalidId(_))));
    }
}
