//! Extraction pipeline: list, select, download, read, extract.
//!
//! Every remote call is made in sequence. CRM and PDF failures propagate
//! as errors; model failures come back inside the [`ExtractionResult`].

use crate::error::{CliError, Result};
use dealscan_crm::CrmError;
use dealscan_domain::{AttachmentLink, CrmSource, Opportunity};
use dealscan_extractor::{ContractExtractor, ExtractionInput, ExtractionResult};
use dealscan_llm::ModelProvider;
use serde::Serialize;
use tracing::{info, warn};

/// Interactive choice between candidates
///
/// Returning `Ok(None)` cancels the run.
pub trait Selector {
    /// Pick one of `opportunities` by index
    fn choose_opportunity(&mut self, opportunities: &[Opportunity]) -> Result<Option<usize>>;

    /// Pick one of `attachments` by index
    fn choose_attachment(&mut self, attachments: &[&AttachmentLink]) -> Result<Option<usize>>;
}

/// How the document reaches the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// Extract text locally and inline it in the prompt
    InlineText,
    /// Attach the PDF bytes to the request
    Attach,
}

/// Opportunity the analyzed document belongs to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityRef {
    /// Record id
    pub id: String,
    /// Opportunity name
    pub name: String,
}

/// Result of analyzing one document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionReport {
    /// Owning opportunity, when the document was reached through one
    pub opportunity: Option<OpportunityRef>,
    /// Content document id
    pub document_id: String,
    /// Document title, when known
    pub document_title: Option<String>,
    /// How the document was sent
    pub mode: InputMode,
    /// Size of the downloaded PDF
    pub document_bytes: usize,
    /// Model outcome
    pub result: ExtractionResult,
}

/// How a pipeline run ended
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// None of the listed opportunities has an attached file
    NoOpportunitiesWithFiles,
    /// The chosen opportunity has files but none is a PDF
    NoPdfAttachments {
        /// Opportunity name
        opportunity: String,
    },
    /// The user backed out of a selection
    Cancelled,
    /// A document was analyzed
    Extracted(Box<ExtractionReport>),
}

/// Drives one extraction over a CRM source and a model
pub struct Pipeline<'a, C, P> {
    crm: &'a C,
    extractor: &'a ContractExtractor<P>,
    mode: InputMode,
}

impl<'a, C, P> Pipeline<'a, C, P>
where
    C: CrmSource<Error = CrmError>,
    P: ModelProvider,
{
    /// Create a pipeline
    pub fn new(crm: &'a C, extractor: &'a ContractExtractor<P>, mode: InputMode) -> Self {
        Self {
            crm,
            extractor,
            mode,
        }
    }

    /// Closed opportunities that have at least one attached file
    pub async fn candidates(&self, limit: usize) -> Result<Vec<Opportunity>> {
        let opportunities = self.crm.closed_opportunities(limit).await?;
        let total = opportunities.len();
        let with_files: Vec<Opportunity> = opportunities
            .into_iter()
            .filter(Opportunity::has_attachments)
            .collect();
        info!(total, with_files = with_files.len(), "Listed closed opportunities");
        Ok(with_files)
    }

    /// Full run: pick an opportunity and a PDF, then analyze it
    ///
    /// With `opportunity_id` the opportunity prompt is skipped; the id must
    /// be among the `limit` most recent opportunities with files.
    pub async fn run(
        &self,
        limit: usize,
        opportunity_id: Option<&str>,
        selector: &mut dyn Selector,
    ) -> Result<RunOutcome> {
        let candidates = self.candidates(limit).await?;
        if candidates.is_empty() {
            warn!("No closed opportunities with attached files");
            return Ok(RunOutcome::NoOpportunitiesWithFiles);
        }

        let opportunity = match opportunity_id {
            Some(id) => candidates.iter().find(|o| o.id == id).ok_or_else(|| {
                CliError::InvalidInput(format!(
                    "Opportunity {} is not among the {} most recent closed opportunities with files",
                    id, limit
                ))
            })?,
            None => match selector.choose_opportunity(&candidates)? {
                Some(index) => candidates.get(index).ok_or_else(|| {
                    CliError::InvalidInput(format!("No opportunity at position {}", index + 1))
                })?,
                None => return Ok(RunOutcome::Cancelled),
            },
        };

        let pdfs: Vec<&AttachmentLink> = opportunity.pdf_attachments().collect();
        let attachment = match pdfs.as_slice() {
            [] => {
                warn!(opportunity = %opportunity.name, "No PDF attachments");
                return Ok(RunOutcome::NoPdfAttachments {
                    opportunity: opportunity.name.clone(),
                });
            }
            [only] => *only,
            _ => match selector.choose_attachment(&pdfs)? {
                Some(index) => *pdfs.get(index).ok_or_else(|| {
                    CliError::InvalidInput(format!("No attachment at position {}", index + 1))
                })?,
                None => return Ok(RunOutcome::Cancelled),
            },
        };

        let mut report = self
            .analyze_document(&attachment.content_document_id, Some(&attachment.title))
            .await?;
        report.opportunity = Some(OpportunityRef {
            id: opportunity.id.clone(),
            name: opportunity.name.clone(),
        });
        Ok(RunOutcome::Extracted(Box::new(report)))
    }

    /// Download one document and run it through the model
    pub async fn analyze_document(
        &self,
        document_id: &str,
        title: Option<&str>,
    ) -> Result<ExtractionReport> {
        let bytes = self.crm.fetch_document(document_id).await?;
        let document_bytes = bytes.len();

        let input = match self.mode {
            InputMode::Attach => ExtractionInput::Document(bytes),
            InputMode::InlineText => {
                let text = read_text(bytes).await?;
                if text.is_empty() {
                    warn!(document_id, "Document has no extractable text");
                }
                ExtractionInput::Text(text)
            }
        };

        let result = self.extractor.extract_contract_info(input).await;
        if let Some(error) = result.error() {
            warn!(document_id, "Extraction failed: {}", error);
        }

        Ok(ExtractionReport {
            opportunity: None,
            document_id: document_id.to_string(),
            document_title: title.map(str::to_string),
            mode: self.mode,
            document_bytes,
            result,
        })
    }
}

/// PDF bytes to page-delimited text, off the async workers
pub async fn read_text(bytes: Vec<u8>) -> Result<String> {
    let text = tokio::task::spawn_blocking(move || dealscan_pdf::extract_text(&bytes)).await??;
    Ok(text)
}
