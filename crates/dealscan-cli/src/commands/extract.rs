//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::Result;
use crate::output::Formatter;
use crate::pipeline::{InputMode, Pipeline, RunOutcome, Selector};
use dealscan_crm::CrmError;
use dealscan_domain::CrmSource;
use dealscan_extractor::ContractExtractor;
use dealscan_llm::ModelProvider;

/// Execute the extract command.
///
/// With `--document` the CRM listing is skipped entirely.
pub async fn execute_extract<C, P>(
    args: ExtractArgs,
    crm: &C,
    extractor: &ContractExtractor<P>,
    selector: &mut dyn Selector,
    default_limit: usize,
    formatter: &Formatter,
) -> Result<()>
where
    C: CrmSource<Error = CrmError>,
    P: ModelProvider,
{
    let mode = if args.attach {
        InputMode::Attach
    } else {
        InputMode::InlineText
    };
    let pipeline = Pipeline::new(crm, extractor, mode);

    if let Some(document_id) = args.document.as_deref() {
        let report = pipeline.analyze_document(document_id, None).await?;
        println!("{}", formatter.format_report(&report)?);
        return Ok(());
    }

    let limit = args.limit.unwrap_or(default_limit);
    match pipeline
        .run(limit, args.opportunity.as_deref(), selector)
        .await?
    {
        RunOutcome::NoOpportunitiesWithFiles => eprintln!(
            "{}",
            formatter.warning(&format!(
                "None of the last {} closed opportunities has attached files",
                limit
            ))
        ),
        RunOutcome::NoPdfAttachments { opportunity } => eprintln!(
            "{}",
            formatter.warning(&format!("'{}' has no PDF attachments", opportunity))
        ),
        RunOutcome::Cancelled => eprintln!("{}", formatter.info("Cancelled")),
        RunOutcome::Extracted(report) => println!("{}", formatter.format_report(&report)?),
    }
    Ok(())
}
