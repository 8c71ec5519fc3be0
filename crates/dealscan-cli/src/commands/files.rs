//! Files command implementation.

use crate::cli::ListArgs;
use crate::error::Result;
use crate::output::Formatter;
use dealscan_crm::CrmError;
use dealscan_domain::{CrmSource, Opportunity};

/// Execute the files command.
pub async fn execute_files<C>(
    args: ListArgs,
    crm: &C,
    default_limit: usize,
    formatter: &Formatter,
) -> Result<()>
where
    C: CrmSource<Error = CrmError>,
{
    let limit = args.limit.unwrap_or(default_limit);
    let with_files: Vec<Opportunity> = crm
        .closed_opportunities(limit)
        .await?
        .into_iter()
        .filter(Opportunity::has_attachments)
        .collect();

    println!("{}", formatter.format_files(&with_files)?);
    Ok(())
}
