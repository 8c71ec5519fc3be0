//! Opportunities command implementation.

use crate::cli::ListArgs;
use crate::error::Result;
use crate::output::Formatter;
use dealscan_crm::CrmError;
use dealscan_domain::CrmSource;

/// Execute the opportunities command.
pub async fn execute_opportunities<C>(
    args: ListArgs,
    crm: &C,
    default_limit: usize,
    formatter: &Formatter,
) -> Result<()>
where
    C: CrmSource<Error = CrmError>,
{
    let limit = args.limit.unwrap_or(default_limit);
    let opportunities = crm.closed_opportunities(limit).await?;
    println!("{}", formatter.format_listing(&opportunities)?);
    Ok(())
}
