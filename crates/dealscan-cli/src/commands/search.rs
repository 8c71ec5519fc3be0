//! Search command implementation.

use crate::cli::SearchArgs;
use crate::config::OutputFormat;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use dealscan_crm::CrmError;
use dealscan_domain::CrmSource;

/// Execute the search command.
pub async fn execute_search<C>(
    args: SearchArgs,
    crm: &C,
    default_limit: usize,
    formatter: &Formatter,
) -> Result<()>
where
    C: CrmSource<Error = CrmError>,
{
    let term = args.term.trim();
    if term.is_empty() {
        return Err(CliError::InvalidInput("Search term cannot be empty".to_string()));
    }

    let limit = args.limit.unwrap_or(default_limit);
    let matches = crm.search_opportunities(term, limit).await?;

    if matches.is_empty() && formatter.format() == OutputFormat::Table {
        println!(
            "{}",
            formatter.warning(&format!(
                "No closed opportunities found matching '{}'",
                term
            ))
        );
        return Ok(());
    }

    println!("{}", formatter.format_opportunities(&matches)?);
    Ok(())
}
