//! Token command implementation.

use crate::cli::TokenArgs;
use crate::error::Result;
use crate::output::Formatter;
use dealscan_auth::TokenManager;

/// Execute the token command.
pub async fn execute_token(
    args: TokenArgs,
    tokens: &TokenManager,
    formatter: &Formatter,
) -> Result<()> {
    if args.refresh {
        tokens.refresh().await?;
        eprintln!("{}", formatter.success("Obtained a new access token"));
    }

    let info = tokens.token_info().await;
    println!("{}", formatter.format_token_info(&info)?);

    if !info.has_token && !args.refresh {
        eprintln!(
            "{}",
            formatter.info("Tokens live only for this process; use --refresh to request one")
        );
    }
    Ok(())
}
