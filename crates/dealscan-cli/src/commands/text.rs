//! Text command implementation.

use crate::cli::TextArgs;
use crate::config::OutputFormat;
use crate::error::Result;
use crate::output::Formatter;
use crate::pipeline::read_text;
use dealscan_crm::CrmError;
use dealscan_domain::CrmSource;

/// Execute the text command.
pub async fn execute_text<C>(args: TextArgs, crm: &C, formatter: &Formatter) -> Result<()>
where
    C: CrmSource<Error = CrmError>,
{
    let bytes = crm.fetch_document(&args.document_id).await?;
    let size = bytes.len();
    let text = read_text(bytes).await?;

    match formatter.format() {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "document_id": args.document_id,
                "bytes": size,
                "text": text,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Quiet => println!("{}", text),
        OutputFormat::Table => {
            if text.is_empty() {
                println!("{}", formatter.warning("Document has no extractable text"));
            } else {
                println!("{}", text);
            }
        }
    }
    Ok(())
}
