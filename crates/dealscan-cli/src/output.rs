//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use crate::pipeline::ExtractionReport;
use colored::*;
use dealscan_auth::TokenInfo;
use dealscan_domain::{AttachmentLink, Opportunity, PortfolioSummary};
use dealscan_extractor::ExtractionResult;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Active output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format an opportunity listing.
    pub fn format_opportunities(&self, opportunities: &[Opportunity]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(opportunities)?),
            OutputFormat::Table => Ok(self.format_opportunities_table(opportunities)),
            OutputFormat::Quiet => Ok(opportunities
                .iter()
                .map(|o| o.id.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    fn format_opportunities_table(&self, opportunities: &[Opportunity]) -> String {
        if opportunities.is_empty() {
            return self.colorize("No closed opportunities found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record([
            "#", "ID", "Name", "Account", "Stage", "Amount", "Close Date", "Owner", "Files",
        ]);

        for (i, opp) in opportunities.iter().enumerate() {
            builder.push_record([
                (i + 1).to_string(),
                opp.id.clone(),
                opp.name.clone(),
                opp.account_name.clone().unwrap_or_else(|| "N/A".to_string()),
                opp.stage_name.clone(),
                format_amount(opp.amount),
                opp.close_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "N/A".to_string()),
                opp.owner_name.clone().unwrap_or_else(|| "N/A".to_string()),
                opp.attachments.len().to_string(),
            ]);
        }

        render(builder)
    }

    /// Format the totals under a listing.
    pub fn format_summary(&self, summary: &PortfolioSummary) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(summary)?),
            OutputFormat::Quiet => Ok(String::new()),
            OutputFormat::Table => Ok(format!(
                "{}\n  Total Opportunities: {}\n  Total Amount: {}\n  Won: {}\n  Lost: {}\n  Other: {}",
                self.colorize("Summary", "cyan"),
                summary.count,
                format_currency(summary.total_amount),
                summary.won,
                summary.lost,
                summary.other
            )),
        }
    }

    /// Format a listing followed by its portfolio summary.
    pub fn format_listing(&self, opportunities: &[Opportunity]) -> Result<String> {
        let summary = PortfolioSummary::from_opportunities(opportunities);
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&serde_json::json!({
                "opportunities": opportunities,
                "summary": summary,
            }))?),
            OutputFormat::Quiet => self.format_opportunities(opportunities),
            OutputFormat::Table if opportunities.is_empty() => {
                self.format_opportunities(opportunities)
            }
            OutputFormat::Table => Ok(format!(
                "{}\n\n{}",
                self.format_opportunities(opportunities)?,
                self.format_summary(&summary)?
            )),
        }
    }

    /// Format the files attached to a set of opportunities.
    pub fn format_files(&self, opportunities: &[Opportunity]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(opportunities)?),
            OutputFormat::Quiet => Ok(opportunities
                .iter()
                .flat_map(|o| o.attachments.iter())
                .map(|a| a.content_document_id.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Table => {
                if opportunities.is_empty() {
                    return Ok(self.colorize("No closed opportunities with files found.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["Opportunity", "Document ID", "Title", "Type", "Size"]);
                for opp in opportunities {
                    for link in &opp.attachments {
                        builder.push_record(attachment_row(&opp.name, link));
                    }
                }
                Ok(render(builder))
            }
        }
    }

    /// Numbered list used by interactive selection.
    pub fn numbered_opportunities(&self, opportunities: &[Opportunity]) -> String {
        opportunities
            .iter()
            .enumerate()
            .map(|(i, opp)| {
                format!(
                    "{:>3}. {} ({}, {}, {} file(s))",
                    i + 1,
                    self.colorize(&opp.name, "cyan"),
                    opp.account_name.as_deref().unwrap_or("N/A"),
                    format_amount(opp.amount),
                    opp.attachments.len()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Numbered attachment list used by interactive selection.
    pub fn numbered_attachments(&self, attachments: &[&AttachmentLink]) -> String {
        attachments
            .iter()
            .enumerate()
            .map(|(i, link)| {
                format!(
                    "{:>3}. {} [{}]",
                    i + 1,
                    link.title,
                    link.content_size
                        .map(format_size)
                        .unwrap_or_else(|| "size unknown".to_string())
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format the outcome of one extraction.
    pub fn format_report(&self, report: &ExtractionReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Quiet => Ok(serde_json::to_string(&report.result)?),
            OutputFormat::Table => Ok(self.format_report_text(report)),
        }
    }

    fn format_report_text(&self, report: &ExtractionReport) -> String {
        let mut lines = Vec::new();
        if let Some(opp) = &report.opportunity {
            lines.push(format!("Opportunity: {} ({})", opp.name, opp.id));
        }
        lines.push(format!(
            "Document: {} ({}, {})",
            report.document_title.as_deref().unwrap_or("untitled"),
            report.document_id,
            format_size(report.document_bytes as u64)
        ));
        lines.push(String::new());

        match &report.result {
            ExtractionResult::Extracted(fields) => {
                lines.push(self.success("Contract analyzed"));
                lines.push(format!(
                    "  Effective Date: {}{}",
                    fields.effective_date().unwrap_or("not found"),
                    confidence_suffix(fields.effective_date_confidence())
                ));
                lines.push(format!(
                    "  Total Amount: {}{}",
                    fields
                        .total_amount()
                        .map(format_currency)
                        .unwrap_or_else(|| "not found".to_string()),
                    confidence_suffix(fields.total_amount_confidence())
                ));
                if let Some(notes) = fields.notes() {
                    lines.push(format!("  Notes: {}", notes));
                }
            }
            failure => {
                if let Some(error) = failure.error() {
                    lines.push(self.error(&error));
                }
                if let Some(raw) = failure.raw_response() {
                    lines.push("  Raw response:".to_string());
                    lines.push(raw.to_string());
                }
            }
        }

        lines.join("\n")
    }

    /// Format the token store status.
    pub fn format_token_info(&self, info: &TokenInfo) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(info)?),
            OutputFormat::Quiet => Ok(if info.is_valid { "valid" } else { "invalid" }.to_string()),
            OutputFormat::Table => {
                let status = match (info.has_token, info.is_valid) {
                    (false, _) => self.warning("No token cached"),
                    (true, true) => self.success("Token valid"),
                    (true, false) => self.warning("Token expired"),
                };
                let mut lines = vec![status];
                lines.push(format!(
                    "  Endpoint: {}",
                    info.endpoint_url.as_deref().unwrap_or("unknown")
                ));
                if let Some(issued) = info.issued_at {
                    lines.push(format!("  Issued: {}", issued.to_rfc3339()));
                }
                if let Some(expires) = info.expires_at {
                    lines.push(format!("  Expires: {}", expires.to_rfc3339()));
                }
                Ok(lines.join("\n"))
            }
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn render(builder: Builder) -> String {
    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

fn attachment_row(opportunity: &str, link: &AttachmentLink) -> [String; 5] {
    [
        opportunity.to_string(),
        link.content_document_id.clone(),
        link.title.clone(),
        link.file_extension.clone().unwrap_or_else(|| "?".to_string()),
        link.content_size
            .map(format_size)
            .unwrap_or_else(|| "?".to_string()),
    ]
}

fn confidence_suffix(confidence: Option<f64>) -> String {
    confidence
        .map(|c| format!(" (confidence: {:.0}%)", c * 100.0))
        .unwrap_or_default()
}

fn format_amount(amount: Option<f64>) -> String {
    amount.map(format_currency).unwrap_or_else(|| "N/A".to_string())
}

/// Dollar amount with thousands separators, e.g. `$1,234.56`.
pub fn format_currency(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, cents) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{InputMode, OpportunityRef};
    use dealscan_extractor::parse_model_reply;

    fn opportunity() -> Opportunity {
        let mut opp = Opportunity::new("006000000000001AAA", "Acme renewal", "Closed Won");
        opp.account_name = Some("Acme".to_string());
        opp.amount = Some(150000.0);
        opp.attachments
            .push(AttachmentLink::new("069000000000001AAA", "MSA.pdf").with_extension("pdf"));
        opp
    }

    fn report(result: ExtractionResult) -> ExtractionReport {
        ExtractionReport {
            opportunity: Some(OpportunityRef {
                id: "006000000000001AAA".to_string(),
                name: "Acme renewal".to_string(),
            }),
            document_id: "069000000000001AAA".to_string(),
            document_title: Some("MSA.pdf".to_string()),
            mode: InputMode::InlineText,
            document_bytes: 2048,
            result,
        }
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.5), "$999.50");
        assert_eq!(format_currency(1234.56), "$1,234.56");
        assert_eq!(format_currency(150000.0), "$150,000.00");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-2500.0), "-$2,500.00");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_opportunities(&[opportunity()]).unwrap();
        assert!(output.contains("Close Date"));
        assert!(output.contains("Acme renewal"));
        assert!(output.contains("$150,000.00"));
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_opportunities(&[opportunity()]).unwrap();
        assert_eq!(output, "006000000000001AAA");
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_opportunities(&[opportunity()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["stage_name"], "Closed Won");
    }

    #[test]
    fn test_empty_listing() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_opportunities(&[]).unwrap();
        assert!(output.contains("No closed opportunities found"));
    }

    #[test]
    fn test_summary() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let summary = PortfolioSummary::from_opportunities(&[opportunity()]);
        let output = formatter.format_summary(&summary).unwrap();
        assert!(output.contains("Total Amount: $150,000.00"));
        assert!(output.contains("Won: 1"));
    }

    #[test]
    fn test_json_listing_carries_summary() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_listing(&[opportunity()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["summary"]["count"], 1);
        assert_eq!(value["opportunities"][0]["id"], "006000000000001AAA");
    }

    #[test]
    fn test_extracted_report() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let result = parse_model_reply(
            r#"{"effective_date": "2024-01-15", "effective_date_confidence": 0.95,
               "total_amount": 1234.56, "total_amount_confidence": 0.8, "notes": "Section 4"}"#,
        );
        let output = formatter.format_report(&report(result)).unwrap();
        assert!(output.contains("Effective Date: 2024-01-15 (confidence: 95%)"));
        assert!(output.contains("Total Amount: $1,234.56 (confidence: 80%)"));
        assert!(output.contains("Notes: Section 4"));
        assert!(output.contains("MSA.pdf (069000000000001AAA, 2.0 KB)"));
    }

    #[test]
    fn test_failed_report_shows_raw_response() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter
            .format_report(&report(parse_model_reply("{not valid json")))
            .unwrap();
        assert!(output.contains("✗ JSON parsing error"));
        assert!(output.contains("{not valid json"));
    }

    #[test]
    fn test_quiet_report_is_result_json() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter
            .format_report(&report(parse_model_reply("no braces here")))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["error"], "Could not parse response");
        assert!(value["total_amount"].is_null());
    }

    #[test]
    fn test_token_info() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let info = TokenInfo {
            has_token: false,
            endpoint_url: None,
            issued_at: None,
            expires_at: None,
            is_valid: false,
        };
        let output = formatter.format_token_info(&info).unwrap();
        assert!(output.contains("No token cached"));
        assert!(output.contains("Endpoint: unknown"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }
}
