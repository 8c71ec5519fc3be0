//! Interactive numeric selection on the terminal.

use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::pipeline::Selector;
use dealscan_domain::{AttachmentLink, Opportunity};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// What the user typed at a selection prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Zero-based index of the picked entry
    Pick(usize),
    /// Leave without picking
    Quit,
    /// Not a number in range
    Invalid,
}

/// Interpret one line of input against a list of `count` entries
///
/// Entries are numbered from 1. An empty line or `q` quits.
pub fn parse_choice(line: &str, count: usize) -> Choice {
    let line = line.trim();
    if line.is_empty() || line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
        return Choice::Quit;
    }
    match line.parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Choice::Pick(n - 1),
        _ => Choice::Invalid,
    }
}

/// [`Selector`] reading choices from the terminal
pub struct ConsoleSelector<'a> {
    editor: DefaultEditor,
    formatter: &'a Formatter,
}

impl<'a> ConsoleSelector<'a> {
    /// Create a selector printing with `formatter`
    pub fn new(formatter: &'a Formatter) -> Result<Self> {
        let editor = DefaultEditor::new()
            .map_err(|e| CliError::Prompt(format!("Failed to initialize editor: {}", e)))?;
        Ok(Self { editor, formatter })
    }

    fn ask(&mut self, what: &str, count: usize) -> Result<Option<usize>> {
        let prompt = format!("Select {} (1-{}, Enter to quit): ", what, count);
        loop {
            match self.editor.readline(&prompt) {
                Ok(line) => match parse_choice(&line, count) {
                    Choice::Pick(index) => return Ok(Some(index)),
                    Choice::Quit => return Ok(None),
                    Choice::Invalid => {
                        eprintln!(
                            "{}",
                            self.formatter
                                .warning(&format!("Enter a number between 1 and {}", count))
                        );
                    }
                },
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => return Ok(None),
                Err(e) => return Err(CliError::Prompt(e.to_string())),
            }
        }
    }
}

impl Selector for ConsoleSelector<'_> {
    fn choose_opportunity(&mut self, opportunities: &[Opportunity]) -> Result<Option<usize>> {
        println!(
            "{}",
            self.formatter.info(&format!(
                "{} closed opportunities with files:",
                opportunities.len()
            ))
        );
        println!("{}", self.formatter.numbered_opportunities(opportunities));
        self.ask("an opportunity", opportunities.len())
    }

    fn choose_attachment(&mut self, attachments: &[&AttachmentLink]) -> Result<Option<usize>> {
        println!(
            "{}",
            self.formatter
                .info(&format!("{} PDF attachments:", attachments.len()))
        );
        println!("{}", self.formatter.numbered_attachments(attachments));
        self.ask("a document", attachments.len())
    }
}
