//! Dealscan PDF
//!
//! Converts PDF bytes into page-delimited plain text for the model prompt.
//!
//! ```text
//! --- Page 1 ---
//! <text of page 1>
//! --- Page 2 ---
//! [Error extracting page 2: <detail>]
//! ```
//!
//! The page loop is written against [`PageSource`], implemented for
//! [`lopdf::Document`], so it can be driven by any page-addressable source.

#![warn(missing_docs)]

mod error;
mod extract;
mod source;

pub use error::PdfError;
pub use extract::{extract_pages, extract_text, open, render_pages, PageText};
pub use source::PageSource;
