//! Page-addressable text sources

use lopdf::Document;

/// A document whose pages can be read one at a time
///
/// Page numbers are 1-based. A failure on one page must not affect
/// the others.
pub trait PageSource {
    /// Page numbers in document order
    fn page_numbers(&self) -> Vec<u32>;

    /// Plain text of a single page
    fn page_text(&self, number: u32) -> Result<String, String>;
}

impl PageSource for Document {
    fn page_numbers(&self) -> Vec<u32> {
        // BTreeMap keys, so already ascending
        self.get_pages().into_keys().collect()
    }

    fn page_text(&self, number: u32) -> Result<String, String> {
        self.extract_text(&[number]).map_err(|e| e.to_string())
    }
}
