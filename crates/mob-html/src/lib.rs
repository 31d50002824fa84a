//! Mobilize HTML
//!
//! HTML5 parsing built on html5ever, converted into the arena tree from
//! `mob-dom`, plus the serializer used to write rewritten documents back out.

mod parser;
mod serializer;

pub use mob_dom::Document;
pub use parser::HtmlParser;
pub use serializer::{HtmlSerializer, get_outer_html};

/// Parse an HTML string into a [`Document`]
pub fn parse(html: &str) -> Document {
    HtmlParser::new().parse(html)
}

/// Serialize a whole document back to markup
pub fn serialize(doc: &Document) -> String {
    HtmlSerializer::new().serialize_document(doc.tree())
}

/// Parse error
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("document is not valid UTF-8 at byte {offset}")]
    InvalidUtf8 { offset: usize },
}
