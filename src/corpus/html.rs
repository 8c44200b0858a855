//! Paragraph text extraction built on `scraper`.

use scraper::{Html, Selector};

/// Pulls the visible text of every `<p>` element out of an HTML page.
#[derive(Clone)]
pub struct ParagraphExtractor {
    paragraph: Selector,
}

impl ParagraphExtractor {
    pub fn new() -> Self {
        Self {
            paragraph: Selector::parse("p").expect("paragraph selector"),
        }
    }

    /// Extract paragraph text, one space between paragraphs.
    ///
    /// Whitespace inside each paragraph is collapsed; empty paragraphs are
    /// dropped. A page without paragraphs yields an empty string.
    pub fn extract(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        document
            .select(&self.paragraph)
            .map(|p| collapse_whitespace(p.text()))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for ParagraphExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn collapse_whitespace<'a>(pieces: impl Iterator<Item = &'a str>) -> String {
    let raw: String = pieces.collect();
    let mut buf = String::with_capacity(raw.len());
    for word in raw.split_whitespace() {
        if !buf.is_empty() {
            buf.push(' ');
        }
        buf.push_str(word);
    }
    buf
}
