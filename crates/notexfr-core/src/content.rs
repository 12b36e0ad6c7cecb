//! Rich-text note body extraction.
//!
//! Source note bodies are XHTML documents whose user content lives under a
//! single `en-note` element. Parsed as HTML, that element ends up at
//! `html > body > en-note`.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html};

use crate::defaults::CONTENT_ROOT;
use crate::error::{Error, Result};

static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"<br[^>]*>").unwrap());
static LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"<li[^>]*>").unwrap());

/// Serialized markup of the children of the body's `en-note` element.
///
/// Fails with [`Error::NodeNotFound`] naming the first element on the
/// `html.body.en-note` path that is missing or out of place.
pub fn extract_envelope(raw: &str) -> Result<String> {
    let document = Html::parse_document(raw);

    let html = document
        .tree
        .root()
        .last_child()
        .and_then(ElementRef::wrap)
        .filter(|el| el.value().name() == "html")
        .ok_or_else(|| Error::NodeNotFound("html".to_string()))?;

    let body = html
        .last_child()
        .and_then(ElementRef::wrap)
        .filter(|el| el.value().name() == "body")
        .ok_or_else(|| Error::NodeNotFound("html.body".to_string()))?;

    let root = body
        .first_child()
        .and_then(ElementRef::wrap)
        .filter(|el| el.value().name() == CONTENT_ROOT)
        .ok_or_else(|| Error::NodeNotFound(format!("html.body.{CONTENT_ROOT}")))?;

    Ok(root.inner_html())
}

/// Approximate plain-text line structure: line breaks become blank lines
/// and every list item starts a new line. Other markup is left in place.
pub fn clean_text(markup: &str) -> String {
    let out = LINE_BREAK.replace_all(markup, "\n\n");
    LIST_ITEM.replace_all(&out, "\n").into_owned()
}

/// Body text for a target note: envelope extraction followed by [`clean_text`].
pub fn extract_note_text(raw: &str) -> Result<String> {
    extract_envelope(raw).map(|markup| clean_text(&markup))
}
