//! Parser strategies and their selection.
//!
//! Structured JSON is parsed directly. HTML goes through one of two
//! strategies: the tag parser (bold-span driven, fits the normas binary
//! HTML) and the text parser (line-block heuristics, fits the sparse
//! Planalto markup). Planalto-looking sources try the text parser first
//! and fall back to the tag parser on any failure.

use crate::element::{LawElement, Structure};
use crate::error::{ImporterError, Result};
use crate::runtime::client::Payload;

pub mod builder;
pub mod common;
pub mod normas;
pub mod planalto;

/// Environment switch forcing the text parser to run first even when
/// the HTML does not look like a Planalto page.
pub const TEXT_PARSER_ENV: &str = "IMPORTER_TEXT_PARSER";

#[derive(Debug, Clone, Default)]
pub struct ParsedLaw {
    pub articles: Vec<LawElement>,
    pub structure: Structure,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserUsed {
    Json,
    Tag,
    Text,
}

impl ParserUsed {
    pub fn as_str(self) -> &'static str {
        match self {
            ParserUsed::Json => "json",
            ParserUsed::Tag => "tag",
            ParserUsed::Text => "text",
        }
    }
}

/// Parse an acquisition payload into the element tree, applying the
/// strategy selection and fallback order.
pub fn parse_payload(payload: &Payload) -> Result<(ParsedLaw, ParserUsed)> {
    match payload {
        Payload::Json(data) => {
            let parsed = normas::json::parse_normas_json(data);
            ensure_articles(parsed, ParserUsed::Json)
        }
        Payload::Html(html) => parse_html(html),
    }
}

pub fn parse_html(html: &str) -> Result<(ParsedLaw, ParserUsed)> {
    let text_first = html.to_lowercase().contains("planalto")
        || std::env::var(TEXT_PARSER_ENV).map(|v| v == "1").unwrap_or(false);

    if text_first {
        match planalto::text::parse_text_html(html) {
            Ok(parsed) if !parsed.articles.is_empty() => {
                return Ok((parsed, ParserUsed::Text));
            }
            Ok(_) => {
                tracing::warn!("text parser produced no articles, trying tag parser");
            }
            Err(err) => {
                tracing::warn!("text parser failed ({err}), trying tag parser");
            }
        }
    }

    let parsed = normas::tag::parse_tag_html(html);
    ensure_articles(parsed, ParserUsed::Tag)
}

fn ensure_articles(parsed: ParsedLaw, used: ParserUsed) -> Result<(ParsedLaw, ParserUsed)> {
    if parsed.articles.is_empty() {
        return Err(ImporterError::ParseFailed(format!(
            "{} parser found no articles",
            used.as_str()
        )));
    }
    Ok((parsed, used))
}
