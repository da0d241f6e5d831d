//! LexML URN fragment to site-slug conversion.
//!
//! A URN fragment addresses a sub-element after the `!` separator, with
//! tokens joined by `_`: `art121_par2_inc4` becomes
//! `artigo-121.paragrafo-2.inciso-4`.

use regex::Regex;
use std::sync::LazyLock;

static URN_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^([a-z]+)(\d+[a-z]?(?:-[a-z])?)$").unwrap());

const TYPE_MAP: &[(&str, &str)] = &[
    ("art", "artigo"),
    ("par", "paragrafo"),
    ("inc", "inciso"),
    ("ali", "alinea"),
    ("ite", "item"),
    ("cpt", "caput"),
    ("prt", "parte"),
    ("liv", "livro"),
    ("tit", "titulo"),
    ("cap", "capitulo"),
    ("sec", "secao"),
];

/// Slug prefixes allowed to open a fragment that does not start at an
/// article (partial fragments addressing a sub-element directly).
const CONTINUATION_PREFIXES: &[&str] = &["paragrafo-", "inciso-", "alinea-", "item-", "caput"];

fn slug_type(urn_type: &str) -> Option<&'static str> {
    TYPE_MAP
        .iter()
        .find(|&&(t, _)| t == urn_type)
        .map(|&(_, s)| s)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugConversion {
    pub slug: String,
    pub valid: bool,
    /// Tokens that matched no known type and were passed through as-is.
    pub unknown_tokens: Vec<String>,
}

/// Extract the fragment after the `!` separator of a full URN.
pub fn urn_fragment(urn: &str) -> Option<&str> {
    urn.rsplit_once('!').map(|(_, frag)| frag)
}

/// Convert a URN fragment (with or without the leading `!`) to the
/// dotted hierarchical slug.
pub fn urn_to_slug(fragment: &str) -> SlugConversion {
    let fragment = fragment.strip_prefix('!').unwrap_or(fragment);
    if fragment.is_empty() {
        return SlugConversion {
            slug: String::new(),
            valid: false,
            unknown_tokens: Vec::new(),
        };
    }

    let mut segments = Vec::new();
    let mut unknown_tokens = Vec::new();

    for token in fragment.split('_') {
        match URN_TOKEN_RE.captures(token) {
            Some(caps) => {
                let urn_type = caps[1].to_lowercase();
                let number = caps[2].to_lowercase();
                match slug_type(&urn_type) {
                    Some("caput") => segments.push("caput".to_string()),
                    Some(slug) => segments.push(format!("{slug}-{number}")),
                    None => {
                        unknown_tokens.push(token.to_string());
                        segments.push(token.to_string());
                    }
                }
            }
            None if token.eq_ignore_ascii_case("cpt") => segments.push("caput".to_string()),
            None => {
                unknown_tokens.push(token.to_string());
                segments.push(token.to_string());
            }
        }
    }

    let slug = segments.join(".");
    let valid = segments
        .first()
        .is_some_and(|first| first.starts_with("artigo-"));

    SlugConversion {
        slug,
        valid,
        unknown_tokens,
    }
}

/// Check that a slug produced elsewhere is structurally sound: it must
/// open with `artigo-` or, for partial fragments, one of the permitted
/// continuation prefixes.
pub fn validate_slug(slug: &str) -> bool {
    if slug.is_empty() {
        return false;
    }
    if slug.starts_with("artigo-") || slug == "caput" {
        return true;
    }
    CONTINUATION_PREFIXES.iter().any(|p| slug.starts_with(p))
}
