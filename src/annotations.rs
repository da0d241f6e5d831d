//! Splits trailing editorial annotations from a dispositive's body text.
//!
//! Legislative sources append parenthesized clauses such as
//! `(Redação dada pela Lei nº 13.964, de 2019)` or `(Revogado pela Lei
//! nº 11.106, de 2005)` to the end of a body. The splitter strips the
//! trailing run of such clauses and keeps them as annotations; the
//! emitter later uses them to infer revoked/vetoed status when nothing
//! but punctuation remains.

use regex::Regex;
use std::sync::LazyLock;

static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:inclu[ií]d[oa]?|revogad[oa]?|acrescid[oa]?|alterad[oa]?|vetad[oa]?|suprimi\w*|renumerad[oa]?|reda[cç][aã]o\s+dada|vide|vig[eê]ncia)\b",
    )
    .unwrap()
});

static ONLY_PUNCTUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s.,;:\-]*$").unwrap());

/// Result of stripping trailing annotations from a body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitText {
    pub clean: String,
    pub original: String,
    pub annotations: Vec<String>,
}

impl SplitText {
    pub fn has_annotations(&self) -> bool {
        !self.annotations.is_empty()
    }
}

/// Strip the trailing run of parenthesized legislative-action clauses.
///
/// The run is consumed backward: each trailing `(...)` group whose
/// content carries a legislative-action marker is peeled off; the first
/// non-matching group ends the run. Clauses are returned in document
/// order.
pub fn split_annotations(text: &str) -> SplitText {
    let original = text.to_string();
    let mut end = text.trim_end().len();
    let mut annotations: Vec<String> = Vec::new();

    loop {
        let head = &text[..end];
        let trimmed = head.trim_end();
        if !trimmed.ends_with(')') {
            break;
        }
        let Some(open) = matching_open_paren(trimmed) else {
            break;
        };
        let clause = &trimmed[open..];
        let content = &clause[1..clause.len() - 1];
        if !MARKER_RE.is_match(content) {
            break;
        }
        annotations.push(clause.trim().to_string());
        end = open;
    }

    if annotations.is_empty() {
        return SplitText {
            clean: text.to_string(),
            original,
            annotations,
        };
    }

    annotations.reverse();
    SplitText {
        clean: text[..end].trim_end().to_string(),
        original,
        annotations,
    }
}

/// Index of the `(` that balances the final `)` of `text`, which must
/// end with `)`.
fn matching_open_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, ch) in text.char_indices().rev() {
        match ch {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationStatus {
    Revoked,
    Vetoed,
}

/// Decide whether a dispositive whose clean body is empty (modulo
/// punctuation) is revoked or vetoed, from its annotation run.
///
/// A veto that was later overridden (`vetado` together with `mantido`)
/// keeps the dispositive valid.
pub fn revocation_status(clean_text: &str, annotations: &[String]) -> Option<RevocationStatus> {
    if !ONLY_PUNCTUATION_RE.is_match(clean_text.trim()) {
        return None;
    }
    if annotations.is_empty() {
        return None;
    }

    let joined = annotations.join(" ").to_lowercase();
    let revoked = joined.contains("revogad");
    let vetoed = joined.contains("vetad");
    let kept = joined.contains("mantid");

    if revoked {
        Some(RevocationStatus::Revoked)
    } else if vetoed && !kept {
        Some(RevocationStatus::Vetoed)
    } else {
        None
    }
}
