//! Classification and normalization shared by the HTML parsers.
//!
//! Hierarchy headings are signaled by capitalization (`CAPÍTULO II`),
//! content elements by their prefixes (`Art. 121`, `§ 2º`, `IV -`,
//! `a)`, `1.`, `Pena -`). The regexes tolerate missing accents and
//! `I-A` style numerals.

use crate::element::Level;
use regex::Regex;
use std::sync::LazyLock;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static PARTE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^PARTE\s+(GERAL|ESPECIAL|[IVXLC]+(?:-[A-Z])?)\b").unwrap());
static LIVRO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^LIVRO\s+([IVXLC]+(?:-[A-Z])?|[ÚU]NICO)\b").unwrap());
static TITULO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^T[ÍI]TULO\s+([IVXLC]+(?:-[A-Z])?|[ÚU]NICO)\b").unwrap());
static SUBTITULO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^SUBT[ÍI]TULO\s+([IVXLC]+(?:-[A-Z])?|[ÚU]NICO)\b").unwrap());
static CAPITULO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^CAP[ÍI]TULO\s+([IVXLC]+(?:-[A-Z])?|[ÚU]NICO)\b").unwrap());
static SECAO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^SE[ÇC][ÃA]O\s+([IVXLC]+(?:-[A-Z])?|[ÚU]NICA)\b").unwrap());
static SUBSECAO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^SUBSE[ÇC][ÃA]O\s+([IVXLC]+(?:-[A-Z])?|[ÚU]NICA)\b").unwrap());

static ARTIGO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Art\.?\s*(\d+(?:\.\d+)*[º°]?(?:-[A-Za-z])?)").unwrap());
static PARAGRAFO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^§\s*(\d+[º°]?(?:\s*-[A-Za-z])?)\.?\s*").unwrap());
static PARAGRAFO_UNICO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Par[áa]grafo\s+[úu]nico\.?\s*").unwrap());
static INCISO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([IVXLCivxlc]+)\s*[-–—]\s*").unwrap());
static ALINEA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([a-z])\s*\)\s*").unwrap());
static ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)\s*[-–—.]\s*").unwrap());
static PENA_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^Pena\s*[-–—]\s*").unwrap());

static GLUED_ORDINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(Art\.?\s*\d+(?:\.\d+)*)o").unwrap());
static NUMBER_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)*)\s*-\s*([A-Za-z])$").unwrap());

/// Known mojibake produced when the source HTML was saved with a broken
/// charset round-trip. Applied after the double-encoding repair.
const MOJIBAKE_FIXES: &[(&str, &str)] = &[
    ("CAP\u{FFFD}TULO", "CAPÍTULO"),
    ("T\u{FFFD}TULO", "TÍTULO"),
    ("SE\u{FFFD}\u{FFFD}O", "SEÇÃO"),
    ("SUBSE\u{FFFD}\u{FFFD}O", "SUBSEÇÃO"),
    ("Par\u{FFFD}grafo", "Parágrafo"),
    ("\u{FFFD}nico", "único"),
    ("Â§", "§"),
    ("Âº", "º"),
    ("Â°", "°"),
];

const ROMAN_TABLE: &[(&str, &str)] = &[
    ("I", "1"),
    ("II", "2"),
    ("III", "3"),
    ("IV", "4"),
    ("V", "5"),
    ("VI", "6"),
    ("VII", "7"),
    ("VIII", "8"),
    ("IX", "9"),
    ("X", "10"),
    ("XI", "11"),
    ("XII", "12"),
    ("XIII", "13"),
    ("XIV", "14"),
    ("XV", "15"),
    ("XVI", "16"),
    ("XVII", "17"),
    ("XVIII", "18"),
    ("XIX", "19"),
    ("XX", "20"),
];

/// Classification of a single logical block of source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    Empty,
    Structural { level: Level, heading: String },
    Artigo { number: String, text: String },
    Paragrafo { number: String, text: String },
    Inciso { number: String, text: String },
    Alinea { number: String, text: String },
    Item { number: String, text: String },
    Pena { text: String },
    /// Starts with a lowercase letter: continuation of the last body.
    Continuation { text: String },
    /// Unclaimed text, capitalized or otherwise unclassifiable.
    Orphan { text: String },
}

/// Classify one block by its textual prefix. Bold-span epigraph
/// detection lives in the tag parser; centering heuristics live in the
/// text parser.
pub fn classify_line(raw: &str) -> Classified {
    let text = collapse_ws(raw);
    if text.is_empty() {
        return Classified::Empty;
    }

    if let Some((level, heading)) = match_structural(&text) {
        return Classified::Structural { level, heading };
    }

    if let Some(caps) = ARTIGO_RE.captures(&text) {
        let number = normalize_article_number(&caps[1]);
        let body = strip_label_separator(&text[caps.get(0).unwrap().end()..]);
        return Classified::Artigo { number, text: body };
    }
    // Tolerates glyph damage the regex missed ("Art. 1oTexto").
    if let Some((number, body)) = scan_article(&text) {
        return Classified::Artigo { number, text: body };
    }

    if let Some(caps) = PARAGRAFO_RE.captures(&text) {
        let number = normalize_paragraph_number(&caps[1]);
        let body = text[caps.get(0).unwrap().end()..].trim().to_string();
        return Classified::Paragrafo { number, text: body };
    }
    if let Some(m) = PARAGRAFO_UNICO_RE.find(&text) {
        let body = text[m.end()..].trim().to_string();
        return Classified::Paragrafo {
            number: "unico".to_string(),
            text: body,
        };
    }

    if let Some(caps) = INCISO_RE.captures(&text) {
        let number = caps[1].to_uppercase();
        let body = text[caps.get(0).unwrap().end()..].trim().to_string();
        return Classified::Inciso { number, text: body };
    }

    if let Some(caps) = ALINEA_RE.captures(&text) {
        let number = caps[1].to_lowercase();
        let body = text[caps.get(0).unwrap().end()..].trim().to_string();
        return Classified::Alinea { number, text: body };
    }

    if PENA_RE.is_match(&text) {
        return Classified::Pena { text };
    }

    if let Some(caps) = ITEM_RE.captures(&text) {
        let number = caps[1].to_string();
        let body = text[caps.get(0).unwrap().end()..].trim().to_string();
        return Classified::Item { number, text: body };
    }

    let first = text.chars().next().unwrap_or(' ');
    if first.is_lowercase() || first.is_ascii_punctuation() {
        Classified::Continuation { text }
    } else {
        Classified::Orphan { text }
    }
}

pub fn match_structural(text: &str) -> Option<(Level, String)> {
    structural_match(text).map(|(level, _)| (level, text.to_string()))
}

/// Match a structural heading at the start of the line, reporting where
/// the designator ends so callers can tell whether a description
/// follows inline or must be awaited on the next block.
pub fn structural_match(text: &str) -> Option<(Level, usize)> {
    let checks: &[(&LazyLock<Regex>, Level)] = &[
        (&PARTE_RE, Level::Parte),
        (&LIVRO_RE, Level::Livro),
        (&SUBTITULO_RE, Level::Subtitulo),
        (&TITULO_RE, Level::Titulo),
        (&CAPITULO_RE, Level::Capitulo),
        (&SUBSECAO_RE, Level::Subsecao),
        (&SECAO_RE, Level::Secao),
    ];
    for (re, level) in checks {
        if let Some(m) = re.find(text) {
            return Some((*level, m.end()));
        }
    }
    None
}

/// Find every structural heading start inside a block. Used by the text
/// parser to segment lines that glue several headings together.
pub fn structural_heading_starts(text: &str) -> Vec<usize> {
    static COMBINED_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"(?:PARTE\s+(?:GERAL|ESPECIAL|[IVXLC]+)|LIVRO\s+[IVXLCÚU]|SUBT[ÍI]TULO\s+[IVXLCÚU]|T[ÍI]TULO\s+[IVXLCÚU]|CAP[ÍI]TULO\s+[IVXLCÚU]|SUBSE[ÇC][ÃA]O\s+[IVXLCÚU]|SE[ÇC][ÃA]O\s+[IVXLCÚU])",
        )
        .unwrap()
    });
    COMBINED_RE.find_iter(text).map(|m| m.start()).collect()
}

/// Character scanner for article headers the regex rejects, typically a
/// latin `o` glued to the number standing in for the ordinal glyph.
fn scan_article(text: &str) -> Option<(String, String)> {
    let rest = text
        .strip_prefix("Art.")
        .or_else(|| text.strip_prefix("Art"))
        .or_else(|| text.strip_prefix("ART."))
        .or_else(|| text.strip_prefix("ART"))?;
    let rest = rest.trim_start();

    let mut number = String::new();
    let mut chars = rest.char_indices().peekable();
    while let Some(&(_, c)) = chars.peek() {
        if c.is_ascii_digit() || c == '.' {
            number.push(c);
            chars.next();
        } else {
            break;
        }
    }
    let number = number.trim_end_matches('.').to_string();
    if number.is_empty() {
        return None;
    }

    // Ordinal glyph or its latin stand-in.
    if let Some(&(_, c)) = chars.peek() {
        if matches!(c, 'º' | '°' | 'o' | 'O') {
            chars.next();
        }
    }

    let mut suffix = String::new();
    if let Some(&(idx, '-')) = chars.peek() {
        let mut tail = rest[idx..].chars();
        tail.next();
        if let Some(letter) = tail.next() {
            if letter.is_ascii_alphabetic() {
                suffix = format!("-{}", letter.to_ascii_uppercase());
                chars.next();
                chars.next();
            }
        }
    }

    let body_start = chars.peek().map(|&(idx, _)| idx).unwrap_or(rest.len());
    let body = strip_label_separator(&rest[body_start..]);
    Some((format!("{number}{suffix}"), body))
}

// "Art. 240 - Adultério" and "Art. 121. Matar alguém" both leave a
// dangling separator between the number and the body.
fn strip_label_separator(body: &str) -> String {
    body.trim()
        .trim_start_matches(['.', '-', '–', '—', ' '])
        .trim()
        .to_string()
}

/// Canonical article number: ordinal glyphs removed, thousands dots
/// kept, letter suffix uppercased after a hyphen.
pub fn normalize_article_number(raw: &str) -> String {
    let cleaned = raw.replace(['º', '°'], "");
    let cleaned = WHITESPACE_RE.replace_all(cleaned.trim(), "").to_string();
    if let Some(caps) = NUMBER_SUFFIX_RE.captures(&cleaned) {
        return format!("{}-{}", &caps[1], caps[2].to_uppercase());
    }
    cleaned
}

/// Canonical paragraph number: same rules as articles, `unico` for the
/// sole paragraph.
pub fn normalize_paragraph_number(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    if lowered == "único" || lowered == "unico" {
        return "unico".to_string();
    }
    normalize_article_number(raw)
}

pub fn roman_to_arabic(roman: &str) -> String {
    let upper = roman.to_uppercase();
    ROMAN_TABLE
        .iter()
        .find(|&&(r, _)| r == upper)
        .map(|&(_, a)| a.to_string())
        .unwrap_or_else(|| roman.to_lowercase())
}

pub fn collapse_ws(value: &str) -> String {
    WHITESPACE_RE
        .replace_all(value.trim(), " ")
        .trim()
        .to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vigency {
    pub in_force: bool,
    pub textually_revoked: bool,
}

/// Assess vigency from the body text alone: an element whose trailing
/// annotations mark it revoked loses force; it is *textually* revoked
/// only when nothing but punctuation remains once the annotations are
/// stripped.
pub fn assess_vigency(text: &str) -> Vigency {
    use crate::annotations::{revocation_status, split_annotations, RevocationStatus};

    let split = split_annotations(text);
    match revocation_status(&split.clean, &split.annotations) {
        Some(RevocationStatus::Revoked) => Vigency {
            in_force: false,
            textually_revoked: true,
        },
        Some(RevocationStatus::Vetoed) => Vigency {
            in_force: false,
            textually_revoked: false,
        },
        None => Vigency {
            in_force: !split
                .annotations
                .join(" ")
                .to_lowercase()
                .contains("revogad"),
            textually_revoked: false,
        },
    }
}

/// Repair the double-encoded UTF-8 the normas binary endpoint sometimes
/// serves (each UTF-8 byte re-encoded as a latin-1 character, turning
/// `§` into `Â§`), then apply the known mojibake substitutions and
/// normalize glued ordinal glyphs after article numbers.
pub fn fix_encoding(html: &str) -> String {
    let repaired = if html.contains('Â') || html.contains('Ã') {
        repair_double_encoding(html).unwrap_or_else(|| html.to_string())
    } else {
        html.to_string()
    };

    let mut result = repaired;
    for &(from, to) in MOJIBAKE_FIXES {
        if result.contains(from) {
            result = result.replace(from, to);
        }
    }
    GLUED_ORDINAL_RE.replace_all(&result, "${1}º").into_owned()
}

fn repair_double_encoding(text: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let code = ch as u32;
        if code > 0xFF {
            return None;
        }
        bytes.push(code as u8);
    }
    String::from_utf8(bytes).ok()
}
