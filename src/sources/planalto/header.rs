//! Infers norm type, number and date from the header line of a law
//! ("LEI Nº 8.078, DE 11 DE SETEMBRO DE 1990"), enough to reconstruct
//! the LexML URN and label a local HTML import whose URN is not in the
//! alias table.

use regex::Regex;
use std::sync::LazyLock;

static HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)\b(LEI\s+COMPLEMENTAR|LEI\s+DELEGADA|DECRETO-LEI|DECRETO\s+LEGISLATIVO|MEDIDA\s+PROVIS\wRIA|EMENDA\s+CONSTITUCIONAL|CONSTITUI\w+|DECRETO|LEI)\s+N[^\dA-Za-z]*\s*([\d.\-A-Z]+)\s*,\s*DE\s+(.+?\d{4})",
    )
    .unwrap()
});

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})\s+DE\s+([A-ZÇÃÉ]+)\s+DE\s+(\d{4})").unwrap());

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<[^>]+>").unwrap());

const MONTHS: &[(&str, u32)] = &[
    ("JANEIRO", 1),
    ("FEVEREIRO", 2),
    ("MARCO", 3),
    ("ABRIL", 4),
    ("MAIO", 5),
    ("JUNHO", 6),
    ("JULHO", 7),
    ("AGOSTO", 8),
    ("SETEMBRO", 9),
    ("OUTUBRO", 10),
    ("NOVEMBRO", 11),
    ("DEZEMBRO", 12),
];

const TYPES: &[(&str, &str)] = &[
    ("LEI COMPLEMENTAR", "lei.complementar"),
    ("LEI DELEGADA", "lei.delegada"),
    ("DECRETO-LEI", "decreto.lei"),
    ("DECRETO LEGISLATIVO", "decreto.legislativo"),
    ("MEDIDA PROVISORIA", "medida.provisoria"),
    ("EMENDA CONSTITUCIONAL", "emenda.constitucional"),
    ("CONSTITUICAO", "constituicao"),
    ("DECRETO", "decreto"),
    ("LEI", "lei"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormHeader {
    pub type_display: String,
    pub type_slug: String,
    pub number: String,
    pub date_iso: String,
    pub urn: String,
}

/// Infer the norm identity from raw HTML. Returns `None` when no
/// recognizable header line exists.
pub fn infer_header(html: &str) -> Option<NormHeader> {
    let text = TAG_RE.replace_all(html, " ");
    let caps = HEADER_RE.captures(&text)?;

    let type_raw = caps[1].trim().to_string();
    let type_norm = strip_accents(&type_raw)
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let type_slug = TYPES
        .iter()
        .find(|&&(t, _)| type_norm.starts_with(t))
        .map(|&(_, slug)| slug.to_string())?;

    let number = caps[2].replace(['.', ','], "").trim().to_string();
    let date_iso = parse_date(&caps[3])?;

    let urn = format!("urn:lex:br:federal:{type_slug}:{date_iso};{number}");
    Some(NormHeader {
        type_display: type_raw,
        type_slug,
        number,
        date_iso,
        urn,
    })
}

fn parse_date(raw: &str) -> Option<String> {
    let normalized = strip_accents(raw).to_uppercase();
    let caps = DATE_RE.captures(&normalized)?;
    let day: u32 = caps[1].parse().ok()?;
    let year = &caps[3];
    let month = MONTHS
        .iter()
        .find(|&&(name, _)| name == &caps[2])
        .map(|&(_, m)| m)?;
    Some(format!("{year}-{month:02}-{day:02}"))
}

fn strip_accents(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'Á' | 'À' | 'Â' | 'Ã' => 'A',
            'é' | 'ê' | 'É' | 'Ê' => 'E',
            'í' | 'Í' => 'I',
            'ó' | 'ô' | 'õ' | 'Ó' | 'Ô' | 'Õ' => 'O',
            'ú' | 'Ú' => 'U',
            'ç' | 'Ç' => 'C',
            other => other,
        })
        .collect::<String>()
        .to_uppercase()
}
