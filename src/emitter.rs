//! Turns the parsed element tree into the output article list: label
//! typography, slug assignment, plate blocks, annotation handling,
//! revoked-version merging and stable ordering.
//!
//! Nothing in this stage aborts the import; problems are counted or
//! pushed as warnings and the emitter writes what it has.

use crate::annotations::{revocation_status, split_annotations, RevocationStatus};
use crate::element::{ElementKind, LawElement, LEVEL_HIERARCHY};
use crate::sources::common::roman_to_arabic;
use crate::types::{Article, PlateBlock, TextRun};
use crate::urn::{urn_fragment, urn_to_slug};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static NUMBER_PARTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)*)(-[A-Za-z])?$").unwrap());
static PENA_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^Pena\s*[-–—]?\s*").unwrap());

#[derive(Debug, Default)]
pub struct EmitResult {
    pub articles: Vec<Article>,
    pub urn_slug_mismatches: usize,
    pub warnings: Vec<String>,
}

pub fn emit_articles(elements: &[LawElement]) -> EmitResult {
    let mut result = EmitResult::default();

    for element in elements {
        if element.kind == ElementKind::Artigo {
            result.articles.push(emit_article(element));
        }
    }

    merge_revoked_versions(&mut result);
    sort_articles(&mut result.articles);
    result.urn_slug_mismatches = count_urn_mismatches(&result.articles);
    result
}

/// Legislative typography for article labels: ordinal up to 9
/// (`Art. 9º`), cardinal from 10 (`Art. 10`), suffix after the glyph
/// (`Art. 121-A`).
pub fn format_article_label(number: &str) -> String {
    match NUMBER_PARTS_RE.captures(number) {
        Some(caps) => {
            let display = &caps[1];
            let suffix = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let value: i64 = display.replace('.', "").parse().unwrap_or(0);
            if value <= 9 {
                format!("Art. {display}º{suffix}")
            } else {
                format!("Art. {display}{suffix}")
            }
        }
        None => format!("Art. {number}"),
    }
}

pub fn format_paragraph_label(number: &str) -> String {
    if number == "unico" {
        return "Parágrafo único".to_string();
    }
    match NUMBER_PARTS_RE.captures(number) {
        Some(caps) => {
            let display = &caps[1];
            let suffix = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let value: i64 = display.replace('.', "").parse().unwrap_or(0);
            if value <= 9 {
                format!("§ {display}º{suffix}")
            } else {
                format!("§ {display}{suffix}")
            }
        }
        None => format!("§ {number}"),
    }
}

fn emit_article(article: &LawElement) -> Article {
    let mut slug_base = format!("artigo-{}", article.number);
    if article.textually_revoked {
        slug_base.push_str("-revogado");
    }

    let mut plate: Vec<PlateBlock> = Vec::new();
    let mut textos: Vec<String> = Vec::new();

    // Epigraph renders as a bold lead-in block but never joins
    // texto_plano.
    let mut clean_epigraph = String::new();
    if !article.epigraph.is_empty() {
        let split = split_annotations(&article.epigraph);
        clean_epigraph = split.clean.clone();
        let mut block = PlateBlock::new(
            format!("{slug_base}_epigrafe"),
            vec![TextRun::bold(split.clean.clone())],
            split.clean.clone(),
        );
        if split.has_annotations() {
            block.texto_original = Some(split.original.clone());
            block.anotacoes = Some(split.annotations.clone());
        }
        plate.push(block);
    }

    let label = format_article_label(&article.number);
    emit_caput(article, &label, &mut plate, &mut textos);

    emit_children(
        &article.children,
        &mut plate,
        &mut textos,
        &slug_base,
        &article.urn,
        0,
        None,
    );

    let texto_plano = textos.join("\n");
    let content_hash = format!("{:x}", Sha256::digest(texto_plano.as_bytes()));

    let mut path: BTreeMap<String, String> = BTreeMap::new();
    let mut context_parts: Vec<String> = Vec::new();
    for level in LEVEL_HIERARCHY {
        if let Some(heading) = article.path.get(level) {
            if !heading.is_empty() {
                path.insert(level.as_str().to_string(), heading.clone());
                context_parts.push(heading.clone());
            }
        }
    }

    Article {
        id: slug_base.clone(),
        number: article.number.clone(),
        slug: slug_base,
        epigraph: clean_epigraph,
        plate_content: plate,
        search_text: texto_plano.clone(),
        texto_plano,
        in_force: article.in_force,
        context: context_parts.join(" > "),
        path,
        content_hash,
        urn: article.urn.clone(),
        revoked_versions: Vec::new(),
    }
}

fn emit_caput(
    article: &LawElement,
    label: &str,
    plate: &mut Vec<PlateBlock>,
    textos: &mut Vec<String>,
) {
    let split = split_annotations(&article.text);
    let status = revocation_status(&split.clean, &split.annotations);

    if article.text.trim().is_empty() && status.is_none() {
        return;
    }

    let urn = if article.urn.is_empty() {
        None
    } else {
        Some(format!("{}_cpt", article.urn))
    };

    let block = body_block(
        "caput".to_string(),
        urn,
        label,
        &split.clean,
        &split.original,
        &split.annotations,
        status,
        article.textually_revoked,
        None,
        textos,
    );
    plate.push(block);
}

#[allow(clippy::too_many_arguments)]
fn emit_children(
    children: &[LawElement],
    plate: &mut Vec<PlateBlock>,
    textos: &mut Vec<String>,
    parent_slug: &str,
    parent_urn: &str,
    indent: u32,
    paragraph_ctx: Option<&str>,
) {
    for (idx, child) in children.iter().enumerate() {
        match child.kind {
            ElementKind::Paragrafo => {
                let mut slug = format!("{parent_slug}.paragrafo-{}", child.number);
                if child.textually_revoked {
                    slug.push_str("-revogado");
                }
                let label = format_paragraph_label(&child.number);
                let urn =
                    child_urn(child, parent_urn, &format!("par{}", child.number.to_lowercase()));
                emit_body_child(child, &slug, urn.clone(), &label, indent, plate, textos);
                emit_children(
                    &child.children,
                    plate,
                    textos,
                    &slug,
                    urn.as_deref().unwrap_or(""),
                    indent + 1,
                    Some(slug.as_str()),
                );
            }
            ElementKind::Inciso => {
                let arabic = roman_to_arabic(&child.number);
                let base = paragraph_ctx.unwrap_or(parent_slug);
                let mut slug = format!("{base}.inciso-{arabic}");
                if child.textually_revoked {
                    slug.push_str("-revogado");
                }
                let label = format!("{} -", child.number);
                let urn = child_urn(child, parent_urn, &format!("inc{arabic}"));
                emit_body_child(child, &slug, urn.clone(), &label, indent, plate, textos);
                emit_children(
                    &child.children,
                    plate,
                    textos,
                    &slug,
                    urn.as_deref().unwrap_or(""),
                    indent + 1,
                    paragraph_ctx,
                );
            }
            ElementKind::Alinea => {
                let mut slug = format!("{parent_slug}.alinea-{}", child.number);
                if child.textually_revoked {
                    slug.push_str("-revogado");
                }
                let label = format!("{})", child.number);
                let urn = child_urn(child, parent_urn, &format!("ali{}", child.number));
                emit_body_child(child, &slug, urn.clone(), &label, indent, plate, textos);
                emit_children(
                    &child.children,
                    plate,
                    textos,
                    &slug,
                    urn.as_deref().unwrap_or(""),
                    indent + 1,
                    paragraph_ctx,
                );
            }
            ElementKind::Item => {
                let mut slug = format!("{parent_slug}.item-{}", child.number);
                if child.textually_revoked {
                    slug.push_str("-revogado");
                }
                let label = format!("{}.", child.number);
                let urn = child_urn(child, parent_urn, &format!("ite{}", child.number));
                emit_body_child(child, &slug, urn, &label, indent, plate, textos);
            }
            ElementKind::Pena => {
                let base = paragraph_ctx.unwrap_or(parent_slug);
                let slug = format!("{base}.penalty");
                emit_pena(child, &slug, indent, plate, textos);
            }
            ElementKind::Rubrica => {
                emit_rubric(child, children.get(idx + 1), parent_slug, indent, plate);
            }
            ElementKind::Artigo | ElementKind::Caput => {}
        }
    }
}

fn child_urn(child: &LawElement, parent_urn: &str, segment: &str) -> Option<String> {
    if !child.urn.is_empty() {
        return Some(child.urn.clone());
    }
    if parent_urn.is_empty() {
        return None;
    }
    Some(format!("{parent_urn}_{segment}"))
}

fn emit_body_child(
    child: &LawElement,
    slug: &str,
    urn: Option<String>,
    label: &str,
    indent: u32,
    plate: &mut Vec<PlateBlock>,
    textos: &mut Vec<String>,
) {
    let split = split_annotations(&child.text);
    let mut status = revocation_status(&split.clean, &split.annotations);
    if status.is_none() && child.textually_revoked && split.clean.trim().is_empty() {
        status = Some(RevocationStatus::Revoked);
    }

    let block = body_block(
        slug.to_string(),
        urn,
        label,
        &split.clean,
        &split.original,
        &split.annotations,
        status,
        child.textually_revoked,
        Some(indent + 1),
        textos,
    );
    plate.push(block);
}

/// Build the plate block for one labeled body, applying the
/// empty-body substitution for revoked and vetoed dispositives.
#[allow(clippy::too_many_arguments)]
fn body_block(
    slug: String,
    urn: Option<String>,
    label: &str,
    clean: &str,
    original: &str,
    annotations: &[String],
    status: Option<RevocationStatus>,
    struck: bool,
    indent: Option<u32>,
    textos: &mut Vec<String>,
) -> PlateBlock {
    let has_annotations = !annotations.is_empty();

    let (children, display_text, revogado, vetado) = match status {
        Some(RevocationStatus::Revoked) => {
            let body = "Dispositivo revogado.";
            (
                vec![
                    TextRun::struck(format!("{label} "), true),
                    TextRun::struck(body, false),
                ],
                body.to_string(),
                Some(true),
                None,
            )
        }
        Some(RevocationStatus::Vetoed) => {
            let body = "Dispositivo vetado.";
            (
                vec![
                    TextRun::struck(format!("{label} "), true),
                    TextRun::struck(body, false),
                ],
                body.to_string(),
                None,
                Some(true),
            )
        }
        // Strike-through sources keep their text; only the styling and
        // the revoked flag carry over.
        None if struck => (
            vec![
                TextRun::struck(format!("{label} "), true),
                TextRun::struck(clean, false),
            ],
            clean.to_string(),
            Some(true),
            None,
        ),
        None => (
            vec![TextRun::bold(format!("{label} ")), TextRun::plain(clean)],
            clean.to_string(),
            None,
            None,
        ),
    };

    let search_text = format!("{label} {display_text}").trim().to_string();
    textos.push(search_text.clone());

    let mut block = PlateBlock::new(slug, children, search_text);
    block.urn = urn;
    block.indent = indent;
    block.revogado = revogado;
    block.vetado = vetado;
    if has_annotations {
        block.texto_original = Some(format!("{label} {original}").trim().to_string());
        block.anotacoes = Some(annotations.to_vec());
    }
    block
}

fn emit_pena(
    child: &LawElement,
    slug: &str,
    indent: u32,
    plate: &mut Vec<PlateBlock>,
    textos: &mut Vec<String>,
) {
    let split = split_annotations(&child.text);
    let after_label = PENA_LABEL_RE.replace(&split.clean, "").into_owned();

    textos.push(split.clean.clone());

    let children = if child.textually_revoked {
        vec![
            TextRun::struck("Pena ", true),
            TextRun::struck(after_label, false),
        ]
    } else {
        vec![TextRun::bold("Pena "), TextRun::plain(after_label)]
    };

    let mut block = PlateBlock::new(slug, children, split.clean.clone());
    block.indent = Some(indent + 1);
    if child.textually_revoked {
        block.revogado = Some(true);
    }
    if split.has_annotations() {
        block.texto_original = Some(split.original.clone());
        block.anotacoes = Some(split.annotations.clone());
    }
    plate.push(block);
}

/// A rubric binds to the next paragraph or inciso, borrowing its number
/// for the slug.
fn emit_rubric(
    rubric: &LawElement,
    next: Option<&LawElement>,
    parent_slug: &str,
    indent: u32,
    plate: &mut Vec<PlateBlock>,
) {
    let slug = match next {
        Some(sibling) if sibling.kind == ElementKind::Paragrafo => {
            format!("{parent_slug}.paragrafo-{}-epigraph", sibling.number)
        }
        Some(sibling) if sibling.kind == ElementKind::Inciso => {
            format!(
                "{parent_slug}.inciso-{}-epigraph",
                roman_to_arabic(&sibling.number)
            )
        }
        _ if !rubric.number.is_empty() => {
            if rubric.number.chars().all(|c| c.is_ascii_digit()) || rubric.number == "unico" {
                format!("{parent_slug}.paragrafo-{}-epigraph", rubric.number)
            } else {
                format!(
                    "{parent_slug}.inciso-{}-epigraph",
                    roman_to_arabic(&rubric.number)
                )
            }
        }
        _ => format!("{parent_slug}.rubrica"),
    };

    let split = split_annotations(&rubric.text);
    let mut run = TextRun::bold(split.clean.clone());
    run.italic = Some(true);

    let mut block = PlateBlock::new(slug, vec![run], split.clean.clone());
    block.indent = Some(indent);
    if split.has_annotations() {
        block.texto_original = Some(split.original.clone());
        block.anotacoes = Some(split.annotations.clone());
    }
    plate.push(block);
}

/// Sort key: numeric prefix then lexicographic suffix; malformed
/// numbers sink to the front preserving their source text.
pub fn article_sort_key(number: &str) -> (i64, String) {
    let cleaned = number.replace('.', "");
    let digits: String = cleaned.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return (0, number.to_string());
    }
    let prefix: i64 = digits.parse().unwrap_or(0);
    let suffix = cleaned[digits.len()..].to_uppercase();
    (prefix, suffix)
}

fn sort_articles(articles: &mut [Article]) {
    articles.sort_by(|a, b| article_sort_key(&a.number).cmp(&article_sort_key(&b.number)));
}

/// Two articles may share a number only when exactly one is in force;
/// the in-force one absorbs the others into `revoked_versions`.
fn merge_revoked_versions(result: &mut EmitResult) {
    let mut by_number: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (idx, article) in result.articles.iter().enumerate() {
        by_number.entry(article.number.clone()).or_default().push(idx);
    }

    let mut absorbed: Vec<usize> = Vec::new();
    for (number, indices) in &by_number {
        if indices.len() < 2 {
            continue;
        }
        let in_force: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| result.articles[i].in_force)
            .collect();
        if in_force.len() != 1 {
            if in_force.len() > 1 {
                result
                    .warnings
                    .push(format!("article {number} has {} in-force variants", in_force.len()));
            }
            continue;
        }

        let keeper = in_force[0];
        for &idx in indices {
            if idx == keeper {
                continue;
            }
            let revoked = result.articles[idx].clone();
            if result.articles[keeper].epigraph.is_empty() && !revoked.epigraph.is_empty() {
                result.articles[keeper].epigraph = revoked.epigraph.clone();
                let slug = format!("{}_epigrafe", result.articles[keeper].slug);
                let block = PlateBlock::new(
                    slug,
                    vec![TextRun::bold(revoked.epigraph.clone())],
                    revoked.epigraph.clone(),
                );
                result.articles[keeper].plate_content.insert(0, block);
            }
            result.articles[keeper].revoked_versions.push(revoked);
            absorbed.push(idx);
        }
    }

    absorbed.sort_unstable();
    for idx in absorbed.into_iter().rev() {
        result.articles.remove(idx);
    }
}

/// Every plate block carrying both a URN and a slug must round-trip
/// through the converter; mismatches are counted, never fatal.
fn count_urn_mismatches(articles: &[Article]) -> usize {
    let mut mismatches = 0;
    for article in articles {
        let plain_slug = article.slug.trim_end_matches("-revogado");
        for block in &article.plate_content {
            let Some(urn) = &block.urn else {
                continue;
            };
            let Some(fragment) = urn_fragment(urn) else {
                continue;
            };
            let actual = if block.slug == "caput" {
                format!("{plain_slug}.caput")
            } else {
                block.slug.replace("-revogado", "")
            };
            // Synthetic URNs cannot express "parágrafo único".
            if actual.contains("paragrafo-unico") {
                continue;
            }
            let expected = urn_to_slug(fragment);
            if expected.slug != actual {
                mismatches += 1;
            }
        }
    }
    mismatches
}
