mod common;

use common::load_fixture;
use normas_importer::element::{ElementKind, LawElement};
use normas_importer::emitter::{
    article_sort_key, emit_articles, format_article_label, format_paragraph_label,
};
use normas_importer::sources::normas::tag::parse_tag_html;
use pretty_assertions::assert_eq;
use std::collections::HashSet;

fn article(number: &str, text: &str) -> LawElement {
    LawElement::new(ElementKind::Artigo, number, text)
}

// ============================================================
// Label typography
// ============================================================

#[test]
fn article_labels_follow_legislative_typography() {
    assert_eq!(format_article_label("1"), "Art. 1º");
    assert_eq!(format_article_label("9"), "Art. 9º");
    assert_eq!(format_article_label("10"), "Art. 10");
    assert_eq!(format_article_label("121-A"), "Art. 121-A");
    assert_eq!(format_article_label("1-A"), "Art. 1º-A");
    assert_eq!(format_article_label("1.029"), "Art. 1.029");
}

#[test]
fn paragraph_labels_follow_legislative_typography() {
    assert_eq!(format_paragraph_label("unico"), "Parágrafo único");
    assert_eq!(format_paragraph_label("2"), "§ 2º");
    assert_eq!(format_paragraph_label("10"), "§ 10");
    assert_eq!(format_paragraph_label("2-A"), "§ 2º-A");
}

// ============================================================
// Slugs and plate blocks
// ============================================================

#[test]
fn paragrafo_unico_slug_and_label() {
    let mut art = article("5", "Caput do artigo quinto.");
    art.children.push(LawElement::new(
        ElementKind::Paragrafo,
        "unico",
        "Texto do parágrafo único.",
    ));

    let emitted = emit_articles(&[art]);
    let out = &emitted.articles[0];
    let block = out
        .plate_content
        .iter()
        .find(|b| b.slug == "artigo-5.paragrafo-unico")
        .expect("paragraph block");
    assert_eq!(block.children[0].text, "Parágrafo único ");
    assert_eq!(block.children[0].bold, Some(true));
}

#[test]
fn roman_clause_slug_under_paragraph() {
    let mut par = LawElement::new(ElementKind::Paragrafo, "2", "Se o homicídio é cometido:");
    par.children.push(LawElement::new(
        ElementKind::Inciso,
        "IV",
        "à traição, de emboscada;",
    ));
    let mut art = article("121", "Matar alguém:");
    art.children.push(par);

    let emitted = emit_articles(&[art]);
    let out = &emitted.articles[0];
    let block = out
        .plate_content
        .iter()
        .find(|b| b.slug == "artigo-121.paragrafo-2.inciso-4")
        .expect("inciso block");
    assert!(block.search_text.starts_with("IV -"));
}

#[test]
fn caput_block_carries_the_article_urn() {
    let mut art = article("1", "Texto do caput.");
    art.urn = "urn:lex:br:federal:lei:2000-01-01;1!art1".to_string();

    let emitted = emit_articles(&[art]);
    let caput = emitted.articles[0]
        .plate_content
        .iter()
        .find(|b| b.slug == "caput")
        .expect("caput block");
    assert_eq!(
        caput.urn.as_deref(),
        Some("urn:lex:br:federal:lei:2000-01-01;1!art1_cpt")
    );
    assert_eq!(emitted.urn_slug_mismatches, 0);
}

#[test]
fn epigraph_block_is_bold_and_out_of_texto_plano() {
    let mut art = article("1", "Corpo do artigo.");
    art.epigraph = "Anterioridade da lei".to_string();

    let emitted = emit_articles(&[art]);
    let out = &emitted.articles[0];
    assert_eq!(out.epigraph, "Anterioridade da lei");

    let block = &out.plate_content[0];
    assert_eq!(block.slug, "artigo-1_epigrafe");
    assert_eq!(block.children[0].bold, Some(true));
    assert!(!out.texto_plano.contains("Anterioridade"));
}

// ============================================================
// Revocation and veto
// ============================================================

#[test]
fn empty_body_with_veto_annotation_renders_dispositivo_vetado() {
    let mut par = LawElement::new(ElementKind::Paragrafo, "2", "Texto:");
    par.children.push(LawElement::new(
        ElementKind::Inciso,
        "VII",
        ". (Vetado na Lei nº 13.964, de 2019)",
    ));
    let mut art = article("10", "Caput.");
    art.children.push(par);

    let emitted = emit_articles(&[art]);
    let block = emitted.articles[0]
        .plate_content
        .iter()
        .find(|b| b.slug.ends_with("inciso-7"))
        .expect("vetoed inciso block");

    assert_eq!(block.vetado, Some(true));
    assert_eq!(block.revogado, None);
    assert!(block.search_text.ends_with("Dispositivo vetado."));
    assert_eq!(block.children[1].strikethrough, Some(true));
    assert_eq!(block.children[1].color.as_deref(), Some("#9ca3af"));
}

#[test]
fn revoked_annotation_renders_dispositivo_revogado_with_shifted_slug() {
    let mut art = article("121", "Matar alguém:");
    let mut inciso = LawElement::new(
        ElementKind::Inciso,
        "III",
        "(Revogado pela Lei nº 11.106, de 2005)",
    );
    inciso.textually_revoked = true;
    inciso.in_force = false;
    art.children.push(inciso);

    let emitted = emit_articles(&[art]);
    let block = emitted.articles[0]
        .plate_content
        .iter()
        .find(|b| b.slug == "artigo-121.inciso-3-revogado")
        .expect("revoked inciso block");
    assert_eq!(block.revogado, Some(true));
    assert!(block.search_text.ends_with("Dispositivo revogado."));
}

#[test]
fn textually_revoked_article_gets_revogado_slug() {
    let mut art = article("240", "Cometer adultério:");
    art.textually_revoked = true;
    art.in_force = false;

    let emitted = emit_articles(&[art]);
    assert_eq!(emitted.articles[0].slug, "artigo-240-revogado");
    assert!(!emitted.articles[0].in_force);
}

#[test]
fn revoked_variant_merges_into_the_in_force_article() {
    let mut old = article("121", "Texto antigo do homicídio.");
    old.textually_revoked = true;
    old.in_force = false;
    old.epigraph = "Homicídio simples".to_string();

    let current = article("121", "Texto novo do homicídio.");

    let emitted = emit_articles(&[old, current]);
    assert_eq!(emitted.articles.len(), 1);

    let merged = &emitted.articles[0];
    assert!(merged.in_force);
    assert_eq!(merged.number, "121");
    assert_eq!(merged.revoked_versions.len(), 1);
    assert!(!merged.revoked_versions[0].in_force);
    assert_eq!(merged.revoked_versions[0].number, "121");
    // The in-force variant had no epigraph, so it inherits the revoked
    // one's.
    assert_eq!(merged.epigraph, "Homicídio simples");
}

// ============================================================
// Ordering, hashing, reconstruction
// ============================================================

#[test]
fn articles_sort_by_numeric_prefix_then_suffix() {
    let numbers = ["10", "2", "121-A", "1", "121"];
    let emitted = emit_articles(
        &numbers
            .iter()
            .map(|n| article(n, "Texto."))
            .collect::<Vec<_>>(),
    );
    let sorted: Vec<_> = emitted.articles.iter().map(|a| a.number.as_str()).collect();
    assert_eq!(sorted, vec!["1", "2", "10", "121", "121-A"]);
}

#[test]
fn malformed_numbers_fall_back_to_zero_key() {
    assert_eq!(article_sort_key("X9"), (0, "X9".to_string()));
    assert_eq!(article_sort_key("121-A"), (121, "-A".to_string()));
    assert_eq!(article_sort_key("1.029"), (1029, "".to_string()));
}

#[test]
fn content_hash_is_deterministic_but_block_ids_are_not() {
    let mut art = article("1", "Texto estável.");
    art.children.push(LawElement::new(
        ElementKind::Paragrafo,
        "1",
        "Parágrafo estável.",
    ));

    let first = emit_articles(std::slice::from_ref(&art));
    let second = emit_articles(std::slice::from_ref(&art));

    assert_eq!(
        first.articles[0].texto_plano,
        second.articles[0].texto_plano
    );
    assert_eq!(
        first.articles[0].content_hash,
        second.articles[0].content_hash
    );
    assert_ne!(
        first.articles[0].plate_content[0].id,
        second.articles[0].plate_content[0].id
    );
}

#[test]
fn texto_original_reconstructs_label_plus_annotated_body() {
    let mut art = article("7", "Caput.");
    art.children.push(LawElement::new(
        ElementKind::Paragrafo,
        "1",
        "Texto do dispositivo. (Incluído pela Lei nº 1, de 2000)",
    ));

    let emitted = emit_articles(&[art]);
    let block = emitted.articles[0]
        .plate_content
        .iter()
        .find(|b| b.slug.ends_with("paragrafo-1"))
        .unwrap();

    assert_eq!(
        block.texto_original.as_deref(),
        Some("§ 1º Texto do dispositivo. (Incluído pela Lei nº 1, de 2000)")
    );
    assert_eq!(
        block.anotacoes.as_deref(),
        Some(&["(Incluído pela Lei nº 1, de 2000)".to_string()][..])
    );
    assert_eq!(block.search_text, "§ 1º Texto do dispositivo.");
}

// ============================================================
// Whole-law properties over a parsed fixture
// ============================================================

#[test]
fn slugs_are_unique_within_the_law() {
    let parsed = parse_tag_html(&load_fixture("normas_binario.html"));
    let emitted = emit_articles(&parsed.articles);

    let mut seen = HashSet::new();
    for art in &emitted.articles {
        assert!(seen.insert(art.slug.clone()), "duplicate slug {}", art.slug);
    }
}

#[test]
fn texto_plano_carries_no_editorial_annotations() {
    let parsed = parse_tag_html(&load_fixture("normas_binario.html"));
    let emitted = emit_articles(&parsed.articles);

    for art in &emitted.articles {
        assert!(
            !art.texto_plano.contains("(Redação dada"),
            "annotation leaked into texto_plano of {}",
            art.slug
        );
        assert!(!art.texto_plano.contains("(Incluíd"));
        assert!(!art.texto_plano.contains("(Revogad"));
    }
}

#[test]
fn texto_plano_joins_bodies_with_single_newlines() {
    let parsed = parse_tag_html(&load_fixture("normas_binario.html"));
    let emitted = emit_articles(&parsed.articles);

    let art121 = emitted
        .articles
        .iter()
        .find(|a| a.number == "121")
        .unwrap();
    let lines: Vec<_> = art121.texto_plano.lines().collect();
    assert_eq!(lines[0], "Art. 121 Matar alguém:");
    assert!(lines.iter().all(|l| !l.is_empty()));
    assert!(lines.iter().any(|l| l.starts_with("Pena -")));
}
