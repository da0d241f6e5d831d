mod common;

use common::load_fixture;
use normas_importer::element::ElementKind;
use normas_importer::runtime::client::Payload;
use normas_importer::sources::planalto::text::parse_text_html;
use normas_importer::sources::{parse_payload, ParsedLaw, ParserUsed};

fn parse_fixture() -> ParsedLaw {
    parse_text_html(&load_fixture("planalto_lei.html")).unwrap()
}

#[test]
fn finds_articles_in_document_order() {
    let parsed = parse_fixture();
    let numbers: Vec<_> = parsed.articles.iter().map(|a| a.number.as_str()).collect();
    assert_eq!(numbers, vec!["1", "5", "240", "241"]);
}

#[test]
fn centered_description_completes_the_header() {
    let parsed = parse_fixture();
    assert_eq!(
        parsed.structure.titulos,
        vec!["TÍTULO I - DA APLICAÇÃO DA LEI PENAL".to_string()]
    );
}

#[test]
fn trailing_indice_is_dropped() {
    // The fixture repeats "TÍTULO I" inside the trailing table of
    // contents; only the body occurrence may survive.
    let parsed = parse_fixture();
    assert_eq!(parsed.structure.titulos.len(), 1);
}

#[test]
fn glued_headings_are_segmented() {
    let parsed = parse_fixture();
    assert_eq!(parsed.structure.livros, vec!["LIVRO I".to_string()]);
    assert_eq!(parsed.structure.capitulos, vec!["CAPÍTULO I".to_string()]);
}

#[test]
fn lowercase_block_continues_the_caput() {
    let parsed = parse_fixture();
    let art1 = &parsed.articles[0];
    assert_eq!(
        art1.text,
        "Não há crime sem lei anterior que o defina, nem pena sem prévia cominação legal. \
         (Redação dada pela Lei nº 7.209, de 11.7.1984)"
    );
}

#[test]
fn centered_short_line_is_the_next_articles_epigraph() {
    let parsed = parse_fixture();
    assert_eq!(parsed.articles[0].epigraph, "Anterioridade da lei");
}

#[test]
fn paragrafo_unico_under_article_five() {
    let parsed = parse_fixture();
    let art5 = &parsed.articles[1];
    assert_eq!(art5.children.len(), 1);
    assert_eq!(art5.children[0].kind, ElementKind::Paragrafo);
    assert_eq!(art5.children[0].number, "unico");
}

#[test]
fn struck_article_is_textually_revoked() {
    let parsed = parse_fixture();
    let art240 = &parsed.articles[2];
    assert!(art240.textually_revoked);
    assert!(!art240.in_force);
    assert_eq!(art240.text, "Cometer adultério:");
}

#[test]
fn struck_penalty_joins_the_revoked_article() {
    let parsed = parse_fixture();
    let art240 = &parsed.articles[2];
    assert_eq!(art240.children.len(), 1);
    let pena = &art240.children[0];
    assert_eq!(pena.kind, ElementKind::Pena);
    assert!(pena.textually_revoked);
}

#[test]
fn article_after_the_revoked_one_is_in_force() {
    let parsed = parse_fixture();
    let art241 = &parsed.articles[3];
    assert!(art241.in_force);
    assert!(!art241.textually_revoked);
}

#[test]
fn unplaced_leading_lines_surface_as_warnings() {
    let parsed = parse_fixture();
    assert!(!parsed.warnings.is_empty());
    assert!(parsed
        .structure
        .textos_soltos
        .iter()
        .any(|t| t.contains("PRESIDENTE DA REPÚBLICA")));
}

#[test]
fn synthesizes_parte_geral_before_first_titulo() {
    let parsed = parse_text_html(&load_fixture("planalto_parte_geral.html")).unwrap();
    assert_eq!(parsed.structure.partes, vec!["Parte geral".to_string()]);
    assert_eq!(parsed.structure.titulos.len(), 1);
    assert_eq!(parsed.articles.len(), 1);
}

#[test]
fn planalto_html_selects_the_text_parser() {
    let payload = Payload::Html(load_fixture("planalto_lei.html"));
    let (_, used) = parse_payload(&payload).unwrap();
    assert_eq!(used, ParserUsed::Text);
}

#[test]
fn other_html_selects_the_tag_parser() {
    let payload = Payload::Html(load_fixture("normas_binario.html"));
    let (_, used) = parse_payload(&payload).unwrap();
    assert_eq!(used, ParserUsed::Tag);
}
