mod common;

use common::load_fixture;
use normas_importer::element::{ElementKind, Level};
use normas_importer::sources::normas::tag::parse_tag_html;
use normas_importer::sources::ParsedLaw;

fn parse_fixture() -> ParsedLaw {
    parse_tag_html(&load_fixture("normas_binario.html"))
}

#[test]
fn finds_articles_in_document_order() {
    let parsed = parse_fixture();
    let numbers: Vec<_> = parsed.articles.iter().map(|a| a.number.as_str()).collect();
    assert_eq!(numbers, vec!["1", "121", "121-A", "122"]);
}

#[test]
fn pending_header_absorbs_description_line() {
    let parsed = parse_fixture();
    assert_eq!(
        parsed.structure.titulos,
        vec![
            "TÍTULO I - DA APLICAÇÃO DA LEI PENAL".to_string(),
            "TÍTULO II - DOS CRIMES CONTRA A PESSOA".to_string(),
        ]
    );
    assert_eq!(
        parsed.structure.capitulos,
        vec!["CAPÍTULO I - DOS CRIMES CONTRA A VIDA".to_string()]
    );
}

#[test]
fn explicit_partes_suppress_synthesis() {
    let parsed = parse_fixture();
    assert_eq!(
        parsed.structure.partes,
        vec!["PARTE GERAL".to_string(), "PARTE ESPECIAL".to_string()]
    );
}

#[test]
fn bold_blocks_become_epigraphs() {
    let parsed = parse_fixture();
    assert_eq!(parsed.articles[0].epigraph, "Anterioridade da lei");
    assert_eq!(parsed.articles[1].epigraph, "Homicídio simples");
    // "Homicídio qualificado" was consumed as a rubric of § 2º and must
    // not leak onto article 121-A.
    assert_eq!(parsed.articles[2].epigraph, "");
}

#[test]
fn institutional_header_is_not_an_epigraph() {
    let parsed = parse_fixture();
    assert_ne!(parsed.articles[0].epigraph, "CÂMARA DOS DEPUTADOS");
}

#[test]
fn rubric_inside_article_precedes_next_paragraph() {
    let parsed = parse_fixture();
    let art121 = &parsed.articles[1];

    let kinds: Vec<_> = art121.children.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ElementKind::Pena,
            ElementKind::Rubrica,
            ElementKind::Paragrafo,
            ElementKind::Paragrafo,
        ]
    );
    assert_eq!(art121.children[1].text, "Homicídio qualificado");
    assert_eq!(art121.children[1].number, "2");
}

#[test]
fn incisos_attach_to_the_open_paragraph() {
    let parsed = parse_fixture();
    let par2 = &parsed.articles[1].children[2];
    assert_eq!(par2.number, "2");

    let incisos: Vec<_> = par2
        .children
        .iter()
        .filter(|c| c.kind == ElementKind::Inciso)
        .map(|c| c.number.as_str())
        .collect();
    assert_eq!(incisos, vec!["I", "III", "IV"]);

    // The closing penalty line belongs to the paragraph, after the
    // incisos.
    assert_eq!(par2.children.last().unwrap().kind, ElementKind::Pena);
}

#[test]
fn annotation_only_inciso_is_textually_revoked() {
    let parsed = parse_fixture();
    let par2 = &parsed.articles[1].children[2];
    let revoked = par2.children.iter().find(|c| c.number == "III").unwrap();
    assert!(revoked.textually_revoked);
    assert!(!revoked.in_force);
}

#[test]
fn vetoed_paragraph_loses_force_without_revocation() {
    let parsed = parse_fixture();
    let par3 = &parsed.articles[1].children[3];
    assert_eq!(par3.number, "3");
    assert!(!par3.in_force);
    assert!(!par3.textually_revoked);
}

#[test]
fn lowercase_block_continues_the_caput() {
    let parsed = parse_fixture();
    let art122 = &parsed.articles[3];
    assert_eq!(
        art122.text,
        "Induzir ou instigar alguém a suicidar-se ou a praticar automutilação."
    );
}

#[test]
fn alinea_under_caput_attaches_to_the_article() {
    let parsed = parse_fixture();
    let art121a = &parsed.articles[2];
    assert_eq!(art121a.children.len(), 1);
    assert_eq!(art121a.children[0].kind, ElementKind::Alinea);
    assert_eq!(art121a.children[0].number, "a");
}

#[test]
fn articles_snapshot_the_hierarchy_path() {
    let parsed = parse_fixture();
    let art1 = &parsed.articles[0];
    assert_eq!(art1.path.get(&Level::Parte).unwrap(), "PARTE GERAL");
    assert_eq!(
        art1.path.get(&Level::Titulo).unwrap(),
        "TÍTULO I - DA APLICAÇÃO DA LEI PENAL"
    );

    let art121 = &parsed.articles[1];
    assert_eq!(art121.path.get(&Level::Parte).unwrap(), "PARTE ESPECIAL");
    assert_eq!(
        art121.path.get(&Level::Capitulo).unwrap(),
        "CAPÍTULO I - DOS CRIMES CONTRA A VIDA"
    );
}

#[test]
fn caput_keeps_inline_annotations_for_the_emitter() {
    let parsed = parse_fixture();
    assert!(parsed.articles[0]
        .text
        .contains("(Redação dada pela Lei nº 7.209, de 11.7.1984)"));
}
