mod common;

use common::load_fixture;
use normas_importer::import::{build_document, law_id_from_urn, write_document};
use normas_importer::runtime::client::{Acquisition, Payload};
use normas_importer::sources::ParserUsed;
use normas_importer::types::LawMetadata;
use std::collections::HashSet;

fn json_acquisition() -> Acquisition {
    let data: serde_json::Value =
        serde_json::from_str(&load_fixture("normas_estruturado.json")).unwrap();
    let metadata = normas_importer::runtime::client::extract_metadata(&data);
    Acquisition {
        payload: Payload::Json(data),
        metadata,
    }
}

fn html_acquisition(fixture: &str) -> Acquisition {
    Acquisition {
        payload: Payload::Html(load_fixture(fixture)),
        metadata: LawMetadata {
            title: "Lei de teste".to_string(),
            urn: "urn:lex:br:federal:lei:2000-01-01;9999".to_string(),
            ..Default::default()
        },
    }
}

#[test]
fn builds_a_document_from_structured_json() {
    let (document, report) = build_document(&json_acquisition()).unwrap();

    assert_eq!(report.parser, ParserUsed::Json);
    assert_eq!(document.lei.id, "decreto-lei-2848");
    assert_eq!(document.lei.numero, "2848");
    assert_eq!(document.lei.nome, "Código Penal");
    assert_eq!(document.artigos.len(), 2);
    assert_eq!(report.article_count, 2);
    assert_eq!(report.urn_slug_mismatches, 0);
    assert_eq!(document.lei.estrutura.partes, vec!["PARTE GERAL".to_string()]);
    assert_eq!(document.lei.hierarquia.len(), 1);
}

#[test]
fn builds_a_document_from_binary_html() {
    let (document, report) = build_document(&html_acquisition("normas_binario.html")).unwrap();

    assert_eq!(report.parser, ParserUsed::Tag);
    assert!(report.article_count >= 4);

    let slugs: HashSet<_> = document.artigos.iter().map(|a| a.slug.clone()).collect();
    assert_eq!(slugs.len(), document.artigos.len());
}

#[test]
fn articles_emerge_sorted() {
    let (document, _) = build_document(&html_acquisition("normas_binario.html")).unwrap();
    let mut sorted = document.artigos.clone();
    sorted.sort_by(|a, b| {
        normas_importer::emitter::article_sort_key(&a.number)
            .cmp(&normas_importer::emitter::article_sort_key(&b.number))
    });
    let got: Vec<_> = document.artigos.iter().map(|a| a.number.clone()).collect();
    let want: Vec<_> = sorted.iter().map(|a| a.number.clone()).collect();
    assert_eq!(got, want);
}

#[test]
fn empty_html_is_a_parse_failure() {
    let acq = html_acquisition("planalto_parte_geral.html");
    // Sanity: this one parses.
    assert!(build_document(&acq).is_ok());

    let empty = Acquisition {
        payload: Payload::Html("<html><body><p>Sem artigos aqui.</p></body></html>".to_string()),
        metadata: LawMetadata::default(),
    };
    assert!(build_document(&empty).is_err());
}

#[test]
fn law_ids_derive_from_the_urn() {
    assert_eq!(
        law_id_from_urn("urn:lex:br:federal:decreto.lei:1940-12-07;2848"),
        "decreto-lei-2848"
    );
    assert_eq!(
        law_id_from_urn("urn:lex:br:federal:lei:2002-01-10;10406"),
        "lei-10406"
    );
    assert_eq!(law_id_from_urn("not-a-urn"), "lei-desconhecida");
}

#[test]
fn output_file_is_replaced_atomically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lei.json");

    let (document, _) = build_document(&json_acquisition()).unwrap();
    std::fs::write(&path, "stale contents").unwrap();
    write_document(&path, &document).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(value.get("lei").is_some());
    assert!(value.get("artigos").is_some());
    assert!(!dir.path().join("lei.json.tmp").exists());
}

#[test]
fn wire_format_uses_the_reader_contract_names() {
    let (document, _) = build_document(&json_acquisition()).unwrap();
    let value = serde_json::to_value(&document).unwrap();

    let artigo = &value["artigos"][0];
    assert!(artigo.get("numero").is_some());
    assert!(artigo.get("vigente").is_some());
    assert!(artigo.get("contexto").is_some());
    assert!(artigo.get("epigrafe").is_some());
    assert!(artigo["revoked_versions"].is_array());

    let caput = artigo["plate_content"]
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["slug"] == "caput")
        .expect("caput block");
    assert_eq!(caput["type"], "p");
    // No annotations were split off this caput, so the optional keys
    // are absent rather than null.
    assert!(caput.get("texto_original").is_none());
    assert!(caput.get("anotacoes").is_none());
}

#[test]
fn urn_slug_round_trip_holds_for_emitted_blocks() {
    let (document, report) = build_document(&json_acquisition()).unwrap();
    assert_eq!(report.urn_slug_mismatches, 0);

    for artigo in &document.artigos {
        for block in &artigo.plate_content {
            if let Some(urn) = &block.urn {
                let fragment = normas_importer::urn::urn_fragment(urn).unwrap();
                let conv = normas_importer::urn::urn_to_slug(fragment);
                assert!(conv.valid, "invalid slug for {urn}");
            }
        }
    }
}

#[test]
fn path_values_follow_the_hierarchy_headings() {
    let (document, _) = build_document(&json_acquisition()).unwrap();
    let art1 = document.artigos.iter().find(|a| a.number == "1").unwrap();
    assert_eq!(art1.path.get("parte").unwrap(), "PARTE GERAL");
    assert_eq!(
        art1.path.get("titulo").unwrap(),
        "Título I - Da aplicação da lei penal"
    );
    assert_eq!(
        art1.context,
        "PARTE GERAL > Título I - Da aplicação da lei penal"
    );
}
