use normas_importer::annotations::{revocation_status, split_annotations, RevocationStatus};

#[test]
fn text_without_annotations_is_untouched() {
    let split = split_annotations("Matar alguém:");
    assert_eq!(split.clean, "Matar alguém:");
    assert_eq!(split.original, "Matar alguém:");
    assert!(split.annotations.is_empty());
}

#[test]
fn strips_single_trailing_annotation() {
    let split = split_annotations(
        "Não há crime sem lei anterior que o defina. (Redação dada pela Lei nº 7.209, de 11.7.1984)",
    );
    assert_eq!(split.clean, "Não há crime sem lei anterior que o defina.");
    assert_eq!(
        split.annotations,
        vec!["(Redação dada pela Lei nº 7.209, de 11.7.1984)".to_string()]
    );
    assert!(split.original.ends_with("11.7.1984)"));
}

#[test]
fn strips_trailing_run_in_document_order() {
    let split = split_annotations(
        "Texto. (Incluído pela Lei nº 13.104, de 2015) (Vide Lei nº 13.142, de 2015)",
    );
    assert_eq!(split.clean, "Texto.");
    assert_eq!(
        split.annotations,
        vec![
            "(Incluído pela Lei nº 13.104, de 2015)".to_string(),
            "(Vide Lei nº 13.142, de 2015)".to_string(),
        ]
    );
}

#[test]
fn keeps_non_marker_trailing_parenthetical() {
    let split = split_annotations("Texto final (exemplo ilustrativo)");
    assert_eq!(split.clean, "Texto final (exemplo ilustrativo)");
    assert!(split.annotations.is_empty());
}

#[test]
fn keeps_mid_text_parentheticals() {
    let split =
        split_annotations("Texto (Revogado pela Lei nº 1, de 1990) e mais texto depois.");
    assert!(split.annotations.is_empty());
    assert_eq!(split.clean, split.original);
}

#[test]
fn entire_body_can_be_an_annotation() {
    let split = split_annotations("(Revogado pela Lei nº 11.106, de 2005)");
    assert_eq!(split.clean, "");
    assert_eq!(split.annotations.len(), 1);
}

#[test]
fn revoked_when_clean_is_empty_and_annotation_revokes() {
    let split = split_annotations("(Revogado pela Lei nº 11.106, de 2005)");
    assert_eq!(
        revocation_status(&split.clean, &split.annotations),
        Some(RevocationStatus::Revoked)
    );
}

#[test]
fn vetoed_without_mantido() {
    let annotations = vec!["(Vetado na Lei nº 13.964, de 2019)".to_string()];
    assert_eq!(
        revocation_status(".", &annotations),
        Some(RevocationStatus::Vetoed)
    );
}

#[test]
fn overridden_veto_is_valid() {
    let annotations = vec!["(Vetado e mantido pelo Congresso Nacional)".to_string()];
    assert_eq!(revocation_status(".", &annotations), None);
}

#[test]
fn non_empty_body_is_never_revoked() {
    let annotations = vec!["(Revogado pela Lei nº 1, de 1990)".to_string()];
    assert_eq!(revocation_status("Texto vivo.", &annotations), None);
}

#[test]
fn punctuation_only_counts_as_empty() {
    let annotations = vec!["(Revogado pela Lei nº 1, de 1990)".to_string()];
    assert_eq!(
        revocation_status(" .-; ", &annotations),
        Some(RevocationStatus::Revoked)
    );
}
