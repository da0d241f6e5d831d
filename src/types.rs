//! Output JSON model. Field names follow the reader contract, so most
//! wire keys are the Portuguese names the frontend reads; Rust field
//! names stay idiomatic and map through serde renames.

use crate::element::{HierarchyNode, Structure};
use serde::{Deserialize, Serialize};

/// Top-level artifact written to the output path.
#[derive(Debug, Clone, Serialize)]
pub struct LawDocument {
    pub lei: LawInfo,
    pub artigos: Vec<Article>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LawInfo {
    pub id: String,
    pub nome: String,
    pub numero: String,
    pub ementa: String,
    pub urn: String,
    pub data: String,
    pub importado_em: String,
    pub estrutura: Structure,
    pub hierarquia: Vec<HierarchyNode>,
}

/// Metadata extracted during acquisition, before emission shapes it
/// into `LawInfo`.
#[derive(Debug, Clone, Default)]
pub struct LawMetadata {
    pub title: String,
    pub urn: String,
    pub date: String,
    pub summary: String,
    pub keywords: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Article {
    pub id: String,
    #[serde(rename = "numero")]
    pub number: String,
    pub slug: String,
    #[serde(rename = "epigrafe")]
    pub epigraph: String,
    pub plate_content: Vec<PlateBlock>,
    pub texto_plano: String,
    pub search_text: String,
    #[serde(rename = "vigente")]
    pub in_force: bool,
    #[serde(rename = "contexto")]
    pub context: String,
    pub path: std::collections::BTreeMap<String, String>,
    pub content_hash: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub urn: String,
    pub revoked_versions: Vec<Article>,
}

/// One rich-text paragraph consumed by the reader UI.
#[derive(Debug, Clone, Serialize)]
pub struct PlateBlock {
    #[serde(rename = "type")]
    pub type_: String,
    pub children: Vec<TextRun>,
    pub id: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urn: Option<String>,
    pub search_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub texto_original: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anotacoes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indent: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revogado: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vetado: Option<bool>,
}

impl PlateBlock {
    pub fn new(
        slug: impl Into<String>,
        children: Vec<TextRun>,
        search_text: impl Into<String>,
    ) -> Self {
        Self {
            type_: "p".to_string(),
            children,
            id: uuid::Uuid::new_v4().to_string(),
            slug: slug.into(),
            urn: None,
            search_text: search_text.into(),
            texto_original: None,
            anotacoes: None,
            indent: None,
            revogado: None,
            vetado: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strikethrough: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: None,
            italic: None,
            strikethrough: None,
            color: None,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            bold: Some(true),
            ..Self::plain(text)
        }
    }

    pub fn struck(text: impl Into<String>, bold: bool) -> Self {
        Self {
            bold: bold.then_some(true),
            strikethrough: Some(true),
            color: Some("#9ca3af".to_string()),
            ..Self::plain(text)
        }
    }
}
