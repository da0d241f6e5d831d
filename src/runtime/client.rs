//! Acquisition client for the normas.leg.br public API.
//!
//! The structured endpoint is queried first; when it returns metadata
//! without a `hasPart` tree, the client picks a binary-text variant by
//! priority and fetches its HTML instead.

use crate::error::{ImporterError, Result};
use crate::runtime::cache::FileCache;
use crate::runtime::fetcher::Fetcher;
use crate::types::LawMetadata;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

pub const API_BASE: &str = "https://normas.leg.br/api/public";

static BINARY_UUID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/binario/([a-f0-9-]+)/texto").unwrap());

/// URNs for laws commonly requested by alias.
pub const KNOWN_LAWS: &[(&str, &str)] = &[
    ("codigo-penal", "urn:lex:br:federal:decreto.lei:1940-12-07;2848"),
    ("codigo-civil", "urn:lex:br:federal:lei:2002-01-10;10406"),
    ("clt", "urn:lex:br:federal:decreto.lei:1943-05-01;5452"),
    ("cdc", "urn:lex:br:federal:lei:1990-09-11;8078"),
    ("eca", "urn:lex:br:federal:lei:1990-07-13;8069"),
    ("ctb", "urn:lex:br:federal:lei:1997-09-23;9503"),
    ("constituicao", "urn:lex:br:federal:constituicao:1988-10-05;1988"),
];

/// Resolve a short alias to its URN. An optional JSON override file
/// (`IMPORTER_ALIASES`, a `{alias: urn}` map) extends the built-in
/// table.
pub fn resolve_alias(alias: &str) -> Result<String> {
    let lowered = alias.to_lowercase();

    if let Ok(path) = std::env::var("IMPORTER_ALIASES") {
        if let Ok(raw) = std::fs::read_to_string(&path) {
            if let Ok(table) = serde_json::from_str::<HashMap<String, String>>(&raw) {
                if let Some(urn) = table.get(&lowered) {
                    return Ok(urn.clone());
                }
            }
        }
    }

    KNOWN_LAWS
        .iter()
        .find(|&&(a, _)| a == lowered)
        .map(|&(_, urn)| urn.to_string())
        .ok_or_else(|| ImporterError::UnknownAlias(alias.to_string()))
}

/// Best-effort display name for a URN present in the alias table.
pub fn alias_name_for_urn(urn: &str) -> Option<String> {
    KNOWN_LAWS
        .iter()
        .find(|&&(_, u)| u == urn)
        .map(|&(alias, _)| alias.replace('-', " "))
}

#[derive(Debug, Clone)]
pub enum Payload {
    Json(Value),
    Html(String),
}

#[derive(Debug, Clone)]
pub struct Acquisition {
    pub payload: Payload,
    pub metadata: LawMetadata,
}

pub struct NormasClient<'a> {
    fetcher: &'a dyn Fetcher,
    base_url: String,
    cache: Option<FileCache>,
}

impl<'a> NormasClient<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, cache: Option<FileCache>) -> Self {
        Self {
            fetcher,
            base_url: API_BASE.to_string(),
            cache,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch a law by URN, following the variant fallback when the
    /// structured endpoint carries no `hasPart` tree.
    pub async fn fetch(&self, urn: &str) -> Result<Acquisition> {
        let structured = self.fetch_structured(urn).await?;
        let metadata = extract_metadata(&structured);

        if structured.get("hasPart").is_some() {
            tracing::debug!("structured JSON available for {urn}");
            return Ok(Acquisition {
                payload: Payload::Json(structured),
                metadata,
            });
        }

        let encodings = structured
            .get("encoding")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let uuid = select_variant(&encodings).ok_or_else(|| ImporterError::NoVariantAvailable {
            urn: urn.to_string(),
        })?;

        tracing::debug!("falling back to binary variant {uuid} for {urn}");
        let html = self.fetch_binary_html(urn, &uuid).await?;
        Ok(Acquisition {
            payload: Payload::Html(html),
            metadata,
        })
    }

    async fn fetch_structured(&self, urn: &str) -> Result<Value> {
        if let Some(cache) = &self.cache {
            if let Some(raw) = cache.read(urn, "json") {
                if let Ok(value) = serde_json::from_str(&raw) {
                    tracing::debug!("structured payload for {urn} served from cache");
                    return Ok(value);
                }
            }
        }

        let url = format!(
            "{}/normas?urn={}&tipo_documento=maior-detalhe",
            self.base_url, urn
        );
        let body = self.fetcher.fetch(&url).await?;
        let value: Value = serde_json::from_str(&body)?;

        if let Some(cache) = &self.cache {
            cache.write(urn, "json", &body)?;
        }
        Ok(value)
    }

    async fn fetch_binary_html(&self, urn: &str, uuid: &str) -> Result<String> {
        if let Some(cache) = &self.cache {
            if let Some(html) = cache.read(urn, "html") {
                tracing::debug!("binary HTML for {urn} served from cache");
                return Ok(html);
            }
        }

        let url = format!("{}/binario/{}/texto", self.base_url, uuid);
        let html = self.fetcher.fetch(&url).await?;

        if let Some(cache) = &self.cache {
            cache.write(urn, "html", &html)?;
        }
        Ok(html)
    }
}

/// Pick the binary-text variant to fetch:
/// 1. `version == "Current"` (compiled, up-to-date text)
/// 2. `additionalType` containing `Compilacao` or `Vigente`
/// 3. `additionalType` containing `PublicacaoOriginal`
/// 4. the last variant in listing order
pub fn select_variant(encodings: &[Value]) -> Option<String> {
    let uuid_of = |enc: &Value| -> Option<String> {
        let content_url = enc.get("contentUrl")?.as_str()?;
        BINARY_UUID_RE
            .captures(content_url)
            .map(|caps| caps[1].to_string())
    };

    for enc in encodings {
        if enc.get("version").and_then(Value::as_str) == Some("Current") {
            if let Some(uuid) = uuid_of(enc) {
                return Some(uuid);
            }
        }
    }

    for enc in encodings {
        let additional = enc
            .get("additionalType")
            .and_then(Value::as_str)
            .unwrap_or("");
        if additional.contains("Compilacao") || additional.contains("Vigente") {
            if let Some(uuid) = uuid_of(enc) {
                return Some(uuid);
            }
        }
    }

    for enc in encodings {
        let additional = enc
            .get("additionalType")
            .and_then(Value::as_str)
            .unwrap_or("");
        if additional.contains("PublicacaoOriginal") {
            if let Some(uuid) = uuid_of(enc) {
                return Some(uuid);
            }
        }
    }

    encodings.iter().rev().find_map(uuid_of)
}

pub fn extract_metadata(data: &Value) -> LawMetadata {
    let str_of = |key: &str| -> String {
        data.get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let urn = data
        .get("legislationIdentifier")
        .or_else(|| data.get("@id"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    LawMetadata {
        title: str_of("headline"),
        urn,
        date: str_of("legislationDate"),
        summary: str_of("abstract"),
        keywords: str_of("keywords"),
    }
}

/// Read a caller-supplied HTML file, trying utf-8 first and then the
/// legacy encodings older Planalto pages were published in.
pub fn read_local_html(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;

    if let Ok(text) = String::from_utf8(bytes.clone()) {
        return Ok(text);
    }

    for encoding in [encoding_rs::WINDOWS_1252, encoding_rs::ISO_8859_15] {
        let (text, _, had_errors) = encoding.decode(&bytes);
        if !had_errors {
            return Ok(text.into_owned());
        }
    }

    Err(ImporterError::Undecodable {
        path: path.display().to_string(),
    })
}
