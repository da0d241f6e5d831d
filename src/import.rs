//! End-to-end import pipeline: resolve the identifier, acquire the
//! source, parse, emit, and write the JSON artifact.

use crate::element::Structure;
use crate::emitter::emit_articles;
use crate::error::{ImporterError, Result};
use crate::runtime::cache::FileCache;
use crate::runtime::client::{
    alias_name_for_urn, read_local_html, resolve_alias, Acquisition, NormasClient, Payload,
};
use crate::runtime::fetcher::HttpFetcher;
use crate::sources::planalto::header::infer_header;
use crate::sources::{parse_payload, ParserUsed};
use crate::types::{LawDocument, LawInfo, LawMetadata};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

static LAW_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([^:;]+):[\d.\-]+;(\d+)").unwrap());
static LAW_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r";(\d+)").unwrap());

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub urn: Option<String>,
    pub alias: Option<String>,
    pub output: Option<PathBuf>,
    pub planalto_html: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ImportReport {
    pub law_name: String,
    pub urn: String,
    pub parser: ParserUsed,
    pub article_count: usize,
    pub parte_count: usize,
    pub titulo_count: usize,
    pub capitulo_count: usize,
    pub urn_slug_mismatches: usize,
    pub warnings: Vec<String>,
    pub output_path: Option<PathBuf>,
}

pub async fn import_law(options: &ImportOptions) -> Result<(LawDocument, ImportReport)> {
    let urn = match (&options.urn, &options.alias) {
        (Some(urn), _) => urn.clone(),
        (None, Some(alias)) => resolve_alias(alias)?,
        (None, None) => return Err(ImporterError::MissingUrn),
    };

    let mut acquisition = match &options.planalto_html {
        Some(path) => acquire_local(path, &urn)?,
        None => acquire_remote(options, &urn).await?,
    };
    if acquisition.metadata.urn.is_empty() {
        acquisition.metadata.urn = urn;
    }

    let (document, mut report) = build_document(&acquisition)?;

    if let Some(path) = &options.output {
        write_document(path, &document)?;
        report.output_path = Some(path.clone());
    }

    Ok((document, report))
}

async fn acquire_remote(options: &ImportOptions, urn: &str) -> Result<Acquisition> {
    let client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(60))
        .build()
        .map_err(|e| ImporterError::Network {
            url: "client".to_string(),
            source: e,
        })?;
    let fetcher = HttpFetcher::new(client);

    let cache = match &options.cache_dir {
        Some(dir) => Some(FileCache::new(dir)?),
        None => None,
    };

    let mut normas = NormasClient::new(&fetcher, cache);
    if let Some(base) = &options.base_url {
        normas = normas.with_base_url(base.clone());
    }
    normas.fetch(urn).await
}

/// Local HTML bypasses the network; metadata is synthesized from the
/// alias table, falling back to the norm header printed in the page.
fn acquire_local(path: &Path, urn: &str) -> Result<Acquisition> {
    let html = read_local_html(path)?;

    let mut metadata = LawMetadata {
        urn: urn.to_string(),
        ..Default::default()
    };
    if let Some(name) = alias_name_for_urn(urn) {
        metadata.title = name;
    } else if let Some(header) = infer_header(&html) {
        metadata.title = format!("{} nº {}", header.type_display, header.number);
        metadata.date = header.date_iso;
    }

    Ok(Acquisition {
        payload: Payload::Html(html),
        metadata,
    })
}

/// Pure transform from an acquisition to the output document. Split out
/// so tests can run the pipeline on fixtures without a network.
pub fn build_document(acquisition: &Acquisition) -> Result<(LawDocument, ImportReport)> {
    let (parsed, parser) = parse_payload(&acquisition.payload)?;
    let emitted = emit_articles(&parsed.articles);

    let metadata = &acquisition.metadata;
    let structure = parsed.structure;

    let report = ImportReport {
        law_name: metadata.title.clone(),
        urn: metadata.urn.clone(),
        parser,
        article_count: emitted.articles.len(),
        parte_count: structure.partes.len(),
        titulo_count: structure.titulos.len(),
        capitulo_count: structure.capitulos.len(),
        urn_slug_mismatches: emitted.urn_slug_mismatches,
        warnings: parsed
            .warnings
            .into_iter()
            .chain(emitted.warnings)
            .collect(),
        output_path: None,
    };

    let document = LawDocument {
        lei: build_law_info(metadata, structure),
        artigos: emitted.articles,
    };
    Ok((document, report))
}

fn build_law_info(metadata: &LawMetadata, mut structure: Structure) -> LawInfo {
    let hierarquia = std::mem::take(&mut structure.hierarquia);
    LawInfo {
        id: law_id_from_urn(&metadata.urn),
        nome: metadata.title.clone(),
        numero: LAW_NUMBER_RE
            .captures(&metadata.urn)
            .map(|caps| caps[1].to_string())
            .unwrap_or_default(),
        ementa: metadata.summary.clone(),
        urn: metadata.urn.clone(),
        data: metadata.date.clone(),
        importado_em: chrono::Utc::now().to_rfc3339(),
        estrutura: structure,
        hierarquia,
    }
}

/// `urn:lex:br:federal:decreto.lei:1940-12-07;2848` → `decreto-lei-2848`.
pub fn law_id_from_urn(urn: &str) -> String {
    match LAW_ID_RE.captures(urn) {
        Some(caps) => format!("{}-{}", caps[1].replace('.', "-"), &caps[2]),
        None => "lei-desconhecida".to_string(),
    }
}

/// Replace the output file atomically: write a sibling temp file, then
/// rename over the target.
pub fn write_document(path: &Path, document: &LawDocument) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;
    std::fs::rename(&tmp_path, path)?;

    tracing::info!("wrote {} bytes to {}", json.len(), path.display());
    Ok(())
}
