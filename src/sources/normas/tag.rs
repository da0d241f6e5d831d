//! Tag-driven HTML parser for the normas binary-text endpoint.
//!
//! The binary HTML keeps enough markup to classify blocks directly:
//! article openings carry bold `Art` spans, epigraphs are fully bold
//! paragraphs, and hierarchy headings are uppercase lines. Each
//! `<p>/<h3>/<h4>` block is classified and fed to a state machine that
//! reconstructs the element hierarchy.

use crate::element::{Level, Structure};
use crate::sources::builder::ArticleBuilder;
use crate::sources::common::{
    assess_vigency, classify_line, collapse_ws, fix_encoding, match_structural, Classified,
};
use crate::sources::ParsedLaw;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tl::NodeHandle;

static PARAGRAPH_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^§").unwrap());
static INCISO_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[IVXLC]+\s*[-–—]").unwrap());
static ALINEA_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z]\s*\)").unwrap());

/// Two-state machine for hierarchy headings whose descriptive line
/// follows in the next block ("TÍTULO I" + "DA APLICAÇÃO DA LEI PENAL").
enum PendingHeader {
    Idle,
    Waiting { level: Level, heading: String },
}

pub fn parse_tag_html(html: &str) -> ParsedLaw {
    let html = fix_encoding(html);
    let dom = match tl::parse(&html, tl::ParserOptions::default()) {
        Ok(dom) => dom,
        Err(_) => return ParsedLaw::default(),
    };

    let blocks = collect_blocks(&dom);
    let mentions_parte_geral = blocks
        .iter()
        .any(|b| b.text.to_uppercase().contains("PARTE GERAL"));

    let mut machine = TagMachine::new(mentions_parte_geral);
    for block in &blocks {
        machine.feed(block);
    }
    machine.finish()
}

struct Block {
    tag: &'static str,
    text: String,
    bold_text: String,
    normal_text: String,
}

fn collect_blocks(dom: &tl::VDom) -> Vec<Block> {
    let mut blocks = Vec::new();

    for (index, node) in dom.nodes().iter().enumerate() {
        let Some(tag) = node.as_tag() else {
            continue;
        };
        let tag_name: &'static str = match tag.name().as_utf8_str().as_ref() {
            "p" => "p",
            "h3" => "h3",
            "h4" => "h4",
            _ => continue,
        };

        let handle = NodeHandle::new(index as u32);
        let mut full = String::new();
        let mut bold = String::new();
        let mut normal = String::new();
        collect_text(dom, handle, false, &mut full, &mut bold, &mut normal);

        blocks.push(Block {
            tag: tag_name,
            text: collapse_ws(&full),
            bold_text: collapse_ws(&bold),
            normal_text: collapse_ws(&normal),
        });
    }
    blocks
}

// `full` keeps document order; `bold`/`normal` accumulate the runs
// separately for the epigraph heuristic.
fn collect_text(
    dom: &tl::VDom,
    handle: NodeHandle,
    in_bold: bool,
    full: &mut String,
    bold: &mut String,
    normal: &mut String,
) {
    let parser = dom.parser();
    let Some(node) = handle.get(parser) else {
        return;
    };

    if let Some(raw) = node.as_raw() {
        let text = raw.as_utf8_str();
        full.push_str(text.as_ref());
        if in_bold {
            bold.push_str(text.as_ref());
        } else {
            normal.push_str(text.as_ref());
        }
        return;
    }

    if let Some(tag) = node.as_tag() {
        let name = tag.name().as_utf8_str();
        if name.as_ref() == "script" || name.as_ref() == "style" {
            return;
        }
        let bold_here = in_bold || is_bold_tag(tag);
        for child in tag.children().top().iter() {
            collect_text(dom, *child, bold_here, full, bold, normal);
        }
    }
}

fn is_bold_tag(tag: &tl::HTMLTag) -> bool {
    let name = tag.name().as_utf8_str();
    if name.as_ref() == "b" || name.as_ref() == "strong" {
        return true;
    }
    if let Some(style) = tag.attributes().get("style").flatten() {
        let style = style.as_utf8_str().to_lowercase();
        return style.contains("font-weight:bold") || style.contains("font-weight: bold");
    }
    false
}

struct TagMachine {
    builder: ArticleBuilder,
    structure: Structure,
    warnings: Vec<String>,
    pending: PendingHeader,
    pending_epigraph: String,
    rubric_active: bool,
    path: BTreeMap<Level, String>,
    structure_started: bool,
    mentions_parte_geral: bool,
    parte_geral_added: bool,
}

impl TagMachine {
    fn new(mentions_parte_geral: bool) -> Self {
        Self {
            builder: ArticleBuilder::new(),
            structure: Structure::default(),
            warnings: Vec::new(),
            pending: PendingHeader::Idle,
            pending_epigraph: String::new(),
            rubric_active: false,
            path: BTreeMap::new(),
            structure_started: false,
            mentions_parte_geral,
            parte_geral_added: false,
        }
    }

    // The epigraph slot empties once the queued rubric lands on a
    // paragraph or inciso, so it cannot leak onto the next article.
    fn consume_rubric_slot(&mut self) {
        if self.rubric_active {
            self.pending_epigraph.clear();
            self.rubric_active = false;
        }
    }

    fn feed(&mut self, block: &Block) {
        if block.text.is_empty() {
            return;
        }

        if let Some((level, heading)) = match_structural(&block.text) {
            self.flush_pending_header();
            if level == Level::Titulo {
                self.maybe_add_parte_geral();
            }
            self.pending = PendingHeader::Waiting { level, heading };
            self.structure_started = true;
            return;
        }

        let classified = classify_line(&block.text);

        // A pending header absorbs the next descriptive line, including
        // fully bold uppercase ones; articles and enumerations flush it
        // unchanged first.
        if matches!(self.pending, PendingHeader::Waiting { .. }) {
            match &classified {
                Classified::Continuation { text } | Classified::Orphan { text } => {
                    let text = text.clone();
                    self.complete_pending_header(&text);
                    return;
                }
                _ => self.flush_pending_header(),
            }
        }

        if self.is_epigraph_block(block) {
            // Institutional headers before the first structural element
            // ("CÂMARA DOS DEPUTADOS") are not epigraphs. An epigraph
            // seen while an article is open is held in both slots: it
            // becomes the next article's epigraph, or a rubric if a
            // paragraph or inciso arrives first.
            if self.structure_started {
                self.pending_epigraph = block.text.clone();
                if self.builder.in_article() {
                    self.builder.queue_rubric(block.text.clone());
                    self.rubric_active = true;
                }
            }
            return;
        }

        match classified {
            Classified::Empty | Classified::Structural { .. } => {}
            Classified::Artigo { number, text } => {
                let vigency = assess_vigency(&text);
                let epigraph = std::mem::take(&mut self.pending_epigraph);
                self.rubric_active = false;
                self.builder
                    .start_article(number, text, epigraph, vigency, &self.path);
                self.structure_started = true;
            }
            Classified::Paragrafo { number, text } => {
                let vigency = assess_vigency(&text);
                self.consume_rubric_slot();
                self.builder.push_paragraph(number, text, vigency);
            }
            Classified::Inciso { number, text } => {
                let vigency = assess_vigency(&text);
                self.consume_rubric_slot();
                self.builder.push_inciso(number, text, vigency);
            }
            Classified::Alinea { number, text } => {
                let vigency = assess_vigency(&text);
                self.builder.push_alinea(number, text, vigency);
            }
            Classified::Item { number, text } => {
                let vigency = assess_vigency(&text);
                self.builder.push_item(number, text, vigency);
            }
            Classified::Pena { text } => {
                let vigency = assess_vigency(&text);
                self.builder.push_pena(text, vigency);
            }
            Classified::Continuation { text } => {
                if !self.builder.append_continuation(&text) {
                    self.structure.textos_soltos.push(text);
                }
            }
            Classified::Orphan { text } => {
                if !self.builder.append_continuation(&text) {
                    self.structure.textos_soltos.push(text);
                }
            }
        }
    }

    /// Epigraphs are short bold titles: `<h3>/<h4>` headings, or blocks
    /// whose bold spans carry the whole non-annotation content without
    /// opening an article or an enumeration.
    fn is_epigraph_block(&self, block: &Block) -> bool {
        if matches!(block.tag, "h3" | "h4") {
            return !block.text.starts_with("Art") && match_structural(&block.text).is_none();
        }

        if block.bold_text.is_empty() || block.bold_text.starts_with("Art") {
            return false;
        }
        let annotation_only = block.normal_text.is_empty()
            || block.normal_text.contains("Nome jurídico")
            || block.normal_text.contains("(Incluíd")
            || block.normal_text.contains("(Acrescid");
        if !annotation_only {
            return false;
        }

        !PARAGRAPH_PREFIX_RE.is_match(&block.bold_text)
            && !INCISO_PREFIX_RE.is_match(&block.bold_text)
            && !ALINEA_PREFIX_RE.is_match(&block.bold_text)
            && match_structural(&block.bold_text).is_none()
    }

    fn maybe_add_parte_geral(&mut self) {
        if self.mentions_parte_geral && !self.parte_geral_added && self.structure.partes.is_empty()
        {
            self.structure.push_heading(Level::Parte, "Parte geral");
            self.set_path(Level::Parte, "Parte geral");
            self.parte_geral_added = true;
        }
    }

    fn complete_pending_header(&mut self, description: &str) {
        if let PendingHeader::Waiting { level, heading } =
            std::mem::replace(&mut self.pending, PendingHeader::Idle)
        {
            let full = format!("{heading} - {description}");
            self.structure.push_heading(level, &full);
            self.set_path(level, &full);
        }
    }

    fn flush_pending_header(&mut self) {
        if let PendingHeader::Waiting { level, heading } =
            std::mem::replace(&mut self.pending, PendingHeader::Idle)
        {
            self.structure.push_heading(level, &heading);
            self.set_path(level, &heading);
        }
    }

    fn set_path(&mut self, level: Level, heading: &str) {
        self.path.retain(|l, _| l.index() <= level.index());
        self.path.insert(level, heading.to_string());
    }

    fn finish(mut self) -> ParsedLaw {
        self.flush_pending_header();
        ParsedLaw {
            articles: self.builder.finish(),
            structure: self.structure,
            warnings: self.warnings,
        }
    }
}
