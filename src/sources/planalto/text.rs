//! Text-driven HTML parser for sparse markup, typically the Planalto
//! pages, where hierarchy is carried by line shape rather than tags.
//!
//! The HTML is re-blocked into logical paragraphs tagged with
//! `(text, revoked, centered)`. Strike-through regions are replaced by
//! sentinel characters before tags are stripped, so full-block strikes
//! survive as revoked flags. A state machine then walks the blocks with
//! a seven-level hierarchy cursor and the shared article builder.

use crate::element::{Level, Structure};
use crate::error::{ImporterError, Result};
use crate::sources::builder::ArticleBuilder;
use crate::sources::common::{
    assess_vigency, classify_line, collapse_ws, fix_encoding, structural_heading_starts,
    structural_match, Classified, Vigency,
};
use crate::sources::ParsedLaw;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

const STRIKE_OPEN: char = '\u{E000}';
const STRIKE_CLOSE: char = '\u{E001}';

static STRIKE_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<\s*(?:strike|del|s)\b[^>]*>").unwrap());
static STRIKE_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</\s*(?:strike|del|s)\s*>").unwrap());
static BLOCK_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(p|div|center|h[1-6])\b[^>]*>").unwrap());
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<[^>]+>").unwrap());
static BLANK_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());
static NUMERIC_ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&#(\d+);").unwrap());
static INDICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ÍI]\s*N\s*D\s*I\s*C\s*E$").unwrap());

const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&amp;", "&"),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&apos;", "'"),
    ("&sect;", "§"),
    ("&ordm;", "º"),
    ("&ordf;", "ª"),
    ("&ccedil;", "ç"),
    ("&atilde;", "ã"),
    ("&otilde;", "õ"),
    ("&aacute;", "á"),
    ("&eacute;", "é"),
    ("&iacute;", "í"),
    ("&oacute;", "ó"),
    ("&uacute;", "ú"),
    ("&acirc;", "â"),
    ("&ecirc;", "ê"),
    ("&ocirc;", "ô"),
    ("&agrave;", "à"),
];

#[derive(Debug, Clone)]
struct RawBlock {
    text: String,
    revoked: bool,
    centered: bool,
    heading_tag: bool,
}

pub fn parse_text_html(html: &str) -> Result<ParsedLaw> {
    let html = fix_encoding(html);
    let with_sentinels = mark_strikethrough(&html);
    let mut blocks = reblock(&with_sentinels);

    if blocks.is_empty() {
        return Err(ImporterError::ParseFailed(
            "no textual blocks in input".to_string(),
        ));
    }

    drop_trailing_indice(&mut blocks);
    let blocks = segment_multi_label(blocks);

    let mut machine = TextMachine::new(
        blocks
            .iter()
            .any(|b| b.text.to_uppercase().contains("PARTE GERAL")),
    );
    for block in &blocks {
        machine.feed(block);
    }
    Ok(machine.finish())
}

fn mark_strikethrough(html: &str) -> String {
    let opened = STRIKE_OPEN_RE.replace_all(html, STRIKE_OPEN.to_string());
    STRIKE_CLOSE_RE
        .replace_all(&opened, STRIKE_CLOSE.to_string())
        .into_owned()
}

/// Split the HTML into logical blocks, one per `<p>/<div>/<center>/<h*>`
/// element. Sources with no block tags at all fall back to blank-line
/// splitting.
fn reblock(html: &str) -> Vec<RawBlock> {
    let matches: Vec<_> = BLOCK_TAG_RE.find_iter(html).collect();
    if matches.is_empty() {
        let stripped = TAG_RE.replace_all(html, " ");
        let unescaped = unescape_entities(&stripped);
        return BLANK_LINE_RE
            .split(&unescaped)
            .filter_map(|chunk| build_block(chunk, false, false))
            .collect();
    }

    let mut blocks = Vec::new();
    // <center> wraps inner <p> blocks, so its effect outlives its own
    // (usually empty) segment.
    let mut in_center = false;
    for (i, m) in matches.iter().enumerate() {
        let open_tag = m.as_str().to_lowercase();
        let tag_name = BLOCK_TAG_RE
            .captures(m.as_str())
            .map(|caps| caps[1].to_lowercase())
            .unwrap_or_default();
        if tag_name == "center" {
            in_center = true;
        }
        let centered = in_center || open_tag.contains("center");
        let heading_tag = tag_name.starts_with('h');

        let end = matches
            .get(i + 1)
            .map(|next| next.start())
            .unwrap_or(html.len());
        let segment = &html[m.end()..end];
        let stripped = TAG_RE.replace_all(segment, " ");
        let unescaped = unescape_entities(&stripped);

        if let Some(block) = build_block(&unescaped, centered, heading_tag) {
            blocks.push(block);
        }

        if segment.to_lowercase().contains("</center>") {
            in_center = false;
        }
    }
    blocks
}

fn build_block(text: &str, centered: bool, heading_tag: bool) -> Option<RawBlock> {
    let (visible, fully_struck) = resolve_sentinels(text);
    let collapsed = collapse_ws(&visible);
    if collapsed.is_empty() {
        return None;
    }
    Some(RawBlock {
        text: collapsed,
        revoked: fully_struck,
        centered,
        heading_tag,
    })
}

/// Remove the strike sentinels, reporting whether every visible
/// character sat inside a struck region.
fn resolve_sentinels(text: &str) -> (String, bool) {
    let mut depth = 0usize;
    let mut struck_chars = false;
    let mut plain_chars = false;
    let mut visible = String::with_capacity(text.len());

    for ch in text.chars() {
        match ch {
            STRIKE_OPEN => depth += 1,
            STRIKE_CLOSE => depth = depth.saturating_sub(1),
            _ => {
                visible.push(ch);
                if !ch.is_whitespace() {
                    if depth > 0 {
                        struck_chars = true;
                    } else {
                        plain_chars = true;
                    }
                }
            }
        }
    }
    (visible, struck_chars && !plain_chars)
}

fn unescape_entities(text: &str) -> String {
    let mut result = text.to_string();
    for &(entity, replacement) in ENTITIES {
        if result.contains(entity) {
            result = result.replace(entity, replacement);
        }
    }
    NUMERIC_ENTITY_RE
        .replace_all(&result, |caps: &regex::Captures| {
            caps[1]
                .parse::<u32>()
                .ok()
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_default()
        })
        .into_owned()
}

/// Some sources append a table of contents titled "ÍNDICE" after the
/// final article; drop it when it sits in the trailing half.
fn drop_trailing_indice(blocks: &mut Vec<RawBlock>) {
    let position = blocks
        .iter()
        .rposition(|b| INDICE_RE.is_match(b.text.to_uppercase().trim()));
    if let Some(idx) = position {
        if idx >= blocks.len() / 2 {
            blocks.truncate(idx);
        }
    }
}

/// A single line sometimes glues several headings together
/// ("TÍTULO I CAPÍTULO I ..."); split it at each heading start.
fn segment_multi_label(blocks: Vec<RawBlock>) -> Vec<RawBlock> {
    let mut result = Vec::with_capacity(blocks.len());
    for block in blocks {
        let starts = structural_heading_starts(&block.text);
        if starts.len() < 2 || starts[0] != 0 {
            result.push(block);
            continue;
        }

        for (i, &start) in starts.iter().enumerate() {
            let end = starts.get(i + 1).copied().unwrap_or(block.text.len());
            let piece = block.text[start..end].trim();
            if !piece.is_empty() {
                result.push(RawBlock {
                    text: piece.to_string(),
                    revoked: block.revoked,
                    centered: block.centered,
                    heading_tag: block.heading_tag,
                });
            }
        }
    }
    result
}

enum PendingHeader {
    Idle,
    Waiting { level: Level, heading: String },
}

struct TextMachine {
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

impl TextMachine {
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

    /// An epigraph candidate is held in both slots: it becomes the next
    /// article's epigraph, or a rubric if a paragraph or inciso arrives
    /// first.
    fn hold_epigraph(&mut self, text: String) {
        if self.builder.in_article() {
            self.builder.queue_rubric(text.clone());
            self.rubric_active = true;
        }
        self.pending_epigraph = text;
    }

    fn feed(&mut self, block: &RawBlock) {
        if block.text.is_empty() {
            return;
        }

        if let Some((level, designator_end)) = structural_match(&block.text) {
            self.flush_pending_header();
            if level == Level::Titulo {
                self.maybe_add_parte_geral();
            }
            let remainder = block.text[designator_end..]
                .trim_start_matches([' ', '-', '–', '—'])
                .trim();
            if remainder.is_empty() {
                // Description expected on a following line.
                self.pending = PendingHeader::Waiting {
                    level,
                    heading: block.text.clone(),
                };
            } else {
                self.record_heading(level, &block.text);
            }
            self.structure_started = true;
            return;
        }

        let classified = classify_line(&block.text);

        if matches!(self.pending, PendingHeader::Waiting { .. }) {
            match &classified {
                Classified::Continuation { text } | Classified::Orphan { text }
                    if block.centered || is_all_uppercase(text) =>
                {
                    let text = text.clone();
                    self.complete_pending_header(&text);
                    return;
                }
                _ => self.flush_pending_header(),
            }
        }

        let vigency = |text: &str| -> Vigency {
            if block.revoked {
                Vigency {
                    in_force: false,
                    textually_revoked: true,
                }
            } else {
                assess_vigency(text)
            }
        };

        match classified {
            Classified::Empty | Classified::Structural { .. } => {}
            Classified::Artigo { number, text } => {
                let v = vigency(&text);
                let epigraph = std::mem::take(&mut self.pending_epigraph);
                self.rubric_active = false;
                self.builder
                    .start_article(number, text, epigraph, v, &self.path);
                self.structure_started = true;
            }
            Classified::Paragrafo { number, text } => {
                let v = vigency(&text);
                self.consume_rubric_slot();
                self.builder.push_paragraph(number, text, v);
            }
            Classified::Inciso { number, text } => {
                let v = vigency(&text);
                self.consume_rubric_slot();
                self.builder.push_inciso(number, text, v);
            }
            Classified::Alinea { number, text } => {
                let v = vigency(&text);
                self.builder.push_alinea(number, text, v);
            }
            Classified::Item { number, text } => {
                let v = vigency(&text);
                self.builder.push_item(number, text, v);
            }
            Classified::Pena { text } => {
                // A struck penalty right after a struck article belongs
                // to that revoked article.
                let v = if block.revoked && self.builder.current_is_revoked() {
                    Vigency {
                        in_force: false,
                        textually_revoked: true,
                    }
                } else {
                    vigency(&text)
                };
                self.builder.push_pena(text, v);
            }
            Classified::Continuation { text } => self.handle_continuation(block, text),
            Classified::Orphan { text } => self.handle_orphan(block, text),
        }
    }

    fn handle_continuation(&mut self, block: &RawBlock, text: String) {
        let is_annotation = text.starts_with('(') && text.ends_with(')');
        let prev_terminal = self
            .builder
            .last_body()
            .map(|body| ends_with_terminal(body))
            .unwrap_or(false);

        if is_annotation || (!block.centered && !prev_terminal) {
            if self.builder.append_continuation(&text) {
                return;
            }
        }
        self.structure.textos_soltos.push(text);
    }

    fn handle_orphan(&mut self, block: &RawBlock, text: String) {
        if block.heading_tag && self.structure_started {
            self.hold_epigraph(text);
            return;
        }

        // Short centered lines without a closing period read as
        // epigraphs of the next article.
        if block.centered
            && self.structure_started
            && text.chars().count() < 120
            && !ends_with_terminal(&text)
        {
            self.hold_epigraph(text);
            return;
        }

        let prev_terminal = self
            .builder
            .last_body()
            .map(|body| ends_with_terminal(body))
            .unwrap_or(false);
        if self.builder.in_article() && !block.centered && !prev_terminal {
            self.builder.append_continuation(&text);
            return;
        }

        if !self.structure_started && self.builder.article_count() == 0 {
            // Front-matter line the heuristics could not place; likely a
            // header whose centering signal was lost upstream.
            self.warnings
                .push(format!("unclassified leading text: '{text}'"));
        }
        self.structure.textos_soltos.push(text);
    }

    fn maybe_add_parte_geral(&mut self) {
        if self.mentions_parte_geral && !self.parte_geral_added && self.structure.partes.is_empty()
        {
            self.structure.push_heading(Level::Parte, "Parte geral");
            self.set_path(Level::Parte, "Parte geral");
            self.parte_geral_added = true;
        }
    }

    fn record_heading(&mut self, level: Level, heading: &str) {
        self.structure.push_heading(level, heading);
        self.set_path(level, heading);
    }

    fn complete_pending_header(&mut self, description: &str) {
        if let PendingHeader::Waiting { level, heading } =
            std::mem::replace(&mut self.pending, PendingHeader::Idle)
        {
            let full = format!("{heading} - {description}");
            self.record_heading(level, &full);
        }
    }

    fn flush_pending_header(&mut self) {
        if let PendingHeader::Waiting { level, heading } =
            std::mem::replace(&mut self.pending, PendingHeader::Idle)
        {
            self.record_heading(level, &heading);
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

fn ends_with_terminal(body: &str) -> bool {
    body.trim_end()
        .chars()
        .last()
        .map(|c| matches!(c, '.' | ':' | ';' | '!' | '?'))
        .unwrap_or(false)
}

fn is_all_uppercase(text: &str) -> bool {
    let mut has_letters = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            has_letters = true;
            if ch.is_lowercase() {
                return false;
            }
        }
    }
    has_letters
}
