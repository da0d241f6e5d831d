//! Parser for the structured JSON the normas endpoint returns when a
//! law has a full `hasPart` tree.
//!
//! Each node carries a `workExample` (the newest consolidated version,
//! last element when a list), a LexML identifier whose fragment encodes
//! the element type, and `legislationLegalForce` for vigency.

use crate::element::{ElementKind, LawElement, Level, Structure};
use crate::sources::common::{normalize_article_number, normalize_paragraph_number};
use crate::sources::ParsedLaw;
use regex::Regex;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static ARTICLE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)*[º°]?(?:-[A-Za-z])?)").unwrap());
static PARAGRAPH_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)§\s*(\d+[º°]?(?:-[A-Za-z])?|único)").unwrap());
static INCISO_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([IVXLC]+)").unwrap());
static ALINEA_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^([a-z])").unwrap());
static ITEM_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)").unwrap());
static INCISO_NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[IVXLC]+\s*[-–]").unwrap());
static ALINEA_NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^[a-z]\s*\)").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Body(ElementKind),
    Hierarchy(Level),
    Unknown,
}

pub fn parse_normas_json(data: &Value) -> ParsedLaw {
    let mut parser = JsonParser::default();
    if let Some(has_part) = data.get("hasPart") {
        parser.walk(has_part, &BTreeMap::new());
    }
    ParsedLaw {
        articles: parser.articles,
        structure: parser.structure,
        warnings: parser.warnings,
    }
}

#[derive(Default)]
struct JsonParser {
    articles: Vec<LawElement>,
    structure: Structure,
    warnings: Vec<String>,
}

impl JsonParser {
    fn walk(&mut self, part: &Value, path: &BTreeMap<Level, String>) {
        match part {
            Value::Array(items) => {
                for item in items {
                    self.walk(item, path);
                }
            }
            Value::Object(_) => self.process(part, path),
            _ => {}
        }
    }

    fn process(&mut self, elem: &Value, path: &BTreeMap<Level, String>) {
        let work = work_example(elem);
        let name = string_field(work, "name")
            .or_else(|| string_field(elem, "name"))
            .unwrap_or_default();
        let text = string_field(work, "text").unwrap_or_default();
        let urn = string_field(elem, "legislationIdentifier").unwrap_or_default();

        let mut path = path.clone();
        match identify(&urn, &name) {
            NodeKind::Hierarchy(level) => {
                let heading = if text.is_empty() {
                    name.clone()
                } else {
                    format!("{name} - {text}")
                };
                self.structure.push_heading(level, &heading);
                // A transition clears every deeper level.
                path.retain(|l, _| l.index() < level.index());
                path.insert(level, heading);
            }
            NodeKind::Body(ElementKind::Artigo) => {
                let article = self.build_article(elem, &name, &urn, &path);
                self.articles.push(article);
                return;
            }
            NodeKind::Body(_) | NodeKind::Unknown => {}
        }

        if let Some(children) = elem.get("hasPart") {
            self.walk(children, &path);
        }
    }

    fn build_article(
        &mut self,
        elem: &Value,
        name: &str,
        urn: &str,
        path: &BTreeMap<Level, String>,
    ) -> LawElement {
        let work = work_example(elem);
        let number = ARTICLE_NUMBER_RE
            .captures(name)
            .map(|caps| normalize_article_number(&caps[1]))
            .unwrap_or_else(|| "0".to_string());

        let mut article = LawElement::new(ElementKind::Artigo, number, "");
        article.urn = urn.to_string();
        article.in_force = legal_force_in_force(work);
        article.path = path.clone();

        for child in children_of(elem) {
            self.attach_article_child(&child, &mut article);
        }
        article
    }

    /// Articles recurse into body elements only: the caput text folds
    /// into the article itself, everything else becomes a child.
    fn attach_article_child(&mut self, elem: &Value, article: &mut LawElement) {
        let work = work_example(elem);
        let name = string_field(work, "name")
            .or_else(|| string_field(elem, "name"))
            .unwrap_or_default();
        let text = string_field(work, "text").unwrap_or_default();
        let urn = string_field(elem, "legislationIdentifier").unwrap_or_default();

        let kind = match identify(&urn, &name) {
            NodeKind::Body(kind) => kind,
            NodeKind::Hierarchy(_) | NodeKind::Unknown => {
                if !name.is_empty() || !text.is_empty() {
                    self.warnings
                        .push(format!("unclassified node inside article: '{name}'"));
                }
                return;
            }
        };

        if kind == ElementKind::Caput {
            if article.text.is_empty() {
                article.text = text;
            } else if !text.is_empty() {
                article.text.push(' ');
                article.text.push_str(&text);
            }
            for child in children_of(elem) {
                self.attach_article_child(&child, article);
            }
            return;
        }

        let number = extract_number(kind, &name);
        let mut child = LawElement::new(kind, number, text);
        child.urn = urn;
        child.in_force = legal_force_in_force(work);

        for grandchild in children_of(elem) {
            self.attach_article_child(&grandchild, &mut child);
        }
        article.children.push(child);
    }
}

/// Pick the most recent `workExample`: the last element when a list.
fn work_example(elem: &Value) -> &Value {
    match elem.get("workExample") {
        Some(Value::Array(items)) => items.last().unwrap_or(&Value::Null),
        Some(value) => value,
        None => &Value::Null,
    }
}

fn children_of(elem: &Value) -> Vec<Value> {
    match elem.get("hasPart") {
        Some(Value::Array(items)) => items.clone(),
        Some(value @ Value::Object(_)) => vec![value.clone()],
        _ => Vec::new(),
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn legal_force_in_force(work: &Value) -> bool {
    let force = match work.get("legislationLegalForce") {
        Some(Value::String(s)) => s.clone(),
        Some(obj @ Value::Object(_)) => string_field(obj, "name").unwrap_or_default(),
        _ => String::new(),
    };
    force != "NotInForce"
}

/// Classify a node by the type prefix of its URN fragment's last token
/// (`!art1_par1_inc2` → inciso), falling back to cues in the
/// human-readable name.
fn identify(urn: &str, name: &str) -> NodeKind {
    if let Some(kind) = kind_from_fragment(urn) {
        return kind;
    }

    let name_lower = name.to_lowercase();
    if name_lower.contains("caput") {
        return NodeKind::Body(ElementKind::Caput);
    }
    if name_lower.contains("parágrafo") || name.contains('§') {
        return NodeKind::Body(ElementKind::Paragrafo);
    }
    if INCISO_NAME_RE.is_match(name) {
        return NodeKind::Body(ElementKind::Inciso);
    }
    if ALINEA_NAME_RE.is_match(name) {
        return NodeKind::Body(ElementKind::Alinea);
    }
    if name_lower.starts_with("art") {
        return NodeKind::Body(ElementKind::Artigo);
    }
    if name_lower.starts_with("parte") {
        return NodeKind::Hierarchy(Level::Parte);
    }
    if name_lower.starts_with("livro") {
        return NodeKind::Hierarchy(Level::Livro);
    }
    if name_lower.starts_with("subtítulo") || name_lower.starts_with("subtitulo") {
        return NodeKind::Hierarchy(Level::Subtitulo);
    }
    if name_lower.starts_with("título") || name_lower.starts_with("titulo") {
        return NodeKind::Hierarchy(Level::Titulo);
    }
    if name_lower.starts_with("capítulo") || name_lower.starts_with("capitulo") {
        return NodeKind::Hierarchy(Level::Capitulo);
    }
    if name_lower.starts_with("subseção") || name_lower.starts_with("subsecao") {
        return NodeKind::Hierarchy(Level::Subsecao);
    }
    if name_lower.starts_with("seção") || name_lower.starts_with("secao") {
        return NodeKind::Hierarchy(Level::Secao);
    }

    NodeKind::Unknown
}

fn kind_from_fragment(urn: &str) -> Option<NodeKind> {
    let fragment = urn.rsplit_once('!')?.1;
    let token = fragment.rsplit('_').next()?;
    let prefix: String = token
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();

    match prefix.to_lowercase().as_str() {
        "cpt" => Some(NodeKind::Body(ElementKind::Caput)),
        "par" => Some(NodeKind::Body(ElementKind::Paragrafo)),
        "inc" => Some(NodeKind::Body(ElementKind::Inciso)),
        "ali" => Some(NodeKind::Body(ElementKind::Alinea)),
        "ite" => Some(NodeKind::Body(ElementKind::Item)),
        "art" => Some(NodeKind::Body(ElementKind::Artigo)),
        "prt" => Some(NodeKind::Hierarchy(Level::Parte)),
        "liv" => Some(NodeKind::Hierarchy(Level::Livro)),
        "tit" => Some(NodeKind::Hierarchy(Level::Titulo)),
        "cap" => Some(NodeKind::Hierarchy(Level::Capitulo)),
        "sec" => Some(NodeKind::Hierarchy(Level::Secao)),
        _ => None,
    }
}

fn extract_number(kind: ElementKind, name: &str) -> String {
    match kind {
        ElementKind::Paragrafo => PARAGRAPH_NUMBER_RE
            .captures(name)
            .map(|caps| normalize_paragraph_number(&caps[1]))
            .unwrap_or_else(|| "unico".to_string()),
        ElementKind::Inciso => INCISO_NUMBER_RE
            .captures(name)
            .map(|caps| caps[1].to_uppercase())
            .unwrap_or_default(),
        ElementKind::Alinea => ALINEA_NUMBER_RE
            .captures(name)
            .map(|caps| caps[1].to_lowercase())
            .unwrap_or_default(),
        ElementKind::Item => ITEM_NUMBER_RE
            .captures(name)
            .map(|caps| caps[1].to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}
