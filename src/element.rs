//! Intermediate element tree built by the parsers and consumed by the
//! emitter. Elements live only for the duration of a single import.

use serde::Serialize;
use std::collections::BTreeMap;

/// Canonical structural hierarchy, outermost first. Any transition at a
/// level clears every deeper level.
pub const LEVEL_HIERARCHY: &[Level] = &[
    Level::Parte,
    Level::Livro,
    Level::Titulo,
    Level::Subtitulo,
    Level::Capitulo,
    Level::Secao,
    Level::Subsecao,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Parte,
    Livro,
    Titulo,
    Subtitulo,
    Capitulo,
    Secao,
    Subsecao,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Parte => "parte",
            Level::Livro => "livro",
            Level::Titulo => "titulo",
            Level::Subtitulo => "subtitulo",
            Level::Capitulo => "capitulo",
            Level::Secao => "secao",
            Level::Subsecao => "subsecao",
        }
    }

    pub fn index(self) -> usize {
        LEVEL_HIERARCHY.iter().position(|&l| l == self).unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Artigo,
    Caput,
    Paragrafo,
    Inciso,
    Alinea,
    Item,
    Pena,
    Rubrica,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementKind::Artigo => "artigo",
            ElementKind::Caput => "caput",
            ElementKind::Paragrafo => "paragrafo",
            ElementKind::Inciso => "inciso",
            ElementKind::Alinea => "alinea",
            ElementKind::Item => "item",
            ElementKind::Pena => "pena",
            ElementKind::Rubrica => "rubrica",
        }
    }
}

/// One node of the law tree. `number` is the canonical string form:
/// arabic for items and paragraphs, uppercased roman for incisos, a
/// single lowercase letter for alineas, `"unico"` for a sole paragraph.
/// Internal thousands dots are preserved (`1.029`).
#[derive(Debug, Clone)]
pub struct LawElement {
    pub kind: ElementKind,
    pub number: String,
    pub text: String,
    pub epigraph: String,
    pub urn: String,
    pub in_force: bool,
    pub textually_revoked: bool,
    pub path: BTreeMap<Level, String>,
    pub children: Vec<LawElement>,
}

impl LawElement {
    pub fn new(kind: ElementKind, number: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind,
            number: number.into(),
            text: text.into(),
            epigraph: String::new(),
            urn: String::new(),
            in_force: true,
            textually_revoked: false,
            path: BTreeMap::new(),
            children: Vec::new(),
        }
    }
}

/// Node of the nested hierarchy tree exposed under `lei.hierarquia`.
#[derive(Debug, Clone, Serialize)]
pub struct HierarchyNode {
    pub nivel: String,
    pub titulo: String,
    pub filhos: Vec<HierarchyNode>,
}

/// Structural skeleton of the law: flat heading lists per level, the
/// nested hierarchy tree, and a bin for texts no classifier claimed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Structure {
    pub partes: Vec<String>,
    pub livros: Vec<String>,
    pub titulos: Vec<String>,
    pub subtitulos: Vec<String>,
    pub capitulos: Vec<String>,
    pub secoes: Vec<String>,
    pub subsecoes: Vec<String>,
    #[serde(skip)]
    pub hierarquia: Vec<HierarchyNode>,
    pub textos_soltos: Vec<String>,
}

impl Structure {
    pub fn list_mut(&mut self, level: Level) -> &mut Vec<String> {
        match level {
            Level::Parte => &mut self.partes,
            Level::Livro => &mut self.livros,
            Level::Titulo => &mut self.titulos,
            Level::Subtitulo => &mut self.subtitulos,
            Level::Capitulo => &mut self.capitulos,
            Level::Secao => &mut self.secoes,
            Level::Subsecao => &mut self.subsecoes,
        }
    }

    /// Record a heading: appends to the flat list for its level and
    /// inserts a node in the hierarchy tree under the nearest open
    /// shallower level.
    pub fn push_heading(&mut self, level: Level, heading: &str) {
        self.list_mut(level).push(heading.to_string());

        let node = HierarchyNode {
            nivel: level.as_str().to_string(),
            titulo: heading.to_string(),
            filhos: Vec::new(),
        };
        insert_node(&mut self.hierarquia, node, level.index());
    }
}

// Descend the rightmost spine until no strictly shallower open node
// remains, then attach.
fn insert_node(list: &mut Vec<HierarchyNode>, node: HierarchyNode, depth: usize) {
    if let Some(last) = list.last_mut() {
        if level_index(&last.nivel) < depth {
            insert_node(&mut last.filhos, node, depth);
            return;
        }
    }
    list.push(node);
}

fn level_index(name: &str) -> usize {
    LEVEL_HIERARCHY
        .iter()
        .position(|l| l.as_str() == name)
        .unwrap_or(usize::MAX)
}
