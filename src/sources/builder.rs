//! Shared article-tree assembly for the HTML parsers.
//!
//! Both parsers classify a stream of blocks; attachment follows the
//! same hierarchy either way: `artigo ⊃ parágrafo ⊃ inciso ⊃ alínea ⊃
//! item`, penalties bound to the enclosing paragraph or article, and a
//! queued rubric flushed onto the next paragraph or inciso.

use crate::element::{ElementKind, LawElement, Level};
use crate::sources::common::Vigency;
use std::collections::BTreeMap;

/// Which element receives continuation lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Caput,
    Paragrafo,
    Inciso,
}

pub struct ArticleBuilder {
    articles: Vec<LawElement>,
    current: Option<LawElement>,
    paragraph_idx: Option<usize>,
    // (paragraph index when nested, inciso index within its parent)
    inciso_loc: Option<(Option<usize>, usize)>,
    context: Context,
    pending_rubric: Option<LawElement>,
}

impl Default for ArticleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArticleBuilder {
    pub fn new() -> Self {
        Self {
            articles: Vec::new(),
            current: None,
            paragraph_idx: None,
            inciso_loc: None,
            context: Context::Caput,
            pending_rubric: None,
        }
    }

    pub fn in_article(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_is_revoked(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|article| article.textually_revoked)
    }

    pub fn article_count(&self) -> usize {
        self.articles.len() + usize::from(self.current.is_some())
    }

    /// Body text of the element a continuation line would extend.
    pub fn last_body(&self) -> Option<&str> {
        let article = self.current.as_ref()?;
        let text = match self.context {
            Context::Inciso => match self.inciso_loc {
                Some((Some(pidx), iidx)) => &article.children[pidx].children[iidx].text,
                Some((None, iidx)) => &article.children[iidx].text,
                None => &article.text,
            },
            Context::Paragrafo => match self.paragraph_idx {
                Some(idx) => &article.children[idx].text,
                None => &article.text,
            },
            Context::Caput => &article.text,
        };
        Some(text.as_str())
    }

    pub fn start_article(
        &mut self,
        number: String,
        text: String,
        epigraph: String,
        vigency: Vigency,
        path: &BTreeMap<Level, String>,
    ) {
        self.flush_article();

        let mut article = LawElement::new(ElementKind::Artigo, number, text);
        article.epigraph = epigraph;
        article.in_force = vigency.in_force;
        article.textually_revoked = vigency.textually_revoked;
        article.path = path.clone();

        self.current = Some(article);
        self.pending_rubric = None;
        self.paragraph_idx = None;
        self.inciso_loc = None;
        self.context = Context::Caput;
    }

    /// A rubric inside an article waits for the next paragraph or
    /// inciso; an intervening article boundary discards it.
    pub fn queue_rubric(&mut self, text: String) {
        if self.current.is_none() {
            return;
        }
        let mut rubric = LawElement::new(ElementKind::Rubrica, "", text);
        rubric.in_force = true;
        self.pending_rubric = Some(rubric);
    }

    pub fn push_paragraph(&mut self, number: String, text: String, vigency: Vigency) {
        let rubric = self.pending_rubric.take();
        let Some(article) = self.current.as_mut() else {
            return;
        };

        if let Some(mut rubric) = rubric {
            rubric.number = number.clone();
            article.children.push(rubric);
        }

        let mut paragraph = LawElement::new(ElementKind::Paragrafo, number, text);
        paragraph.in_force = vigency.in_force;
        paragraph.textually_revoked = vigency.textually_revoked;

        article.children.push(paragraph);
        self.paragraph_idx = Some(article.children.len() - 1);
        self.inciso_loc = None;
        self.context = Context::Paragrafo;
    }

    pub fn push_inciso(&mut self, number: String, text: String, vigency: Vigency) {
        let rubric = self.pending_rubric.take();
        let paragraph_idx = self.paragraph_idx;
        let Some(article) = self.current.as_mut() else {
            return;
        };

        let target = match paragraph_idx {
            Some(idx) => &mut article.children[idx].children,
            None => &mut article.children,
        };

        if let Some(mut rubric) = rubric {
            rubric.number = number.clone();
            target.push(rubric);
        }

        let mut inciso = LawElement::new(ElementKind::Inciso, number, text);
        inciso.in_force = vigency.in_force;
        inciso.textually_revoked = vigency.textually_revoked;

        target.push(inciso);
        self.inciso_loc = Some((paragraph_idx, target.len() - 1));
        self.context = Context::Inciso;
    }

    pub fn push_alinea(&mut self, number: String, text: String, vigency: Vigency) {
        let inciso_loc = self.inciso_loc;
        let paragraph_idx = self.paragraph_idx;
        let Some(article) = self.current.as_mut() else {
            return;
        };

        let mut alinea = LawElement::new(ElementKind::Alinea, number, text);
        alinea.in_force = vigency.in_force;
        alinea.textually_revoked = vigency.textually_revoked;

        match inciso_loc {
            Some((Some(pidx), iidx)) => article.children[pidx].children[iidx].children.push(alinea),
            Some((None, iidx)) => article.children[iidx].children.push(alinea),
            None => match paragraph_idx {
                Some(pidx) => article.children[pidx].children.push(alinea),
                None => article.children.push(alinea),
            },
        }
    }

    pub fn push_item(&mut self, number: String, text: String, vigency: Vigency) {
        let inciso_loc = self.inciso_loc;
        let Some(article) = self.current.as_mut() else {
            return;
        };

        let mut item = LawElement::new(ElementKind::Item, number, text);
        item.in_force = vigency.in_force;
        item.textually_revoked = vigency.textually_revoked;

        let inciso = match inciso_loc {
            Some((Some(pidx), iidx)) => &mut article.children[pidx].children[iidx],
            Some((None, iidx)) => &mut article.children[iidx],
            None => {
                article.children.push(item);
                return;
            }
        };

        // Items nest under the inciso's last alinea when one exists.
        match inciso.children.last_mut() {
            Some(last) if last.kind == ElementKind::Alinea => last.children.push(item),
            _ => inciso.children.push(item),
        }
    }

    pub fn push_pena(&mut self, text: String, vigency: Vigency) {
        let paragraph_idx = self.paragraph_idx;
        let Some(article) = self.current.as_mut() else {
            return;
        };

        let mut pena = LawElement::new(ElementKind::Pena, "", text);
        pena.in_force = vigency.in_force;
        pena.textually_revoked = vigency.textually_revoked;

        match paragraph_idx {
            Some(idx) => article.children[idx].children.push(pena),
            None => article.children.push(pena),
        }
    }

    /// Append a continuation line to the last textual element. Returns
    /// false when no article is open.
    pub fn append_continuation(&mut self, text: &str) -> bool {
        let inciso_loc = self.inciso_loc;
        let paragraph_idx = self.paragraph_idx;
        let context = self.context;
        let Some(article) = self.current.as_mut() else {
            return false;
        };

        let target = match context {
            Context::Inciso => match inciso_loc {
                Some((Some(pidx), iidx)) => &mut article.children[pidx].children[iidx].text,
                Some((None, iidx)) => &mut article.children[iidx].text,
                None => &mut article.text,
            },
            Context::Paragrafo => match paragraph_idx {
                Some(idx) => &mut article.children[idx].text,
                None => &mut article.text,
            },
            Context::Caput => &mut article.text,
        };

        if !target.is_empty() {
            target.push(' ');
        }
        target.push_str(text);
        true
    }

    pub fn flush_article(&mut self) {
        if let Some(article) = self.current.take() {
            self.articles.push(article);
        }
        self.pending_rubric = None;
        self.paragraph_idx = None;
        self.inciso_loc = None;
        self.context = Context::Caput;
    }

    pub fn finish(mut self) -> Vec<LawElement> {
        self.flush_article();
        self.articles
    }
}
