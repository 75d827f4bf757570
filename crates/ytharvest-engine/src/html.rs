//! Read-only [`Page`] over a saved HTML document.
//!
//! Scrolling only moves a virtual offset, so a collection run over a
//! snapshot sees every rendered thread on its first pass and then stagnates.
//! Clicks and input are rejected.

use std::cell::Cell;

use scraper::{ElementRef, Html, Selector};

use crate::error::PageError;
use crate::page::Page;

const DEFAULT_VIEWPORT: (u32, u32) = (1280, 720);

/// Element handle: position of the element in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HtmlNode(usize);

pub struct HtmlPage {
    document: Html,
    scroll_y: Cell<i64>,
}

impl HtmlPage {
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
            scroll_y: Cell::new(0),
        }
    }

    fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> {
        self.document
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
    }

    fn element(&self, node: HtmlNode) -> Result<ElementRef<'_>, PageError> {
        self.elements().nth(node.0).ok_or(PageError::Detached)
    }

    /// Map matched elements back to their document-order positions.
    ///
    /// `matches` must itself be in document order, which `select` guarantees.
    fn positions(&self, matches: &[ElementRef<'_>]) -> Vec<HtmlNode> {
        let mut out = Vec::with_capacity(matches.len());
        let mut pending = matches.iter().peekable();
        for (idx, element) in self.elements().enumerate() {
            match pending.peek() {
                Some(m) if m.id() == element.id() => {
                    out.push(HtmlNode(idx));
                    pending.next();
                }
                Some(_) => {}
                None => break,
            }
        }
        out
    }
}

impl Page for HtmlPage {
    type Node = HtmlNode;

    async fn query_all(
        &self,
        scope: Option<&HtmlNode>,
        selector: &str,
    ) -> Result<Vec<HtmlNode>, PageError> {
        let parsed = Selector::parse(selector).map_err(|e| PageError::InvalidSelector {
            selector: selector.to_string(),
            reason: format!("{e:?}"),
        })?;

        let matches: Vec<ElementRef<'_>> = match scope {
            Some(node) => {
                let root = self.element(*node)?;
                root.select(&parsed).filter(|m| m.id() != root.id()).collect()
            }
            None => self.document.select(&parsed).collect(),
        };
        Ok(self.positions(&matches))
    }

    async fn text(&self, node: &HtmlNode) -> Result<Option<String>, PageError> {
        let element = self.element(*node)?;
        Ok(Some(element.text().collect::<String>()))
    }

    async fn attribute(&self, node: &HtmlNode, name: &str) -> Result<Option<String>, PageError> {
        let element = self.element(*node)?;
        Ok(element.value().attr(name).map(str::to_string))
    }

    async fn click(&self, _node: &HtmlNode) -> Result<(), PageError> {
        Err(PageError::Unsupported("click on a static snapshot"))
    }

    async fn fill(&self, _node: &HtmlNode, _text: &str) -> Result<(), PageError> {
        Err(PageError::Unsupported("input on a static snapshot"))
    }

    async fn scroll_into_view(&self, node: &HtmlNode) -> Result<(), PageError> {
        self.element(*node).map(|_| ())
    }

    async fn scroll_by(&self, dy: i64) -> Result<(), PageError> {
        self.scroll_y.set((self.scroll_y.get() + dy).max(0));
        Ok(())
    }

    async fn scroll_position(&self) -> Result<i64, PageError> {
        Ok(self.scroll_y.get())
    }

    async fn scroll_to(&self, y: i64, _smooth: bool) -> Result<(), PageError> {
        self.scroll_y.set(y.max(0));
        Ok(())
    }

    async fn viewport(&self) -> Result<(u32, u32), PageError> {
        Ok(DEFAULT_VIEWPORT)
    }

    async fn pointer_move(&self, _x: u32, _y: u32) -> Result<(), PageError> {
        Ok(())
    }
}
