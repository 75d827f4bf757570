//! The rendered document as the engine sees it.
//!
//! Implementations only read text and attributes and issue scroll, click,
//! input and pointer side effects; they never navigate. Node handles are
//! short-lived: the host page may recycle the underlying element at any
//! suspension point, so callers re-query before each interaction.

use crate::error::PageError;

#[allow(async_fn_in_trait)]
pub trait Page {
    /// Handle to one element of the document.
    type Node;

    /// All elements matching `selector` in document order, searched under
    /// `scope` or across the whole document when `scope` is `None`.
    async fn query_all(
        &self,
        scope: Option<&Self::Node>,
        selector: &str,
    ) -> Result<Vec<Self::Node>, PageError>;

    /// Text content of `node`.
    async fn text(&self, node: &Self::Node) -> Result<Option<String>, PageError>;

    async fn attribute(&self, node: &Self::Node, name: &str)
        -> Result<Option<String>, PageError>;

    async fn click(&self, node: &Self::Node) -> Result<(), PageError>;

    /// Replace the editable content of `node` with `text` and dispatch the
    /// content-changed notification the host page listens for.
    async fn fill(&self, node: &Self::Node, text: &str) -> Result<(), PageError>;

    async fn scroll_into_view(&self, node: &Self::Node) -> Result<(), PageError>;

    async fn scroll_by(&self, dy: i64) -> Result<(), PageError>;

    /// Current vertical scroll offset in pixels.
    async fn scroll_position(&self) -> Result<i64, PageError>;

    async fn scroll_to(&self, y: i64, smooth: bool) -> Result<(), PageError>;

    /// Viewport `(width, height)` in CSS pixels.
    async fn viewport(&self) -> Result<(u32, u32), PageError>;

    /// Dispatch a synthetic pointer-move notification at `(x, y)`.
    async fn pointer_move(&self, x: u32, y: u32) -> Result<(), PageError>;
}
