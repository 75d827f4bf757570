//! Live [`Page`] backed by a running Chromium over the DevTools protocol.

use chromiumoxide::{Browser, Element, Page as Tab};
use futures::StreamExt;

use crate::error::PageError;
use crate::page::Page;

const WATCH_URL_MARKER: &str = "youtube.com/watch";

pub struct CdpPage {
    tab: Tab,
}

impl CdpPage {
    #[must_use]
    pub fn new(tab: Tab) -> Self {
        Self { tab }
    }

    /// Connect to the browser at `cdp_url` and attach to the first open
    /// watch page.
    ///
    /// The returned [`Browser`] must be kept alive for as long as the page
    /// is used.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Backend`] if the browser is unreachable or no
    /// watch page is open.
    pub async fn connect(cdp_url: &str) -> Result<(Browser, Self), PageError> {
        let (browser, mut handler) = Browser::connect(cdp_url).await?;
        tokio::spawn(async move { while handler.next().await.is_some() {} });

        for tab in browser.pages().await? {
            let url = tab.url().await?;
            if url.as_deref().is_some_and(|u| u.contains(WATCH_URL_MARKER)) {
                tracing::info!(
                    cdp_url,
                    url = url.as_deref().unwrap_or_default(),
                    "attached to watch page"
                );
                return Ok((browser, Self::new(tab)));
            }
        }
        Err(PageError::Backend(format!(
            "no open {WATCH_URL_MARKER} page found at {cdp_url}"
        )))
    }

    async fn eval<T: serde::de::DeserializeOwned>(&self, script: String) -> Result<T, PageError> {
        self.tab
            .evaluate(script)
            .await?
            .into_value::<T>()
            .map_err(|e| PageError::Backend(format!("unexpected script result: {e}")))
    }

    async fn run(&self, script: String) -> Result<(), PageError> {
        self.tab.evaluate(script).await?;
        Ok(())
    }
}

impl Page for CdpPage {
    type Node = Element;

    async fn query_all(
        &self,
        scope: Option<&Element>,
        selector: &str,
    ) -> Result<Vec<Element>, PageError> {
        let found = match scope {
            Some(element) => element.find_elements(selector).await?,
            None => self.tab.find_elements(selector).await?,
        };
        Ok(found)
    }

    async fn text(&self, node: &Element) -> Result<Option<String>, PageError> {
        Ok(node.inner_text().await?)
    }

    async fn attribute(&self, node: &Element, name: &str) -> Result<Option<String>, PageError> {
        Ok(node.attribute(name).await?)
    }

    async fn click(&self, node: &Element) -> Result<(), PageError> {
        node.click().await?;
        Ok(())
    }

    async fn fill(&self, node: &Element, text: &str) -> Result<(), PageError> {
        let literal = serde_json::to_string(text)
            .map_err(|e| PageError::Backend(format!("cannot encode reply text: {e}")))?;
        node.call_js_fn(
            format!(
                "function() {{ this.focus(); this.textContent = {literal}; \
                 this.dispatchEvent(new InputEvent('input', {{ bubbles: true }})); }}"
            ),
            false,
        )
        .await?;
        Ok(())
    }

    async fn scroll_into_view(&self, node: &Element) -> Result<(), PageError> {
        node.scroll_into_view().await?;
        Ok(())
    }

    async fn scroll_by(&self, dy: i64) -> Result<(), PageError> {
        self.run(format!("window.scrollBy(0, {dy})")).await
    }

    async fn scroll_position(&self) -> Result<i64, PageError> {
        let y: f64 = self.eval("window.scrollY".to_string()).await?;
        #[allow(clippy::cast_possible_truncation)]
        Ok(y.round() as i64)
    }

    async fn scroll_to(&self, y: i64, smooth: bool) -> Result<(), PageError> {
        let behavior = if smooth { "smooth" } else { "auto" };
        self.run(format!(
            "window.scrollTo({{ top: {y}, behavior: '{behavior}' }})"
        ))
        .await
    }

    async fn viewport(&self) -> Result<(u32, u32), PageError> {
        self.eval("[window.innerWidth, window.innerHeight]".to_string())
            .await
    }

    async fn pointer_move(&self, x: u32, y: u32) -> Result<(), PageError> {
        self.run(format!(
            "document.dispatchEvent(new MouseEvent('mousemove', \
             {{ clientX: {x}, clientY: {y}, bubbles: true }}))"
        ))
        .await
    }
}
