//! Rendering collaborators
//!
//! A renderer turns a URL into the HTML of the loaded page. Everything after
//! that is done by the extraction pipeline, so renderers know nothing about
//! output modes.
//!
//! Built-in renderers:
//! - [`BrowserRenderer`] - headless Chromium, runs page JavaScript
//! - [`HttpRenderer`] - plain HTTP GET, for static pages

mod browser;
mod http;

pub use browser::BrowserRenderer;
pub use http::HttpRenderer;

use crate::client::FetchOptions;
use crate::error::FetchError;
use crate::types::RendererKind;
use async_trait::async_trait;

/// HTML of a loaded page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPage {
    /// Document HTML as the renderer saw it
    pub html: String,
    /// URL after redirects, if the renderer knows it
    pub final_url: Option<String>,
}

/// Trait for page renderers
///
/// Implementations own whatever they need to load a page (a browser
/// process, an HTTP client) and must release it before returning, on
/// success and on failure alike.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Identifier for logging
    fn name(&self) -> &'static str;

    /// Which kind of renderer this is
    fn kind(&self) -> RendererKind;

    /// Load `url` and return its HTML
    ///
    /// The URL has already been validated by the caller.
    async fn render(&self, url: &str, options: &FetchOptions) -> Result<RenderedPage, FetchError>;
}

/// Create the renderer for a [`RendererKind`]
pub fn renderer_for(kind: RendererKind) -> Box<dyn Renderer> {
    match kind {
        RendererKind::Browser => Box::new(BrowserRenderer::new()),
        RendererKind::Http => Box::new(HttpRenderer::new()),
    }
}
