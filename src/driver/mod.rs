//! Browser driver capability
//!
//! The harvesting logic never talks to a browser directly. It goes through
//! the [`Driver`] trait, which exposes the handful of operations the listing
//! and download flows need:
//! - fetching the rendered (script-executed) page content
//! - locating an element and reading its attributes
//! - clicking an element
//! - releasing the underlying browser session
//!
//! [`WebDriverClient`] implements the trait over the W3C WebDriver protocol.

mod webdriver;

pub use webdriver::{session_capabilities, WebDriverClient};

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Errors raised at the driver boundary
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("No element matches {0}")]
    NotFound(String),

    #[error("Interaction failed: {0}")]
    Interaction(String),

    #[error("Driver session unusable: {0}")]
    Unavailable(String),

    #[error("HTTP error talking to driver: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected driver response: {0}")]
    Protocol(String),
}

impl DriverError {
    /// Returns true if the capability itself can no longer be used
    ///
    /// Element lookup and click failures are not fatal; a dead session, a
    /// broken transport, or a response we cannot understand are.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Unavailable(_) | Self::Http(_) | Self::Protocol(_)
        )
    }
}

/// Result type for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// How a selector string is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectorKind {
    Css,
    XPath,
    Id,
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Css => "css",
            Self::XPath => "xpath",
            Self::Id => "id",
        };
        write!(f, "{}", name)
    }
}

/// A selector together with its kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub kind: SelectorKind,
    pub selector: String,
}

impl Locator {
    pub fn new(kind: SelectorKind, selector: impl Into<String>) -> Self {
        Self {
            kind,
            selector: selector.into(),
        }
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(SelectorKind::Css, selector)
    }

    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::new(SelectorKind::XPath, selector)
    }

    pub fn id(selector: impl Into<String>) -> Self {
        Self::new(SelectorKind::Id, selector)
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind, self.selector)
    }
}

/// Opaque reference to an element on the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementHandle {
    id: String,
}

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Capability to drive one rendered browser page
///
/// A driver is exclusively owned by a single session; every method takes
/// `&mut self` so no two components can use it at once.
#[async_trait]
pub trait Driver: Send {
    /// Loads a URL in the current window
    async fn navigate(&mut self, url: &str) -> DriverResult<()>;

    /// Returns a snapshot of the rendered document
    async fn fetch_rendered_content(&mut self) -> DriverResult<Vec<u8>>;

    /// Locates the first element matching `locator`
    ///
    /// `Ok(None)` means the element is absent. Implementations may also
    /// report absence as [`DriverError::NotFound`].
    async fn find_element(&mut self, locator: &Locator) -> DriverResult<Option<ElementHandle>>;

    async fn click(&mut self, element: &ElementHandle) -> DriverResult<()>;

    async fn attribute_of(
        &mut self,
        element: &ElementHandle,
        name: &str,
    ) -> DriverResult<Option<String>>;

    /// Ends the browser session; calling it twice is a no-op
    async fn release(&mut self) -> DriverResult<()>;
}
