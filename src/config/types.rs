use crate::driver::{Locator, SelectorKind};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for Bourse-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub driver: DriverConfig,
    #[serde(default)]
    pub consent: Option<ConsentConfig>,
    pub listing: ListingConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub download: Option<DownloadConfig>,
}

/// WebDriver endpoint and browser session options
#[derive(Debug, Clone, Deserialize)]
pub struct DriverConfig {
    /// Base URL of a running chromedriver/geckodriver
    #[serde(rename = "webdriver-url")]
    pub webdriver_url: String,

    /// Browser name requested in the session capabilities
    #[serde(default = "default_browser")]
    pub browser: String,

    /// Run the browser without a window
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Pause after the initial navigation before touching the page (milliseconds)
    #[serde(rename = "page-load-delay-ms", default = "default_page_load_delay")]
    pub page_load_delay_ms: u64,
}

/// One-time interstitial consent control
#[derive(Debug, Clone, Deserialize)]
pub struct ConsentConfig {
    #[serde(rename = "selector-kind", default = "default_id_kind")]
    pub selector_kind: SelectorKind,

    pub selector: String,

    /// Pause after dismissing so the overlay can disappear (milliseconds)
    #[serde(rename = "dismiss-delay-ms", default = "default_dismiss_delay")]
    pub dismiss_delay_ms: u64,
}

/// Paginated listing to harvest
#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    pub url: String,

    #[serde(rename = "next-selector-kind", default = "default_xpath_kind")]
    pub next_selector_kind: SelectorKind,

    /// Locator of the "next page" control
    #[serde(rename = "next-selector")]
    pub next_selector: String,

    /// Class token marking the next control as disabled
    #[serde(rename = "disabled-marker", default = "default_disabled_marker")]
    pub disabled_marker: String,

    /// Pause after clicking next before fetching again (milliseconds)
    #[serde(rename = "settle-delay-ms", default = "default_settle_delay")]
    pub settle_delay_ms: u64,

    /// Optional hard stop on the number of pages fetched
    #[serde(rename = "max-pages", default)]
    pub max_pages: Option<u32>,

    /// Destination CSV file
    #[serde(rename = "output-path")]
    pub output_path: PathBuf,
}

/// Markup shape and field markers of listing entries
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractorConfig {
    #[serde(rename = "heading-tag", default = "default_heading_tag")]
    pub heading_tag: String,

    #[serde(rename = "body-tag", default = "default_body_tag")]
    pub body_tag: String,

    /// Token preceding the dividend amount, e.g. "Kes."
    #[serde(rename = "currency-label", default = "default_currency_label")]
    pub currency_label: String,
}

/// Single-file download flow
#[derive(Debug, Clone, Deserialize)]
pub struct DownloadConfig {
    pub url: String,

    #[serde(rename = "link-selector-kind", default = "default_css_kind")]
    pub link_selector_kind: SelectorKind,

    #[serde(rename = "link-selector")]
    pub link_selector: String,

    /// Directory the browser saves into
    pub directory: PathBuf,

    #[serde(rename = "in-progress-suffix", default = "default_in_progress_suffix")]
    pub in_progress_suffix: String,

    #[serde(rename = "poll-interval-ms", default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            heading_tag: default_heading_tag(),
            body_tag: default_body_tag(),
            currency_label: default_currency_label(),
        }
    }
}

impl ConsentConfig {
    pub fn locator(&self) -> Locator {
        Locator::new(self.selector_kind, &self.selector)
    }

    pub fn dismiss_delay(&self) -> Duration {
        Duration::from_millis(self.dismiss_delay_ms)
    }
}

impl ListingConfig {
    pub fn next_locator(&self) -> Locator {
        Locator::new(self.next_selector_kind, &self.next_selector)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl DownloadConfig {
    pub fn link_locator(&self) -> Locator {
        Locator::new(self.link_selector_kind, &self.link_selector)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl DriverConfig {
    pub fn page_load_delay(&self) -> Duration {
        Duration::from_millis(self.page_load_delay_ms)
    }
}

fn default_browser() -> String {
    "chrome".to_string()
}

fn default_true() -> bool {
    true
}

fn default_page_load_delay() -> u64 {
    3000
}

fn default_dismiss_delay() -> u64 {
    2000
}

fn default_settle_delay() -> u64 {
    2000
}

fn default_id_kind() -> SelectorKind {
    SelectorKind::Id
}

fn default_xpath_kind() -> SelectorKind {
    SelectorKind::XPath
}

fn default_css_kind() -> SelectorKind {
    SelectorKind::Css
}

fn default_disabled_marker() -> String {
    "inactive".to_string()
}

fn default_heading_tag() -> String {
    "h3".to_string()
}

fn default_body_tag() -> String {
    "p".to_string()
}

fn default_currency_label() -> String {
    "Kes.".to_string()
}

fn default_in_progress_suffix() -> String {
    ".crdownload".to_string()
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    300
}
