use crate::config::types::{
    Config, ConsentConfig, DownloadConfig, DriverConfig, ExtractorConfig, ListingConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_driver_config(&config.driver)?;
    if let Some(consent) = &config.consent {
        validate_consent_config(consent)?;
    }
    validate_listing_config(&config.listing)?;
    validate_extractor_config(&config.extractor)?;
    if let Some(download) = &config.download {
        validate_download_config(download)?;
    }
    Ok(())
}

/// Validates the WebDriver endpoint settings
fn validate_driver_config(config: &DriverConfig) -> Result<(), ConfigError> {
    validate_http_url("webdriver_url", &config.webdriver_url)?;

    if config.browser.is_empty() {
        return Err(ConfigError::Validation(
            "browser cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_consent_config(config: &ConsentConfig) -> Result<(), ConfigError> {
    validate_selector("consent selector", &config.selector)
}

/// Validates listing configuration
fn validate_listing_config(config: &ListingConfig) -> Result<(), ConfigError> {
    validate_http_url("listing url", &config.url)?;
    validate_selector("next_selector", &config.next_selector)?;

    if config.disabled_marker.trim().is_empty() {
        return Err(ConfigError::Validation(
            "disabled_marker cannot be empty".to_string(),
        ));
    }

    if let Some(0) = config.max_pages {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1 when set".to_string(),
        ));
    }

    if config.output_path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "output_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_extractor_config(config: &ExtractorConfig) -> Result<(), ConfigError> {
    validate_tag_name("heading_tag", &config.heading_tag)?;
    validate_tag_name("body_tag", &config.body_tag)?;

    if config.currency_label.is_empty() {
        return Err(ConfigError::Validation(
            "currency_label cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates download configuration
fn validate_download_config(config: &DownloadConfig) -> Result<(), ConfigError> {
    validate_http_url("download url", &config.url)?;
    validate_selector("link_selector", &config.link_selector)?;

    if config.directory.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "download directory cannot be empty".to_string(),
        ));
    }

    if !config.in_progress_suffix.starts_with('.') || config.in_progress_suffix.len() < 2 {
        return Err(ConfigError::Validation(format!(
            "in_progress_suffix must look like '.ext', got '{}'",
            config.in_progress_suffix
        )));
    }

    if config.poll_interval_ms < 10 {
        return Err(ConfigError::Validation(format!(
            "poll_interval_ms must be >= 10ms, got {}ms",
            config.poll_interval_ms
        )));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Parses a URL and requires an http(s) scheme
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}

fn validate_selector(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{} cannot be empty", field)));
    }
    Ok(())
}

/// Tag names are plain element names such as `h3`
fn validate_tag_name(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Validation(format!(
            "{} must be a plain element name, got '{}'",
            field, value
        )));
    }
    Ok(())
}
