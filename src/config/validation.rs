use crate::config::types::{
    Config, CrawlerConfig, InputConfig, OutputConfig, SiteConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Largest listing page the API serves in one response
const MAX_PER_PAGE: u32 = 2000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_site_config(&config.site)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_input_config(&config.input)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the target site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' cannot be used as an API root",
            config.base_url
        )));
    }

    if config.city_uuid.is_nil() {
        return Err(ConfigError::Validation(
            "city-uuid cannot be the nil UUID".to_string(),
        ));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.per_page < 1 || config.per_page > MAX_PER_PAGE {
        return Err(ConfigError::Validation(format!(
            "per_page must be between 1 and {}, got {}",
            MAX_PER_PAGE, config.per_page
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.max_concurrent_requests < 1 || config.max_concurrent_requests > 100 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_requests must be between 1 and 100, got {}",
            config.max_concurrent_requests
        )));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout must be >= 1s, got {}s",
            config.request_timeout
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if let Some(value) = &config.override_value {
        if value.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user-agent override cannot be blank".to_string(),
            ));
        }
        return Ok(());
    }

    let name = &config.crawler_name;
    if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '-') {
        return Err(ConfigError::Validation(format!(
            "crawler-name must be non-empty and use only letters, digits and hyphens, got '{}'",
            name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("contact-url: {}", e)))?;

    validate_email(&config.contact_email)
}

/// Validates the seed list location
fn validate_input_config(config: &InputConfig) -> Result<(), ConfigError> {
    if config.seed_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "seed_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.items_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "items_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Checks that a contact address looks like `local@domain.tld`
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "contact-email '{}' has no '@'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "contact-email '{}' is malformed",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "contact-email '{}' needs a qualified domain",
            email
        )));
    }

    Ok(())
}
