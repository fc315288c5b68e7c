use crate::config::types::{
    Config, CrawlerConfig, IndexerConfig, OutputConfig, SourceConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Upper bound for any per-call batch size
const MAX_BATCH_SIZE: u32 = 500;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_indexer_config(&config.indexer)?;
    validate_source_config(&config.source)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_batch_size("crawler.batch_size", config.batch_size)?;

    if config.max_consecutive_failures < 1 {
        return Err(ConfigError::Validation(format!(
            "max_consecutive_failures must be >= 1, got {}",
            config.max_consecutive_failures
        )));
    }

    if config.recrawl_window <= 0 {
        return Err(ConfigError::Validation(format!(
            "recrawl_window must be positive, got {}s",
            config.recrawl_window
        )));
    }

    if config.failure_penalty <= 0 {
        return Err(ConfigError::Validation(format!(
            "failure_penalty must be positive, got {}s",
            config.failure_penalty
        )));
    }

    validate_commit_frequency("crawler.commit_frequency", config.commit_frequency)
}

/// Validates index builder configuration
fn validate_indexer_config(config: &IndexerConfig) -> Result<(), ConfigError> {
    validate_batch_size("indexer.batch_size", config.batch_size)?;
    validate_commit_frequency("indexer.commit_frequency", config.commit_frequency)?;

    if let Some(path) = &config.stop_words_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "stop_words_path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates document source configuration
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.api_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid api_url: {}", e)))?;

    if url.scheme() != "https" && url.scheme() != "http" {
        return Err(ConfigError::Validation(format!(
            "api_url must use http or https, got '{}'",
            config.api_url
        )));
    }

    if config.minimum_request_interval < 100 {
        return Err(ConfigError::Validation(format!(
            "minimum_request_interval must be >= 100ms, got {}ms",
            config.minimum_request_interval
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_batch_size(name: &str, value: u32) -> Result<(), ConfigError> {
    if value < 1 || value > MAX_BATCH_SIZE {
        return Err(ConfigError::Validation(format!(
            "{} must be between 1 and {}, got {}",
            name, MAX_BATCH_SIZE, value
        )));
    }
    Ok(())
}

fn validate_commit_frequency(name: &str, value: u32) -> Result<(), ConfigError> {
    if value < 1 {
        return Err(ConfigError::Validation(format!(
            "{} must be >= 1, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
