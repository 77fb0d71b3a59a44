use crate::config::types::{CrawlerSection, FileConfig, OutputSection, UserAgentSection};
use crate::url::normalize_url;
use crate::ConfigError;

/// Validates the entire configuration file
///
/// Zero numeric values are accepted here; they are replaced by defaults when
/// the crawl starts.
pub fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    validate_crawler_section(&config.crawler)?;
    validate_user_agent_section(&config.user_agent)?;
    validate_output_section(&config.output)?;
    Ok(())
}

fn validate_crawler_section(section: &CrawlerSection) -> Result<(), ConfigError> {
    if let Some(url) = &section.url {
        normalize_url(url).map_err(|e| {
            ConfigError::Validation(format!("Invalid seed URL '{}': {}", url, e))
        })?;
    }

    Ok(())
}

fn validate_user_agent_section(section: &UserAgentSection) -> Result<(), ConfigError> {
    // Crawler name: non-empty, alphanumeric + hyphens only
    if let Some(name) = &section.name {
        if name.is_empty() {
            return Err(ConfigError::Validation(
                "user-agent name cannot be empty".to_string(),
            ));
        }

        if !name.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return Err(ConfigError::Validation(format!(
                "user-agent name must contain only alphanumeric characters and hyphens, got '{}'",
                name
            )));
        }
    }

    if let Some(version) = &section.version {
        if version.trim().is_empty() || version.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(format!(
                "user-agent version must be a single non-empty token, got '{}'",
                version
            )));
        }
    }

    Ok(())
}

fn validate_output_section(section: &OutputSection) -> Result<(), ConfigError> {
    if let Some(path) = &section.path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "output path cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}
