use crate::config::types::Config;
use crate::ConfigError;
use url::Url;

/// Validates a parsed configuration.
///
/// Catches the misconfigurations that would otherwise surface mid-run:
/// a seed URL the crawler cannot start from, zeroed timeouts, and a
/// classifier switched on without an endpoint.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_seed_url(&config.site.url)?;

    if config.crawler.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be greater than 0".to_string(),
        ));
    }

    if config.user_agent.crawler_name.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name must not be empty".to_string(),
        ));
    }

    if !config.user_agent.contact_email.contains('@') {
        return Err(ConfigError::Validation(format!(
            "contact-email does not look like an email address: {}",
            config.user_agent.contact_email
        )));
    }

    if config.output.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database-path must not be empty".to_string(),
        ));
    }

    if config.output.report_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "report-path must not be empty".to_string(),
        ));
    }

    if config.classifier.enabled {
        if config.classifier.endpoint.is_none() {
            return Err(ConfigError::Validation(
                "classifier.endpoint is required when the classifier is enabled".to_string(),
            ));
        }
        if config.classifier.batch_size == 0 {
            return Err(ConfigError::Validation(
                "classifier.batch-size must be greater than 0".to_string(),
            ));
        }
        if config.classifier.workers == 0 {
            return Err(ConfigError::Validation(
                "classifier.workers must be greater than 0".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_seed_url(url: &str) -> Result<(), ConfigError> {
    let parsed =
        Url::parse(url).map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", url, e)))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{}: only http and https are supported",
            url
        )));
    }

    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!("{}: missing host", url)));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{
        ClassifierConfig, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig,
    };

    fn valid_config() -> Config {
        Config {
            site: SiteConfig {
                url: "https://example.com/".to_string(),
            },
            crawler: CrawlerConfig::default(),
            user_agent: UserAgentConfig {
                crawler_name: "AuditBot".to_string(),
                crawler_version: "1.0".to_string(),
                contact_url: "https://example.com/bot".to_string(),
                contact_email: "bot@example.com".to_string(),
            },
            output: OutputConfig {
                database_path: "./audit.db".to_string(),
                report_path: "./report.md".to_string(),
                json_path: None,
            },
            classifier: ClassifierConfig::default(),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_rejects_bad_seed_url() {
        let mut config = valid_config();
        config.site.url = "not a url".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));

        config.site.url = "ftp://example.com/".to_string();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let mut config = valid_config();
        config.crawler.request_timeout_secs = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_empty_crawler_name() {
        let mut config = valid_config();
        config.user_agent.crawler_name = "  ".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_rejects_bad_contact_email() {
        let mut config = valid_config();
        config.user_agent.contact_email = "not-an-email".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_classifier_enabled_requires_endpoint() {
        let mut config = valid_config();
        config.classifier.enabled = true;
        assert!(validate(&config).is_err());

        config.classifier.endpoint = Some("https://classify.example.com/v1".to_string());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_classifier_disabled_skips_classifier_checks() {
        let mut config = valid_config();
        config.classifier.enabled = false;
        config.classifier.batch_size = 0;
        assert!(validate(&config).is_ok());
    }
}
