use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Reads, parses and validates the TOML file at `path`
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    parse_config(&std::fs::read_to_string(path)?)
}

fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

fn fingerprint(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Hex SHA-256 of the raw config file
///
/// The fingerprint is logged at startup and reported with the run
/// statistics so exported feeds can be traced back to their settings.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    Ok(fingerprint(&std::fs::read_to_string(path)?))
}

/// Loads the config and fingerprints the same bytes in one read
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, fingerprint(&content)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    const MINIMAL: &str = r#"
[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"
"#;

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[site]
base-url = "https://shop.example.com/web-api/v1/"
city-uuid = "4a70f9e0-46ae-11e7-83ff-00155d026416"

[crawler]
per-page = 100
max-pages = 3
download-delay = 500
max-concurrent-requests = 4

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[input]
seed-path = "./seeds.txt"

[output]
items-path = "./items.json"
store-empty = true
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.site.base_url, "https://shop.example.com/web-api/v1/");
        assert_eq!(config.crawler.per_page, 100);
        assert_eq!(config.crawler.max_pages, 3);
        assert_eq!(config.crawler.download_delay, 500);
        assert_eq!(config.crawler.max_concurrent_requests, 4);
        assert_eq!(config.user_agent.crawler_name, "TestCrawler");
        assert_eq!(config.input.seed_path, "./seeds.txt");
        assert!(config.output.store_empty);
    }

    #[test]
    fn test_defaults_fill_missing_sections() {
        let file = create_temp_config(MINIMAL);
        let config = load_config(file.path()).unwrap();

        assert_eq!(
            config.site.city_uuid.to_string(),
            crate::config::DEFAULT_CITY_UUID
        );
        assert_eq!(config.crawler.per_page, 4);
        assert_eq!(config.crawler.max_pages, 1);
        assert_eq!(config.crawler.download_delay, 2000);
        assert_eq!(config.input.seed_path, "start_urls.txt");
        assert_eq!(config.output.items_path, "result.json");
        assert!(!config.output.store_empty);
    }

    #[test]
    fn test_user_agent_override() {
        let content = format!("{}override = \"Mozilla/5.0 (X11; Linux x86_64)\"\n", MINIMAL);
        let file = create_temp_config(&content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(
            config.user_agent.header_value(),
            "Mozilla/5.0 (X11; Linux x86_64)"
        );
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/alkoteka.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_broken_toml_is_parse_error() {
        let file = create_temp_config("[site\nbase-url = ");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_bad_city_uuid() {
        let content = format!("{}\n[site]\ncity-uuid = \"krasnodar\"\n", MINIMAL);
        let file = create_temp_config(&content);
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let content = format!("{}\n[crawler]\nper-page = 0\n", MINIMAL);
        let file = create_temp_config(&content);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_config_hash_tracks_content() {
        let file = create_temp_config(MINIMAL);
        let (_, hash) = load_config_with_hash(file.path()).unwrap();

        assert_eq!(hash, compute_config_hash(file.path()).unwrap());
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));

        let edited = create_temp_config(&format!("{}\n[crawler]\nmax-pages = 2\n", MINIMAL));
        assert_ne!(hash, compute_config_hash(edited.path()).unwrap());
    }
}
