//! Configuration module for the studio backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// What happens to projects still referencing a category or tag when it is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxonomyDeletePolicy {
    /// Delete the classifier and leave dangling references in place.
    AllowOrphan,
    /// Refuse the delete while any project references the classifier.
    Block,
    /// Scrub the reference from every project, then delete, in one transaction.
    Cascade,
}

impl TaxonomyDeletePolicy {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "allow" | "allow-orphan" => Some(TaxonomyDeletePolicy::AllowOrphan),
            "block" => Some(TaxonomyDeletePolicy::Block),
            "cascade" => Some(TaxonomyDeletePolicy::Cascade),
            _ => None,
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Admin panel password (auth is disabled when unset)
    pub admin_password: Option<String>,
    /// Path to SQLite database file
    pub db_path: PathBuf,
    /// Directory holding uploaded media files
    pub media_dir: PathBuf,
    /// Directory holding legacy JSON exports awaiting one-time import
    pub legacy_dir: PathBuf,
    /// Base URL prepended to media paths to form public URLs
    pub public_base_url: String,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Staleness window for the portfolio read cache
    pub cache_ttl: Duration,
    /// Behavior when deleting a referenced category or tag
    pub taxonomy_delete: TaxonomyDeletePolicy,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let admin_password = env::var("STUDIO_ADMIN_PASSWORD").ok();

        let db_path = env::var("STUDIO_DB_PATH")
            .unwrap_or_else(|_| "./data/app.sqlite".to_string())
            .into();

        let media_dir = env::var("STUDIO_MEDIA_DIR")
            .unwrap_or_else(|_| "./data/media".to_string())
            .into();

        let legacy_dir = env::var("STUDIO_LEGACY_DIR")
            .unwrap_or_else(|_| "./data/legacy".to_string())
            .into();

        let public_base_url = env::var("STUDIO_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string());

        let bind_addr = env::var("STUDIO_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid STUDIO_BIND_ADDR format");

        let cache_ttl_secs: u64 = env::var("STUDIO_CACHE_TTL_SECS")
            .unwrap_or_else(|_| "300".to_string())
            .parse()
            .expect("Invalid STUDIO_CACHE_TTL_SECS format");

        let taxonomy_delete = match env::var("STUDIO_TAXONOMY_DELETE") {
            Ok(value) => TaxonomyDeletePolicy::parse(&value)
                .expect("Invalid STUDIO_TAXONOMY_DELETE (expected allow, block, or cascade)"),
            Err(_) => TaxonomyDeletePolicy::AllowOrphan,
        };

        let log_level = env::var("STUDIO_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Self {
            admin_password,
            db_path,
            media_dir,
            legacy_dir,
            public_base_url,
            bind_addr,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            taxonomy_delete,
            log_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        // Clear any existing env vars
        env::remove_var("STUDIO_ADMIN_PASSWORD");
        env::remove_var("STUDIO_DB_PATH");
        env::remove_var("STUDIO_MEDIA_DIR");
        env::remove_var("STUDIO_LEGACY_DIR");
        env::remove_var("STUDIO_PUBLIC_BASE_URL");
        env::remove_var("STUDIO_BIND_ADDR");
        env::remove_var("STUDIO_CACHE_TTL_SECS");
        env::remove_var("STUDIO_TAXONOMY_DELETE");
        env::remove_var("STUDIO_LOG_LEVEL");

        let config = Config::from_env();

        assert!(config.admin_password.is_none());
        assert_eq!(config.db_path, PathBuf::from("./data/app.sqlite"));
        assert_eq!(config.media_dir, PathBuf::from("./data/media"));
        assert_eq!(config.legacy_dir, PathBuf::from("./data/legacy"));
        assert_eq!(config.public_base_url, "http://127.0.0.1:8080");
        assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.taxonomy_delete, TaxonomyDeletePolicy::AllowOrphan);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_taxonomy_policy_parsing() {
        assert_eq!(
            TaxonomyDeletePolicy::parse("allow"),
            Some(TaxonomyDeletePolicy::AllowOrphan)
        );
        assert_eq!(
            TaxonomyDeletePolicy::parse("allow-orphan"),
            Some(TaxonomyDeletePolicy::AllowOrphan)
        );
        assert_eq!(
            TaxonomyDeletePolicy::parse("block"),
            Some(TaxonomyDeletePolicy::Block)
        );
        assert_eq!(
            TaxonomyDeletePolicy::parse("cascade"),
            Some(TaxonomyDeletePolicy::Cascade)
        );
        assert_eq!(TaxonomyDeletePolicy::parse("purge"), None);
    }
}
