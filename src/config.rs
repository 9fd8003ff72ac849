// src/config.rs
// =============================================================================
// Typed configuration values.
//
// Nothing here is global: the CLI builds these once (from flags and
// environment variables, see cli.rs) and hands them to whoever needs them.
// Tests build them by hand and point the GitHub hosts at a mock server.
// =============================================================================

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::cli::GlobalArgs;

/// Default GitHub REST API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Host that serves raw file contents by owner/repo/branch/path.
pub const DEFAULT_RAW_BASE: &str = "https://raw.githubusercontent.com";

/// Deadline for small metadata calls (repository info, branch list).
pub const METADATA_TIMEOUT: Duration = Duration::from_secs(15);

/// Deadline for tree listings and file downloads.
pub const TRANSFER_TIMEOUT: Duration = Duration::from_secs(30);

/// How to reach GitHub.
#[derive(Clone)]
pub struct GithubConfig {
    pub api_base: String,
    pub raw_base: String,
    /// Optional bearer token, sent to both the API and the raw host
    pub token: Option<String>,
    pub metadata_timeout: Duration,
    pub transfer_timeout: Duration,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            raw_base: DEFAULT_RAW_BASE.to_string(),
            token: None,
            metadata_timeout: METADATA_TIMEOUT,
            transfer_timeout: TRANSFER_TIMEOUT,
        }
    }
}

// Custom Debug so the token never ends up in logs
impl fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubConfig")
            .field("api_base", &self.api_base)
            .field("raw_base", &self.raw_base)
            .field("has_token", &self.token.is_some())
            .field("metadata_timeout", &self.metadata_timeout)
            .field("transfer_timeout", &self.transfer_timeout)
            .finish()
    }
}

impl GithubConfig {
    /// Same defaults, but both hosts replaced by `base` (used against mock servers).
    #[cfg(test)]
    pub fn with_base(base: &str) -> Self {
        Self {
            api_base: base.trim_end_matches('/').to_string(),
            raw_base: base.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }
}

/// Where imported files and the assignment ledger live.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub storage_root: PathBuf,
    pub ledger_path: PathBuf,
    /// Width of the download stream during an import; 1 means one file at a time
    pub download_concurrency: usize,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub github: GithubConfig,
    pub storage: StorageConfig,
}

impl From<&GlobalArgs> for AppConfig {
    fn from(args: &GlobalArgs) -> Self {
        let token = args
            .github_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        Self {
            github: GithubConfig {
                api_base: args.api_base.trim_end_matches('/').to_string(),
                raw_base: args.raw_base.trim_end_matches('/').to_string(),
                token,
                metadata_timeout: METADATA_TIMEOUT,
                transfer_timeout: TRANSFER_TIMEOUT,
            },
            storage: StorageConfig {
                storage_root: args.storage_dir.clone(),
                ledger_path: args.ledger.clone(),
                download_concurrency: args.download_concurrency.max(1),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_defaults_point_at_github() {
        let config = GithubConfig::default();
        assert_eq!(config.api_base, "https://api.github.com");
        assert_eq!(config.raw_base, "https://raw.githubusercontent.com");
        assert!(config.token.is_none());
    }

    #[test]
    fn test_debug_hides_token() {
        let config = GithubConfig {
            token: Some("ghp_secret".to_string()),
            ..GithubConfig::default()
        };
        let printed = format!("{:?}", config);
        assert!(!printed.contains("ghp_secret"));
        assert!(printed.contains("has_token: true"));
    }

    #[test]
    fn test_from_args_trims_and_clamps() {
        let cli = Cli::parse_from([
            "edu-importer",
            "--api-base",
            "http://localhost:9000/",
            "--github-token",
            "  ",
            "--download-concurrency",
            "0",
            "list",
        ]);
        let config = AppConfig::from(&cli.global);

        assert_eq!(config.github.api_base, "http://localhost:9000");
        assert!(config.github.token.is_none());
        assert_eq!(config.storage.download_concurrency, 1);
    }
}
