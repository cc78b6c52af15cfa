//! Configuration management following 12-factor app principles
//!
//! All configuration is loaded from environment variables to ensure
//! clean separation between code and config.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database connection URL (role records, orders, leads)
    pub database_url: String,

    /// Designated super-admin email (at most one)
    pub super_admin_email: Option<String>,
    /// Email patterns seeded with the admin role on first sign-in
    pub initial_admin_emails: Vec<String>,

    /// Public site URL, the only browser origin allowed to call the API
    pub app_base_url: String,

    /// Shared secret the hosted identity service signs ID tokens with
    pub jwt_secret: Option<String>,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,

    /// Serve the in-memory identity provider instead of verifying tokens.
    /// Local development only.
    pub dev_identity_provider: bool,
    /// Password accounts for the in-memory provider
    pub dev_accounts: Vec<DevAccount>,

    /// Runtime configuration
    pub rust_log: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if it exists

        let config = Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL is required"))?,

            super_admin_email: env::var("SUPER_ADMIN_EMAIL")
                .ok()
                .map(|email| email.trim().to_lowercase())
                .filter(|email| !email.is_empty()),
            initial_admin_emails: parse_email_list(
                &env::var("INITIAL_ADMIN_EMAILS").unwrap_or_default(),
            ),

            app_base_url: env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),

            jwt_secret: non_empty_var("JWT_SECRET"),
            jwt_issuer: non_empty_var("JWT_ISSUER"),
            jwt_audience: non_empty_var("JWT_AUDIENCE"),

            dev_identity_provider: env::var("DEV_IDENTITY_PROVIDER")
                .map(|value| matches!(value.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
            dev_accounts: parse_dev_accounts(&env::var("DEV_ACCOUNTS").unwrap_or_default())?,

            rust_log: env::var("RUST_LOG").unwrap_or_else(|_| "energram=debug".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
        };

        Ok(config)
    }
}

/// Login for the in-memory identity provider
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DevAccount {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for DevAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevAccount")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parse `email:password` pairs separated by commas
pub fn parse_dev_accounts(raw: &str) -> Result<Vec<DevAccount>> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| match item.split_once(':') {
            Some((email, password)) if !email.trim().is_empty() && !password.is_empty() => {
                Ok(DevAccount {
                    email: email.trim().to_lowercase(),
                    password: password.to_string(),
                })
            }
            _ => Err(anyhow::anyhow!(
                "DEV_ACCOUNTS entries must look like email:password"
            )),
        })
        .collect()
}

/// Split a comma-separated list of email patterns, dropping blanks
pub fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_email_list() {
        assert_eq!(
            parse_email_list(" Ops@Energram.com, ,*@energram.io,"),
            vec!["ops@energram.com".to_string(), "*@energram.io".to_string()]
        );
        assert!(parse_email_list("").is_empty());
    }

    #[test]
    fn test_parse_dev_accounts() {
        let accounts = parse_dev_accounts("Dev@Energram.com:pw:with:colons, ,ops@x.com:pw2").unwrap();
        assert_eq!(accounts.len(), 2);
        assert_eq!(accounts[0].email, "dev@energram.com");
        assert_eq!(accounts[0].password, "pw:with:colons");

        assert!(parse_dev_accounts("").unwrap().is_empty());
        assert!(parse_dev_accounts("no-password").is_err());
        assert!(parse_dev_accounts("dev@x.com:").is_err());
    }

    #[test]
    fn test_dev_account_debug_hides_password() {
        let account = DevAccount {
            email: "dev@x.com".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{:?}", account).contains("hunter2"));
    }

    #[test]
    #[serial]
    fn test_identity_provider_settings() {
        env::set_var("DATABASE_URL", "postgres://localhost/energram_test");
        env::set_var("JWT_SECRET", " signing-secret ");
        env::set_var("JWT_ISSUER", "");

        let config = Config::from_env().unwrap();
        assert_eq!(config.jwt_secret.as_deref(), Some("signing-secret"));
        assert!(config.jwt_issuer.is_none());
        assert!(!config.dev_identity_provider);

        env::set_var("DEV_IDENTITY_PROVIDER", "true");
        assert!(Config::from_env().unwrap().dev_identity_provider);

        env::remove_var("JWT_SECRET");
        env::remove_var("JWT_ISSUER");
        env::remove_var("DEV_IDENTITY_PROVIDER");
    }

    #[test]
    #[serial]
    fn test_config_from_env_reads_seed_policy() {
        env::set_var("DATABASE_URL", "postgres://localhost/energram_test");
        env::set_var("SUPER_ADMIN_EMAIL", " Owner@Energram.com ");
        env::set_var("INITIAL_ADMIN_EMAILS", "ops@energram.com,*@partners.energram.com");
        env::set_var("PORT", "not-a-port");

        let config = Config::from_env().unwrap();
        assert_eq!(config.super_admin_email.as_deref(), Some("owner@energram.com"));
        assert_eq!(config.initial_admin_emails.len(), 2);
        assert_eq!(config.port, 3000);

        env::remove_var("SUPER_ADMIN_EMAIL");
        env::remove_var("INITIAL_ADMIN_EMAILS");
        env::remove_var("PORT");
    }

    #[test]
    #[serial]
    fn test_config_blank_super_admin_is_none() {
        env::set_var("DATABASE_URL", "postgres://localhost/energram_test");
        env::set_var("SUPER_ADMIN_EMAIL", "   ");

        let config = Config::from_env().unwrap();
        assert!(config.super_admin_email.is_none());
        assert!(config.initial_admin_emails.is_empty());

        env::remove_var("SUPER_ADMIN_EMAIL");
    }
}
