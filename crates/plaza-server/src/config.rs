use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use plaza_community::CommunityConfig;
use plaza_types::paging::SortOrder;

/// Secrets that ship in sample `.env` files and must never reach production.
const PLACEHOLDER_SECRETS: &[&str] = &["dev-secret-change-me", "changeme", "secret", "change-me"];

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub admin_emails: Vec<String>,
    pub community: CommunityConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup so it can be exercised without
    /// touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("PLAZA_JWT_SECRET").context("PLAZA_JWT_SECRET must be set")?;
        if jwt_secret.trim().is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("PLAZA_JWT_SECRET is empty or a placeholder; set a real secret");
        }

        let host = lookup("PLAZA_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("PLAZA_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("PLAZA_PORT must be a port number")?;
        let db_path = PathBuf::from(lookup("PLAZA_DB_PATH").unwrap_or_else(|| "plaza.db".into()));

        let admin_emails = lookup("PLAZA_ADMIN_EMAILS")
            .map(|v| {
                v.split(',')
                    .map(|e| e.trim().to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let defaults = CommunityConfig::default();
        let community = CommunityConfig {
            allow_self_like: parse_or(&lookup, "PLAZA_ALLOW_SELF_LIKE", defaults.allow_self_like)?,
            admin_can_edit: parse_or(&lookup, "PLAZA_ADMIN_CAN_EDIT", defaults.admin_can_edit)?,
            max_page_size: parse_or(&lookup, "PLAZA_MAX_PAGE_SIZE", defaults.max_page_size)?,
            comment_order: match lookup("PLAZA_COMMENT_ORDER") {
                Some(v) => v.parse::<SortOrder>().map_err(anyhow::Error::msg)?,
                None => defaults.comment_order,
            },
        };
        if community.max_page_size == 0 {
            bail!("PLAZA_MAX_PAGE_SIZE must be at least 1");
        }

        Ok(Self {
            host,
            port,
            db_path,
            jwt_secret,
            admin_emails,
            community,
        })
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} is invalid: {}", key, e)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<ServerConfig> {
        let map: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_apply_with_only_a_secret() {
        let cfg = config(&[("PLAZA_JWT_SECRET", "a-real-secret")]).unwrap();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.db_path, PathBuf::from("plaza.db"));
        assert!(cfg.community.allow_self_like);
        assert!(!cfg.community.admin_can_edit);
        assert_eq!(cfg.community.max_page_size, 100);
        assert_eq!(cfg.community.comment_order, SortOrder::Oldest);
        assert_eq!(cfg.addr().unwrap().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn missing_or_placeholder_secret_fails() {
        assert!(config(&[]).is_err());
        assert!(config(&[("PLAZA_JWT_SECRET", "dev-secret-change-me")]).is_err());
    }

    #[test]
    fn overrides_are_parsed() {
        let cfg = config(&[
            ("PLAZA_JWT_SECRET", "a-real-secret"),
            ("PLAZA_PORT", "8080"),
            ("PLAZA_ADMIN_EMAILS", "Root@Example.com, ops@example.com,"),
            ("PLAZA_ALLOW_SELF_LIKE", "false"),
            ("PLAZA_COMMENT_ORDER", "newest"),
        ])
        .unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.admin_emails, vec!["root@example.com", "ops@example.com"]);
        assert!(!cfg.community.allow_self_like);
        assert_eq!(cfg.community.comment_order, SortOrder::Newest);
    }

    #[test]
    fn bad_values_are_reported() {
        assert!(config(&[("PLAZA_JWT_SECRET", "s3cr3t-value"), ("PLAZA_PORT", "http")]).is_err());
        assert!(config(&[("PLAZA_JWT_SECRET", "s3cr3t-value"), ("PLAZA_MAX_PAGE_SIZE", "0")]).is_err());
        assert!(config(&[("PLAZA_JWT_SECRET", "s3cr3t-value"), ("PLAZA_COMMENT_ORDER", "random")]).is_err());
    }
}
