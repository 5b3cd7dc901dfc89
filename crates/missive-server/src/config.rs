use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use missive_api::AuthorPolicy;

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    /// `:memory:` selects a throwaway in-memory store.
    pub db_path: PathBuf,
    pub author_policy: AuthorPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup so parsing can be tested without touching
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("MISSIVE_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = lookup("MISSIVE_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse::<u16>()
            .context("MISSIVE_PORT must be a port number")?;
        let addr = format!("{}:{}", host, port)
            .parse::<SocketAddr>()
            .with_context(|| format!("MISSIVE_HOST '{}' is not a valid address", host))?;

        let db_path: PathBuf = lookup("MISSIVE_DB_PATH")
            .unwrap_or_else(|| "missive.db".into())
            .into();

        let author_policy = match lookup("MISSIVE_AUTHOR_POLICY") {
            Some(raw) => raw.parse::<AuthorPolicy>().map_err(|e| anyhow!(e))?,
            None => AuthorPolicy::default(),
        };

        Ok(Self {
            addr,
            db_path,
            author_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.addr, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.db_path, PathBuf::from("missive.db"));
        assert_eq!(config.author_policy, AuthorPolicy::Legacy);
    }

    #[test]
    fn overrides() {
        let config = config_from(&[
            ("MISSIVE_HOST", "127.0.0.1"),
            ("MISSIVE_PORT", "8080"),
            ("MISSIVE_DB_PATH", ":memory:"),
            ("MISSIVE_AUTHOR_POLICY", "Strict"),
        ])
        .unwrap();
        assert_eq!(config.addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.db_path, PathBuf::from(":memory:"));
        assert_eq!(config.author_policy, AuthorPolicy::Strict);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(config_from(&[("MISSIVE_PORT", "eighty")]).is_err());
        assert!(config_from(&[("MISSIVE_HOST", "not a host")]).is_err());
        assert!(config_from(&[("MISSIVE_AUTHOR_POLICY", "sometimes")]).is_err());
    }
}
