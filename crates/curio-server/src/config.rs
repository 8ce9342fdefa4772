use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me"];

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub feature_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = get("CURIO_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("CURIO_JWT_SECRET is unset or still a placeholder");
        }

        let host = get("CURIO_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = get("CURIO_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("CURIO_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid CURIO_HOST '{host}'"))?;

        Ok(Self {
            addr,
            db_path: get("CURIO_DB_PATH").unwrap_or_else(|| "curio.db".into()).into(),
            jwt_secret,
            feature_secret: get("CURIO_FEATURE_SECRET").filter(|s| !s.is_empty()),
        })
    }
}
