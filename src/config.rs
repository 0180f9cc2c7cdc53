use anyhow::{anyhow, Context, Result};
use std::env;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_TMDB_BASE: &str = "https://api.themoviedb.org/3";

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub port: u16,
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self> {
        let port = match non_empty_var("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got '{}'", raw))?,
            None => DEFAULT_PORT,
        };
        let tmdb_api_key =
            non_empty_var("TMDB_API_KEY").ok_or_else(|| anyhow!("TMDB_API_KEY must be set"))?;
        Ok(Self {
            port,
            tmdb_api_key,
            tmdb_base_url: base_url(),
        })
    }
}

impl ClientConfig {
    /// Prefers `TMDB_CLIENT_API_KEY`, falling back to the relay's `TMDB_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let tmdb_api_key = non_empty_var("TMDB_CLIENT_API_KEY")
            .or_else(|| non_empty_var("TMDB_API_KEY"))
            .ok_or_else(|| anyhow!("TMDB_CLIENT_API_KEY (or TMDB_API_KEY) must be set"))?;
        Ok(Self {
            tmdb_api_key,
            tmdb_base_url: base_url(),
        })
    }
}

fn base_url() -> String {
    non_empty_var("TMDB_BASE_URL")
        .map(|s| s.trim_end_matches('/').to_string())
        .unwrap_or_else(|| DEFAULT_TMDB_BASE.to_string())
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.trim().is_empty())
}
