//! Configuration loaded from environment variables.

use std::{env, net::SocketAddr, time::Duration};

use anyhow::{bail, Context, Result};
use kcc_core::culture_client::TIMEOUT;

static PLACEHOLDER_KEY: &str = "your_culture_api_key_here";
static DEFAULT_BIND_ADDR: &str = "0.0.0.0:8008";

#[derive(Debug, Clone)]
pub struct Config {
    /// The service key issued by data.go.kr
    pub service_key: String,
    pub bind_addr: SocketAddr,
    /// Upper bound of each upstream request
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let service_key = lookup("CULTURE_API_KEY")
            .or_else(|| lookup("NEXT_PUBLIC_CULTURE_API_KEY"))
            .filter(|key| !key.trim().is_empty() && key != PLACEHOLDER_KEY);
        let Some(service_key) = service_key else {
            bail!("no service key configured, set CULTURE_API_KEY to the key issued by data.go.kr");
        };
        let bind_addr = lookup("KCC_BIND_ADDR")
            .unwrap_or_else(|| String::from(DEFAULT_BIND_ADDR))
            .parse()
            .context("KCC_BIND_ADDR is not a socket address")?;
        let timeout = match lookup("KCC_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.parse()
                    .context("KCC_TIMEOUT_SECS is not a number of seconds")?,
            ),
            None => TIMEOUT,
        };
        Ok(Self {
            service_key,
            bind_addr,
            timeout,
        })
    }
}
