//! Runtime configuration
//!
//! Values come from the environment (optionally seeded from a `.env` file);
//! command line flags override them in the binaries.

use crate::error::{DemoError, Result};
use std::net::SocketAddr;

pub const ADDR_VAR: &str = "SQL_DEMO_ADDR";
pub const CHART_WIDTH_VAR: &str = "SQL_DEMO_CHART_WIDTH";

pub const DEFAULT_ADDR: &str = "127.0.0.1:8501";
pub const DEFAULT_CHART_WIDTH: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoConfig {
    /// Address the HTTP page is served on
    pub addr: SocketAddr,
    /// Width in characters of the longest terminal bar
    pub chart_width: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8501)),
            chart_width: DEFAULT_CHART_WIDTH,
        }
    }
}

impl DemoConfig {
    /// Load `.env` (if any) and read the process environment
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let addr = match lookup(ADDR_VAR) {
            Some(raw) => parse_addr(&raw)?,
            None => parse_addr(DEFAULT_ADDR)?,
        };

        let chart_width = match lookup(CHART_WIDTH_VAR) {
            Some(raw) => parse_chart_width(&raw)?,
            None => DEFAULT_CHART_WIDTH,
        };

        Ok(Self { addr, chart_width })
    }
}

pub fn parse_addr(raw: &str) -> Result<SocketAddr> {
    raw.trim()
        .parse()
        .map_err(|e| DemoError::Config(format!("{} '{}' is not HOST:PORT: {}", ADDR_VAR, raw, e)))
}

pub fn parse_chart_width(raw: &str) -> Result<usize> {
    let width: usize = raw
        .trim()
        .parse()
        .map_err(|e| DemoError::Config(format!("{} '{}' is not a number: {}", CHART_WIDTH_VAR, raw, e)))?;
    if width == 0 {
        return Err(DemoError::Config(format!("{} must be at least 1", CHART_WIDTH_VAR)));
    }
    Ok(width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = DemoConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, DemoConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = DemoConfig::from_lookup(lookup_from(&[
            (ADDR_VAR, "0.0.0.0:9000"),
            (CHART_WIDTH_VAR, "12"),
        ]))
        .unwrap();
        assert_eq!(config.addr.port(), 9000);
        assert_eq!(config.chart_width, 12);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            DemoConfig::from_lookup(lookup_from(&[(ADDR_VAR, "localhost")])),
            Err(DemoError::Config(_))
        ));
        assert!(matches!(
            DemoConfig::from_lookup(lookup_from(&[(CHART_WIDTH_VAR, "0")])),
            Err(DemoError::Config(_))
        ));
        assert!(matches!(
            DemoConfig::from_lookup(lookup_from(&[(CHART_WIDTH_VAR, "wide")])),
            Err(DemoError::Config(_))
        ));
    }
}
