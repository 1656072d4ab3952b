use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};

use wech_types::models::DEFAULT_PASSWORD;

#[derive(Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub seed_users: Vec<SeedUser>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct SeedUser {
    pub name: String,
    pub password: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = var("WECH_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("WECH_PORT")
            .unwrap_or_else(|| "5000".into())
            .parse()
            .context("WECH_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;
        let db_path = var("WECH_DB_PATH").unwrap_or_else(|| "wech.db".into()).into();
        let seed_users = var("WECH_SEED_USERS")
            .map(|v| parse_seed_users(&v))
            .unwrap_or_default();

        Ok(Self {
            addr,
            db_path,
            seed_users,
        })
    }
}

/// `alice,bob:secret` -> alice/123, bob/secret
fn parse_seed_users(raw: &str) -> Vec<SeedUser> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once(':') {
            Some((name, password)) => SeedUser {
                name: name.trim().to_string(),
                password: password.to_string(),
            },
            None => SeedUser {
                name: entry.to_string(),
                password: DEFAULT_PASSWORD.to_string(),
            },
        })
        .filter(|user| !user.name.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.addr, "0.0.0.0:5000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.db_path, PathBuf::from("wech.db"));
        assert!(config.seed_users.is_empty());
    }

    #[test]
    fn bad_port_is_an_error() {
        assert!(Config::from_lookup(lookup(&[("WECH_PORT", "http")])).is_err());
    }

    #[test]
    fn seed_users_default_password() {
        let users = parse_seed_users("alice, bob:secret,,:orphan");
        assert_eq!(
            users,
            vec![
                SeedUser { name: "alice".into(), password: "123".into() },
                SeedUser { name: "bob".into(), password: "secret".into() },
            ]
        );
    }
}
