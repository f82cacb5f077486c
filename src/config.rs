use std::env;
use std::net::SocketAddr;

use crate::error::{invalid_config_error, Error};

pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub listen_addr: SocketAddr,
}

impl Config {
    /// Reads `.env` (if any) and then the process environment.
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| match env::var(key) {
            Ok(value) => Ok(Some(value)),
            Err(env::VarError::NotPresent) => Ok(None),
            Err(err) => Err(err.into()),
        })
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Result<Option<String>, Error>,
    {
        let database_url =
            lookup("DATABASE_URL")?.unwrap_or_else(|| DEFAULT_DATABASE_URL.into());

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS")? {
            Some(value) => value
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| invalid_config_error("DATABASE_MAX_CONNECTIONS"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let listen_addr = lookup("LISTEN_ADDR")?
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.into())
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| invalid_config_error("LISTEN_ADDR"))?;

        Ok(Self {
            database_url,
            max_connections,
            listen_addr,
        })
    }
}

#[cfg(test)]
fn lookup_from(
    vars: &'static [(&'static str, &'static str)],
) -> impl Fn(&str) -> Result<Option<String>, Error> {
    move |key| {
        Ok(vars
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.to_string()))
    }
}

#[test]
fn defaults() {
    let config = Config::from_lookup(lookup_from(&[])).unwrap();

    assert_eq!(config.database_url, "sqlite::memory:");
    assert_eq!(config.max_connections, 5);
    assert_eq!(config.listen_addr, "127.0.0.1:3000".parse().unwrap());
}

#[test]
fn overrides() {
    let config = Config::from_lookup(lookup_from(&[
        ("DATABASE_URL", "sqlite://rides.db?mode=rwc"),
        ("DATABASE_MAX_CONNECTIONS", "12"),
        ("LISTEN_ADDR", "0.0.0.0:8010"),
    ]))
    .unwrap();

    assert_eq!(config.database_url, "sqlite://rides.db?mode=rwc");
    assert_eq!(config.max_connections, 12);
    assert_eq!(config.listen_addr, "0.0.0.0:8010".parse().unwrap());
}

#[test]
fn invalid_values() {
    let err = Config::from_lookup(lookup_from(&[("DATABASE_MAX_CONNECTIONS", "lots")]))
        .unwrap_err();
    assert_eq!(err.message, "invalid value for DATABASE_MAX_CONNECTIONS");

    let err =
        Config::from_lookup(lookup_from(&[("DATABASE_MAX_CONNECTIONS", "0")])).unwrap_err();
    assert_eq!(err.message, "invalid value for DATABASE_MAX_CONNECTIONS");

    let err = Config::from_lookup(lookup_from(&[("LISTEN_ADDR", "localhost")])).unwrap_err();
    assert_eq!(err.message, "invalid value for LISTEN_ADDR");
}
