use anyhow::{Context, Result};

const DEFAULT_MAX_CONNECTIONS: u32 = 2;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is required")?;
        let max_connections = parse_var(
            "DATABASE_MAX_CONNECTIONS",
            std::env::var("DATABASE_MAX_CONNECTIONS").ok(),
            DEFAULT_MAX_CONNECTIONS,
        )?;
        let acquire_timeout_secs = parse_var(
            "DATABASE_ACQUIRE_TIMEOUT_SECS",
            std::env::var("DATABASE_ACQUIRE_TIMEOUT_SECS").ok(),
            DEFAULT_ACQUIRE_TIMEOUT_SECS,
        )?;

        Ok(Self {
            database_url,
            max_connections,
            acquire_timeout_secs,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{name} is not a number: {raw}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_variables_take_defaults() {
        assert_eq!(parse_var("DATABASE_MAX_CONNECTIONS", None, 2u32).unwrap(), 2);
        assert_eq!(
            parse_var("DATABASE_MAX_CONNECTIONS", Some(" 8 ".to_string()), 2u32).unwrap(),
            8
        );
    }

    #[test]
    fn malformed_numbers_are_rejected() {
        let err = parse_var("DATABASE_ACQUIRE_TIMEOUT_SECS", Some("soon".to_string()), 10u64)
            .unwrap_err();
        assert_eq!(err.to_string(), "DATABASE_ACQUIRE_TIMEOUT_SECS is not a number: soon");
    }
}
