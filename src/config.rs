use anyhow::Context;

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` means the process runs on the in-memory stores.
    pub database: Option<DatabaseConfig>,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database = match std::env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => Some(DatabaseConfig {
                url,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 10)?,
            }),
            _ => None,
        };
        Ok(Self {
            database,
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_var("APP_PORT", 5000)?,
        })
    }
}

fn parse_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_falls_back_to_default_when_unset() {
        let v: u16 = parse_var("SESSIONAUTH_TEST_UNSET_VAR", 5000).unwrap();
        assert_eq!(v, 5000);
    }

    #[test]
    fn parse_var_reports_the_offending_key() {
        std::env::set_var("SESSIONAUTH_TEST_BAD_PORT", "not-a-port");
        let err = parse_var::<u16>("SESSIONAUTH_TEST_BAD_PORT", 5000).unwrap_err();
        assert!(err.to_string().contains("SESSIONAUTH_TEST_BAD_PORT"));
        std::env::remove_var("SESSIONAUTH_TEST_BAD_PORT");
    }
}
