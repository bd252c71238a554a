use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use galley_core::AppError;
use galley_domain::SubjectId;
use tracing_subscriber::EnvFilter;

const DEFAULT_PERMISSION_CACHE_TTL_SECONDS: u64 = 300;

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub bootstrap_token: String,
    pub api_host: String,
    pub api_port: u16,
    pub cookie_secure: bool,
    /// `None` keeps resolved permission sets until they are invalidated.
    pub permission_cache_ttl: Option<Duration>,
    pub bootstrap_admin_subject: Option<SubjectId>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let database_url = required_env("DATABASE_URL")?;
        let frontend_url =
            env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned());
        let bootstrap_token = required_non_empty_env("AUTH_BOOTSTRAP_TOKEN")?;

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3001);

        let cookie_secure = env::var("SESSION_COOKIE_SECURE")
            .unwrap_or_else(|_| "false".to_owned())
            .eq_ignore_ascii_case("true");

        let permission_cache_ttl =
            parse_cache_ttl(env::var("PERMISSION_CACHE_TTL_SECONDS").ok().as_deref())?;

        let bootstrap_admin_subject = env::var("BOOTSTRAP_ADMIN_SUBJECT")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| {
                SubjectId::parse(value.as_str()).map_err(|error| {
                    AppError::Validation(format!("invalid BOOTSTRAP_ADMIN_SUBJECT: {error}"))
                })
            })
            .transpose()?;

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            bootstrap_token,
            api_host,
            api_port,
            cookie_secure,
            permission_cache_ttl,
            bootstrap_admin_subject,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

/// Parses the cache lifetime in seconds; `0` disables expiry.
fn parse_cache_ttl(value: Option<&str>) -> Result<Option<Duration>, AppError> {
    let seconds = match value.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid PERMISSION_CACHE_TTL_SECONDS: {error}"))
        })?,
        None => DEFAULT_PERMISSION_CACHE_TTL_SECONDS,
    };

    Ok((seconds > 0).then(|| Duration::from_secs(seconds)))
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use galley_core::AppError;

    use super::{ApiConfig, parse_cache_ttl};

    #[test]
    fn cache_ttl_defaults_to_five_minutes() {
        assert!(matches!(
            parse_cache_ttl(None),
            Ok(Some(ttl)) if ttl == Duration::from_secs(300)
        ));
        assert!(matches!(
            parse_cache_ttl(Some("  ")),
            Ok(Some(ttl)) if ttl == Duration::from_secs(300)
        ));
    }

    #[test]
    fn zero_cache_ttl_disables_expiry() {
        assert!(matches!(parse_cache_ttl(Some("0")), Ok(None)));
        assert!(matches!(
            parse_cache_ttl(Some("45")),
            Ok(Some(ttl)) if ttl == Duration::from_secs(45)
        ));
    }

    #[test]
    fn malformed_cache_ttl_is_rejected() {
        assert!(matches!(
            parse_cache_ttl(Some("-1")),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_cache_ttl(Some("five")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn socket_address_rejects_hostnames() {
        let config = ApiConfig {
            migrate_only: false,
            database_url: "postgres://localhost/galley".to_owned(),
            frontend_url: "http://localhost:3000".to_owned(),
            bootstrap_token: "token".to_owned(),
            api_host: "localhost".to_owned(),
            api_port: 3001,
            cookie_secure: false,
            permission_cache_ttl: None,
            bootstrap_admin_subject: None,
        };

        assert!(matches!(
            config.socket_address(),
            Err(AppError::Internal(_))
        ));
    }
}
