use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Settings for the dashboard backend.
#[derive(Clone, Debug)]
pub struct Config {
    pub supabase_url: String,
    pub anon_key: String,
    pub redis_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub cors_origin: String,
    pub create_user_url: String,
    pub session_ttl: Duration,
}

/// Settings for the privileged create-user function.
#[derive(Clone, Debug)]
pub struct FunctionConfig {
    pub supabase_url: String,
    pub anon_key: String,
    pub service_role_key: String,
    pub bind_addr: SocketAddr,
    /// `None` keeps the permissive `*` origin.
    pub allowed_origin: Option<String>,
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<String, ConfigError> {
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_addr(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: &str,
) -> Result<SocketAddr, ConfigError> {
    lookup(name)
        .unwrap_or_else(|| default.to_string())
        .parse()
        .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        })
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let supabase_url = required(&lookup, "SUPABASE_URL")?
            .trim_end_matches('/')
            .to_string();
        let anon_key = required(&lookup, "SUPABASE_ANON_KEY")?;

        let session_ttl = match lookup("SESSION_TTL_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                name: "SESSION_TTL_SECS",
                reason: e.to_string(),
            })?,
            None => 3600,
        };

        Ok(Self {
            create_user_url: lookup("CREATE_USER_FUNCTION_URL")
                .unwrap_or_else(|| format!("{supabase_url}/functions/v1/create-user")),
            redis_url: lookup("REDIS_URL").filter(|v| !v.is_empty()),
            bind_addr: parse_addr(&lookup, "BIND_ADDR", "0.0.0.0:8000")?,
            cors_origin: lookup("CORS_ALLOWED_ORIGIN")
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
            session_ttl: Duration::from_secs(session_ttl),
            supabase_url,
            anon_key,
        })
    }
}

impl FunctionConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            supabase_url: required(&lookup, "SUPABASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            anon_key: required(&lookup, "SUPABASE_ANON_KEY")?,
            service_role_key: required(&lookup, "SUPABASE_SERVICE_ROLE_KEY")?,
            bind_addr: parse_addr(&lookup, "BIND_ADDR", "0.0.0.0:8001")?,
            allowed_origin: lookup("FUNCTION_ALLOWED_ORIGIN").filter(|v| v != "*" && !v.is_empty()),
        })
    }
}
