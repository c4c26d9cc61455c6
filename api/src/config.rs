use std::env;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Number of dashboard entries returned when no `limit` is given
    pub feed_default_limit: u64,
    /// Upper bound on a caller-supplied `limit`
    pub feed_max_limit: u64,
    /// Identical actions recorded within this many seconds are dropped (0 disables)
    pub action_dedup_window_secs: i64,
    /// Allow cross-origin requests from any origin
    pub cors_allow_any: bool,
    /// Rate-limit registration by peer IP
    pub register_rate_limit: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            port: 8080,
            feed_default_limit: 10,
            feed_max_limit: 50,
            action_dedup_window_secs: 60,
            cors_allow_any: true,
            register_rate_limit: true,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: parse_var("PORT", defaults.port)?,
            feed_default_limit: parse_var("FEED_DEFAULT_LIMIT", defaults.feed_default_limit)?,
            feed_max_limit: parse_var("FEED_MAX_LIMIT", defaults.feed_max_limit)?,
            action_dedup_window_secs: parse_var(
                "ACTION_DEDUP_WINDOW_SECS",
                defaults.action_dedup_window_secs,
            )?,
            cors_allow_any: parse_var("CORS_ALLOW_ANY", defaults.cors_allow_any)?,
            register_rate_limit: parse_var("REGISTER_RATE_LIMIT", defaults.register_rate_limit)?,
        })
    }
}

/// Read an optional variable, falling back to `default` when unset
fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}
