use std::path::PathBuf;
use std::str::FromStr;

use axum_extra::extract::cookie::Key;

use crate::error::Error;

/// Settings shared by config and runtime state.
#[derive(Clone)]
pub(crate) struct Settings {
    pub(crate) cookie_key: Key,
    pub(crate) session_cookie_name: String,
    pub(crate) session_ttl: time::Duration,
    pub(crate) secure_cookies: bool,
    pub(crate) upload_dir: PathBuf,
    pub(crate) max_upload_bytes: usize,
}

impl Settings {
    fn defaults() -> Self {
        Self {
            cookie_key: Key::generate(),
            session_cookie_name: "__crosspost_session".into(),
            session_ttl: time::Duration::hours(24),
            secure_cookies: true,
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 512 * 1024 * 1024,
        }
    }
}

/// HTTP server configuration.
///
/// Use [`from_env()`](ServerConfig::from_env) for convention-based setup,
/// or [`default()`](ServerConfig::default) with `with_*` methods for full control.
#[derive(Clone)]
pub struct ServerConfig {
    pub(crate) settings: Settings,
    port: u16,
    provider_timeout: std::time::Duration,
    log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            settings: Settings::defaults(),
            port: 3000,
            provider_timeout: std::time::Duration::from_secs(30),
            log_level: "info".into(),
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables.
    ///
    /// # Optional env vars
    /// - `PORT`: listen port (default 3000)
    /// - `COOKIE_KEY`: cookie encryption key bytes (at least 64); ephemeral when unset
    /// - `DEV_MODE`: `"1"` or `"true"` disables `Secure` cookies for plain-HTTP development
    /// - `SESSION_TTL_HOURS`: session lifetime, 1 to 87600 (default 24)
    /// - `PROVIDER_TIMEOUT_SECS`: bound on each external call (default 30)
    /// - `UPLOAD_DIR`: staging directory for received videos (default `uploads`)
    /// - `MAX_UPLOAD_MB`: request body limit for uploads (default 512)
    /// - `LOG_LEVEL`: fallback log filter when `RUST_LOG` is unset (default `info`)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is set but invalid.
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();

        if let Some(port) = parsed::<u16>("PORT")? {
            config = config.with_port(port);
        }

        if let Ok(k) = std::env::var("COOKIE_KEY") {
            let key = Key::try_from(k.as_bytes()).map_err(|_| {
                Error::Config(
                    "COOKIE_KEY is set but invalid (must be at least 64 bytes). \
                     Remove the env var to use an ephemeral key, or provide a valid key."
                        .into(),
                )
            })?;
            config = config.with_cookie_key(key);
        }

        let dev_mode = matches!(
            std::env::var("DEV_MODE").as_deref(),
            Ok("1") | Ok("true"),
        );
        config = config.with_secure_cookies(!dev_mode);

        if let Some(hours) = parsed::<i64>("SESSION_TTL_HOURS")? {
            config = config.with_session_ttl(session_ttl_from_hours(hours)?);
        }
        if let Some(secs) = parsed::<u64>("PROVIDER_TIMEOUT_SECS")? {
            config = config.with_provider_timeout(std::time::Duration::from_secs(secs));
        }
        if let Ok(dir) = std::env::var("UPLOAD_DIR") {
            config = config.with_upload_dir(dir);
        }
        if let Some(mb) = parsed::<usize>("MAX_UPLOAD_MB")? {
            config = config.with_max_upload_bytes(mb.saturating_mul(1024 * 1024));
        }
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        Ok(config)
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn with_cookie_key(mut self, key: Key) -> Self {
        self.settings.cookie_key = key;
        self
    }

    #[must_use]
    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.settings.session_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_session_ttl(mut self, ttl: time::Duration) -> Self {
        self.settings.session_ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.settings.secure_cookies = secure;
        self
    }

    #[must_use]
    pub fn with_provider_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.settings.upload_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.settings.max_upload_bytes = bytes;
        self
    }

    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn provider_timeout(&self) -> std::time::Duration {
        self.provider_timeout
    }

    #[must_use]
    pub fn session_ttl(&self) -> time::Duration {
        self.settings.session_ttl
    }

    #[must_use]
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

/// Ten years.
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;

fn session_ttl_from_hours(hours: i64) -> Result<time::Duration, Error> {
    if !(1..=MAX_SESSION_TTL_HOURS).contains(&hours) {
        return Err(Error::Config(format!(
            "SESSION_TTL_HOURS must be between 1 and {MAX_SESSION_TTL_HOURS}, got {hours}"
        )));
    }
    Ok(time::Duration::hours(hours))
}

fn parsed<T>(name: &str) -> Result<Option<T>, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("{name}: {e}"))),
        Err(_) => Ok(None),
    }
}
