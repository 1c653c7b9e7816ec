//! Server configuration.
//!
//! Loaded from the environment through the `config` crate. Every key takes
//! the `ODDEVEN_` prefix:
//!
//! - `ODDEVEN_ADDR=127.0.0.1:9000` -> `bind_addr`
//! - `ODDEVEN_COMMAND_BUFFER=128` -> `command_buffer`
//! - `ODDEVEN_IDLE_TIMEOUT_SECS=30` -> `idle_timeout`
//!
//! A bare `PORT` is honoured as `0.0.0.0:$PORT` when `ODDEVEN_ADDR` is unset.

use std::time::Duration;

use serde::Deserialize;

use crate::OddEvenError;

/// Prefix shared by every `ODDEVEN_*` environment variable.
pub const ENV_PREFIX: &str = "ODDEVEN";
/// Environment variable holding just the port; used when `ODDEVEN_ADDR` is
/// unset.
pub const ENV_PORT: &str = "PORT";

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    #[serde(rename = "addr", default = "default_bind_addr")]
    pub bind_addr: String,

    /// Capacity of the session actor's command queue.
    #[serde(default = "default_command_buffer")]
    pub command_buffer: usize,

    /// Close a connection that sends nothing for this long.
    #[serde(rename = "idle_timeout_secs", default, with = "opt_secs")]
    pub idle_timeout: Option<Duration>,
}

impl ServerConfig {
    /// Sets the bind address.
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Sets the command queue capacity.
    pub fn command_buffer(mut self, size: usize) -> Self {
        self.command_buffer = size;
        self
    }

    /// Sets the idle timeout.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    /// Loads the config from the process environment.
    ///
    /// A `.env` file in the working directory is read first if present.
    /// Anything unset falls back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`OddEvenError::ConfigLoad`] when a value cannot be parsed
    /// and [`OddEvenError::Config`] when the result fails [`validate`].
    ///
    /// [`validate`]: Self::validate
    pub fn from_env() -> Result<Self, OddEvenError> {
        dotenvy::dotenv().ok();
        Self::load(
            config::Environment::default(),
            std::env::var(ENV_PORT).ok(),
        )
    }

    /// Loads the config from an explicit set of variables instead of the
    /// process environment. Keys are the same as for [`from_env`].
    ///
    /// [`from_env`]: Self::from_env
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, OddEvenError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: config::Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let port = vars.get(ENV_PORT).cloned();
        Self::load(config::Environment::default().source(Some(vars)), port)
    }

    fn load(
        env: config::Environment,
        port: Option<String>,
    ) -> Result<Self, OddEvenError> {
        let mut builder = config::Config::builder();
        if let Some(port) = port {
            let port: u16 = port.trim().parse().map_err(|_| {
                OddEvenError::Config(format!("{ENV_PORT} is not a port: {port}"))
            })?;
            builder = builder.set_default("addr", format!("0.0.0.0:{port}"))?;
        }

        let config: Self = builder
            .add_source(env.prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), OddEvenError> {
        if self.bind_addr.trim().is_empty() {
            return Err(OddEvenError::Config("bind address is empty".into()));
        }
        if self.command_buffer == 0 {
            return Err(OddEvenError::Config(
                "command buffer must be non-zero".into(),
            ));
        }
        if self.idle_timeout.is_some_and(|t| t.is_zero()) {
            return Err(OddEvenError::Config(
                "idle timeout must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            command_buffer: default_command_buffer(),
            idle_timeout: None,
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_command_buffer() -> usize {
    64
}

/// `Option<Duration>` as whole seconds.
mod opt_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(d: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_secs))
    }
}
