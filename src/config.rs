use crate::auth::Credentials;
use crate::ClientError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the scanner, scheme://host:port.
    pub url: String,
    /// Verify the server's TLS certificate. Scanners commonly run with a
    /// self-signed certificate, but verification stays on unless the
    /// operator opts out.
    pub verify_tls: bool,
    /// Per-request timeout in seconds; unset means no timeout.
    pub request_timeout: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AuthConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                url: "https://localhost:8834".to_string(),
                verify_tls: true,
                request_timeout: None,
            },
            auth: AuthConfig::default(),
        }
    }
}

impl Config {
    /// Load from a TOML file, with `NESSUS_*` environment variables taking
    /// precedence so credentials can stay out of files
    /// (e.g. `NESSUS_AUTH__ACCESS_KEY`).
    pub fn load_from_file(path: &str) -> crate::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("NESSUS").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn save_to_file(&self, path: &str) -> crate::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// Pick the active authentication strategy. API keys win when both are
    /// configured, since they skip the session exchange entirely.
    pub fn credentials(&self) -> crate::Result<Credentials> {
        if let (Some(access_key), Some(secret_key)) =
            (&self.auth.access_key, &self.auth.secret_key)
        {
            return Ok(Credentials::api_keys(access_key, secret_key));
        }
        if let (Some(username), Some(password)) = (&self.auth.username, &self.auth.password) {
            return Ok(Credentials::user_password(username, password));
        }
        Err(ClientError::MissingCredentials(
            "supply either access_key/secret_key or username/password".to_string(),
        ))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.server.request_timeout.map(Duration::from_secs)
    }
}
