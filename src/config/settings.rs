use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub templates: TemplatesConfig,
    pub smtp: SmtpConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub otel: OtelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplatesConfig {
    /// Root directory holding one sub-directory per template group
    #[serde(default = "default_templates_directory")]
    pub directory: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    /// Submission server as `host:port`
    #[serde(default = "default_smtp_address")]
    pub address: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// `From` identity; falls back to the username
    pub from: Option<String>,
    /// One of `tls`, `starttls`, `none`
    #[serde(default = "default_smtp_tls")]
    pub tls: String,
    /// Command timeout in seconds
    #[serde(default = "default_smtp_timeout")]
    pub timeout: u64,
}

/// How the SMTP connection is secured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// Implicit TLS from the first byte (usually port 465)
    Tls,
    /// Plain connection upgraded with STARTTLS (usually port 587)
    StartTls,
    /// No encryption
    None,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
    pub key: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    /// Emit one JSON object per event instead of human-readable lines
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_otel_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_otel_service")]
    pub service: String,
    /// Trace sampling ratio (0.0-1.0)
    #[serde(default = "default_otel_sampling")]
    pub sampling: f64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_templates_directory() -> String {
    "./templates".to_string()
}

fn default_smtp_address() -> String {
    "localhost:465".to_string()
}

fn default_smtp_tls() -> String {
    "tls".to_string()
}

fn default_smtp_timeout() -> u64 {
    10
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_otel_service() -> String {
    "mail-template-service".to_string()
}

fn default_otel_sampling() -> f64 {
    1.0
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("server.host", default_host())?
            .set_default("server.port", 8080)?
            .set_default("templates.directory", default_templates_directory())?
            .set_default("smtp.address", default_smtp_address())?
            .set_default("smtp.tls", default_smtp_tls())?
            .set_default("smtp.timeout", 10)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables
            // SERVER_PORT, TEMPLATES_DIRECTORY, SMTP_ADDRESS, SMTP_USERNAME, API_KEY, etc.
            .add_source(
                Environment::default()
                    .separator("_")
                    .try_parsing(true),
            );

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values that would only fail later, at first use
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("server.port must be non-zero".into()));
        }

        self.smtp.host_port()?;
        self.smtp.tls_mode()?;

        if !(0.0..=1.0).contains(&self.otel.sampling) {
            return Err(ConfigError::Message(
                "otel.sampling must be between 0.0 and 1.0".into(),
            ));
        }

        Ok(())
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl SmtpConfig {
    /// Split `address` into host and port
    pub fn host_port(&self) -> Result<(&str, u16), ConfigError> {
        let (host, port) = self.address.rsplit_once(':').ok_or_else(|| {
            ConfigError::Message(format!(
                "smtp.address '{}' must be in host:port form",
                self.address
            ))
        })?;

        let port = port.parse::<u16>().map_err(|_| {
            ConfigError::Message(format!("smtp.address '{}' has an invalid port", self.address))
        })?;

        if host.is_empty() {
            return Err(ConfigError::Message(format!(
                "smtp.address '{}' is missing a host",
                self.address
            )));
        }

        Ok((host, port))
    }

    pub fn tls_mode(&self) -> Result<TlsMode, ConfigError> {
        match self.tls.to_ascii_lowercase().as_str() {
            "tls" | "ssl" => Ok(TlsMode::Tls),
            "starttls" => Ok(TlsMode::StartTls),
            "none" | "plain" => Ok(TlsMode::None),
            other => Err(ConfigError::Message(format!(
                "unknown smtp.tls mode '{}' (expected tls, starttls or none)",
                other
            ))),
        }
    }

    /// Address used for `From` and `MAIL FROM`
    pub fn sender(&self) -> &str {
        self.from.as_deref().unwrap_or(&self.username)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            directory: default_templates_directory(),
        }
    }
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            address: default_smtp_address(),
            username: String::new(),
            password: String::new(),
            from: None,
            tls: default_smtp_tls(),
            timeout: default_smtp_timeout(),
        }
    }
}

impl Default for OtelConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_otel_endpoint(),
            service: default_otel_service(),
            sampling: default_otel_sampling(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            templates: TemplatesConfig::default(),
            smtp: SmtpConfig::default(),
            api: ApiConfig::default(),
            log: LogConfig::default(),
            otel: OtelConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let settings = Settings::default();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.templates.directory, "./templates");
        assert_eq!(settings.server_addr(), "0.0.0.0:8080");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_smtp_host_port() {
        let smtp = SmtpConfig {
            address: "smtp.example.com:587".to_string(),
            ..SmtpConfig::default()
        };
        assert_eq!(smtp.host_port().unwrap(), ("smtp.example.com", 587));
    }

    #[test]
    fn test_smtp_address_without_port() {
        let smtp = SmtpConfig {
            address: "smtp.example.com".to_string(),
            ..SmtpConfig::default()
        };
        assert!(smtp.host_port().is_err());

        let smtp = SmtpConfig {
            address: ":25".to_string(),
            ..SmtpConfig::default()
        };
        assert!(smtp.host_port().is_err());
    }

    #[test]
    fn test_tls_modes() {
        let mode = |tls: &str| {
            SmtpConfig {
                tls: tls.to_string(),
                ..SmtpConfig::default()
            }
            .tls_mode()
        };

        assert_eq!(mode("tls").unwrap(), TlsMode::Tls);
        assert_eq!(mode("STARTTLS").unwrap(), TlsMode::StartTls);
        assert_eq!(mode("none").unwrap(), TlsMode::None);
        assert!(mode("quic").is_err());
    }

    #[test]
    fn test_sender_falls_back_to_username() {
        let mut smtp = SmtpConfig {
            username: "mailer@example.com".to_string(),
            ..SmtpConfig::default()
        };
        assert_eq!(smtp.sender(), "mailer@example.com");

        smtp.from = Some("noreply@example.com".to_string());
        assert_eq!(smtp.sender(), "noreply@example.com");
    }

    #[test]
    fn test_validate_rejects_bad_sampling() {
        let mut settings = Settings::default();
        settings.otel.sampling = 2.0;
        assert!(settings.validate().is_err());
    }
}
