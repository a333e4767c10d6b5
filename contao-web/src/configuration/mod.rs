// Contao - front-end rendering core for the Contao CMS
// Copyright (C) 2025 Contao Project Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;

pub mod defaults;
pub mod parser;

/// Server configuration
///
/// Loading order, later sources overriding earlier ones:
/// 1. Default values
/// 2. The TOML file (`CONTAO_CONFIG` or `./contao.toml`)
/// 3. Environment variables
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub mail: MailConfig,
    pub database_url: String,
    /// Directory whose templates override the built-in ones.
    pub templates_dir: Option<String>,
    pub development_mode: bool,
    /// Value of the preview cookie that unlocks unpublished content.
    pub preview_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Front-end member session settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    pub timeout_minutes: i64,
    pub secure_cookies: bool,
}

/// Outgoing mail; without an SMTP host messages are only logged.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_tls: bool,
    pub from: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let toml_config = Self::load_toml_config()?;

        let server = ServerConfig::load(&toml_config)?;
        let session = SessionConfig::load(&toml_config)?;
        let mail = MailConfig::load(&toml_config)?;

        let database_url = env::var("DATABASE_URL")
            .or_else(|_| {
                toml_config
                    .database_url
                    .clone()
                    .ok_or(env::VarError::NotPresent)
            })
            .unwrap_or_else(|_| defaults::default_database_url());

        let templates_dir = env::var("TEMPLATES_DIR")
            .ok()
            .or_else(|| toml_config.templates_dir.clone())
            .filter(|dir| !dir.trim().is_empty());

        let development_mode = env::var("DEVELOPMENT_MODE")
            .or_else(|_| {
                toml_config
                    .development_mode
                    .map(|b| b.to_string())
                    .ok_or(env::VarError::NotPresent)
            })
            .unwrap_or_else(|_| defaults::default_development_mode().to_string())
            .parse()
            .context("Invalid DEVELOPMENT_MODE environment variable")?;

        let preview_token = env::var("PREVIEW_TOKEN")
            .ok()
            .or_else(|| toml_config.preview_token.clone())
            .filter(|token| !token.trim().is_empty());

        Ok(Self {
            server,
            session,
            mail,
            database_url,
            templates_dir,
            development_mode,
            preview_token,
        })
    }

    fn load_toml_config() -> Result<parser::TomlConfig> {
        let mut configs = Vec::new();
        for path in parser::get_config_file_paths() {
            configs.push(parser::parse_toml_file(&path)?);
        }
        Ok(parser::merge_toml_configs(configs))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ServerConfig {
    fn load(toml_config: &parser::TomlConfig) -> Result<Self> {
        let host = env::var("HOST")
            .or_else(|_| {
                toml_config
                    .server
                    .as_ref()
                    .and_then(|s| s.host.clone())
                    .ok_or(env::VarError::NotPresent)
            })
            .unwrap_or_else(|_| defaults::default_host());

        let port = env::var("PORT")
            .or_else(|_| {
                toml_config
                    .server
                    .as_ref()
                    .and_then(|s| s.port.map(|p| p.to_string()))
                    .ok_or(env::VarError::NotPresent)
            })
            .unwrap_or_else(|_| defaults::default_port().to_string())
            .parse()
            .context("Invalid PORT environment variable")?;

        Ok(Self { host, port })
    }
}

impl SessionConfig {
    fn load(toml_config: &parser::TomlConfig) -> Result<Self> {
        let timeout_minutes = env::var("SESSION_TIMEOUT_MINUTES")
            .or_else(|_| {
                toml_config
                    .session
                    .as_ref()
                    .and_then(|s| s.session_timeout_minutes.map(|t| t.to_string()))
                    .ok_or(env::VarError::NotPresent)
            })
            .unwrap_or_else(|_| defaults::default_session_timeout_minutes().to_string())
            .parse()
            .context("Invalid SESSION_TIMEOUT_MINUTES environment variable")?;

        let secure_cookies = env::var("SECURE_COOKIES")
            .or_else(|_| {
                toml_config
                    .session
                    .as_ref()
                    .and_then(|s| s.secure_cookies.map(|c| c.to_string()))
                    .ok_or(env::VarError::NotPresent)
            })
            .unwrap_or_else(|_| defaults::default_secure_cookies().to_string())
            .parse()
            .context("Invalid SECURE_COOKIES environment variable")?;

        Ok(Self {
            timeout_minutes,
            secure_cookies,
        })
    }
}

impl MailConfig {
    fn load(toml_config: &parser::TomlConfig) -> Result<Self> {
        let mail = toml_config.mail.as_ref();

        let smtp_host = env::var("SMTP_HOST")
            .ok()
            .or_else(|| mail.and_then(|m| m.smtp_host.clone()))
            .filter(|host| !host.trim().is_empty());

        let smtp_port = env::var("SMTP_PORT")
            .or_else(|_| {
                mail.and_then(|m| m.smtp_port.map(|p| p.to_string()))
                    .ok_or(env::VarError::NotPresent)
            })
            .unwrap_or_else(|_| defaults::default_smtp_port().to_string())
            .parse()
            .context("Invalid SMTP_PORT environment variable")?;

        let smtp_username = env::var("SMTP_USERNAME")
            .ok()
            .or_else(|| mail.and_then(|m| m.smtp_username.clone()));

        let smtp_password = env::var("SMTP_PASSWORD")
            .ok()
            .or_else(|| mail.and_then(|m| m.smtp_password.clone()));

        let smtp_tls = env::var("SMTP_TLS")
            .or_else(|_| {
                mail.and_then(|m| m.smtp_tls.map(|t| t.to_string()))
                    .ok_or(env::VarError::NotPresent)
            })
            .unwrap_or_else(|_| defaults::default_smtp_tls().to_string())
            .parse()
            .context("Invalid SMTP_TLS environment variable")?;

        let from = env::var("MAIL_FROM")
            .or_else(|_| {
                mail.and_then(|m| m.mail_from.clone())
                    .ok_or(env::VarError::NotPresent)
            })
            .unwrap_or_else(|_| defaults::default_mail_from());

        Ok(Self {
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            smtp_tls,
            from,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const VARS: &[&str] = &[
        "HOST",
        "PORT",
        "SESSION_TIMEOUT_MINUTES",
        "SECURE_COOKIES",
        "SMTP_HOST",
        "SMTP_PORT",
        "SMTP_TLS",
        "MAIL_FROM",
        "DATABASE_URL",
        "TEMPLATES_DIR",
        "DEVELOPMENT_MODE",
        "PREVIEW_TOKEN",
        "CONTAO_CONFIG",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_server_config_load_defaults() {
        clear_env();

        let config = ServerConfig::load(&parser::TomlConfig::default())
            .expect("Should load default server config");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
    }

    #[test]
    #[serial]
    fn test_server_config_env_beats_file() {
        clear_env();
        env::set_var("PORT", "8080");

        let toml_config = parser::TomlConfig {
            server: Some(parser::TomlServerConfig {
                host: Some("127.0.0.1".to_string()),
                port: Some(4000),
            }),
            ..Default::default()
        };
        let config = ServerConfig::load(&toml_config).expect("Should load server config");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);

        env::remove_var("PORT");
    }

    #[test]
    #[serial]
    fn test_server_config_invalid_port() {
        clear_env();
        env::set_var("PORT", "invalid");

        assert!(ServerConfig::load(&parser::TomlConfig::default()).is_err());

        env::remove_var("PORT");
    }

    #[test]
    #[serial]
    fn test_session_config_from_env() {
        clear_env();
        env::set_var("SESSION_TIMEOUT_MINUTES", "30");
        env::set_var("SECURE_COOKIES", "false");

        let config = SessionConfig::load(&parser::TomlConfig::default())
            .expect("Should load session config");
        assert_eq!(config.timeout_minutes, 30);
        assert!(!config.secure_cookies);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_mail_config_without_smtp_host() {
        clear_env();
        env::set_var("SMTP_HOST", "  ");

        let config =
            MailConfig::load(&parser::TomlConfig::default()).expect("Should load mail config");
        assert!(config.smtp_host.is_none());
        assert_eq!(config.smtp_port, 587);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_with_config_file() {
        clear_env();
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("contao.toml");
        std::fs::write(
            &path,
            "database_url = \"sqlite:file.db\"\npreview_token = \"secret\"\nsmtp_host = \"mail.local\"\n",
        )
        .expect("write config");
        env::set_var("CONTAO_CONFIG", &path);
        env::set_var("DEVELOPMENT_MODE", "true");

        let config = Config::from_env().expect("Should load configuration");
        assert_eq!(config.database_url, "sqlite:file.db");
        assert_eq!(config.preview_token, Some("secret".to_string()));
        assert_eq!(config.mail.smtp_host, Some("mail.local".to_string()));
        assert!(config.development_mode);
        assert!(config.templates_dir.is_none());
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");

        clear_env();
    }
}
