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

//! TOML configuration parser
//!
//! Reads the optional configuration file and merges partial configurations.
//! Keys are flat, e.g. `port = 8080` or `smtp_host = "mail.example.com"`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use super::defaults;

/// Raw file configuration; every field is optional so partial files work.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    #[serde(flatten)]
    pub server: Option<TomlServerConfig>,
    #[serde(flatten)]
    pub session: Option<TomlSessionConfig>,
    #[serde(flatten)]
    pub mail: Option<TomlMailConfig>,
    pub database_url: Option<String>,
    pub templates_dir: Option<String>,
    pub development_mode: Option<bool>,
    pub preview_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlSessionConfig {
    pub session_timeout_minutes: Option<i64>,
    pub secure_cookies: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlMailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_tls: Option<bool>,
    pub mail_from: Option<String>,
}

/// Parse a TOML configuration file; a missing file yields an empty configuration.
pub fn parse_toml_file<P: AsRef<Path>>(path: P) -> Result<TomlConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(TomlConfig::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;

    toml::from_str(&content).with_context(|| {
        format!(
            "Failed to parse TOML configuration file: {}",
            path.display()
        )
    })
}

/// Configuration file locations, lowest precedence first.
///
/// `CONTAO_CONFIG` replaces the default `./contao.toml`.
pub fn get_config_file_paths() -> Vec<PathBuf> {
    match env::var("CONTAO_CONFIG") {
        Ok(path) if !path.trim().is_empty() => vec![PathBuf::from(path)],
        _ => vec![PathBuf::from(defaults::default_config_file())],
    }
}

/// Merge configurations, later ones taking precedence.
pub fn merge_toml_configs(configs: Vec<TomlConfig>) -> TomlConfig {
    let mut merged = TomlConfig::default();

    for config in configs {
        if let Some(server) = config.server {
            let mut merged_server = merged.server.unwrap_or_default();
            if server.host.is_some() {
                merged_server.host = server.host;
            }
            if server.port.is_some() {
                merged_server.port = server.port;
            }
            merged.server = Some(merged_server);
        }

        if let Some(session) = config.session {
            let mut merged_session = merged.session.unwrap_or_default();
            if session.session_timeout_minutes.is_some() {
                merged_session.session_timeout_minutes = session.session_timeout_minutes;
            }
            if session.secure_cookies.is_some() {
                merged_session.secure_cookies = session.secure_cookies;
            }
            merged.session = Some(merged_session);
        }

        if let Some(mail) = config.mail {
            let mut merged_mail = merged.mail.unwrap_or_default();
            if mail.smtp_host.is_some() {
                merged_mail.smtp_host = mail.smtp_host;
            }
            if mail.smtp_port.is_some() {
                merged_mail.smtp_port = mail.smtp_port;
            }
            if mail.smtp_username.is_some() {
                merged_mail.smtp_username = mail.smtp_username;
            }
            if mail.smtp_password.is_some() {
                merged_mail.smtp_password = mail.smtp_password;
            }
            if mail.smtp_tls.is_some() {
                merged_mail.smtp_tls = mail.smtp_tls;
            }
            if mail.mail_from.is_some() {
                merged_mail.mail_from = mail.mail_from;
            }
            merged.mail = Some(merged_mail);
        }

        if config.database_url.is_some() {
            merged.database_url = config.database_url;
        }
        if config.templates_dir.is_some() {
            merged.templates_dir = config.templates_dir;
        }
        if config.development_mode.is_some() {
            merged.development_mode = config.development_mode;
        }
        if config.preview_token.is_some() {
            merged.preview_token = config.preview_token;
        }
    }

    merged
}
