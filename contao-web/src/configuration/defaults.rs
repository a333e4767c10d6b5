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

//! Default configuration values
//!
//! Each function returns the value used when neither the environment nor a
//! configuration file sets the field.

// Server defaults
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_port() -> u16 {
    3000
}

// Session defaults
pub fn default_session_timeout_minutes() -> i64 {
    1440 // 24 hours
}

pub fn default_secure_cookies() -> bool {
    true
}

// Mail defaults
pub fn default_smtp_port() -> u16 {
    587
}

pub fn default_smtp_tls() -> bool {
    true
}

pub fn default_mail_from() -> String {
    "Contao <noreply@localhost>".to_string()
}

// General defaults
pub fn default_database_url() -> String {
    "sqlite:contao.db".to_string()
}

pub fn default_development_mode() -> bool {
    false
}

pub fn default_config_file() -> String {
    "./contao.toml".to_string()
}
