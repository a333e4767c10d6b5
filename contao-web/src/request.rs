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

use axum::http::{header, HeaderMap, Method, Uri};
use std::collections::HashMap;

/// Form field carrying the id of the submitted form.
pub const FORM_SUBMIT: &str = "FORM_SUBMIT";

/// The parts of an HTTP request the renderer looks at.
#[derive(Debug, Clone)]
pub struct FrontendRequest {
    pub method: Method,
    pub path: String,
    pub raw_query: Option<String>,
    pub query: HashMap<String, String>,
    pub form: HashMap<String, String>,
    pub host: String,
    pub scheme: String,
    pub referer: Option<String>,
}

impl FrontendRequest {
    pub fn from_parts(method: Method, uri: &Uri, headers: &HeaderMap, body: &[u8]) -> Self {
        let host = headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .or_else(|| uri.host())
            .unwrap_or("localhost")
            .to_string();
        let scheme = headers
            .get("x-forwarded-proto")
            .and_then(|h| h.to_str().ok())
            .filter(|p| *p == "https")
            .unwrap_or("http")
            .to_string();
        let referer = headers
            .get(header::REFERER)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string);

        let form = if method == Method::POST {
            parse_pairs(serde_urlencoded::from_bytes(body))
        } else {
            HashMap::new()
        };

        Self {
            method,
            path: uri.path().to_string(),
            raw_query: uri.query().map(str::to_string),
            query: parse_pairs(serde_urlencoded::from_str(uri.query().unwrap_or(""))),
            form,
            host,
            scheme,
            referer,
        }
    }

    pub fn is_post(&self) -> bool {
        self.method == Method::POST
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }

    /// A trimmed form value; empty values count as missing.
    pub fn form_value(&self, key: &str) -> Option<&str> {
        self.form
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Form value without trimming, for passwords.
    pub fn raw_form_value(&self, key: &str) -> &str {
        self.form.get(key).map(String::as_str).unwrap_or("")
    }

    /// Whether this is a POST of the form with the given id.
    pub fn is_form_submit(&self, form_id: &str) -> bool {
        self.is_post() && self.form.get(FORM_SUBMIT).map(String::as_str) == Some(form_id)
    }

    /// Host name without the port.
    pub fn host_name(&self) -> &str {
        self.host.split(':').next().unwrap_or(&self.host)
    }

    /// Path and query as requested.
    pub fn request_uri(&self) -> String {
        match &self.raw_query {
            Some(q) if !q.is_empty() => format!("{}?{}", self.path, q),
            _ => self.path.clone(),
        }
    }

    /// Absolute URL of a local path on this host.
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}://{}{}", self.scheme, self.host, path)
    }
}

fn parse_pairs<E>(parsed: Result<Vec<(String, String)>, E>) -> HashMap<String, String> {
    parsed.map(|pairs| pairs.into_iter().collect()).unwrap_or_default()
}
