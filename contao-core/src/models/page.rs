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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::alias::{generate_alias, is_valid_alias};
use crate::visibility::{Protectable, Publishable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageType {
    #[serde(rename = "regular")]
    Regular,
    #[serde(rename = "forward")]
    Forward,
    #[serde(rename = "redirect")]
    Redirect,
    #[serde(rename = "root")]
    Root,
    #[serde(rename = "logout")]
    Logout,
    #[serde(rename = "error_401")]
    Error401,
    #[serde(rename = "error_403")]
    Error403,
    #[serde(rename = "error_404")]
    Error404,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Regular => "regular",
            PageType::Forward => "forward",
            PageType::Redirect => "redirect",
            PageType::Root => "root",
            PageType::Logout => "logout",
            PageType::Error401 => "error_401",
            PageType::Error403 => "error_403",
            PageType::Error404 => "error_404",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "regular" => Some(PageType::Regular),
            "forward" => Some(PageType::Forward),
            "redirect" => Some(PageType::Redirect),
            "root" => Some(PageType::Root),
            "logout" => Some(PageType::Logout),
            "error_401" => Some(PageType::Error401),
            "error_403" => Some(PageType::Error403),
            "error_404" => Some(PageType::Error404),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            PageType::Error401 | PageType::Error403 | PageType::Error404
        )
    }
}

/// Controls whether a page shows up in the sitemap module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SitemapMode {
    #[default]
    #[serde(rename = "map_default")]
    Default,
    #[serde(rename = "map_always")]
    Always,
    #[serde(rename = "map_never")]
    Never,
}

impl SitemapMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SitemapMode::Default => "map_default",
            SitemapMode::Always => "map_always",
            SitemapMode::Never => "map_never",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "map_always" => SitemapMode::Always,
            "map_never" => SitemapMode::Never,
            _ => SitemapMode::Default,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectType {
    #[default]
    Permanent,
    Temporary,
}

impl RedirectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectType::Permanent => "permanent",
            RedirectType::Temporary => "temporary",
        }
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "temporary" => RedirectType::Temporary,
            _ => RedirectType::Permanent,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page {
    pub id: Option<i64>,
    pub pid: Option<i64>,
    pub sorting: i64,
    pub page_type: PageType,
    pub title: String,
    pub alias: String,
    pub page_title: Option<String>,
    pub description: Option<String>,
    pub robots: String,
    pub language: String,
    pub dns: String,
    pub url_suffix: String,
    pub fallback: bool,
    pub jump_to: Option<i64>,
    pub url: Option<String>,
    pub redirect: RedirectType,
    pub target_blank: bool,
    pub auto_forward: bool,
    pub hide: bool,
    pub guests: bool,
    pub protected: bool,
    pub groups: Vec<i64>,
    pub include_layout: bool,
    pub layout: Option<i64>,
    pub no_search: bool,
    pub sitemap: SitemapMode,
    pub css_class: String,
    pub accesskey: String,
    pub tabindex: i64,
    pub published: bool,
    pub start: Option<DateTime<Utc>>,
    pub stop: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Page {
    pub fn new(pid: Option<i64>, page_type: PageType, title: String, alias: String) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            pid,
            sorting: 0,
            page_type,
            title,
            alias,
            page_title: None,
            description: None,
            robots: "index,follow".to_string(),
            language: "en".to_string(),
            dns: String::new(),
            url_suffix: ".html".to_string(),
            fallback: false,
            jump_to: None,
            url: None,
            redirect: RedirectType::Permanent,
            target_blank: false,
            auto_forward: false,
            hide: false,
            guests: false,
            protected: false,
            groups: Vec::new(),
            include_layout: false,
            layout: None,
            no_search: false,
            sitemap: SitemapMode::Default,
            css_class: String::new(),
            accesskey: String::new(),
            tabindex: 0,
            published: true,
            start: None,
            stop: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a website root with a host name and the default URL suffix.
    pub fn new_root(title: String, dns: String, language: String) -> Self {
        let alias = generate_alias(&title);
        let mut page = Self::new(None, PageType::Root, title, alias);
        page.dns = dns;
        page.language = language;
        page.fallback = true;
        page
    }

    /// Create a regular child page with an alias derived from the title.
    pub fn new_regular(pid: i64, title: String) -> Self {
        let alias = generate_alias(&title);
        Self::new(Some(pid), PageType::Regular, title, alias)
    }

    pub fn id(&self) -> i64 {
        self.id.unwrap_or_default()
    }

    pub fn is_root(&self) -> bool {
        self.page_type == PageType::Root
    }

    pub fn is_error_page(&self) -> bool {
        self.page_type.is_error()
    }

    /// Page types that can appear in menus.
    pub fn is_navigable_type(&self) -> bool {
        !self.is_root() && !self.is_error_page()
    }

    /// Title used in the HTML `<title>` element.
    pub fn display_title(&self) -> &str {
        match self.page_title.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => &self.title,
        }
    }

    /// `noindex,nofollow` pages get a `rel="nofollow"` link in menus.
    pub fn is_nofollow(&self) -> bool {
        self.robots.starts_with("noindex,nofollow")
    }

    pub fn validate_title(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Title cannot be empty".to_string());
        }
        if self.title.len() > 255 {
            return Err("Title cannot exceed 255 characters".to_string());
        }
        Ok(())
    }

    pub fn validate_alias(&self) -> Result<(), String> {
        if self.page_type == PageType::Root && self.alias.is_empty() {
            return Ok(());
        }
        if !is_valid_alias(&self.alias) {
            return Err(format!(
                "Invalid alias '{}': only letters, numbers, hyphens, underscores, dots and slashes are allowed",
                self.alias
            ));
        }
        Ok(())
    }

    pub fn validate_hierarchy(&self) -> Result<(), String> {
        match (self.page_type, self.pid) {
            (PageType::Root, Some(_)) => Err("Root pages cannot have a parent".to_string()),
            (PageType::Root, None) => Ok(()),
            (_, None) => Err("Only root pages can be created without a parent".to_string()),
            _ => Ok(()),
        }
    }

    pub fn validate_redirect(&self) -> Result<(), String> {
        if self.page_type == PageType::Redirect {
            match self.url.as_deref() {
                Some(url) if !url.trim().is_empty() => {}
                _ => return Err("Redirect pages need a target URL".to_string()),
            }
        }
        Ok(())
    }

    pub fn validate_url_suffix(&self) -> Result<(), String> {
        if self.url_suffix.contains('/') || self.url_suffix.contains('?') {
            return Err("URL suffix cannot contain slashes or query strings".to_string());
        }
        Ok(())
    }

    pub fn is_valid(&self) -> Result<(), String> {
        self.validate_title()?;
        self.validate_alias()?;
        self.validate_hierarchy()?;
        self.validate_redirect()?;
        self.validate_url_suffix()?;
        Ok(())
    }
}

impl Publishable for Page {
    fn is_published(&self) -> bool {
        self.published
    }

    fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    fn stop(&self) -> Option<DateTime<Utc>> {
        self.stop
    }
}

impl Protectable for Page {
    fn is_protected(&self) -> bool {
        self.protected
    }

    fn allowed_groups(&self) -> &[i64] {
        &self.groups
    }
}
