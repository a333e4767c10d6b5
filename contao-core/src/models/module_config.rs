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
use serde_json::Value;

use crate::models::headline::{CssId, Headline};
use crate::navigation::NavigationOptions;

/// Front-end module types the renderer registers.
pub const MODULE_TYPES: &[&str] = &[
    "navigation",
    "customnav",
    "breadcrumb",
    "sitemap",
    "booknav",
    "quicknav",
    "quicklink",
    "articlelist",
    "search",
    "login",
    "registration",
    "lostpassword",
    "personaldata",
    "changepassword",
    "closeaccount",
    "html",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    #[default]
    And,
    Or,
}

impl QueryType {
    pub fn parse(value: &str) -> Self {
        match value {
            "or" => QueryType::Or,
            _ => QueryType::And,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::And => "and",
            QueryType::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CloseMode {
    #[default]
    Deactivate,
    Delete,
}

/// A configured front-end module (`tl_module`).
///
/// Type-specific settings live in `data` and are read through the typed
/// accessors below, each with the default the renderer expects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModuleConfig {
    pub id: Option<i64>,
    pub name: String,
    pub module_type: String,
    pub headline: Option<Headline>,
    pub css: CssId,
    pub custom_tpl: Option<String>,
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ModuleConfig {
    pub fn new(name: String, module_type: String, data: Value) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            name,
            module_type,
            headline: None,
            css: CssId::default(),
            custom_tpl: None,
            data,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> i64 {
        self.id.unwrap_or_default()
    }

    fn get_i64(&self, key: &str) -> Option<i64> {
        self.data.get(key).and_then(|v| v.as_i64())
    }

    fn get_bool(&self, key: &str) -> bool {
        self.data
            .get(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.data
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }

    fn get_ids(&self, key: &str) -> Vec<i64> {
        self.data
            .get(key)
            .and_then(|v| v.as_array())
            .map(|items| items.iter().filter_map(|v| v.as_i64()).collect())
            .unwrap_or_default()
    }

    fn get_usize(&self, key: &str) -> usize {
        self.get_i64(key)
            .filter(|v| *v > 0)
            .map(|v| v as usize)
            .unwrap_or(0)
    }

    pub fn level_offset(&self) -> usize {
        self.get_usize("level_offset")
    }

    pub fn show_level(&self) -> usize {
        self.get_usize("show_level")
    }

    pub fn hard_limit(&self) -> bool {
        self.get_bool("hard_limit")
    }

    pub fn show_protected(&self) -> bool {
        self.get_bool("show_protected")
    }

    pub fn show_hidden(&self) -> bool {
        self.get_bool("show_hidden")
    }

    /// Reference page, only when `define_root` is switched on.
    pub fn root_page(&self) -> Option<i64> {
        if self.get_bool("define_root") {
            self.get_i64("root_page").filter(|id| *id > 0)
        } else {
            None
        }
    }

    pub fn navigation_tpl(&self) -> &str {
        self.get_str("navigation_tpl").unwrap_or("nav_default")
    }

    pub fn pages(&self) -> Vec<i64> {
        self.get_ids("pages")
    }

    pub fn include_root(&self) -> bool {
        self.data
            .get("include_root")
            .and_then(|v| v.as_bool())
            .unwrap_or(true)
    }

    pub fn jump_to(&self) -> Option<i64> {
        self.get_i64("jump_to").filter(|id| *id > 0)
    }

    pub fn redirect_back(&self) -> bool {
        self.get_bool("redirect_back")
    }

    pub fn per_page(&self) -> usize {
        self.get_usize("per_page")
    }

    pub fn query_type(&self) -> QueryType {
        self.get_str("query_type")
            .map(QueryType::parse)
            .unwrap_or_default()
    }

    pub fn fuzzy(&self) -> bool {
        self.get_bool("fuzzy")
    }

    pub fn is_advanced_search(&self) -> bool {
        self.get_str("search_type") == Some("advanced")
    }

    pub fn context_length(&self) -> usize {
        match self.get_usize("context_length") {
            0 => 48,
            n => n,
        }
    }

    pub fn total_length(&self) -> usize {
        match self.get_usize("total_length") {
            0 => 360,
            n => n,
        }
    }

    pub fn min_keyword_length(&self) -> usize {
        self.get_usize("min_keyword_length")
    }

    pub fn reg_groups(&self) -> Vec<i64> {
        self.get_ids("reg_groups")
    }

    pub fn reg_activate(&self) -> bool {
        self.get_bool("reg_activate")
    }

    pub fn reg_allow_login(&self) -> bool {
        self.get_bool("reg_allow_login")
    }

    pub fn reg_jump_to(&self) -> Option<i64> {
        self.get_i64("reg_jump_to").filter(|id| *id > 0)
    }

    pub fn reg_skip_name(&self) -> bool {
        self.get_bool("reg_skip_name")
    }

    pub fn close_mode(&self) -> CloseMode {
        match self.get_str("reg_close") {
            Some("close_delete") => CloseMode::Delete,
            _ => CloseMode::Deactivate,
        }
    }

    /// Member fields the personal data module lets members edit.
    pub fn editable(&self) -> Vec<String> {
        const ALLOWED: &[&str] = &["firstname", "lastname", "email"];
        let configured: Vec<String> = self
            .data
            .get("editable")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .filter(|f| ALLOWED.contains(f))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if configured.is_empty() {
            ALLOWED.iter().map(|f| f.to_string()).collect()
        } else {
            configured
        }
    }

    pub fn html(&self) -> &str {
        self.get_str("html").unwrap_or("")
    }

    pub fn in_column(&self) -> &str {
        self.get_str("in_column").unwrap_or("main")
    }

    pub fn skip_first(&self) -> usize {
        self.get_usize("skip_first")
    }

    pub fn custom_label(&self) -> Option<&str> {
        self.get_str("custom_label")
    }

    pub fn navigation_options(&self) -> NavigationOptions {
        NavigationOptions {
            level_offset: self.level_offset(),
            show_level: self.show_level(),
            hard_limit: self.hard_limit(),
            show_protected: self.show_protected(),
            show_hidden: self.show_hidden(),
            sitemap: false,
        }
    }

    /// Template name, honouring a custom template when one is configured.
    pub fn template_name(&self) -> String {
        match self.custom_tpl.as_deref() {
            Some(tpl) if !tpl.trim().is_empty() => tpl.trim().to_string(),
            _ => format!("mod_{}", self.module_type),
        }
    }

    pub fn is_valid(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Module name cannot be empty".to_string());
        }
        if !MODULE_TYPES.contains(&self.module_type.as_str()) {
            return Err(format!("Unknown module type '{}'", self.module_type));
        }
        if !self.data.is_object() {
            return Err("Module settings must be a JSON object".to_string());
        }
        Ok(())
    }
}
