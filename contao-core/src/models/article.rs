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

use crate::models::headline::CssId;
use crate::utils::alias::generate_alias;
use crate::visibility::{Protectable, Publishable};

/// Layout columns a page can place articles and modules in.
pub const COLUMNS: &[&str] = &["header", "left", "main", "right", "footer"];

pub fn is_valid_column(column: &str) -> bool {
    COLUMNS.contains(&column)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub id: Option<i64>,
    pub pid: i64,
    pub sorting: i64,
    pub title: String,
    pub alias: String,
    pub in_column: String,
    pub show_teaser: bool,
    pub teaser: Option<String>,
    pub css: CssId,
    pub published: bool,
    pub start: Option<DateTime<Utc>>,
    pub stop: Option<DateTime<Utc>>,
    pub protected: bool,
    pub groups: Vec<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Article {
    pub fn new(pid: i64, title: String) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            pid,
            sorting: 0,
            alias: generate_alias(&title),
            title,
            in_column: "main".to_string(),
            show_teaser: false,
            teaser: None,
            css: CssId::default(),
            published: true,
            start: None,
            stop: None,
            protected: false,
            groups: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> i64 {
        self.id.unwrap_or_default()
    }

    /// HTML id of the article container: the CSS id, the alias, or `article-<id>`.
    pub fn html_id(&self) -> String {
        if !self.css.id.trim().is_empty() {
            self.css.id.trim().to_string()
        } else if !self.alias.is_empty() {
            self.alias.clone()
        } else {
            format!("article-{}", self.id())
        }
    }

    /// The URL fragment used to address the article on its page.
    pub fn url_key(&self) -> String {
        if self.alias.is_empty() {
            self.id().to_string()
        } else {
            self.alias.clone()
        }
    }

    pub fn is_valid(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Article title cannot be empty".to_string());
        }
        if !is_valid_column(&self.in_column) {
            return Err(format!("Unknown layout column '{}'", self.in_column));
        }
        Ok(())
    }
}

impl Publishable for Article {
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

impl Protectable for Article {
    fn is_protected(&self) -> bool {
        self.protected
    }

    fn allowed_groups(&self) -> &[i64] {
        &self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_article() {
        let article = Article::new(3, "Welcome Home".to_string());
        assert_eq!(article.pid, 3);
        assert_eq!(article.alias, "welcome-home");
        assert_eq!(article.in_column, "main");
        assert!(article.published);
        assert!(article.is_valid().is_ok());
    }

    #[test]
    fn test_html_id_fallbacks() {
        let mut article = Article::new(1, "Intro".to_string());
        article.id = Some(12);
        assert_eq!(article.html_id(), "intro");

        article.css.id = "custom".to_string();
        assert_eq!(article.html_id(), "custom");

        article.css.id = String::new();
        article.alias = String::new();
        assert_eq!(article.html_id(), "article-12");
        assert_eq!(article.url_key(), "12");
    }

    #[test]
    fn test_invalid_column() {
        let mut article = Article::new(1, "Intro".to_string());
        article.in_column = "sidebar".to_string();
        assert!(article.is_valid().is_err());
    }
}
