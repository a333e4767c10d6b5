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

//! URL generation for pages and articles.

use crate::models::article::Article;
use crate::models::page::Page;

/// Alias that maps to the site root URL.
pub const INDEX_ALIAS: &str = "index";

/// Front-end URL of a page.
///
/// `is_start_page` marks the first regular page of a root, which is served at `/`.
pub fn page_url(page: &Page, url_suffix: &str, is_start_page: bool) -> String {
    if page.is_root() || is_start_page || page.alias == INDEX_ALIAS || page.alias.is_empty() {
        return "/".to_string();
    }
    format!("/{}{}", page.alias, url_suffix)
}

/// URL of a page with an extra path fragment, e.g. `/news/articles/intro.html`.
pub fn page_url_with_params(page: &Page, url_suffix: &str, params: &str) -> String {
    let alias = if page.alias.is_empty() {
        INDEX_ALIAS
    } else {
        page.alias.as_str()
    };
    format!("/{}/{}{}", alias, params.trim_matches('/'), url_suffix)
}

pub fn article_url(page: &Page, article: &Article, url_suffix: &str) -> String {
    page_url_with_params(page, url_suffix, &format!("articles/{}", article.url_key()))
}

/// The page alias and optional article key addressed by a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub alias: String,
    pub article: Option<String>,
}

/// Split a request path into page alias and article key, removing the suffix.
///
/// Returns `None` for the empty path (the site root) and for paths that
/// do not carry the configured suffix.
pub fn resolve_path(path: &str, url_suffix: &str) -> Option<ResolvedPath> {
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        return None;
    }

    let stripped = if url_suffix.is_empty() {
        path
    } else {
        path.strip_suffix(url_suffix)?
    };
    if stripped.is_empty() {
        return None;
    }

    if let Some((alias, article)) = stripped.split_once("/articles/") {
        if !alias.is_empty() && !article.is_empty() && !article.contains('/') {
            return Some(ResolvedPath {
                alias: alias.to_string(),
                article: Some(article.to_string()),
            });
        }
    }

    Some(ResolvedPath {
        alias: stripped.to_string(),
        article: None,
    })
}

/// Only same-site absolute paths are accepted as redirect targets.
pub fn is_local_url(url: &str) -> bool {
    url.starts_with('/') && !url.starts_with("//") && !url.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page(alias: &str) -> Page {
        let mut page = Page::new_regular(1, "Title".to_string());
        page.alias = alias.to_string();
        page
    }

    #[test]
    fn test_page_url() {
        assert_eq!(page_url(&page("about"), ".html", false), "/about.html");
        assert_eq!(page_url(&page("about/team"), "", false), "/about/team");
        assert_eq!(page_url(&page("index"), ".html", false), "/");
        assert_eq!(page_url(&page("home"), ".html", true), "/");
    }

    #[test]
    fn test_article_url() {
        let mut article = Article::new(1, "Intro Text".to_string());
        article.id = Some(3);
        assert_eq!(
            article_url(&page("news"), &article, ".html"),
            "/news/articles/intro-text.html"
        );
        article.alias = String::new();
        assert_eq!(article_url(&page("news"), &article, ""), "/news/articles/3");
    }

    #[test]
    fn test_resolve_path() {
        assert_eq!(resolve_path("/", ".html"), None);
        assert_eq!(resolve_path("/about", ".html"), None);
        assert_eq!(
            resolve_path("/about.html", ".html"),
            Some(ResolvedPath {
                alias: "about".to_string(),
                article: None
            })
        );
        assert_eq!(
            resolve_path("/news/articles/intro.html", ".html"),
            Some(ResolvedPath {
                alias: "news".to_string(),
                article: Some("intro".to_string())
            })
        );
        assert_eq!(
            resolve_path("/about/team", ""),
            Some(ResolvedPath {
                alias: "about/team".to_string(),
                article: None
            })
        );
    }

    #[test]
    fn test_is_local_url() {
        assert!(is_local_url("/about.html"));
        assert!(!is_local_url("//evil.example"));
        assert!(!is_local_url("https://evil.example"));
        assert!(!is_local_url("/\\evil.example"));
    }
}
