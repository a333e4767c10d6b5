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

use std::collections::HashMap;

use anyhow::{Context, Result};
use contao_core::models::search_entry::{SearchEntry, SearchTerm};
use contao_core::search::{Keyword, TermMatch};
use sqlx::SqlitePool;

use crate::datetime::{ids_to_json, parse_datetime, parse_ids};

const SEARCH_COLUMNS: &str = r#"
    id, root_id, page_id, url, title, text, checksum, protected, access_groups, language, indexed_at
"#;

#[derive(sqlx::FromRow)]
struct SearchRow {
    id: i64,
    root_id: i64,
    page_id: i64,
    url: String,
    title: String,
    text: String,
    checksum: String,
    protected: bool,
    access_groups: String,
    language: String,
    indexed_at: String,
}

impl TryFrom<SearchRow> for SearchEntry {
    type Error = anyhow::Error;

    fn try_from(row: SearchRow) -> Result<Self> {
        Ok(SearchEntry {
            id: Some(row.id),
            root_id: row.root_id,
            page_id: row.page_id,
            url: row.url,
            title: row.title,
            text: row.text,
            checksum: row.checksum,
            protected: row.protected,
            groups: parse_ids(&row.access_groups, "access_groups")?,
            language: row.language,
            indexed_at: parse_datetime(&row.indexed_at, "indexed_at")?,
        })
    }
}

/// Escape `%`, `_` and the escape character itself for a LIKE pattern.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn like_pattern(keyword: &Keyword) -> String {
    let term = escape_like(&keyword.term);
    match keyword.matching {
        TermMatch::Exact => term,
        TermMatch::Prefix => format!("{}%", term),
        TermMatch::Infix => format!("%{}%", term),
    }
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

pub struct SearchRepository {
    pool: SqlitePool,
}

impl SearchRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a page in the index, replacing an older version under the same
    /// URL of the same site root.
    ///
    /// Returns `false` when the stored checksum equals the new one and nothing
    /// was written.
    pub async fn index_page(&self, entry: &SearchEntry, terms: &[SearchTerm]) -> Result<bool> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        let existing: Option<(i64, String)> =
            sqlx::query_as("SELECT id, checksum FROM tl_search WHERE root_id = ? AND url = ?")
                .bind(entry.root_id)
                .bind(&entry.url)
                .fetch_optional(&mut *tx)
                .await
                .context("Failed to look up indexed page")?;

        let search_id = match existing {
            Some((_, checksum)) if checksum == entry.checksum => {
                tx.rollback().await.context("Failed to roll back transaction")?;
                return Ok(false);
            }
            Some((id, _)) => {
                sqlx::query(
                    r#"
                    UPDATE tl_search SET
                        page_id = ?, title = ?, text = ?, checksum = ?,
                        protected = ?, access_groups = ?, language = ?, indexed_at = ?
                    WHERE id = ?
                    "#,
                )
                .bind(entry.page_id)
                .bind(&entry.title)
                .bind(&entry.text)
                .bind(&entry.checksum)
                .bind(entry.protected)
                .bind(ids_to_json(&entry.groups))
                .bind(&entry.language)
                .bind(entry.indexed_at)
                .bind(id)
                .execute(&mut *tx)
                .await
                .context("Failed to update indexed page")?;

                sqlx::query("DELETE FROM tl_search_term WHERE search_id = ?")
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .context("Failed to clear search terms")?;
                id
            }
            None => sqlx::query(
                r#"
                INSERT INTO tl_search (
                    root_id, page_id, url, title, text, checksum, protected, access_groups,
                    language, indexed_at
                )
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(entry.root_id)
            .bind(entry.page_id)
            .bind(&entry.url)
            .bind(&entry.title)
            .bind(&entry.text)
            .bind(&entry.checksum)
            .bind(entry.protected)
            .bind(ids_to_json(&entry.groups))
            .bind(&entry.language)
            .bind(entry.indexed_at)
            .execute(&mut *tx)
            .await
            .context("Failed to insert indexed page")?
            .last_insert_rowid(),
        };

        for term in terms {
            sqlx::query("INSERT INTO tl_search_term (search_id, term, relevance) VALUES (?, ?, ?)")
                .bind(search_id)
                .bind(&term.term)
                .bind(term.relevance)
                .execute(&mut *tx)
                .await
                .context("Failed to insert search term")?;
        }

        tx.commit().await.context("Failed to commit transaction")?;
        Ok(true)
    }

    pub async fn find_by_url(&self, root_id: i64, url: &str) -> Result<Option<SearchEntry>> {
        let row = sqlx::query_as::<_, SearchRow>(&format!(
            "SELECT {} FROM tl_search WHERE root_id = ? AND url = ?",
            SEARCH_COLUMNS
        ))
        .bind(root_id)
        .bind(url)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find indexed page by url")?;

        row.map(SearchEntry::try_from).transpose()
    }

    pub async fn remove_by_url(&self, root_id: i64, url: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tl_search WHERE root_id = ? AND url = ?")
            .bind(root_id)
            .bind(url)
            .execute(&self.pool)
            .await
            .context("Failed to remove indexed page")?;

        Ok(result.rows_affected() > 0)
    }

    /// Drop every indexed URL of a page.
    pub async fn remove_by_page(&self, page_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM tl_search WHERE page_id = ?")
            .bind(page_id)
            .execute(&self.pool)
            .await
            .context("Failed to remove indexed pages")?;

        Ok(result.rows_affected())
    }

    pub async fn count(&self) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM tl_search")
            .fetch_one(&self.pool)
            .await
            .context("Failed to count indexed pages")
    }

    /// Indexed pages of a site that contain at least one of the keywords,
    /// each with its full term list.
    pub async fn find_candidates(
        &self,
        root_id: i64,
        keywords: &[Keyword],
    ) -> Result<Vec<(SearchEntry, Vec<SearchTerm>)>> {
        if keywords.is_empty() {
            return Ok(Vec::new());
        }

        let conditions = vec!["t.term LIKE ? ESCAPE '\\'"; keywords.len()].join(" OR ");
        let sql = format!(
            r#"
            SELECT DISTINCT s.id FROM tl_search s
            JOIN tl_search_term t ON t.search_id = s.id
            WHERE s.root_id = ? AND ({})
            "#,
            conditions
        );
        let mut query = sqlx::query_scalar::<_, i64>(&sql).bind(root_id);
        for keyword in keywords {
            query = query.bind(like_pattern(keyword));
        }
        let ids: Vec<i64> = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to find search candidates")?;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {} FROM tl_search WHERE id IN ({}) ORDER BY id",
            SEARCH_COLUMNS,
            placeholders(ids.len())
        );
        let mut query = sqlx::query_as::<_, SearchRow>(&sql);
        for id in &ids {
            query = query.bind(id);
        }
        let entries = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to load search candidates")?;

        let sql = format!(
            "SELECT search_id, term, relevance FROM tl_search_term WHERE search_id IN ({})",
            placeholders(ids.len())
        );
        let mut query = sqlx::query_as::<_, (i64, String, i64)>(&sql);
        for id in &ids {
            query = query.bind(id);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to load search terms")?;

        let mut terms: HashMap<i64, Vec<SearchTerm>> = HashMap::new();
        for (search_id, term, relevance) in rows {
            terms
                .entry(search_id)
                .or_default()
                .push(SearchTerm { term, relevance });
        }

        entries
            .into_iter()
            .map(|row| {
                let entry_terms = terms.remove(&row.id).unwrap_or_default();
                SearchEntry::try_from(row).map(|entry| (entry, entry_terms))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::init_database;
    use chrono::Utc;
    use contao_core::models::module_config::QueryType;
    use contao_core::search::{term_frequencies, SearchQuery};

    fn entry(url: &str, title: &str, text: &str, checksum: &str) -> SearchEntry {
        SearchEntry {
            id: None,
            root_id: 1,
            page_id: 2,
            url: url.to_string(),
            title: title.to_string(),
            text: text.to_string(),
            checksum: checksum.to_string(),
            protected: false,
            groups: Vec::new(),
            language: "en".to_string(),
            indexed_at: Utc::now(),
        }
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
    }

    #[tokio::test]
    async fn test_index_page_skips_unchanged_checksum() -> Result<()> {
        let pool = init_database("sqlite::memory:").await?;
        let repo = SearchRepository::new(pool);

        let text = "Rust makes systems programming pleasant";
        let first = entry("/rust.html", "Rust", text, "abc");
        assert!(repo.index_page(&first, &term_frequencies(text)).await?);
        assert!(!repo.index_page(&first, &term_frequencies(text)).await?);

        let changed = entry("/rust.html", "Rust!", "Rust is fast", "def");
        assert!(repo.index_page(&changed, &term_frequencies(&changed.text)).await?);
        assert_eq!(repo.count().await?, 1);
        assert_eq!(
            repo.find_by_url(1, "/rust.html").await?.map(|e| e.title),
            Some("Rust!".to_string())
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_find_candidates_and_rank() -> Result<()> {
        let pool = init_database("sqlite::memory:").await?;
        let repo = SearchRepository::new(pool);

        let pages = [
            ("/a.html", "A", "rust rust rust and cargo"),
            ("/b.html", "B", "rust once"),
            ("/c.html", "C", "nothing relevant here"),
        ];
        for (url, title, text) in pages {
            repo.index_page(&entry(url, title, text, url), &term_frequencies(text))
                .await?;
        }

        let query = SearchQuery::parse("rust", QueryType::And, false, 0);
        let candidates = repo.find_candidates(1, &query.highlight_keywords()).await?;
        assert_eq!(candidates.len(), 2);

        let hits = query.rank(candidates, 48, 360);
        assert_eq!(hits[0].entry.url, "/a.html");
        assert_eq!(hits[0].percent, 100);
        assert_eq!(hits[1].percent, 33);

        assert!(repo.find_candidates(99, &query.highlight_keywords()).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_prefix_candidates_and_removal() -> Result<()> {
        let pool = init_database("sqlite::memory:").await?;
        let repo = SearchRepository::new(pool);
        let text = "programming languages";
        repo.index_page(&entry("/p.html", "P", text, "x"), &term_frequencies(text))
            .await?;

        let query = SearchQuery::parse("program*", QueryType::And, false, 0);
        assert_eq!(repo.find_candidates(1, &query.highlight_keywords()).await?.len(), 1);

        assert!(repo.remove_by_url(1, "/p.html").await?);
        assert!(!repo.remove_by_url(1, "/p.html").await?);
        assert!(repo.find_candidates(1, &query.highlight_keywords()).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_same_url_is_kept_per_site_root() -> Result<()> {
        let pool = init_database("sqlite::memory:").await?;
        let repo = SearchRepository::new(pool);

        let text = "about our company";
        repo.index_page(&entry("/about.html", "About", text, "a"), &term_frequencies(text))
            .await?;
        let shop_text = "about our shop";
        let mut shop = entry("/about.html", "About the shop", shop_text, "b");
        shop.root_id = 7;
        shop.page_id = 8;
        assert!(repo.index_page(&shop, &term_frequencies(shop_text)).await?);

        assert_eq!(repo.count().await?, 2);
        assert_eq!(
            repo.find_by_url(1, "/about.html").await?.map(|e| e.title),
            Some("About".to_string())
        );
        assert_eq!(
            repo.find_by_url(7, "/about.html").await?.map(|e| e.page_id),
            Some(8)
        );

        let query = SearchQuery::parse("shop", QueryType::And, false, 0);
        assert!(repo.find_candidates(1, &query.highlight_keywords()).await?.is_empty());
        assert_eq!(repo.find_candidates(7, &query.highlight_keywords()).await?.len(), 1);

        assert!(repo.remove_by_url(7, "/about.html").await?);
        assert!(repo.find_by_url(1, "/about.html").await?.is_some());
        Ok(())
    }
}
