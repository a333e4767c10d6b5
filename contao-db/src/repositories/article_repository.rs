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
use contao_core::models::article::Article;
use contao_core::models::headline::CssId;
use sqlx::SqlitePool;

use crate::datetime::{ids_to_json, parse_datetime, parse_ids, parse_optional_datetime};

const ARTICLE_COLUMNS: &str = r#"
    id, pid, sorting, title, alias, in_column, show_teaser, teaser, css_id, css_class,
    published, start, stop, protected, access_groups, created_at, updated_at
"#;

#[derive(sqlx::FromRow)]
struct ArticleRow {
    id: i64,
    pid: i64,
    sorting: i64,
    title: String,
    alias: String,
    in_column: String,
    show_teaser: bool,
    teaser: Option<String>,
    css_id: String,
    css_class: String,
    published: bool,
    start: Option<String>,
    stop: Option<String>,
    protected: bool,
    access_groups: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ArticleRow> for Article {
    type Error = anyhow::Error;

    fn try_from(row: ArticleRow) -> Result<Self> {
        Ok(Article {
            id: Some(row.id),
            pid: row.pid,
            sorting: row.sorting,
            title: row.title,
            alias: row.alias,
            in_column: row.in_column,
            show_teaser: row.show_teaser,
            teaser: row.teaser,
            css: CssId {
                id: row.css_id,
                class: row.css_class,
            },
            published: row.published,
            start: parse_optional_datetime(row.start.as_deref(), "start")?,
            stop: parse_optional_datetime(row.stop.as_deref(), "stop")?,
            protected: row.protected,
            groups: parse_ids(&row.access_groups, "access_groups")?,
            created_at: parse_datetime(&row.created_at, "created_at")?,
            updated_at: parse_datetime(&row.updated_at, "updated_at")?,
        })
    }
}

pub struct ArticleRepository {
    pool: SqlitePool,
}

impl ArticleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, article: &Article) -> Result<i64> {
        if let Err(e) = article.is_valid() {
            return Err(anyhow::anyhow!("Invalid article: {}", e));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO tl_article (
                pid, sorting, title, alias, in_column, show_teaser, teaser, css_id, css_class,
                published, start, stop, protected, access_groups, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(article.pid)
        .bind(article.sorting)
        .bind(&article.title)
        .bind(&article.alias)
        .bind(&article.in_column)
        .bind(article.show_teaser)
        .bind(&article.teaser)
        .bind(&article.css.id)
        .bind(&article.css.class)
        .bind(article.published)
        .bind(article.start)
        .bind(article.stop)
        .bind(article.protected)
        .bind(ids_to_json(&article.groups))
        .bind(article.created_at)
        .bind(article.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to create article")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update(&self, article: &Article) -> Result<()> {
        let id = article
            .id
            .ok_or_else(|| anyhow::anyhow!("Cannot update article without id"))?;

        let rows_affected = sqlx::query(
            r#"
            UPDATE tl_article SET
                pid = ?, sorting = ?, title = ?, alias = ?, in_column = ?, show_teaser = ?,
                teaser = ?, css_id = ?, css_class = ?, published = ?, start = ?, stop = ?,
                protected = ?, access_groups = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(article.pid)
        .bind(article.sorting)
        .bind(&article.title)
        .bind(&article.alias)
        .bind(&article.in_column)
        .bind(article.show_teaser)
        .bind(&article.teaser)
        .bind(&article.css.id)
        .bind(&article.css.class)
        .bind(article.published)
        .bind(article.start)
        .bind(article.stop)
        .bind(article.protected)
        .bind(ids_to_json(&article.groups))
        .bind(chrono::Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update article")?
        .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Article not found"));
        }
        Ok(())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Article>> {
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {} FROM tl_article WHERE id = ?",
            ARTICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find article by id")?;

        row.map(Article::try_from).transpose()
    }

    /// Articles of a page in sorting order, published or not.
    pub async fn find_by_page(&self, page_id: i64) -> Result<Vec<Article>> {
        let rows = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {} FROM tl_article WHERE pid = ? ORDER BY sorting, id",
            ARTICLE_COLUMNS
        ))
        .bind(page_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to find articles by page")?;

        rows.into_iter().map(Article::try_from).collect()
    }

    /// Article of a page addressed by alias or numeric id.
    pub async fn find_by_key(&self, page_id: i64, key: &str) -> Result<Option<Article>> {
        let id: i64 = key.parse().unwrap_or(-1);
        let row = sqlx::query_as::<_, ArticleRow>(&format!(
            "SELECT {} FROM tl_article WHERE pid = ? AND (alias = ? OR id = ?) ORDER BY sorting LIMIT 1",
            ARTICLE_COLUMNS
        ))
        .bind(page_id)
        .bind(key)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find article by alias")?;

        row.map(Article::try_from).transpose()
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM tl_article WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete article")?
            .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Article not found"));
        }
        Ok(())
    }
}
