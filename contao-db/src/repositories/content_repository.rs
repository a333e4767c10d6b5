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
use contao_core::models::content_element::ContentElement;
use contao_core::models::headline::{CssId, Headline};
use sqlx::SqlitePool;

use crate::datetime::{ids_to_json, parse_datetime, parse_ids, parse_optional_datetime};

const CONTENT_COLUMNS: &str = r#"
    id, pid, sorting, type, headline, css_id, css_class, invisible, start, stop,
    protected, access_groups, data, created_at, updated_at
"#;

#[derive(sqlx::FromRow)]
struct ContentRow {
    id: i64,
    pid: i64,
    sorting: i64,
    #[sqlx(rename = "type")]
    element_type: String,
    headline: Option<String>,
    css_id: String,
    css_class: String,
    invisible: bool,
    start: Option<String>,
    stop: Option<String>,
    protected: bool,
    access_groups: String,
    data: String,
    created_at: String,
    updated_at: String,
}

pub(crate) fn parse_headline(value: Option<&str>) -> Result<Option<Headline>> {
    match value {
        Some(v) if !v.trim().is_empty() => {
            Ok(Some(serde_json::from_str(v).context("Failed to parse headline")?))
        }
        _ => Ok(None),
    }
}

pub(crate) fn headline_to_json(headline: &Option<Headline>) -> Result<Option<String>> {
    headline
        .as_ref()
        .map(|h| serde_json::to_string(h).context("Failed to serialize headline"))
        .transpose()
}

impl TryFrom<ContentRow> for ContentElement {
    type Error = anyhow::Error;

    fn try_from(row: ContentRow) -> Result<Self> {
        Ok(ContentElement {
            id: Some(row.id),
            pid: row.pid,
            sorting: row.sorting,
            element_type: row.element_type,
            headline: parse_headline(row.headline.as_deref())?,
            css: CssId {
                id: row.css_id,
                class: row.css_class,
            },
            invisible: row.invisible,
            start: parse_optional_datetime(row.start.as_deref(), "start")?,
            stop: parse_optional_datetime(row.stop.as_deref(), "stop")?,
            protected: row.protected,
            groups: parse_ids(&row.access_groups, "access_groups")?,
            data: serde_json::from_str(&row.data).context("Failed to parse element data")?,
            created_at: parse_datetime(&row.created_at, "created_at")?,
            updated_at: parse_datetime(&row.updated_at, "updated_at")?,
        })
    }
}

pub struct ContentRepository {
    pool: SqlitePool,
}

impl ContentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, element: &ContentElement) -> Result<i64> {
        if let Err(e) = element.is_valid() {
            return Err(anyhow::anyhow!("Invalid content element: {}", e));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO tl_content (
                pid, sorting, type, headline, css_id, css_class, invisible, start, stop,
                protected, access_groups, data, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(element.pid)
        .bind(element.sorting)
        .bind(&element.element_type)
        .bind(headline_to_json(&element.headline)?)
        .bind(&element.css.id)
        .bind(&element.css.class)
        .bind(element.invisible)
        .bind(element.start)
        .bind(element.stop)
        .bind(element.protected)
        .bind(ids_to_json(&element.groups))
        .bind(element.data.to_string())
        .bind(element.created_at)
        .bind(element.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to create content element")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update(&self, element: &ContentElement) -> Result<()> {
        let id = element
            .id
            .ok_or_else(|| anyhow::anyhow!("Cannot update content element without id"))?;

        let rows_affected = sqlx::query(
            r#"
            UPDATE tl_content SET
                pid = ?, sorting = ?, type = ?, headline = ?, css_id = ?, css_class = ?,
                invisible = ?, start = ?, stop = ?, protected = ?, access_groups = ?,
                data = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(element.pid)
        .bind(element.sorting)
        .bind(&element.element_type)
        .bind(headline_to_json(&element.headline)?)
        .bind(&element.css.id)
        .bind(&element.css.class)
        .bind(element.invisible)
        .bind(element.start)
        .bind(element.stop)
        .bind(element.protected)
        .bind(ids_to_json(&element.groups))
        .bind(element.data.to_string())
        .bind(chrono::Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update content element")?
        .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Content element not found"));
        }
        Ok(())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<ContentElement>> {
        let row = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT {} FROM tl_content WHERE id = ?",
            CONTENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find content element by id")?;

        row.map(ContentElement::try_from).transpose()
    }

    pub async fn find_by_article(&self, article_id: i64) -> Result<Vec<ContentElement>> {
        let rows = sqlx::query_as::<_, ContentRow>(&format!(
            "SELECT {} FROM tl_content WHERE pid = ? ORDER BY sorting, id",
            CONTENT_COLUMNS
        ))
        .bind(article_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to find content elements by article")?;

        rows.into_iter().map(ContentElement::try_from).collect()
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM tl_content WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete content element")?
            .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Content element not found"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::init_database;
    use crate::repositories::article_repository::ArticleRepository;
    use crate::repositories::page_repository::PageRepository;
    use contao_core::models::article::Article;
    use contao_core::models::page::Page;
    use serde_json::json;

    async fn setup() -> Result<(SqlitePool, i64)> {
        let pool = init_database("sqlite::memory:").await?;
        let pages = PageRepository::new(pool.clone());
        let root_id = pages
            .create(&Page::new_root("Site".to_string(), String::new(), "en".to_string()))
            .await?;
        let page_id = pages.create(&Page::new_regular(root_id, "Home".to_string())).await?;
        let article_id = ArticleRepository::new(pool.clone())
            .create(&Article::new(page_id, "Welcome".to_string()))
            .await?;
        Ok((pool, article_id))
    }

    #[tokio::test]
    async fn test_create_and_find_by_article() -> Result<()> {
        let (pool, article_id) = setup().await?;
        let repo = ContentRepository::new(pool);

        let mut text = ContentElement::new(article_id, "text".to_string(), json!({"text": "<p>Hi</p>"}))
            .with_headline("h1", "Hello");
        text.sorting = 2;
        let mut list = ContentElement::new(
            article_id,
            "list".to_string(),
            json!({"list_type": "ordered", "items": ["a", "b"]}),
        );
        list.sorting = 1;
        list.invisible = true;

        repo.create(&text).await?;
        repo.create(&list).await?;

        let elements = repo.find_by_article(article_id).await?;
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].element_type, "list");
        assert!(elements[0].invisible);
        assert_eq!(elements[0].strings("items"), vec!["a", "b"]);
        assert_eq!(elements[1].headline, Some(Headline::new("h1", "Hello")));
        assert_eq!(elements[1].text("text"), "<p>Hi</p>");
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete() -> Result<()> {
        let (pool, article_id) = setup().await?;
        let repo = ContentRepository::new(pool);
        let id = repo
            .create(&ContentElement::new(article_id, "html".to_string(), json!({"html": "<b>x</b>"})))
            .await?;

        let mut element = repo.find_by_id(id).await?.expect("element exists");
        element.data = json!({"html": "<i>y</i>"});
        element.protected = true;
        element.groups = vec![1];
        repo.update(&element).await?;

        let updated = repo.find_by_id(id).await?.expect("element exists");
        assert_eq!(updated.text("html"), "<i>y</i>");
        assert!(updated.protected);
        assert_eq!(updated.groups, vec![1]);

        repo.delete(id).await?;
        assert!(repo.find_by_id(id).await?.is_none());
        Ok(())
    }
}
