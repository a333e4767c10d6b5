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
use contao_core::models::page::{Page, PageType, RedirectType, SitemapMode};
use sqlx::SqlitePool;

use crate::datetime::{ids_to_json, parse_datetime, parse_ids, parse_optional_datetime};

const PAGE_COLUMNS: &str = r#"
    id, pid, sorting, type, title, alias, page_title, description, robots, language,
    dns, url_suffix, fallback, jump_to, url, redirect, target_blank, auto_forward,
    hide, guests, protected, access_groups, include_layout, layout, no_search, sitemap,
    css_class, accesskey, tabindex, published, start, stop, created_at, updated_at
"#;

#[derive(sqlx::FromRow)]
struct PageRow {
    id: i64,
    pid: Option<i64>,
    sorting: i64,
    #[sqlx(rename = "type")]
    page_type: String,
    title: String,
    alias: String,
    page_title: Option<String>,
    description: Option<String>,
    robots: String,
    language: String,
    dns: String,
    url_suffix: String,
    fallback: bool,
    jump_to: Option<i64>,
    url: Option<String>,
    redirect: String,
    target_blank: bool,
    auto_forward: bool,
    hide: bool,
    guests: bool,
    protected: bool,
    access_groups: String,
    include_layout: bool,
    layout: Option<i64>,
    no_search: bool,
    sitemap: String,
    css_class: String,
    accesskey: String,
    tabindex: i64,
    published: bool,
    start: Option<String>,
    stop: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<PageRow> for Page {
    type Error = anyhow::Error;

    fn try_from(row: PageRow) -> Result<Self> {
        let page_type = PageType::parse(&row.page_type)
            .ok_or_else(|| anyhow::anyhow!("Unknown page type '{}'", row.page_type))?;

        Ok(Page {
            id: Some(row.id),
            pid: row.pid,
            sorting: row.sorting,
            page_type,
            title: row.title,
            alias: row.alias,
            page_title: row.page_title,
            description: row.description,
            robots: row.robots,
            language: row.language,
            dns: row.dns,
            url_suffix: row.url_suffix,
            fallback: row.fallback,
            jump_to: row.jump_to,
            url: row.url,
            redirect: RedirectType::parse(&row.redirect),
            target_blank: row.target_blank,
            auto_forward: row.auto_forward,
            hide: row.hide,
            guests: row.guests,
            protected: row.protected,
            groups: parse_ids(&row.access_groups, "access_groups")?,
            include_layout: row.include_layout,
            layout: row.layout,
            no_search: row.no_search,
            sitemap: SitemapMode::parse(&row.sitemap),
            css_class: row.css_class,
            accesskey: row.accesskey,
            tabindex: row.tabindex,
            published: row.published,
            start: parse_optional_datetime(row.start.as_deref(), "start")?,
            stop: parse_optional_datetime(row.stop.as_deref(), "stop")?,
            created_at: parse_datetime(&row.created_at, "created_at")?,
            updated_at: parse_datetime(&row.updated_at, "updated_at")?,
        })
    }
}

pub struct PageRepository {
    pool: SqlitePool,
}

impl PageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, page: &Page) -> Result<i64> {
        if let Err(e) = page.is_valid() {
            return Err(anyhow::anyhow!("Invalid page: {}", e));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO tl_page (
                pid, sorting, type, title, alias, page_title, description, robots, language,
                dns, url_suffix, fallback, jump_to, url, redirect, target_blank, auto_forward,
                hide, guests, protected, access_groups, include_layout, layout, no_search, sitemap,
                css_class, accesskey, tabindex, published, start, stop, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(page.pid)
        .bind(page.sorting)
        .bind(page.page_type.as_str())
        .bind(&page.title)
        .bind(&page.alias)
        .bind(&page.page_title)
        .bind(&page.description)
        .bind(&page.robots)
        .bind(&page.language)
        .bind(&page.dns)
        .bind(&page.url_suffix)
        .bind(page.fallback)
        .bind(page.jump_to)
        .bind(&page.url)
        .bind(page.redirect.as_str())
        .bind(page.target_blank)
        .bind(page.auto_forward)
        .bind(page.hide)
        .bind(page.guests)
        .bind(page.protected)
        .bind(ids_to_json(&page.groups))
        .bind(page.include_layout)
        .bind(page.layout)
        .bind(page.no_search)
        .bind(page.sitemap.as_str())
        .bind(&page.css_class)
        .bind(&page.accesskey)
        .bind(page.tabindex)
        .bind(page.published)
        .bind(page.start)
        .bind(page.stop)
        .bind(page.created_at)
        .bind(page.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to create page")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update(&self, page: &Page) -> Result<()> {
        let id = page
            .id
            .ok_or_else(|| anyhow::anyhow!("Cannot update page without id"))?;
        if let Err(e) = page.is_valid() {
            return Err(anyhow::anyhow!("Invalid page: {}", e));
        }

        let rows_affected = sqlx::query(
            r#"
            UPDATE tl_page SET
                pid = ?, sorting = ?, type = ?, title = ?, alias = ?, page_title = ?,
                description = ?, robots = ?, language = ?, dns = ?, url_suffix = ?,
                fallback = ?, jump_to = ?, url = ?, redirect = ?, target_blank = ?,
                auto_forward = ?, hide = ?, guests = ?, protected = ?, access_groups = ?,
                include_layout = ?, layout = ?, no_search = ?, sitemap = ?, css_class = ?,
                accesskey = ?, tabindex = ?, published = ?, start = ?, stop = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(page.pid)
        .bind(page.sorting)
        .bind(page.page_type.as_str())
        .bind(&page.title)
        .bind(&page.alias)
        .bind(&page.page_title)
        .bind(&page.description)
        .bind(&page.robots)
        .bind(&page.language)
        .bind(&page.dns)
        .bind(&page.url_suffix)
        .bind(page.fallback)
        .bind(page.jump_to)
        .bind(&page.url)
        .bind(page.redirect.as_str())
        .bind(page.target_blank)
        .bind(page.auto_forward)
        .bind(page.hide)
        .bind(page.guests)
        .bind(page.protected)
        .bind(ids_to_json(&page.groups))
        .bind(page.include_layout)
        .bind(page.layout)
        .bind(page.no_search)
        .bind(page.sitemap.as_str())
        .bind(&page.css_class)
        .bind(&page.accesskey)
        .bind(page.tabindex)
        .bind(page.published)
        .bind(page.start)
        .bind(page.stop)
        .bind(chrono::Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update page")?
        .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Page not found"));
        }
        Ok(())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Page>> {
        let row = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {} FROM tl_page WHERE id = ?",
            PAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find page by id")?;

        row.map(Page::try_from).transpose()
    }

    /// Every page of the installation, ordered for tree building.
    pub async fn find_all(&self) -> Result<Vec<Page>> {
        let rows = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {} FROM tl_page ORDER BY pid, sorting, id",
            PAGE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list pages")?;

        rows.into_iter().map(Page::try_from).collect()
    }

    pub async fn find_by_pid(&self, pid: i64) -> Result<Vec<Page>> {
        let rows = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {} FROM tl_page WHERE pid = ? ORDER BY sorting, id",
            PAGE_COLUMNS
        ))
        .bind(pid)
        .fetch_all(&self.pool)
        .await
        .context("Failed to find pages by parent")?;

        rows.into_iter().map(Page::try_from).collect()
    }

    pub async fn find_roots(&self) -> Result<Vec<Page>> {
        let rows = sqlx::query_as::<_, PageRow>(&format!(
            "SELECT {} FROM tl_page WHERE type = 'root' ORDER BY sorting, id",
            PAGE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to find root pages")?;

        rows.into_iter().map(Page::try_from).collect()
    }

    /// Deletes the page and, through the foreign keys, its subtree and articles.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM tl_page WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete page")?
            .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Page not found"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::init_database;
    use chrono::{Duration, Utc};

    async fn setup() -> Result<(SqlitePool, i64)> {
        let pool = init_database("sqlite::memory:").await?;
        let repo = PageRepository::new(pool.clone());
        let root = Page::new_root("Site".to_string(), "example.com".to_string(), "en".to_string());
        let root_id = repo.create(&root).await?;
        Ok((pool, root_id))
    }

    #[tokio::test]
    async fn test_create_and_find() -> Result<()> {
        let (pool, root_id) = setup().await?;
        let repo = PageRepository::new(pool);

        let mut page = Page::new_regular(root_id, "About Us".to_string());
        page.protected = true;
        page.groups = vec![2, -1];
        page.hide = true;
        page.sitemap = SitemapMode::Always;
        page.start = Some(Utc::now() - Duration::days(1));
        let id = repo.create(&page).await?;

        let found = repo.find_by_id(id).await?.expect("page exists");
        assert_eq!(found.title, "About Us");
        assert_eq!(found.alias, "about-us");
        assert_eq!(found.pid, Some(root_id));
        assert_eq!(found.groups, vec![2, -1]);
        assert!(found.protected);
        assert!(found.hide);
        assert_eq!(found.sitemap, SitemapMode::Always);
        assert!(found.start.is_some());
        assert!(found.stop.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_page() -> Result<()> {
        let (pool, _) = setup().await?;
        let repo = PageRepository::new(pool);

        let orphan = Page::new(None, PageType::Regular, "Orphan".to_string(), "orphan".to_string());
        assert!(repo.create(&orphan).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_find_by_pid_orders_by_sorting() -> Result<()> {
        let (pool, root_id) = setup().await?;
        let repo = PageRepository::new(pool);

        let mut second = Page::new_regular(root_id, "Second".to_string());
        second.sorting = 20;
        let mut first = Page::new_regular(root_id, "First".to_string());
        first.sorting = 10;
        repo.create(&second).await?;
        repo.create(&first).await?;

        let titles: Vec<String> = repo
            .find_by_pid(root_id)
            .await?
            .into_iter()
            .map(|p| p.title)
            .collect();
        assert_eq!(titles, vec!["First", "Second"]);
        assert_eq!(repo.find_roots().await?.len(), 1);
        assert_eq!(repo.find_all().await?.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_and_delete_cascade() -> Result<()> {
        let (pool, root_id) = setup().await?;
        let repo = PageRepository::new(pool);

        let parent_id = repo.create(&Page::new_regular(root_id, "Parent".to_string())).await?;
        let child_id = repo.create(&Page::new_regular(parent_id, "Child".to_string())).await?;

        let mut parent = repo.find_by_id(parent_id).await?.expect("parent exists");
        parent.page_type = PageType::Redirect;
        parent.url = Some("https://example.org".to_string());
        parent.redirect = RedirectType::Temporary;
        repo.update(&parent).await?;

        let updated = repo.find_by_id(parent_id).await?.expect("parent exists");
        assert_eq!(updated.page_type, PageType::Redirect);
        assert_eq!(updated.redirect, RedirectType::Temporary);

        repo.delete(parent_id).await?;
        assert!(repo.find_by_id(child_id).await?.is_none());
        assert!(repo.delete(parent_id).await.is_err());
        Ok(())
    }
}
