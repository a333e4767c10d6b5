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
use contao_core::models::layout::{Layout, LayoutModule};
use sqlx::SqlitePool;

use crate::datetime::parse_datetime;

#[derive(sqlx::FromRow)]
struct LayoutRow {
    id: i64,
    name: String,
    template: String,
    modules: String,
    css_class: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<LayoutRow> for Layout {
    type Error = anyhow::Error;

    fn try_from(row: LayoutRow) -> Result<Self> {
        let modules: Vec<LayoutModule> =
            serde_json::from_str(&row.modules).context("Failed to parse layout modules")?;

        Ok(Layout {
            id: Some(row.id),
            name: row.name,
            template: row.template,
            modules,
            css_class: row.css_class,
            created_at: parse_datetime(&row.created_at, "created_at")?,
            updated_at: parse_datetime(&row.updated_at, "updated_at")?,
        })
    }
}

pub struct LayoutRepository {
    pool: SqlitePool,
}

impl LayoutRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, layout: &Layout) -> Result<i64> {
        if let Err(e) = layout.is_valid() {
            return Err(anyhow::anyhow!("Invalid layout: {}", e));
        }
        let modules =
            serde_json::to_string(&layout.modules).context("Failed to serialize layout modules")?;

        let result = sqlx::query(
            r#"
            INSERT INTO tl_layout (name, template, modules, css_class, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&layout.name)
        .bind(&layout.template)
        .bind(modules)
        .bind(&layout.css_class)
        .bind(layout.created_at)
        .bind(layout.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to create layout")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update(&self, layout: &Layout) -> Result<()> {
        let id = layout
            .id
            .ok_or_else(|| anyhow::anyhow!("Cannot update layout without id"))?;
        if let Err(e) = layout.is_valid() {
            return Err(anyhow::anyhow!("Invalid layout: {}", e));
        }
        let modules =
            serde_json::to_string(&layout.modules).context("Failed to serialize layout modules")?;

        let rows_affected = sqlx::query(
            "UPDATE tl_layout SET name = ?, template = ?, modules = ?, css_class = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&layout.name)
        .bind(&layout.template)
        .bind(modules)
        .bind(&layout.css_class)
        .bind(chrono::Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update layout")?
        .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Layout not found"));
        }
        Ok(())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Layout>> {
        let row = sqlx::query_as::<_, LayoutRow>(
            "SELECT id, name, template, modules, css_class, created_at, updated_at FROM tl_layout WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find layout by id")?;

        row.map(Layout::try_from).transpose()
    }

    pub async fn find_all(&self) -> Result<Vec<Layout>> {
        let rows = sqlx::query_as::<_, LayoutRow>(
            "SELECT id, name, template, modules, css_class, created_at, updated_at FROM tl_layout ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to list layouts")?;

        rows.into_iter().map(Layout::try_from).collect()
    }
}
