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
use contao_core::models::headline::CssId;
use contao_core::models::module_config::ModuleConfig;
use sqlx::SqlitePool;

use crate::datetime::parse_datetime;
use crate::repositories::content_repository::{headline_to_json, parse_headline};

const MODULE_COLUMNS: &str =
    "id, name, type, headline, css_id, css_class, custom_tpl, data, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct ModuleRow {
    id: i64,
    name: String,
    #[sqlx(rename = "type")]
    module_type: String,
    headline: Option<String>,
    css_id: String,
    css_class: String,
    custom_tpl: Option<String>,
    data: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ModuleRow> for ModuleConfig {
    type Error = anyhow::Error;

    fn try_from(row: ModuleRow) -> Result<Self> {
        Ok(ModuleConfig {
            id: Some(row.id),
            name: row.name,
            module_type: row.module_type,
            headline: parse_headline(row.headline.as_deref())?,
            css: CssId {
                id: row.css_id,
                class: row.css_class,
            },
            custom_tpl: row.custom_tpl,
            data: serde_json::from_str(&row.data).context("Failed to parse module settings")?,
            created_at: parse_datetime(&row.created_at, "created_at")?,
            updated_at: parse_datetime(&row.updated_at, "updated_at")?,
        })
    }
}

pub struct ModuleRepository {
    pool: SqlitePool,
}

impl ModuleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, module: &ModuleConfig) -> Result<i64> {
        if let Err(e) = module.is_valid() {
            return Err(anyhow::anyhow!("Invalid module: {}", e));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO tl_module (name, type, headline, css_id, css_class, custom_tpl, data, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&module.name)
        .bind(&module.module_type)
        .bind(headline_to_json(&module.headline)?)
        .bind(&module.css.id)
        .bind(&module.css.class)
        .bind(&module.custom_tpl)
        .bind(module.data.to_string())
        .bind(module.created_at)
        .bind(module.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to create module")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update(&self, module: &ModuleConfig) -> Result<()> {
        let id = module
            .id
            .ok_or_else(|| anyhow::anyhow!("Cannot update module without id"))?;
        if let Err(e) = module.is_valid() {
            return Err(anyhow::anyhow!("Invalid module: {}", e));
        }

        let rows_affected = sqlx::query(
            r#"
            UPDATE tl_module
            SET name = ?, type = ?, headline = ?, css_id = ?, css_class = ?, custom_tpl = ?, data = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&module.name)
        .bind(&module.module_type)
        .bind(headline_to_json(&module.headline)?)
        .bind(&module.css.id)
        .bind(&module.css.class)
        .bind(&module.custom_tpl)
        .bind(module.data.to_string())
        .bind(chrono::Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update module")?
        .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Module not found"));
        }
        Ok(())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<ModuleConfig>> {
        let row = sqlx::query_as::<_, ModuleRow>(&format!(
            "SELECT {} FROM tl_module WHERE id = ?",
            MODULE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find module by id")?;

        row.map(ModuleConfig::try_from).transpose()
    }

    pub async fn find_all(&self) -> Result<Vec<ModuleConfig>> {
        let rows = sqlx::query_as::<_, ModuleRow>(&format!(
            "SELECT {} FROM tl_module ORDER BY name, id",
            MODULE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list modules")?;

        rows.into_iter().map(ModuleConfig::try_from).collect()
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM tl_module WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete module")?
            .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Module not found"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::init_database;
    use contao_core::models::headline::Headline;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_find_update() -> Result<()> {
        let pool = init_database("sqlite::memory:").await?;
        let repo = ModuleRepository::new(pool);

        let mut module = ModuleConfig::new(
            "Main navigation".to_string(),
            "navigation".to_string(),
            json!({"level_offset": 0, "show_level": 2}),
        );
        module.headline = Some(Headline::new("h3", "Menu"));
        module.css = CssId::new("main-nav", "nav");
        let id = repo.create(&module).await?;

        let mut found = repo.find_by_id(id).await?.expect("module exists");
        assert_eq!(found.module_type, "navigation");
        assert_eq!(found.show_level(), 2);
        assert_eq!(found.headline, Some(Headline::new("h3", "Menu")));
        assert_eq!(found.css, CssId::new("main-nav", "nav"));

        found.custom_tpl = Some("mod_navigation_compact".to_string());
        repo.update(&found).await?;
        let updated = repo.find_by_id(id).await?.expect("module exists");
        assert_eq!(updated.template_name(), "mod_navigation_compact");

        assert_eq!(repo.find_all().await?.len(), 1);
        repo.delete(id).await?;
        assert!(repo.find_by_id(id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_type_rejected() -> Result<()> {
        let pool = init_database("sqlite::memory:").await?;
        let repo = ModuleRepository::new(pool);
        let module = ModuleConfig::new("News".to_string(), "newslist".to_string(), json!({}));
        assert!(repo.create(&module).await.is_err());
        Ok(())
    }
}
