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
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

/// Initialize the database, creating the file if needed and running migrations
pub async fn init_database(database_url: &str) -> Result<SqlitePool> {
    if database_url.starts_with("sqlite:") {
        let path = database_url.trim_start_matches("sqlite:");
        if !path.starts_with(":memory:") {
            if let Some(parent) = Path::new(path).parent() {
                std::fs::create_dir_all(parent).context("Failed to create database directory")?;
            }
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid database URL: {}", database_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Apply the embedded schema migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    tracing::info!("Checking for pending migrations...");

    sqlx::migrate!("../migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("All migrations processed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_in_memory_creates_schema() -> Result<()> {
        let pool = init_database("sqlite::memory:").await?;

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name LIKE 'tl_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await?;
        let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();

        assert_eq!(
            names,
            vec![
                "tl_article",
                "tl_content",
                "tl_layout",
                "tl_member",
                "tl_member_group",
                "tl_member_session",
                "tl_module",
                "tl_opt_in",
                "tl_page",
                "tl_search",
                "tl_search_term",
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() -> Result<()> {
        let pool = init_database("sqlite::memory:").await?;
        run_migrations(&pool).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_init_creates_database_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("contao.db");
        let url = format!("sqlite:{}", path.display());

        let pool = init_database(&url).await?;
        pool.close().await;
        assert!(path.exists());
        Ok(())
    }
}
