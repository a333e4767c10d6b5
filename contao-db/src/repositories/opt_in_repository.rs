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
use chrono::{DateTime, Utc};
use contao_core::models::opt_in::OptInToken;
use sqlx::SqlitePool;

use crate::datetime::{ids_to_json, parse_datetime, parse_ids, parse_optional_datetime};

const OPT_IN_COLUMNS: &str = r#"
    id, token, email, related_table, related_ids, created_at, valid_until, remove_on, confirmed_at
"#;

#[derive(sqlx::FromRow)]
struct OptInRow {
    id: i64,
    token: String,
    email: String,
    related_table: String,
    related_ids: String,
    created_at: String,
    valid_until: String,
    remove_on: String,
    confirmed_at: Option<String>,
}

impl TryFrom<OptInRow> for OptInToken {
    type Error = anyhow::Error;

    fn try_from(row: OptInRow) -> Result<Self> {
        Ok(OptInToken {
            id: Some(row.id),
            token: row.token,
            email: row.email,
            related_table: row.related_table,
            related_ids: parse_ids(&row.related_ids, "related_ids")?,
            created_at: parse_datetime(&row.created_at, "created_at")?,
            valid_until: parse_datetime(&row.valid_until, "valid_until")?,
            remove_on: parse_datetime(&row.remove_on, "remove_on")?,
            confirmed_at: parse_optional_datetime(row.confirmed_at.as_deref(), "confirmed_at")?,
        })
    }
}

pub struct OptInRepository {
    pool: SqlitePool,
}

impl OptInRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, token: &OptInToken) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO tl_opt_in (
                token, email, related_table, related_ids, created_at, valid_until, remove_on, confirmed_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&token.token)
        .bind(&token.email)
        .bind(&token.related_table)
        .bind(ids_to_json(&token.related_ids))
        .bind(token.created_at)
        .bind(token.valid_until)
        .bind(token.remove_on)
        .bind(token.confirmed_at)
        .execute(&self.pool)
        .await
        .context("Failed to create opt-in token")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_token(&self, token: &str) -> Result<Option<OptInToken>> {
        let row = sqlx::query_as::<_, OptInRow>(&format!(
            "SELECT {} FROM tl_opt_in WHERE token = ?",
            OPT_IN_COLUMNS
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find opt-in token")?;

        row.map(OptInToken::try_from).transpose()
    }

    /// Persist the confirmation timestamp of a token.
    pub async fn confirm(&self, token: &OptInToken) -> Result<()> {
        let id = token
            .id
            .ok_or_else(|| anyhow::anyhow!("Cannot confirm opt-in token without id"))?;

        let rows_affected = sqlx::query("UPDATE tl_opt_in SET confirmed_at = ? WHERE id = ?")
            .bind(token.confirmed_at)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to confirm opt-in token")?
            .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Opt-in token not found"));
        }
        Ok(())
    }

    /// Tokens referencing the given record, newest first.
    pub async fn find_related(&self, related_table: &str, related_id: i64) -> Result<Vec<OptInToken>> {
        let rows = sqlx::query_as::<_, OptInRow>(&format!(
            r#"
            SELECT {} FROM tl_opt_in
            WHERE related_table = ?
              AND EXISTS (SELECT 1 FROM json_each(tl_opt_in.related_ids) WHERE json_each.value = ?)
            ORDER BY created_at DESC
            "#,
            OPT_IN_COLUMNS
        ))
        .bind(related_table)
        .bind(related_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to find related opt-in tokens")?;

        rows.into_iter().map(OptInToken::try_from).collect()
    }

    /// Remove tokens whose retention period has ended.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM tl_opt_in WHERE remove_on < ?")
            .bind(now)
            .execute(&self.pool)
            .await
            .context("Failed to delete expired opt-in tokens")?;

        Ok(result.rows_affected())
    }
}
