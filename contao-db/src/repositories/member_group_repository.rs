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
use contao_core::models::member_group::MemberGroup;
use sqlx::SqlitePool;

use crate::datetime::{parse_datetime, parse_optional_datetime};

const GROUP_COLUMNS: &str =
    "id, name, disable, start, stop, redirect, jump_to, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct MemberGroupRow {
    id: i64,
    name: String,
    disable: bool,
    start: Option<String>,
    stop: Option<String>,
    redirect: bool,
    jump_to: Option<i64>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<MemberGroupRow> for MemberGroup {
    type Error = anyhow::Error;

    fn try_from(row: MemberGroupRow) -> Result<Self> {
        Ok(MemberGroup {
            id: Some(row.id),
            name: row.name,
            disable: row.disable,
            start: parse_optional_datetime(row.start.as_deref(), "start")?,
            stop: parse_optional_datetime(row.stop.as_deref(), "stop")?,
            redirect: row.redirect,
            jump_to: row.jump_to,
            created_at: parse_datetime(&row.created_at, "created_at")?,
            updated_at: parse_datetime(&row.updated_at, "updated_at")?,
        })
    }
}

pub struct MemberGroupRepository {
    pool: SqlitePool,
}

impl MemberGroupRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, group: &MemberGroup) -> Result<i64> {
        if group.name.trim().is_empty() {
            return Err(anyhow::anyhow!("Invalid member group: name cannot be empty"));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO tl_member_group (name, disable, start, stop, redirect, jump_to, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&group.name)
        .bind(group.disable)
        .bind(group.start)
        .bind(group.stop)
        .bind(group.redirect)
        .bind(group.jump_to)
        .bind(group.created_at)
        .bind(group.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to create member group")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<MemberGroup>> {
        let row = sqlx::query_as::<_, MemberGroupRow>(&format!(
            "SELECT {} FROM tl_member_group WHERE id = ?",
            GROUP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find member group by id")?;

        row.map(MemberGroup::try_from).transpose()
    }

    /// Groups with the given ids, in the order the ids are listed. Unknown ids are skipped.
    pub async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<MemberGroup>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "SELECT {} FROM tl_member_group WHERE id IN ({})",
            GROUP_COLUMNS, placeholders
        );
        let mut query = sqlx::query_as::<_, MemberGroupRow>(&sql);
        for id in ids {
            query = query.bind(id);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to find member groups")?;

        let mut groups = rows
            .into_iter()
            .map(MemberGroup::try_from)
            .collect::<Result<Vec<_>>>()?;
        groups.sort_by_key(|g| ids.iter().position(|id| *id == g.id()).unwrap_or(usize::MAX));
        Ok(groups)
    }

    pub async fn find_all(&self) -> Result<Vec<MemberGroup>> {
        let rows = sqlx::query_as::<_, MemberGroupRow>(&format!(
            "SELECT {} FROM tl_member_group ORDER BY name",
            GROUP_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list member groups")?;

        rows.into_iter().map(MemberGroup::try_from).collect()
    }
}
