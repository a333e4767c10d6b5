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
use contao_core::models::member::Member;
use sqlx::SqlitePool;

use crate::datetime::{ids_to_json, parse_datetime, parse_ids, parse_optional_datetime};

const MEMBER_COLUMNS: &str = r#"
    id, username, email, firstname, lastname, password_hash, member_groups, login, disable,
    start, stop, locked_until, login_attempts, last_login, current_login, date_added,
    created_at, updated_at
"#;

#[derive(sqlx::FromRow)]
struct MemberRow {
    id: i64,
    username: String,
    email: String,
    firstname: String,
    lastname: String,
    password_hash: String,
    member_groups: String,
    login: bool,
    disable: bool,
    start: Option<String>,
    stop: Option<String>,
    locked_until: Option<String>,
    login_attempts: i64,
    last_login: Option<String>,
    current_login: Option<String>,
    date_added: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<MemberRow> for Member {
    type Error = anyhow::Error;

    fn try_from(row: MemberRow) -> Result<Self> {
        Ok(Member {
            id: Some(row.id),
            username: row.username,
            email: row.email,
            firstname: row.firstname,
            lastname: row.lastname,
            password_hash: row.password_hash,
            groups: parse_ids(&row.member_groups, "member_groups")?,
            login: row.login,
            disable: row.disable,
            start: parse_optional_datetime(row.start.as_deref(), "start")?,
            stop: parse_optional_datetime(row.stop.as_deref(), "stop")?,
            locked_until: parse_optional_datetime(row.locked_until.as_deref(), "locked_until")?,
            login_attempts: row.login_attempts,
            last_login: parse_optional_datetime(row.last_login.as_deref(), "last_login")?,
            current_login: parse_optional_datetime(row.current_login.as_deref(), "current_login")?,
            date_added: parse_datetime(&row.date_added, "date_added")?,
            created_at: parse_datetime(&row.created_at, "created_at")?,
            updated_at: parse_datetime(&row.updated_at, "updated_at")?,
        })
    }
}

pub struct MemberRepository {
    pool: SqlitePool,
}

impl MemberRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, member: &Member) -> Result<i64> {
        if let Err(e) = member.is_valid() {
            return Err(anyhow::anyhow!("Invalid member: {}", e));
        }

        let result = sqlx::query(
            r#"
            INSERT INTO tl_member (
                username, email, firstname, lastname, password_hash, member_groups, login,
                disable, start, stop, locked_until, login_attempts, last_login, current_login,
                date_added, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&member.username)
        .bind(&member.email)
        .bind(&member.firstname)
        .bind(&member.lastname)
        .bind(&member.password_hash)
        .bind(ids_to_json(&member.groups))
        .bind(member.login)
        .bind(member.disable)
        .bind(member.start)
        .bind(member.stop)
        .bind(member.locked_until)
        .bind(member.login_attempts)
        .bind(member.last_login)
        .bind(member.current_login)
        .bind(member.date_added)
        .bind(member.created_at)
        .bind(member.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to create member")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update(&self, member: &Member) -> Result<()> {
        let id = member
            .id
            .ok_or_else(|| anyhow::anyhow!("Cannot update member without id"))?;
        if let Err(e) = member.is_valid() {
            return Err(anyhow::anyhow!("Invalid member: {}", e));
        }

        let rows_affected = sqlx::query(
            r#"
            UPDATE tl_member SET
                username = ?, email = ?, firstname = ?, lastname = ?, password_hash = ?,
                member_groups = ?, login = ?, disable = ?, start = ?, stop = ?,
                locked_until = ?, login_attempts = ?, last_login = ?, current_login = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&member.username)
        .bind(&member.email)
        .bind(&member.firstname)
        .bind(&member.lastname)
        .bind(&member.password_hash)
        .bind(ids_to_json(&member.groups))
        .bind(member.login)
        .bind(member.disable)
        .bind(member.start)
        .bind(member.stop)
        .bind(member.locked_until)
        .bind(member.login_attempts)
        .bind(member.last_login)
        .bind(member.current_login)
        .bind(chrono::Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update member")?
        .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Member not found"));
        }
        Ok(())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {} FROM tl_member WHERE id = ?",
            MEMBER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find member by id")?;

        row.map(Member::try_from).transpose()
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {} FROM tl_member WHERE username = ?",
            MEMBER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find member by username")?;

        row.map(Member::try_from).transpose()
    }

    /// E-mail lookup is case-insensitive.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Member>> {
        let row = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {} FROM tl_member WHERE email = ? COLLATE NOCASE",
            MEMBER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find member by email")?;

        row.map(Member::try_from).transpose()
    }

    /// Whether another member already uses this username.
    pub async fn username_exists(&self, username: &str, except_id: Option<i64>) -> Result<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM tl_member WHERE username = ? AND id != ?")
                .bind(username)
                .bind(except_id.unwrap_or(-1))
                .fetch_one(&self.pool)
                .await
                .context("Failed to check username")?;

        Ok(count > 0)
    }

    pub async fn email_exists(&self, email: &str, except_id: Option<i64>) -> Result<bool> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM tl_member WHERE email = ? COLLATE NOCASE AND id != ?",
        )
        .bind(email)
        .bind(except_id.unwrap_or(-1))
        .fetch_one(&self.pool)
        .await
        .context("Failed to check email")?;

        Ok(count > 0)
    }

    pub async fn list(&self) -> Result<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberRow>(&format!(
            "SELECT {} FROM tl_member ORDER BY username",
            MEMBER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list members")?;

        rows.into_iter().map(Member::try_from).collect()
    }

    /// Delete a member together with its sessions.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM tl_member WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete member")?
            .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Member not found"));
        }
        Ok(())
    }

    /// Remove inactive registrations that were never activated and whose
    /// opt-in tokens are gone. Returns the number of deleted members.
    pub async fn delete_unactivated(&self, added_before: chrono::DateTime<chrono::Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM tl_member
            WHERE disable = 1 AND last_login IS NULL AND current_login IS NULL AND date_added < ?
            "#,
        )
        .bind(added_before)
        .execute(&self.pool)
        .await
        .context("Failed to purge unactivated members")?;

        Ok(result.rows_affected())
    }
}
