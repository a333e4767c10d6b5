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
use contao_core::models::session::Session;
use sqlx::SqlitePool;

use crate::datetime::parse_datetime;

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: String,
    member_id: i64,
    expires_at: String,
    created_at: String,
}

impl TryFrom<SessionRow> for Session {
    type Error = anyhow::Error;

    fn try_from(row: SessionRow) -> Result<Self> {
        Ok(Session {
            id: row.id,
            member_id: row.member_id,
            expires_at: parse_datetime(&row.expires_at, "expires_at")?,
            created_at: parse_datetime(&row.created_at, "created_at")?,
        })
    }
}

pub struct MemberSessionRepository {
    pool: SqlitePool,
}

impl MemberSessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, session: &Session) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO tl_member_session (id, member_id, expires_at, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&session.id)
        .bind(session.member_id)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await
        .context("Failed to create session")?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT id, member_id, expires_at, created_at FROM tl_member_session WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find session by id")?;

        row.map(Session::try_from).transpose()
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM tl_member_session WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete session")?;

        Ok(())
    }

    pub async fn delete_for_member(&self, member_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM tl_member_session WHERE member_id = ?")
            .bind(member_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete sessions of member")?;

        Ok(result.rows_affected())
    }

    pub async fn delete_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM tl_member_session WHERE expires_at < ?")
            .bind(chrono::Utc::now())
            .execute(&self.pool)
            .await
            .context("Failed to delete expired sessions")?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::init_database;
    use crate::repositories::member_repository::MemberRepository;
    use chrono::Duration;
    use contao_core::models::member::Member;

    async fn setup() -> Result<(SqlitePool, i64)> {
        let pool = init_database("sqlite::memory:").await?;
        let member = Member::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "secret-password",
        )?;
        let member_id = MemberRepository::new(pool.clone()).create(&member).await?;
        Ok((pool, member_id))
    }

    #[tokio::test]
    async fn test_create_find_delete() -> Result<()> {
        let (pool, member_id) = setup().await?;
        let repo = MemberSessionRepository::new(pool);

        let session = Session::new(member_id, Duration::hours(1));
        repo.create(&session).await?;

        let found = repo.find_by_id(&session.id).await?.expect("session exists");
        assert_eq!(found.member_id, member_id);
        assert!(!found.is_expired());

        repo.delete(&session.id).await?;
        assert!(repo.find_by_id(&session.id).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_expired_and_for_member() -> Result<()> {
        let (pool, member_id) = setup().await?;
        let repo = MemberSessionRepository::new(pool);

        let expired = Session::new(member_id, Duration::hours(-1));
        let live = Session::new(member_id, Duration::hours(1));
        let other = Session::new(member_id, Duration::hours(2));
        repo.create(&expired).await?;
        repo.create(&live).await?;
        repo.create(&other).await?;

        assert_eq!(repo.delete_expired().await?, 1);
        assert!(repo.find_by_id(&expired.id).await?.is_none());
        assert_eq!(repo.delete_for_member(member_id).await?, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_sessions_removed_with_member() -> Result<()> {
        let (pool, member_id) = setup().await?;
        let repo = MemberSessionRepository::new(pool.clone());
        let session = Session::new(member_id, Duration::hours(1));
        repo.create(&session).await?;

        MemberRepository::new(pool).delete(member_id).await?;
        assert!(repo.find_by_id(&session.id).await?.is_none());
        Ok(())
    }
}
