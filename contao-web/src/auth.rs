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

use anyhow::Result;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use contao_core::models::member_group::effective_groups;
use contao_core::security::FrontendUser;
use contao_db::repositories::{MemberGroupRepository, MemberRepository, MemberSessionRepository};
use sqlx::SqlitePool;

use crate::{error::AppError, AppState};

pub const SESSION_COOKIE: &str = "contao_member";
pub const PREVIEW_COOKIE: &str = "contao_preview";

/// The logged-in member, if any.
#[derive(Debug, Clone)]
pub struct OptionalMember(pub Option<FrontendUser>);

impl<S> FromRequestParts<S> for OptionalMember
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(session_id) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) else {
            return Ok(OptionalMember(None));
        };

        let app_state = AppState::from_ref(state);
        let user = load_frontend_user(&app_state.db, &session_id, Utc::now()).await?;
        Ok(OptionalMember(user))
    }
}

/// Whether the request carries the configured preview cookie.
#[derive(Debug, Clone, Copy)]
pub struct PreviewMode(pub bool);

impl<S> FromRequestParts<S> for PreviewMode
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(PreviewMode(is_preview(&jar, app_state.config.preview_token.as_deref())))
    }
}

pub fn is_preview(jar: &CookieJar, preview_token: Option<&str>) -> bool {
    match (preview_token, jar.get(PREVIEW_COOKIE)) {
        (Some(expected), Some(cookie)) => !expected.is_empty() && cookie.value() == expected,
        _ => false,
    }
}

/// Resolve a session id to the member and the groups that are active now.
///
/// Expired sessions are removed; sessions of inactive members count as
/// anonymous. A login lock only blocks new logins, not running sessions.
pub async fn load_frontend_user(
    pool: &SqlitePool,
    session_id: &str,
    now: DateTime<Utc>,
) -> Result<Option<FrontendUser>> {
    let sessions = MemberSessionRepository::new(pool.clone());
    let Some(session) = sessions.find_by_id(session_id).await? else {
        return Ok(None);
    };
    if session.is_expired_at(now) {
        tracing::debug!(member_id = session.member_id, "Session expired");
        sessions.delete(session_id).await?;
        return Ok(None);
    }

    let Some(member) = MemberRepository::new(pool.clone())
        .find_by_id(session.member_id)
        .await?
    else {
        return Ok(None);
    };
    if !member.is_active(now) {
        tracing::debug!(member_id = member.id(), "Member is no longer active");
        return Ok(None);
    }

    let groups = MemberGroupRepository::new(pool.clone())
        .find_by_ids(&member.groups)
        .await?;
    let groups = effective_groups(&member.groups, &groups, now);

    Ok(Some(FrontendUser {
        member,
        groups,
        session_id: session.id,
    }))
}

pub fn session_cookie(session_id: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

/// Cookie value used to remove the session cookie.
pub fn session_cookie_removal() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use contao_core::models::member::Member;
    use contao_core::models::member_group::MemberGroup;
    use contao_core::models::session::Session;
    use contao_db::init_database;

    async fn member_with_session(lifetime: Duration) -> Result<(SqlitePool, Session)> {
        let pool = init_database("sqlite::memory:").await?;
        let groups = MemberGroupRepository::new(pool.clone());
        let active = groups.create(&MemberGroup::new("Members".to_string())).await?;
        let mut disabled = MemberGroup::new("Old".to_string());
        disabled.disable = true;
        let disabled = groups.create(&disabled).await?;

        let mut member = Member::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "secret-password",
        )?;
        member.groups = vec![active, disabled];
        let member_id = MemberRepository::new(pool.clone()).create(&member).await?;

        let session = Session::new(member_id, lifetime);
        MemberSessionRepository::new(pool.clone()).create(&session).await?;
        Ok((pool, session))
    }

    #[tokio::test]
    async fn test_load_frontend_user_with_effective_groups() -> Result<()> {
        let (pool, session) = member_with_session(Duration::hours(1)).await?;

        let user = load_frontend_user(&pool, &session.id, Utc::now())
            .await?
            .expect("valid session");
        assert_eq!(user.member.username, "alice");
        assert_eq!(user.groups.len(), 1);
        assert!(load_frontend_user(&pool, "unknown", Utc::now()).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_lock_keeps_running_session_but_disable_ends_it() -> Result<()> {
        let (pool, session) = member_with_session(Duration::hours(1)).await?;
        let members = MemberRepository::new(pool.clone());
        let now = Utc::now();

        let mut member = members.find_by_id(session.member_id).await?.expect("member");
        for _ in 0..3 {
            member.register_failed_login(now);
        }
        assert!(!member.can_login(now));
        members.update(&member).await?;
        assert!(load_frontend_user(&pool, &session.id, now).await?.is_some());

        member.disable = true;
        members.update(&member).await?;
        assert!(load_frontend_user(&pool, &session.id, now).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_expired_session_is_removed() -> Result<()> {
        let (pool, session) = member_with_session(Duration::hours(-1)).await?;

        assert!(load_frontend_user(&pool, &session.id, Utc::now()).await?.is_none());
        assert!(MemberSessionRepository::new(pool)
            .find_by_id(&session.id)
            .await?
            .is_none());
        Ok(())
    }

    #[test]
    fn test_preview_cookie() {
        let jar = CookieJar::new().add(Cookie::new(PREVIEW_COOKIE, "letmein"));
        assert!(is_preview(&jar, Some("letmein")));
        assert!(!is_preview(&jar, Some("other")));
        assert!(!is_preview(&jar, None));
        assert!(!is_preview(&CookieJar::new(), Some("letmein")));
    }
}
