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
use async_trait::async_trait;
use chrono::Duration;
use contao_core::models::member::Member;
use contao_core::models::member_group::login_redirect;
use contao_core::models::module_config::ModuleConfig;
use contao_core::models::session::Session;
use contao_core::routing::is_local_url;
use contao_db::repositories::{MemberGroupRepository, MemberRepository, MemberSessionRepository};

use super::{jump_to_href, FrontendModule, ModuleOutcome};
use crate::render::{FrontendTemplate, Redirection, RenderContext, SessionChange};

pub const LOGOUT_PATH: &str = "/_logout";

const LOGIN_FAILED: &str = "Login failed (please note that usernames and passwords are case-sensitive)!";
const ACCOUNT_LOCKED: &str = "This account has been locked! You can log in again in a few minutes.";

enum Authentication {
    Success(Box<Member>),
    Failed(&'static str),
}

/// Login form, or the logout button for a logged-in member.
pub struct LoginModule;

impl LoginModule {
    async fn authenticate(ctx: &RenderContext<'_>, username: &str, password: &str) -> Result<Authentication> {
        let members = MemberRepository::new(ctx.db().clone());
        let Some(mut member) = members.find_by_username(username).await? else {
            tracing::info!(username = %username, "Login attempt for unknown member");
            return Ok(Authentication::Failed(LOGIN_FAILED));
        };

        if member.is_locked(ctx.now) {
            return Ok(Authentication::Failed(ACCOUNT_LOCKED));
        }
        if !member.is_active(ctx.now) {
            tracing::info!(member_id = member.id(), "Login attempt for inactive member");
            return Ok(Authentication::Failed(LOGIN_FAILED));
        }

        if !member.verify_password(password)? {
            member.register_failed_login(ctx.now);
            members.update(&member).await?;
            tracing::info!(
                member_id = member.id(),
                attempts = member.login_attempts,
                "Invalid password"
            );
            return Ok(Authentication::Failed(if member.is_locked(ctx.now) {
                ACCOUNT_LOCKED
            } else {
                LOGIN_FAILED
            }));
        }

        member.register_successful_login(ctx.now);
        members.update(&member).await?;
        Ok(Authentication::Success(Box::new(member)))
    }

    /// The local URL a login form asked to return to.
    fn redirect_back_target(ctx: &RenderContext<'_>) -> Option<String> {
        ctx.request
            .form_value("redirect")
            .or_else(|| ctx.request.query_param("redirect"))
            .filter(|url| is_local_url(url))
            .map(str::to_string)
    }

    /// Member group redirect, then the page the visitor came from, then `jump_to`.
    async fn target(ctx: &RenderContext<'_>, config: &ModuleConfig, member: &Member) -> Result<String> {
        let groups = MemberGroupRepository::new(ctx.db().clone())
            .find_by_ids(&member.groups)
            .await?;
        let target = login_redirect(&member.groups, &groups, ctx.now)
            .and_then(|id| ctx.page_href(id))
            .or_else(|| {
                config
                    .redirect_back()
                    .then(|| Self::redirect_back_target(ctx))
                    .flatten()
            })
            .or_else(|| jump_to_href(ctx, config.jump_to()))
            .unwrap_or_else(|| ctx.request.request_uri());
        Ok(target)
    }
}

#[async_trait]
impl FrontendModule for LoginModule {
    fn template(&self) -> &'static str {
        "mod_login"
    }

    async fn compile(
        &self,
        ctx: &RenderContext<'_>,
        config: &ModuleConfig,
        template: &mut FrontendTemplate,
    ) -> Result<ModuleOutcome> {
        let form_id = format!("tl_login_{}", config.id());
        ctx.bind_form(template, &form_id);
        template.set("logout_action", LOGOUT_PATH);
        template.set("message", "");
        template.set("username", "");
        template.set(
            "redirect",
            &Self::redirect_back_target(ctx)
                .filter(|_| config.redirect_back())
                .unwrap_or_default(),
        );

        if let Some(member) = ctx.member() {
            let name = member.full_name();
            let greeting = if name.is_empty() { member.username.clone() } else { name };
            template.set("logged_in", &true);
            template.set("greeting", &greeting);
            return Ok(ModuleOutcome::Render);
        }
        template.set("logged_in", &false);

        if !ctx.request.is_form_submit(&form_id) {
            return Ok(ModuleOutcome::Render);
        }

        let username = ctx.request.form_value("username").unwrap_or("");
        let password = ctx.request.raw_form_value("password");
        template.set("username", username);

        match Self::authenticate(ctx, username, password).await? {
            Authentication::Failed(message) => {
                template.set("message", message);
                Ok(ModuleOutcome::Render)
            }
            Authentication::Success(member) => {
                let session = Session::new(
                    member.id(),
                    Duration::minutes(ctx.state.config.session.timeout_minutes),
                );
                MemberSessionRepository::new(ctx.db().clone())
                    .create(&session)
                    .await?;

                let target = Self::target(ctx, config, &member).await?;
                tracing::info!(member_id = member.id(), target = %target, "Member logged in");
                Ok(ModuleOutcome::Redirect(
                    Redirection::to(target).with_session(SessionChange::Start(session.id)),
                ))
            }
        }
    }
}
