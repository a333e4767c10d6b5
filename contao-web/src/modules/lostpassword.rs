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
use async_trait::async_trait;
use contao_core::models::member::Member;
use contao_core::models::module_config::ModuleConfig;
use contao_core::models::opt_in::{OptInToken, PASSWORD_PREFIX};
use contao_db::repositories::{MemberRepository, OptInRepository};

use super::registration::MEMBER_TABLE;
use super::{jump_to_href, FrontendModule, ModuleOutcome};
use crate::mailer::Email;
use crate::render::{FrontendTemplate, Redirection, RenderContext};

const NO_ACCOUNT: &str = "No account found with these credentials.";

/// Password reset in two steps: request a link by e-mail, then set a new password.
pub struct LostPasswordModule;

fn message(template: &mut FrontendTemplate, text: &str, is_error: bool) {
    template.set("message", text);
    template.set("has_error", &is_error);
}

impl LostPasswordModule {
    async fn request_link(
        ctx: &RenderContext<'_>,
        template: &mut FrontendTemplate,
    ) -> Result<ModuleOutcome> {
        let username = ctx.request.form_value("username").unwrap_or("");
        let email = ctx.request.form_value("email").unwrap_or("");
        template.set("username", username);
        template.set("email", email);

        let member = MemberRepository::new(ctx.db().clone())
            .find_by_username(username)
            .await?
            .filter(|m| m.email.eq_ignore_ascii_case(email) && m.is_active(ctx.now));
        let Some(member) = member else {
            tracing::info!(username = %username, "Password reset for unknown member");
            message(template, NO_ACCOUNT, true);
            return Ok(ModuleOutcome::Render);
        };

        let token = OptInToken::new(
            PASSWORD_PREFIX,
            member.email.clone(),
            MEMBER_TABLE,
            vec![member.id()],
        );
        OptInRepository::new(ctx.db().clone()).create(&token).await?;

        let link = ctx
            .request
            .absolute_url(&format!("{}?token={}", ctx.current_url(), token.token));
        let email = Email {
            to: member.email.clone(),
            subject: format!("Password request on {}", ctx.request.host_name()),
            body: format!(
                "You have requested a new password for {}.\n\n\
                 Please click {} to set the new password. \
                 If you did not request this e-mail, please contact the website administrator.\n",
                ctx.request.host_name(),
                link
            ),
        };
        ctx.state
            .mailer
            .send(&email)
            .await
            .context("Failed to send the password reset e-mail")?;
        tracing::info!(member_id = member.id(), "Password reset link sent");

        template.set("step", "done");
        message(
            template,
            "A link to set a new password has been sent to your e-mail address.",
            false,
        );
        Ok(ModuleOutcome::Render)
    }

    /// The member a reset token belongs to, or the error to show.
    async fn token_member(
        ctx: &RenderContext<'_>,
        token: &str,
    ) -> Result<Result<(OptInToken, Member), String>> {
        let invalid = || Ok(Err("Invalid token.".to_string()));

        let Some(opt_in) = OptInRepository::new(ctx.db().clone())
            .find_by_token(token)
            .await?
        else {
            return invalid();
        };
        let Some(member_id) = opt_in.related_ids.first().copied() else {
            return invalid();
        };
        if let Err(e) = opt_in.check(MEMBER_TABLE, member_id, ctx.now) {
            return Ok(Err(e.to_string()));
        }
        match MemberRepository::new(ctx.db().clone())
            .find_by_id(member_id)
            .await?
        {
            Some(member) => Ok(Ok((opt_in, member))),
            None => invalid(),
        }
    }

    async fn reset(
        ctx: &RenderContext<'_>,
        config: &ModuleConfig,
        template: &mut FrontendTemplate,
        form_id: &str,
        token: &str,
    ) -> Result<ModuleOutcome> {
        let (mut opt_in, mut member) = match Self::token_member(ctx, token).await? {
            Ok(found) => found,
            Err(error) => {
                template.set("step", "invalid");
                message(template, &error, true);
                return Ok(ModuleOutcome::Render);
            }
        };

        template.set("step", "reset");
        if !ctx.request.is_form_submit(form_id) {
            return Ok(ModuleOutcome::Render);
        }

        let password = ctx.request.raw_form_value("password");
        if let Err(e) = Member::validate_password(password) {
            message(template, &e, true);
            return Ok(ModuleOutcome::Render);
        }
        if password != ctx.request.raw_form_value("password_confirm") {
            message(template, "The passwords did not match.", true);
            return Ok(ModuleOutcome::Render);
        }

        member.set_password(password)?;
        member.locked_until = None;
        member.login_attempts = 0;
        member.updated_at = ctx.now;
        MemberRepository::new(ctx.db().clone())
            .update(&member)
            .await?;
        opt_in.confirm(ctx.now)?;
        OptInRepository::new(ctx.db().clone())
            .confirm(&opt_in)
            .await?;
        tracing::info!(member_id = member.id(), "Password reset");

        if let Some(href) = jump_to_href(ctx, config.reg_jump_to()) {
            return Ok(ModuleOutcome::Redirect(Redirection::to(href)));
        }
        template.set("step", "done");
        message(template, "Your new password has been set.", false);
        Ok(ModuleOutcome::Render)
    }
}

#[async_trait]
impl FrontendModule for LostPasswordModule {
    fn template(&self) -> &'static str {
        "mod_lostpassword"
    }

    async fn compile(
        &self,
        ctx: &RenderContext<'_>,
        config: &ModuleConfig,
        template: &mut FrontendTemplate,
    ) -> Result<ModuleOutcome> {
        let form_id = format!("tl_lost_password_{}", config.id());
        ctx.bind_form(template, &form_id);
        template.set("step", "request");
        template.set("username", "");
        template.set("email", "");
        message(template, "", false);

        if let Some(token) = ctx.request.query_param("token") {
            if OptInToken::has_prefix(token, PASSWORD_PREFIX) {
                return Self::reset(ctx, config, template, &form_id, token).await;
            }
            template.set("step", "invalid");
            message(template, "Invalid token.", true);
            return Ok(ModuleOutcome::Render);
        }

        if ctx.request.is_form_submit(&form_id) {
            return Self::request_link(ctx, template).await;
        }
        Ok(ModuleOutcome::Render)
    }
}
