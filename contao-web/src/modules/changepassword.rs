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
use contao_core::models::member::Member;
use contao_core::models::module_config::ModuleConfig;
use contao_db::repositories::MemberRepository;

use super::{jump_to_href, FrontendModule, ModuleOutcome};
use crate::render::{FrontendTemplate, Redirection, RenderContext};

pub struct ChangePasswordModule;

fn message(template: &mut FrontendTemplate, text: &str, is_error: bool) {
    template.set("message", text);
    template.set("has_error", &is_error);
}

#[async_trait]
impl FrontendModule for ChangePasswordModule {
    fn template(&self) -> &'static str {
        "mod_changepassword"
    }

    async fn compile(
        &self,
        ctx: &RenderContext<'_>,
        config: &ModuleConfig,
        template: &mut FrontendTemplate,
    ) -> Result<ModuleOutcome> {
        let Some(user) = ctx.member() else {
            return Ok(ModuleOutcome::Empty);
        };
        let form_id = format!("tl_change_password_{}", config.id());
        ctx.bind_form(template, &form_id);
        message(template, "", false);

        if !ctx.request.is_form_submit(&form_id) {
            return Ok(ModuleOutcome::Render);
        }

        let members = MemberRepository::new(ctx.db().clone());
        let Some(mut member) = members.find_by_id(user.id()).await? else {
            return Ok(ModuleOutcome::Empty);
        };

        if !member.verify_password(ctx.request.raw_form_value("oldpassword"))? {
            tracing::info!(member_id = member.id(), "Password change with wrong old password");
            message(template, "Please enter your current password.", true);
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
        member.updated_at = ctx.now;
        members.update(&member).await?;
        tracing::info!(member_id = member.id(), "Password changed");

        if let Some(href) = jump_to_href(ctx, config.jump_to()) {
            return Ok(ModuleOutcome::Redirect(Redirection::to(href)));
        }
        message(template, "Your password has been updated.", false);
        Ok(ModuleOutcome::Render)
    }
}
