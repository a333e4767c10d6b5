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
use contao_core::models::module_config::{CloseMode, ModuleConfig};
use contao_db::repositories::{MemberRepository, MemberSessionRepository};

use super::{jump_to_href, FrontendModule, ModuleOutcome};
use crate::render::{FrontendTemplate, Redirection, RenderContext, SessionChange};

/// Deactivates or deletes the account of the logged-in member.
pub struct CloseAccountModule;

#[async_trait]
impl FrontendModule for CloseAccountModule {
    fn template(&self) -> &'static str {
        "mod_closeaccount"
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
        let form_id = format!("tl_close_account_{}", config.id());
        ctx.bind_form(template, &form_id);
        template.set("message", "");

        if !ctx.request.is_form_submit(&form_id) {
            return Ok(ModuleOutcome::Render);
        }

        let members = MemberRepository::new(ctx.db().clone());
        let Some(mut member) = members.find_by_id(user.id()).await? else {
            return Ok(ModuleOutcome::Empty);
        };
        if !member.verify_password(ctx.request.raw_form_value("password"))? {
            template.set("message", "Invalid password.");
            return Ok(ModuleOutcome::Render);
        }

        match config.close_mode() {
            CloseMode::Deactivate => {
                member.disable = true;
                member.updated_at = ctx.now;
                members.update(&member).await?;
                tracing::info!(member_id = member.id(), "Member account deactivated");
            }
            CloseMode::Delete => {
                members.delete(member.id()).await?;
                tracing::info!(member_id = member.id(), "Member account deleted");
            }
        }
        MemberSessionRepository::new(ctx.db().clone())
            .delete_for_member(member.id())
            .await?;

        let target = jump_to_href(ctx, config.jump_to()).unwrap_or_else(|| "/".to_string());
        Ok(ModuleOutcome::Redirect(
            Redirection::to(target).with_session(SessionChange::End),
        ))
    }
}
