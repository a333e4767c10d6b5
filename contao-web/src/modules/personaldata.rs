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
use serde::Serialize;

use super::{jump_to_href, FrontendModule, ModuleOutcome};
use crate::render::{FrontendTemplate, Redirection, RenderContext};

#[derive(Debug, Serialize)]
struct FieldView {
    name: String,
    label: &'static str,
    value: String,
    error: String,
}

fn label(field: &str) -> &'static str {
    match field {
        "firstname" => "First name",
        "lastname" => "Last name",
        "email" => "E-mail address",
        _ => "",
    }
}

fn value_of<'m>(member: &'m Member, field: &str) -> &'m str {
    match field {
        "firstname" => &member.firstname,
        "lastname" => &member.lastname,
        "email" => &member.email,
        _ => "",
    }
}

/// Lets a logged-in member edit their own data.
pub struct PersonalDataModule;

impl PersonalDataModule {
    async fn validate(ctx: &RenderContext<'_>, member: &Member, field: &str, value: &str) -> Result<Option<String>> {
        if field != "email" {
            return Ok(None);
        }
        if let Err(e) = Member::validate_email(value) {
            return Ok(Some(e));
        }
        let taken = MemberRepository::new(ctx.db().clone())
            .email_exists(value, member.id)
            .await?;
        Ok(taken.then(|| "This e-mail address is already registered.".to_string()))
    }
}

#[async_trait]
impl FrontendModule for PersonalDataModule {
    fn template(&self) -> &'static str {
        "mod_personaldata"
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
        let members = MemberRepository::new(ctx.db().clone());
        let Some(mut member) = members.find_by_id(user.id()).await? else {
            return Ok(ModuleOutcome::Empty);
        };

        let form_id = format!("tl_member_{}", config.id());
        ctx.bind_form(template, &form_id);
        template.set("message", "");
        template.set("has_error", &false);

        let editable = config.editable();
        let submitted = ctx.request.is_form_submit(&form_id);
        let mut fields = Vec::with_capacity(editable.len());
        for name in &editable {
            let value = if submitted {
                ctx.request.form_value(name).unwrap_or("").to_string()
            } else {
                value_of(&member, name).to_string()
            };
            let error = if submitted {
                Self::validate(ctx, &member, name, &value).await?.unwrap_or_default()
            } else {
                String::new()
            };
            fields.push(FieldView {
                name: name.clone(),
                label: label(name),
                value,
                error,
            });
        }

        if submitted {
            if fields.iter().any(|f| !f.error.is_empty()) {
                template.set("has_error", &true);
            } else {
                for field in &fields {
                    match field.name.as_str() {
                        "firstname" => member.firstname = field.value.clone(),
                        "lastname" => member.lastname = field.value.clone(),
                        "email" => member.email = field.value.clone(),
                        _ => {}
                    }
                }
                member.updated_at = ctx.now;
                members.update(&member).await?;
                tracing::info!(member_id = member.id(), "Personal data updated");

                if let Some(href) = jump_to_href(ctx, config.jump_to()) {
                    return Ok(ModuleOutcome::Redirect(Redirection::to(href)));
                }
                template.set("message", "Your data has been saved.");
            }
        }

        template.set("fields", &fields);
        Ok(ModuleOutcome::Render)
    }
}
