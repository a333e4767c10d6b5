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
use contao_core::models::opt_in::{OptInToken, REGISTRATION_PREFIX};
use contao_db::repositories::{MemberRepository, OptInRepository};
use std::collections::BTreeMap;

use super::{jump_to_href, FrontendModule, ModuleOutcome};
use crate::mailer::Email;
use crate::render::{FrontendTemplate, Redirection, RenderContext};

pub const MEMBER_TABLE: &str = "tl_member";

const FIELDS: &[&str] = &["firstname", "lastname", "username", "email"];

/// Self-service sign-up with optional e-mail activation.
pub struct RegistrationModule;

fn show_message(template: &mut FrontendTemplate, message: &str, is_error: bool) {
    template.set("message", message);
    template.set("has_error", &is_error);
    template.set("show_form", &false);
}

impl RegistrationModule {
    /// Check the submitted values, returning the error per field.
    async fn validate(
        ctx: &RenderContext<'_>,
        values: &BTreeMap<&str, String>,
    ) -> Result<BTreeMap<&'static str, String>> {
        let members = MemberRepository::new(ctx.db().clone());
        let mut errors = BTreeMap::new();

        let username = values.get("username").map(String::as_str).unwrap_or("");
        if let Err(e) = Member::validate_username(username) {
            errors.insert("username", e);
        } else if members.username_exists(username, None).await? {
            errors.insert("username", "This username is already taken.".to_string());
        }

        let email = values.get("email").map(String::as_str).unwrap_or("");
        if let Err(e) = Member::validate_email(email) {
            errors.insert("email", e);
        } else if members.email_exists(email, None).await? {
            errors.insert("email", "This e-mail address is already registered.".to_string());
        }

        let password = ctx.request.raw_form_value("password");
        if let Err(e) = Member::validate_password(password) {
            errors.insert("password", e);
        } else if password != ctx.request.raw_form_value("password_confirm") {
            errors.insert("password", "The passwords did not match.".to_string());
        }

        Ok(errors)
    }

    async fn register(
        ctx: &RenderContext<'_>,
        config: &ModuleConfig,
        values: &BTreeMap<&str, String>,
    ) -> Result<Member> {
        let field = |name: &str| values.get(name).cloned().unwrap_or_default();
        let mut member = Member::new(
            field("username"),
            field("email"),
            ctx.request.raw_form_value("password"),
        )?;
        if !config.reg_skip_name() {
            member.firstname = field("firstname");
            member.lastname = field("lastname");
        }
        member.groups = config.reg_groups();
        member.login = config.reg_allow_login();
        member.disable = config.reg_activate();

        let id = MemberRepository::new(ctx.db().clone())
            .create(&member)
            .await?;
        member.id = Some(id);
        tracing::info!(member_id = id, username = %member.username, "Member registered");

        if config.reg_activate() {
            Self::send_activation_mail(ctx, &member).await?;
        }
        Ok(member)
    }

    async fn send_activation_mail(ctx: &RenderContext<'_>, member: &Member) -> Result<()> {
        let token = OptInToken::new(
            REGISTRATION_PREFIX,
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
            subject: format!("Your registration on {}", ctx.request.host_name()),
            body: format!(
                "Thank you for your registration on {}.\n\n\
                 Please click {} to complete your registration and to activate your account. \
                 If you did not request an account, please ignore this e-mail.\n",
                ctx.request.host_name(),
                link
            ),
        };
        ctx.state
            .mailer
            .send(&email)
            .await
            .context("Failed to send the activation e-mail")
    }

    async fn activate(
        ctx: &RenderContext<'_>,
        config: &ModuleConfig,
        template: &mut FrontendTemplate,
        token: &str,
    ) -> Result<ModuleOutcome> {
        let opt_ins = OptInRepository::new(ctx.db().clone());
        let members = MemberRepository::new(ctx.db().clone());

        let Some(mut opt_in) = opt_ins.find_by_token(token).await? else {
            show_message(template, "Invalid token.", true);
            return Ok(ModuleOutcome::Render);
        };
        let Some(member_id) = opt_in.related_ids.first().copied() else {
            show_message(template, "Invalid token.", true);
            return Ok(ModuleOutcome::Render);
        };
        if let Err(e) = opt_in.check(MEMBER_TABLE, member_id, ctx.now) {
            show_message(template, &e.to_string(), true);
            return Ok(ModuleOutcome::Render);
        }
        let Some(mut member) = members.find_by_id(member_id).await? else {
            show_message(template, "Invalid token.", true);
            return Ok(ModuleOutcome::Render);
        };

        member.disable = false;
        member.updated_at = ctx.now;
        members.update(&member).await?;
        opt_in.confirm(ctx.now)?;
        opt_ins.confirm(&opt_in).await?;
        tracing::info!(member_id, "Member account activated");

        if let Some(href) = jump_to_href(ctx, config.reg_jump_to()) {
            return Ok(ModuleOutcome::Redirect(Redirection::to(href)));
        }
        show_message(template, "Your account has been activated.", false);
        Ok(ModuleOutcome::Render)
    }
}

#[async_trait]
impl FrontendModule for RegistrationModule {
    fn template(&self) -> &'static str {
        "mod_registration"
    }

    async fn compile(
        &self,
        ctx: &RenderContext<'_>,
        config: &ModuleConfig,
        template: &mut FrontendTemplate,
    ) -> Result<ModuleOutcome> {
        let form_id = format!("tl_registration_{}", config.id());
        ctx.bind_form(template, &form_id);
        template.set("skip_name", &config.reg_skip_name());
        template.set("message", "");
        template.set("has_error", &false);
        template.set("show_form", &true);

        let mut values: BTreeMap<&str, String> = FIELDS.iter().map(|f| (*f, String::new())).collect();
        template.set("values", &values);
        template.set("errors", &BTreeMap::<&str, String>::new());

        if let Some(token) = ctx.request.query_param("token") {
            if OptInToken::has_prefix(token, REGISTRATION_PREFIX) {
                return Self::activate(ctx, config, template, token).await;
            }
        }

        if !ctx.request.is_form_submit(&form_id) {
            return Ok(ModuleOutcome::Render);
        }

        for field in FIELDS.iter().copied() {
            if let Some(value) = ctx.request.form_value(field) {
                values.insert(field, value.to_string());
            }
        }
        template.set("values", &values);

        let errors = Self::validate(ctx, &values).await?;
        if !errors.is_empty() {
            template.set("errors", &errors);
            return Ok(ModuleOutcome::Render);
        }

        Self::register(ctx, config, &values).await?;

        if let Some(href) = jump_to_href(ctx, config.jump_to()) {
            return Ok(ModuleOutcome::Redirect(Redirection::to(href)));
        }
        let message = if config.reg_activate() {
            "Your account has been registered. We have sent you an e-mail with an activation link."
        } else {
            "Your account has been registered."
        };
        show_message(template, message, false);
        Ok(ModuleOutcome::Render)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        create_member, create_module, create_test_app_state, create_test_app_state_with_mailer,
        module_redirect, render_module, TestSite,
    };
    use axum::http::Method;
    use serde_json::json;

    fn registration_body(module: &ModuleConfig, username: &str, confirm: &str) -> String {
        format!(
            "FORM_SUBMIT=tl_registration_{}&firstname=Jane&lastname=Doe&username={}\
             &email={}%40example.com&password=secret-password&password_confirm={}",
            module.id(),
            username,
            username,
            confirm
        )
    }

    #[tokio::test]
    async fn test_registration_creates_member_in_groups() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        let module = create_module(
            &state,
            "registration",
            json!({"reg_groups": [site.group], "reg_allow_login": true, "jump_to": site.members}),
        )
        .await?;
        let fixture = site
            .fixture(&state, site.contact, "/contact.html")
            .await?
            .with_request(Method::POST, "/contact.html", &registration_body(&module, "jane", "secret-password"));

        assert_eq!(module_redirect(&fixture, &module).await?.url, "/members.html");

        let member = MemberRepository::new(state.db.clone())
            .find_by_username("jane")
            .await?
            .expect("registered member");
        assert_eq!(member.groups, vec![site.group]);
        assert_eq!(member.full_name(), "Jane Doe");
        assert!(member.login);
        assert!(!member.disable);
        assert!(member.verify_password("secret-password")?);
        Ok(())
    }

    #[tokio::test]
    async fn test_registration_reports_field_errors() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        create_member(&state, "jane", vec![]).await?;
        let module = create_module(&state, "registration", json!({})).await?;
        let fixture = site
            .fixture(&state, site.contact, "/contact.html")
            .await?
            .with_request(Method::POST, "/contact.html", &registration_body(&module, "jane", "other-password"));

        let html = render_module(&fixture, &module).await?;
        assert!(html.contains("This username is already taken."));
        assert!(html.contains("This e-mail address is already registered."));
        assert!(html.contains("The passwords did not match."));
        assert!(html.contains("value=\"Jane\""));
        Ok(())
    }

    #[tokio::test]
    async fn test_activation_link_enables_member_once() -> Result<()> {
        let (state, mailer) = create_test_app_state_with_mailer().await?;
        let site = TestSite::create(&state).await?;
        let module = create_module(&state, "registration", json!({"reg_activate": true, "reg_allow_login": true})).await?;
        let fixture = site
            .fixture(&state, site.contact, "/contact.html")
            .await?
            .with_request(Method::POST, "/contact.html", &registration_body(&module, "jane", "secret-password"));

        let html = render_module(&fixture, &module).await?;
        assert!(html.contains("We have sent you an e-mail with an activation link."));

        let members = MemberRepository::new(state.db.clone());
        assert!(members.find_by_username("jane").await?.expect("member").disable);

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "jane@example.com");
        let token = sent[0]
            .body
            .split("?token=")
            .nth(1)
            .and_then(|rest| rest.split_whitespace().next())
            .expect("activation link")
            .to_string();
        assert!(OptInToken::has_prefix(&token, REGISTRATION_PREFIX));

        let url = format!("/contact.html?token={}", token);
        let fixture = site.fixture(&state, site.contact, &url).await?;
        let html = render_module(&fixture, &module).await?;
        assert!(html.contains("Your account has been activated."));
        assert!(!members.find_by_username("jane").await?.expect("member").disable);

        let html = render_module(&fixture, &module).await?;
        assert!(html.contains("The token has already been used"));
        Ok(())
    }
}
