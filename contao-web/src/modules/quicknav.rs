use anyhow::Result;
use async_trait::async_trait;
use contao_core::models::module_config::ModuleConfig;
use contao_core::navigation::{flatten, NavItem, NavigationOptions};
use contao_core::routing::is_local_url;
use serde::Serialize;

use super::{FrontendModule, ModuleOutcome};
use crate::render::{FrontendTemplate, Redirection, RenderContext};

const INDENT: &str = "\u{a0}\u{a0}";

#[derive(Debug, Serialize)]
struct SelectOption {
    href: String,
    link: String,
    indent: String,
    is_active: bool,
}

impl SelectOption {
    fn from_item(item: &NavItem, base_level: usize) -> Self {
        Self {
            href: item.href.clone(),
            link: item.link.clone(),
            indent: INDENT.repeat(item.level.saturating_sub(base_level)),
            is_active: item.is_active,
        }
    }
}

/// Redirect to the submitted `target` when the module's form was sent.
///
/// Only local URLs or URLs offered by the menu are followed.
fn submitted_target(
    ctx: &RenderContext<'_>,
    form_id: &str,
    items: &[NavItem],
) -> Option<Redirection> {
    if !ctx.request.is_form_submit(form_id) {
        return None;
    }
    let target = ctx.request.form_value("target")?;
    if is_local_url(target) || items.iter().any(|item| item.href == target) {
        Some(Redirection::to(target))
    } else {
        tracing::warn!(target = %target, "Ignoring quick navigation target");
        None
    }
}

fn bind_select(
    ctx: &RenderContext<'_>,
    config: &ModuleConfig,
    template: &mut FrontendTemplate,
    form_id: &str,
    options: &[SelectOption],
    default_label: &str,
) {
    ctx.bind_form(template, form_id);
    template.set("label", config.custom_label().unwrap_or(default_label));
    template.set("options", options);
}

/// Drop-down menu of the page tree.
pub struct QuickNavModule;

#[async_trait]
impl FrontendModule for QuickNavModule {
    fn template(&self) -> &'static str {
        "mod_quicknav"
    }

    async fn compile(
        &self,
        ctx: &RenderContext<'_>,
        config: &ModuleConfig,
        template: &mut FrontendTemplate,
    ) -> Result<ModuleOutcome> {
        let options = NavigationOptions {
            level_offset: 0,
            ..config.navigation_options()
        };
        let root = config.root_page().unwrap_or(ctx.page.root_id);
        let items = flatten(&ctx.navigator().build(root, 1, &options));
        if items.is_empty() {
            return Ok(ModuleOutcome::Empty);
        }

        let form_id = format!("tl_quicknav_{}", config.id());
        if let Some(redirect) = submitted_target(ctx, &form_id, &items) {
            return Ok(ModuleOutcome::Redirect(redirect));
        }

        let select: Vec<SelectOption> = items
            .iter()
            .map(|item| SelectOption::from_item(item, 1))
            .collect();
        bind_select(ctx, config, template, &form_id, &select, "Quick navigation");
        Ok(ModuleOutcome::Render)
    }
}

/// Drop-down list of selected pages.
pub struct QuickLinkModule;

#[async_trait]
impl FrontendModule for QuickLinkModule {
    fn template(&self) -> &'static str {
        "mod_quicklink"
    }

    async fn compile(
        &self,
        ctx: &RenderContext<'_>,
        config: &ModuleConfig,
        template: &mut FrontendTemplate,
    ) -> Result<ModuleOutcome> {
        let items = ctx
            .navigator()
            .custom(&config.pages(), &config.navigation_options());
        if items.is_empty() {
            return Ok(ModuleOutcome::Empty);
        }

        let form_id = format!("tl_quicklink_{}", config.id());
        if let Some(redirect) = submitted_target(ctx, &form_id, &items) {
            return Ok(ModuleOutcome::Redirect(redirect));
        }

        let select: Vec<SelectOption> = items
            .iter()
            .map(|item| SelectOption::from_item(item, item.level))
            .collect();
        bind_select(ctx, config, template, &form_id, &select, "Quick link");
        Ok(ModuleOutcome::Render)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{
        create_module, create_test_app_state, module_redirect, render_module, TestSite,
    };
    use axum::http::Method;
    use serde_json::json;

    #[tokio::test]
    async fn test_quicknav_indents_subpages() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        let module = create_module(&state, "quicknav", json!({"custom_label": "Jump to"})).await?;
        let fixture = site.fixture(&state, site.home, "/").await?;

        let html = render_module(&fixture, &module).await?;
        assert!(html.contains("<option value=\"\">Jump to</option>"));
        assert!(html.contains("<option value=\"/team.html\">\u{a0}\u{a0}Team</option>"));
        assert!(html.contains(&format!("value=\"tl_quicknav_{}\"", module.id())));
        Ok(())
    }

    #[tokio::test]
    async fn test_quicknav_redirects_to_local_target() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        let module = create_module(&state, "quicknav", json!({})).await?;
        let body = format!("FORM_SUBMIT=tl_quicknav_{}&target=%2Fcontact.html", module.id());
        let fixture = site
            .fixture(&state, site.home, "/")
            .await?
            .with_request(Method::POST, "/", &body);

        let redirect = module_redirect(&fixture, &module).await?;
        assert_eq!(redirect.url, "/contact.html");
        Ok(())
    }

    #[tokio::test]
    async fn test_quicklink_ignores_foreign_target() -> Result<()> {
        let state = create_test_app_state().await?;
        let site = TestSite::create(&state).await?;
        let module = create_module(&state, "quicklink", json!({"pages": [site.about, site.contact]})).await?;
        let body = format!(
            "FORM_SUBMIT=tl_quicklink_{}&target=https%3A%2F%2Fevil.example%2F",
            module.id()
        );
        let fixture = site
            .fixture(&state, site.home, "/")
            .await?
            .with_request(Method::POST, "/", &body);

        let html = render_module(&fixture, &module).await?;
        assert!(html.contains("<option value=\"/about.html\">About</option>"));
        Ok(())
    }
}
