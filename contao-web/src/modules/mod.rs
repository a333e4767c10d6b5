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

//! Front-end modules.
//!
//! Every module type implements [`FrontendModule`]; [`generate`] binds the
//! shared template variables, runs the module and renders its template.

use anyhow::Result;
use async_trait::async_trait;
use contao_core::models::module_config::ModuleConfig;
use contao_core::utils::html::escape_html;

use crate::render::{Fragment, FrontendTemplate, Redirection, RenderContext};

pub mod articlelist;
pub mod booknav;
pub mod breadcrumb;
pub mod changepassword;
pub mod closeaccount;
pub mod html;
pub mod login;
pub mod lostpassword;
pub mod navigation;
pub mod personaldata;
pub mod quicknav;
pub mod registration;
pub mod search;
pub mod sitemap;

/// What a module decided while compiling.
#[derive(Debug)]
pub enum ModuleOutcome {
    /// Render the template.
    Render,
    /// Output nothing, e.g. an empty menu.
    Empty,
    /// Stop rendering the page and redirect.
    Redirect(Redirection),
}

#[async_trait]
pub trait FrontendModule: Send + Sync {
    /// Default template name.
    fn template(&self) -> &'static str;

    /// Output in back-end scope instead of the generic wildcard.
    fn backend_output(&self, _config: &ModuleConfig) -> Option<String> {
        None
    }

    async fn compile(
        &self,
        ctx: &RenderContext<'_>,
        config: &ModuleConfig,
        template: &mut FrontendTemplate,
    ) -> Result<ModuleOutcome>;
}

pub fn module_for(module_type: &str) -> Option<Box<dyn FrontendModule>> {
    let module: Box<dyn FrontendModule> = match module_type {
        "navigation" => Box::new(navigation::NavigationModule),
        "customnav" => Box::new(navigation::CustomNavModule),
        "breadcrumb" => Box::new(breadcrumb::BreadcrumbModule),
        "sitemap" => Box::new(sitemap::SitemapModule),
        "booknav" => Box::new(booknav::BookNavModule),
        "quicknav" => Box::new(quicknav::QuickNavModule),
        "quicklink" => Box::new(quicknav::QuickLinkModule),
        "articlelist" => Box::new(articlelist::ArticleListModule),
        "search" => Box::new(search::SearchModule),
        "login" => Box::new(login::LoginModule),
        "registration" => Box::new(registration::RegistrationModule),
        "lostpassword" => Box::new(lostpassword::LostPasswordModule),
        "personaldata" => Box::new(personaldata::PersonalDataModule),
        "changepassword" => Box::new(changepassword::ChangePasswordModule),
        "closeaccount" => Box::new(closeaccount::CloseAccountModule),
        "html" => Box::new(html::HtmlModule),
        _ => return None,
    };
    Some(module)
}

/// Placeholder shown when a module is rendered in back-end scope.
pub fn wildcard(config: &ModuleConfig) -> String {
    format!(
        "<div class=\"be_wildcard\">\n  <p>### {} ###</p>\n  <p>{} (ID {})</p>\n</div>",
        escape_html(&config.module_type.to_uppercase()),
        escape_html(&config.name),
        config.id()
    )
}

/// What a module shows in back-end scope, `None` for unknown types.
pub fn backend_preview(config: &ModuleConfig) -> Option<String> {
    let module = module_for(&config.module_type)?;
    Some(
        module
            .backend_output(config)
            .unwrap_or_else(|| wildcard(config)),
    )
}

/// Render a module for the current request.
pub async fn generate(ctx: &RenderContext<'_>, config: &ModuleConfig) -> Result<Fragment> {
    let Some(module) = module_for(&config.module_type) else {
        tracing::warn!(
            module_id = config.id(),
            module_type = %config.module_type,
            "Unknown module type"
        );
        return Ok(Fragment::empty());
    };

    if ctx.scope.is_backend() {
        let html = module
            .backend_output(config)
            .unwrap_or_else(|| wildcard(config));
        return Ok(Fragment::Html(html));
    }

    let template_name = ctx
        .state
        .templates
        .pick(&config.template_name(), module.template());
    let mut template = FrontendTemplate::new(template_name);
    template.bind_base(
        &format!("mod_{}", config.module_type),
        config.headline.as_ref(),
        &config.css,
    );
    template.set("type", &config.module_type);
    template.set("id", &config.id());
    template.set("name", &config.name);

    match module.compile(ctx, config, &mut template).await? {
        ModuleOutcome::Render => Ok(Fragment::Html(ctx.render(&template)?)),
        ModuleOutcome::Empty => Ok(Fragment::empty()),
        ModuleOutcome::Redirect(redirect) => {
            tracing::debug!(module_id = config.id(), url = %redirect.url, "Module requested a redirect");
            Ok(Fragment::Redirect(redirect))
        }
    }
}

/// Where a page id links to, `None` when it is unset or gone.
pub(crate) fn jump_to_href(ctx: &RenderContext<'_>, page_id: Option<i64>) -> Option<String> {
    page_id.and_then(|id| ctx.page_href(id))
}
